use crate::attrs::Attr;
use crate::context::LogContext;
use crate::level::Level;
use crate::record::Record;
use crate::sink::{LogSink, SinkError};
use async_trait::async_trait;
use std::sync::Arc;

/// A sink that simply drops all records.
///
/// Useful for measuring the overhead of the composition layer itself, and
/// for unit tests that don't care about output. Reports every level as
/// enabled; derivations return the receiver since there is nothing to
/// attach attributes to.
#[derive(Clone, Copy, Default)]
pub struct NoopSink;

#[async_trait]
impl LogSink for NoopSink {
    fn enabled(&self, _cx: &LogContext, _level: Level) -> bool {
        true
    }

    async fn handle(&self, _cx: &LogContext, _record: Record) -> Result<(), SinkError> {
        Ok(())
    }

    fn with_attrs(self: Arc<Self>, _attrs: Vec<Attr>) -> Arc<dyn LogSink> {
        self
    }

    fn with_group(self: Arc<Self>, _name: &str) -> Arc<dyn LogSink> {
        self
    }
}
