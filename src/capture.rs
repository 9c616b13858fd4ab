use crate::attrs::Attr;
use crate::chain::Chain;
use crate::context::LogContext;
use crate::level::Level;
use crate::record::Record;
use crate::sink::{LogSink, SinkError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// In-memory terminal sink that records everything it receives.
///
/// Clones share the same record store, so a test can keep one handle and
/// hand clones to handlers or fan-outs. Like a real terminal sink,
/// derivations via `with_attrs`/`with_group` are applied to incoming
/// records before they are stored, which makes branch-local derivation
/// visible in the captured output.
#[derive(Clone, Default)]
pub struct CaptureSink {
    records: Arc<Mutex<Vec<Record>>>,
    chain: Chain,
    min_level: Option<Level>,
}

impl CaptureSink {
    pub fn new() -> Self {
        CaptureSink::default()
    }

    /// Reject records below `level`; useful for exercising enabled checks.
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = Some(level);
        self
    }

    /// Snapshot of everything captured so far, in arrival order.
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().expect("capture store poisoned").clone()
    }
}

#[async_trait]
impl LogSink for CaptureSink {
    fn enabled(&self, _cx: &LogContext, level: Level) -> bool {
        match self.min_level {
            Some(min) => level >= min,
            None => true,
        }
    }

    async fn handle(&self, _cx: &LogContext, mut record: Record) -> Result<(), SinkError> {
        record.attrs = self.chain.apply(record.attrs);
        self.records
            .lock()
            .expect("capture store poisoned")
            .push(record);
        Ok(())
    }

    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> Arc<dyn LogSink> {
        Arc::new(CaptureSink {
            records: Arc::clone(&self.records),
            chain: self.chain.with_attrs(attrs),
            min_level: self.min_level,
        })
    }

    fn with_group(self: Arc<Self>, name: &str) -> Arc<dyn LogSink> {
        Arc::new(CaptureSink {
            records: Arc::clone(&self.records),
            chain: self.chain.with_group(name),
            min_level: self.min_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn derivations_shape_stored_attrs() {
        let capture = CaptureSink::new();
        let derived = Arc::new(capture.clone())
            .with_group("http")
            .with_attrs(vec![Attr::new("method", "GET")]);

        let mut record = Record::new(Level::INFO, "req");
        record.add_attrs([Attr::new("status", 200)]);
        derived.handle(&LogContext::new(), record).await.unwrap();

        assert_eq!(
            capture.records()[0].attrs,
            vec![Attr::group(
                "http",
                vec![Attr::new("method", "GET"), Attr::new("status", 200)]
            )]
        );
    }
}
