use crate::attrs::Attr;
use crate::context::LogContext;
use crate::level::Level;
use crate::record::Record;
use async_trait::async_trait;
use std::sync::Arc;

/// Error surfaced by a sink while handling a record.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Asynchronous destination for [`Record`]s.
///
/// This is the full capability set the middleware assumes of anything it
/// wraps or fans out to, and also the surface it exposes upward, so
/// handlers, fan-outs and terminal sinks all nest inside each other
/// transparently.
///
/// Implementations are responsible for transporting or storing records;
/// the composition layer never inspects what a sink does with a record
/// after [`handle`](Self::handle) is called.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Whether this sink would act on a record at the given level.
    ///
    /// Callers are expected to check this before doing any per-record work
    /// and to skip [`handle`](Self::handle) entirely when it returns false.
    fn enabled(&self, cx: &LogContext, level: Level) -> bool;

    /// Deliver a single record.
    ///
    /// **Returns**
    /// - `Ok(())` if the record was accepted.
    /// - `Err(..)` if the sink failed; callers decide whether to retry,
    ///   log, or ignore. The middleware never retries internally.
    async fn handle(&self, cx: &LogContext, record: Record) -> Result<(), SinkError>;

    /// Derive a sink that attaches `attrs` to every future record.
    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> Arc<dyn LogSink>;

    /// Derive a sink that nests future attributes under the named group.
    ///
    /// An empty name must be a no-op returning an equivalent sink.
    fn with_group(self: Arc<Self>, name: &str) -> Arc<dyn LogSink>;

    /// Constituent sinks, if this sink is itself a fan-out.
    ///
    /// [`fanout`](crate::fanout::fanout) uses this to splice nested
    /// fan-outs into one flat list. Ordinary sinks keep the default.
    fn fan_members(&self) -> Option<&[Arc<dyn LogSink>]> {
        None
    }
}
