use crate::attrs::Attr;
use crate::context::LogContext;
use crate::level::Level;
use crate::record::Record;
use crate::sink::{LogSink, SinkError};
use async_trait::async_trait;
use std::sync::Arc;

/// Build a sink that replicates every record to all the given sinks.
///
/// Construction normalizes the input:
/// - absent entries (`None`) are dropped;
/// - entries that are themselves fan-outs are spliced in flat, never
///   nested;
/// - a single remaining sink is returned directly, unwrapped;
/// - otherwise a [`Fanout`] wraps the flattened list. With zero sinks the
///   fan-out silently drops everything.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use logweave::fanout::fanout;
/// use logweave::noop::NoopSink;
/// use logweave::sink::LogSink;
///
/// let a: Arc<dyn LogSink> = Arc::new(NoopSink);
/// let b: Arc<dyn LogSink> = Arc::new(NoopSink);
/// let both = fanout([Some(a), None, Some(b)]);
/// ```
pub fn fanout(sinks: impl IntoIterator<Item = Option<Arc<dyn LogSink>>>) -> Arc<dyn LogSink> {
    let mut flat: Vec<Arc<dyn LogSink>> = Vec::new();
    for sink in sinks.into_iter().flatten() {
        match sink.fan_members() {
            Some(members) => flat.extend(members.iter().cloned()),
            None => flat.push(sink),
        }
    }

    if flat.len() == 1 {
        return flat.remove(0);
    }

    Arc::new(Fanout { sinks: flat })
}

/// Sink that broadcasts each record to a fixed list of member sinks.
///
/// The member list is immutable after construction; concurrent `handle`
/// calls share nothing but the members themselves.
pub struct Fanout {
    sinks: Vec<Arc<dyn LogSink>>,
}

#[async_trait]
impl LogSink for Fanout {
    /// Live if at least one member would act on the level.
    fn enabled(&self, cx: &LogContext, level: Level) -> bool {
        self.sinks.iter().any(|s| s.enabled(cx, level))
    }

    /// Deliver an independent copy of the record to every enabled member.
    ///
    /// Each member's `enabled` is re-checked here so a branch that is
    /// disabled on its own never receives the record even when the
    /// aggregate check passed. A failing member never prevents delivery to
    /// the rest; all failures are collected into one [`FanoutError`].
    async fn handle(&self, cx: &LogContext, record: Record) -> Result<(), SinkError> {
        let mut errors = Vec::new();
        for sink in &self.sinks {
            if sink.enabled(cx, record.level) {
                if let Err(e) = sink.handle(cx, record.clone()).await {
                    errors.push(e);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Box::new(FanoutError { errors }))
        }
    }

    /// Derive every member independently; branch state is never shared.
    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> Arc<dyn LogSink> {
        fanout(
            self.sinks
                .iter()
                .map(|s| Some(Arc::clone(s).with_attrs(attrs.clone()))),
        )
    }

    fn with_group(self: Arc<Self>, name: &str) -> Arc<dyn LogSink> {
        if name.is_empty() {
            return self;
        }
        fanout(
            self.sinks
                .iter()
                .map(|s| Some(Arc::clone(s).with_group(name))),
        )
    }

    fn fan_members(&self) -> Option<&[Arc<dyn LogSink>]> {
        Some(&self.sinks)
    }
}

/// Aggregate of every member failure from one fan-out delivery.
///
/// Display joins the member errors line by line, so no failure is lost
/// even when the caller only logs the message.
#[derive(Debug, thiserror::Error)]
#[error("{}", join_errors(.errors))]
pub struct FanoutError {
    errors: Vec<SinkError>,
}

impl FanoutError {
    /// The individual member errors, in member order.
    pub fn errors(&self) -> &[SinkError] {
        &self.errors
    }
}

fn join_errors(errors: &[SinkError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
