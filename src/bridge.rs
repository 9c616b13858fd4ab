use crate::attrs::{Attr, Value};
use crate::context::LogContext;
use crate::level::Level;
use crate::logger::Logger;
use crate::record::{Caller, Record};
use chrono::Utc;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Registry;

/// Buffering configuration for [`BridgeLayer`].
///
/// **Fields**
/// - `channel_buffer`: maximum number of in-flight [`Record`]s queued
///   between the event callback and the drain task before new events are
///   dropped.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    pub channel_buffer: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 1024,
        }
    }
}

/// `tracing_subscriber` layer that converts `tracing` events into
/// [`Record`]s and forwards them to a [`Logger`] via a bounded channel and
/// background task.
///
/// The event callback is synchronous and must not await, so records are
/// enqueued with `try_send` and drained by a spawned task that drives the
/// async sink chain. When the channel is full the event is dropped and
/// counted rather than blocking the emitting thread.
pub struct BridgeLayer {
    logger: Logger,
    sender: mpsc::Sender<Record>,
    /// Total events seen by the layer (before the enabled gate).
    pub total_events: Arc<AtomicU64>,
    /// Successfully drained into the sink chain.
    pub enqueued_events: Arc<AtomicU64>,
    /// Dropped because the channel was full.
    pub dropped_events: Arc<AtomicU64>,
}

impl BridgeLayer {
    /// Create a layer and spawn the drain task that pulls queued records
    /// and hands them to the logger's handler.
    ///
    /// A minimal buffer size is enforced to avoid degenerate configs.
    pub fn new(logger: Logger, config: BridgeConfig) -> (Self, JoinHandle<()>) {
        let buffer = config.channel_buffer.max(16);
        let (tx, mut rx) = mpsc::channel::<Record>(buffer);

        let total_events = Arc::new(AtomicU64::new(0));
        let enqueued_events = Arc::new(AtomicU64::new(0));
        let dropped_events = Arc::new(AtomicU64::new(0));

        let enqueued_bg = Arc::clone(&enqueued_events);
        let drain_logger = logger.clone();
        let handle = tokio::spawn(async move {
            let cx = LogContext::new();
            while let Some(record) = rx.recv().await {
                enqueued_bg.fetch_add(1, Ordering::Relaxed);
                if let Err(e) = drain_logger.handler().handle(&cx, record).await {
                    eprintln!("logweave: sink error: {}", e);
                }
            }
        });

        (
            Self {
                logger,
                sender: tx,
                total_events,
                enqueued_events,
                dropped_events,
            },
            handle,
        )
    }
}

impl<S> Layer<S> for BridgeLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let meta = event.metadata();
        let level = level_from_tracing(meta.level());
        if !self.logger.enabled(&LogContext::new(), level) {
            return;
        }

        let mut visitor = AttrVisitor {
            attrs: Vec::new(),
            message: None,
        };
        event.record(&mut visitor);

        let record = Record {
            timestamp: Utc::now(),
            level,
            message: visitor.message.unwrap_or_default(),
            attrs: visitor.attrs,
            caller: meta
                .file()
                .zip(meta.line())
                .map(|(file, line)| Caller { file, line }),
        };

        if self.sender.try_send(record).is_err() {
            self.dropped_events.fetch_add(1, Ordering::Relaxed);
            eprintln!("logweave: channel full, dropping log record");
        }
    }
}

/// Install a bridge over `logger` as the global `tracing` subscriber.
///
/// Returns the drain task's handle; the task runs until the process-wide
/// subscriber (and with it the channel sender) is dropped.
pub fn install(logger: Logger, config: BridgeConfig) -> JoinHandle<()> {
    use tracing_subscriber::layer::SubscriberExt;

    let (layer, handle) = BridgeLayer::new(logger, config);
    let subscriber = Registry::default().with(layer);
    tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");
    handle
}

fn level_from_tracing(level: &tracing::Level) -> Level {
    if *level == tracing::Level::ERROR {
        Level::ERROR
    } else if *level == tracing::Level::WARN {
        Level::WARN
    } else if *level == tracing::Level::INFO {
        Level::INFO
    } else if *level == tracing::Level::DEBUG {
        Level::DEBUG
    } else {
        // TRACE sits below DEBUG on the numeric scale.
        Level::new(-8)
    }
}

struct AttrVisitor {
    attrs: Vec<Attr>,
    message: Option<String>,
}

impl Visit for AttrVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        } else {
            self.attrs.push(Attr::new(field.name(), value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.attrs.push(Attr::new(field.name(), value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.attrs.push(Attr::new(field.name(), value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.attrs.push(Attr::new(field.name(), value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.attrs.push(Attr::new(field.name(), value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let rendered = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(rendered);
        } else {
            self.attrs.push(Attr::new(field.name(), Value::Str(rendered)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureSink;
    use crate::handler::Handler;
    use tracing_subscriber::layer::SubscriberExt;

    #[tokio::test]
    async fn events_flow_through_the_bridge() {
        let capture = CaptureSink::new();
        let logger = Logger::new(Handler::new(Arc::new(capture.clone()))).named("bridge");
        let (layer, drain) = BridgeLayer::new(logger, BridgeConfig::default());

        {
            let subscriber = Registry::default().with(layer);
            let _guard = tracing::subscriber::set_default(subscriber);
            tracing::info!(user = "alice", attempts = 2i64, "logged in");
        }
        // Dropping the subscriber closes the channel; the drain task ends
        // once the queue is empty.
        drain.await.unwrap();

        let records = capture.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "[bridge] logged in");
        assert!(records[0].attrs.contains(&Attr::new("user", "alice")));
        assert!(records[0].attrs.contains(&Attr::new("attempts", 2i64)));
        assert!(records[0].caller.is_some());
    }

    #[tokio::test]
    async fn disabled_levels_never_enqueue() {
        let capture = CaptureSink::new();
        let logger =
            Logger::new(Handler::new(Arc::new(capture.clone()))).with_min_level(Level::WARN);
        let (layer, drain) = BridgeLayer::new(logger, BridgeConfig::default());
        let dropped = Arc::clone(&layer.dropped_events);

        {
            let subscriber = Registry::default().with(layer);
            let _guard = tracing::subscriber::set_default(subscriber);
            tracing::info!("below the gate");
            tracing::warn!("above the gate");
        }
        drain.await.unwrap();

        let records = capture.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "above the gate");
        assert_eq!(dropped.load(Ordering::Relaxed), 0);
    }
}
