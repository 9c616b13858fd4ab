use crate::attrs::Attr;
use crate::chain::Chain;
use crate::context::LogContext;
use crate::level::Level;
use crate::record::Record;
use crate::sink::{LogSink, SinkError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Replaceable composition strategy.
///
/// Given the ambient context, the handler's accumulated scope and the raw
/// record fields, produce the final message and attribute list. The default
/// is [`default_compose`]; substitute your own for things like redaction.
pub type ComposeFn = Arc<
    dyn Fn(&LogContext, &HandlerScope, DateTime<Utc>, Level, String, Vec<Attr>) -> (String, Vec<Attr>)
        + Send
        + Sync,
>;

/// Per-handler derivation state: accumulated names and the
/// attribute/group chain.
///
/// Cloned in full on every derivation so a parent handler and its derived
/// children never share mutable state.
#[derive(Clone, Default)]
pub struct HandlerScope {
    pub names: Vec<String>,
    pub chain: Chain,
}

impl HandlerScope {
    /// All accumulated names joined with `.`, or `None` when unnamed.
    pub fn qualified_name(&self) -> Option<String> {
        if self.names.is_empty() {
            None
        } else {
            Some(self.names.join("."))
        }
    }
}

/// Options for [`Handler::with_options`].
#[derive(Clone, Default)]
pub struct HandlerOptions {
    /// Composition strategy; defaults to [`default_compose`].
    pub compose: Option<ComposeFn>,
}

/// Middleware sink that reconciles directly-attached attributes, group
/// scoping, ambient context attributes and logger names into the final
/// record before forwarding it to the wrapped sink.
///
/// Derivations (`with_attrs`, `with_group`, `named`, `with_level`) return
/// new handlers; the receiver is never mutated. Handlers implement
/// [`LogSink`] themselves, so they nest inside fan-outs or other handlers.
#[derive(Clone)]
pub struct Handler {
    next: Arc<dyn LogSink>,
    compose: ComposeFn,
    min_level: Option<Level>,
    scope: HandlerScope,
}

impl Handler {
    /// Wrap `next` with the default composition strategy.
    pub fn new(next: Arc<dyn LogSink>) -> Handler {
        Handler::with_options(next, HandlerOptions::default())
    }

    pub fn with_options(next: Arc<dyn LogSink>, options: HandlerOptions) -> Handler {
        Handler {
            next,
            compose: options.compose.unwrap_or_else(|| Arc::new(default_compose)),
            min_level: None,
            scope: HandlerScope::default(),
        }
    }

    /// The wrapped downstream sink.
    pub fn next(&self) -> &Arc<dyn LogSink> {
        &self.next
    }

    pub fn scope(&self) -> &HandlerScope {
        &self.scope
    }

    /// Derive a handler with the attributes added to its chain.
    pub fn with_attrs(&self, attrs: Vec<Attr>) -> Handler {
        let mut derived = self.clone();
        derived.scope.chain = self.scope.chain.with_attrs(attrs);
        derived
    }

    /// Derive a handler with the named group opened. An empty name opens
    /// nothing.
    pub fn with_group(&self, name: &str) -> Handler {
        let mut derived = self.clone();
        derived.scope.chain = self.scope.chain.with_group(name);
        derived
    }

    /// Derive a handler that rejects records below `level`.
    pub fn with_level(&self, level: Level) -> Handler {
        let mut derived = self.clone();
        derived.min_level = Some(level);
        derived
    }

    /// Derive a handler with another name segment appended.
    ///
    /// Names accumulate hierarchically: `named("svc")` then `named("db")`
    /// prefixes messages with `[svc.db] `.
    pub fn named(&self, name: &str) -> Handler {
        if name.is_empty() {
            return self.clone();
        }
        let mut derived = self.clone();
        derived.scope.names.push(name.to_owned());
        derived
    }

    /// Local level gate ANDed with the downstream sink's own check.
    pub fn enabled(&self, cx: &LogContext, level: Level) -> bool {
        if let Some(min) = self.min_level {
            if level < min {
                return false;
            }
        }
        self.next.enabled(cx, level)
    }

    /// Compose the record against this handler's scope and the ambient
    /// context, then forward it downstream.
    pub async fn handle(&self, cx: &LogContext, record: Record) -> Result<(), SinkError> {
        let Record {
            timestamp,
            level,
            message,
            attrs,
            caller,
        } = record;
        let (message, attrs) = (self.compose)(cx, &self.scope, timestamp, level, message, attrs);
        let composed = Record {
            timestamp,
            level,
            message,
            attrs,
            caller,
        };
        self.next.handle(cx, composed).await
    }
}

#[async_trait]
impl LogSink for Handler {
    fn enabled(&self, cx: &LogContext, level: Level) -> bool {
        Handler::enabled(self, cx, level)
    }

    async fn handle(&self, cx: &LogContext, record: Record) -> Result<(), SinkError> {
        Handler::handle(self, cx, record).await
    }

    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> Arc<dyn LogSink> {
        Arc::new(Handler::with_attrs(&self, attrs))
    }

    fn with_group(self: Arc<Self>, name: &str) -> Arc<dyn LogSink> {
        Arc::new(Handler::with_group(&self, name))
    }
}

/// Default composition algorithm.
///
/// 1. Start from the record's own attributes (oldest to newest).
/// 2. Add the context's appended attributes at the end; they stay inside
///    whatever group the chain has open.
/// 3. Fold the chain: groups wrap everything accumulated so far, earlier
///    attribute steps move to the front.
/// 4. Add the context's prepended attributes at the very front, outside
///    all groups.
/// 5. Prefix the message with the qualified name, `[name] msg`.
pub fn default_compose(
    cx: &LogContext,
    scope: &HandlerScope,
    _timestamp: DateTime<Utc>,
    _level: Level,
    mut message: String,
    mut attrs: Vec<Attr>,
) -> (String, Vec<Attr>) {
    attrs.extend_from_slice(cx.appended());

    attrs = scope.chain.apply(attrs);

    let prepended = cx.prepended();
    if !prepended.is_empty() {
        let mut front = prepended.to_vec();
        front.extend(attrs);
        attrs = front;
    }

    if let Some(name) = scope.qualified_name() {
        message = format!("[{}] {}", name, message);
    }

    (message, attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::Attr;
    use crate::capture::CaptureSink;

    fn handler_over(capture: &CaptureSink) -> Handler {
        Handler::new(Arc::new(capture.clone()))
    }

    #[tokio::test]
    async fn chain_ordering_is_oldest_to_newest_with_nesting() {
        let capture = CaptureSink::new();
        let handler = handler_over(&capture)
            .with_attrs(vec![Attr::new("a", 1)])
            .with_group("g")
            .with_attrs(vec![Attr::new("b", 2)]);

        let mut record = Record::new(Level::INFO, "m");
        record.add_attrs([Attr::new("c", 3)]);
        handler.handle(&LogContext::new(), record).await.unwrap();

        let records = capture.records();
        assert_eq!(
            records[0].attrs,
            vec![
                Attr::new("a", 1),
                Attr::group("g", vec![Attr::new("b", 2), Attr::new("c", 3)]),
            ]
        );
    }

    #[tokio::test]
    async fn prepended_context_attrs_bypass_groups() {
        let capture = CaptureSink::new();
        let handler = handler_over(&capture).with_group("g");
        let cx = LogContext::new().prepend(["p".into(), 1.into()]);

        handler.handle(&cx, Record::new(Level::INFO, "m")).await.unwrap();

        let attrs = &capture.records()[0].attrs;
        assert_eq!(attrs[0], Attr::new("p", 1));
        assert_eq!(attrs[1], Attr::group("g", Vec::new()));
    }

    #[tokio::test]
    async fn appended_context_attrs_respect_groups() {
        let capture = CaptureSink::new();
        let handler = handler_over(&capture).with_group("g");
        let cx = LogContext::new().append(["x".into(), 9.into()]);

        handler.handle(&cx, Record::new(Level::INFO, "m")).await.unwrap();

        assert_eq!(
            capture.records()[0].attrs,
            vec![Attr::group("g", vec![Attr::new("x", 9)])]
        );
    }

    #[tokio::test]
    async fn names_prefix_the_message() {
        let capture = CaptureSink::new();
        let handler = handler_over(&capture).named("svc");
        handler
            .handle(&LogContext::new(), Record::new(Level::INFO, "hello"))
            .await
            .unwrap();
        assert_eq!(capture.records()[0].message, "[svc] hello");

        let nested = handler.named("db");
        nested
            .handle(&LogContext::new(), Record::new(Level::INFO, "hello"))
            .await
            .unwrap();
        assert_eq!(capture.records()[1].message, "[svc.db] hello");
    }

    #[tokio::test]
    async fn unnamed_handler_leaves_message_alone() {
        let capture = CaptureSink::new();
        handler_over(&capture)
            .handle(&LogContext::new(), Record::new(Level::INFO, "hello"))
            .await
            .unwrap();
        assert_eq!(capture.records()[0].message, "hello");
    }

    #[test]
    fn enabled_is_local_gate_and_downstream() {
        let open = CaptureSink::new();
        let handler = Handler::new(Arc::new(open.clone())).with_level(Level::WARN);
        let cx = LogContext::new();

        assert!(!handler.enabled(&cx, Level::INFO));
        assert!(handler.enabled(&cx, Level::WARN));
        assert!(handler.enabled(&cx, Level::ERROR));

        // Downstream disabled wins even when the local gate passes.
        let gated = CaptureSink::new().with_min_level(Level::ERROR);
        let handler = Handler::new(Arc::new(gated)).with_level(Level::WARN);
        assert!(!handler.enabled(&cx, Level::WARN));
        assert!(handler.enabled(&cx, Level::ERROR));
    }

    #[tokio::test]
    async fn custom_compose_replaces_the_default() {
        let capture = CaptureSink::new();
        let options = HandlerOptions {
            compose: Some(Arc::new(|_cx, _scope, _ts, _level, msg, mut attrs| {
                attrs.retain(|a| a.key != "password");
                (msg, attrs)
            })),
        };
        let handler = Handler::with_options(Arc::new(capture.clone()), options);

        let mut record = Record::new(Level::INFO, "login");
        record.add_attrs([Attr::new("user", "alice"), Attr::new("password", "hunter2")]);
        handler.handle(&LogContext::new(), record).await.unwrap();

        assert_eq!(capture.records()[0].attrs, vec![Attr::new("user", "alice")]);
    }
}
