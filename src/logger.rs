use crate::attrs::{args_to_attrs, Arg, Attr};
use crate::context::LogContext;
use crate::handler::Handler;
use crate::level::Level;
use crate::record::Record;
use crate::sink::SinkError;

/// Front-end for emitting structured records through a [`Handler`].
///
/// A `Logger` is a thin immutable wrapper: `with`, `with_group`, `named`
/// and `with_min_level` derive new loggers that share ancestor state
/// structurally, so deriving is cheap and the parent stays usable from
/// other threads.
///
/// Every logging call takes an explicit [`LogContext`]; attributes placed
/// there with [`LogContext::prepend`]/[`LogContext::append`] surface in the
/// composed record without being passed through call signatures one by one.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use logweave::context::LogContext;
/// use logweave::handler::Handler;
/// use logweave::logger::Logger;
/// use logweave::noop::NoopSink;
///
/// # async fn demo() {
/// let logger = Logger::new(Handler::new(Arc::new(NoopSink))).named("svc");
/// let cx = LogContext::new().prepend(["request_id".into(), "abc-123".into()]);
/// let _ = logger.info(&cx, "request handled", ["status".into(), 200.into()]).await;
/// # }
/// ```
#[derive(Clone)]
pub struct Logger {
    handler: Handler,
}

impl Logger {
    pub fn new(handler: Handler) -> Logger {
        Logger { handler }
    }

    /// The underlying handler, e.g. for nesting inside a fan-out.
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Derive a logger that attaches the given attributes to every record.
    ///
    /// Args follow the usual pairing rules; with no args the logger is
    /// returned unchanged.
    pub fn with(&self, args: impl IntoIterator<Item = Arg>) -> Logger {
        let attrs = args_to_attrs(args);
        if attrs.is_empty() {
            return self.clone();
        }
        Logger {
            handler: self.handler.with_attrs(attrs),
        }
    }

    /// Derive a logger whose future attributes nest under the named group.
    /// An empty name returns the logger unchanged.
    pub fn with_group(&self, name: &str) -> Logger {
        if name.is_empty() {
            return self.clone();
        }
        Logger {
            handler: self.handler.with_group(name),
        }
    }

    /// Derive a logger with another name segment; names join with `.` in
    /// the message prefix.
    pub fn named(&self, name: &str) -> Logger {
        Logger {
            handler: self.handler.named(name),
        }
    }

    /// Derive a logger that discards records below `level`.
    pub fn with_min_level(&self, level: Level) -> Logger {
        Logger {
            handler: self.handler.with_level(level),
        }
    }

    /// Whether a record at `level` would currently be emitted.
    pub fn enabled(&self, cx: &LogContext, level: Level) -> bool {
        self.handler.enabled(cx, level)
    }

    /// Emit a record at the given level.
    ///
    /// Returns whatever the sink chain reports; a fan-out surfaces every
    /// branch failure in one error. Disabled levels return `Ok(())` without
    /// converting arguments or allocating a record.
    pub async fn log(
        &self,
        cx: &LogContext,
        level: Level,
        message: impl Into<String>,
        args: impl IntoIterator<Item = Arg>,
    ) -> Result<(), SinkError> {
        if !self.enabled(cx, level) {
            return Ok(());
        }
        self.emit(cx, level, message, args_to_attrs(args)).await
    }

    /// Emit a record from ready-made attributes, skipping arg conversion.
    pub async fn log_attrs(
        &self,
        cx: &LogContext,
        level: Level,
        message: impl Into<String>,
        attrs: Vec<Attr>,
    ) -> Result<(), SinkError> {
        if !self.enabled(cx, level) {
            return Ok(());
        }
        self.emit(cx, level, message, attrs).await
    }

    pub async fn debug(
        &self,
        cx: &LogContext,
        message: impl Into<String>,
        args: impl IntoIterator<Item = Arg>,
    ) -> Result<(), SinkError> {
        self.log(cx, Level::DEBUG, message, args).await
    }

    pub async fn info(
        &self,
        cx: &LogContext,
        message: impl Into<String>,
        args: impl IntoIterator<Item = Arg>,
    ) -> Result<(), SinkError> {
        self.log(cx, Level::INFO, message, args).await
    }

    pub async fn warn(
        &self,
        cx: &LogContext,
        message: impl Into<String>,
        args: impl IntoIterator<Item = Arg>,
    ) -> Result<(), SinkError> {
        self.log(cx, Level::WARN, message, args).await
    }

    pub async fn error(
        &self,
        cx: &LogContext,
        message: impl Into<String>,
        args: impl IntoIterator<Item = Arg>,
    ) -> Result<(), SinkError> {
        self.log(cx, Level::ERROR, message, args).await
    }

    async fn emit(
        &self,
        cx: &LogContext,
        level: Level,
        message: impl Into<String>,
        attrs: Vec<Attr>,
    ) -> Result<(), SinkError> {
        let mut record = Record::new(level, message);
        record.add_attrs(attrs);
        self.handler.handle(cx, record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureSink;
    use std::sync::Arc;

    fn logger_over(capture: &CaptureSink) -> Logger {
        Logger::new(Handler::new(Arc::new(capture.clone())))
    }

    #[tokio::test]
    async fn with_and_group_accumulate_across_derivations() {
        let capture = CaptureSink::new();
        let base = logger_over(&capture).with(["app".into(), "api".into()]);
        let scoped = base.with_group("http").with(["method".into(), "GET".into()]);

        scoped
            .info(&LogContext::new(), "req", ["status".into(), 200.into()])
            .await
            .unwrap();
        // The parent logger is unaffected by the child's derivations.
        base.info(&LogContext::new(), "up", []).await.unwrap();

        let records = capture.records();
        assert_eq!(
            records[0].attrs,
            vec![
                Attr::new("app", "api"),
                Attr::group(
                    "http",
                    vec![Attr::new("method", "GET"), Attr::new("status", 200)]
                ),
            ]
        );
        assert_eq!(records[1].attrs, vec![Attr::new("app", "api")]);
    }

    #[tokio::test]
    async fn min_level_short_circuits() {
        let capture = CaptureSink::new();
        let logger = logger_over(&capture).with_min_level(Level::WARN);
        let cx = LogContext::new();

        logger.info(&cx, "dropped", []).await.unwrap();
        logger.warn(&cx, "kept", []).await.unwrap();

        let records = capture.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "kept");
    }

    #[tokio::test]
    async fn context_attrs_reach_the_record() {
        let capture = CaptureSink::new();
        let logger = logger_over(&capture).named("svc");
        let cx = LogContext::new()
            .prepend(["request_id".into(), "r1".into()])
            .append(["elapsed_ms".into(), 12.into()]);

        logger.info(&cx, "done", []).await.unwrap();

        let record = &capture.records()[0];
        assert_eq!(record.message, "[svc] done");
        assert_eq!(
            record.attrs,
            vec![Attr::new("request_id", "r1"), Attr::new("elapsed_ms", 12)]
        );
    }

    #[tokio::test]
    async fn bad_args_degrade_instead_of_failing() {
        let capture = CaptureSink::new();
        let logger = logger_over(&capture);
        logger
            .info(&LogContext::new(), "m", ["onlykey".into()])
            .await
            .unwrap();
        assert_eq!(
            capture.records()[0].attrs,
            vec![Attr::new(crate::attrs::BAD_KEY, "onlykey")]
        );
    }
}
