use crate::attrs::{args_to_attrs, Arg, Attr};
use std::sync::Arc;

/// Call-chain-scoped attributes, threaded explicitly through logging calls.
///
/// `LogContext` carries two independent ordered lists:
///
/// - *prepended* attributes land at the very front of every record composed
///   under this context, outside any open group;
/// - *appended* attributes land at the end, inside whatever group the
///   emitting logger currently has open.
///
/// Contexts are immutable: [`prepend`](Self::prepend) and
/// [`append`](Self::append) grow a private copy and return a new context,
/// so a clone taken earlier keeps observing its original (shorter) lists
/// even while descendants are extended on other threads.
///
/// # Example
///
/// ```
/// use logweave::context::LogContext;
/// use logweave::attrs::Arg;
///
/// let cx = LogContext::new()
///     .prepend([Arg::from("request_id"), Arg::from("abc-123")])
///     .append([Arg::from("duration_ms"), Arg::from(100)]);
/// assert_eq!(cx.prepended().len(), 1);
/// assert_eq!(cx.appended().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LogContext {
    prepended: Option<Arc<Vec<Attr>>>,
    appended: Option<Arc<Vec<Attr>>>,
}

impl LogContext {
    pub fn new() -> Self {
        LogContext::default()
    }

    /// Return a context whose prepended list is extended with `args`,
    /// converted with the usual key-value pairing rules.
    pub fn prepend(&self, args: impl IntoIterator<Item = Arg>) -> LogContext {
        let mut list = self.prepended.as_deref().cloned().unwrap_or_default();
        list.extend(args_to_attrs(args));
        LogContext {
            prepended: Some(Arc::new(list)),
            appended: self.appended.clone(),
        }
    }

    /// Return a context whose appended list is extended with `args`.
    pub fn append(&self, args: impl IntoIterator<Item = Arg>) -> LogContext {
        let mut list = self.appended.as_deref().cloned().unwrap_or_default();
        list.extend(args_to_attrs(args));
        LogContext {
            prepended: self.prepended.clone(),
            appended: Some(Arc::new(list)),
        }
    }

    /// Attributes to surface at the front of composed records.
    pub fn prepended(&self) -> &[Attr] {
        self.prepended.as_deref().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Attributes to surface at the end of composed records.
    pub fn appended(&self) -> &[Attr] {
        self.appended.as_deref().map(Vec::as_slice).unwrap_or(&[])
    }
}
