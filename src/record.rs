use crate::attrs::Attr;
use crate::level::Level;
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Source location of the logging call, when known.
///
/// The core never captures this itself; producers (such as the tracing
/// bridge) fill it in from whatever metadata they already have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Caller {
    pub file: &'static str,
    pub line: u32,
}

/// A single emitted log event.
///
/// Records are built fresh per emission and never mutated after
/// composition; `Clone` copies the attribute list, so every fan-out branch
/// gets its own independent copy.
#[derive(Debug, Clone)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub attrs: Vec<Attr>,
    pub caller: Option<Caller>,
}

impl Record {
    /// Create a record stamped with the current time and no attributes.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Record {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            attrs: Vec::new(),
            caller: None,
        }
    }

    /// Append attributes in order.
    pub fn add_attrs(&mut self, attrs: impl IntoIterator<Item = Attr>) {
        self.attrs.extend(attrs);
    }
}

impl Serialize for Record {
    /// Flattened JSON form: `time`, `level`, `msg`, optional `caller`,
    /// then every attribute as a top-level entry in order.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("time", &self.timestamp.to_rfc3339())?;
        map.serialize_entry("level", &self.level)?;
        map.serialize_entry("msg", &self.message)?;
        if let Some(caller) = &self.caller {
            map.serialize_entry("caller", caller)?;
        }
        for attr in &self.attrs {
            map.serialize_entry(&attr.key, &attr.value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::Attr;

    #[test]
    fn clone_is_independent() {
        let mut a = Record::new(Level::INFO, "hello");
        a.add_attrs([Attr::new("k", "v")]);
        let mut b = a.clone();
        b.add_attrs([Attr::new("extra", 1)]);
        assert_eq!(a.attrs.len(), 1);
        assert_eq!(b.attrs.len(), 2);
    }

    #[test]
    fn serializes_flat_with_attrs_in_order() {
        let mut r = Record::new(Level::ERROR, "boom");
        r.add_attrs([Attr::new("a", 1), Attr::group("g", vec![Attr::new("b", 2)])]);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["level"], "ERROR");
        assert_eq!(json["msg"], "boom");
        assert_eq!(json["a"], 1);
        assert_eq!(json["g"]["b"], 2);
    }
}
