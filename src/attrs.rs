use serde::ser::{Serialize, SerializeMap, Serializer};

/// Key used when a logging argument cannot be paired with a proper key.
///
/// A lone trailing string, or a non-string value in key position, degrades
/// into an attribute under this key instead of being rejected.
pub const BAD_KEY: &str = "!BADKEY";

/// A single key-value attribute attached to a log record.
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Attr {
            key: key.into(),
            value: value.into(),
        }
    }

    /// An attribute whose value is a named group of nested attributes.
    pub fn group(key: impl Into<String>, attrs: Vec<Attr>) -> Self {
        Attr {
            key: key.into(),
            value: Value::Group(attrs),
        }
    }
}

/// Attribute value.
///
/// `Group` holds nested attributes produced by group scoping; `Json` is an
/// escape hatch for structured values that don't fit the scalar variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Group(Vec<Attr>),
    Json(serde_json::Value),
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Vec<Attr>> for Value {
    fn from(v: Vec<Attr>) -> Self {
        Value::Group(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Str(v) => serializer.serialize_str(v),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Uint(v) => serializer.serialize_u64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Group(attrs) => serialize_attr_map(attrs, serializer),
            Value::Json(v) => v.serialize(serializer),
        }
    }
}

/// Serialize a slice of attributes as a JSON map, preserving order.
pub(crate) fn serialize_attr_map<S: Serializer>(
    attrs: &[Attr],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(attrs.len()))?;
    for attr in attrs {
        map.serialize_entry(&attr.key, &attr.value)?;
    }
    map.end()
}

/// One element of a variadic logging argument list.
///
/// Mirrors the loose argument forms accepted by `Logger::log` and
/// `LogContext::prepend`/`append`: a ready-made [`Attr`] is used as-is,
/// while bare values are paired up by [`args_to_attrs`].
#[derive(Debug, Clone)]
pub enum Arg {
    Attr(Attr),
    Value(Value),
}

impl Arg {
    fn into_value(self) -> Value {
        match self {
            Arg::Value(v) => v,
            // An attribute in value position keeps its structure as a
            // single-entry group rather than being flattened away.
            Arg::Attr(a) => Value::Group(vec![a]),
        }
    }
}

impl From<Attr> for Arg {
    fn from(a: Attr) -> Self {
        Arg::Attr(a)
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Value(v)
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Value(v.into())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Value(v.into())
    }
}

impl From<i32> for Arg {
    fn from(v: i32) -> Self {
        Arg::Value(v.into())
    }
}

impl From<i64> for Arg {
    fn from(v: i64) -> Self {
        Arg::Value(v.into())
    }
}

impl From<u64> for Arg {
    fn from(v: u64) -> Self {
        Arg::Value(v.into())
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Value(v.into())
    }
}

impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Arg::Value(v.into())
    }
}

impl From<serde_json::Value> for Arg {
    fn from(v: serde_json::Value) -> Self {
        Arg::Value(v.into())
    }
}

/// Convert a loose argument list into attributes, left to right.
///
/// - A ready-made [`Attr`] is used directly.
/// - A string with at least one argument after it consumes that argument
///   as its value, forming a key-value pair.
/// - A lone trailing string becomes `{BAD_KEY: string}`.
/// - Any other value in key position becomes `{BAD_KEY: value}`.
pub fn args_to_attrs(args: impl IntoIterator<Item = Arg>) -> Vec<Attr> {
    let mut attrs = Vec::new();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg {
            Arg::Attr(a) => attrs.push(a),
            Arg::Value(Value::Str(key)) => match iter.next() {
                Some(value) => attrs.push(Attr::new(key, value.into_value())),
                None => attrs.push(Attr::new(BAD_KEY, Value::Str(key))),
            },
            Arg::Value(v) => attrs.push(Attr::new(BAD_KEY, v)),
        }
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_string_keys_with_values() {
        let attrs = args_to_attrs([Arg::from("status"), Arg::from(200), Arg::from("ok"), Arg::from(true)]);
        assert_eq!(
            attrs,
            vec![Attr::new("status", 200), Attr::new("ok", true)]
        );
    }

    #[test]
    fn ready_made_attrs_pass_through() {
        let attrs = args_to_attrs([
            Arg::from(Attr::new("a", 1)),
            Arg::from("b"),
            Arg::from(2),
        ]);
        assert_eq!(attrs, vec![Attr::new("a", 1), Attr::new("b", 2)]);
    }

    #[test]
    fn lone_trailing_string_gets_bad_key() {
        let attrs = args_to_attrs([Arg::from("onlykey")]);
        assert_eq!(attrs, vec![Attr::new(BAD_KEY, "onlykey")]);
    }

    #[test]
    fn non_string_key_gets_bad_key() {
        let attrs = args_to_attrs([Arg::from(42), Arg::from("k"), Arg::from("v")]);
        assert_eq!(
            attrs,
            vec![Attr::new(BAD_KEY, 42), Attr::new("k", "v")]
        );
    }

    #[test]
    fn group_value_serializes_as_nested_map() {
        let attr = Attr::group("http", vec![Attr::new("method", "GET"), Attr::new("status", 200)]);
        let json = serde_json::to_string(&attr.value).unwrap();
        assert_eq!(json, r#"{"method":"GET","status":200}"#);
    }
}
