//! The closed value model every expectation operates on.
//!
//! Tests hand arbitrary Rust data to [`expect`](crate::expect); the `From` impls in this
//! module (and [`Value::from_serialize`] for anything implementing `serde::Serialize`)
//! turn that data into a [`Value`]. Formatting, diffing and equality only ever look at
//! this enum, never at the host type.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;

use chrono::{DateTime, FixedOffset, TimeZone};
use im::OrdMap;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A dynamically typed datum under test.
///
/// Containers carry an `Option`: `None` marks an *absent* container (a nil list or map),
/// which is distinct from an empty one for equality but equivalent to every other
/// absent value for [`Value::is_absent`].
///
/// # Examples
///
/// ```rust
/// use expecto::Value;
/// let n = Value::from(3.5);
/// assert_eq!(n.type_name(), "float64");
/// let s = Value::from("hello");
/// assert_eq!(s.type_name(), "string");
/// let nil = Value::default();
/// assert!(nil.is_absent());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float32(f32),
    Float(f64),
    Text(String),
    Temporal(DateTime<FixedOffset>),
    /// An error-like value; `None` is the nil error.
    Error(Option<String>),
    /// Raw bytes. Snapshots write these verbatim.
    Bytes(Vec<u8>),
    Sequence(Option<Vec<Value>>),
    Mapping(Option<OrdMap<String, Value>>),
    Queue(Option<Vec<Value>>),
    Record(Record),
    Reference(Option<Box<Value>>),
    /// An executable member. It has no structured form, so any container holding one
    /// falls back to its plain textual rendering.
    Function(String),
}

/// A labeled record: a type name plus its fields in declaration order.
///
/// # Examples
///
/// ```rust
/// use expecto::{Record, Value};
/// let user = Value::from(Record::new("User").field("name", "ada").field("age", 36));
/// assert_eq!(user.type_name(), "User");
/// ```
#[derive(Debug, Clone)]
pub struct Record {
    name: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field, keeping declaration order.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    fn sorted_fields(&self) -> Vec<&(String, Value)> {
        let mut fields: Vec<_> = self.fields.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        fields
    }
}

/// Records are equal by name and field content, whatever order the fields were added in.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.fields.len() == other.fields.len()
            && self.sorted_fields() == other.sorted_fields()
    }
}

impl Value {
    /// Wraps raw bytes.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(bytes.into())
    }

    /// Wraps anything error-like by its message.
    pub fn error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        Value::Error(Some(err.to_string()))
    }

    /// The nil error.
    pub fn nil_error() -> Self {
        Value::Error(None)
    }

    /// Builds a queue from its pending elements.
    pub fn queue<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::Queue(Some(items.into_iter().map(Into::into).collect()))
    }

    /// An executable member, named for display.
    pub fn function(name: impl Into<String>) -> Self {
        Value::Function(name.into())
    }

    /// Converts any serializable host value through its JSON data model.
    ///
    /// Objects become mappings (so their keys are displayed sorted), arrays become
    /// sequences and integers keep their signedness.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use expecto::Value;
    /// let v = Value::from_serialize(&vec![1, 2]).unwrap();
    /// assert_eq!(v, Value::from(vec![1_u64, 2]));
    /// ```
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Value> {
        serde_json::to_value(value).map(Value::from_json)
    }

    fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Value::Uint(u)
                } else if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(Some(items.into_iter().map(Value::from_json).collect()))
            }
            serde_json::Value::Object(entries) => Value::Mapping(Some(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            )),
        }
    }

    /// Returns the dynamic type name used in type-mismatch reports.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float32(_) => "float32",
            Value::Float(_) => "float64",
            Value::Text(_) => "string",
            Value::Temporal(_) => "datetime",
            Value::Error(_) => "error",
            Value::Bytes(_) => "bytes",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
            Value::Queue(_) => "queue",
            Value::Record(r) => r.name(),
            Value::Reference(_) => "reference",
            Value::Function(_) => "function",
        }
    }

    /// True for every value meaning "nothing here": the literal nil, the nil error, an
    /// absent reference and the absent sequence, mapping and queue. All of them are
    /// interchangeable for equality purposes. A reference to an absent value is absent
    /// too.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use expecto::Value;
    /// assert!(Value::Null.is_absent());
    /// assert!(Value::from(None::<i32>).is_absent());
    /// assert!(Value::Sequence(None).is_absent());
    /// assert!(!Value::Sequence(Some(vec![])).is_absent());
    /// ```
    pub fn is_absent(&self) -> bool {
        match self {
            Value::Reference(Some(inner)) => inner.is_absent(),
            _ => matches!(
                self,
                Value::Null
                    | Value::Error(None)
                    | Value::Reference(None)
                    | Value::Sequence(None)
                    | Value::Mapping(None)
                    | Value::Queue(None)
            ),
        }
    }

    /// True when both values have the same dynamic type.
    pub fn same_type(&self, other: &Value) -> bool {
        self.type_name() == other.type_name()
    }

    /// Number of elements for sized kinds. Strings count Unicode code points.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Text(s) => Some(s.chars().count()),
            Value::Bytes(b) => Some(b.len()),
            Value::Sequence(items) | Value::Queue(items) => {
                Some(items.as_ref().map_or(0, Vec::len))
            }
            Value::Mapping(entries) => Some(entries.as_ref().map_or(0, OrdMap::len)),
            _ => None,
        }
    }

    /// Whether a sized value has no elements. `None` for unsized kinds.
    pub fn is_empty(&self) -> Option<bool> {
        self.len().map(|n| n == 0)
    }

    /// Normalizes any numeric kind to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Uint(u) => Some(*u as f64),
            Value::Float32(f) => Some(f64::from(*f)),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// True for kinds that support positional access.
    pub(crate) fn is_indexable(&self) -> bool {
        matches!(self, Value::Sequence(_) | Value::Text(_) | Value::Bytes(_))
    }

    /// Element at `index`. Strings are indexed by code point and yield a
    /// one-character string.
    pub(crate) fn element(&self, index: usize) -> Option<Value> {
        match self {
            Value::Sequence(items) => items.as_ref()?.get(index).cloned(),
            Value::Bytes(b) => b.get(index).map(|byte| Value::Uint(u64::from(*byte))),
            Value::Text(s) => s.chars().nth(index).map(|c| Value::Text(c.to_string())),
            _ => None,
        }
    }
}

/// Renders an instant as RFC 3339 with nanosecond precision, trimming trailing zeros of
/// the fraction and using `Z` for a zero offset.
pub(crate) fn format_temporal(t: &DateTime<FixedOffset>) -> String {
    let mut out = t.format("%Y-%m-%dT%H:%M:%S").to_string();
    let nanos = t.timestamp_subsec_nanos();
    if nanos > 0 {
        let fraction = format!("{:09}", nanos);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    if t.offset().local_minus_utc() == 0 {
        out.push('Z');
    } else {
        out.push_str(&t.format("%:z").to_string());
    }
    out
}

// ------------------------------------------------------------------------
// Default textual form
// ------------------------------------------------------------------------

impl Value {
    fn fmt_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null | Value::Error(None) => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}", u),
            Value::Float32(x) => write!(f, "{}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Temporal(t) => write!(f, "{}", format_temporal(t)),
            Value::Error(Some(message)) => write!(f, "{}", message),
            Value::Bytes(bytes) => {
                write!(f, "[")?;
                for (i, b) in bytes.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", b)?;
                }
                write!(f, "]")
            }
            Value::Sequence(items) | Value::Queue(items) => {
                Value::fmt_items(f, items.as_deref().unwrap_or_default())
            }
            Value::Mapping(entries) => {
                write!(f, "map[")?;
                if let Some(entries) = entries {
                    for (i, (k, v)) in entries.iter().enumerate() {
                        if i > 0 {
                            write!(f, " ")?;
                        }
                        write!(f, "{}:{}", k, v)?;
                    }
                }
                write!(f, "]")
            }
            Value::Record(record) => {
                write!(f, "{{")?;
                for (i, (_, v)) in record.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "}}")
            }
            Value::Reference(None) => write!(f, "<nil>"),
            Value::Reference(Some(inner)) => write!(f, "&{}", inner),
            Value::Function(name) => write!(f, "<func {}>", name),
        }
    }
}

// ------------------------------------------------------------------------
// Structured form
// ------------------------------------------------------------------------

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null
            | Value::Error(None)
            | Value::Reference(None)
            | Value::Sequence(None)
            | Value::Mapping(None)
            | Value::Queue(None) => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Uint(u) => serializer.serialize_u64(*u),
            Value::Float32(x) => serializer.serialize_f32(*x),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Temporal(t) => serializer.serialize_str(&format_temporal(t)),
            Value::Error(Some(message)) => serializer.serialize_str(message),
            Value::Bytes(bytes) => {
                let mut seq = serializer.serialize_seq(Some(bytes.len()))?;
                for b in bytes {
                    seq.serialize_element(b)?;
                }
                seq.end()
            }
            Value::Sequence(Some(items)) | Value::Queue(Some(items)) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Mapping(Some(entries)) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Record(record) => {
                let mut fields: Vec<&(String, Value)> = record.fields.iter().collect();
                fields.sort_by(|a, b| a.0.cmp(&b.0));
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Reference(Some(inner)) => inner.serialize(serializer),
            Value::Function(name) => Err(S::Error::custom(format!(
                "function `{}` has no structured form",
                name
            ))),
        }
    }
}

// ============================================================================
// HOST ADAPTERS
// ============================================================================

macro_rules! from_via {
    ($variant:ident, $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for Value {
                fn from(v: $source) -> Self {
                    Value::$variant(<$target>::from(v))
                }
            }
        )+
    };
}

from_via!(Int, i64: i8, i16, i32, i64);
from_via!(Uint, u64: u8, u16, u32, u64);

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Uint(v as u64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(v: DateTime<Tz>) -> Self {
        Value::Temporal(v.fixed_offset())
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Record(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Sequence(Some(v.into_iter().map(Into::into).collect()))
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(v: &[T]) -> Self {
        Value::Sequence(Some(v.iter().cloned().map(Into::into).collect()))
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::Sequence(Some(v.into_iter().map(Into::into).collect()))
    }
}

impl<T: Into<Value>> From<VecDeque<T>> for Value {
    fn from(v: VecDeque<T>) -> Self {
        Value::queue(v)
    }
}

/// `Option` is the nilable reference: `None` is the absent reference.
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        Value::Reference(v.map(|inner| Box::new(inner.into())))
    }
}

impl<K: Into<String>, V: Into<Value>, S> From<HashMap<K, V, S>> for Value {
    fn from(v: HashMap<K, V, S>) -> Self {
        Value::Mapping(Some(
            v.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ))
    }
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(v: BTreeMap<K, V>) -> Self {
        Value::Mapping(Some(
            v.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ))
    }
}
