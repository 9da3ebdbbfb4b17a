use indexmap::IndexMap;
use serde::{ser::SerializeMap, Serialize, Serializer};

/// The temporal types the database driver constructs natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalKind {
    DateTime,
    LocalDateTime,
    Date,
    Time,
    LocalTime,
    Duration,
}

impl TemporalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TemporalKind::DateTime => "DateTime",
            TemporalKind::LocalDateTime => "LocalDateTime",
            TemporalKind::Date => "Date",
            TemporalKind::Time => "Time",
            TemporalKind::LocalTime => "LocalTime",
            TemporalKind::Duration => "Duration",
        }
    }
}

/// A parameter value sent to the database together with the statement.
///
/// Integers and floats are kept apart so the driver can send 64-bit integers
/// without a round trip through `f64`, and temporal values keep their kind so
/// the driver uses its typed constructors instead of plain strings.
#[derive(Debug, Clone, PartialEq)]
pub enum CypherValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<CypherValue>),
    Map(IndexMap<String, CypherValue>),
    Temporal(TemporalKind, String),
}

impl CypherValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CypherValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CypherValue::String(s) => Some(s),
            CypherValue::Temporal(_, s) => Some(s),
            _ => None,
        }
    }
}

impl Serialize for CypherValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            CypherValue::Null => serializer.serialize_unit(),
            CypherValue::Boolean(value) => serializer.serialize_bool(*value),
            CypherValue::Integer(value) => serializer.serialize_i64(*value),
            CypherValue::Float(value) => serializer.serialize_f64(*value),
            CypherValue::String(value) => serializer.serialize_str(value),
            CypherValue::List(values) => values.serialize(serializer),
            CypherValue::Map(values) => values.serialize(serializer),
            CypherValue::Temporal(kind, value) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(kind.as_str(), value)?;
                map.end()
            }
        }
    }
}

impl From<bool> for CypherValue {
    fn from(value: bool) -> Self {
        CypherValue::Boolean(value)
    }
}

impl From<i64> for CypherValue {
    fn from(value: i64) -> Self {
        CypherValue::Integer(value)
    }
}

impl From<f64> for CypherValue {
    fn from(value: f64) -> Self {
        CypherValue::Float(value)
    }
}

impl From<&str> for CypherValue {
    fn from(value: &str) -> Self {
        CypherValue::String(value.to_string())
    }
}

impl From<String> for CypherValue {
    fn from(value: String) -> Self {
        CypherValue::String(value)
    }
}

impl<T> From<Vec<T>> for CypherValue
where
    T: Into<CypherValue>,
{
    fn from(values: Vec<T>) -> Self {
        CypherValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, CypherValue>> for CypherValue {
    fn from(values: IndexMap<String, CypherValue>) -> Self {
        CypherValue::Map(values)
    }
}

impl<T> From<Option<T>> for CypherValue
where
    T: Into<CypherValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CypherValue::Null)
    }
}
