use std::collections::BTreeMap;

use crate::model::{GeoPoint, Timestamp};
use crate::value::{
    ArrayValue, BsonBinaryData, BsonObjectId, BsonTimestamp, BytesValue, Decimal128Value, MapValue,
    RegexValue,
};

/// A single field value. Exactly one variant is active; values are
/// immutable once constructed.
#[derive(Clone, Debug, PartialEq)]
pub struct FirestoreValue {
    kind: ValueKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ValueKind {
    Null,
    Boolean(bool),
    Integer(i64),
    Int32(i32),
    Double(f64),
    Decimal128(Decimal128Value),
    Timestamp(Timestamp),
    BsonTimestamp(BsonTimestamp),
    String(String),
    Bytes(BytesValue),
    BsonBinary(BsonBinaryData),
    Reference(String),
    ObjectId(BsonObjectId),
    GeoPoint(GeoPoint),
    Regex(RegexValue),
    Array(ArrayValue),
    Map(MapValue),
    MinKey,
    MaxKey,
}

/// The arithmetic domain: 64-bit integers and IEEE doubles. `Int32`
/// widens losslessly; `Decimal128` deliberately does not participate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Numeric {
    Integer(i64),
    Double(f64),
}

impl Numeric {
    pub fn as_f64(self) -> f64 {
        match self {
            Numeric::Integer(value) => value as f64,
            Numeric::Double(value) => value,
        }
    }
}

impl FirestoreValue {
    pub fn null() -> Self {
        Self {
            kind: ValueKind::Null,
        }
    }

    pub fn from_bool(value: bool) -> Self {
        Self {
            kind: ValueKind::Boolean(value),
        }
    }

    pub fn from_integer(value: i64) -> Self {
        Self {
            kind: ValueKind::Integer(value),
        }
    }

    pub fn from_int32(value: i32) -> Self {
        Self {
            kind: ValueKind::Int32(value),
        }
    }

    pub fn from_double(value: f64) -> Self {
        Self {
            kind: ValueKind::Double(value),
        }
    }

    pub fn from_decimal128(value: Decimal128Value) -> Self {
        Self {
            kind: ValueKind::Decimal128(value),
        }
    }

    pub fn from_timestamp(value: Timestamp) -> Self {
        Self {
            kind: ValueKind::Timestamp(value),
        }
    }

    pub fn from_bson_timestamp(value: BsonTimestamp) -> Self {
        Self {
            kind: ValueKind::BsonTimestamp(value),
        }
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::String(value.into()),
        }
    }

    pub fn from_bytes(value: BytesValue) -> Self {
        Self {
            kind: ValueKind::Bytes(value),
        }
    }

    pub fn from_bson_binary(value: BsonBinaryData) -> Self {
        Self {
            kind: ValueKind::BsonBinary(value),
        }
    }

    pub fn from_reference(path: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::Reference(path.into()),
        }
    }

    pub fn from_object_id(value: BsonObjectId) -> Self {
        Self {
            kind: ValueKind::ObjectId(value),
        }
    }

    pub fn from_geo_point(value: GeoPoint) -> Self {
        Self {
            kind: ValueKind::GeoPoint(value),
        }
    }

    pub fn from_regex(value: RegexValue) -> Self {
        Self {
            kind: ValueKind::Regex(value),
        }
    }

    pub fn from_array(values: Vec<FirestoreValue>) -> Self {
        Self {
            kind: ValueKind::Array(ArrayValue::new(values)),
        }
    }

    pub fn from_map(map: BTreeMap<String, FirestoreValue>) -> Self {
        Self {
            kind: ValueKind::Map(MapValue::new(map)),
        }
    }

    pub fn from_map_value(map: MapValue) -> Self {
        Self {
            kind: ValueKind::Map(map),
        }
    }

    pub fn min_key() -> Self {
        Self {
            kind: ValueKind::MinKey,
        }
    }

    pub fn max_key() -> Self {
        Self {
            kind: ValueKind::MaxKey,
        }
    }

    pub fn nan() -> Self {
        Self::from_double(f64::NAN)
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, ValueKind::Null)
    }

    pub fn is_nan(&self) -> bool {
        match &self.kind {
            ValueKind::Double(value) => value.is_nan(),
            ValueKind::Decimal128(value) => value.to_double().is_some_and(f64::is_nan),
            _ => false,
        }
    }

    /// The value as an arithmetic operand, if it is one.
    pub fn as_numeric(&self) -> Option<Numeric> {
        match &self.kind {
            ValueKind::Integer(value) => Some(Numeric::Integer(*value)),
            ValueKind::Int32(value) => Some(Numeric::Integer(*value as i64)),
            ValueKind::Double(value) => Some(Numeric::Double(*value)),
            _ => None,
        }
    }

    /// Whether the value belongs to the numeric type class for comparison
    /// purposes (wider than [`FirestoreValue::as_numeric`]).
    pub fn is_number(&self) -> bool {
        matches!(
            self.kind,
            ValueKind::Integer(_)
                | ValueKind::Int32(_)
                | ValueKind::Double(_)
                | ValueKind::Decimal128(_)
        )
    }

    /// Short name of the value's type class, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            ValueKind::Null => "null",
            ValueKind::Boolean(_) => "boolean",
            ValueKind::Integer(_) => "integer",
            ValueKind::Int32(_) => "int32",
            ValueKind::Double(_) => "double",
            ValueKind::Decimal128(_) => "decimal128",
            ValueKind::Timestamp(_) => "timestamp",
            ValueKind::BsonTimestamp(_) => "bson_timestamp",
            ValueKind::String(_) => "string",
            ValueKind::Bytes(_) => "bytes",
            ValueKind::BsonBinary(_) => "bson_binary",
            ValueKind::Reference(_) => "reference",
            ValueKind::ObjectId(_) => "object_id",
            ValueKind::GeoPoint(_) => "geo_point",
            ValueKind::Regex(_) => "regex",
            ValueKind::Array(_) => "array",
            ValueKind::Map(_) => "map",
            ValueKind::MinKey => "min_key",
            ValueKind::MaxKey => "max_key",
        }
    }
}

impl From<bool> for FirestoreValue {
    fn from(value: bool) -> Self {
        FirestoreValue::from_bool(value)
    }
}

impl From<i32> for FirestoreValue {
    fn from(value: i32) -> Self {
        FirestoreValue::from_integer(value as i64)
    }
}

impl From<i64> for FirestoreValue {
    fn from(value: i64) -> Self {
        FirestoreValue::from_integer(value)
    }
}

impl From<f64> for FirestoreValue {
    fn from(value: f64) -> Self {
        FirestoreValue::from_double(value)
    }
}

impl From<&str> for FirestoreValue {
    fn from(value: &str) -> Self {
        FirestoreValue::from_string(value)
    }
}

impl From<String> for FirestoreValue {
    fn from(value: String) -> Self {
        FirestoreValue::from_string(value)
    }
}

impl From<Timestamp> for FirestoreValue {
    fn from(value: Timestamp) -> Self {
        FirestoreValue::from_timestamp(value)
    }
}

impl From<GeoPoint> for FirestoreValue {
    fn from(value: GeoPoint) -> Self {
        FirestoreValue::from_geo_point(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_basic_values() {
        let value = FirestoreValue::from_string("hello");
        match value.kind() {
            ValueKind::String(inner) => assert_eq!(inner, "hello"),
            _ => panic!("unexpected kind"),
        }
    }

    #[test]
    fn int32_widens_to_numeric() {
        let value = FirestoreValue::from_int32(7);
        assert_eq!(value.as_numeric(), Some(Numeric::Integer(7)));
    }

    #[test]
    fn decimal_is_number_but_not_arithmetic() {
        let value = FirestoreValue::from_decimal128(Decimal128Value::new("1.5"));
        assert!(value.is_number());
        assert_eq!(value.as_numeric(), None);
    }
}
