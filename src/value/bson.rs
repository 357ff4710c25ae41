//! BSON interop value types.
//!
//! Databases provisioned with MongoDB compatibility surface a handful of
//! BSON-only types alongside the native ones. They participate in the
//! backend's total order (see `value::compare`) but are otherwise opaque
//! payloads to the evaluator.

/// A BSON object id, carried as its 24-character hex rendering.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BsonObjectId {
    value: String,
}

impl BsonObjectId {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A BSON regular expression: pattern plus option flags (e.g. `"i"`).
/// The evaluator never executes these; they are data, ordered by pattern
/// and then options.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegexValue {
    pattern: String,
    options: String,
}

impl RegexValue {
    pub fn new(pattern: impl Into<String>, options: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            options: options.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn options(&self) -> &str {
        &self.options
    }
}

/// A BSON internal timestamp: seconds since the epoch plus an ordinal
/// increment. Distinct from [`crate::model::Timestamp`] and ordered after
/// it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BsonTimestamp {
    seconds: u32,
    increment: u32,
}

impl BsonTimestamp {
    pub fn new(seconds: u32, increment: u32) -> Self {
        Self { seconds, increment }
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn increment(&self) -> u32 {
        self.increment
    }
}

/// BSON binary data: a one-byte subtype tag plus the payload. Ordered by
/// subtype first, then bytes, which keeps it distinct from plain bytes
/// values.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BsonBinaryData {
    subtype: u8,
    bytes: Vec<u8>,
}

impl BsonBinaryData {
    pub fn from_bytes(subtype: u8, bytes: Vec<u8>) -> Self {
        Self { subtype, bytes }
    }

    pub fn subtype(&self) -> u8 {
        self.subtype
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// A 128-bit decimal, carried as its string rendering.
///
/// Comparisons against other numeric types go through an f64
/// approximation, which is exact for the integral and short-decimal values
/// the client produces; full 34-digit precision is a backend concern.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Decimal128Value {
    value: String,
}

impl Decimal128Value {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The numeric magnitude, or `None` for an unparseable rendering.
    /// `NaN` and signed `Infinity` parse to their IEEE counterparts.
    pub fn to_double(&self) -> Option<f64> {
        self.value.trim().parse::<f64>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bson_timestamp_orders_by_seconds_then_increment() {
        assert!(BsonTimestamp::new(1, 2) < BsonTimestamp::new(2, 0));
        assert!(BsonTimestamp::new(1, 1) < BsonTimestamp::new(1, 2));
    }

    #[test]
    fn binary_orders_by_subtype_first() {
        let smaller = BsonBinaryData::from_bytes(1, vec![9, 9, 9]);
        let larger = BsonBinaryData::from_bytes(2, vec![1, 2, 2]);
        assert!(smaller < larger);
    }

    #[test]
    fn decimal_parses_scientific_notation() {
        assert_eq!(Decimal128Value::new("1.2e3").to_double(), Some(1200.0));
        assert!(Decimal128Value::new("NaN").to_double().unwrap().is_nan());
        assert_eq!(Decimal128Value::new("bogus").to_double(), None);
    }
}
