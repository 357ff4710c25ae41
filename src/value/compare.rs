//! Cross-type collation and equality.
//!
//! The relative order of type classes is fixed by the backend protocol and
//! must not be re-derived:
//!
//! ```text
//! null < min_key < boolean < number < timestamp < bson_timestamp < string
//!      < bytes < bson_binary < reference < object_id < geo_point < regex
//!      < array < map < max_key
//! ```
//!
//! Integer, Int32, Double, and Decimal128 share the number band and
//! compare by mathematical value; NaN sorts below every other number. The
//! total order used for sorting treats NaN equal to NaN and -0.0 equal to
//! 0.0; the `equal` operator keeps IEEE NaN inequality (see
//! [`equals`]).

use std::cmp::Ordering;

use crate::value::{FirestoreValue, ValueKind};

pub(crate) const TYPE_ORDER_NULL: i32 = 0;
pub(crate) const TYPE_ORDER_MIN_KEY: i32 = 1;
pub(crate) const TYPE_ORDER_BOOLEAN: i32 = 2;
pub(crate) const TYPE_ORDER_NUMBER: i32 = 3;
pub(crate) const TYPE_ORDER_TIMESTAMP: i32 = 4;
pub(crate) const TYPE_ORDER_BSON_TIMESTAMP: i32 = 5;
pub(crate) const TYPE_ORDER_STRING: i32 = 6;
pub(crate) const TYPE_ORDER_BLOB: i32 = 7;
pub(crate) const TYPE_ORDER_BSON_BINARY: i32 = 8;
pub(crate) const TYPE_ORDER_REFERENCE: i32 = 9;
pub(crate) const TYPE_ORDER_OBJECT_ID: i32 = 10;
pub(crate) const TYPE_ORDER_GEOPOINT: i32 = 11;
pub(crate) const TYPE_ORDER_REGEX: i32 = 12;
pub(crate) const TYPE_ORDER_ARRAY: i32 = 13;
pub(crate) const TYPE_ORDER_MAP: i32 = 14;
pub(crate) const TYPE_ORDER_MAX_KEY: i32 = 15;

/// The backend's rank of the value's type class.
pub fn type_order(value: &FirestoreValue) -> i32 {
    match value.kind() {
        ValueKind::Null => TYPE_ORDER_NULL,
        ValueKind::MinKey => TYPE_ORDER_MIN_KEY,
        ValueKind::Boolean(_) => TYPE_ORDER_BOOLEAN,
        ValueKind::Integer(_)
        | ValueKind::Int32(_)
        | ValueKind::Double(_)
        | ValueKind::Decimal128(_) => TYPE_ORDER_NUMBER,
        ValueKind::Timestamp(_) => TYPE_ORDER_TIMESTAMP,
        ValueKind::BsonTimestamp(_) => TYPE_ORDER_BSON_TIMESTAMP,
        ValueKind::String(_) => TYPE_ORDER_STRING,
        ValueKind::Bytes(_) => TYPE_ORDER_BLOB,
        ValueKind::BsonBinary(_) => TYPE_ORDER_BSON_BINARY,
        ValueKind::Reference(_) => TYPE_ORDER_REFERENCE,
        ValueKind::ObjectId(_) => TYPE_ORDER_OBJECT_ID,
        ValueKind::GeoPoint(_) => TYPE_ORDER_GEOPOINT,
        ValueKind::Regex(_) => TYPE_ORDER_REGEX,
        ValueKind::Array(_) => TYPE_ORDER_ARRAY,
        ValueKind::Map(_) => TYPE_ORDER_MAP,
        ValueKind::MaxKey => TYPE_ORDER_MAX_KEY,
    }
}

/// Total order over all values, as used by sort stages, `distinct`, and
/// `logicalMinimum`/`logicalMaximum`.
pub fn compare(left: &FirestoreValue, right: &FirestoreValue) -> Ordering {
    let left_order = type_order(left);
    let right_order = type_order(right);
    if left_order != right_order {
        return left_order.cmp(&right_order);
    }

    match (left.kind(), right.kind()) {
        (ValueKind::Null, ValueKind::Null) => Ordering::Equal,
        (ValueKind::MinKey, ValueKind::MinKey) => Ordering::Equal,
        (ValueKind::MaxKey, ValueKind::MaxKey) => Ordering::Equal,
        (ValueKind::Boolean(a), ValueKind::Boolean(b)) => a.cmp(b),
        (ValueKind::Timestamp(a), ValueKind::Timestamp(b)) => a.cmp(b),
        (ValueKind::BsonTimestamp(a), ValueKind::BsonTimestamp(b)) => a.cmp(b),
        (ValueKind::String(a), ValueKind::String(b)) => a.cmp(b),
        (ValueKind::Bytes(a), ValueKind::Bytes(b)) => a.cmp(b),
        (ValueKind::BsonBinary(a), ValueKind::BsonBinary(b)) => a.cmp(b),
        (ValueKind::Reference(a), ValueKind::Reference(b)) => compare_references(a, b),
        (ValueKind::ObjectId(a), ValueKind::ObjectId(b)) => a.cmp(b),
        (ValueKind::GeoPoint(a), ValueKind::GeoPoint(b)) => {
            compare_partial(a.latitude(), b.latitude())
                .then_with(|| compare_partial(a.longitude(), b.longitude()))
        }
        (ValueKind::Regex(a), ValueKind::Regex(b)) => a.cmp(b),
        (ValueKind::Array(a), ValueKind::Array(b)) => {
            for (l, r) in a.values().iter().zip(b.values().iter()) {
                let ordering = compare(l, r);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a.len().cmp(&b.len())
        }
        (ValueKind::Map(a), ValueKind::Map(b)) => {
            // BTreeMap iterates in sorted key order, which is the order
            // the backend compares map entries in.
            for ((l_key, l_value), (r_key, r_value)) in a.fields().iter().zip(b.fields().iter()) {
                let key_ordering = l_key.cmp(r_key);
                if key_ordering != Ordering::Equal {
                    return key_ordering;
                }
                let value_ordering = compare(l_value, r_value);
                if value_ordering != Ordering::Equal {
                    return value_ordering;
                }
            }
            a.len().cmp(&b.len())
        }
        // Both sides are in the number band.
        _ => compare_numbers(left, right),
    }
}

/// Equality as the `equal` operator and membership tests define it:
/// numeric values compare across representations, NaN equals nothing,
/// and null equals null (the evaluator handles top-level null operands
/// before calling this).
pub fn equals(left: &FirestoreValue, right: &FirestoreValue) -> bool {
    if left.is_nan() || right.is_nan() {
        return false;
    }

    let left_order = type_order(left);
    if left_order != type_order(right) {
        return false;
    }

    match (left.kind(), right.kind()) {
        (ValueKind::Array(a), ValueKind::Array(b)) => {
            a.len() == b.len()
                && a.values()
                    .iter()
                    .zip(b.values().iter())
                    .all(|(l, r)| equals(l, r))
        }
        (ValueKind::Map(a), ValueKind::Map(b)) => {
            a.len() == b.len()
                && a.fields()
                    .iter()
                    .all(|(key, l)| b.get(key).is_some_and(|r| equals(l, r)))
        }
        _ if left_order == TYPE_ORDER_NUMBER => compare_numbers(left, right) == Ordering::Equal,
        _ => left == right,
    }
}

fn compare_numbers(left: &FirestoreValue, right: &FirestoreValue) -> Ordering {
    let left_nan = left.is_nan() || unparseable_decimal(left);
    let right_nan = right.is_nan() || unparseable_decimal(right);
    match (left_nan, right_nan) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    match (number_operand(left), number_operand(right)) {
        (NumberOperand::Integer(a), NumberOperand::Integer(b)) => a.cmp(&b),
        (NumberOperand::Double(a), NumberOperand::Double(b)) => compare_partial(a, b),
        (NumberOperand::Integer(a), NumberOperand::Double(b)) => compare_i64_f64(a, b),
        (NumberOperand::Double(a), NumberOperand::Integer(b)) => compare_i64_f64(b, a).reverse(),
    }
}

enum NumberOperand {
    Integer(i64),
    Double(f64),
}

fn number_operand(value: &FirestoreValue) -> NumberOperand {
    match value.kind() {
        ValueKind::Integer(v) => NumberOperand::Integer(*v),
        ValueKind::Int32(v) => NumberOperand::Integer(*v as i64),
        ValueKind::Double(v) => NumberOperand::Double(*v),
        ValueKind::Decimal128(v) => NumberOperand::Double(v.to_double().unwrap_or(f64::NAN)),
        _ => unreachable!("compare_numbers called on non-number"),
    }
}

fn unparseable_decimal(value: &FirestoreValue) -> bool {
    matches!(value.kind(), ValueKind::Decimal128(d) if d.to_double().is_none())
}

fn compare_partial(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Exact comparison of an i64 against an f64. Going through `as f64` on
/// both sides would lose precision above 2^53.
fn compare_i64_f64(left: i64, right: f64) -> Ordering {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if right >= TWO_POW_63 {
        return Ordering::Less;
    }
    if right < -TWO_POW_63 {
        return Ordering::Greater;
    }
    let truncated = right.trunc();
    // In-range integral doubles convert exactly.
    let truncated_int = truncated as i64;
    match left.cmp(&truncated_int) {
        Ordering::Equal => {
            let fraction = right - truncated;
            if fraction > 0.0 {
                Ordering::Less
            } else if fraction < 0.0 {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        }
        ordering => ordering,
    }
}

fn compare_references(left: &str, right: &str) -> Ordering {
    let mut left_segments = left.split('/');
    let mut right_segments = right.split('/');
    loop {
        match (left_segments.next(), right_segments.next()) {
            (Some(l), Some(r)) => match l.cmp(r) {
                Ordering::Equal => continue,
                ordering => return ordering,
            },
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (None, None) => return Ordering::Equal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{BsonBinaryData, BsonObjectId, BsonTimestamp, Decimal128Value, RegexValue};

    #[test]
    fn cross_representation_numeric_equality() {
        assert!(equals(
            &FirestoreValue::from_integer(1),
            &FirestoreValue::from_double(1.0)
        ));
        assert!(equals(
            &FirestoreValue::from_int32(1),
            &FirestoreValue::from_integer(1)
        ));
        assert!(equals(
            &FirestoreValue::from_decimal128(Decimal128Value::new("-0.0")),
            &FirestoreValue::from_int32(0)
        ));
    }

    #[test]
    fn nan_equals_nothing_but_sorts_smallest() {
        let nan = FirestoreValue::nan();
        assert!(!equals(&nan, &nan));
        assert_eq!(compare(&nan, &nan), Ordering::Equal);
        assert_eq!(
            compare(&nan, &FirestoreValue::from_double(f64::NEG_INFINITY)),
            Ordering::Less
        );
    }

    #[test]
    fn large_integers_compare_exactly_against_doubles() {
        let max = FirestoreValue::from_integer(i64::MAX);
        let near_max = FirestoreValue::from_double(9.223372036854776e18);
        assert_eq!(compare(&max, &near_max), Ordering::Less);
        let exact = FirestoreValue::from_double((1i64 << 60) as f64);
        assert_eq!(
            compare(&FirestoreValue::from_integer(1i64 << 60), &exact),
            Ordering::Equal
        );
    }

    #[test]
    fn type_ranks_follow_backend_contract() {
        let ascending = [
            FirestoreValue::null(),
            FirestoreValue::min_key(),
            FirestoreValue::from_bool(true),
            FirestoreValue::from_integer(7),
            FirestoreValue::from_timestamp(crate::model::Timestamp::new(1, 0)),
            FirestoreValue::from_bson_timestamp(BsonTimestamp::new(1, 1)),
            FirestoreValue::from_string("a"),
            FirestoreValue::from_bytes(vec![0u8].into()),
            FirestoreValue::from_bson_binary(BsonBinaryData::from_bytes(1, vec![0])),
            FirestoreValue::from_reference("books/book1"),
            FirestoreValue::from_object_id(BsonObjectId::new("507f191e810c19729de860ea")),
            FirestoreValue::from_geo_point(crate::model::GeoPoint::new(0.0, 0.0).unwrap()),
            FirestoreValue::from_regex(RegexValue::new("^a", "i")),
            FirestoreValue::from_array(vec![]),
            FirestoreValue::from_map(Default::default()),
            FirestoreValue::max_key(),
        ];
        for window in ascending.windows(2) {
            assert_eq!(
                compare(&window[0], &window[1]),
                Ordering::Less,
                "{} should sort before {}",
                window[0].type_name(),
                window[1].type_name()
            );
        }
    }

    #[test]
    fn arrays_compare_elementwise_then_by_length() {
        let shorter = FirestoreValue::from_array(vec![FirestoreValue::from_integer(1)]);
        let longer = FirestoreValue::from_array(vec![
            FirestoreValue::from_integer(1),
            FirestoreValue::from_integer(0),
        ]);
        assert_eq!(compare(&shorter, &longer), Ordering::Less);
    }

    #[test]
    fn maps_compare_by_sorted_entries() {
        let a = FirestoreValue::from_map(
            [("a".to_string(), FirestoreValue::from_integer(1))]
                .into_iter()
                .collect(),
        );
        let b = FirestoreValue::from_map(
            [("b".to_string(), FirestoreValue::from_integer(0))]
                .into_iter()
                .collect(),
        );
        assert_eq!(compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn references_compare_by_segment() {
        let shorter = FirestoreValue::from_reference("books/book1");
        let longer = FirestoreValue::from_reference("books/book1/chapters/one");
        assert_eq!(compare(&shorter, &longer), Ordering::Less);
    }
}
