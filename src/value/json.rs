//! JSON wire-format codec for values.
//!
//! Encodes values in the REST representation (`{"integerValue": "7"}`,
//! `{"mapValue": {"fields": …}}`, …). The BSON interop types ride in
//! single-entry sentinel maps (`__oid__`, `__regex__`, `__int__`,
//! `__decimal128__`, `__binary__`, `__timestamp__`, `__min__`, `__max__`)
//! so they survive transports that only understand the native value set.
//! Non-finite doubles encode as the strings `"NaN"`, `"Infinity"`, and
//! `"-Infinity"`.

use std::collections::BTreeMap;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::{json, Value as JsonValue};

use crate::error::{invalid_argument, FirestoreResult};
use crate::model::{GeoPoint, Timestamp};
use crate::value::{
    BsonBinaryData, BsonObjectId, BsonTimestamp, BytesValue, Decimal128Value, FirestoreValue,
    MapValue, RegexValue, ValueKind,
};

const RESERVED_MIN_KEY: &str = "__min__";
const RESERVED_MAX_KEY: &str = "__max__";
const RESERVED_OBJECT_ID_KEY: &str = "__oid__";
const RESERVED_REGEX_KEY: &str = "__regex__";
const RESERVED_INT32_KEY: &str = "__int__";
const RESERVED_DECIMAL128_KEY: &str = "__decimal128__";
const RESERVED_BINARY_KEY: &str = "__binary__";
const RESERVED_BSON_TIMESTAMP_KEY: &str = "__timestamp__";

pub fn encode_map_fields(map: &MapValue) -> JsonValue {
    let mut fields = serde_json::Map::new();
    for (key, value) in map.fields() {
        fields.insert(key.clone(), encode_value(value));
    }
    JsonValue::Object(fields)
}

pub fn encode_value(value: &FirestoreValue) -> JsonValue {
    match value.kind() {
        ValueKind::Null => json!({ "nullValue": JsonValue::Null }),
        ValueKind::Boolean(boolean) => json!({ "booleanValue": boolean }),
        ValueKind::Integer(integer) => json!({ "integerValue": integer.to_string() }),
        ValueKind::Int32(integer) => sentinel(
            RESERVED_INT32_KEY,
            json!({ "integerValue": integer.to_string() }),
        ),
        ValueKind::Double(double) => encode_double(*double),
        ValueKind::Decimal128(decimal) => sentinel(
            RESERVED_DECIMAL128_KEY,
            json!({ "stringValue": decimal.value() }),
        ),
        ValueKind::Timestamp(timestamp) => {
            json!({ "timestampValue": timestamp.to_string() })
        }
        ValueKind::BsonTimestamp(timestamp) => sentinel(
            RESERVED_BSON_TIMESTAMP_KEY,
            json!({
                "mapValue": {
                    "fields": {
                        "seconds": { "integerValue": timestamp.seconds().to_string() },
                        "increment": { "integerValue": timestamp.increment().to_string() },
                    }
                }
            }),
        ),
        ValueKind::String(string) => json!({ "stringValue": string }),
        ValueKind::Bytes(bytes) => {
            json!({ "bytesValue": BASE64_STANDARD.encode(bytes.as_slice()) })
        }
        ValueKind::BsonBinary(binary) => {
            let mut tagged = Vec::with_capacity(binary.bytes().len() + 1);
            tagged.push(binary.subtype());
            tagged.extend_from_slice(binary.bytes());
            sentinel(
                RESERVED_BINARY_KEY,
                json!({ "bytesValue": BASE64_STANDARD.encode(tagged) }),
            )
        }
        ValueKind::Reference(reference) => json!({ "referenceValue": reference }),
        ValueKind::ObjectId(oid) => {
            sentinel(RESERVED_OBJECT_ID_KEY, json!({ "stringValue": oid.value() }))
        }
        ValueKind::GeoPoint(point) => json!({
            "geoPointValue": {
                "latitude": point.latitude(),
                "longitude": point.longitude(),
            }
        }),
        ValueKind::Regex(regex) => sentinel(
            RESERVED_REGEX_KEY,
            json!({
                "mapValue": {
                    "fields": {
                        "pattern": { "stringValue": regex.pattern() },
                        "options": { "stringValue": regex.options() },
                    }
                }
            }),
        ),
        ValueKind::Array(array) => {
            let values = array.values().iter().map(encode_value).collect::<Vec<_>>();
            json!({ "arrayValue": { "values": values } })
        }
        ValueKind::Map(map) => json!({
            "mapValue": {
                "fields": encode_map_fields(map)
            }
        }),
        ValueKind::MinKey => sentinel(RESERVED_MIN_KEY, json!({ "nullValue": JsonValue::Null })),
        ValueKind::MaxKey => sentinel(RESERVED_MAX_KEY, json!({ "nullValue": JsonValue::Null })),
    }
}

fn sentinel(key: &str, payload: JsonValue) -> JsonValue {
    let mut fields = serde_json::Map::new();
    fields.insert(key.to_string(), payload);
    json!({
        "mapValue": {
            "fields": JsonValue::Object(fields)
        }
    })
}

fn encode_double(double: f64) -> JsonValue {
    if double.is_nan() {
        json!({ "doubleValue": "NaN" })
    } else if double == f64::INFINITY {
        json!({ "doubleValue": "Infinity" })
    } else if double == f64::NEG_INFINITY {
        json!({ "doubleValue": "-Infinity" })
    } else {
        json!({ "doubleValue": double })
    }
}

pub fn decode_map_value(value: &JsonValue) -> FirestoreResult<MapValue> {
    let map = value
        .as_object()
        .ok_or_else(|| invalid_argument("Expected object for map value"))?;
    let fields_object = match map.get("fields") {
        Some(fields_value) => fields_value
            .as_object()
            .ok_or_else(|| invalid_argument("Expected 'fields' to be an object"))?,
        None => return Ok(MapValue::new(BTreeMap::new())),
    };

    let mut fields = BTreeMap::new();
    for (key, value) in fields_object {
        fields.insert(key.clone(), decode_value(value)?);
    }
    Ok(MapValue::new(fields))
}

pub fn decode_value(value: &JsonValue) -> FirestoreResult<FirestoreValue> {
    let object = value
        .as_object()
        .ok_or_else(|| invalid_argument("Expected value object"))?;
    if let Some(null_value) = object.get("nullValue") {
        if null_value.is_null() {
            return Ok(FirestoreValue::null());
        }
    }
    if let Some(bool_value) = object.get("booleanValue") {
        let value = bool_value
            .as_bool()
            .ok_or_else(|| invalid_argument("booleanValue must be bool"))?;
        return Ok(FirestoreValue::from_bool(value));
    }
    if let Some(integer_value) = object.get("integerValue") {
        return Ok(FirestoreValue::from_integer(decode_integer(integer_value)?));
    }
    if let Some(double_value) = object.get("doubleValue") {
        let parsed = match double_value {
            JsonValue::Number(number) => number
                .as_f64()
                .ok_or_else(|| invalid_argument("Invalid doubleValue"))?,
            JsonValue::String(value) => value
                .parse::<f64>()
                .map_err(|err| invalid_argument(format!("Invalid doubleValue: {err}")))?,
            _ => return Err(invalid_argument("doubleValue must be a number or string")),
        };
        return Ok(FirestoreValue::from_double(parsed));
    }
    if let Some(timestamp_value) = object.get("timestampValue") {
        let timestamp_str = timestamp_value
            .as_str()
            .ok_or_else(|| invalid_argument("timestampValue must be string"))?;
        return Ok(FirestoreValue::from_timestamp(parse_timestamp(
            timestamp_str,
        )?));
    }
    if let Some(string_value) = object.get("stringValue") {
        let str_value = string_value
            .as_str()
            .ok_or_else(|| invalid_argument("stringValue must be string"))?;
        return Ok(FirestoreValue::from_string(str_value));
    }
    if let Some(bytes_value) = object.get("bytesValue") {
        let str_value = bytes_value
            .as_str()
            .ok_or_else(|| invalid_argument("bytesValue must be base64 string"))?;
        let decoded = BytesValue::from_base64(str_value)
            .map_err(|err| invalid_argument(format!("Invalid bytesValue: {err}")))?;
        return Ok(FirestoreValue::from_bytes(decoded));
    }
    if let Some(reference_value) = object.get("referenceValue") {
        let str_value = reference_value
            .as_str()
            .ok_or_else(|| invalid_argument("referenceValue must be string"))?;
        return Ok(FirestoreValue::from_reference(str_value));
    }
    if let Some(geo_point) = object.get("geoPointValue") {
        let latitude = geo_point
            .get("latitude")
            .and_then(|value| value.as_f64())
            .ok_or_else(|| invalid_argument("geoPointValue.latitude must be f64"))?;
        let longitude = geo_point
            .get("longitude")
            .and_then(|value| value.as_f64())
            .ok_or_else(|| invalid_argument("geoPointValue.longitude must be f64"))?;
        return Ok(FirestoreValue::from_geo_point(GeoPoint::new(
            latitude, longitude,
        )?));
    }
    if let Some(array_value) = object.get("arrayValue") {
        let decoded = if let Some(values) = array_value.get("values") {
            match values.as_array() {
                Some(entries) => entries
                    .iter()
                    .map(decode_value)
                    .collect::<FirestoreResult<Vec<_>>>()?,
                None => Vec::new(),
            }
        } else {
            Vec::new()
        };
        return Ok(FirestoreValue::from_array(decoded));
    }
    if let Some(map_value) = object.get("mapValue") {
        if let Some(sentinel_value) = decode_sentinel(map_value)? {
            return Ok(sentinel_value);
        }
        let map = decode_map_value(map_value)?;
        return Ok(FirestoreValue::from_map_value(map));
    }

    Err(invalid_argument("Unknown value type"))
}

fn decode_sentinel(map_value: &JsonValue) -> FirestoreResult<Option<FirestoreValue>> {
    let fields = match map_value.get("fields").and_then(JsonValue::as_object) {
        Some(fields) if fields.len() == 1 => fields,
        _ => return Ok(None),
    };
    let (key, payload) = fields.iter().next().expect("len checked above");

    let decoded = match key.as_str() {
        RESERVED_MIN_KEY => Some(FirestoreValue::min_key()),
        RESERVED_MAX_KEY => Some(FirestoreValue::max_key()),
        RESERVED_OBJECT_ID_KEY => {
            let hex = payload
                .get("stringValue")
                .and_then(JsonValue::as_str)
                .ok_or_else(|| invalid_argument("__oid__ payload must be a string"))?;
            Some(FirestoreValue::from_object_id(BsonObjectId::new(hex)))
        }
        RESERVED_INT32_KEY => {
            let integer = payload
                .get("integerValue")
                .ok_or_else(|| invalid_argument("__int__ payload must be an integer"))?;
            let parsed = decode_integer(integer)?;
            let narrowed = i32::try_from(parsed)
                .map_err(|_| invalid_argument("__int__ payload out of 32-bit range"))?;
            Some(FirestoreValue::from_int32(narrowed))
        }
        RESERVED_DECIMAL128_KEY => {
            let rendering = payload
                .get("stringValue")
                .and_then(JsonValue::as_str)
                .ok_or_else(|| invalid_argument("__decimal128__ payload must be a string"))?;
            Some(FirestoreValue::from_decimal128(Decimal128Value::new(
                rendering,
            )))
        }
        RESERVED_BINARY_KEY => {
            let encoded = payload
                .get("bytesValue")
                .and_then(JsonValue::as_str)
                .ok_or_else(|| invalid_argument("__binary__ payload must be base64"))?;
            let decoded = BASE64_STANDARD
                .decode(encoded)
                .map_err(|err| invalid_argument(format!("Invalid __binary__ payload: {err}")))?;
            let (subtype, bytes) = decoded
                .split_first()
                .ok_or_else(|| invalid_argument("__binary__ payload missing subtype byte"))?;
            Some(FirestoreValue::from_bson_binary(BsonBinaryData::from_bytes(
                *subtype,
                bytes.to_vec(),
            )))
        }
        RESERVED_BSON_TIMESTAMP_KEY => {
            let inner = decode_map_value(
                payload
                    .get("mapValue")
                    .ok_or_else(|| invalid_argument("__timestamp__ payload must be a map"))?,
            )?;
            let seconds = sentinel_integer(&inner, "seconds")?;
            let increment = sentinel_integer(&inner, "increment")?;
            Some(FirestoreValue::from_bson_timestamp(BsonTimestamp::new(
                seconds, increment,
            )))
        }
        RESERVED_REGEX_KEY => {
            let inner = decode_map_value(
                payload
                    .get("mapValue")
                    .ok_or_else(|| invalid_argument("__regex__ payload must be a map"))?,
            )?;
            let pattern = sentinel_string(&inner, "pattern")?;
            let options = sentinel_string(&inner, "options")?;
            Some(FirestoreValue::from_regex(RegexValue::new(
                pattern, options,
            )))
        }
        _ => None,
    };
    Ok(decoded)
}

fn sentinel_integer(map: &MapValue, key: &str) -> FirestoreResult<u32> {
    match map.get(key).map(FirestoreValue::kind) {
        Some(ValueKind::Integer(value)) => u32::try_from(*value)
            .map_err(|_| invalid_argument(format!("'{key}' out of unsigned 32-bit range"))),
        _ => Err(invalid_argument(format!(
            "Expected integer field '{key}' in sentinel payload"
        ))),
    }
}

fn sentinel_string(map: &MapValue, key: &str) -> FirestoreResult<String> {
    match map.get(key).map(FirestoreValue::kind) {
        Some(ValueKind::String(value)) => Ok(value.clone()),
        _ => Err(invalid_argument(format!(
            "Expected string field '{key}' in sentinel payload"
        ))),
    }
}

fn decode_integer(value: &JsonValue) -> FirestoreResult<i64> {
    match value {
        JsonValue::String(value) => i64::from_str(value)
            .map_err(|err| invalid_argument(format!("Invalid integerValue: {err}"))),
        JsonValue::Number(number) => number
            .as_i64()
            .ok_or_else(|| invalid_argument("Integer out of range")),
        _ => Err(invalid_argument("integerValue must be a string or number")),
    }
}

fn parse_timestamp(value: &str) -> FirestoreResult<Timestamp> {
    let datetime = DateTime::parse_from_rfc3339(value)
        .map_err(|err| invalid_argument(format!("Invalid timestamp: {err}")))?;
    let datetime_utc = datetime.with_timezone(&Utc);
    Ok(Timestamp::new(
        datetime_utc.timestamp(),
        datetime_utc.timestamp_subsec_nanos() as i32,
    ))
}
