mod array_value;
mod bson;
mod bytes_value;
pub mod compare;
pub mod json;
mod map_value;
mod value;

pub use array_value::ArrayValue;
pub use bson::{BsonBinaryData, BsonObjectId, BsonTimestamp, Decimal128Value, RegexValue};
pub use bytes_value::BytesValue;
pub use map_value::MapValue;
pub use value::{FirestoreValue, Numeric, ValueKind};
