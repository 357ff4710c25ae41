mod document;
mod document_key;
mod field_path;
mod geo_point;
mod resource_path;
mod timestamp;

pub use document::PipelineDocument;
pub use document_key::DocumentKey;
pub use field_path::{FieldPath, IntoFieldPath};
pub use geo_point::GeoPoint;
pub use resource_path::ResourcePath;
pub use timestamp::{Timestamp, MAX_TIMESTAMP_SECONDS, MIN_TIMESTAMP_SECONDS};
