//! Client-side expression and pipeline evaluation core for the Firestore
//! document database.
//!
//! This crate implements the typed, three-valued-plus-error expression
//! evaluator that powers declarative filters, projections, and
//! aggregations over locally available documents, together with the
//! pipeline stage runner that threads document sequences through those
//! expressions. Persistence, transport, and document synchronization are
//! external collaborators: documents come in through
//! [`model::PipelineDocument`] and leave as transformed documents.
//!
//! ```
//! use firestore_pipeline::model::{DocumentKey, PipelineDocument};
//! use firestore_pipeline::pipeline::expr::{field, gt};
//! use firestore_pipeline::pipeline::Pipeline;
//! use firestore_pipeline::value::MapValue;
//!
//! let docs = vec![PipelineDocument::new(
//!     DocumentKey::from_string("books/book1").unwrap(),
//!     MapValue::from_entries([("rating", 4.7.into())]),
//! )];
//! let pipeline = Pipeline::new().filter(gt(field("rating").unwrap(), 4.5));
//! assert_eq!(pipeline.run(docs).len(), 1);
//! ```

pub mod error;
pub mod evaluation;
pub mod model;
pub mod pipeline;
pub mod value;

pub use error::{FirestoreError, FirestoreErrorCode, FirestoreResult};
pub use evaluation::{evaluate, EvaluationError, EvaluationErrorKind, EvaluationResult};
pub use model::{DocumentKey, FieldPath, PipelineDocument, Timestamp};
pub use pipeline::Pipeline;
pub use value::{FirestoreValue, ValueKind};
