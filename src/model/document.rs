use crate::model::{DocumentKey, FieldPath};
use crate::value::{FirestoreValue, MapValue, ValueKind};

/// Immutable snapshot of a document flowing through a pipeline.
///
/// Documents read from a collection carry their key; documents produced by
/// aggregation or distinct stages are derived rows and carry none. The
/// evaluator only ever reads fields; stages that reshape a document build a
/// new one.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineDocument {
    key: Option<DocumentKey>,
    fields: MapValue,
}

impl PipelineDocument {
    pub fn new(key: DocumentKey, fields: MapValue) -> Self {
        Self {
            key: Some(key),
            fields,
        }
    }

    pub fn keyless(fields: MapValue) -> Self {
        Self { key: None, fields }
    }

    pub fn key(&self) -> Option<&DocumentKey> {
        self.key.as_ref()
    }

    pub fn fields(&self) -> &MapValue {
        &self.fields
    }

    /// Resolves a field path against the document, descending through
    /// nested maps. Returns `None` when any segment is absent or when an
    /// intermediate segment is not a map.
    pub fn field(&self, path: &FieldPath) -> Option<&FirestoreValue> {
        let mut map = &self.fields;
        let (last, parents) = path.segments().split_last()?;
        for segment in parents {
            match map.get(segment).map(FirestoreValue::kind) {
                Some(ValueKind::Map(child)) => map = child,
                _ => return None,
            }
        }
        map.get(last)
    }

    /// Rebuilds the document around a new field set, keeping its identity.
    pub fn with_fields(&self, fields: MapValue) -> Self {
        Self {
            key: self.key.clone(),
            fields,
        }
    }
}
