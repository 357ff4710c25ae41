use std::collections::BTreeMap;

use crate::value::FirestoreValue;

/// String-keyed field map. Keys are unique; iteration order is the sorted
/// key order of the backing map, which callers must not rely on for
/// equality or comparison (those are defined in `value::compare`).
#[derive(Clone, Debug, PartialEq, Default)]
pub struct MapValue {
    fields: BTreeMap<String, FirestoreValue>,
}

impl MapValue {
    pub fn new(fields: BTreeMap<String, FirestoreValue>) -> Self {
        Self { fields }
    }

    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FirestoreValue)>,
    {
        Self {
            fields: entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        }
    }

    pub fn fields(&self) -> &BTreeMap<String, FirestoreValue> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&FirestoreValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// A copy with `other`'s entries layered on top, `other` winning on
    /// key collisions.
    pub fn merged_with(&self, other: &MapValue) -> Self {
        let mut fields = self.fields.clone();
        for (key, value) in other.fields.iter() {
            fields.insert(key.clone(), value.clone());
        }
        Self { fields }
    }

    /// A copy without the named key.
    pub fn without(&self, key: &str) -> Self {
        let mut fields = self.fields.clone();
        fields.remove(key);
        Self { fields }
    }
}
