use crate::value::FirestoreValue;

#[derive(Clone, Debug, PartialEq)]
pub struct ArrayValue {
    values: Vec<FirestoreValue>,
}

impl ArrayValue {
    pub fn new(values: Vec<FirestoreValue>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[FirestoreValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index lookup with negative indices counting from the end.
    pub fn get_signed(&self, index: i64) -> Option<&FirestoreValue> {
        let length = self.values.len() as i64;
        let resolved = if index < 0 { length + index } else { index };
        if (0..length).contains(&resolved) {
            self.values.get(resolved as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array() -> ArrayValue {
        ArrayValue::new(vec![
            FirestoreValue::from_integer(10),
            FirestoreValue::from_integer(20),
            FirestoreValue::from_integer(30),
        ])
    }

    #[test]
    fn signed_index_from_end() {
        let array = array();
        assert_eq!(array.get_signed(-1), array.get_signed(2));
        assert_eq!(array.get_signed(0), Some(&FirestoreValue::from_integer(10)));
    }

    #[test]
    fn signed_index_out_of_range() {
        let array = array();
        assert_eq!(array.get_signed(3), None);
        assert_eq!(array.get_signed(-4), None);
    }
}
