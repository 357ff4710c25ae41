use crate::error::{invalid_argument, FirestoreResult};

/// Dot-separated path addressing a (possibly nested) field inside a
/// document, e.g. `awards.hugo`.
///
/// Segments whose names contain dots are supported through backtick
/// quoting: `` nested.`level.1` `` addresses the field literally named
/// `level.1` inside `nested`. Pre-split construction via [`FieldPath::new`]
/// bypasses the parser entirely.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn new<S, I>(segments: I) -> FirestoreResult<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(invalid_argument(
                "FieldPath must contain at least one segment",
            ));
        }
        if segments.iter().any(String::is_empty) {
            return Err(invalid_argument("FieldPath segments cannot be empty"));
        }
        Ok(Self { segments })
    }

    pub fn from_dot_separated(path: &str) -> FirestoreResult<Self> {
        if path.trim().is_empty() {
            return Err(invalid_argument("FieldPath string cannot be empty"));
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = path.chars();
        let mut quoted = false;
        while let Some(c) = chars.next() {
            match c {
                '`' => quoted = !quoted,
                '\\' if quoted => match chars.next() {
                    Some(escaped) => current.push(escaped),
                    None => {
                        return Err(invalid_argument(format!(
                            "Trailing escape character in field path '{path}'"
                        )))
                    }
                },
                '.' if !quoted => {
                    if current.is_empty() {
                        return Err(invalid_argument(format!(
                            "Invalid field path '{path}': empty segment"
                        )));
                    }
                    segments.push(std::mem::take(&mut current));
                }
                _ => current.push(c),
            }
        }
        if quoted {
            return Err(invalid_argument(format!(
                "Unterminated backtick quote in field path '{path}'"
            )));
        }
        if current.is_empty() {
            return Err(invalid_argument(format!(
                "Invalid field path '{path}': empty segment"
            )));
        }
        segments.push(current);
        Self::new(segments)
    }

    pub fn last_segment(&self) -> &str {
        self.segments
            .last()
            .expect("FieldPath always has at least one segment")
            .as_str()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Renders the path with backtick quoting applied to any segment that
    /// is not a plain identifier, so the output parses back to the same
    /// path.
    pub fn canonical_string(&self) -> String {
        let mut rendered = String::new();
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                rendered.push('.');
            }
            if needs_quoting(segment) {
                rendered.push('`');
                for c in segment.chars() {
                    if c == '`' || c == '\\' {
                        rendered.push('\\');
                    }
                    rendered.push(c);
                }
                rendered.push('`');
            } else {
                rendered.push_str(segment);
            }
        }
        rendered
    }

    pub fn document_id() -> Self {
        Self {
            segments: vec!["__name__".to_string()],
        }
    }
}

fn needs_quoting(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return true,
    }
    chars.any(|c| !c.is_ascii_alphanumeric() && c != '_')
}

/// Trait that converts common user inputs into a validated [`FieldPath`].
pub trait IntoFieldPath {
    fn into_field_path(self) -> FirestoreResult<FieldPath>;
}

impl IntoFieldPath for FieldPath {
    fn into_field_path(self) -> FirestoreResult<FieldPath> {
        Ok(self)
    }
}

impl<'a> IntoFieldPath for &'a FieldPath {
    fn into_field_path(self) -> FirestoreResult<FieldPath> {
        Ok(self.clone())
    }
}

impl IntoFieldPath for String {
    fn into_field_path(self) -> FirestoreResult<FieldPath> {
        FieldPath::from_dot_separated(&self)
    }
}

impl<'a> IntoFieldPath for &'a str {
    fn into_field_path(self) -> FirestoreResult<FieldPath> {
        FieldPath::from_dot_separated(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_dot_path() {
        let field = FieldPath::from_dot_separated("foo.bar").unwrap();
        assert_eq!(field.segments(), &["foo", "bar"]);
    }

    #[test]
    fn quoted_segment_keeps_literal_dot() {
        let field = FieldPath::from_dot_separated("nested.`level.1`").unwrap();
        assert_eq!(field.segments(), &["nested", "level.1"]);
    }

    #[test]
    fn pre_split_bypasses_parser() {
        let field = FieldPath::new(["level.1"]).unwrap();
        assert_eq!(field.segments(), &["level.1"]);
        assert_eq!(field.canonical_string(), "`level.1`");
    }

    #[test]
    fn canonical_string_round_trips() {
        let field = FieldPath::new(["nested", "level.1", "plain"]).unwrap();
        let rendered = field.canonical_string();
        assert_eq!(rendered, "nested.`level.1`.plain");
        assert_eq!(FieldPath::from_dot_separated(&rendered).unwrap(), field);
    }

    #[test]
    fn rejects_empty() {
        let err = FieldPath::from_dot_separated("").unwrap_err();
        assert_eq!(err.code_str(), "firestore/invalid-argument");
    }

    #[test]
    fn rejects_unterminated_quote() {
        let err = FieldPath::from_dot_separated("a.`b").unwrap_err();
        assert_eq!(err.code_str(), "firestore/invalid-argument");
    }
}
