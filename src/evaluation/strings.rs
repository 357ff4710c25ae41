use regex::Regex;

use crate::evaluation::{
    require_concrete, require_integer, require_string, EvaluationError, EvaluationResult,
};
use crate::model::PipelineDocument;
use crate::pipeline::{Function, FunctionExpr};
use crate::value::{BytesValue, FirestoreValue, ValueKind};

pub(super) fn evaluate(call: &FunctionExpr, document: &PipelineDocument) -> EvaluationResult {
    match evaluate_inner(call, document) {
        Ok(result) => result,
        Err(result) => result,
    }
}

fn evaluate_inner(
    call: &FunctionExpr,
    document: &PipelineDocument,
) -> Result<EvaluationResult, EvaluationResult> {
    let function = call.function();
    let operand = |index: usize| super::evaluate(&call.args()[index], document);

    let result = match function {
        Function::CharLength => {
            // Unicode scalar values, not UTF-16 units. Strings here can
            // never hold lone surrogates, so the two agree except on
            // supplementary-plane characters, which count once.
            let value = require_string(function, operand(0))?;
            integer(value.chars().count() as i64)
        }
        Function::ByteLength => {
            let value = require_concrete(function, operand(0))?;
            match value.kind() {
                ValueKind::String(string) => integer(string.len() as i64),
                ValueKind::Bytes(bytes) => integer(bytes.len() as i64),
                _ => {
                    return Err(EvaluationResult::Error(EvaluationError::type_mismatch(
                        function,
                        "string or bytes",
                        &value,
                    )))
                }
            }
        }
        Function::StrConcat => {
            let mut concatenated = String::new();
            for arg in call.args() {
                concatenated.push_str(&require_string(
                    function,
                    super::evaluate(arg, document),
                )?);
            }
            string(concatenated)
        }
        Function::ToLower => string(require_string(function, operand(0))?.to_lowercase()),
        Function::ToUpper => string(require_string(function, operand(0))?.to_uppercase()),
        Function::Trim => string(require_string(function, operand(0))?.trim().to_string()),
        Function::StrReverse => {
            let value = require_string(function, operand(0))?;
            string(value.chars().rev().collect::<String>())
        }
        Function::StrContains => {
            let value = require_string(function, operand(0))?;
            let substring = require_string(function, operand(1))?;
            boolean(value.contains(&substring))
        }
        Function::StartsWith => {
            let value = require_string(function, operand(0))?;
            let prefix = require_string(function, operand(1))?;
            boolean(value.starts_with(&prefix))
        }
        Function::EndsWith => {
            let value = require_string(function, operand(0))?;
            let suffix = require_string(function, operand(1))?;
            boolean(value.ends_with(&suffix))
        }
        Function::Substr => {
            let value = require_string(function, operand(0))?;
            let position = require_integer(function, operand(1))?;
            let length = require_integer(function, operand(2))?;
            if position < 0 || length < 0 {
                return Err(EvaluationResult::Error(EvaluationError::out_of_range(
                    function,
                    format!("position {position} and length {length} must be non-negative"),
                )));
            }
            string(
                value
                    .chars()
                    .skip(position as usize)
                    .take(length as usize)
                    .collect::<String>(),
            )
        }
        Function::Like => {
            let value = require_string(function, operand(0))?;
            let pattern = require_string(function, operand(1))?;
            let regex = compile(function, &like_to_regex(&pattern))?;
            boolean(regex.is_match(&value))
        }
        Function::RegexContains => {
            let value = require_string(function, operand(0))?;
            let pattern = require_string(function, operand(1))?;
            let regex = compile(function, &pattern)?;
            boolean(regex.is_match(&value))
        }
        Function::RegexMatch => {
            let value = require_string(function, operand(0))?;
            let pattern = require_string(function, operand(1))?;
            let regex = compile(function, &format!("^(?:{pattern})$"))?;
            boolean(regex.is_match(&value))
        }
        Function::Join => join(function, operand(0), operand(1))?,
        _ => unreachable!("non-string function routed to strings"),
    };
    Ok(result)
}

/// `join` has layered semantics: concrete wrong-typed operands error
/// first, a null array or null delimiter against an otherwise well-typed
/// companion yields null, and null *elements* are elided from the output.
fn join(
    function: Function,
    array_result: EvaluationResult,
    delimiter_result: EvaluationResult,
) -> Result<EvaluationResult, EvaluationResult> {
    enum Delimiter {
        Text(String),
        Blob(BytesValue),
    }

    let delimiter = match delimiter_result {
        EvaluationResult::Null => None,
        EvaluationResult::Unset => {
            return Err(EvaluationResult::Error(EvaluationError::unset_operand(
                function,
            )))
        }
        error @ EvaluationResult::Error(_) => return Err(error),
        EvaluationResult::Value(value) => match value.kind() {
            ValueKind::String(text) => Some(Delimiter::Text(text.clone())),
            ValueKind::Bytes(bytes) => Some(Delimiter::Blob(bytes.clone())),
            _ => {
                return Err(EvaluationResult::Error(EvaluationError::type_mismatch(
                    function,
                    "string or bytes delimiter",
                    &value,
                )))
            }
        },
    };

    let array = match array_result {
        EvaluationResult::Null => None,
        EvaluationResult::Unset => {
            return Err(EvaluationResult::Error(EvaluationError::unset_operand(
                function,
            )))
        }
        error @ EvaluationResult::Error(_) => return Err(error),
        EvaluationResult::Value(value) => match value.kind() {
            ValueKind::Array(array) => Some(array.clone()),
            _ => {
                return Err(EvaluationResult::Error(EvaluationError::type_mismatch(
                    function, "array", &value,
                )))
            }
        },
    };

    let (Some(array), Some(delimiter)) = (array, delimiter) else {
        return Ok(EvaluationResult::Null);
    };

    match delimiter {
        Delimiter::Text(separator) => {
            let mut pieces: Vec<&str> = Vec::with_capacity(array.len());
            for element in array.values() {
                match element.kind() {
                    ValueKind::String(text) => pieces.push(text),
                    // Null elements are elided, not joined as empty.
                    ValueKind::Null => {}
                    _ => {
                        return Err(EvaluationResult::Error(EvaluationError::new(
                            crate::evaluation::EvaluationErrorKind::TypeMismatch,
                            format!(
                                "{}: Cannot join non-string types, found {}",
                                function.name(),
                                element.type_name()
                            ),
                        )))
                    }
                }
            }
            Ok(EvaluationResult::Value(FirestoreValue::from_string(
                pieces.join(&separator),
            )))
        }
        Delimiter::Blob(separator) => {
            let mut joined: Vec<u8> = Vec::new();
            let mut first = true;
            for element in array.values() {
                match element.kind() {
                    ValueKind::Bytes(bytes) => {
                        if !first {
                            joined.extend_from_slice(separator.as_slice());
                        }
                        joined.extend_from_slice(bytes.as_slice());
                        first = false;
                    }
                    ValueKind::Null => {}
                    _ => {
                        return Err(EvaluationResult::Error(EvaluationError::new(
                            crate::evaluation::EvaluationErrorKind::TypeMismatch,
                            format!(
                                "{}: Cannot join non-bytes types, found {}",
                                function.name(),
                                element.type_name()
                            ),
                        )))
                    }
                }
            }
            Ok(EvaluationResult::Value(FirestoreValue::from_bytes(
                BytesValue::new(joined),
            )))
        }
    }
}

fn like_to_regex(pattern: &str) -> String {
    let mut translated = String::with_capacity(pattern.len() + 8);
    translated.push_str("(?s)^");
    for c in pattern.chars() {
        match c {
            '%' => translated.push_str(".*"),
            '_' => translated.push('.'),
            _ => {
                if "\\.+*?()|[]{}^$#&-~".contains(c) {
                    translated.push('\\');
                }
                translated.push(c);
            }
        }
    }
    translated.push('$');
    translated
}

fn compile(function: Function, pattern: &str) -> Result<Regex, EvaluationResult> {
    Regex::new(pattern).map_err(|err| {
        EvaluationResult::Error(EvaluationError::invalid_argument(
            function,
            format!("invalid pattern '{pattern}': {err}"),
        ))
    })
}

fn string(value: String) -> EvaluationResult {
    EvaluationResult::Value(FirestoreValue::from_string(value))
}

fn integer(value: i64) -> EvaluationResult {
    EvaluationResult::Value(FirestoreValue::from_integer(value))
}

fn boolean(value: bool) -> EvaluationResult {
    EvaluationResult::Value(FirestoreValue::from_bool(value))
}
