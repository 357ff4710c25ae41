//! The expression evaluator.
//!
//! `evaluate` is total: for any well-formed expression and any document it
//! returns exactly one of value / null / unset / error and never panics or
//! blocks. Failures that must propagate (type mismatches, overflow, bad
//! arguments) are *data*, carried in [`EvaluationResult::Error`]; nothing
//! is thrown across the evaluation boundary because filtering runs this
//! code once per document on hot paths.

mod arithmetic;
mod comparison;
mod containers;
mod logical;
mod strings;
mod timestamps;

use std::fmt::{Display, Formatter};

use crate::model::{FieldPath, PipelineDocument};
use crate::pipeline::{Expr, Function, FunctionExpr};
use crate::value::{FirestoreValue, Numeric, ValueKind};

/// Outcome of evaluating one expression against one document.
///
/// `Null` is a first-class value (an explicit null field or literal);
/// `Unset` means a referenced field does not exist on the document. The
/// two propagate differently and neither equals the other.
#[derive(Clone, Debug, PartialEq)]
pub enum EvaluationResult {
    Value(FirestoreValue),
    Null,
    Unset,
    Error(EvaluationError),
}

impl EvaluationResult {
    /// Normalizing constructor: a null value surfaces as
    /// [`EvaluationResult::Null`], so a top-level null never hides inside
    /// the `Value` variant.
    pub fn from_value(value: FirestoreValue) -> Self {
        if value.is_null() {
            EvaluationResult::Null
        } else {
            EvaluationResult::Value(value)
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(
            self,
            EvaluationResult::Value(value) if matches!(value.kind(), ValueKind::Boolean(true))
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self, EvaluationResult::Error(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvaluationErrorKind {
    TypeMismatch,
    InvalidArgument,
    Overflow,
    UnsetOperand,
    OutOfRange,
}

/// Diagnostic payload of a failed evaluation. The message always names
/// the operator; type errors also name the expected and actual types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluationError {
    kind: EvaluationErrorKind,
    message: String,
}

impl EvaluationError {
    pub fn new(kind: EvaluationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn type_mismatch(
        function: Function,
        expected: &str,
        actual: &FirestoreValue,
    ) -> Self {
        Self::new(
            EvaluationErrorKind::TypeMismatch,
            format!(
                "{}: expected {expected}, found {}",
                function.name(),
                actual.type_name()
            ),
        )
    }

    pub fn null_operand(function: Function) -> Self {
        Self::new(
            EvaluationErrorKind::TypeMismatch,
            format!("{}: null operand", function.name()),
        )
    }

    pub fn unset_operand(function: Function) -> Self {
        Self::new(
            EvaluationErrorKind::UnsetOperand,
            format!("{}: operand field is unset", function.name()),
        )
    }

    pub fn invalid_argument(function: Function, message: impl Display) -> Self {
        Self::new(
            EvaluationErrorKind::InvalidArgument,
            format!("{}: {message}", function.name()),
        )
    }

    pub fn overflow(function: Function, message: impl Display) -> Self {
        Self::new(
            EvaluationErrorKind::Overflow,
            format!("{}: {message}", function.name()),
        )
    }

    pub fn out_of_range(function: Function, message: impl Display) -> Self {
        Self::new(
            EvaluationErrorKind::OutOfRange,
            format!("{}: {message}", function.name()),
        )
    }

    pub fn kind(&self) -> &EvaluationErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for EvaluationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Evaluates an expression against a document.
pub fn evaluate(expr: &Expr, document: &PipelineDocument) -> EvaluationResult {
    match expr {
        Expr::Constant(value) => EvaluationResult::from_value(value.clone()),
        Expr::Field(path) => evaluate_field(path, document),
        Expr::Function(call) => evaluate_function(call, document),
    }
}

fn evaluate_field(path: &FieldPath, document: &PipelineDocument) -> EvaluationResult {
    if path == &FieldPath::document_id() {
        return match document.key() {
            Some(key) => {
                EvaluationResult::Value(FirestoreValue::from_string(key.path().canonical_string()))
            }
            None => EvaluationResult::Unset,
        };
    }
    match document.field(path) {
        Some(value) => EvaluationResult::from_value(value.clone()),
        None => EvaluationResult::Unset,
    }
}

fn evaluate_function(call: &FunctionExpr, document: &PipelineDocument) -> EvaluationResult {
    use Function::*;
    match call.function() {
        Add | Subtract | Multiply | Divide | Mod | Pow | Sqrt | Exp | Ln | Log | Log10 | Abs
        | Ceil | Floor | Round | RoundToPrecision => arithmetic::evaluate(call, document),
        Equal | NotEqual | LessThan | LessThanOrEqual | GreaterThan | GreaterThanOrEqual
        | IsNull | IsNotNull | IsNan | IsNotNan | Exists => comparison::evaluate(call, document),
        And | Or | Xor | Not | Cond | LogicalMaximum | LogicalMinimum => {
            logical::evaluate(call, document)
        }
        EqAny | NotEqAny | ArrayContains | ArrayContainsAll | ArrayContainsAny | ArrayGet
        | ArrayLength | ArrayReverse | MapGet | MapMerge | MapRemove => {
            containers::evaluate(call, document)
        }
        CharLength | ByteLength | StrConcat | ToLower | ToUpper | Trim | StrContains
        | StartsWith | EndsWith | StrReverse | Substr | Like | RegexContains | RegexMatch
        | Join => strings::evaluate(call, document),
        TimestampAdd | TimestampSub | UnixSecondsToTimestamp | UnixMillisToTimestamp
        | UnixMicrosToTimestamp | TimestampToUnixSeconds | TimestampToUnixMillis
        | TimestampToUnixMicros => timestamps::evaluate(call, document),
    }
}

/// Unwraps an operand that must hold a concrete (non-null) value.
/// The `Err` side carries the propagated result for the whole call.
fn require_concrete(
    function: Function,
    result: EvaluationResult,
) -> Result<FirestoreValue, EvaluationResult> {
    match result {
        EvaluationResult::Value(value) => Ok(value),
        EvaluationResult::Null => Err(EvaluationResult::Error(EvaluationError::null_operand(
            function,
        ))),
        EvaluationResult::Unset => Err(EvaluationResult::Error(EvaluationError::unset_operand(
            function,
        ))),
        error @ EvaluationResult::Error(_) => Err(error),
    }
}

/// Unwraps an operand that must be an arithmetic number.
fn require_numeric(
    function: Function,
    result: EvaluationResult,
) -> Result<Numeric, EvaluationResult> {
    let value = require_concrete(function, result)?;
    value.as_numeric().ok_or_else(|| {
        EvaluationResult::Error(EvaluationError::type_mismatch(function, "number", &value))
    })
}

/// Unwraps an operand that must be a string.
fn require_string(
    function: Function,
    result: EvaluationResult,
) -> Result<String, EvaluationResult> {
    let value = require_concrete(function, result)?;
    match value.kind() {
        ValueKind::String(string) => Ok(string.clone()),
        _ => Err(EvaluationResult::Error(EvaluationError::type_mismatch(
            function, "string", &value,
        ))),
    }
}

/// Unwraps an operand that must be a boolean.
fn require_boolean(function: Function, result: EvaluationResult) -> Result<bool, EvaluationResult> {
    let value = require_concrete(function, result)?;
    match value.kind() {
        ValueKind::Boolean(boolean) => Ok(*boolean),
        _ => Err(EvaluationResult::Error(EvaluationError::type_mismatch(
            function, "boolean", &value,
        ))),
    }
}

/// Unwraps an operand that must be a 64-bit integer (Int32 widens).
fn require_integer(function: Function, result: EvaluationResult) -> Result<i64, EvaluationResult> {
    match require_numeric(function, result)? {
        Numeric::Integer(value) => Ok(value),
        Numeric::Double(value) => Err(EvaluationResult::Error(EvaluationError::type_mismatch(
            function,
            "integer",
            &FirestoreValue::from_double(value),
        ))),
    }
}
