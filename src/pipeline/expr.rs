use crate::error::FirestoreResult;
use crate::model::{FieldPath, IntoFieldPath};
use crate::pipeline::Function;
use crate::value::FirestoreValue;

/// An immutable expression tree node.
///
/// Trees are built once at query-construction time through the functions
/// in this module, then evaluated against any number of documents; they
/// hold no evaluation state and are safe to share across threads.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Constant(FirestoreValue),
    Field(FieldPath),
    Function(FunctionExpr),
}

/// A function call with its ordered operands. Arity is fixed by the
/// builder that produced the call.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionExpr {
    function: Function,
    args: Vec<Expr>,
}

impl FunctionExpr {
    pub fn function(&self) -> Function {
        self.function
    }

    pub fn args(&self) -> &[Expr] {
        &self.args
    }
}

/// Anything that can stand in operand position: an expression, or a plain
/// value that becomes a constant.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

macro_rules! constant_operand {
    ($($ty:ty),* $(,)?) => {
        $(impl IntoExpr for $ty {
            fn into_expr(self) -> Expr {
                Expr::Constant(self.into())
            }
        })*
    };
}

constant_operand!(
    FirestoreValue,
    bool,
    i32,
    i64,
    f64,
    &str,
    String,
    crate::model::Timestamp,
    crate::model::GeoPoint,
);

/// An expression bound to the output field name it populates.
#[derive(Clone, Debug, PartialEq)]
pub struct AliasedExpr {
    alias: String,
    expr: Expr,
}

impl AliasedExpr {
    pub fn new(alias: impl Into<String>, expr: Expr) -> Self {
        Self {
            alias: alias.into(),
            expr,
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

pub fn constant(value: impl Into<FirestoreValue>) -> Expr {
    Expr::Constant(value.into())
}

pub fn null_value() -> Expr {
    Expr::Constant(FirestoreValue::null())
}

/// A reference to a document field. Dotted paths descend into nested
/// maps; backtick-quoted segments keep literal dots (see
/// [`FieldPath::from_dot_separated`]).
pub fn field(path: impl IntoFieldPath) -> FirestoreResult<Expr> {
    Ok(Expr::Field(path.into_field_path()?))
}

fn unary(function: Function, operand: impl IntoExpr) -> Expr {
    Expr::Function(FunctionExpr {
        function,
        args: vec![operand.into_expr()],
    })
}

fn binary(function: Function, left: impl IntoExpr, right: impl IntoExpr) -> Expr {
    Expr::Function(FunctionExpr {
        function,
        args: vec![left.into_expr(), right.into_expr()],
    })
}

fn nary(function: Function, operands: Vec<Expr>) -> Expr {
    Expr::Function(FunctionExpr {
        function,
        args: operands,
    })
}

pub fn add(left: impl IntoExpr, right: impl IntoExpr) -> Expr {
    binary(Function::Add, left, right)
}

pub fn subtract(left: impl IntoExpr, right: impl IntoExpr) -> Expr {
    binary(Function::Subtract, left, right)
}

pub fn multiply(left: impl IntoExpr, right: impl IntoExpr) -> Expr {
    binary(Function::Multiply, left, right)
}

pub fn divide(left: impl IntoExpr, right: impl IntoExpr) -> Expr {
    binary(Function::Divide, left, right)
}

pub fn modulo(left: impl IntoExpr, right: impl IntoExpr) -> Expr {
    binary(Function::Mod, left, right)
}

pub fn pow(base: impl IntoExpr, exponent: impl IntoExpr) -> Expr {
    binary(Function::Pow, base, exponent)
}

pub fn sqrt(operand: impl IntoExpr) -> Expr {
    unary(Function::Sqrt, operand)
}

pub fn exp(operand: impl IntoExpr) -> Expr {
    unary(Function::Exp, operand)
}

pub fn ln(operand: impl IntoExpr) -> Expr {
    unary(Function::Ln, operand)
}

pub fn log(operand: impl IntoExpr, base: impl IntoExpr) -> Expr {
    binary(Function::Log, operand, base)
}

pub fn log10(operand: impl IntoExpr) -> Expr {
    unary(Function::Log10, operand)
}

pub fn abs(operand: impl IntoExpr) -> Expr {
    unary(Function::Abs, operand)
}

pub fn ceil(operand: impl IntoExpr) -> Expr {
    unary(Function::Ceil, operand)
}

pub fn floor(operand: impl IntoExpr) -> Expr {
    unary(Function::Floor, operand)
}

pub fn round(operand: impl IntoExpr) -> Expr {
    unary(Function::Round, operand)
}

pub fn round_to_precision(operand: impl IntoExpr, precision: impl IntoExpr) -> Expr {
    binary(Function::RoundToPrecision, operand, precision)
}

pub fn eq(left: impl IntoExpr, right: impl IntoExpr) -> Expr {
    binary(Function::Equal, left, right)
}

pub fn neq(left: impl IntoExpr, right: impl IntoExpr) -> Expr {
    binary(Function::NotEqual, left, right)
}

pub fn lt(left: impl IntoExpr, right: impl IntoExpr) -> Expr {
    binary(Function::LessThan, left, right)
}

pub fn lte(left: impl IntoExpr, right: impl IntoExpr) -> Expr {
    binary(Function::LessThanOrEqual, left, right)
}

pub fn gt(left: impl IntoExpr, right: impl IntoExpr) -> Expr {
    binary(Function::GreaterThan, left, right)
}

pub fn gte(left: impl IntoExpr, right: impl IntoExpr) -> Expr {
    binary(Function::GreaterThanOrEqual, left, right)
}

pub fn is_null(operand: impl IntoExpr) -> Expr {
    unary(Function::IsNull, operand)
}

pub fn is_not_null(operand: impl IntoExpr) -> Expr {
    unary(Function::IsNotNull, operand)
}

pub fn is_nan(operand: impl IntoExpr) -> Expr {
    unary(Function::IsNan, operand)
}

pub fn is_not_nan(operand: impl IntoExpr) -> Expr {
    unary(Function::IsNotNan, operand)
}

pub fn exists(operand: impl IntoExpr) -> Expr {
    unary(Function::Exists, operand)
}

pub fn and(operands: Vec<Expr>) -> Expr {
    nary(Function::And, operands)
}

pub fn or(operands: Vec<Expr>) -> Expr {
    nary(Function::Or, operands)
}

pub fn xor(operands: Vec<Expr>) -> Expr {
    nary(Function::Xor, operands)
}

pub fn not(operand: impl IntoExpr) -> Expr {
    unary(Function::Not, operand)
}

/// Evaluates `condition` and returns exactly the selected branch; the
/// branch not taken is never evaluated.
pub fn cond(condition: impl IntoExpr, then: impl IntoExpr, otherwise: impl IntoExpr) -> Expr {
    Expr::Function(FunctionExpr {
        function: Function::Cond,
        args: vec![
            condition.into_expr(),
            then.into_expr(),
            otherwise.into_expr(),
        ],
    })
}

pub fn logical_maximum(operands: Vec<Expr>) -> Expr {
    nary(Function::LogicalMaximum, operands)
}

pub fn logical_minimum(operands: Vec<Expr>) -> Expr {
    nary(Function::LogicalMinimum, operands)
}

pub fn eq_any(value: impl IntoExpr, candidates: impl IntoExpr) -> Expr {
    binary(Function::EqAny, value, candidates)
}

pub fn not_eq_any(value: impl IntoExpr, candidates: impl IntoExpr) -> Expr {
    binary(Function::NotEqAny, value, candidates)
}

pub fn array_contains(array: impl IntoExpr, value: impl IntoExpr) -> Expr {
    binary(Function::ArrayContains, array, value)
}

pub fn array_contains_all(array: impl IntoExpr, values: impl IntoExpr) -> Expr {
    binary(Function::ArrayContainsAll, array, values)
}

pub fn array_contains_any(array: impl IntoExpr, values: impl IntoExpr) -> Expr {
    binary(Function::ArrayContainsAny, array, values)
}

pub fn array_get(array: impl IntoExpr, index: impl IntoExpr) -> Expr {
    binary(Function::ArrayGet, array, index)
}

pub fn array_length(array: impl IntoExpr) -> Expr {
    unary(Function::ArrayLength, array)
}

pub fn array_reverse(array: impl IntoExpr) -> Expr {
    unary(Function::ArrayReverse, array)
}

/// Looks up one literal key in a map. A key containing dots addresses the
/// field with that exact compound name; no path traversal happens here.
pub fn map_get(map: impl IntoExpr, key: impl IntoExpr) -> Expr {
    binary(Function::MapGet, map, key)
}

pub fn map_merge(map: impl IntoExpr, overlay: impl IntoExpr) -> Expr {
    binary(Function::MapMerge, map, overlay)
}

pub fn map_remove(map: impl IntoExpr, key: impl IntoExpr) -> Expr {
    binary(Function::MapRemove, map, key)
}

pub fn char_length(operand: impl IntoExpr) -> Expr {
    unary(Function::CharLength, operand)
}

pub fn byte_length(operand: impl IntoExpr) -> Expr {
    unary(Function::ByteLength, operand)
}

pub fn str_concat(operands: Vec<Expr>) -> Expr {
    nary(Function::StrConcat, operands)
}

pub fn to_lower(operand: impl IntoExpr) -> Expr {
    unary(Function::ToLower, operand)
}

pub fn to_upper(operand: impl IntoExpr) -> Expr {
    unary(Function::ToUpper, operand)
}

pub fn trim(operand: impl IntoExpr) -> Expr {
    unary(Function::Trim, operand)
}

pub fn str_contains(value: impl IntoExpr, substring: impl IntoExpr) -> Expr {
    binary(Function::StrContains, value, substring)
}

pub fn starts_with(value: impl IntoExpr, prefix: impl IntoExpr) -> Expr {
    binary(Function::StartsWith, value, prefix)
}

pub fn ends_with(value: impl IntoExpr, suffix: impl IntoExpr) -> Expr {
    binary(Function::EndsWith, value, suffix)
}

pub fn str_reverse(operand: impl IntoExpr) -> Expr {
    unary(Function::StrReverse, operand)
}

/// Code-point based substring: zero-based `position` and `length`.
pub fn substr(value: impl IntoExpr, position: impl IntoExpr, length: impl IntoExpr) -> Expr {
    Expr::Function(FunctionExpr {
        function: Function::Substr,
        args: vec![value.into_expr(), position.into_expr(), length.into_expr()],
    })
}

/// SQL-style pattern match: `%` matches any run of characters, `_` a
/// single character.
pub fn like(value: impl IntoExpr, pattern: impl IntoExpr) -> Expr {
    binary(Function::Like, value, pattern)
}

pub fn regex_contains(value: impl IntoExpr, pattern: impl IntoExpr) -> Expr {
    binary(Function::RegexContains, value, pattern)
}

pub fn regex_match(value: impl IntoExpr, pattern: impl IntoExpr) -> Expr {
    binary(Function::RegexMatch, value, pattern)
}

pub fn join(array: impl IntoExpr, delimiter: impl IntoExpr) -> Expr {
    binary(Function::Join, array, delimiter)
}

pub fn timestamp_add(timestamp: impl IntoExpr, unit: impl IntoExpr, amount: impl IntoExpr) -> Expr {
    Expr::Function(FunctionExpr {
        function: Function::TimestampAdd,
        args: vec![timestamp.into_expr(), unit.into_expr(), amount.into_expr()],
    })
}

pub fn timestamp_sub(timestamp: impl IntoExpr, unit: impl IntoExpr, amount: impl IntoExpr) -> Expr {
    Expr::Function(FunctionExpr {
        function: Function::TimestampSub,
        args: vec![timestamp.into_expr(), unit.into_expr(), amount.into_expr()],
    })
}

pub fn unix_seconds_to_timestamp(operand: impl IntoExpr) -> Expr {
    unary(Function::UnixSecondsToTimestamp, operand)
}

pub fn unix_millis_to_timestamp(operand: impl IntoExpr) -> Expr {
    unary(Function::UnixMillisToTimestamp, operand)
}

pub fn unix_micros_to_timestamp(operand: impl IntoExpr) -> Expr {
    unary(Function::UnixMicrosToTimestamp, operand)
}

pub fn timestamp_to_unix_seconds(operand: impl IntoExpr) -> Expr {
    unary(Function::TimestampToUnixSeconds, operand)
}

pub fn timestamp_to_unix_millis(operand: impl IntoExpr) -> Expr {
    unary(Function::TimestampToUnixMillis, operand)
}

pub fn timestamp_to_unix_micros(operand: impl IntoExpr) -> Expr {
    unary(Function::TimestampToUnixMicros, operand)
}

impl Expr {
    pub fn alias(self, name: impl Into<String>) -> AliasedExpr {
        AliasedExpr::new(name, self)
    }

    pub fn eq(self, other: impl IntoExpr) -> Expr {
        eq(self, other)
    }

    pub fn neq(self, other: impl IntoExpr) -> Expr {
        neq(self, other)
    }

    pub fn lt(self, other: impl IntoExpr) -> Expr {
        lt(self, other)
    }

    pub fn lte(self, other: impl IntoExpr) -> Expr {
        lte(self, other)
    }

    pub fn gt(self, other: impl IntoExpr) -> Expr {
        gt(self, other)
    }

    pub fn gte(self, other: impl IntoExpr) -> Expr {
        gte(self, other)
    }

    pub fn add(self, other: impl IntoExpr) -> Expr {
        add(self, other)
    }

    pub fn subtract(self, other: impl IntoExpr) -> Expr {
        subtract(self, other)
    }

    pub fn multiply(self, other: impl IntoExpr) -> Expr {
        multiply(self, other)
    }

    pub fn divide(self, other: impl IntoExpr) -> Expr {
        divide(self, other)
    }

    pub fn logical_maximum(self, other: impl IntoExpr) -> Expr {
        logical_maximum(vec![self, other.into_expr()])
    }

    pub fn logical_minimum(self, other: impl IntoExpr) -> Expr {
        logical_minimum(vec![self, other.into_expr()])
    }

    pub fn is_nan(self) -> Expr {
        is_nan(self)
    }

    pub fn is_null(self) -> Expr {
        is_null(self)
    }

    pub fn map_get(self, key: impl IntoExpr) -> Expr {
        map_get(self, key)
    }

    pub fn array_get(self, index: impl IntoExpr) -> Expr {
        array_get(self, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    #[test]
    fn plain_values_become_constants() {
        let expr = add(1i64, 2.5);
        let Expr::Function(call) = &expr else {
            panic!("expected a function call");
        };
        assert_eq!(call.function(), Function::Add);
        assert!(matches!(
            call.args()[0],
            Expr::Constant(ref v) if matches!(v.kind(), ValueKind::Integer(1))
        ));
    }

    #[test]
    fn field_parses_nested_paths() {
        let expr = field("awards.hugo").unwrap();
        let Expr::Field(path) = &expr else {
            panic!("expected a field reference");
        };
        assert_eq!(path.segments(), &["awards", "hugo"]);
    }

    #[test]
    fn fluent_builders_compose() {
        let aliased = field("rating").unwrap().gt(4.5).alias("high");
        assert_eq!(aliased.alias(), "high");
    }
}
