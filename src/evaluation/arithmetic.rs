use crate::evaluation::{
    require_integer, require_numeric, EvaluationError, EvaluationResult,
};
use crate::model::PipelineDocument;
use crate::pipeline::{Function, FunctionExpr};
use crate::value::{FirestoreValue, Numeric};

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
        Function::Add | Function::Subtract | Function::Multiply | Function::Divide
        | Function::Mod => {
            let left = require_numeric(function, operand(0))?;
            let right = require_numeric(function, operand(1))?;
            binary(function, left, right)?
        }
        Function::Pow => {
            let base = require_numeric(function, operand(0))?;
            let exponent = require_numeric(function, operand(1))?;
            pow(function, base.as_f64(), exponent.as_f64())?
        }
        Function::Log => {
            let value = require_numeric(function, operand(0))?;
            let base = require_numeric(function, operand(1))?;
            FirestoreValue::from_double(value.as_f64().log(base.as_f64()))
        }
        Function::Sqrt | Function::Exp | Function::Ln | Function::Log10 => {
            let value = require_numeric(function, operand(0))?.as_f64();
            let computed = match function {
                Function::Sqrt => value.sqrt(),
                Function::Exp => value.exp(),
                Function::Ln => value.ln(),
                _ => value.log10(),
            };
            FirestoreValue::from_double(computed)
        }
        Function::Abs => match require_numeric(function, operand(0))? {
            Numeric::Integer(value) => {
                let absolute = value.checked_abs().ok_or_else(|| {
                    EvaluationResult::Error(EvaluationError::overflow(
                        function,
                        "absolute value not representable",
                    ))
                })?;
                FirestoreValue::from_integer(absolute)
            }
            Numeric::Double(value) => FirestoreValue::from_double(value.abs()),
        },
        Function::Ceil | Function::Floor | Function::Round => {
            match require_numeric(function, operand(0))? {
                Numeric::Integer(value) => FirestoreValue::from_integer(value),
                Numeric::Double(value) => {
                    let computed = match function {
                        Function::Ceil => value.ceil(),
                        Function::Floor => value.floor(),
                        // Half away from zero.
                        _ => value.round(),
                    };
                    FirestoreValue::from_double(computed)
                }
            }
        }
        Function::RoundToPrecision => {
            let value = require_numeric(function, operand(0))?;
            let precision = require_integer(function, operand(1))?;
            round_to_precision(function, value, precision)?
        }
        _ => unreachable!("non-arithmetic function routed to arithmetic"),
    };

    Ok(EvaluationResult::from_value(result))
}

fn binary(
    function: Function,
    left: Numeric,
    right: Numeric,
) -> Result<FirestoreValue, EvaluationResult> {
    if let (Numeric::Integer(l), Numeric::Integer(r)) = (left, right) {
        return integer_binary(function, l, r);
    }

    let (l, r) = (left.as_f64(), right.as_f64());
    let computed = match function {
        Function::Add => l + r,
        Function::Subtract => l - r,
        Function::Multiply => l * r,
        Function::Divide => l / r,
        Function::Mod => l % r,
        _ => unreachable!("non-binary function in binary arithmetic"),
    };
    Ok(FirestoreValue::from_double(computed))
}

fn integer_binary(
    function: Function,
    left: i64,
    right: i64,
) -> Result<FirestoreValue, EvaluationResult> {
    let overflow = || {
        EvaluationResult::Error(EvaluationError::overflow(
            function,
            format!("integer overflow evaluating {left} and {right}"),
        ))
    };
    let computed = match function {
        Function::Add => left.checked_add(right).ok_or_else(overflow)?,
        Function::Subtract => left.checked_sub(right).ok_or_else(overflow)?,
        Function::Multiply => left.checked_mul(right).ok_or_else(overflow)?,
        Function::Divide => {
            if right == 0 {
                return Err(EvaluationResult::Error(EvaluationError::invalid_argument(
                    function,
                    "integer division by zero",
                )));
            }
            left.checked_div(right).ok_or_else(overflow)?
        }
        Function::Mod => {
            if right == 0 {
                return Err(EvaluationResult::Error(EvaluationError::invalid_argument(
                    function,
                    "integer modulo by zero",
                )));
            }
            // i64::MIN % -1 is mathematically zero but traps in hardware.
            left.checked_rem(right).unwrap_or(0)
        }
        _ => unreachable!("non-binary function in integer arithmetic"),
    };
    Ok(FirestoreValue::from_integer(computed))
}

fn pow(function: Function, base: f64, exponent: f64) -> Result<FirestoreValue, EvaluationResult> {
    if base < 0.0 && exponent.is_finite() && exponent.fract() != 0.0 {
        return Err(EvaluationResult::Error(EvaluationError::invalid_argument(
            function,
            format!("negative base {base} with fractional exponent {exponent}"),
        )));
    }
    Ok(FirestoreValue::from_double(base.powf(exponent)))
}

fn round_to_precision(
    function: Function,
    value: Numeric,
    precision: i64,
) -> Result<FirestoreValue, EvaluationResult> {
    if !(-308..=308).contains(&precision) {
        return Err(EvaluationResult::Error(EvaluationError::out_of_range(
            function,
            format!("precision {precision} out of range"),
        )));
    }

    match value {
        Numeric::Integer(integer) => {
            if precision >= 0 {
                return Ok(FirestoreValue::from_integer(integer));
            }
            let digits = -precision as u32;
            // Past 19 digits every i64 rounds to zero.
            if digits > 19 {
                return Ok(FirestoreValue::from_integer(0));
            }
            let scale = 10i128.pow(digits);
            let half = scale / 2;
            let wide = integer as i128;
            let adjusted = if wide >= 0 { wide + half } else { wide - half };
            let rounded = adjusted / scale * scale;
            i64::try_from(rounded)
                .map(FirestoreValue::from_integer)
                .map_err(|_| {
                    EvaluationResult::Error(EvaluationError::overflow(
                        function,
                        "rounded value not representable",
                    ))
                })
        }
        Numeric::Double(double) => {
            if !double.is_finite() {
                return Ok(FirestoreValue::from_double(double));
            }
            let factor = 10f64.powi(precision as i32);
            Ok(FirestoreValue::from_double((double * factor).round() / factor))
        }
    }
}
