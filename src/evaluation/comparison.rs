use std::cmp::Ordering;

use crate::evaluation::{EvaluationError, EvaluationResult};
use crate::model::PipelineDocument;
use crate::pipeline::{Function, FunctionExpr};
use crate::value::{compare, FirestoreValue};

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
        Function::Equal | Function::NotEqual => {
            let negate = function == Function::NotEqual;
            match binary_operands(function, operand(0), operand(1))? {
                None => EvaluationResult::Null,
                Some((left, right)) => {
                    boolean(compare::equals(&left, &right) != negate)
                }
            }
        }
        Function::LessThan
        | Function::LessThanOrEqual
        | Function::GreaterThan
        | Function::GreaterThanOrEqual => {
            match binary_operands(function, operand(0), operand(1))? {
                None => EvaluationResult::Null,
                Some((left, right)) => boolean(ordered(function, &left, &right)),
            }
        }
        Function::IsNull | Function::IsNotNull => {
            let negate = function == Function::IsNotNull;
            match operand(0) {
                EvaluationResult::Null => boolean(!negate),
                EvaluationResult::Value(_) => boolean(negate),
                EvaluationResult::Unset => {
                    return Err(EvaluationResult::Error(EvaluationError::unset_operand(
                        function,
                    )))
                }
                error @ EvaluationResult::Error(_) => return Err(error),
            }
        }
        Function::IsNan | Function::IsNotNan => {
            let negate = function == Function::IsNotNan;
            match operand(0) {
                EvaluationResult::Null => EvaluationResult::Null,
                EvaluationResult::Value(value) if value.is_number() => {
                    boolean(value.is_nan() != negate)
                }
                EvaluationResult::Value(value) => {
                    return Err(EvaluationResult::Error(EvaluationError::type_mismatch(
                        function, "number", &value,
                    )))
                }
                EvaluationResult::Unset => {
                    return Err(EvaluationResult::Error(EvaluationError::unset_operand(
                        function,
                    )))
                }
                error @ EvaluationResult::Error(_) => return Err(error),
            }
        }
        Function::Exists => match operand(0) {
            EvaluationResult::Unset => boolean(false),
            error @ EvaluationResult::Error(_) => return Err(error),
            _ => boolean(true),
        },
        _ => unreachable!("non-comparison function routed to comparison"),
    };
    Ok(result)
}

/// Resolves the two operands of a comparison. `None` signals that one of
/// them was null, which makes the comparison inconclusive rather than
/// failed.
fn binary_operands(
    function: Function,
    left: EvaluationResult,
    right: EvaluationResult,
) -> Result<Option<(FirestoreValue, FirestoreValue)>, EvaluationResult> {
    let resolve = |result: EvaluationResult| match result {
        EvaluationResult::Value(value) => Ok(Some(value)),
        EvaluationResult::Null => Ok(None),
        EvaluationResult::Unset => Err(EvaluationResult::Error(EvaluationError::unset_operand(
            function,
        ))),
        error @ EvaluationResult::Error(_) => Err(error),
    };
    let left = resolve(left)?;
    let right = resolve(right)?;
    match (left, right) {
        (Some(left), Some(right)) => Ok(Some((left, right))),
        _ => Ok(None),
    }
}

/// Ordering comparisons: cross-type-class pairs and NaN operands are
/// false, never errors.
fn ordered(function: Function, left: &FirestoreValue, right: &FirestoreValue) -> bool {
    if left.is_nan() || right.is_nan() {
        return false;
    }
    if compare::type_order(left) != compare::type_order(right) {
        return false;
    }
    let ordering = compare::compare(left, right);
    match function {
        Function::LessThan => ordering == Ordering::Less,
        Function::LessThanOrEqual => ordering != Ordering::Greater,
        Function::GreaterThan => ordering == Ordering::Greater,
        Function::GreaterThanOrEqual => ordering != Ordering::Less,
        _ => unreachable!("non-ordering function in ordered comparison"),
    }
}

fn boolean(value: bool) -> EvaluationResult {
    EvaluationResult::Value(FirestoreValue::from_bool(value))
}
