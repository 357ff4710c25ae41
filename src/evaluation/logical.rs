use std::cmp::Ordering;

use crate::evaluation::{require_boolean, EvaluationError, EvaluationResult};
use crate::model::PipelineDocument;
use crate::pipeline::{Function, FunctionExpr};
use crate::value::{compare, FirestoreValue, ValueKind};

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

    let result = match function {
        Function::And => short_circuit(call, document, false),
        Function::Or => short_circuit(call, document, true),
        Function::Xor => {
            let mut acc = false;
            for arg in call.args() {
                acc ^= require_boolean(function, super::evaluate(arg, document))?;
            }
            EvaluationResult::Value(FirestoreValue::from_bool(acc))
        }
        Function::Not => {
            let value = require_boolean(function, super::evaluate(&call.args()[0], document))?;
            EvaluationResult::Value(FirestoreValue::from_bool(!value))
        }
        Function::Cond => {
            let condition =
                require_boolean(function, super::evaluate(&call.args()[0], document))?;
            let branch = if condition { 1 } else { 2 };
            // Only the selected branch is evaluated; an error in the
            // untaken branch is invisible.
            super::evaluate(&call.args()[branch], document)
        }
        Function::LogicalMaximum => select_extreme(call, document, Ordering::Greater),
        Function::LogicalMinimum => select_extreme(call, document, Ordering::Less),
        _ => unreachable!("non-logical function routed to logical"),
    };
    Ok(result)
}

/// Left-to-right three-valued walk for `and`/`or`.
///
/// A decisive operand (`false` for and, `true` for or) dominates any
/// error seen before or after it; plain boolean short-circuiting would
/// get that precedence wrong, so the walk is explicit.
fn short_circuit(
    call: &FunctionExpr,
    document: &PipelineDocument,
    decisive: bool,
) -> EvaluationResult {
    let function = call.function();
    let mut pending_error: Option<EvaluationError> = None;

    for arg in call.args() {
        match super::evaluate(arg, document) {
            EvaluationResult::Value(value) => match value.kind() {
                ValueKind::Boolean(boolean) if *boolean == decisive => {
                    return EvaluationResult::Value(FirestoreValue::from_bool(decisive));
                }
                ValueKind::Boolean(_) => {}
                _ => {
                    pending_error.get_or_insert(EvaluationError::type_mismatch(
                        function, "boolean", &value,
                    ));
                }
            },
            EvaluationResult::Null => {
                pending_error.get_or_insert(EvaluationError::null_operand(function));
            }
            EvaluationResult::Unset => {
                pending_error.get_or_insert(EvaluationError::unset_operand(function));
            }
            EvaluationResult::Error(error) => {
                pending_error.get_or_insert(error);
            }
        }
    }

    match pending_error {
        Some(error) => EvaluationResult::Error(error),
        None => EvaluationResult::Value(FirestoreValue::from_bool(!decisive)),
    }
}

/// `logicalMaximum`/`logicalMinimum`: null, unset, and errored operands
/// are skipped; if nothing concrete remains the result is null. The
/// collation total order puts NaN below every number, so the maximum
/// prefers any real number over NaN while the minimum lets NaN win.
fn select_extreme(
    call: &FunctionExpr,
    document: &PipelineDocument,
    keep: Ordering,
) -> EvaluationResult {
    let mut best: Option<FirestoreValue> = None;
    for arg in call.args() {
        let candidate = match super::evaluate(arg, document) {
            EvaluationResult::Value(value) => value,
            _ => continue,
        };
        best = Some(match best.take() {
            None => candidate,
            Some(current) => {
                if compare::compare(&candidate, &current) == keep {
                    candidate
                } else {
                    current
                }
            }
        });
    }
    match best {
        Some(value) => EvaluationResult::Value(value),
        None => EvaluationResult::Null,
    }
}
