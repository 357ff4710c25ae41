use crate::evaluation::{
    require_concrete, require_integer, require_string, EvaluationError, EvaluationResult,
};
use crate::model::PipelineDocument;
use crate::pipeline::{Function, FunctionExpr};
use crate::value::{compare, ArrayValue, FirestoreValue, MapValue, ValueKind};

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
        Function::EqAny | Function::NotEqAny => {
            let negate = function == Function::NotEqAny;
            let needle = search_operand(function, operand(0))?;
            let candidates = match array_or_null(function, operand(1))? {
                Some(array) => array,
                None => return Ok(EvaluationResult::Null),
            };
            ternary(membership(&needle, &candidates), negate)
        }
        Function::ArrayContains => {
            let haystack = match array_or_null(function, operand(0))? {
                Some(array) => array,
                None => return Ok(EvaluationResult::Null),
            };
            let needle = search_operand(function, operand(1))?;
            ternary(membership(&needle, &haystack), false)
        }
        Function::ArrayContainsAll | Function::ArrayContainsAny => {
            let haystack = match array_or_null(function, operand(0))? {
                Some(array) => array,
                None => return Ok(EvaluationResult::Null),
            };
            let needles = match array_or_null(function, operand(1))? {
                Some(array) => array,
                None => return Ok(EvaluationResult::Null),
            };
            let want_all = function == Function::ArrayContainsAll;
            let mut unknown = false;
            let mut decided = want_all;
            for needle_value in needles.values() {
                let needle = if needle_value.is_null() {
                    Search::Null
                } else {
                    Search::Value(needle_value.clone())
                };
                match membership(&needle, &haystack) {
                    Ternary::True if !want_all => {
                        decided = true;
                        break;
                    }
                    Ternary::False if want_all => {
                        decided = false;
                        break;
                    }
                    Ternary::Unknown => unknown = true,
                    _ => {}
                }
            }
            if decided != want_all {
                // A decisive miss (containsAll) or hit (containsAny)
                // settles the answer regardless of unknowns.
                boolean(decided)
            } else if unknown {
                EvaluationResult::Null
            } else {
                boolean(decided)
            }
        }
        Function::ArrayGet => {
            let index = require_integer(function, operand(1))?;
            match operand(0) {
                error @ EvaluationResult::Error(_) => return Err(error),
                EvaluationResult::Value(value) => match value.kind() {
                    ValueKind::Array(array) => match array.get_signed(index) {
                        Some(element) => EvaluationResult::from_value(element.clone()),
                        None => EvaluationResult::Unset,
                    },
                    _ => EvaluationResult::Unset,
                },
                // An unresolvable container is unset, not an error.
                _ => EvaluationResult::Unset,
            }
        }
        Function::ArrayLength => {
            let array = require_array(function, operand(0))?;
            EvaluationResult::Value(FirestoreValue::from_integer(array.len() as i64))
        }
        Function::ArrayReverse => {
            let array = require_array(function, operand(0))?;
            let mut values = array.values().to_vec();
            values.reverse();
            EvaluationResult::Value(FirestoreValue::from_array(values))
        }
        Function::MapGet => {
            let key = require_string(function, operand(1))?;
            match operand(0) {
                error @ EvaluationResult::Error(_) => return Err(error),
                EvaluationResult::Value(value) => match value.kind() {
                    // The key is a single literal segment; a dotted name
                    // is looked up verbatim, never traversed.
                    ValueKind::Map(map) => match map.get(&key) {
                        Some(entry) => EvaluationResult::from_value(entry.clone()),
                        None => EvaluationResult::Unset,
                    },
                    _ => EvaluationResult::Unset,
                },
                _ => EvaluationResult::Unset,
            }
        }
        Function::MapMerge => {
            let base = require_map(function, operand(0))?;
            let overlay = require_map(function, operand(1))?;
            EvaluationResult::Value(FirestoreValue::from_map_value(base.merged_with(&overlay)))
        }
        Function::MapRemove => {
            let base = require_map(function, operand(0))?;
            let key = require_string(function, operand(1))?;
            EvaluationResult::Value(FirestoreValue::from_map_value(base.without(&key)))
        }
        _ => unreachable!("non-container function routed to containers"),
    };
    Ok(result)
}

enum Search {
    Null,
    Value(FirestoreValue),
}

enum Ternary {
    True,
    False,
    Unknown,
}

/// Membership under the `equal` operator's semantics. Searching for null
/// finds only null; failing to find it is inconclusive rather than
/// negative, as is any miss in a list that contains null.
fn membership(needle: &Search, haystack: &ArrayValue) -> Ternary {
    let mut saw_null = false;
    for candidate in haystack.values() {
        match needle {
            Search::Null => {
                if candidate.is_null() {
                    return Ternary::True;
                }
            }
            Search::Value(value) => {
                if candidate.is_null() {
                    saw_null = true;
                } else if compare::equals(value, candidate) {
                    return Ternary::True;
                }
            }
        }
    }
    match needle {
        Search::Null => Ternary::Unknown,
        Search::Value(_) if saw_null => Ternary::Unknown,
        Search::Value(_) => Ternary::False,
    }
}

fn ternary(value: Ternary, negate: bool) -> EvaluationResult {
    match value {
        Ternary::True => boolean(!negate),
        Ternary::False => boolean(negate),
        Ternary::Unknown => EvaluationResult::Null,
    }
}

fn boolean(value: bool) -> EvaluationResult {
    EvaluationResult::Value(FirestoreValue::from_bool(value))
}

fn search_operand(
    function: Function,
    result: EvaluationResult,
) -> Result<Search, EvaluationResult> {
    match result {
        EvaluationResult::Null => Ok(Search::Null),
        EvaluationResult::Value(value) => Ok(Search::Value(value)),
        EvaluationResult::Unset => Err(EvaluationResult::Error(EvaluationError::unset_operand(
            function,
        ))),
        error @ EvaluationResult::Error(_) => Err(error),
    }
}

/// An array operand that tolerates null: `Ok(None)` means the operand was
/// null and the operator should be inconclusive, while a concrete
/// non-array value is an error.
fn array_or_null(
    function: Function,
    result: EvaluationResult,
) -> Result<Option<ArrayValue>, EvaluationResult> {
    match result {
        EvaluationResult::Null => Ok(None),
        EvaluationResult::Value(value) => match value.kind() {
            ValueKind::Array(array) => Ok(Some(array.clone())),
            _ => Err(EvaluationResult::Error(EvaluationError::type_mismatch(
                function, "array", &value,
            ))),
        },
        EvaluationResult::Unset => Err(EvaluationResult::Error(EvaluationError::unset_operand(
            function,
        ))),
        error @ EvaluationResult::Error(_) => Err(error),
    }
}

fn require_array(
    function: Function,
    result: EvaluationResult,
) -> Result<ArrayValue, EvaluationResult> {
    let value = require_concrete(function, result)?;
    match value.kind() {
        ValueKind::Array(array) => Ok(array.clone()),
        _ => Err(EvaluationResult::Error(EvaluationError::type_mismatch(
            function, "array", &value,
        ))),
    }
}

fn require_map(
    function: Function,
    result: EvaluationResult,
) -> Result<MapValue, EvaluationResult> {
    let value = require_concrete(function, result)?;
    match value.kind() {
        ValueKind::Map(map) => Ok(map.clone()),
        _ => Err(EvaluationResult::Error(EvaluationError::type_mismatch(
            function, "map", &value,
        ))),
    }
}
