use crate::evaluation::{
    require_concrete, require_integer, require_string, EvaluationError, EvaluationResult,
};
use crate::model::{PipelineDocument, Timestamp, MAX_TIMESTAMP_SECONDS, MIN_TIMESTAMP_SECONDS};
use crate::pipeline::{Function, FunctionExpr};
use crate::value::{FirestoreValue, ValueKind};

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
        Function::TimestampAdd | Function::TimestampSub => {
            let sign = if function == Function::TimestampSub {
                -1
            } else {
                1
            };
            shift(function, operand(0), operand(1), operand(2), sign)?
        }
        Function::UnixSecondsToTimestamp => {
            let seconds = require_integer(function, operand(0))?;
            checked(function, Timestamp::new(seconds, 0))?
        }
        Function::UnixMillisToTimestamp => {
            let millis = require_integer(function, operand(0))?;
            checked(function, Timestamp::from_unix_millis(millis))?
        }
        Function::UnixMicrosToTimestamp => {
            let micros = require_integer(function, operand(0))?;
            checked(function, Timestamp::from_unix_micros(micros))?
        }
        Function::TimestampToUnixSeconds
        | Function::TimestampToUnixMillis
        | Function::TimestampToUnixMicros => {
            let timestamp = require_timestamp(function, operand(0))?;
            if !timestamp.in_range() {
                return Err(out_of_range(function));
            }
            let converted = match function {
                Function::TimestampToUnixSeconds => timestamp.seconds,
                Function::TimestampToUnixMillis => timestamp.to_unix_millis(),
                _ => timestamp.to_unix_micros(),
            };
            EvaluationResult::Value(FirestoreValue::from_integer(converted))
        }
        _ => unreachable!("non-timestamp function routed to timestamps"),
    };
    Ok(result)
}

/// `timestampAdd`/`timestampSub`.
///
/// The unit must always be a valid literal; a concrete wrong-typed base
/// or amount errors even when the companion operand is null, and only
/// then does a null or unset base/amount make the whole result null.
fn shift(
    function: Function,
    timestamp_result: EvaluationResult,
    unit_result: EvaluationResult,
    amount_result: EvaluationResult,
    sign: i128,
) -> Result<EvaluationResult, EvaluationResult> {
    let unit = require_string(function, unit_result)?;
    let unit_micros = unit_micros(&unit).ok_or_else(|| {
        EvaluationResult::Error(EvaluationError::invalid_argument(
            function,
            format!("invalid time unit '{unit}'"),
        ))
    })?;

    let timestamp = match timestamp_result {
        error @ EvaluationResult::Error(_) => return Err(error),
        EvaluationResult::Value(value) => match value.kind() {
            ValueKind::Timestamp(timestamp) => Some(*timestamp),
            _ => {
                return Err(EvaluationResult::Error(EvaluationError::type_mismatch(
                    function,
                    "timestamp",
                    &value,
                )))
            }
        },
        EvaluationResult::Null | EvaluationResult::Unset => None,
    };

    let amount = match amount_result {
        error @ EvaluationResult::Error(_) => return Err(error),
        EvaluationResult::Value(value) => match value.as_numeric() {
            Some(crate::value::Numeric::Integer(amount)) => Some(amount),
            _ => {
                return Err(EvaluationResult::Error(EvaluationError::type_mismatch(
                    function,
                    "integer amount",
                    &value,
                )))
            }
        },
        EvaluationResult::Null | EvaluationResult::Unset => None,
    };

    let (Some(timestamp), Some(amount)) = (timestamp, amount) else {
        return Ok(EvaluationResult::Null);
    };

    let total_nanos = timestamp.seconds as i128 * 1_000_000_000
        + timestamp.nanos as i128
        + sign * amount as i128 * unit_micros as i128 * 1_000;
    let seconds = total_nanos.div_euclid(1_000_000_000);
    let nanos = total_nanos.rem_euclid(1_000_000_000) as i32;
    if !(MIN_TIMESTAMP_SECONDS as i128..=MAX_TIMESTAMP_SECONDS as i128).contains(&seconds) {
        return Err(out_of_range(function));
    }

    Ok(EvaluationResult::Value(FirestoreValue::from_timestamp(
        Timestamp::new(seconds as i64, nanos),
    )))
}

fn unit_micros(unit: &str) -> Option<i64> {
    match unit {
        "microsecond" => Some(1),
        "millisecond" => Some(1_000),
        "second" => Some(1_000_000),
        "minute" => Some(60_000_000),
        "hour" => Some(3_600_000_000),
        "day" => Some(86_400_000_000),
        _ => None,
    }
}

fn require_timestamp(
    function: Function,
    result: EvaluationResult,
) -> Result<Timestamp, EvaluationResult> {
    let value = require_concrete(function, result)?;
    match value.kind() {
        ValueKind::Timestamp(timestamp) => Ok(*timestamp),
        _ => Err(EvaluationResult::Error(EvaluationError::type_mismatch(
            function,
            "timestamp",
            &value,
        ))),
    }
}

fn checked(
    function: Function,
    timestamp: Timestamp,
) -> Result<EvaluationResult, EvaluationResult> {
    if !timestamp.in_range() {
        return Err(out_of_range(function));
    }
    Ok(EvaluationResult::Value(FirestoreValue::from_timestamp(
        timestamp,
    )))
}

fn out_of_range(function: Function) -> EvaluationResult {
    EvaluationResult::Error(EvaluationError::out_of_range(
        function,
        "timestamp outside the representable range (years 1-9999)",
    ))
}
