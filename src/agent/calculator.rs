use crate::error::ComputeError;
use crate::expression::types::Operation;
use crate::orchestrator::protocol::{TaskAssignment, WireValue};

/// Converts a wire operand to a number. Text is accepted when it parses as a
/// finite one; anything else (an unresolved task id, an operator token, a digit
/// run beyond `f64` range) is malformed.
pub fn operand_value(value: &WireValue) -> Result<f64, ComputeError> {
    match value {
        WireValue::Number(n) => Ok(*n),
        WireValue::Text(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| ComputeError::MalformedOperand(text.clone())),
    }
}

/// Results must stay finite: JSON has no encoding for infinity or NaN.
pub fn evaluate(operation: Operation, arg1: f64, arg2: f64) -> Result<f64, ComputeError> {
    let value = match operation {
        Operation::Add => arg1 + arg2,
        Operation::Subtract => arg1 - arg2,
        Operation::Multiply => arg1 * arg2,
        Operation::Divide => {
            if arg2 == 0.0 {
                return Err(ComputeError::DivisionByZero);
            }
            arg1 / arg2
        }
    };

    if !value.is_finite() {
        return Err(ComputeError::OutOfRange { operation });
    }
    Ok(value)
}

/// Computes the value of a dispatched task.
pub fn perform_operation(task: &TaskAssignment) -> Result<f64, ComputeError> {
    let operation = Operation::from_symbol(&task.operation)
        .ok_or_else(|| ComputeError::UnknownOperation(task.operation.clone()))?;
    let arg1 = operand_value(&task.arg1)?;
    let arg2 = operand_value(&task.arg2)?;

    evaluate(operation, arg1, arg2)
}
