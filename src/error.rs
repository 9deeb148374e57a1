//! Error Types
//!
//! Typed failures for the three layers of the system:
//! - **`ExpressionError`**: the submitted text cannot be turned into a task graph.
//! - **`OrchestratorError`**: a request against the orchestrator state was rejected.
//! - **`ComputeError`**: a worker could not evaluate a single task.

use crate::expression::types::{ExpressionId, Operation, TaskId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("expression contains a disallowed character: {0:?}")]
    DisallowedCharacter(char),

    #[error("expression contains no numbers or operators")]
    Empty,

    #[error("operator '{operator}' at position {position} has no operand on one side")]
    MissingOperand { operator: Operation, position: usize },

    #[error("expression did not reduce to a single value ({remaining} tokens left)")]
    Unreduced { remaining: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrchestratorError {
    #[error("invalid expression: {0}")]
    InvalidExpression(#[from] ExpressionError),

    #[error("expression not found: {0}")]
    ExpressionNotFound(ExpressionId),

    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("task already has a result: {0}")]
    TaskAlreadyCompleted(TaskId),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputeError {
    #[error("invalid argument: {0:?} cannot be converted to a number")]
    MalformedOperand(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("result of {operation} is out of range")]
    OutOfRange { operation: Operation },
}
