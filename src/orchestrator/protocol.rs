//! Network Protocol Definitions
//!
//! Data Transfer Objects exchanged over HTTP between clients, the orchestrator
//! and worker agents, plus the endpoint paths they are served on.
//!
//! Operands and results are plain JSON numbers once resolved and JSON strings
//! (a task id or raw token text) otherwise.

use crate::error::ComputeError;
use crate::expression::types::{
    Expression, ExpressionId, ExpressionStatus, Operand, TaskId, TaskOutcome,
};
use serde::{Deserialize, Serialize};

pub const ENDPOINT_CALCULATE: &str = "/api/v1/calculate";
pub const ENDPOINT_EXPRESSIONS: &str = "/api/v1/expressions";
pub const ENDPOINT_EXPRESSION_BY_ID: &str = "/api/v1/expressions/:id";
pub const ENDPOINT_TASK: &str = "/internal/task";
pub const ENDPOINT_STATS: &str = "/internal/stats";

/// A number or an unresolved textual value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
    Number(f64),
    Text(String),
}

impl From<&Operand> for WireValue {
    fn from(operand: &Operand) -> Self {
        match operand {
            Operand::Value(value) => WireValue::Number(*value),
            Operand::Reference(id) => WireValue::Text(id.0.clone()),
            Operand::Literal(text) => WireValue::Text(text.clone()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalculateRequest {
    pub expression: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalculateResponse {
    pub id: ExpressionId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionView {
    pub id: ExpressionId,
    pub status: ExpressionStatus,
    pub result: Option<WireValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Expression> for ExpressionView {
    fn from(expression: &Expression) -> Self {
        Self {
            id: expression.id.clone(),
            status: expression.status,
            result: expression.result.as_ref().map(WireValue::from),
            error: expression.error.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExpressionListResponse {
    pub expressions: Vec<ExpressionView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExpressionResponse {
    pub expression: ExpressionView,
}

/// A task as seen by a worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub id: TaskId,
    pub arg1: WireValue,
    pub arg2: WireValue,
    /// Operator symbol (`+`, `-`, `*`, `/`).
    pub operation: String,
    /// Expected processing time in milliseconds.
    pub operation_time: u64,
    pub result: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FetchTaskResponse {
    pub task: Option<TaskAssignment>,
}

/// A worker's report. Exactly one of `result` and `error` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTaskResultRequest {
    pub id: TaskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmitTaskResultRequest {
    pub fn new(id: TaskId, computed: &Result<f64, ComputeError>) -> Self {
        match computed {
            Ok(value) => Self {
                id,
                result: Some(*value),
                error: None,
            },
            Err(e) => Self {
                id,
                result: None,
                error: Some(e.to_string()),
            },
        }
    }

    /// Returns `None` when both or neither of `result` and `error` are set.
    pub fn outcome(&self) -> Option<TaskOutcome> {
        match (&self.result, &self.error) {
            (Some(value), None) => Some(TaskOutcome::Value(*value)),
            (None, Some(error)) => Some(TaskOutcome::Failed(error.clone())),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitTaskResultResponse {
    pub message: String,
}
