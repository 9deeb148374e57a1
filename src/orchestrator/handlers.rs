use super::protocol::*;
use super::service::Orchestrator;
use crate::error::OrchestratorError;
use crate::expression::types::{ExpressionId, TaskId};

use axum::extract::rejection::JsonRejection;
use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{get, post},
};
use std::sync::Arc;

type ErrorReply = (StatusCode, Json<ErrorResponse>);

fn error_reply(err: &OrchestratorError) -> ErrorReply {
    let status = match err {
        OrchestratorError::InvalidExpression(_) => StatusCode::UNPROCESSABLE_ENTITY,
        OrchestratorError::ExpressionNotFound(_) | OrchestratorError::TaskNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        OrchestratorError::TaskAlreadyCompleted(_) => StatusCode::CONFLICT,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

fn invalid_body(rejection: JsonRejection) -> ErrorReply {
    tracing::warn!("Rejected request body: {}", rejection);
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse {
            error: "invalid data".to_string(),
        }),
    )
}

/// Builds the orchestrator's HTTP router.
pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route(ENDPOINT_CALCULATE, post(handle_calculate))
        .route(ENDPOINT_EXPRESSIONS, get(handle_list_expressions))
        .route(ENDPOINT_EXPRESSION_BY_ID, get(handle_get_expression))
        .route(
            ENDPOINT_TASK,
            get(handle_fetch_task).post(handle_submit_task_result),
        )
        .route(ENDPOINT_STATS, get(handle_stats))
        .layer(Extension(orchestrator))
}

pub async fn handle_calculate(
    Extension(orchestrator): Extension<Arc<Orchestrator>>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CalculateResponse>), ErrorReply> {
    let Json(req) = payload.map_err(invalid_body)?;

    match orchestrator.submit_expression(&req.expression).await {
        Ok(id) => Ok((StatusCode::CREATED, Json(CalculateResponse { id }))),
        Err(e) => Err(error_reply(&e)),
    }
}

pub async fn handle_list_expressions(
    Extension(orchestrator): Extension<Arc<Orchestrator>>,
) -> Json<ExpressionListResponse> {
    let expressions = orchestrator
        .list_expressions()
        .await
        .iter()
        .map(ExpressionView::from)
        .collect();

    Json(ExpressionListResponse { expressions })
}

pub async fn handle_get_expression(
    Extension(orchestrator): Extension<Arc<Orchestrator>>,
    Path(id): Path<String>,
) -> Result<Json<ExpressionResponse>, ErrorReply> {
    let id = ExpressionId(id);

    match orchestrator.get_expression(&id).await {
        Ok(expression) => Ok(Json(ExpressionResponse {
            expression: ExpressionView::from(&expression),
        })),
        Err(e) => {
            tracing::debug!("Expression lookup failed: {}", e);
            Err(error_reply(&e))
        }
    }
}

/// Hands the head of the queue to a worker; 404 with `task: null` when empty.
pub async fn handle_fetch_task(
    Extension(orchestrator): Extension<Arc<Orchestrator>>,
) -> (StatusCode, Json<FetchTaskResponse>) {
    match orchestrator.fetch_task().await {
        Some(dispatched) => {
            let task = dispatched.task;
            (
                StatusCode::OK,
                Json(FetchTaskResponse {
                    task: Some(TaskAssignment {
                        arg1: WireValue::from(&task.operand1),
                        arg2: WireValue::from(&task.operand2),
                        operation: task.operation.symbol().to_string(),
                        operation_time: dispatched.expected_duration.as_millis() as u64,
                        result: None,
                        id: task.id,
                    }),
                }),
            )
        }
        None => (StatusCode::NOT_FOUND, Json(FetchTaskResponse { task: None })),
    }
}

pub async fn handle_submit_task_result(
    Extension(orchestrator): Extension<Arc<Orchestrator>>,
    payload: Result<Json<SubmitTaskResultRequest>, JsonRejection>,
) -> Result<Json<SubmitTaskResultResponse>, ErrorReply> {
    let Json(req) = payload.map_err(invalid_body)?;

    let Some(outcome) = req.outcome() else {
        tracing::warn!("Task {} report must carry exactly one of result/error", req.id);
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: "exactly one of 'result' and 'error' is required".to_string(),
            }),
        ));
    };

    let task_id: TaskId = req.id;
    orchestrator
        .submit_task_result(&task_id, outcome)
        .await
        .map_err(|e| error_reply(&e))?;

    Ok(Json(SubmitTaskResultResponse {
        message: "result submitted".to_string(),
    }))
}

pub async fn handle_stats(
    Extension(orchestrator): Extension<Arc<Orchestrator>>,
) -> Json<super::service::OrchestratorStats> {
    Json(orchestrator.stats().await)
}
