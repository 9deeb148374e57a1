//! Orchestrator Module Tests
//!
//! ## Test Scopes
//! - **Dispatch**: queue order, readiness gating, empty-queue behaviour.
//! - **Propagation**: operand substitution, expression completion, failure poisoning.
//! - **Rejections**: unknown ids and duplicate results leave state untouched.
//! - **Handlers**: HTTP status mapping of the Axum handlers.
//! - **Concurrency**: many expressions computed by concurrent callers.

#[cfg(test)]
mod tests {
    use crate::config::OperationDurations;
    use crate::error::OrchestratorError;
    use crate::expression::types::{
        ExpressionId, ExpressionStatus, Operand, Operation, TaskId, TaskOutcome,
    };
    use crate::orchestrator::handlers::*;
    use crate::orchestrator::protocol::*;
    use crate::orchestrator::service::Orchestrator;
    use crate::orchestrator::store::TaskStore;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::{Extension, Json};
    use std::sync::Arc;
    use std::time::Duration;

    fn orchestrator() -> Arc<Orchestrator> {
        Orchestrator::new(OperationDurations::uniform(Duration::from_millis(1000)))
    }

    /// Evaluates every dispatched task locally until the queue is empty.
    async fn drain(orchestrator: &Orchestrator) {
        while let Some(dispatched) = orchestrator.fetch_task().await {
            let task = dispatched.task;
            let value = |operand: &Operand| match operand {
                Operand::Value(v) => *v,
                other => panic!("dispatched task with unresolved operand {:?}", other),
            };
            let (a, b) = (value(&task.operand1), value(&task.operand2));
            let outcome = match task.operation {
                Operation::Add => TaskOutcome::Value(a + b),
                Operation::Subtract => TaskOutcome::Value(a - b),
                Operation::Multiply => TaskOutcome::Value(a * b),
                Operation::Divide if b == 0.0 => TaskOutcome::Failed("division by zero".into()),
                Operation::Divide => TaskOutcome::Value(a / b),
            };
            orchestrator
                .submit_task_result(&task.id, outcome)
                .await
                .unwrap();
        }
    }

    // ============================================================
    // TEST 1: Dispatch order and readiness
    // ============================================================

    #[tokio::test]
    async fn test_multiplication_dispatched_before_addition() {
        // ARRANGE
        let orchestrator = orchestrator();
        orchestrator.submit_expression("2 + 3 * 4").await.unwrap();

        // ACT
        let first = orchestrator.fetch_task().await.unwrap();

        // ASSERT: '*' with literal operands; '+' is not ready yet
        assert_eq!(first.task.operation, Operation::Multiply);
        assert_eq!(first.task.operand1, Operand::Value(3.0));
        assert_eq!(first.task.operand2, Operand::Value(4.0));
        assert_eq!(first.expected_duration, Duration::from_millis(1000));
        assert!(orchestrator.fetch_task().await.is_none());

        // ACT: report the product
        orchestrator
            .submit_task_result(&first.task.id, TaskOutcome::Value(12.0))
            .await
            .unwrap();

        // ASSERT: '+' released with the substituted operand
        let second = orchestrator.fetch_task().await.unwrap();
        assert_eq!(second.task.operation, Operation::Add);
        assert_eq!(second.task.operand1, Operand::Value(2.0));
        assert_eq!(second.task.operand2, Operand::Value(12.0));
    }

    #[tokio::test]
    async fn test_expression_completes_with_final_result() {
        // ARRANGE
        let orchestrator = orchestrator();
        let id = orchestrator.submit_expression("2 + 3 * 4").await.unwrap();

        let expression = orchestrator.get_expression(&id).await.unwrap();
        assert_eq!(expression.status, ExpressionStatus::Pending);
        assert!(matches!(expression.result, Some(Operand::Reference(_))));

        // ACT
        let mul = orchestrator.fetch_task().await.unwrap().task;
        assert_eq!(
            orchestrator.get_expression(&id).await.unwrap().status,
            ExpressionStatus::InProgress
        );
        orchestrator
            .submit_task_result(&mul.id, TaskOutcome::Value(12.0))
            .await
            .unwrap();

        let add = orchestrator.fetch_task().await.unwrap().task;
        let propagation = orchestrator
            .submit_task_result(&add.id, TaskOutcome::Value(14.0))
            .await
            .unwrap();

        // ASSERT
        assert_eq!(propagation.finished_expression, Some(id.clone()));
        let expression = orchestrator.get_expression(&id).await.unwrap();
        assert_eq!(expression.status, ExpressionStatus::Completed);
        assert_eq!(expression.result, Some(Operand::Value(14.0)));
        assert_eq!(expression.text, "2 + 3 * 4");
    }

    #[tokio::test]
    async fn test_chained_addition_resolves_in_order() {
        let orchestrator = orchestrator();
        let id = orchestrator.submit_expression("2 + 2 + 2").await.unwrap();

        let first = orchestrator.fetch_task().await.unwrap().task;
        assert!(orchestrator.fetch_task().await.is_none());

        let propagation = orchestrator
            .submit_task_result(&first.id, TaskOutcome::Value(4.0))
            .await
            .unwrap();
        assert_eq!(propagation.released.len(), 1);

        let second = orchestrator.fetch_task().await.unwrap().task;
        assert_eq!(second.id, propagation.released[0]);
        assert_eq!(second.operand1, Operand::Value(4.0));
        assert_eq!(second.operand2, Operand::Value(2.0));

        orchestrator
            .submit_task_result(&second.id, TaskOutcome::Value(6.0))
            .await
            .unwrap();
        let expression = orchestrator.get_expression(&id).await.unwrap();
        assert_eq!(expression.result, Some(Operand::Value(6.0)));
    }

    #[tokio::test]
    async fn test_fetch_on_empty_queue_returns_none() {
        let orchestrator = orchestrator();

        assert!(orchestrator.fetch_task().await.is_none());
    }

    #[tokio::test]
    async fn test_expected_duration_follows_operator() {
        let durations = OperationDurations {
            addition: Duration::from_millis(10),
            subtraction: Duration::from_millis(20),
            multiplication: Duration::from_millis(30),
            division: Duration::from_millis(40),
        };
        let orchestrator = Orchestrator::new(durations);
        orchestrator.submit_expression("8 / 2").await.unwrap();
        orchestrator.submit_expression("8 - 2").await.unwrap();

        let div = orchestrator.fetch_task().await.unwrap();
        let sub = orchestrator.fetch_task().await.unwrap();

        assert_eq!(div.expected_duration, Duration::from_millis(40));
        assert_eq!(sub.expected_duration, Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_single_number_never_completes() {
        let orchestrator = orchestrator();
        let id = orchestrator.submit_expression("42").await.unwrap();

        assert!(orchestrator.fetch_task().await.is_none());
        let expression = orchestrator.get_expression(&id).await.unwrap();
        assert_eq!(expression.status, ExpressionStatus::Pending);
        assert_eq!(expression.result, None);
    }

    // ============================================================
    // TEST 2: Rejections
    // ============================================================

    #[tokio::test]
    async fn test_invalid_expression_registers_nothing() {
        let orchestrator = orchestrator();

        for text in ["2 + x", "2 +", "", "3 4"] {
            let result = orchestrator.submit_expression(text).await;
            assert!(
                matches!(result, Err(OrchestratorError::InvalidExpression(_))),
                "expected rejection for {:?}",
                text
            );
        }

        assert!(orchestrator.list_expressions().await.is_empty());
        assert_eq!(orchestrator.stats().await.tasks_total, 0);
    }

    #[tokio::test]
    async fn test_unknown_task_result_is_rejected_without_mutation() {
        // ARRANGE
        let orchestrator = orchestrator();
        orchestrator.submit_expression("1 + 2").await.unwrap();
        let before = orchestrator.stats().await;

        // ACT
        let unknown = TaskId::new();
        let result = orchestrator
            .submit_task_result(&unknown, TaskOutcome::Value(3.0))
            .await;

        // ASSERT
        assert_eq!(result, Err(OrchestratorError::TaskNotFound(unknown)));
        assert_eq!(orchestrator.stats().await, before);
    }

    #[tokio::test]
    async fn test_unknown_expression_is_not_found() {
        let orchestrator = orchestrator();
        let id = ExpressionId::new();

        assert_eq!(
            orchestrator.get_expression(&id).await,
            Err(OrchestratorError::ExpressionNotFound(id))
        );
    }

    #[tokio::test]
    async fn test_duplicate_result_is_rejected() {
        let orchestrator = orchestrator();
        let id = orchestrator.submit_expression("5 * 5").await.unwrap();
        let task = orchestrator.fetch_task().await.unwrap().task;

        orchestrator
            .submit_task_result(&task.id, TaskOutcome::Value(25.0))
            .await
            .unwrap();
        let second = orchestrator
            .submit_task_result(&task.id, TaskOutcome::Value(99.0))
            .await;

        assert_eq!(
            second,
            Err(OrchestratorError::TaskAlreadyCompleted(task.id.clone()))
        );
        let stored = orchestrator.get_task(&task.id).await.unwrap();
        assert_eq!(stored.result, Some(TaskOutcome::Value(25.0)));
        let expression = orchestrator.get_expression(&id).await.unwrap();
        assert_eq!(expression.result, Some(Operand::Value(25.0)));
    }

    // ============================================================
    // TEST 3: Failure propagation
    // ============================================================

    #[tokio::test]
    async fn test_failure_poisons_dependents_and_expression() {
        // ARRANGE: "1 + 10 / 0" -> '/' then '+'
        let orchestrator = orchestrator();
        let id = orchestrator.submit_expression("1 + 10 / 0").await.unwrap();
        let div = orchestrator.fetch_task().await.unwrap().task;

        // ACT
        let propagation = orchestrator
            .submit_task_result(&div.id, TaskOutcome::Failed("division by zero".into()))
            .await
            .unwrap();

        // ASSERT
        assert!(propagation.released.is_empty());
        assert_eq!(propagation.poisoned.len(), 1);
        assert_eq!(propagation.finished_expression, Some(id.clone()));
        assert!(orchestrator.fetch_task().await.is_none());

        let expression = orchestrator.get_expression(&id).await.unwrap();
        assert_eq!(expression.status, ExpressionStatus::Failed);
        assert_eq!(expression.result, None);
        assert_eq!(expression.error.as_deref(), Some("division by zero"));

        let add = orchestrator.get_task(&propagation.poisoned[0]).await.unwrap();
        assert_eq!(
            add.result,
            Some(TaskOutcome::Failed("division by zero".into()))
        );
    }

    #[tokio::test]
    async fn test_failure_does_not_touch_other_expressions() {
        let orchestrator = orchestrator();
        let bad = orchestrator.submit_expression("4 / 0").await.unwrap();
        let good = orchestrator.submit_expression("4 / 2").await.unwrap();

        drain(&orchestrator).await;

        assert_eq!(
            orchestrator.get_expression(&bad).await.unwrap().status,
            ExpressionStatus::Failed
        );
        let good = orchestrator.get_expression(&good).await.unwrap();
        assert_eq!(good.status, ExpressionStatus::Completed);
        assert_eq!(good.result, Some(Operand::Value(2.0)));
    }

    // ============================================================
    // TEST 4: Task store
    // ============================================================

    #[test]
    fn test_store_skips_tasks_resolved_before_dispatch() {
        let decomposition =
            crate::expression::parse(&ExpressionId::new(), "1 + 1").unwrap();
        let id = decomposition.tasks[0].id.clone();
        let mut store = TaskStore::new();
        store.register(decomposition.tasks);

        store
            .record_result(&id, TaskOutcome::Value(2.0))
            .unwrap();

        assert!(store.pull().is_none());
        assert_eq!(store.result(&id), Some(&TaskOutcome::Value(2.0)));
    }

    #[test]
    fn test_store_dependents_drop_resolved_edges() {
        // ARRANGE: "2 * 3 + 1" -> '*' then '+' referencing it
        let decomposition =
            crate::expression::parse(&ExpressionId::new(), "2 * 3 + 1").unwrap();
        let mul = decomposition.tasks[0].id.clone();
        let add = decomposition.tasks[1].id.clone();
        let mut store = TaskStore::new();
        store.register(decomposition.tasks);
        assert_eq!(store.dependents_of(&mul), vec![add.clone()]);

        // ACT
        store.record_result(&mul, TaskOutcome::Value(6.0)).unwrap();
        let released = store.resolve_dependents(&mul, 6.0);

        // ASSERT: the edge is gone once the reference became a value
        assert_eq!(released, vec![add.clone()]);
        assert!(store.dependents_of(&mul).is_empty());
        assert_eq!(store.get(&add).unwrap().operand1, Operand::Value(6.0));
        assert_eq!(
            store.record_result(&mul, TaskOutcome::Value(7.0)),
            Err(OrchestratorError::TaskAlreadyCompleted(mul.clone()))
        );
    }

    // ============================================================
    // TEST 5: Listing and concurrency
    // ============================================================

    #[tokio::test]
    async fn test_list_preserves_submission_order() {
        let orchestrator = orchestrator();
        let a = orchestrator.submit_expression("1 + 1").await.unwrap();
        let b = orchestrator.submit_expression("2 * 2").await.unwrap();
        let c = orchestrator.submit_expression("3").await.unwrap();

        let ids: Vec<ExpressionId> = orchestrator
            .list_expressions()
            .await
            .into_iter()
            .map(|e| e.id)
            .collect();

        assert_eq!(ids, vec![a, b, c]);
    }

    #[tokio::test]
    async fn test_concurrent_workers_complete_all_expressions() {
        // ARRANGE
        let orchestrator = orchestrator();
        let mut ids = Vec::new();
        for i in 1..=20 {
            let text = format!("{} + {} * 2 - 6 / 3", i, i);
            ids.push((i as f64 + i as f64 * 2.0 - 2.0, orchestrator.submit_expression(&text).await.unwrap()));
        }

        // ACT: several concurrent "workers" drain the queue
        let mut handles = Vec::new();
        for _ in 0..4 {
            let orchestrator = orchestrator.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    drain(&orchestrator).await;
                    tokio::task::yield_now().await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        drain(&orchestrator).await;

        // ASSERT
        for (expected, id) in ids {
            let expression = orchestrator.get_expression(&id).await.unwrap();
            assert_eq!(expression.status, ExpressionStatus::Completed);
            assert_eq!(expression.result, Some(Operand::Value(expected)));
        }
        let stats = orchestrator.stats().await;
        assert_eq!(stats.tasks_completed, stats.tasks_total);
        assert_eq!(stats.tasks_queued, 0);
    }

    // ============================================================
    // TEST 6: HTTP handlers
    // ============================================================

    #[tokio::test]
    async fn test_handle_calculate_and_get_expression() {
        let orchestrator = orchestrator();

        let (status, Json(created)) = handle_calculate(
            Extension(orchestrator.clone()),
            Ok(Json(CalculateRequest {
                expression: "2 * 3".to_string(),
            })),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(response) =
            handle_get_expression(Extension(orchestrator.clone()), Path(created.id.0.clone()))
                .await
                .unwrap();
        assert_eq!(response.expression.id, created.id);
        assert_eq!(response.expression.status, ExpressionStatus::Pending);
        assert!(matches!(response.expression.result, Some(WireValue::Text(_))));

        let Json(list) = handle_list_expressions(Extension(orchestrator)).await;
        assert_eq!(list.expressions.len(), 1);
    }

    #[tokio::test]
    async fn test_handle_calculate_rejects_invalid_expression() {
        let (status, Json(body)) = handle_calculate(
            Extension(orchestrator()),
            Ok(Json(CalculateRequest {
                expression: "2 + abc".to_string(),
            })),
        )
        .await
        .unwrap_err();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.error.contains("invalid expression"));
    }

    #[tokio::test]
    async fn test_handle_get_unknown_expression() {
        let (status, _) =
            handle_get_expression(Extension(orchestrator()), Path("missing".to_string()))
                .await
                .unwrap_err();

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_handle_task_round_trip() {
        // ARRANGE
        let orchestrator = orchestrator();
        let id = orchestrator.submit_expression("7 - 2").await.unwrap();

        // ACT: fetch
        let (status, Json(fetched)) = handle_fetch_task(Extension(orchestrator.clone())).await;
        assert_eq!(status, StatusCode::OK);
        let task = fetched.task.unwrap();
        assert_eq!(task.operation, "-");
        assert_eq!(task.arg1, WireValue::Number(7.0));
        assert_eq!(task.arg2, WireValue::Number(2.0));
        assert_eq!(task.operation_time, 1000);
        assert_eq!(task.result, None);

        // ACT: submit
        let Json(ack) = handle_submit_task_result(
            Extension(orchestrator.clone()),
            Ok(Json(SubmitTaskResultRequest {
                id: task.id.clone(),
                result: Some(5.0),
                error: None,
            })),
        )
        .await
        .unwrap();
        assert_eq!(ack.message, "result submitted");

        // ASSERT
        let (status, Json(empty)) = handle_fetch_task(Extension(orchestrator.clone())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(empty.task.is_none());

        let expression = orchestrator.get_expression(&id).await.unwrap();
        assert_eq!(expression.result, Some(Operand::Value(5.0)));

        // Duplicate -> 409
        let (status, _) = handle_submit_task_result(
            Extension(orchestrator),
            Ok(Json(SubmitTaskResultRequest {
                id: task.id,
                result: Some(5.0),
                error: None,
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_fetched_out_of_range_literal_survives_the_wire() {
        // ARRANGE: a digit run that overflows f64
        let orchestrator = orchestrator();
        let huge = "9".repeat(400);
        orchestrator
            .submit_expression(&format!("{} + 1", huge))
            .await
            .unwrap();

        // ACT: serialize the fetch response and decode it the way a worker does
        let (status, Json(fetched)) = handle_fetch_task(Extension(orchestrator)).await;
        let body = serde_json::to_string(&fetched).unwrap();
        let decoded: FetchTaskResponse = serde_json::from_str(&body).unwrap();

        // ASSERT
        assert_eq!(status, StatusCode::OK);
        let task = decoded.task.unwrap();
        assert_eq!(task.arg1, WireValue::Text(huge));
        assert_eq!(task.arg2, WireValue::Number(1.0));
    }

    #[tokio::test]
    async fn test_handle_submit_unknown_and_malformed_reports() {
        let orchestrator = orchestrator();

        let (status, _) = handle_submit_task_result(
            Extension(orchestrator.clone()),
            Ok(Json(SubmitTaskResultRequest {
                id: TaskId::new(),
                result: Some(1.0),
                error: None,
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = handle_submit_task_result(
            Extension(orchestrator),
            Ok(Json(SubmitTaskResultRequest {
                id: TaskId::new(),
                result: Some(1.0),
                error: Some("both".to_string()),
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    // ============================================================
    // TEST 7: Wire format
    // ============================================================

    #[test]
    fn test_expression_view_serialization() {
        let view = ExpressionView {
            id: ExpressionId("abc".to_string()),
            status: ExpressionStatus::InProgress,
            result: Some(WireValue::Text("task-1".to_string())),
            error: None,
        };

        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"id": "abc", "status": "in_progress", "result": "task-1"})
        );
    }

    #[test]
    fn test_submit_request_accepts_integer_result() {
        let req: SubmitTaskResultRequest =
            serde_json::from_str(r#"{"id": "t1", "result": 12}"#).unwrap();

        assert_eq!(req.outcome(), Some(TaskOutcome::Value(12.0)));
    }
}
