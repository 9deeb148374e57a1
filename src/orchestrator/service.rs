//! Orchestrator Service
//!
//! The single owner of all mutable state: the `TaskStore` and the
//! `ExpressionRegistry` live behind one mutex, and every public method is one
//! critical section. This is the dispatch gate workers talk to.

use super::propagator::{Propagation, propagate};
use super::registry::ExpressionRegistry;
use super::store::TaskStore;
use crate::config::OperationDurations;
use crate::error::OrchestratorError;
use crate::expression;
use crate::expression::types::{Expression, ExpressionId, Task, TaskId, TaskOutcome};

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct OrchestratorState {
    tasks: TaskStore,
    expressions: ExpressionRegistry,
}

/// A task handed to a worker together with its processing time hint.
#[derive(Debug, Clone)]
pub struct DispatchedTask {
    pub task: Task,
    pub expected_duration: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrchestratorStats {
    pub expressions_pending: usize,
    pub expressions_in_progress: usize,
    pub expressions_completed: usize,
    pub expressions_failed: usize,
    pub tasks_total: usize,
    pub tasks_queued: usize,
    pub tasks_waiting: usize,
    pub tasks_completed: usize,
    pub tasks_failed: usize,
}

pub struct Orchestrator {
    state: Mutex<OrchestratorState>,
    durations: OperationDurations,
}

impl Orchestrator {
    pub fn new(durations: OperationDurations) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(OrchestratorState::default()),
            durations,
        })
    }

    /// Decomposes `text` and registers the expression with all its tasks.
    ///
    /// Decomposition runs before the lock is taken; on error nothing is registered.
    pub async fn submit_expression(&self, text: &str) -> Result<ExpressionId, OrchestratorError> {
        let expression_id = ExpressionId::new();

        let decomposition = match expression::parse(&expression_id, text) {
            Ok(decomposition) => decomposition,
            Err(e) => {
                tracing::warn!("Rejected expression {:?}: {}", text, e);
                return Err(e.into());
            }
        };

        let task_count = decomposition.tasks.len();
        let expression = Expression::new(expression_id.clone(), text, decomposition.final_task);

        let mut state = self.state.lock().await;
        state.expressions.insert(expression);
        state.tasks.register(decomposition.tasks);

        tracing::info!(
            "Registered expression {} ({:?}) as {} tasks",
            expression_id,
            text,
            task_count
        );

        Ok(expression_id)
    }

    pub async fn list_expressions(&self) -> Vec<Expression> {
        let state = self.state.lock().await;
        state.expressions.list().into_iter().cloned().collect()
    }

    pub async fn get_expression(&self, id: &ExpressionId) -> Result<Expression, OrchestratorError> {
        let state = self.state.lock().await;
        state
            .expressions
            .get(id)
            .cloned()
            .ok_or_else(|| OrchestratorError::ExpressionNotFound(id.clone()))
    }

    #[cfg(test)]
    pub async fn get_task(&self, id: &TaskId) -> Result<Task, OrchestratorError> {
        let state = self.state.lock().await;
        state
            .tasks
            .get(id)
            .cloned()
            .ok_or_else(|| OrchestratorError::TaskNotFound(id.clone()))
    }

    /// Pops the next ready task. `None` means "try again later", not an error.
    pub async fn fetch_task(&self) -> Option<DispatchedTask> {
        let mut state = self.state.lock().await;
        let task = state.tasks.pull()?;

        if state.expressions.mark_in_progress(&task.expression_id) {
            tracing::debug!("Expression {} is now in progress", task.expression_id);
        }

        tracing::info!(
            "Dispatching task {}: {:?} {} {:?}",
            task.id,
            task.operand1,
            task.operation,
            task.operand2
        );

        Some(DispatchedTask {
            expected_duration: self.durations.for_operation(task.operation),
            task,
        })
    }

    /// Stores a worker's outcome and propagates it. Unknown or already
    /// completed ids are rejected without touching any state.
    pub async fn submit_task_result(
        &self,
        id: &TaskId,
        outcome: TaskOutcome,
    ) -> Result<Propagation, OrchestratorError> {
        let mut state = self.state.lock().await;
        let OrchestratorState { tasks, expressions } = &mut *state;

        let propagation = match propagate(tasks, expressions, id, outcome.clone()) {
            Ok(propagation) => propagation,
            Err(e) => {
                tracing::warn!("Rejected result for task {}: {}", id, e);
                return Err(e);
            }
        };

        tracing::debug!(
            "Task {} resolved to {:?}: released {}, poisoned {}",
            id,
            outcome,
            propagation.released.len(),
            propagation.poisoned.len()
        );

        if let Some(expression_id) = &propagation.finished_expression {
            if let Some(expression) = expressions.get(expression_id) {
                tracing::info!(
                    "Expression {} finished: {:?} (result: {:?})",
                    expression_id,
                    expression.status,
                    expression.result
                );
            }
        }

        Ok(propagation)
    }

    pub async fn stats(&self) -> OrchestratorStats {
        let state = self.state.lock().await;
        let (pending, in_progress, completed, failed) = state.expressions.status_counts();
        let (waiting, tasks_completed, tasks_failed) = state.tasks.status_counts();

        OrchestratorStats {
            expressions_pending: pending,
            expressions_in_progress: in_progress,
            expressions_completed: completed,
            expressions_failed: failed,
            tasks_total: state.tasks.task_count(),
            tasks_queued: state.tasks.queue_len(),
            tasks_waiting: waiting,
            tasks_completed,
            tasks_failed,
        }
    }
}
