//! Result Propagation
//!
//! Pushes a finished task's outcome into everything that references it:
//! dependent tasks in the `TaskStore` and the owning expression in the
//! `ExpressionRegistry`. Callers hold the orchestrator lock for the whole call,
//! so readers never see a half-applied result.
//!
//! Failures are terminal: every task downstream of a failed task receives the
//! same failure as its result and is never dispatched.

use super::registry::ExpressionRegistry;
use super::store::TaskStore;
use crate::error::OrchestratorError;
use crate::expression::types::{ExpressionId, TaskId, TaskOutcome};

/// What a single propagation changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Propagation {
    /// Dependent tasks that became ready and were queued.
    pub released: Vec<TaskId>,
    /// Dependent tasks that inherited a failure.
    pub poisoned: Vec<TaskId>,
    /// Set when the owning expression reached a terminal status.
    pub finished_expression: Option<ExpressionId>,
}

pub fn propagate(
    store: &mut TaskStore,
    registry: &mut ExpressionRegistry,
    task_id: &TaskId,
    outcome: TaskOutcome,
) -> Result<Propagation, OrchestratorError> {
    let expression_id = store
        .get(task_id)
        .map(|task| task.expression_id.clone())
        .ok_or_else(|| OrchestratorError::TaskNotFound(task_id.clone()))?;

    store.record_result(task_id, outcome.clone())?;

    let mut propagation = Propagation::default();

    match outcome {
        TaskOutcome::Value(value) => {
            propagation.released = store.resolve_dependents(task_id, value);
            if registry.complete(&expression_id, task_id, value) {
                propagation.finished_expression = Some(expression_id);
            }
        }
        TaskOutcome::Failed(error) => {
            let mut failed = vec![task_id.clone()];

            while let Some(id) = failed.pop() {
                if registry.fail(&expression_id, &id, &error) {
                    propagation.finished_expression = Some(expression_id.clone());
                }

                for dependent in store.dependents_of(&id) {
                    if store
                        .record_result(&dependent, TaskOutcome::Failed(error.clone()))
                        .is_ok()
                    {
                        propagation.poisoned.push(dependent.clone());
                        failed.push(dependent);
                    }
                }
            }
        }
    }

    Ok(propagation)
}
