//! Task Store
//!
//! Owns every task ever decomposed, the FIFO dispatch queue and the result map.
//!
//! Only ready tasks (no operand waiting on another task) are ever in the queue.
//! A waiting task is appended to the queue by `resolve_dependents` at the moment
//! its last reference is replaced with a number.

use crate::error::OrchestratorError;
use crate::expression::types::{Operand, Task, TaskId, TaskOutcome};

use std::collections::{HashMap, VecDeque};

#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: HashMap<TaskId, Task>,
    /// Ids of ready tasks, in the order they became ready.
    queue: VecDeque<TaskId>,
    results: HashMap<TaskId, TaskOutcome>,
    /// Reverse edges: task id -> tasks holding a reference to it.
    dependents: HashMap<TaskId, Vec<TaskId>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts freshly decomposed tasks, preserving their order in the queue.
    pub fn register(&mut self, tasks: Vec<Task>) {
        for task in tasks {
            for slot in [&task.operand1, &task.operand2] {
                if let Operand::Reference(upstream) = slot {
                    let waiting = self.dependents.entry(upstream.clone()).or_default();
                    if !waiting.contains(&task.id) {
                        waiting.push(task.id.clone());
                    }
                }
            }

            if task.is_ready() {
                self.queue.push_back(task.id.clone());
            }

            tracing::debug!(
                "Registered task {} ({:?} {} {:?}, ready={})",
                task.id,
                task.operand1,
                task.operation,
                task.operand2,
                task.is_ready()
            );
            self.tasks.insert(task.id.clone(), task);
        }
    }

    /// Removes the head of the queue. Entries whose task already has a result
    /// (submitted or poisoned before dispatch) are skipped.
    pub fn pull(&mut self) -> Option<Task> {
        while let Some(id) = self.queue.pop_front() {
            match self.tasks.get(&id) {
                Some(task) if !task.is_completed() => return Some(task.clone()),
                _ => {
                    tracing::trace!("Skipping queued task {} (already resolved)", id);
                }
            }
        }
        None
    }

    /// Sets the write-once result of a task and mirrors it into the result map.
    pub fn record_result(
        &mut self,
        id: &TaskId,
        outcome: TaskOutcome,
    ) -> Result<(), OrchestratorError> {
        if let Some(previous) = self.result(id) {
            tracing::debug!("Task {} already resolved as {:?}", id, previous);
            return Err(OrchestratorError::TaskAlreadyCompleted(id.clone()));
        }

        let task = self
            .tasks
            .get_mut(id)
            .ok_or_else(|| OrchestratorError::TaskNotFound(id.clone()))?;

        task.result = Some(outcome.clone());
        self.results.insert(id.clone(), outcome);
        Ok(())
    }

    /// Replaces references to `id` with `value` in every dependent task.
    ///
    /// Returns the tasks that became ready and were appended to the queue.
    pub fn resolve_dependents(&mut self, id: &TaskId, value: f64) -> Vec<TaskId> {
        let mut released = Vec::new();

        for dependent_id in self.dependents_of(id) {
            let Some(dependent) = self.tasks.get_mut(&dependent_id) else {
                continue;
            };

            if dependent.resolve(id, value) && dependent.is_ready() && !dependent.is_completed() {
                self.queue.push_back(dependent_id.clone());
                released.push(dependent_id);
            }
        }

        released
    }

    /// Tasks still holding a reference to `id`. Edges whose reference was
    /// already replaced with a value are left out.
    pub fn dependents_of(&self, id: &TaskId) -> Vec<TaskId> {
        self.dependents
            .get(id)
            .into_iter()
            .flatten()
            .filter(|dependent| {
                self.tasks
                    .get(*dependent)
                    .is_some_and(|task| task.depends_on(id))
            })
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn result(&self, id: &TaskId) -> Option<&TaskOutcome> {
        self.results.get(id)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `(waiting, completed, failed)` task counts.
    pub fn status_counts(&self) -> (usize, usize, usize) {
        let mut waiting = 0;
        let mut completed = 0;
        let mut failed = 0;

        for task in self.tasks.values() {
            match &task.result {
                None if !task.is_ready() => waiting += 1,
                None => {}
                Some(TaskOutcome::Value(_)) => completed += 1,
                Some(TaskOutcome::Failed(_)) => failed += 1,
            }
        }

        (waiting, completed, failed)
    }
}
