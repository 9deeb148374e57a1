//! Expression Registry
//!
//! Maps expression ids to their lifecycle state. Expressions are kept for the
//! lifetime of the process and listed in submission order.

use crate::expression::types::{Expression, ExpressionId, ExpressionStatus, Operand, TaskId};

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct ExpressionRegistry {
    expressions: HashMap<ExpressionId, Expression>,
    order: Vec<ExpressionId>,
}

impl ExpressionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, expression: Expression) {
        if !self.expressions.contains_key(&expression.id) {
            self.order.push(expression.id.clone());
        }
        self.expressions.insert(expression.id.clone(), expression);
    }

    pub fn get(&self, id: &ExpressionId) -> Option<&Expression> {
        self.expressions.get(id)
    }

    pub fn list(&self) -> Vec<&Expression> {
        self.order
            .iter()
            .filter_map(|id| self.expressions.get(id))
            .collect()
    }

    /// Moves a pending expression to `InProgress`. Returns true on transition.
    pub fn mark_in_progress(&mut self, id: &ExpressionId) -> bool {
        match self.expressions.get_mut(id) {
            Some(expression) if expression.status == ExpressionStatus::Pending => {
                expression.status = ExpressionStatus::InProgress;
                true
            }
            _ => false,
        }
    }

    /// Completes the expression if `task_id` is its final task.
    pub fn complete(&mut self, id: &ExpressionId, task_id: &TaskId, value: f64) -> bool {
        let Some(expression) = self.awaiting(id, task_id) else {
            return false;
        };

        expression.status = ExpressionStatus::Completed;
        expression.result = Some(Operand::Value(value));
        true
    }

    /// Fails the expression if `task_id` is its final task.
    pub fn fail(&mut self, id: &ExpressionId, task_id: &TaskId, error: &str) -> bool {
        let Some(expression) = self.awaiting(id, task_id) else {
            return false;
        };

        expression.status = ExpressionStatus::Failed;
        expression.result = None;
        expression.error = Some(error.to_string());
        true
    }

    fn awaiting(&mut self, id: &ExpressionId, task_id: &TaskId) -> Option<&mut Expression> {
        self.expressions.get_mut(id).filter(|expression| {
            !expression.is_finished()
                && expression
                    .result
                    .as_ref()
                    .is_some_and(|result| result.is_reference_to(task_id))
        })
    }

    /// Returns `(pending, in_progress, completed, failed)` expression counts.
    pub fn status_counts(&self) -> (usize, usize, usize, usize) {
        let mut pending = 0;
        let mut in_progress = 0;
        let mut completed = 0;
        let mut failed = 0;

        for expression in self.expressions.values() {
            match expression.status {
                ExpressionStatus::Pending => pending += 1,
                ExpressionStatus::InProgress => in_progress += 1,
                ExpressionStatus::Completed => completed += 1,
                ExpressionStatus::Failed => failed += 1,
            }
        }

        (pending, in_progress, completed, failed)
    }
}
