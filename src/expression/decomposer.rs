//! Expression Decomposer
//!
//! Turns a flat token stream into an ordered list of binary tasks.
//!
//! The stream is reduced once per precedence tier (`*` `/` first, then `+` `-`),
//! left to right. Each operator of the current tier takes the nearest unconsumed
//! slot on its left and the next slot on its right as operands; both are replaced
//! by a reference to the newly created task. Chains like `2 + 2 + 2` therefore
//! reduce as `(2 + 2) + 2`.

use super::types::{ExpressionId, Operand, Task, TaskId, Tier, Token};
use crate::error::ExpressionError;

/// The output of decomposing one expression.
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// Tasks in creation order: every multiplicative task precedes every additive one.
    pub tasks: Vec<Task>,
    /// The task whose result is the value of the whole expression.
    /// `None` when the expression is a single number.
    pub final_task: Option<TaskId>,
}

/// Working slot: an untouched token or a task created earlier in the reduction.
#[derive(Debug, Clone)]
enum Slot {
    Token(Token),
    Task(TaskId),
}

impl Slot {
    /// Digit runs too long for `f64` parse to infinity, which has no JSON form;
    /// they stay literal so the worker reports them as malformed.
    fn into_operand(self) -> Operand {
        match self {
            Slot::Task(id) => Operand::Reference(id),
            Slot::Token(token) => match token.text().parse::<f64>() {
                Ok(value) if value.is_finite() => Operand::Value(value),
                _ => Operand::Literal(token.text().to_string()),
            },
        }
    }
}

pub fn decompose(
    expression_id: &ExpressionId,
    tokens: Vec<Token>,
) -> Result<Decomposition, ExpressionError> {
    if tokens.is_empty() {
        return Err(ExpressionError::Empty);
    }

    let mut tasks = Vec::new();
    let mut slots: Vec<Slot> = tokens.into_iter().map(Slot::Token).collect();

    for tier in Tier::ORDER {
        slots = reduce_tier(slots, tier, expression_id, &mut tasks)?;
    }

    let final_task = match slots.as_slice() {
        [Slot::Task(id)] => Some(id.clone()),
        [Slot::Token(Token::Number(_))] => None,
        remaining => {
            return Err(ExpressionError::Unreduced {
                remaining: remaining.len(),
            });
        }
    };

    tracing::debug!(
        "Decomposed expression {} into {} tasks",
        expression_id,
        tasks.len()
    );

    Ok(Decomposition { tasks, final_task })
}

/// One left-to-right pass for a single tier. Consumed slots are dropped as the
/// pass goes, so the returned sequence is already compacted.
fn reduce_tier(
    slots: Vec<Slot>,
    tier: Tier,
    expression_id: &ExpressionId,
    tasks: &mut Vec<Task>,
) -> Result<Vec<Slot>, ExpressionError> {
    let mut reduced: Vec<Slot> = Vec::with_capacity(slots.len());
    let mut input = slots.into_iter().enumerate();

    while let Some((position, slot)) = input.next() {
        let operation = match slot {
            Slot::Token(Token::Operator(op)) if op.tier() == tier => op,
            other => {
                reduced.push(other);
                continue;
            }
        };

        let missing = ExpressionError::MissingOperand {
            operator: operation,
            position,
        };
        let left = reduced.pop().ok_or_else(|| missing.clone())?;
        let (_, right) = input.next().ok_or(missing)?;

        let task = Task::new(
            expression_id.clone(),
            operation,
            left.into_operand(),
            right.into_operand(),
        );
        reduced.push(Slot::Task(task.id.clone()));
        tasks.push(task);
    }

    Ok(reduced)
}
