use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a task.
///
/// Wrapper around a UUID string. Operand slots refer to other tasks by this id,
/// never by pointer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generates a new random UUID v4-based TaskId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a submitted expression.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ExpressionId(pub String);

impl ExpressionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for ExpressionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExpressionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The four binary operators understood by the decomposer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl Operation {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::Add),
            "-" => Some(Self::Subtract),
            "*" => Some(Self::Multiply),
            "/" => Some(Self::Divide),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            Self::Multiply | Self::Divide => Tier::Multiplicative,
            Self::Add | Self::Subtract => Tier::Additive,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Precedence group. Tiers are reduced in the order of `Tier::ORDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// `*` and `/`
    Multiplicative,
    /// `+` and `-`
    Additive,
}

impl Tier {
    pub const ORDER: [Tier; 2] = [Tier::Multiplicative, Tier::Additive];
}

/// A lexical unit of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A run of ASCII digits, kept as text.
    Number(String),
    Operator(Operation),
}

impl Token {
    pub fn text(&self) -> &str {
        match self {
            Token::Number(text) => text,
            Token::Operator(op) => op.symbol(),
        }
    }
}

/// Content of a task operand slot (or of an expression's result field).
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A resolved number.
    Value(f64),
    /// Waiting for the result of another task.
    Reference(TaskId),
    /// Token text that is neither a number nor a reference, e.g. an operator
    /// picked up as a neighbour of another operator. Fails at compute time.
    Literal(String),
}

impl Operand {
    pub fn is_reference_to(&self, id: &TaskId) -> bool {
        matches!(self, Operand::Reference(r) if r == id)
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Operand::Reference(_))
    }
}

/// The terminal, write-once result of a task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Value(f64),
    Failed(String),
}

/// An atomic binary operation produced by decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    /// Expression this task was decomposed from.
    pub expression_id: ExpressionId,
    pub operation: Operation,
    pub operand1: Operand,
    pub operand2: Operand,
    pub result: Option<TaskOutcome>,
}

impl Task {
    pub fn new(
        expression_id: ExpressionId,
        operation: Operation,
        operand1: Operand,
        operand2: Operand,
    ) -> Self {
        Self {
            id: TaskId::new(),
            expression_id,
            operation,
            operand1,
            operand2,
            result: None,
        }
    }

    /// A task is ready once neither operand is waiting on another task.
    pub fn is_ready(&self) -> bool {
        !self.operand1.is_unresolved() && !self.operand2.is_unresolved()
    }

    pub fn is_completed(&self) -> bool {
        self.result.is_some()
    }

    /// Replaces every operand slot that references `id` with `value`.
    /// Returns true if at least one slot changed.
    pub fn resolve(&mut self, id: &TaskId, value: f64) -> bool {
        let mut changed = false;
        for slot in [&mut self.operand1, &mut self.operand2] {
            if slot.is_reference_to(id) {
                *slot = Operand::Value(value);
                changed = true;
            }
        }
        changed
    }

    pub fn depends_on(&self, id: &TaskId) -> bool {
        self.operand1.is_reference_to(id) || self.operand2.is_reference_to(id)
    }
}

/// Lifecycle of a submitted expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionStatus {
    /// Registered, no task handed to a worker yet.
    Pending,
    /// At least one task has been handed to a worker.
    InProgress,
    Completed,
    /// A task in the expression's graph failed; the failure is terminal.
    Failed,
}

/// A user-submitted arithmetic string and its evaluation state.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub id: ExpressionId,
    pub text: String,
    pub status: ExpressionStatus,
    /// `Reference(final task)` until that task resolves, then `Value`.
    /// `None` for expressions without a final task (a lone number).
    pub result: Option<Operand>,
    pub error: Option<String>,
}

impl Expression {
    pub fn new(id: ExpressionId, text: impl Into<String>, final_task: Option<TaskId>) -> Self {
        Self {
            id,
            text: text.into(),
            status: ExpressionStatus::Pending,
            result: final_task.map(Operand::Reference),
            error: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.status,
            ExpressionStatus::Completed | ExpressionStatus::Failed
        )
    }
}
