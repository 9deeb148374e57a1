//! Expression Module
//!
//! Converts raw arithmetic text into a dependency graph of binary tasks.
//!
//! ## Pipeline
//! 1. **Validation**: the raw text is checked against a character allow-list
//!    (digits, whitespace, `+ - * / ( )`).
//! 2. **Tokenization**: numbers and operators are extracted, everything else is skipped.
//! 3. **Decomposition**: tokens are reduced tier by tier into `Task`s whose operands
//!    are numbers or references to earlier tasks.
//!
//! Parentheses pass validation but carry no meaning; `(2 + 3) * 4` decomposes
//! exactly like `2 + 3 * 4`.
//!
//! ## Submodules
//! - **`types`**: identifiers, tokens, tasks, expressions.
//! - **`tokenizer`**: allow-list validation and token extraction.
//! - **`decomposer`**: two-tier reduction into tasks.

pub mod decomposer;
pub mod tokenizer;
pub mod types;


use crate::error::ExpressionError;
use decomposer::Decomposition;
use types::ExpressionId;

/// Validates, tokenizes and decomposes `text` in one step.
pub fn parse(expression_id: &ExpressionId, text: &str) -> Result<Decomposition, ExpressionError> {
    tokenizer::validate(text)?;
    let tokens = tokenizer::tokenize(text);
    decomposer::decompose(expression_id, tokens)
}
