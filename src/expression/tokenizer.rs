use super::types::{Operation, Token};
use crate::error::ExpressionError;
use regex::Regex;
use std::sync::LazyLock;

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+|[+\-*/]").expect("token pattern is valid"));

/// Characters accepted in raw expression text. Parentheses pass this check
/// but are dropped by the tokenizer.
fn is_allowed(c: char) -> bool {
    c.is_ascii_digit() || c.is_whitespace() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')')
}

/// Rejects text containing anything outside the allow-list.
pub fn validate(text: &str) -> Result<(), ExpressionError> {
    if text.is_empty() {
        return Err(ExpressionError::Empty);
    }
    match text.chars().find(|c| !is_allowed(*c)) {
        Some(c) => Err(ExpressionError::DisallowedCharacter(c)),
        None => Ok(()),
    }
}

/// Splits text into number and operator tokens, skipping everything else.
pub fn tokenize(text: &str) -> Vec<Token> {
    TOKEN_PATTERN
        .find_iter(text)
        .map(|m| match Operation::from_symbol(m.as_str()) {
            Some(op) => Token::Operator(op),
            None => Token::Number(m.as_str().to_string()),
        })
        .collect()
}
