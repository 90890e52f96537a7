use std::fmt;

use serde::{Deserialize, Serialize};

/// A malformed permission expression.
///
/// Detected eagerly when the expression text is first parsed, never at
/// evaluation time: expression text is static configuration, so a syntax
/// error is a configuration defect and should stop the registration that
/// carries it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxError {
    pub message: String,
    /// The full expression text, when known at the failure site.
    pub expression: Option<String>,
    /// Character offset of the offending token or character.
    pub position: Option<usize>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>) -> Self {
        SyntaxError {
            message: message.into(),
            expression: None,
            position: None,
        }
    }

    pub fn at(message: impl Into<String>, position: usize) -> Self {
        SyntaxError {
            message: message.into(),
            expression: None,
            position: Some(position),
        }
    }

    /// Attach the expression text for the caret diagnostic.
    pub fn with_expression(mut self, text: &str) -> Self {
        self.expression = Some(text.to_owned());
        self
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.expression, self.position) {
            (Some(expr), Some(pos)) => {
                write!(f, "{}\n  {}\n  {}^", self.message, expr, " ".repeat(pos))
            }
            (Some(expr), None) => write!(f, "{}\n  {}", self.message, expr),
            _ => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for SyntaxError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_points_at_position() {
        let err = SyntaxError::at("Unexpected token ')'", 14).with_expression("obj.status == )");
        let rendered = err.to_string();
        assert_eq!(
            rendered,
            "Unexpected token ')'\n  obj.status == )\n                ^"
        );
    }

    #[test]
    fn message_only_when_no_expression() {
        let err = SyntaxError::new("Failed to parse expression");
        assert_eq!(err.to_string(), "Failed to parse expression");
    }

    #[test]
    fn serializes_with_all_fields() {
        let err = SyntaxError::at("Invalid character '$'", 3).with_expression("a $ b");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["message"], "Invalid character '$'");
        assert_eq!(json["position"], 3);
        assert_eq!(json["expression"], "a $ b");
    }
}
