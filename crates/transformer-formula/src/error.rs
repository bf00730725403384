//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while tokenizing, parsing or evaluating a formula
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Malformed token stream, mismatched parentheses, disallowed range subtype
    #[error("Invalid Syntax: {0}")]
    Syntax(String),

    /// Function name absent from the active function table
    #[error("Unknown Function: {0}")]
    UnknownFunction(String),

    /// Operator key absent from the active operator table
    #[error("Unknown Operation: {0}")]
    UnknownOperator(String),

    /// Wrong number of arguments for a function or operator
    #[error("Invalid Formula: {name} requires {expected} arguments ({actual} provided)")]
    Arity {
        name: String,
        expected: String,
        actual: usize,
    },

    /// Operand of a type the numeric-only formula contract does not accept
    #[error("Invalid Syntax: {0}")]
    Type(String),

    /// Postfix sequence under- or over-reduced
    #[error("Invalid Formula: {0}")]
    MalformedExpression(String),

    /// Numeric fault while applying a function or operator
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Invalid optional argument
    #[error("Invalid argument: {0}")]
    Argument(String),
}

impl FormulaError {
    /// Stable snake_case name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            FormulaError::Syntax(_) => "syntax",
            FormulaError::UnknownFunction(_) => "unknown_function",
            FormulaError::UnknownOperator(_) => "unknown_operator",
            FormulaError::Arity { .. } => "arity",
            FormulaError::Type(_) => "type",
            FormulaError::MalformedExpression(_) => "malformed_expression",
            FormulaError::Evaluation(_) => "evaluation",
            FormulaError::Argument(_) => "argument",
        }
    }

    pub(crate) fn syntax<S: Into<String>>(msg: S) -> Self {
        FormulaError::Syntax(msg.into())
    }

    pub(crate) fn malformed() -> Self {
        FormulaError::MalformedExpression("formula did not reduce to a single value".into())
    }
}
