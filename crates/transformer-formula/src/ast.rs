//! Postfix node types
//!
//! The parser emits formulas as a flat sequence of [`Node`]s in reverse Polish
//! order: every operator and function call follows its operands.

use crate::tokenizer::{Token, TokenSubtype, TokenType};
use std::fmt;

/// A postfix node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal value
    Operand(Token),
    /// Operator occurrence; fixity comes from the token type
    Operator(Token),
    /// Function call site with the number of arguments supplied
    Function { name: String, num_args: usize },
    /// Reference-like literal
    Range(Token),
}

impl Node {
    /// Number of operands an operator node consumes: 2 for infix, 1 otherwise.
    /// `None` for non-operator nodes.
    pub fn operand_count(&self) -> Option<usize> {
        match self {
            Node::Operator(token) if token.is_infix() => Some(2),
            Node::Operator(_) => Some(1),
            _ => None,
        }
    }

    /// Key used to look this node up in a function or operator table.
    ///
    /// Function names are uppercased; unary operators are prefixed with `u`
    /// so `-` in prefix position becomes `u-` and `%` becomes `u%`.
    pub fn table_key(&self) -> Option<String> {
        match self {
            Node::Function { name, .. } => Some(name.to_uppercase()),
            Node::Operator(token) => Some(operator_key(token)),
            Node::Operand(_) | Node::Range(_) => None,
        }
    }

    /// Subtype of an operand or range node
    pub fn subtype(&self) -> Option<TokenSubtype> {
        match self {
            Node::Operand(token) | Node::Range(token) => token.subtype,
            _ => None,
        }
    }

    pub(crate) fn from_token(token: Token) -> Self {
        match token.token_type {
            TokenType::Range => Node::Range(token),
            _ if token.is_operator() => Node::Operator(token),
            _ => Node::Operand(token),
        }
    }
}

/// Table key of an operator token: the symbol, prefixed with `u` when unary
pub(crate) fn operator_key(token: &Token) -> String {
    if token.is_infix() {
        token.value.to_uppercase()
    } else {
        format!("u{}", token.value.to_uppercase())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Operand(token) | Node::Operator(token) | Node::Range(token) => {
                write!(f, "{}", token)
            }
            Node::Function { name, .. } => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_keys() {
        let minus = Node::Operator(Token::new(TokenType::OperatorInfix, "-"));
        assert_eq!(minus.operand_count(), Some(2));
        assert_eq!(minus.table_key().as_deref(), Some("-"));

        let negate = Node::Operator(Token::new(TokenType::OperatorPrefix, "-"));
        assert_eq!(negate.operand_count(), Some(1));
        assert_eq!(negate.table_key().as_deref(), Some("u-"));

        let percent = Node::Operator(Token::new(TokenType::OperatorPostfix, "%"));
        assert_eq!(percent.table_key().as_deref(), Some("u%"));
    }

    #[test]
    fn test_function_key_is_uppercase() {
        let node = Node::Function {
            name: "max".into(),
            num_args: 2,
        };
        assert_eq!(node.table_key().as_deref(), Some("MAX"));
        assert_eq!(node.operand_count(), None);
        assert_eq!(node.to_string(), "max");
    }

    #[test]
    fn test_from_token() {
        let node = Node::from_token(Token::range(TokenSubtype::Text, "A1"));
        assert_eq!(node.subtype(), Some(TokenSubtype::Text));
        assert!(matches!(node, Node::Range(_)));

        let node = Node::from_token(Token::operand(TokenSubtype::Number, "1"));
        assert!(matches!(node, Node::Operand(_)));
    }
}
