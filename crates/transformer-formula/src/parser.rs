//! Formula parser
//!
//! A shunting-yard parser that turns the token stream into postfix order with
//! an output queue and an operator stack. Function calls carry the number of
//! arguments counted at the call site, so evaluation needs no further context.
//!
//! Precedence (highest to lowest):
//! 1. Prefix: -, +
//! 2. Postfix: %
//! 3. Exponentiation: ^
//! 4. Multiplication/Division: *, /
//! 5. Addition/Subtraction: +, -
//! 6. Concatenation: &
//! 7. Comparison: =, <>, <, <=, >, >=

use crate::ast::Node;
use crate::error::{FormulaError, FormulaResult};
use crate::tokenizer::{tokenize, Token, TokenType};

/// Tokenize and parse a formula string into postfix nodes
///
/// # Example
/// ```rust
/// use transformer_formula::{shunting_yard, Node};
///
/// let nodes = shunting_yard("=MAX(1,2)*3").unwrap();
/// assert_eq!(nodes.len(), 5);
/// assert!(matches!(&nodes[2], Node::Function { num_args: 2, .. }));
/// ```
pub fn shunting_yard(formula: &str) -> FormulaResult<Vec<Node>> {
    let tokens = tokenize(formula)?;
    parse(&tokens)
}

/// Parse a token sequence into postfix nodes
pub fn parse(tokens: &[Token]) -> FormulaResult<Vec<Node>> {
    let mut parser = ShuntingYard::default();
    for token in tokens {
        parser.push(token)?;
    }
    parser.finish()
}

/// Entries waiting on the operator stack
#[derive(Debug)]
enum Pending {
    Operator(Token),
    Paren,
    Call { name: String, separators: usize },
}

#[derive(Debug, Default)]
struct ShuntingYard {
    output: Vec<Node>,
    stack: Vec<Pending>,
    /// True when the next token must start an operand
    expect_operand: bool,
    prev: Option<TokenType>,
}

impl ShuntingYard {
    fn push(&mut self, token: &Token) -> FormulaResult<()> {
        if self.prev.is_none() {
            self.expect_operand = true;
        }

        match token.token_type {
            TokenType::Operand | TokenType::Range => {
                self.output.push(Node::from_token(token.clone()));
                self.expect_operand = false;
            }

            TokenType::Function => {
                self.stack.push(Pending::Call {
                    name: token.value.clone(),
                    separators: 0,
                });
                self.expect_operand = true;
            }

            TokenType::OpenParen => {
                self.stack.push(Pending::Paren);
                self.expect_operand = true;
            }

            // Prefix operators never pop: their operand has not been seen yet
            TokenType::OperatorPrefix => {
                self.stack.push(Pending::Operator(token.clone()));
                self.expect_operand = true;
            }

            TokenType::OperatorInfix => {
                if self.expect_operand {
                    return Err(unexpected(token));
                }
                let prec = precedence(token);
                self.pop_operators_while(|top| precedence(top) >= prec);
                self.stack.push(Pending::Operator(token.clone()));
                self.expect_operand = true;
            }

            TokenType::OperatorPostfix => {
                if self.expect_operand {
                    return Err(unexpected(token));
                }
                let prec = precedence(token);
                self.pop_operators_while(|top| precedence(top) > prec);
                self.output.push(Node::Operator(token.clone()));
            }

            TokenType::Separator => {
                if self.expect_operand {
                    return Err(FormulaError::syntax("missing argument before ','"));
                }
                self.pop_operators_while(|_| true);
                match self.stack.last_mut() {
                    Some(Pending::Call { separators, .. }) => *separators += 1,
                    _ => {
                        return Err(FormulaError::syntax(
                            "argument separator outside of a function call",
                        ))
                    }
                }
                self.expect_operand = true;
            }

            TokenType::CloseParen => {
                let empty_call = self.prev == Some(TokenType::Function);
                if self.expect_operand && !empty_call {
                    return Err(FormulaError::syntax("missing operand before ')'"));
                }
                self.pop_operators_while(|_| true);
                match self.stack.pop() {
                    Some(Pending::Paren) => {}
                    Some(Pending::Call { name, separators }) => {
                        let num_args = if empty_call { 0 } else { separators + 1 };
                        self.output.push(Node::Function { name, num_args });
                    }
                    _ => {
                        return Err(FormulaError::syntax(
                            "mismatched parentheses: unexpected ')'",
                        ))
                    }
                }
                self.expect_operand = false;
            }
        }

        self.prev = Some(token.token_type);
        Ok(())
    }

    /// Move operators from the stack to the output while `pred` holds for the
    /// top operator. Stops at the first parenthesis or function call.
    fn pop_operators_while<F: Fn(&Token) -> bool>(&mut self, pred: F) {
        while let Some(Pending::Operator(top)) = self.stack.last() {
            if !pred(top) {
                break;
            }
            if let Some(Pending::Operator(op)) = self.stack.pop() {
                self.output.push(Node::Operator(op));
            }
        }
    }

    fn finish(mut self) -> FormulaResult<Vec<Node>> {
        if self.prev.is_some() && self.expect_operand {
            return Err(FormulaError::syntax("unexpected end of formula"));
        }

        while let Some(pending) = self.stack.pop() {
            match pending {
                Pending::Operator(op) => self.output.push(Node::Operator(op)),
                Pending::Paren | Pending::Call { .. } => {
                    return Err(FormulaError::syntax(
                        "mismatched parentheses: missing ')'",
                    ))
                }
            }
        }

        Ok(self.output)
    }
}

fn precedence(token: &Token) -> u8 {
    match token.token_type {
        TokenType::OperatorPrefix => 7,
        TokenType::OperatorPostfix => 6,
        _ => match token.value.as_str() {
            "^" => 5,
            "*" | "/" => 4,
            "+" | "-" => 3,
            "&" => 2,
            _ => 1,
        },
    }
}

fn unexpected(token: &Token) -> FormulaError {
    FormulaError::syntax(format!("unexpected operator '{}'", token.value))
}
