//! # transformer-formula
//!
//! Excel-style formula expressions for the transformer service.
//!
//! This crate provides:
//! - Tokenizing (formula text → tokens)
//! - Shunting-yard parsing (tokens → postfix nodes)
//! - Function and operator tables with arity contracts
//! - A two-phase stack evaluator (validate, then execute)
//!
//! Formulas are pure numeric expressions: no variables, no cell lookups.
//!
//! ## Example
//!
//! ```rust
//! use transformer_formula::{evaluate, FormulaError, Scalar};
//!
//! assert_eq!(evaluate("=MAX(1,5,3)*2").unwrap(), Scalar::Int(10));
//! assert_eq!(evaluate("=IF(FALSE(),1)").unwrap(), Scalar::Empty);
//! assert!(matches!(evaluate("=MOD(1)"), Err(FormulaError::Arity { .. })));
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod tokenizer;

pub use ast::Node;
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, evaluate_with, Evaluator, Scalar};
pub use functions::{
    default_functions, default_operators, Arity, Func, FunctionImpl, FunctionTable,
    OperatorTable, Table,
};
pub use parser::{parse, shunting_yard};
pub use tokenizer::{tokenize, Token, TokenSubtype, TokenType};
