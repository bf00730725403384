//! Formula evaluator
//!
//! Executes a postfix node sequence on a value stack. Evaluation runs in two
//! mandatory phases: a validation pass that checks every function, operator
//! and range node against the active tables, then the execution pass.

use crate::ast::{operator_key, Node};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::{default_functions, default_operators, Table};
use crate::parser::shunting_yard;
use crate::tokenizer::{Token, TokenSubtype};
use std::fmt;

/// The single value a formula reduces to
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Scalar {
    Int(i64),
    Float(f64),
    /// No value, e.g. the omitted false branch of `IF`
    Empty,
}

impl Scalar {
    /// Integer form when `n` has no fractional part, float otherwise
    pub fn from_f64(n: f64) -> Self {
        // 2^63 bounds the exactly representable i64 range
        const LIMIT: f64 = 9_223_372_036_854_775_808.0;
        if n.is_finite() && n.fract() == 0.0 && n >= -LIMIT && n < LIMIT {
            Scalar::Int(n as i64)
        } else {
            Scalar::Float(n)
        }
    }

    /// Logical results are the integers 1 and 0
    pub fn from_bool(b: bool) -> Self {
        Scalar::Int(i64::from(b))
    }

    /// Numeric value, if any
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Empty => None,
        }
    }

    /// Numeric value for arithmetic
    pub fn to_f64(&self) -> FormulaResult<f64> {
        self.as_f64().ok_or_else(|| {
            FormulaError::Type(format!(
                "Only numeric values allowed ({} provided)",
                self.type_name()
            ))
        })
    }

    /// Non-zero numbers are true; `Empty` is false
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Int(i) => *i != 0,
            Scalar::Float(f) => *f != 0.0,
            Scalar::Empty => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Scalar::Empty)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Int(_) => "integer",
            Scalar::Float(_) => "float",
            Scalar::Empty => "empty",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(n) => write!(f, "{}", n),
            Scalar::Empty => Ok(()),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

/// Evaluate a formula with the default function and operator tables
///
/// # Example
/// ```rust
/// use transformer_formula::{evaluate, Scalar};
///
/// assert_eq!(evaluate("=2+3*4").unwrap(), Scalar::Int(14));
/// assert_eq!(evaluate("50%").unwrap(), Scalar::Float(0.5));
/// ```
pub fn evaluate(formula: &str) -> FormulaResult<Scalar> {
    evaluate_with(formula, None, None)
}

/// Evaluate a formula, replacing either table with a caller-supplied one.
/// Defaults are built fresh for any table left as `None`.
pub fn evaluate_with(
    formula: &str,
    functions: Option<&Table>,
    operators: Option<&Table>,
) -> FormulaResult<Scalar> {
    let default_fns;
    let functions = match functions {
        Some(table) => table,
        None => {
            default_fns = default_functions();
            &default_fns
        }
    };

    let default_ops;
    let operators = match operators {
        Some(table) => table,
        None => {
            default_ops = default_operators();
            &default_ops
        }
    };

    Evaluator::new(functions, operators).evaluate(formula)
}

/// Stack machine over a pair of read-only tables
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    functions: &'a Table,
    operators: &'a Table,
}

impl<'a> Evaluator<'a> {
    pub fn new(functions: &'a Table, operators: &'a Table) -> Self {
        Self {
            functions,
            operators,
        }
    }

    /// Parse, validate and execute a formula
    pub fn evaluate(&self, formula: &str) -> FormulaResult<Scalar> {
        let nodes = shunting_yard(formula)?;
        tracing::debug!(formula, nodes = nodes.len(), "parsed formula");

        let result = self.evaluate_nodes(&nodes);
        match &result {
            Ok(value) => tracing::debug!(formula, %value, "evaluated formula"),
            Err(err) => tracing::debug!(formula, kind = err.kind(), %err, "formula failed"),
        }
        result
    }

    /// Validate then execute an already parsed postfix sequence
    pub fn evaluate_nodes(&self, nodes: &[Node]) -> FormulaResult<Scalar> {
        self.validate(nodes)?;
        self.execute(nodes)
    }

    /// Check every node against the tables without executing anything
    pub fn validate(&self, nodes: &[Node]) -> FormulaResult<()> {
        for node in nodes {
            match node {
                Node::Function { name, .. } => {
                    if !self.functions.contains(&name.to_uppercase()) {
                        return Err(FormulaError::UnknownFunction(name.clone()));
                    }
                }
                Node::Operator(token) => {
                    let key = operator_key(token);
                    if !self.operators.contains(&key) {
                        return Err(FormulaError::UnknownOperator(key));
                    }
                }
                // Only logical and text ranges pass; the message wording is kept verbatim
                Node::Range(token) => match token.subtype {
                    Some(TokenSubtype::Logical | TokenSubtype::Text) => {}
                    _ => {
                        return Err(FormulaError::syntax("Only numeric values are allowed"));
                    }
                },
                Node::Operand(_) => {}
            }
        }
        Ok(())
    }

    /// Run the postfix sequence on a value stack
    pub fn execute(&self, nodes: &[Node]) -> FormulaResult<Scalar> {
        let mut stack: Vec<Scalar> = Vec::with_capacity(nodes.len());

        for node in nodes {
            tracing::trace!(%node, depth = stack.len(), "executing node");

            match node {
                Node::Operand(token) => stack.push(resolve_operand(token)?),

                Node::Function { name, num_args } => {
                    let key = name.to_uppercase();
                    let func = self
                        .functions
                        .get(&key)
                        .ok_or_else(|| FormulaError::UnknownFunction(name.clone()))?;
                    func.arity.check(&key, *num_args)?;
                    let args = pop_args(&mut stack, *num_args, &key)?;
                    stack.push((func.f)(&args)?);
                }

                Node::Operator(token) => {
                    let num = if token.is_infix() { 2 } else { 1 };
                    let key = operator_key(token);
                    let op = self
                        .operators
                        .get(&key)
                        .ok_or_else(|| FormulaError::UnknownOperator(key.clone()))?;
                    op.arity.check(&token.value, num)?;
                    let args = pop_args(&mut stack, num, &token.value)?;
                    stack.push((op.f)(&args)?);
                }

                Node::Range(token) => {
                    return Err(FormulaError::Type(format!(
                        "Only numeric values allowed (reference {} provided)",
                        token.value
                    )));
                }
            }
        }

        // all formulas must reduce to a single value
        match (stack.pop(), stack.is_empty()) {
            (Some(value), true) => Ok(value),
            _ => Err(FormulaError::malformed()),
        }
    }
}

/// Pop the top `n` values, keeping their left-to-right order
fn pop_args(stack: &mut Vec<Scalar>, n: usize, name: &str) -> FormulaResult<Vec<Scalar>> {
    if stack.len() < n {
        return Err(FormulaError::MalformedExpression(format!(
            "{} expects {} values but only {} available",
            name,
            n,
            stack.len()
        )));
    }
    Ok(stack.split_off(stack.len() - n))
}

/// Resolve a literal operand into a numeric value
fn resolve_operand(token: &Token) -> FormulaResult<Scalar> {
    match token.subtype {
        Some(TokenSubtype::Number) => {
            if let Ok(i) = token.value.parse::<i64>() {
                return Ok(Scalar::Int(i));
            }
            let n: f64 = token.value.parse().map_err(|_| {
                FormulaError::syntax(format!("malformed number '{}'", token.value))
            })?;
            if !n.is_finite() {
                return Err(FormulaError::Evaluation(format!(
                    "number '{}' out of range",
                    token.value
                )));
            }
            Ok(Scalar::from_f64(n))
        }
        Some(TokenSubtype::Logical) => Ok(Scalar::from_bool(
            token.value.to_uppercase().contains("TRUE"),
        )),
        Some(TokenSubtype::Text) | None => Err(FormulaError::Type(format!(
            "Only numeric values allowed ({} provided)",
            token.subtype.map_or("untyped", |s| s.as_str())
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::{Arity, Func};
    use crate::tokenizer::TokenType;

    fn eval(formula: &str) -> FormulaResult<Scalar> {
        evaluate(formula)
    }

    #[test]
    fn test_evaluate_number() {
        assert_eq!(eval("=42").unwrap(), Scalar::Int(42));
        assert_eq!(eval("=3.14").unwrap(), Scalar::Float(3.14));
        assert_eq!(eval("=2.0").unwrap(), Scalar::Int(2));
        assert_eq!(eval("=1e3").unwrap(), Scalar::Int(1000));
        assert_eq!(eval("=.5").unwrap(), Scalar::Float(0.5));
    }

    #[test]
    fn test_evaluate_logical_literal() {
        assert_eq!(eval("=TRUE").unwrap(), Scalar::Int(1));
        assert_eq!(eval("=false").unwrap(), Scalar::Int(0));
    }

    #[test]
    fn test_evaluate_arithmetic() {
        assert_eq!(eval("=1+2").unwrap(), Scalar::Int(3));
        assert_eq!(eval("=10-3").unwrap(), Scalar::Int(7));
        assert_eq!(eval("=4*5").unwrap(), Scalar::Int(20));
        assert_eq!(eval("=20/4").unwrap(), Scalar::Float(5.0));
        assert_eq!(eval("=1.5+1").unwrap(), Scalar::Float(2.5));
    }

    #[test]
    fn test_evaluate_precedence() {
        assert_eq!(eval("2+3*4").unwrap(), Scalar::Int(14));
        assert_eq!(eval("(2+3)*4").unwrap(), Scalar::Int(20));
        assert_eq!(eval("=2+3*4-5").unwrap(), Scalar::Int(9));
        assert_eq!(eval("=10-4-3").unwrap(), Scalar::Int(3));
    }

    #[test]
    fn test_evaluate_unary() {
        assert_eq!(eval("-5+3").unwrap(), Scalar::Int(-2));
        assert_eq!(eval("50%").unwrap(), Scalar::Float(0.5));
        assert_eq!(eval("=--5").unwrap(), Scalar::Int(5));
        assert_eq!(eval("=200*10%").unwrap(), Scalar::Float(20.0));
    }

    #[test]
    fn test_evaluate_comparison() {
        assert_eq!(eval("=1<2").unwrap(), Scalar::Int(1));
        assert_eq!(eval("=1>2").unwrap(), Scalar::Int(0));
        assert_eq!(eval("=5=5").unwrap(), Scalar::Int(1));
        assert_eq!(eval("=5<>5").unwrap(), Scalar::Int(0));
        assert_eq!(eval("=2.5>=2.5").unwrap(), Scalar::Int(1));
        assert_eq!(eval("=3<=2").unwrap(), Scalar::Int(0));
    }

    #[test]
    fn test_text_operand_rejected() {
        let err = eval("=\"abc\"").unwrap_err();
        assert_eq!(
            err,
            FormulaError::Type("Only numeric values allowed (text provided)".into())
        );
    }

    #[test]
    fn test_range_subtypes() {
        // number-subtype ranges fail validation with a syntax error
        assert_eq!(
            eval("=MAX(1:3)").unwrap_err(),
            FormulaError::Syntax("Only numeric values are allowed".into())
        );
        assert_eq!(
            eval("=1:3").unwrap_err(),
            FormulaError::Syntax("Only numeric values are allowed".into())
        );
        // text-subtype ranges pass validation, then cannot be resolved
        assert!(matches!(eval("=A1+1"), Err(FormulaError::Type(_))));
    }

    #[test]
    fn test_unknown_function_and_operator() {
        assert_eq!(
            eval("FOO(1)").unwrap_err(),
            FormulaError::UnknownFunction("FOO".into())
        );
        assert_eq!(
            eval("2^3").unwrap_err(),
            FormulaError::UnknownOperator("^".into())
        );
        assert_eq!(
            eval("+5").unwrap_err(),
            FormulaError::UnknownOperator("u+".into())
        );
    }

    #[test]
    fn test_validation_precedes_execution() {
        // the text operand would fail at execution; the unknown function wins
        assert_eq!(
            eval("=\"x\"+FOO(1)").unwrap_err(),
            FormulaError::UnknownFunction("FOO".into())
        );
    }

    #[test]
    fn test_malformed_expression() {
        assert_eq!(eval("1 1").unwrap_err(), FormulaError::malformed());
        assert_eq!(eval("MAX(1 2)").unwrap_err(), FormulaError::malformed());
        assert_eq!(eval("").unwrap_err(), FormulaError::malformed());
    }

    #[test]
    fn test_stack_underflow() {
        let nodes = vec![
            Node::Operand(Token::operand(TokenSubtype::Number, "1")),
            Node::Operator(Token::new(TokenType::OperatorInfix, "+")),
        ];
        let functions = default_functions();
        let operators = default_operators();
        let evaluator = Evaluator::new(&functions, &operators);
        assert!(matches!(
            evaluator.evaluate_nodes(&nodes),
            Err(FormulaError::MalformedExpression(_))
        ));
    }

    #[test]
    fn test_custom_operator_table() {
        fn power(args: &[Scalar]) -> FormulaResult<Scalar> {
            Ok(Scalar::from_f64(args[0].to_f64()?.powf(args[1].to_f64()?)))
        }

        let mut operators = default_operators();
        operators.insert("^", Func::new(Arity::Exact(2), power));
        assert_eq!(
            evaluate_with("2^10", None, Some(&operators)).unwrap(),
            Scalar::Int(1024)
        );

        operators.remove("+");
        assert_eq!(
            evaluate_with("1+1", None, Some(&operators)).unwrap_err(),
            FormulaError::UnknownOperator("+".into())
        );
    }

    #[test]
    fn test_operator_arity_from_table() {
        let mut operators = default_operators();
        let negate = operators.get("u-").copied().unwrap();
        operators.insert("u-", Func::new(Arity::Exact(2), negate.f));
        assert!(matches!(
            evaluate_with("-1", None, Some(&operators)),
            Err(FormulaError::Arity { .. })
        ));
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        let out_of_range = FormulaError::Evaluation("number '1e400' out of range".into());
        assert_eq!(eval("1e400").unwrap_err(), out_of_range);
        assert_eq!(eval("=1e400-1e400").unwrap_err(), out_of_range);
        assert_eq!(
            eval("=1e200*1e200").unwrap_err(),
            FormulaError::Evaluation("result out of range".into())
        );
        assert_eq!(eval("=1e300").unwrap(), Scalar::Float(1e300));
    }

    #[test]
    fn test_scalar_normalization() {
        assert_eq!(Scalar::from_f64(3.0), Scalar::Int(3));
        assert_eq!(Scalar::from_f64(-0.5), Scalar::Float(-0.5));
        assert_eq!(Scalar::from_f64(f64::INFINITY), Scalar::Float(f64::INFINITY));
        assert_eq!(Scalar::from_f64(1e300), Scalar::Float(1e300));
        assert_eq!(Scalar::Empty.to_string(), "");
        assert_eq!(Scalar::Float(0.5).to_string(), "0.5");
    }
}
