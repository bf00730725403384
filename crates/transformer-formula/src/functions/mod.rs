//! Function and operator tables
//!
//! A [`Table`] maps a name to a [`Func`]: an arity contract plus the plain
//! function that implements it. The same type serves both kinds of table;
//! function names are keyed in uppercase, operators by symbol with a `u`
//! prefix for unary forms (`u-`, `u%`).

pub mod logical;
pub mod math;
pub mod operators;

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::Scalar;
use ahash::AHashMap;
use std::fmt;

/// Function implementation signature
///
/// Arguments arrive in left-to-right order and have already been checked
/// against the entry's [`Arity`].
pub type FunctionImpl = fn(&[Scalar]) -> FormulaResult<Scalar>;

/// Function table
pub type FunctionTable = Table;

/// Operator table
pub type OperatorTable = Table;

/// Argument-count contract of a table entry
///
/// Externally this is the signed convention: `n > 0` exactly `n` arguments,
/// `n < 0` at least `-n`, `0` none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    /// Nullary
    None,
}

impl Arity {
    /// Build from the signed convention
    pub fn from_signed(n: i32) -> Self {
        match n {
            0 => Arity::None,
            n if n > 0 => Arity::Exact(n.unsigned_abs() as usize),
            n => Arity::AtLeast(n.unsigned_abs() as usize),
        }
    }

    /// Signed convention value
    pub fn signed(&self) -> i64 {
        match *self {
            Arity::Exact(n) => n as i64,
            Arity::AtLeast(n) => -(n as i64),
            Arity::None => 0,
        }
    }

    /// Whether `supplied` arguments satisfy the contract
    pub fn accepts(&self, supplied: usize) -> bool {
        match *self {
            Arity::Exact(n) => supplied == n,
            Arity::AtLeast(n) => supplied >= n,
            Arity::None => supplied == 0,
        }
    }

    /// Fail with [`FormulaError::Arity`] unless `supplied` satisfies the contract
    pub fn check(&self, name: &str, supplied: usize) -> FormulaResult<()> {
        if self.accepts(supplied) {
            Ok(())
        } else {
            Err(FormulaError::Arity {
                name: name.to_string(),
                expected: self.to_string(),
                actual: supplied,
            })
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "exactly {}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
            Arity::None => f.write_str("no"),
        }
    }
}

/// A table entry: arity contract plus implementation
#[derive(Clone, Copy)]
pub struct Func {
    pub arity: Arity,
    pub f: FunctionImpl,
}

impl Func {
    pub fn new(arity: Arity, f: FunctionImpl) -> Self {
        Self { arity, f }
    }

    /// Build from the signed arity convention
    pub fn signed(n: i32, f: FunctionImpl) -> Self {
        Self::new(Arity::from_signed(n), f)
    }

    /// Call the implementation
    pub fn call(&self, args: &[Scalar]) -> FormulaResult<Scalar> {
        (self.f)(args)
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func").field("arity", &self.arity).finish()
    }
}

/// Name → [`Func`] mapping
///
/// Keys are matched exactly; the evaluator uppercases function names before
/// lookup, so register functions under uppercase names.
#[derive(Debug, Clone, Default)]
pub struct Table {
    entries: AHashMap<String, Func>,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry, returning the previous one
    pub fn insert<S: Into<String>>(&mut self, name: S, func: Func) -> Option<Func> {
        self.entries.insert(name.into(), func)
    }

    /// Builder-style [`Table::insert`]
    pub fn with<S: Into<String>>(mut self, name: S, arity: Arity, f: FunctionImpl) -> Self {
        self.insert(name, Func::new(arity, f));
        self
    }

    /// Remove an entry
    pub fn remove(&mut self, name: &str) -> Option<Func> {
        self.entries.remove(name)
    }

    /// Look up an entry
    pub fn get(&self, name: &str) -> Option<&Func> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entry names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the default function table
pub fn default_functions() -> FunctionTable {
    let mut table = Table::new();
    register_math_functions(&mut table);
    register_logical_functions(&mut table);
    table
}

/// Build the default operator table
pub fn default_operators() -> OperatorTable {
    Table::new()
        // unary
        .with("u-", Arity::Exact(1), operators::op_negate)
        .with("u%", Arity::Exact(1), operators::op_percent)
        // arithmetic
        .with("+", Arity::Exact(2), operators::op_add)
        .with("-", Arity::Exact(2), operators::op_subtract)
        .with("/", Arity::Exact(2), operators::op_divide)
        .with("*", Arity::Exact(2), operators::op_multiply)
        // comparison
        .with("=", Arity::Exact(2), operators::op_equal)
        .with("<>", Arity::Exact(2), operators::op_not_equal)
        .with(">", Arity::Exact(2), operators::op_greater)
        .with("<", Arity::Exact(2), operators::op_less)
        .with(">=", Arity::Exact(2), operators::op_greater_equal)
        .with("<=", Arity::Exact(2), operators::op_less_equal)
}

fn register_math_functions(table: &mut Table) {
    table.insert("MAX", Func::new(Arity::AtLeast(1), math::fn_max));
    table.insert("MIN", Func::new(Arity::AtLeast(1), math::fn_min));
    table.insert("MOD", Func::new(Arity::Exact(2), math::fn_mod));
    table.insert("SQRT", Func::new(Arity::Exact(1), math::fn_sqrt));
    table.insert("POW", Func::new(Arity::Exact(2), math::fn_pow));
    table.insert("ABS", Func::new(Arity::Exact(1), math::fn_abs));
    table.insert("GCD", Func::new(Arity::AtLeast(2), math::fn_gcd));
    table.insert("LCM", Func::new(Arity::AtLeast(2), math::fn_lcm));

    // Rounding takes an optional number of decimal digits
    table.insert("CEILING", Func::new(Arity::AtLeast(1), math::fn_ceiling));
    table.insert("FLOOR", Func::new(Arity::AtLeast(1), math::fn_floor));
    table.insert("ROUND", Func::new(Arity::AtLeast(1), math::fn_round));
}

fn register_logical_functions(table: &mut Table) {
    table.insert("IF", Func::new(Arity::AtLeast(2), logical::fn_if));
    table.insert("AND", Func::new(Arity::AtLeast(1), logical::fn_and));
    table.insert("OR", Func::new(Arity::AtLeast(1), logical::fn_or));
    table.insert("NOT", Func::new(Arity::Exact(1), logical::fn_not));
    table.insert("TRUE", Func::new(Arity::None, logical::fn_true));
    table.insert("FALSE", Func::new(Arity::None, logical::fn_false));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_signed_arity_convention() {
        assert_eq!(Arity::from_signed(2), Arity::Exact(2));
        assert_eq!(Arity::from_signed(-2), Arity::AtLeast(2));
        assert_eq!(Arity::from_signed(0), Arity::None);
        for n in [-3, -1, 0, 1, 4] {
            assert_eq!(Arity::from_signed(n).signed(), i64::from(n));
        }
    }

    #[test]
    fn test_arity_check() {
        assert!(Arity::Exact(2).check("MOD", 2).is_ok());
        assert!(Arity::AtLeast(2).check("GCD", 5).is_ok());
        assert!(Arity::None.check("TRUE", 0).is_ok());

        assert_eq!(
            Arity::Exact(2).check("MOD", 1).unwrap_err().to_string(),
            "Invalid Formula: MOD requires exactly 2 arguments (1 provided)"
        );
        assert_eq!(
            Arity::AtLeast(2).check("GCD", 0).unwrap_err().to_string(),
            "Invalid Formula: GCD requires at least 2 arguments (0 provided)"
        );
        assert_eq!(
            Arity::None.check("TRUE", 1).unwrap_err().to_string(),
            "Invalid Formula: TRUE requires no arguments (1 provided)"
        );
    }

    #[test]
    fn test_default_tables() {
        let functions = default_functions();
        assert_eq!(
            functions.names(),
            vec![
                "ABS", "AND", "CEILING", "FALSE", "FLOOR", "GCD", "IF", "LCM", "MAX", "MIN",
                "MOD", "NOT", "OR", "POW", "ROUND", "SQRT", "TRUE"
            ]
        );
        assert_eq!(functions.get("MOD").unwrap().arity, Arity::Exact(2));
        assert_eq!(functions.get("TRUE").unwrap().arity, Arity::None);

        let operators = default_operators();
        assert_eq!(operators.len(), 12);
        assert!(operators.contains("u-"));
        assert!(operators.contains("u%"));
        assert!(!operators.contains("^"));
    }

    #[test]
    fn test_table_insert_replaces() {
        let mut table = default_functions();
        let previous = table.insert("MAX", Func::signed(-2, math::fn_min));
        assert_eq!(previous.unwrap().arity, Arity::AtLeast(1));
        let max = table.get("MAX").unwrap();
        assert_eq!(max.arity, Arity::AtLeast(2));
        assert_eq!(
            max.call(&[Scalar::Int(3), Scalar::Int(1)]).unwrap(),
            Scalar::Int(1)
        );
    }

    #[test]
    fn test_tables_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Table>();
    }
}
