//! Operator implementations
//!
//! Integer arithmetic stays integral until it would overflow; anything
//! involving a float is computed in floating point and must stay finite.
//! Comparisons return 1/0.

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::Scalar;
use std::cmp::Ordering;

/// Unary negation (`u-`)
pub fn op_negate(args: &[Scalar]) -> FormulaResult<Scalar> {
    match operand(args)? {
        Scalar::Int(i) => Ok(i
            .checked_neg()
            .map_or(Scalar::Float(-(i as f64)), Scalar::Int)),
        other => Ok(Scalar::Float(-other.to_f64()?)),
    }
}

/// Unary percent (`u%`)
pub fn op_percent(args: &[Scalar]) -> FormulaResult<Scalar> {
    Ok(Scalar::Float(operand(args)?.to_f64()? / 100.0))
}

pub fn op_add(args: &[Scalar]) -> FormulaResult<Scalar> {
    arithmetic(args, i64::checked_add, |a, b| a + b)
}

pub fn op_subtract(args: &[Scalar]) -> FormulaResult<Scalar> {
    arithmetic(args, i64::checked_sub, |a, b| a - b)
}

pub fn op_multiply(args: &[Scalar]) -> FormulaResult<Scalar> {
    arithmetic(args, i64::checked_mul, |a, b| a * b)
}

/// True division, always floating point
pub fn op_divide(args: &[Scalar]) -> FormulaResult<Scalar> {
    let (a, b) = operands(args)?;
    let divisor = b.to_f64()?;
    let dividend = a.to_f64()?;
    if divisor == 0.0 {
        return Err(FormulaError::Evaluation("division by zero".into()));
    }
    finite(dividend / divisor)
}

pub fn op_equal(args: &[Scalar]) -> FormulaResult<Scalar> {
    compare(args, Ordering::is_eq)
}

pub fn op_not_equal(args: &[Scalar]) -> FormulaResult<Scalar> {
    compare(args, Ordering::is_ne)
}

pub fn op_greater(args: &[Scalar]) -> FormulaResult<Scalar> {
    compare(args, Ordering::is_gt)
}

pub fn op_less(args: &[Scalar]) -> FormulaResult<Scalar> {
    compare(args, Ordering::is_lt)
}

pub fn op_greater_equal(args: &[Scalar]) -> FormulaResult<Scalar> {
    compare(args, Ordering::is_ge)
}

pub fn op_less_equal(args: &[Scalar]) -> FormulaResult<Scalar> {
    compare(args, Ordering::is_le)
}

fn arithmetic(
    args: &[Scalar],
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> FormulaResult<Scalar> {
    let (a, b) = operands(args)?;
    if let (Scalar::Int(x), Scalar::Int(y)) = (a, b) {
        if let Some(result) = int_op(x, y) {
            return Ok(Scalar::Int(result));
        }
    }
    finite(float_op(a.to_f64()?, b.to_f64()?))
}

fn finite(n: f64) -> FormulaResult<Scalar> {
    if n.is_finite() {
        Ok(Scalar::Float(n))
    } else {
        Err(FormulaError::Evaluation("result out of range".into()))
    }
}

fn compare(args: &[Scalar], test: fn(Ordering) -> bool) -> FormulaResult<Scalar> {
    let (a, b) = operands(args)?;
    let ordering = match (a, b) {
        (Scalar::Int(x), Scalar::Int(y)) => x.cmp(&y),
        _ => {
            let (x, y) = (a.to_f64()?, b.to_f64()?);
            x.partial_cmp(&y).ok_or_else(|| {
                FormulaError::Evaluation(format!("cannot compare {} and {}", x, y))
            })?
        }
    };
    Ok(Scalar::from_bool(test(ordering)))
}

fn operand(args: &[Scalar]) -> FormulaResult<Scalar> {
    match args {
        [a] => Ok(*a),
        _ => Err(FormulaError::Argument(format!(
            "expected 1 operand ({} provided)",
            args.len()
        ))),
    }
}

fn operands(args: &[Scalar]) -> FormulaResult<(Scalar, Scalar)> {
    match args {
        [a, b] => Ok((*a, *b)),
        _ => Err(FormulaError::Argument(format!(
            "expected 2 operands ({} provided)",
            args.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::Scalar::{Empty, Float, Int};

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(op_add(&[Int(2), Int(3)]).unwrap(), Int(5));
        assert_eq!(op_subtract(&[Int(2), Int(3)]).unwrap(), Int(-1));
        assert_eq!(op_multiply(&[Int(4), Int(5)]).unwrap(), Int(20));
    }

    #[test]
    fn test_overflow_promotes_to_float() {
        assert_eq!(
            op_add(&[Int(i64::MAX), Int(1)]).unwrap(),
            Float(i64::MAX as f64 + 1.0)
        );
        assert_eq!(
            op_negate(&[Int(i64::MIN)]).unwrap(),
            Float(9.223372036854776e18)
        );
    }

    #[test]
    fn test_mixed_arithmetic() {
        assert_eq!(op_add(&[Int(1), Float(0.5)]).unwrap(), Float(1.5));
        assert_eq!(op_divide(&[Int(1), Int(4)]).unwrap(), Float(0.25));
        assert_eq!(op_divide(&[Int(6), Int(3)]).unwrap(), Float(2.0));
        assert_eq!(
            op_divide(&[Int(1), Int(0)]).unwrap_err(),
            FormulaError::Evaluation("division by zero".into())
        );
    }

    #[test]
    fn test_float_overflow_rejected() {
        let overflow = FormulaError::Evaluation("result out of range".into());
        assert_eq!(op_multiply(&[Float(1e300), Float(1e300)]).unwrap_err(), overflow);
        assert_eq!(op_add(&[Float(f64::MAX), Float(f64::MAX)]).unwrap_err(), overflow);
        assert_eq!(op_divide(&[Float(1e300), Float(1e-300)]).unwrap_err(), overflow);
        assert_eq!(op_subtract(&[Float(1e300), Float(-1e300)]).unwrap(), Float(2e300));
    }

    #[test]
    fn test_unary() {
        assert_eq!(op_negate(&[Int(5)]).unwrap(), Int(-5));
        assert_eq!(op_negate(&[Float(1.5)]).unwrap(), Float(-1.5));
        assert_eq!(op_percent(&[Int(50)]).unwrap(), Float(0.5));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(op_equal(&[Int(2), Float(2.0)]).unwrap(), Int(1));
        assert_eq!(op_not_equal(&[Int(2), Int(3)]).unwrap(), Int(1));
        assert_eq!(op_greater(&[Int(2), Int(3)]).unwrap(), Int(0));
        assert_eq!(op_less(&[Float(-1.0), Int(0)]).unwrap(), Int(1));
        assert_eq!(op_greater_equal(&[Int(3), Int(3)]).unwrap(), Int(1));
        assert_eq!(op_less_equal(&[Int(4), Int(3)]).unwrap(), Int(0));
    }

    #[test]
    fn test_empty_operand_rejected() {
        assert_eq!(
            op_add(&[Empty, Int(1)]).unwrap_err(),
            FormulaError::Type("Only numeric values allowed (empty provided)".into())
        );
    }
}
