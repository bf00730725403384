//! Logical functions
//!
//! Logical results are the integers 1 and 0; any non-zero number is true.

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::Scalar;

/// IF(test, value_if_true, [value_if_false])
///
/// The false branch defaults to [`Scalar::Empty`] when omitted.
pub fn fn_if(args: &[Scalar]) -> FormulaResult<Scalar> {
    match args {
        [test, if_true] => Ok(if test.is_truthy() {
            *if_true
        } else {
            Scalar::Empty
        }),
        [test, if_true, if_false] => Ok(if test.is_truthy() {
            *if_true
        } else {
            *if_false
        }),
        _ => Err(FormulaError::Argument(format!(
            "IF takes a test and one or two values ({} provided)",
            args.len()
        ))),
    }
}

/// AND function
pub fn fn_and(args: &[Scalar]) -> FormulaResult<Scalar> {
    Ok(Scalar::from_bool(args.iter().all(Scalar::is_truthy)))
}

/// OR function
pub fn fn_or(args: &[Scalar]) -> FormulaResult<Scalar> {
    Ok(Scalar::from_bool(args.iter().any(Scalar::is_truthy)))
}

/// NOT function
pub fn fn_not(args: &[Scalar]) -> FormulaResult<Scalar> {
    let arg = args
        .first()
        .ok_or_else(|| FormulaError::Argument("NOT requires 1 argument".into()))?;
    Ok(Scalar::from_bool(!arg.is_truthy()))
}

/// TRUE() - logical constant
pub fn fn_true(_args: &[Scalar]) -> FormulaResult<Scalar> {
    Ok(Scalar::from_bool(true))
}

/// FALSE() - logical constant
pub fn fn_false(_args: &[Scalar]) -> FormulaResult<Scalar> {
    Ok(Scalar::from_bool(false))
}
