//! Math functions

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::Scalar;

/// MAX function
pub fn fn_max(args: &[Scalar]) -> FormulaResult<Scalar> {
    extremum(args, |candidate, best| candidate > best)
}

/// MIN function
pub fn fn_min(args: &[Scalar]) -> FormulaResult<Scalar> {
    extremum(args, |candidate, best| candidate < best)
}

/// Pairwise reduction keeping the first argument that wins `better`
fn extremum(args: &[Scalar], better: fn(f64, f64) -> bool) -> FormulaResult<Scalar> {
    let (first, rest) = args
        .split_first()
        .ok_or_else(|| FormulaError::Argument("expected at least one value".into()))?;

    let mut best = *first;
    let mut best_n = first.to_f64()?;
    for arg in rest {
        let n = arg.to_f64()?;
        if better(n, best_n) {
            best = *arg;
            best_n = n;
        }
    }

    Ok(best)
}

/// MOD function. The result takes the sign of the divisor.
pub fn fn_mod(args: &[Scalar]) -> FormulaResult<Scalar> {
    let (a, b) = two_args(args, "MOD")?;

    match (a, b) {
        (Scalar::Int(_), Scalar::Int(0)) => Err(division_by_zero()),
        (Scalar::Int(x), Scalar::Int(y)) => {
            let r = x.wrapping_rem(y);
            if r != 0 && (r < 0) != (y < 0) {
                Ok(Scalar::Int(r + y))
            } else {
                Ok(Scalar::Int(r))
            }
        }
        _ => {
            let x = a.to_f64()?;
            let y = b.to_f64()?;
            if y == 0.0 {
                return Err(division_by_zero());
            }
            let r = x % y;
            if r != 0.0 && (r < 0.0) != (y < 0.0) {
                Ok(Scalar::Float(r + y))
            } else {
                Ok(Scalar::Float(r))
            }
        }
    }
}

/// SQRT function
pub fn fn_sqrt(args: &[Scalar]) -> FormulaResult<Scalar> {
    let n = one_arg(args, "SQRT")?.to_f64()?;
    if n < 0.0 {
        return Err(FormulaError::Evaluation(format!(
            "SQRT of a negative number ({})",
            n
        )));
    }
    Ok(Scalar::Float(n.sqrt()))
}

/// POW function
pub fn fn_pow(args: &[Scalar]) -> FormulaResult<Scalar> {
    let (base, exponent) = two_args(args, "POW")?;
    let result = base.to_f64()?.powf(exponent.to_f64()?);
    if result.is_nan() {
        return Err(FormulaError::Evaluation("POW math domain error".into()));
    }
    if result.is_infinite() {
        return Err(FormulaError::Evaluation("POW result out of range".into()));
    }
    Ok(Scalar::Float(result))
}

/// ABS function
pub fn fn_abs(args: &[Scalar]) -> FormulaResult<Scalar> {
    match one_arg(args, "ABS")? {
        Scalar::Int(i) => Ok(i
            .checked_abs()
            .map_or(Scalar::Float((i as f64).abs()), Scalar::Int)),
        Scalar::Float(f) => Ok(Scalar::Float(f.abs())),
        other => other.to_f64().map(Scalar::Float),
    }
}

/// GCD function
pub fn fn_gcd(args: &[Scalar]) -> FormulaResult<Scalar> {
    let mut acc = 0u64;
    for arg in args {
        acc = gcd(acc, to_integer(arg, "GCD")?.unsigned_abs());
    }
    i64::try_from(acc)
        .map(Scalar::Int)
        .map_err(|_| out_of_range("GCD"))
}

/// LCM function
pub fn fn_lcm(args: &[Scalar]) -> FormulaResult<Scalar> {
    let mut acc = 1i64;
    for arg in args {
        let n = to_integer(arg, "LCM")?;
        if acc == 0 || n == 0 {
            acc = 0;
            continue;
        }
        // Both are non-zero, so the divisor is at most |acc|
        let divisor = i64::try_from(gcd(acc.unsigned_abs(), n.unsigned_abs()))
            .map_err(|_| out_of_range("LCM"))?;
        acc = (acc / divisor)
            .checked_mul(n)
            .and_then(i64::checked_abs)
            .ok_or_else(|| out_of_range("LCM"))?;
    }
    Ok(Scalar::Int(acc))
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// CEILING(value, [digits])
pub fn fn_ceiling(args: &[Scalar]) -> FormulaResult<Scalar> {
    round_with(args, "CEILING", f64::ceil)
}

/// FLOOR(value, [digits])
pub fn fn_floor(args: &[Scalar]) -> FormulaResult<Scalar> {
    round_with(args, "FLOOR", f64::floor)
}

/// ROUND(value, [digits]) - rounds half away from zero
pub fn fn_round(args: &[Scalar]) -> FormulaResult<Scalar> {
    round_with(args, "ROUND", f64::round)
}

/// Apply `op` at `digits` decimal places (negative digits round left of the point)
fn round_with(args: &[Scalar], name: &str, op: fn(f64) -> f64) -> FormulaResult<Scalar> {
    let (value, digits) = match args {
        [value] => (value.to_f64()?, 0),
        [value, digits] => (value.to_f64()?, to_integer(digits, name)?),
        _ => {
            return Err(FormulaError::Argument(format!(
                "{} takes a value and an optional number of digits ({} provided)",
                name,
                args.len()
            )))
        }
    };

    let digits = digits.clamp(-308, 308) as i32;
    let result = if digits >= 0 {
        let factor = 10f64.powi(digits);
        let scaled = value * factor;
        // Precision beyond what f64 resolves leaves the value as is
        if !scaled.is_finite() {
            return Ok(Scalar::from_f64(value));
        }
        op(scaled) / factor
    } else {
        let factor = 10f64.powi(-digits);
        op(value / factor) * factor
    };

    if !result.is_finite() {
        return Err(out_of_range(name));
    }
    Ok(Scalar::from_f64(result))
}

fn one_arg(args: &[Scalar], name: &str) -> FormulaResult<Scalar> {
    match args {
        [a] => Ok(*a),
        _ => Err(FormulaError::Argument(format!("{} takes 1 argument", name))),
    }
}

fn two_args(args: &[Scalar], name: &str) -> FormulaResult<(Scalar, Scalar)> {
    match args {
        [a, b] => Ok((*a, *b)),
        _ => Err(FormulaError::Argument(format!("{} takes 2 arguments", name))),
    }
}

/// Integral value of an argument; fractional values are a type error
pub(crate) fn to_integer(value: &Scalar, name: &str) -> FormulaResult<i64> {
    match Scalar::from_f64(value.to_f64()?) {
        Scalar::Int(i) => Ok(i),
        _ => Err(FormulaError::Type(format!(
            "{} requires integer values ({} provided)",
            name, value
        ))),
    }
}

fn out_of_range(name: &str) -> FormulaError {
    FormulaError::Evaluation(format!("{} result out of range", name))
}

fn division_by_zero() -> FormulaError {
    FormulaError::Evaluation("division by zero".into())
}
