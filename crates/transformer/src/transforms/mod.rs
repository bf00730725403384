//! Built-in transforms

pub mod number;

pub use number::NumberFormulaTransform;
