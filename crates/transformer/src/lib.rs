//! # transformer
//!
//! Named string transforms, looked up in an explicit [`Registry`] and driven
//! through a line-oriented JSON protocol.
//!
//! The built-in `number.formula` transform evaluates Excel-style formulas
//! with [`transformer_formula`].
//!
//! ## Example
//!
//! ```rust
//! use transformer::{handle_line, Registry};
//!
//! let registry = Registry::with_defaults();
//!
//! let response = handle_line(
//!     &registry,
//!     r#"{"cmd":"transform","transform":"number.formula","inputs":["=MAX(1,5,3)","=50%"]}"#,
//! );
//! assert_eq!(response.to_json(), r#"{"outputs":[5,0.5]}"#);
//!
//! let response = handle_line(&registry, r#"{"cmd":"fields","transform":"text.upper"}"#);
//! assert_eq!(
//!     response.to_json(),
//!     r#"{"message":"Transform \"text.upper\" not found","status":404}"#
//! );
//! ```

pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod transform;
pub mod transforms;

pub use dispatch::{handle_line, handle_request};
pub use error::{ApiError, ApiResult, RegistryError};
pub use protocol::{Inputs, Outputs, Request, Response};
pub use registry::Registry;
pub use transform::{Field, Transform, TransformInfo};
pub use transforms::NumberFormulaTransform;

// Re-export the formula engine
pub use transformer_formula as formula;
pub use transformer_formula::{FormulaError, Scalar};
