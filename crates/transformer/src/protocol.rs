//! Request/response types for the transform protocol.
//!
//! The protocol is JSON: one request object per line, answered by one
//! response object per line.

use crate::error::ApiError;
use crate::transform::{Field, TransformInfo};
use serde::{Deserialize, Serialize};
use transformer_formula::Scalar;

/// A command sent to the transform service.
///
/// Required fields are optional here so that missing values are reported
/// with a precise [`ApiError`] rather than a decoding error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Request {
    /// List registered transforms, optionally within one category.
    List {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
    },

    /// Describe the fields a transform accepts.
    Fields {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transform: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
    },

    /// Run a transform over one input or a list of inputs.
    Transform {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transform: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inputs: Option<Inputs>,
    },
}

/// One input string or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Inputs {
    One(String),
    Many(Vec<String>),
}

/// Results mirror the shape of the [`Inputs`] they came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outputs {
    One(Scalar),
    Many(Vec<Scalar>),
}

/// A response sent back for each request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Transforms { transforms: Vec<TransformInfo> },
    Fields { fields: Vec<Field> },
    Outputs { outputs: Outputs },
    Error(ApiError),
}

impl Response {
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }

    /// Serialize to a single line of JSON.
    ///
    /// A response that cannot be serialized becomes a 500 error payload.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            ApiError::internal(format!("failed to serialize response: {e}"))
                .to_payload()
                .to_string()
        })
    }
}

impl From<ApiError> for Response {
    fn from(err: ApiError) -> Self {
        Response::Error(err)
    }
}

impl From<&str> for Inputs {
    fn from(s: &str) -> Self {
        Inputs::One(s.to_string())
    }
}

impl From<Vec<String>> for Inputs {
    fn from(v: Vec<String>) -> Self {
        Inputs::Many(v)
    }
}
