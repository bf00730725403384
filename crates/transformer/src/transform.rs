//! The transform abstraction

use crate::error::ApiResult;
use crate::protocol::{Inputs, Outputs};
use serde::{Deserialize, Serialize};
use transformer_formula::Scalar;

/// Description of one input a transform accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub list: bool,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub help_text: String,
}

impl Field {
    /// The `inputs` field every transform takes: one or more strings
    pub fn inputs() -> Self {
        Self {
            key: "inputs".to_string(),
            field_type: "unicode".to_string(),
            list: true,
            required: true,
            label: None,
            help_text: "Value(s) you would like to transform".to_string(),
        }
    }

    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_help_text<S: Into<String>>(mut self, help_text: S) -> Self {
        self.help_text = help_text.into();
        self
    }
}

/// Listing entry for a registered transform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformInfo {
    pub key: String,
    pub label: String,
    pub name: String,
    pub category: String,
    pub help_text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A named operation applied to string inputs
pub trait Transform: Send + Sync {
    fn category(&self) -> &str;

    fn name(&self) -> &str;

    /// Human-readable name
    fn label(&self) -> &str;

    fn help_text(&self) -> &str;

    /// Registry key, `category.name`
    fn key(&self) -> String {
        format!("{}.{}", self.category(), self.name())
    }

    /// Inputs this transform accepts
    fn fields(&self) -> Vec<Field> {
        vec![Field::inputs()]
    }

    /// Transform a single input
    fn transform(&self, input: &str) -> ApiResult<Scalar>;

    /// Transform one input or a list of inputs, failing on the first error
    fn transform_many(&self, inputs: &Inputs) -> ApiResult<Outputs> {
        match inputs {
            Inputs::One(input) => self.transform(input).map(Outputs::One),
            Inputs::Many(inputs) => inputs
                .iter()
                .map(|input| self.transform(input))
                .collect::<ApiResult<Vec<_>>>()
                .map(Outputs::Many),
        }
    }

    fn to_info(&self) -> TransformInfo {
        TransformInfo {
            key: self.key(),
            label: self.label().to_string(),
            name: self.name().to_string(),
            category: self.category().to_string(),
            help_text: self.help_text().to_string(),
            kind: "transform".to_string(),
        }
    }
}
