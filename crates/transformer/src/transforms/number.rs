//! Number transforms

use crate::error::ApiResult;
use crate::transform::{Field, Transform};
use transformer_formula::{evaluate, FormulaResult, Scalar};

/// `number.formula`: evaluate an Excel-style formula
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberFormulaTransform;

impl NumberFormulaTransform {
    /// Evaluate with the default tables, keeping the formula error intact
    pub fn evaluate(&self, formula: &str) -> FormulaResult<Scalar> {
        evaluate(formula)
    }
}

impl Transform for NumberFormulaTransform {
    fn category(&self) -> &str {
        "number"
    }

    fn name(&self) -> &str {
        "formula"
    }

    fn label(&self) -> &str {
        "Number Formula"
    }

    fn help_text(&self) -> &str {
        "Transform a number with an Excel-style formula."
    }

    fn fields(&self) -> Vec<Field> {
        vec![Field::inputs()
            .with_label("Formula")
            .with_help_text("Excel-style formula to evaluate")]
    }

    fn transform(&self, input: &str) -> ApiResult<Scalar> {
        self.evaluate(input).map_err(|err| {
            tracing::warn!(formula = input, kind = err.kind(), "formula failed: {}", err);
            err.into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::protocol::{Inputs, Outputs};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_transform() {
        let t = NumberFormulaTransform;
        assert_eq!(t.key(), "number.formula");
        assert_eq!(t.transform("=2+3*4").unwrap(), Scalar::Int(14));
        assert_eq!(
            t.transform("=MOD(1)").unwrap_err(),
            ApiError::bad_request("Invalid Formula: MOD requires exactly 2 arguments (1 provided)")
        );
    }

    #[test]
    fn test_transform_many() {
        let t = NumberFormulaTransform;
        assert_eq!(
            t.transform_many(&Inputs::Many(vec!["=1+1".into(), "=50%".into()]))
                .unwrap(),
            Outputs::Many(vec![Scalar::Int(2), Scalar::Float(0.5)])
        );
        assert_eq!(
            t.transform_many(&Inputs::One("=IF(0,1)".into())).unwrap(),
            Outputs::One(Scalar::Empty)
        );
        assert_eq!(
            t.transform_many(&Inputs::Many(vec!["=1".into(), "=FOO()".into()]))
                .unwrap_err()
                .status,
            400
        );
    }

    #[test]
    fn test_fields_and_info() {
        let t = NumberFormulaTransform;
        let fields = t.fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].key, "inputs");
        assert_eq!(fields[0].label.as_deref(), Some("Formula"));

        let info = t.to_info();
        assert_eq!(info.category, "number");
        assert_eq!(info.label, "Number Formula");
        assert_eq!(info.kind, "transform");
    }
}
