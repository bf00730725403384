//! Transform registry
//!
//! A [`Registry`] is built once at startup and passed by reference to
//! whatever needs lookups. It is never mutated while serving requests.

use crate::error::RegistryError;
use crate::transform::Transform;
use crate::transforms::NumberFormulaTransform;
use std::collections::BTreeMap;
use std::fmt;

/// Transforms keyed by `category.name`, in key order
#[derive(Default)]
pub struct Registry {
    transforms: BTreeMap<String, Box<dyn Transform>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in transforms
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for transform in default_transforms() {
            if let Err(err) = registry.register_boxed(transform) {
                tracing::warn!(%err, "skipping built-in transform");
                debug_assert!(false, "built-in transform keys must be distinct: {}", err);
            }
        }
        registry
    }

    /// Add a transform; a second transform with the same key is rejected
    pub fn register<T: Transform + 'static>(&mut self, transform: T) -> Result<(), RegistryError> {
        self.register_boxed(Box::new(transform))
    }

    pub fn register_boxed(&mut self, transform: Box<dyn Transform>) -> Result<(), RegistryError> {
        let key = transform.key();
        if self.transforms.contains_key(&key) {
            return Err(RegistryError::Duplicate(key));
        }
        tracing::debug!(key = %key, "registered transform");
        self.transforms.insert(key, transform);
        Ok(())
    }

    /// Find a transform by key, or by name within `category` when one is given
    pub fn lookup(&self, name: &str, category: Option<&str>) -> Option<&dyn Transform> {
        let transform = match category.filter(|c| !c.is_empty()) {
            Some(category) => self.transforms.get(&format!("{}.{}", category, name)),
            None => self.transforms.get(name),
        };
        transform.map(|t| t.as_ref())
    }

    /// All transforms, optionally restricted to one category
    pub fn all(&self, category: Option<&str>) -> Vec<&dyn Transform> {
        let category = category.filter(|c| !c.is_empty());
        self.transforms
            .values()
            .map(|t| t.as_ref())
            .filter(|t| category.map_or(true, |c| t.category() == c))
            .collect()
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        self.transforms.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("transforms", &self.keys())
            .finish()
    }
}

fn default_transforms() -> Vec<Box<dyn Transform>> {
    vec![Box::new(NumberFormulaTransform)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiResult;
    use pretty_assertions::assert_eq;
    use transformer_formula::Scalar;

    struct Length;

    impl Transform for Length {
        fn category(&self) -> &str {
            "string"
        }
        fn name(&self) -> &str {
            "length"
        }
        fn label(&self) -> &str {
            "Length"
        }
        fn help_text(&self) -> &str {
            "Number of characters"
        }
        fn transform(&self, input: &str) -> ApiResult<Scalar> {
            Ok(Scalar::Int(input.chars().count() as i64))
        }
    }

    #[test]
    fn test_defaults() {
        let registry = Registry::with_defaults();
        assert_eq!(registry.keys(), vec!["number.formula"]);
        assert!(registry.lookup("number.formula", None).is_some());
        assert!(registry.lookup("formula", Some("number")).is_some());
        assert!(registry.lookup("number.formula", Some("")).is_some());
        assert!(registry.lookup("formula", None).is_none());
    }

    #[test]
    fn test_every_builtin_is_registered() {
        let builtins = default_transforms();
        let registry = Registry::with_defaults();
        assert_eq!(registry.len(), builtins.len());
        for transform in builtins {
            assert!(registry.lookup(&transform.key(), None).is_some());
        }
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = Registry::with_defaults();
        assert_eq!(
            registry.register(NumberFormulaTransform),
            Err(RegistryError::Duplicate("number.formula".into()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_category_filter() {
        let mut registry = Registry::with_defaults();
        registry.register(Length).unwrap();

        let keys = |category: Option<&str>| -> Vec<String> {
            registry.all(category).iter().map(|t| t.key()).collect()
        };
        assert_eq!(keys(None), vec!["number.formula", "string.length"]);
        assert_eq!(keys(Some("string")), vec!["string.length"]);
        assert_eq!(keys(Some("date")), Vec::<String>::new());
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
