use serde::Serialize;

use crate::error::{Error, Result};

/// Declared semantic partition of a table's columns.
///
/// `features` is the ordered model input; `target` is the single
/// supervised column. The partition is validated once at construction and
/// immutable afterwards; every downstream stage reads it, none mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scope {
    features: Vec<String>,
    target: String,
}

impl Scope {
    /// Validates and builds a scope.
    ///
    /// Fails when `features` is empty or holds empty/duplicate names, when
    /// `target` is empty, or when the target appears among the features.
    pub fn new(features: Vec<String>, target: impl Into<String>) -> Result<Self> {
        let target = target.into();
        if target.trim().is_empty() {
            return Err(Error::Schema("target must be a non-empty string".to_string()));
        }
        if features.is_empty() {
            return Err(Error::Schema("features must be a non-empty list".to_string()));
        }
        let mut seen = std::collections::HashSet::new();
        for name in &features {
            if name.trim().is_empty() {
                return Err(Error::Schema(
                    "features must not contain empty names".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::Schema(format!(
                    "duplicate feature name: '{}'",
                    name
                )));
            }
        }
        if features.iter().any(|f| f == &target) {
            return Err(Error::Schema(format!(
                "target '{}' must not appear in features",
                target
            )));
        }
        Ok(Self { features, target })
    }

    /// Ordered feature columns.
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Target column name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Columns to keep when reducing a table to this scope: the features
    /// in declared order, then the target.
    pub fn keep_columns(&self) -> Vec<String> {
        let mut cols = self.features.clone();
        cols.push(self.target.clone());
        cols
    }

    /// True when `name` is one of the declared features.
    pub fn is_feature(&self, name: &str) -> bool {
        self.features.iter().any(|f| f == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_target_inside_features() {
        let err = Scope::new(
            vec!["tenure".to_string(), "Churn".to_string()],
            "Churn",
        );
        assert!(err.is_err());
    }

    #[test]
    fn rejects_empty_and_duplicate_features() {
        assert!(Scope::new(vec![], "Churn").is_err());
        assert!(Scope::new(vec!["a".to_string(), "a".to_string()], "Churn").is_err());
        assert!(Scope::new(vec!["".to_string()], "Churn").is_err());
    }

    #[test]
    fn keep_columns_appends_target() {
        let scope = Scope::new(vec!["a".to_string(), "b".to_string()], "y").unwrap();
        assert_eq!(scope.keep_columns(), vec!["a", "b", "y"]);
    }
}
