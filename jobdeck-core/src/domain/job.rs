//! Job definition domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameter keys whose values are cluster names
pub const CLUSTER_PARAMETER_KEYS: [&str; 3] = ["source", "target", "cluster"];

/// Job parameters keyed by parameter name
pub type Parameters = BTreeMap<String, String>;

/// A triggerable job known to the CI engine
///
/// The parameter map holds the default value of every parameter; its keys
/// are the job's parameter schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefinition {
    pub name: String,
    #[serde(default)]
    pub parameters: Parameters,
}

/// How a parameter value is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// Value is the name of a known cluster
    ClusterSelect,
    /// Value is arbitrary text
    FreeText,
}

/// Classify a parameter key
pub fn classify(key: &str) -> ParameterKind {
    if CLUSTER_PARAMETER_KEYS.contains(&key) {
        ParameterKind::ClusterSelect
    } else {
        ParameterKind::FreeText
    }
}

impl JobDefinition {
    pub fn new(name: impl Into<String>, parameters: Parameters) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    /// Whether the job declares a parameter named `key`
    pub fn declares(&self, key: &str) -> bool {
        self.parameters.contains_key(key)
    }

    /// Declared keys absent from `parameters`
    pub fn missing_keys<'a>(&'a self, parameters: &Parameters) -> Vec<&'a str> {
        self.parameters
            .keys()
            .filter(|key| !parameters.contains_key(*key))
            .map(String::as_str)
            .collect()
    }

    /// Keys in `parameters` the job does not declare
    pub fn undeclared_keys<'a>(&self, parameters: &'a Parameters) -> Vec<&'a str> {
        parameters
            .keys()
            .filter(|key| !self.declares(key))
            .map(String::as_str)
            .collect()
    }

    /// Overlay `overrides` on the default parameters
    ///
    /// Keys not mentioned in `overrides` keep their default. Callers check
    /// [`undeclared_keys`](Self::undeclared_keys) first if extra keys matter.
    pub fn fill(&self, overrides: &Parameters) -> Parameters {
        let mut merged = self.parameters.clone();
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}
