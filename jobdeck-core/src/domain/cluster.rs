//! Cluster domain types

use serde::{Deserialize, Serialize};

/// A cluster that can be chosen for cluster-valued job parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    #[serde(rename = "release_version", alias = "releaseVersion", default)]
    pub release_version: String,
}

impl Cluster {
    /// Label shown next to a cluster choice, e.g. `east-1 (4.2.0)`
    pub fn label(&self) -> String {
        if self.release_version.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.release_version)
        }
    }
}
