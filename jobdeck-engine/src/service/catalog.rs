//! Job catalog
//!
//! Caches the job definitions and clusters for the session. Both lists are
//! replaced wholesale on every refresh and never patched in place.

use jobdeck_client::CiGateway;
use jobdeck_core::domain::cluster::Cluster;
use jobdeck_core::domain::job::{JobDefinition, ParameterKind, classify};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// One input of a job's trigger form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterField {
    pub key: String,
    pub kind: ParameterKind,
    pub default: String,
    /// Selectable clusters, empty for free-text fields
    pub choices: Vec<ClusterChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterChoice {
    pub value: String,
    pub label: String,
}

#[derive(Default)]
struct CatalogState {
    jobs: Option<Arc<Vec<JobDefinition>>>,
    clusters: Option<Arc<Vec<Cluster>>>,
}

pub struct Catalog {
    gateway: Arc<dyn CiGateway>,
    state: RwLock<CatalogState>,
}

impl Catalog {
    /// Creates an empty catalog
    pub fn new(gateway: Arc<dyn CiGateway>) -> Self {
        Self {
            gateway,
            state: RwLock::new(CatalogState::default()),
        }
    }

    /// Fetches the job definitions and caches them
    pub async fn list_jobs(&self) -> Result<Arc<Vec<JobDefinition>>> {
        let jobs = Arc::new(self.gateway.list_jobs().await?);
        debug!("Loaded {} job definition(s)", jobs.len());

        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .jobs = Some(Arc::clone(&jobs));
        Ok(jobs)
    }

    /// Fetches the clusters and caches them
    pub async fn list_clusters(&self) -> Result<Arc<Vec<Cluster>>> {
        let clusters = Arc::new(self.gateway.list_clusters().await?);
        debug!("Loaded {} cluster(s)", clusters.len());

        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clusters = Some(Arc::clone(&clusters));
        Ok(clusters)
    }

    /// Reloads jobs and clusters together
    ///
    /// The cache is only replaced when both requests succeed.
    pub async fn refresh(&self) -> Result<()> {
        let (jobs, clusters) =
            tokio::try_join!(self.gateway.list_jobs(), self.gateway.list_clusters())?;

        info!(
            "Catalog refreshed: {} job(s), {} cluster(s)",
            jobs.len(),
            clusters.len()
        );

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.jobs = Some(Arc::new(jobs));
        state.clusters = Some(Arc::new(clusters));
        Ok(())
    }

    /// Refreshes unless both lists have been loaded already
    pub async fn ensure_loaded(&self) -> Result<()> {
        if self.is_loaded() {
            return Ok(());
        }
        self.refresh().await
    }

    pub fn is_loaded(&self) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.jobs.is_some() && state.clusters.is_some()
    }

    /// Cached job definitions, empty before the first load
    pub fn jobs(&self) -> Arc<Vec<JobDefinition>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.jobs.clone().unwrap_or_default()
    }

    /// Cached clusters, empty before the first load
    pub fn clusters(&self) -> Arc<Vec<Cluster>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.clusters.clone().unwrap_or_default()
    }

    /// Looks up a cached job definition by name
    pub fn job(&self, name: &str) -> Result<JobDefinition> {
        self.jobs()
            .iter()
            .find(|job| job.name == name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("job {:?}", name)))
    }

    /// Describes the trigger form of a job, one field per parameter
    pub fn form(&self, name: &str) -> Result<Vec<ParameterField>> {
        let job = self.job(name)?;
        let clusters = self.clusters();

        Ok(job
            .parameters
            .iter()
            .map(|(key, default)| {
                let kind = classify(key);
                let choices = match kind {
                    ParameterKind::ClusterSelect => clusters
                        .iter()
                        .map(|cluster| ClusterChoice {
                            value: cluster.name.clone(),
                            label: cluster.label(),
                        })
                        .collect(),
                    ParameterKind::FreeText => Vec::new(),
                };
                ParameterField {
                    key: key.clone(),
                    kind,
                    default: default.clone(),
                    choices,
                }
            })
            .collect())
    }
}
