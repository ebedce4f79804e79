use std::sync::Arc;

use moka::future::Cache;
use thiserror::Error;

use crate::store::{BranchDirectory, StoreError};

pub const UNKNOWN_BRANCH: &str = "Unknown Branch";

#[derive(Debug, Error)]
enum BranchLookupError {
    #[error("branch not found")]
    Missing,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Branch display names by id. Only successful lookups are kept.
#[derive(Clone)]
pub struct BranchNameCache {
    directory: Arc<dyn BranchDirectory>,
    names: Cache<String, String>,
}

impl BranchNameCache {
    pub fn new(directory: Arc<dyn BranchDirectory>) -> Self {
        Self {
            directory,
            names: Cache::builder().build(),
        }
    }

    pub async fn name(&self, branch_id: &str) -> String {
        let directory = self.directory.clone();
        let id = branch_id.to_string();

        let lookup = self
            .names
            .try_get_with(branch_id.to_string(), async move {
                directory
                    .branch_name(&id)
                    .await?
                    .ok_or(BranchLookupError::Missing)
            })
            .await;

        match lookup {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(error = %e, branch_id, "Branch name lookup failed");
                UNKNOWN_BRANCH.to_string()
            }
        }
    }
}
