use thiserror::Error;

use crate::model::ModelError;
use crate::pipeline::BuildError;

/// Why the service could not reach the ready state.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load artifacts: {0}")]
    Artifacts(#[from] ModelError),

    #[error("failed to build pipeline: {0}")]
    Pipeline(#[from] BuildError),
}
