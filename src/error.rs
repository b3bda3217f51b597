use thiserror::Error;

use crate::lifecycle::LoadGeneration;


#[derive(Debug, Error, Clone, PartialEq)]
pub enum CarouselError {
    #[error("failed to load splat `{uri}`: {reason}")]
    AssetLoadFailure {
        uri: String,
        reason: String,
    },

    #[error("missing capability: {0}")]
    MissingCapability(&'static str),

    #[error("discarded stale load of `{uri}` (generation {generation:?}, latest {latest:?})")]
    StaleResultDiscarded {
        uri: String,
        generation: LoadGeneration,
        latest: LoadGeneration,
    },

    #[error("invalid asset manifest: {0}")]
    InvalidManifest(String),

    #[error("non-finite tracked position {0:?}")]
    InvalidPose([f32; 3]),
}
