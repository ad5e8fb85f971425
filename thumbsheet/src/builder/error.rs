//! Build errors.

use crate::compose::ComposeError;
use crate::fetch::FetchError;
use thiserror::Error;

/// Why a sheet build was abandoned.
///
/// A build that returns any of these published nothing. `Clone` so a
/// single outcome can be handed to every coalesced waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The first tile fetch that failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Composition of the fetched tiles failed.
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// A fetch or compose task panicked or was cancelled.
    #[error("build task interrupted: {0}")]
    Interrupted(String),
}
