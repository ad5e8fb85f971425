//! Single-slot cache for the most recently built sheet.
//!
//! The slot starts empty and is only ever replaced wholesale with the
//! artifact of a fully successful build. Readers get an `Arc` to an
//! immutable artifact, so a replace never tears a value a reader holds.

mod artifact;

pub use artifact::SheetArtifact;

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Holds at most one [`SheetArtifact`].
#[derive(Debug, Default)]
pub struct SheetCache {
    slot: RwLock<Option<Arc<SheetArtifact>>>,
}

impl SheetCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `artifact`, replacing whatever was cached.
    ///
    /// Returns the shared handle now held by the cache.
    pub fn replace(&self, artifact: SheetArtifact) -> Arc<SheetArtifact> {
        let artifact = Arc::new(artifact);
        let previous = self.slot.write().replace(Arc::clone(&artifact));

        debug!(
            query = %artifact.query(),
            shape = %artifact.shape(),
            bytes = artifact.len(),
            replaced = previous.is_some(),
            "Sheet published"
        );
        artifact
    }

    /// The current artifact, if any build has completed.
    pub fn latest(&self) -> Option<Arc<SheetArtifact>> {
        self.slot.read().clone()
    }

    /// True until the first successful build.
    pub fn is_empty(&self) -> bool {
        self.slot.read().is_none()
    }
}
