//! The published sheet.

use crate::grid::GridShape;
use bytes::Bytes;
use chrono::{DateTime, Utc};

/// An encoded sheet plus the parameters that produced it.
///
/// Immutable once built; each successful build creates a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetArtifact {
    png: Bytes,
    query: String,
    shape: GridShape,
    generated_at: DateTime<Utc>,
}

impl SheetArtifact {
    pub fn new(
        png: impl Into<Bytes>,
        query: impl Into<String>,
        shape: GridShape,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            png: png.into(),
            query: query.into(),
            shape,
            generated_at,
        }
    }

    /// Encoded PNG bytes. Cloning is a reference-count bump.
    pub fn png(&self) -> &Bytes {
        &self.png
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Generation time as milliseconds since the Unix epoch.
    pub fn generated_at_millis(&self) -> i64 {
        crate::time::to_millis(self.generated_at)
    }

    /// Size of the encoded image in bytes.
    pub fn len(&self) -> usize {
        self.png.len()
    }

    pub fn is_empty(&self) -> bool {
        self.png.is_empty()
    }
}
