//! Error types for content lookups and loader operations

use thiserror::Error;

/// Content store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// No content exists under the key
    #[error("Content '{key}' not found")]
    NotFound {
        /// Storage key
        key: String,
    },

    /// Content exceeds the store's size limit
    #[error("Content '{key}' is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Storage key
        key: String,
        /// Actual size in bytes
        size: u64,
        /// Maximum allowed size in bytes
        limit: u64,
    },

    /// Underlying read failed
    #[error("Failed to read '{key}': {source}")]
    Io {
        /// Storage key
        key: String,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },
}

/// Loader errors
///
/// None of these are fatal: a request that hits one of them continues with
/// whatever content is already available.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Guide id is not registered in the catalog
    #[error("Guide '{guide}' not found")]
    GuideNotFound {
        /// Guide id
        guide: String,
    },

    /// Reference id is not owned by the guide
    #[error("Reference '{reference}' not found in guide '{guide}'")]
    ReferenceNotFound {
        /// Owning guide id
        guide: String,
        /// Reference id
        reference: String,
    },

    /// Reference requested before its owning guide was loaded
    #[error("Reference '{reference}' requested before guide '{guide}' was loaded")]
    GuideNotLoaded {
        /// Owning guide id
        guide: String,
        /// Reference id
        reference: String,
    },

    /// Guide or reference is registered but the store has no usable content
    #[error("Content for '{target}' is unavailable: {source}")]
    ContentUnavailable {
        /// `guide` or `guide/reference`
        target: String,
        /// Store failure
        #[source]
        source: StoreError,
    },

    /// Content failed earlier in this session and is not fetched again
    #[error("Content for '{target}' is unavailable (not retried): {reason}")]
    NotRetried {
        /// `guide` or `guide/reference`
        target: String,
        /// Message of the original failure
        reason: String,
    },
}

impl LoadError {
    /// Whether this error means an identifier or its content does not exist
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::GuideNotFound { .. }
            | Self::ReferenceNotFound { .. }
            | Self::NotRetried { .. } => true,
            Self::ContentUnavailable { source, .. } => matches!(source, StoreError::NotFound { .. }),
            Self::GuideNotLoaded { .. } => false,
        }
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, LoadError>;
