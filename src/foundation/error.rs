/// Convenience result type used across weaver.
pub type WeaverResult<T> = Result<T, WeaverError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Every variant is fatal for a synthesis run. Recoverable problems are reported as
/// [`crate::SchedulingWarning`] values instead.
#[derive(thiserror::Error, Debug)]
pub enum WeaverError {
    /// Invalid or incomplete story descriptor / configuration data.
    #[error("schema error: {0}")]
    Schema(String),

    /// An asset could not be fetched, probed, or found in the prepared catalog.
    #[error("asset unavailable for block '{block}': {reason}")]
    AssetUnavailable {
        /// Id of the block that owns the asset.
        block: String,
        /// Human-readable cause.
        reason: String,
    },

    /// A video could not be retimed and no fallback was configured.
    #[error("retime error for block '{block}': {reason}")]
    Retime {
        /// Id of the block that owns the video direction.
        block: String,
        /// Human-readable cause.
        reason: String,
    },

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WeaverError {
    /// Build a [`WeaverError::Schema`] value.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Build a [`WeaverError::AssetUnavailable`] value.
    pub fn asset_unavailable(block: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AssetUnavailable {
            block: block.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`WeaverError::Retime`] value.
    pub fn retime(block: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Retime {
            block: block.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`WeaverError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Id of the block a fatal error originated from, when known.
    pub fn block(&self) -> Option<&str> {
        match self {
            Self::AssetUnavailable { block, .. } | Self::Retime { block, .. } => Some(block),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
