/// Convenience result type used across cubefield.
pub type CubefieldResult<T> = Result<T, CubefieldError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Per-image atlas load failures and coordinate singularities never surface here: the former
/// degrade to a blank cell, the latter are clamped inside the layout generator.
#[derive(thiserror::Error, Debug)]
pub enum CubefieldError {
    /// Invalid user-provided scene or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The atlas could not be built at all.
    #[error("atlas error: {0}")]
    Atlas(String),

    /// Errors while validating or sampling keyframe timelines.
    #[error("timeline error: {0}")]
    Timeline(String),

    /// The rendering surface returned no frame data.
    #[error("capture error: {0}")]
    Capture(String),

    /// A frame sink rejected a frame.
    #[error("persist error: {0}")]
    Persist(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CubefieldError {
    /// Build a [`CubefieldError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CubefieldError::Atlas`] value.
    pub fn atlas(msg: impl Into<String>) -> Self {
        Self::Atlas(msg.into())
    }

    /// Build a [`CubefieldError::Timeline`] value.
    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::Timeline(msg.into())
    }

    /// Build a [`CubefieldError::Capture`] value.
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`CubefieldError::Persist`] value.
    pub fn persist(msg: impl Into<String>) -> Self {
        Self::Persist(msg.into())
    }

    /// Build a [`CubefieldError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for CubefieldError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
