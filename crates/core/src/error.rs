/// Result alias that carries the custom [`ResonanceError`] type.
pub type Result<T> = std::result::Result<T, ResonanceError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum ResonanceError {
    /// An operation was handed fewer feature records than it needs. A failed
    /// voiceprint match is reported as `Ok(false)`, never as this error.
    #[error("insufficient data: {0}")]
    InsufficientData(&'static str),
    /// A candidate feature vector does not line up with the enrolled
    /// voiceprint shape.
    #[error("dimension mismatch: candidate has {candidate} values, voiceprint has {enrolled}")]
    DimensionMismatch { candidate: usize, enrolled: usize },
    /// Malformed caller input, e.g. an empty sample window.
    #[error("{0}")]
    InvalidInput(&'static str),
    /// Free-form error used by facades that need to surface a readable
    /// message without a dedicated variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl ResonanceError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}
