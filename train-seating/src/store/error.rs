//! Store error types.

/// Errors from loading or saving schedules and presets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing a file failed
    #[error("storage i/o failed: {message}")]
    Io { message: String },

    /// Stored data could not be encoded or decoded
    #[error("stored data is invalid: {message}")]
    Json { message: String },

    /// No preset under that name
    #[error("no preset named '{0}'")]
    MissingPreset(String),

    /// Blank preset name
    #[error("preset name must not be blank")]
    InvalidName,
}
