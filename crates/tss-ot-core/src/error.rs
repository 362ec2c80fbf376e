//! Error types for OT extension operations

use thiserror::Error;

/// Result type alias for OT extension operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the OT extension primitives
///
/// None of these are retried internally. A failed check usually means a
/// misbehaving peer, so recovery is left to the orchestrating layer.
#[derive(Debug, Error)]
pub enum Error {
    /// The entropy source could not produce randomness
    #[error("Randomness failure: {0}")]
    RandomnessFailure(String),

    /// Input had the wrong length or a reserved value
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A commitment or consistency check did not hold
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// Invalid worker pool configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<rand::Error> for Error {
    fn from(e: rand::Error) -> Self {
        Error::RandomnessFailure(e.to_string())
    }
}
