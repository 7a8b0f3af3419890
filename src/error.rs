//! Error types for the banditsim library.

use thiserror::Error;

/// Result type alias for bandit operations.
pub type Result<T> = std::result::Result<T, BanditError>;

/// Errors that can occur while configuring or running a simulation.
#[derive(Error, Debug)]
pub enum BanditError {
    /// A bandit was configured without any arms.
    #[error("no arms available")]
    NoArmsAvailable,

    /// A linear bandit was configured with zero-length feature vectors.
    #[error("linear bandit dimension must be positive")]
    ZeroDimension,

    /// Mismatch in the dimensions of input data.
    #[error("dimension mismatch: {message}")]
    DimensionMismatch { message: String },

    /// Invalid parameter value.
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// Structurally invalid configuration (mixed arm families, bad horizon, ...).
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The selected policy cannot read the statistics of this bandit.
    #[error("policy {policy} cannot run on a {bandit} bandit")]
    IncompatiblePolicy {
        policy: &'static str,
        bandit: &'static str,
    },

    /// Builder configuration error.
    #[error("builder error: {message}")]
    BuilderError { message: String },

    /// Numerical computation error.
    #[error("numerical error: {message}")]
    NumericalError { message: String },

    /// An arm index outside `[0, n_arms)` was pulled.
    #[error("arm index {index} out of range for {n_arms} arms")]
    ArmOutOfRange { index: usize, n_arms: usize },

    /// A precomputed reward sequence was read past its end.
    #[error("timestep {timestep} exceeds horizon {horizon}")]
    HorizonExceeded { timestep: u64, horizon: u64 },

    /// Writing regret output failed.
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    /// The receiving end of a regret channel hung up.
    #[error("regret channel closed")]
    ChannelClosed,
}

impl BanditError {
    pub(crate) fn invalid_parameter(message: impl Into<String>) -> Self {
        BanditError::InvalidParameter {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        BanditError::InvalidConfig {
            message: message.into(),
        }
    }

    pub(crate) fn numerical(message: impl Into<String>) -> Self {
        BanditError::NumericalError {
            message: message.into(),
        }
    }

    /// True for errors raised before any numeric work starts.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BanditError::NoArmsAvailable
                | BanditError::ZeroDimension
                | BanditError::DimensionMismatch { .. }
                | BanditError::InvalidParameter { .. }
                | BanditError::InvalidConfig { .. }
                | BanditError::IncompatiblePolicy { .. }
                | BanditError::BuilderError { .. }
        )
    }
}
