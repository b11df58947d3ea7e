//! Error types for the EDL job parser
//!
//! Only one error is part of the job contract: an elastic job without fault
//! tolerance. The remaining variants cover configuration and rendering.

use thiserror::Error;

/// Main error type for job parsing operations
#[derive(Debug, Error)]
pub enum Error {
    /// Elastic scaling was requested without fault tolerance
    #[error(
        "invalid elastic configuration for {job}: max-instances ({max_instance}) should equal \
         min-instances ({min_instance}) when fault_tolerant is disabled"
    )]
    InvalidElasticConfiguration {
        /// Name of the rejected TrainingJob
        job: String,
        /// Trainer minimum instance count
        min_instance: i32,
        /// Trainer maximum instance count
        max_instance: i32,
    },

    /// Parser configuration would break post-validation invariants
    #[error("invalid parser config: {message}")]
    InvalidConfig {
        /// Description of what's invalid
        message: String,
    },

    /// Resource quantity could not be parsed
    #[error("invalid quantity '{quantity}'")]
    InvalidQuantity {
        /// The raw quantity string
        quantity: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },
}

impl Error {
    /// Create an elastic-configuration error for the named job
    pub fn invalid_elastic(job: impl Into<String>, min_instance: i32, max_instance: i32) -> Self {
        Self::InvalidElasticConfiguration {
            job: job.into(),
            min_instance,
            max_instance,
        }
    }

    /// Create a config error with the given message
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: msg.into(),
        }
    }

    /// Create a quantity error for the given raw value
    pub fn invalid_quantity(quantity: impl Into<String>) -> Self {
        Self::InvalidQuantity {
            quantity: quantity.into(),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error for a specific resource kind
    pub fn serialization_for(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
