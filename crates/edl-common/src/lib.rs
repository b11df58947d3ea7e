//! Common types for the EDL job parser: the TrainingJob CRD, errors, and configuration
//!
//! - [`crd`] - `TrainingJob` custom resource (the job description)
//! - [`config`] - `ParserConfig`, the immutable defaults used by the parser
//! - [`quantity`] - integer views of Kubernetes resource quantities
//! - [`error`] - error types shared across crates

#![deny(missing_docs)]

pub mod config;
pub mod crd;
pub mod error;
pub mod quantity;

pub use config::ParserConfig;
pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Namespace used when a TrainingJob carries none
pub const DEFAULT_NAMESPACE: &str = "default";
