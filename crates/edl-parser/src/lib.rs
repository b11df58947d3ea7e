//! TrainingJob compiler for distributed PaddlePaddle training
//!
//! Turns a `TrainingJob` into three Kubernetes workload units:
//! - a pserver ReplicaSet (`<job>-pserver`)
//! - a trainer Job (`<job>-trainer`)
//! - a master ReplicaSet with an embedded etcd (`<job>-master`)
//!
//! Pure compilation crate: no Kubernetes client, no controller logic. Every
//! function is a deterministic transform of its inputs.
//!
//! # Usage
//!
//! ```rust,ignore
//! let parser = DefaultJobParser::new(ParserConfig::default())?;
//! let compiled = compile_training_job(&parser, job)?;
//! for manifest in compiled.manifests()? {
//!     // hand off to the apply layer
//! }
//! ```

#![deny(missing_docs)]

pub mod env;
pub mod master;
pub mod mode;
pub mod parser;
pub mod ports;
pub mod pserver;
pub mod trainer;
pub mod validate;
pub mod workload;

pub use env::compose_environment;
pub use master::build_master;
pub use mode::{ExecutionMode, Role};
pub use parser::{compile_training_job, CompiledTrainingJob, DefaultJobParser, JobParser};
pub use ports::{allocate_master_ports, allocate_ports};
pub use pserver::build_pserver;
pub use trainer::build_trainer;
pub use validate::{validate, ValidatedJob};
pub use workload::{WorkloadKind, WorkloadUnit};
