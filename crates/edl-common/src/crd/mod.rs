//! Custom Resource Definitions for EDL
//!
//! `TrainingJob` is the only resource the parser consumes.

mod training_job;

pub use training_job::{MasterSpec, PserverSpec, TrainerSpec, TrainingJob, TrainingJobSpec};
