//! TrainingJob defaulting and validation
//!
//! Validation is deliberately shallow: defaults are filled for unset ports,
//! passes, and image, and the only rejected shape is an elastic job without
//! fault tolerance. Names, namespaces, instance counts, and resources pass
//! through unchecked.

use std::ops::Deref;

use edl_common::crd::TrainingJob;
use edl_common::{Error, ParserConfig, Result};
use tracing::{debug, warn};

/// A TrainingJob with defaults filled that passed validation
///
/// Only [`validate`] constructs this, so builders never see raw input.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedJob(TrainingJob);

impl ValidatedJob {
    /// Consume the wrapper and return the defaulted TrainingJob
    pub fn into_inner(self) -> TrainingJob {
        self.0
    }
}

impl Deref for ValidatedJob {
    type Target = TrainingJob;

    fn deref(&self) -> &TrainingJob {
        &self.0
    }
}

impl AsRef<TrainingJob> for ValidatedJob {
    fn as_ref(&self) -> &TrainingJob {
        &self.0
    }
}

/// Fill unset fields from `config` and enforce the elastic/fault-tolerant invariant.
pub fn validate(mut job: TrainingJob, config: &ParserConfig) -> Result<ValidatedJob> {
    let spec = &mut job.spec;
    if spec.port == 0 {
        spec.port = config.default_port;
    }
    if spec.ports_num == 0 {
        spec.ports_num = config.default_ports_num;
    }
    if spec.ports_num_for_sparse == 0 {
        spec.ports_num_for_sparse = config.default_ports_num_for_sparse;
    }
    if spec.image.is_empty() {
        spec.image = config.default_image.clone();
    }
    if spec.passes == 0 {
        spec.passes = config.default_passes;
    }

    if !job.spec.fault_tolerant && job.elastic() {
        let trainer = &job.spec.trainer;
        warn!(
            job = %job.job_name(),
            min_instance = trainer.min_instance,
            max_instance = trainer.max_instance,
            "rejecting elastic job without fault tolerance"
        );
        return Err(Error::invalid_elastic(
            job.job_name(),
            trainer.min_instance,
            trainer.max_instance,
        ));
    }

    debug!(
        job = %job.job_name(),
        port = job.spec.port,
        image = %job.spec.image,
        "training job validated"
    );
    Ok(ValidatedJob(job))
}
