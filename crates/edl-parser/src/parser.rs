//! JobParser — validates a TrainingJob and builds its three workload units
//!
//! `JobParser` is the capability seam: a parser with a different naming or
//! port policy is another implementation of the trait. `DefaultJobParser`
//! wires the stock builders to a `ParserConfig`.

use edl_common::crd::TrainingJob;
use edl_common::{ParserConfig, Result};
use tracing::info;

use crate::master::build_master;
use crate::pserver::build_pserver;
use crate::trainer::build_trainer;
use crate::validate::{validate, ValidatedJob};
use crate::workload::WorkloadUnit;

/// Parses a TrainingJob into pserver, trainer, and master workload units
pub trait JobParser {
    /// Fill defaults and reject invalid jobs
    fn validate(&self, job: TrainingJob) -> Result<ValidatedJob>;

    /// Build the pserver replica group
    fn parse_to_pserver(&self, job: &ValidatedJob) -> WorkloadUnit;

    /// Build the trainer batch job
    fn parse_to_trainer(&self, job: &ValidatedJob) -> WorkloadUnit;

    /// Build the master replica group
    fn parse_to_master(&self, job: &ValidatedJob) -> WorkloadUnit;
}

/// Stock parser driven by a `ParserConfig`
#[derive(Clone, Debug, Default)]
pub struct DefaultJobParser {
    config: ParserConfig,
}

impl DefaultJobParser {
    /// Create a parser from a validated config
    pub fn new(config: ParserConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Config this parser applies
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }
}

impl JobParser for DefaultJobParser {
    fn validate(&self, job: TrainingJob) -> Result<ValidatedJob> {
        validate(job, &self.config)
    }

    fn parse_to_pserver(&self, job: &ValidatedJob) -> WorkloadUnit {
        build_pserver(job, &self.config)
    }

    fn parse_to_trainer(&self, job: &ValidatedJob) -> WorkloadUnit {
        build_trainer(job, &self.config)
    }

    fn parse_to_master(&self, job: &ValidatedJob) -> WorkloadUnit {
        build_master(job, &self.config)
    }
}

/// The three workload units generated for one TrainingJob
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledTrainingJob {
    /// Parameter-server ReplicaSet
    pub pserver: WorkloadUnit,
    /// Trainer Job
    pub trainer: WorkloadUnit,
    /// Master ReplicaSet (master + etcd)
    pub master: WorkloadUnit,
}

impl CompiledTrainingJob {
    /// Units in apply order: pserver, trainer, master
    pub fn units(&self) -> [&WorkloadUnit; 3] {
        [&self.pserver, &self.trainer, &self.master]
    }

    /// Native Kubernetes manifests in apply order
    pub fn manifests(&self) -> Result<Vec<serde_json::Value>> {
        self.units().iter().map(|u| u.to_manifest()).collect()
    }

    /// Manifests as a multi-document YAML stream
    pub fn to_yaml(&self) -> Result<String> {
        let docs = self
            .manifests()?
            .iter()
            .map(serde_yaml::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(docs.join("---\n"))
    }
}

/// Validate a TrainingJob once, then build all three workload units.
///
/// Nothing is built if validation fails.
pub fn compile_training_job(
    parser: &impl JobParser,
    job: TrainingJob,
) -> Result<CompiledTrainingJob> {
    let job = parser.validate(job)?;

    let compiled = CompiledTrainingJob {
        pserver: parser.parse_to_pserver(&job),
        trainer: parser.parse_to_trainer(&job),
        master: parser.parse_to_master(&job),
    };

    info!(
        job = %job.job_name(),
        namespace = %job.job_namespace(),
        pservers = compiled.pserver.replicas,
        trainers = compiled.trainer.replicas,
        fault_tolerant = job.spec.fault_tolerant,
        "compiled training job"
    );
    Ok(compiled)
}
