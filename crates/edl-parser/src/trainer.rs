//! Trainer group

use std::collections::BTreeMap;

use edl_common::ParserConfig;
use k8s_openapi::api::core::v1::{Container, PodSpec};

use crate::env::compose_environment;
use crate::mode::{ExecutionMode, Role};
use crate::ports::allocate_ports;
use crate::validate::ValidatedJob;
use crate::workload::{base_pod_spec, non_empty, WorkloadKind, WorkloadUnit};

/// Pod label selecting a job's trainers
pub const TRAINER_LABEL: &str = "paddle-job";

/// Failed trainer pods are not restarted in place
pub const TRAINER_RESTART_POLICY: &str = "Never";

/// Build the trainer Job with parallelism equal to the trainer `min_instance`.
pub fn build_trainer(job: &ValidatedJob, config: &ParserConfig) -> WorkloadUnit {
    let spec = &job.spec;
    let name = job.job_name();

    let container = Container {
        name: Role::Trainer.to_string(),
        image: Some(spec.image.clone()),
        image_pull_policy: Some(config.image_pull_policy.clone()),
        command: Some(ExecutionMode::of(job).command(Role::Trainer)),
        volume_mounts: non_empty(&spec.volume_mounts),
        ports: Some(allocate_ports(
            spec.port,
            spec.ports_num,
            spec.ports_num_for_sparse,
        )),
        env: Some(compose_environment(job, config)),
        resources: Some(spec.trainer.resources.clone()),
        ..Default::default()
    };

    WorkloadUnit::new(
        WorkloadKind::Job,
        format!("{name}-trainer"),
        job.job_namespace(),
        BTreeMap::from([(TRAINER_LABEL.to_string(), name.to_string())]),
        spec.trainer.min_instance,
        PodSpec {
            containers: vec![container],
            restart_policy: Some(TRAINER_RESTART_POLICY.to_string()),
            ..base_pod_spec(job)
        },
    )
}
