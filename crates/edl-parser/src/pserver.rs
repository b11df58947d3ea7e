//! Parameter-server group

use std::collections::BTreeMap;

use edl_common::ParserConfig;
use k8s_openapi::api::core::v1::{Container, PodSpec};

use crate::env::compose_environment;
use crate::mode::{ExecutionMode, Role};
use crate::ports::allocate_ports;
use crate::validate::ValidatedJob;
use crate::workload::{base_pod_spec, WorkloadKind, WorkloadUnit};

/// Pod label selecting a job's pservers
pub const PSERVER_LABEL: &str = "paddle-job-pserver";

/// Build the pserver ReplicaSet: `min_instance` replicas of one pserver container.
///
/// No restart policy is set; the ReplicaSet default applies.
pub fn build_pserver(job: &ValidatedJob, config: &ParserConfig) -> WorkloadUnit {
    let spec = &job.spec;
    let name = job.job_name();

    let container = Container {
        name: Role::Pserver.to_string(),
        image: Some(spec.image.clone()),
        command: Some(ExecutionMode::of(job).command(Role::Pserver)),
        ports: Some(allocate_ports(
            spec.port,
            spec.ports_num,
            spec.ports_num_for_sparse,
        )),
        env: Some(compose_environment(job, config)),
        resources: Some(spec.pserver.resources.clone()),
        ..Default::default()
    };

    WorkloadUnit::new(
        WorkloadKind::ReplicaSet,
        format!("{name}-pserver"),
        job.job_namespace(),
        BTreeMap::from([(PSERVER_LABEL.to_string(), name.to_string())]),
        spec.pserver.min_instance,
        PodSpec {
            containers: vec![container],
            ..base_pod_spec(job)
        },
    )
}
