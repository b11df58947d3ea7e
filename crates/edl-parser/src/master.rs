//! Master group: the job coordinator plus a single-node etcd
//!
//! The master is never scaled horizontally, so the group always has one
//! replica. etcd runs beside it in the same pod and advertises the pod IP,
//! which the kubelet resolves through the `POD_IP` env var.

use std::collections::BTreeMap;

use edl_common::ParserConfig;
use k8s_openapi::api::core::v1::{Container, PodSpec};

use crate::env::{compose_environment, POD_IP_ENV};
use crate::mode::{ExecutionMode, Role};
use crate::ports::{allocate_master_ports, ETCD_CLIENT_PORT};
use crate::validate::ValidatedJob;
use crate::workload::{base_pod_spec, non_empty, WorkloadKind, WorkloadUnit};

/// Pod label selecting a job's master
pub const MASTER_LABEL: &str = "paddle-job-master";

/// Legacy etcd client port, served alongside 2379
pub const ETCD_LEGACY_CLIENT_PORT: i32 = 4001;

/// etcd peer port
pub const ETCD_PEER_PORT: i32 = 2380;

const ETCD_MEMBER: &str = "etcd0";

/// etcd command line bootstrapping a new single-member cluster on the pod IP
fn etcd_command() -> Vec<String> {
    let pod_ip = format!("$({POD_IP_ENV})");
    vec![
        "etcd".to_string(),
        "-name".to_string(),
        ETCD_MEMBER.to_string(),
        "-advertise-client-urls".to_string(),
        format!("http://{pod_ip}:{ETCD_CLIENT_PORT},http://{pod_ip}:{ETCD_LEGACY_CLIENT_PORT}"),
        "-listen-client-urls".to_string(),
        format!("http://0.0.0.0:{ETCD_CLIENT_PORT},http://0.0.0.0:{ETCD_LEGACY_CLIENT_PORT}"),
        "-initial-advertise-peer-urls".to_string(),
        format!("http://{pod_ip}:{ETCD_PEER_PORT}"),
        "-listen-peer-urls".to_string(),
        format!("http://0.0.0.0:{ETCD_PEER_PORT}"),
        "-initial-cluster".to_string(),
        format!("{ETCD_MEMBER}=http://{pod_ip}:{ETCD_PEER_PORT}"),
        "-initial-cluster-state".to_string(),
        "new".to_string(),
    ]
}

fn etcd_container(job: &ValidatedJob, config: &ParserConfig) -> Container {
    Container {
        name: "etcd".to_string(),
        image: Some(config.etcd_image.clone()),
        image_pull_policy: Some(config.image_pull_policy.clone()),
        env: Some(compose_environment(job, config)),
        command: Some(etcd_command()),
        ..Default::default()
    }
}

/// Build the master ReplicaSet: one replica with master and etcd containers.
pub fn build_master(job: &ValidatedJob, config: &ParserConfig) -> WorkloadUnit {
    let spec = &job.spec;
    let name = job.job_name();

    let master = Container {
        name: Role::Master.to_string(),
        image: Some(spec.image.clone()),
        image_pull_policy: Some(config.image_pull_policy.clone()),
        ports: Some(allocate_master_ports()),
        command: Some(ExecutionMode::of(job).command(Role::Master)),
        volume_mounts: non_empty(&spec.volume_mounts),
        resources: Some(spec.master.resources.clone()),
        ..Default::default()
    };

    WorkloadUnit::new(
        WorkloadKind::ReplicaSet,
        format!("{name}-master"),
        job.job_namespace(),
        BTreeMap::from([(MASTER_LABEL.to_string(), name.to_string())]),
        1,
        PodSpec {
            containers: vec![master, etcd_container(job, config)],
            ..base_pod_spec(job)
        },
    )
}
