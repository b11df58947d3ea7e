//! Workload unit descriptors
//!
//! A `WorkloadUnit` is one replica group produced from a TrainingJob: a name,
//! a replica count, and a pod template. It converts into the native
//! Kubernetes resource for its kind (`apps/v1` ReplicaSet or `batch/v1` Job).

use std::collections::BTreeMap;

use edl_common::crd::TrainingJob;
use edl_common::{Error, Result};
use k8s_openapi::api::apps::v1::{ReplicaSet, ReplicaSetSpec};
use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};

/// Native resource a workload unit maps to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkloadKind {
    /// Long-running replica group (pserver, master)
    ReplicaSet,
    /// Batch job whose parallelism is the replica count (trainer)
    Job,
}

impl std::fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReplicaSet => write!(f, "ReplicaSet"),
            Self::Job => write!(f, "Job"),
        }
    }
}

/// One generated replica group of a TrainingJob
#[derive(Clone, Debug, PartialEq)]
pub struct WorkloadUnit {
    /// Native resource kind
    pub kind: WorkloadKind,
    /// Resource name (`<job>-<role>`)
    pub name: String,
    /// Resource namespace
    pub namespace: String,
    /// Pod labels, also used as the selector
    pub labels: BTreeMap<String, String>,
    /// Replicas (ReplicaSet) or parallelism (Job)
    pub replicas: i32,
    /// Pod template
    pub template: PodTemplateSpec,
}

impl WorkloadUnit {
    /// Create a unit whose pod template carries `labels`
    pub fn new(
        kind: WorkloadKind,
        name: impl Into<String>,
        namespace: impl Into<String>,
        labels: BTreeMap<String, String>,
        replicas: i32,
        pod_spec: PodSpec,
    ) -> Self {
        let template = PodTemplateSpec {
            metadata: Some(ObjectMeta {
                labels: Some(labels.clone()),
                ..Default::default()
            }),
            spec: Some(pod_spec),
        };
        Self {
            kind,
            name: name.into(),
            namespace: namespace.into(),
            labels,
            replicas,
            template,
        }
    }

    /// Pod spec of the template
    pub fn pod_spec(&self) -> Option<&PodSpec> {
        self.template.spec.as_ref()
    }

    /// Containers of the pod template, in order
    pub fn containers(&self) -> &[Container] {
        self.pod_spec()
            .map(|s| s.containers.as_slice())
            .unwrap_or_default()
    }

    /// Container with the given name
    pub fn container(&self, name: &str) -> Option<&Container> {
        self.containers().iter().find(|c| c.name == name)
    }

    fn metadata(&self) -> ObjectMeta {
        ObjectMeta {
            name: Some(self.name.clone()),
            namespace: Some(self.namespace.clone()),
            ..Default::default()
        }
    }

    /// Render as an `apps/v1` ReplicaSet selecting the unit's pod labels
    pub fn to_replica_set(&self) -> ReplicaSet {
        ReplicaSet {
            metadata: self.metadata(),
            spec: Some(ReplicaSetSpec {
                replicas: Some(self.replicas),
                selector: LabelSelector {
                    match_labels: Some(self.labels.clone()),
                    ..Default::default()
                },
                template: Some(self.template.clone()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Render as a `batch/v1` Job with parallelism set to the replica count
    pub fn to_job(&self) -> Job {
        Job {
            metadata: self.metadata(),
            spec: Some(JobSpec {
                parallelism: Some(self.replicas),
                template: self.template.clone(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Render the native resource for this unit's kind as JSON
    pub fn to_manifest(&self) -> Result<serde_json::Value> {
        let value = match self.kind {
            WorkloadKind::ReplicaSet => serde_json::to_value(self.to_replica_set()),
            WorkloadKind::Job => serde_json::to_value(self.to_job()),
        };
        value.map_err(|e| Error::serialization_for(self.kind.to_string(), e.to_string()))
    }
}

/// Pod-level settings every role inherits from the job: volumes, pull
/// secrets, and host networking. Containers are left for the builder.
pub(crate) fn base_pod_spec(job: &TrainingJob) -> PodSpec {
    let spec = &job.spec;
    PodSpec {
        volumes: non_empty(&spec.volumes),
        image_pull_secrets: non_empty(&spec.image_pull_secrets),
        host_network: spec.host_network.then_some(true),
        ..Default::default()
    }
}

pub(crate) fn non_empty<T: Clone>(items: &[T]) -> Option<Vec<T>> {
    (!items.is_empty()).then(|| items.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(kind: WorkloadKind) -> WorkloadUnit {
        let labels = BTreeMap::from([("paddle-job".to_string(), "wide2".to_string())]);
        let pod_spec = PodSpec {
            containers: vec![Container {
                name: "trainer".to_string(),
                image: Some("paddle:latest".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        WorkloadUnit::new(kind, "wide2-trainer", "ns1", labels, 4, pod_spec)
    }

    #[test]
    fn test_base_pod_spec_omits_unset_fields() {
        use edl_common::crd::TrainingJobSpec;
        use k8s_openapi::api::core::v1::LocalObjectReference;

        let mut job = TrainingJob::new("wide2", TrainingJobSpec::default());
        let pod = base_pod_spec(&job);
        assert!(pod.volumes.is_none());
        assert!(pod.image_pull_secrets.is_none());
        assert!(pod.host_network.is_none());

        job.spec.host_network = true;
        job.spec.image_pull_secrets = vec![LocalObjectReference {
            name: "regcred".to_string(),
        }];
        let pod = base_pod_spec(&job);
        assert_eq!(pod.host_network, Some(true));
        assert_eq!(pod.image_pull_secrets.map(|s| s.len()), Some(1));
    }

    #[test]
    fn test_template_carries_labels() {
        let unit = unit(WorkloadKind::Job);
        let labels = unit
            .template
            .metadata
            .as_ref()
            .and_then(|m| m.labels.as_ref())
            .expect("template labels should be set");
        assert_eq!(labels.get("paddle-job").map(String::as_str), Some("wide2"));
        assert_eq!(unit.containers().len(), 1);
        assert!(unit.container("trainer").is_some());
        assert!(unit.container("master").is_none());
    }

    #[test]
    fn test_replica_set_selects_pod_labels() {
        let rs = unit(WorkloadKind::ReplicaSet).to_replica_set();
        assert_eq!(rs.metadata.name.as_deref(), Some("wide2-trainer"));
        assert_eq!(rs.metadata.namespace.as_deref(), Some("ns1"));

        let spec = rs.spec.expect("spec should be set");
        assert_eq!(spec.replicas, Some(4));
        assert_eq!(
            spec.selector.match_labels,
            Some(BTreeMap::from([(
                "paddle-job".to_string(),
                "wide2".to_string()
            )]))
        );
    }

    #[test]
    fn test_job_uses_parallelism() {
        let job = unit(WorkloadKind::Job).to_job();
        let spec = job.spec.expect("spec should be set");
        assert_eq!(spec.parallelism, Some(4));
        assert!(spec.completions.is_none());
    }

    #[test]
    fn test_manifest_matches_kind() {
        let rs = unit(WorkloadKind::ReplicaSet).to_manifest().unwrap();
        assert_eq!(rs["apiVersion"], "apps/v1");
        assert_eq!(rs["kind"], "ReplicaSet");
        assert_eq!(rs["spec"]["replicas"], 4);

        let job = unit(WorkloadKind::Job).to_manifest().unwrap();
        assert_eq!(job["apiVersion"], "batch/v1");
        assert_eq!(job["kind"], "Job");
        assert_eq!(job["spec"]["parallelism"], 4);
        assert_eq!(
            job["spec"]["template"]["spec"]["containers"][0]["name"],
            "trainer"
        );
    }
}
