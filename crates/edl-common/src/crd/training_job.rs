//! TrainingJob CRD types
//!
//! Defines `TrainingJob`, a distributed training job made of three roles:
//! parameter servers, trainers, and a master with an embedded etcd.
//!
//! Numeric fields use zero as "unset"; the parser fills defaults for them
//! before any workload is built.

use k8s_openapi::api::core::v1::{LocalObjectReference, ResourceRequirements, Volume, VolumeMount};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::quantity::quantity_value;
use crate::DEFAULT_NAMESPACE;

// =============================================================================
// Role Specs
// =============================================================================

/// Trainer role: the workers that run the training program
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainerSpec {
    /// Command that starts the training program (exported as ENTRY/TOPOLOGY)
    #[serde(default)]
    pub entrypoint: String,

    /// Path of the training package inside the container
    #[serde(default)]
    pub workspace: String,

    /// Minimum trainer instances; also the trainer count for non-elastic jobs
    #[serde(default)]
    pub min_instance: i32,

    /// Maximum trainer instances; differs from `min_instance` for elastic jobs
    #[serde(default)]
    pub max_instance: i32,

    /// Compute resources for each trainer container
    #[serde(default)]
    pub resources: ResourceRequirements,
}

impl TrainerSpec {
    /// Requested quantity for a resource, falling back to its limit
    ///
    /// Extended resources such as GPUs are often set only as limits, in which
    /// case Kubernetes uses the limit as the request.
    pub fn requested(&self, resource: &str) -> Option<&Quantity> {
        self.resources
            .requests
            .as_ref()
            .and_then(|r| r.get(resource))
            .or_else(|| self.resources.limits.as_ref().and_then(|l| l.get(resource)))
    }
}

/// Parameter-server role
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PserverSpec {
    /// Minimum pserver instances; the replica count of the pserver group
    #[serde(default)]
    pub min_instance: i32,

    /// Maximum pserver instances
    #[serde(default)]
    pub max_instance: i32,

    /// Compute resources for each pserver container
    #[serde(default)]
    pub resources: ResourceRequirements,
}

/// Master role: the job coordinator
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MasterSpec {
    /// Compute resources for the master container
    #[serde(default)]
    pub resources: ResourceRequirements,
}

// =============================================================================
// CRD
// =============================================================================

/// Distributed training job specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "paddlepaddle.org",
    version = "v1",
    kind = "TrainingJob",
    plural = "trainingjobs",
    shortname = "tj",
    namespaced,
    derive = "PartialEq",
    printcolumn = r#"{"name":"Image","type":"string","jsonPath":".spec.image"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct TrainingJobSpec {
    /// Container image for trainer, pserver, and master (default applied when empty)
    #[serde(default)]
    pub image: String,

    /// Base port for trainer/pserver ports (default applied when zero)
    #[serde(default)]
    pub port: i32,

    /// Number of dense ports (default applied when zero)
    #[serde(default)]
    pub ports_num: i32,

    /// Number of sparse ports (default applied when zero)
    #[serde(default)]
    pub ports_num_for_sparse: i32,

    /// Number of training passes (default applied when zero)
    #[serde(default)]
    pub passes: i32,

    /// Run trainers and pservers in fault-tolerant mode
    #[serde(default)]
    pub fault_tolerant: bool,

    /// Run pods on the host network
    #[serde(default)]
    pub host_network: bool,

    /// Pod volumes shared by every role
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,

    /// Volume mounts for trainer and master containers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,

    /// Registry credentials for pulling the job image
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_pull_secrets: Vec<LocalObjectReference>,

    /// Trainer role
    #[serde(default)]
    pub trainer: TrainerSpec,

    /// Parameter-server role
    #[serde(default)]
    pub pserver: PserverSpec,

    /// Master role
    #[serde(default)]
    pub master: MasterSpec,
}

impl TrainingJob {
    /// Job name, empty if unset
    pub fn job_name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    /// Job namespace, `default` if unset
    pub fn job_namespace(&self) -> &str {
        self.metadata.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }

    /// Returns true if the trainer count may vary between min and max
    pub fn elastic(&self) -> bool {
        self.spec.trainer.min_instance != self.spec.trainer.max_instance
    }

    /// Returns true if trainers request at least one unit of `gpu_resource`
    pub fn need_gpu(&self, gpu_resource: &str) -> bool {
        self.spec
            .trainer
            .requested(gpu_resource)
            .and_then(|q| quantity_value(q).ok())
            .is_some_and(|count| count > 0)
    }
}

// =============================================================================
// Tests
// =============================================================================
