//! Runtime environment for trainer, pserver, and etcd containers
//!
//! Variable names and order are read by the `paddle_k8s` scripts in the
//! training images. Do not rename or reorder.

use edl_common::crd::TrainingJob;
use edl_common::quantity::quantity_value;
use edl_common::ParserConfig;
use k8s_openapi::api::core::v1::{EnvVar, EnvVarSource, ObjectFieldSelector};
use tracing::{debug, warn};

/// Env var carrying the pod IP, referenced by the etcd command line
pub const POD_IP_ENV: &str = "POD_IP";

fn literal(name: &str, value: impl ToString) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.to_string()),
        value_from: None,
    }
}

/// Env var resolved by the kubelet from a pod field at container start
fn field_ref(name: &str, field_path: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: None,
        value_from: Some(EnvVarSource {
            field_ref: Some(ObjectFieldSelector {
                field_path: field_path.to_string(),
                api_version: None,
            }),
            ..Default::default()
        }),
    }
}

/// Per-trainer worker count: GPUs when the trainer requests any, else CPU cores.
///
/// Unlike a requests-only lookup, a resource set only under `limits` is
/// counted too (see [`TrainerSpec::requested`]): a trainer with
/// `limits: {nvidia.com/gpu: 4}` and no GPU request gets a count of 4 and
/// `PADDLE_INIT_USE_GPU=1`. Kubernetes applies the same limit-as-request
/// defaulting when scheduling the pod.
///
/// Fractional CPU requests truncate ("500m" -> 0, "2.5" -> 2). A missing or
/// unparsable quantity counts as zero.
///
/// [`TrainerSpec::requested`]: edl_common::crd::TrainerSpec::requested
pub fn trainer_count(job: &TrainingJob, config: &ParserConfig) -> i64 {
    let resource = if job.need_gpu(&config.gpu_resource) {
        config.gpu_resource.as_str()
    } else {
        "cpu"
    };

    match job.spec.trainer.requested(resource).map(quantity_value) {
        Some(Ok(count)) => count,
        Some(Err(e)) => {
            warn!(job = %job.job_name(), resource, error = %e, "unparsable trainer resource request");
            0
        }
        None => 0,
    }
}

/// Build the ordered environment shared by trainer, pserver, and etcd containers.
pub fn compose_environment(job: &TrainingJob, config: &ParserConfig) -> Vec<EnvVar> {
    let spec = &job.spec;
    let use_gpu = if job.need_gpu(&config.gpu_resource) {
        "1"
    } else {
        "0"
    };
    let trainer_count = trainer_count(job, config);
    debug!(job = %job.job_name(), trainer_count, use_gpu, "composing job environment");

    vec![
        literal("PADDLE_JOB_NAME", job.job_name()),
        // TRAINERS, PSERVERS and PADDLE_INIT_NUM_GRADIENT_SERVERS only matter
        // for non-elastic training, so min-instance is used for all of them
        literal("TRAINERS", spec.trainer.min_instance),
        literal("PSERVERS", spec.pserver.min_instance),
        literal("ENTRY", &spec.trainer.entrypoint),
        // deprecated alias of ENTRY
        literal("TOPOLOGY", &spec.trainer.entrypoint),
        literal("TRAINER_PACKAGE", &spec.trainer.workspace),
        literal("PADDLE_INIT_PORT", spec.port),
        literal("PADDLE_INIT_TRAINER_COUNT", trainer_count),
        literal("PADDLE_INIT_PORTS_NUM", spec.ports_num),
        literal("PADDLE_INIT_PORTS_NUM_FOR_SPARSE", spec.ports_num_for_sparse),
        literal("PADDLE_INIT_NUM_GRADIENT_SERVERS", spec.trainer.min_instance),
        literal("PADDLE_INIT_NUM_PASSES", spec.passes),
        literal("PADDLE_INIT_USE_GPU", use_gpu),
        literal("LD_LIBRARY_PATH", &config.library_path),
        field_ref("NAMESPACE", "metadata.namespace"),
        field_ref(POD_IP_ENV, "status.podIP"),
    ]
}
