//! Parser configuration
//!
//! Every default the parser fills in, plus the fixed images and paths it
//! injects, lives in one immutable value handed to the parser at construction.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default trainer/pserver image when a job names none
pub const DEFAULT_IMAGE: &str = "paddlepaddle/paddlecloud-job";

/// Default base port for pserver/trainer ports
pub const DEFAULT_PORT: i32 = 7164;

/// Pull policy applied to trainer, master, and etcd containers
pub const DEFAULT_IMAGE_PULL_POLICY: &str = "Always";

/// Pinned etcd image for the master's coordination sidecar
pub const DEFAULT_ETCD_IMAGE: &str = "quay.io/coreos/etcd:v3.2.1";

/// Native library search path exported to trainer and pserver containers
pub const DEFAULT_LIBRARY_PATH: &str = "/usr/local/cuda/lib64";

/// Extended resource name for GPU accelerators
pub const DEFAULT_GPU_RESOURCE: &str = "nvidia.com/gpu";

/// Immutable defaults and fixed values used when parsing a TrainingJob
///
/// Deserializes from a partial YAML document; omitted fields keep their defaults.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Image used when `spec.image` is empty
    pub default_image: String,
    /// Base port used when `spec.port` is zero
    pub default_port: i32,
    /// Dense port count used when `spec.portsNum` is zero
    pub default_ports_num: i32,
    /// Sparse port count used when `spec.portsNumForSparse` is zero
    pub default_ports_num_for_sparse: i32,
    /// Pass count used when `spec.passes` is zero
    pub default_passes: i32,
    /// Image pull policy for always-refreshed containers
    pub image_pull_policy: String,
    /// Image for the embedded etcd container
    pub etcd_image: String,
    /// Value of `LD_LIBRARY_PATH`
    pub library_path: String,
    /// Resource name counted as GPU accelerators
    pub gpu_resource: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_image: DEFAULT_IMAGE.to_string(),
            default_port: DEFAULT_PORT,
            default_ports_num: 1,
            default_ports_num_for_sparse: 1,
            default_passes: 1,
            image_pull_policy: DEFAULT_IMAGE_PULL_POLICY.to_string(),
            etcd_image: DEFAULT_ETCD_IMAGE.to_string(),
            library_path: DEFAULT_LIBRARY_PATH.to_string(),
            gpu_resource: DEFAULT_GPU_RESOURCE.to_string(),
        }
    }
}

impl ParserConfig {
    /// Parse a config from YAML and validate it
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the defaults satisfy the invariants a validated job must hold
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("defaultPort", self.default_port),
            ("defaultPortsNum", self.default_ports_num),
            ("defaultPortsNumForSparse", self.default_ports_num_for_sparse),
            ("defaultPasses", self.default_passes),
        ];
        for (field, value) in positive {
            if value <= 0 {
                return Err(Error::invalid_config(format!(
                    "{field} must be positive, got {value}"
                )));
            }
        }

        if self.default_image.trim().is_empty() {
            return Err(Error::invalid_config("defaultImage must not be empty"));
        }
        if self.image_pull_policy.trim().is_empty() {
            return Err(Error::invalid_config("imagePullPolicy must not be empty"));
        }

        Ok(())
    }
}
