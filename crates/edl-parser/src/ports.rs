//! Container port allocation

use k8s_openapi::api::core::v1::ContainerPort;
use tracing::{debug, warn};

/// Master HTTP port
pub const MASTER_PORT: i32 = 8080;

/// etcd client port exposed by the master pod
pub const ETCD_CLIENT_PORT: i32 = 2379;

const MIN_PORT: i64 = 1;
const MAX_PORT: i64 = 65535;

fn named_port(name: impl Into<String>, port: i32) -> ContainerPort {
    ContainerPort {
        name: Some(name.into()),
        container_port: port,
        ..Default::default()
    }
}

/// Allocate `dense + sparse` consecutive ports starting at `base_port`.
///
/// Each port is named `jobport-<port>`. Negative counts contribute no ports.
/// Ports outside 1-65535 are dropped, so the result never wraps and never
/// exceeds the port space.
pub fn allocate_ports(base_port: i32, dense: i32, sparse: i32) -> Vec<ContainerPort> {
    let total = i64::from(dense.max(0)) + i64::from(sparse.max(0));
    let first = i64::from(base_port);
    let last = first + total - 1;
    debug!(base_port, dense, sparse, total, "allocating job ports");

    let (low, high) = (first.max(MIN_PORT), last.min(MAX_PORT));
    if total > 0 && (low > first || high < last) {
        warn!(base_port, total, "job ports outside {MIN_PORT}-{MAX_PORT} dropped");
    }

    (low..=high)
        .filter_map(|port| i32::try_from(port).ok())
        .map(|port| named_port(format!("jobport-{port}"), port))
        .collect()
}

/// Fixed ports of the master pod: the master itself and etcd
pub fn allocate_master_ports() -> Vec<ContainerPort> {
    vec![
        named_port("master-port", MASTER_PORT),
        named_port("etcd-port", ETCD_CLIENT_PORT),
    ]
}
