//! Execution mode dispatch
//!
//! Maps (mode, role) to the `paddle_k8s` command the runtime image expects.
//! Builders ask the mode for their command instead of branching on the
//! fault-tolerance flag themselves.

use edl_common::crd::TrainingJob;

/// Entrypoint script shipped in the training runtime image
pub const PADDLE_K8S: &str = "paddle_k8s";

/// How trainers and pservers join the job
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Roles may restart or rejoin without restarting the whole job
    FaultTolerant,
    /// Fixed membership; every role starts once
    Simple,
}

/// A role within a training job
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Parameter server
    Pserver,
    /// Trainer
    Trainer,
    /// Master/coordinator
    Master,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pserver => write!(f, "pserver"),
            Self::Trainer => write!(f, "trainer"),
            Self::Master => write!(f, "master"),
        }
    }
}

impl ExecutionMode {
    /// Mode selected by the job's fault-tolerance flag
    pub fn of(job: &TrainingJob) -> Self {
        if job.spec.fault_tolerant {
            Self::FaultTolerant
        } else {
            Self::Simple
        }
    }

    /// Arguments passed to `paddle_k8s` for a role
    pub fn args(self, role: Role) -> &'static [&'static str] {
        match (self, role) {
            (Self::FaultTolerant, Role::Pserver) => &["start_new_pserver"],
            (Self::FaultTolerant, Role::Trainer) => &["start_new_trainer"],
            (Self::Simple, Role::Pserver) => &["start_pserver"],
            (Self::Simple, Role::Trainer) => &["start_trainer", "v2"],
            (_, Role::Master) => &["start_master"],
        }
    }

    /// Full container command for a role
    pub fn command(self, role: Role) -> Vec<String> {
        std::iter::once(PADDLE_K8S)
            .chain(self.args(role).iter().copied())
            .map(String::from)
            .collect()
    }
}
