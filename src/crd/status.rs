//! # Client Status
//!
//! Status types for tracking the dependent workload set of a `Client`.

use serde::{Deserialize, Serialize};

/// Status of the Client resource
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientStatus {
    /// Current phase of the dependent workload set
    #[serde(default)]
    pub phase: Option<ClientPhase>,
    /// Generation of the spec the dependents were last provisioned or refreshed from
    #[serde(default)]
    pub observed_generation: Option<i64>,
    /// Last reconciliation time (RFC3339)
    #[serde(default)]
    pub last_reconcile_time: Option<String>,
    /// Observed state of each dependent object
    #[serde(default)]
    pub dependents: Option<DependentStates>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, schemars::JsonSchema)]
pub enum ClientPhase {
    /// Resource accepted, dependents not yet provisioned
    Pending,
    /// All four dependents exist
    Provisioned,
    /// Resource is being deleted and dependents are being removed
    Terminating,
}

impl std::fmt::Display for ClientPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Provisioned => "Provisioned",
            Self::Terminating => "Terminating",
        };
        f.write_str(s)
    }
}

/// Existence state of a single dependent object
///
/// State is derived from what the API server reports, never from memory.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default, schemars::JsonSchema)]
pub enum DependentState {
    #[default]
    Absent,
    Provisioned,
}

impl DependentState {
    pub fn is_provisioned(self) -> bool {
        self == Self::Provisioned
    }
}

/// Per-kind dependent states
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DependentStates {
    pub config_map: DependentState,
    pub deployment: DependentState,
    pub service: DependentState,
    pub autoscaler: DependentState,
}

impl DependentStates {
    pub fn all_provisioned(&self) -> bool {
        self.config_map.is_provisioned()
            && self.deployment.is_provisioned()
            && self.service.is_provisioned()
            && self.autoscaler.is_provisioned()
    }
}
