//! Wire types for the Container Engine API
//!
//! Field names follow the service's camelCase JSON. Optional fields are
//! `Option`s and are skipped when absent, so an unset name is never
//! confused with an empty one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generates a string-backed enum with a catch-all `Unknown` variant so new
/// values added by the service don't break deserialization.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A value this client does not know about
            Unknown(String),
        }

        impl $name {
            /// The value as it appears on the wire
            pub fn as_str(&self) -> &str {
                match self {
                    $( $name::$variant => $wire, )+
                    $name::Unknown(other) => other.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.to_ascii_uppercase().as_str() {
                    $( $wire => $name::$variant, )+
                    _ => $name::Unknown(value),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Status of an asynchronous work request
    pub enum WorkRequestStatus {
        Accepted => "ACCEPTED",
        InProgress => "IN_PROGRESS",
        Failed => "FAILED",
        Succeeded => "SUCCEEDED",
        Canceling => "CANCELING",
        Canceled => "CANCELED",
    }
}

impl WorkRequestStatus {
    /// Only `Succeeded`, `Failed` and `Canceled` are terminal. Once a work
    /// request reports one of these it never changes again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkRequestStatus::Succeeded | WorkRequestStatus::Failed | WorkRequestStatus::Canceled
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WorkRequestStatus::Succeeded)
    }
}

wire_enum! {
    /// What a completed work request did to one resource
    pub enum ActionType {
        Created => "CREATED",
        Updated => "UPDATED",
        Deleted => "DELETED",
        Related => "RELATED",
        InProgress => "IN_PROGRESS",
        Failed => "FAILED",
    }
}

wire_enum! {
    /// Lifecycle state of a single worker node
    pub enum NodeLifecycleState {
        Creating => "CREATING",
        Active => "ACTIVE",
        Updating => "UPDATING",
        Deleting => "DELETING",
        Deleted => "DELETED",
        Failing => "FAILING",
        Inactive => "INACTIVE",
    }
}

wire_enum! {
    /// Lifecycle state of a node pool
    pub enum NodePoolLifecycleState {
        Creating => "CREATING",
        Active => "ACTIVE",
        Updating => "UPDATING",
        Deleting => "DELETING",
        Deleted => "DELETED",
        Failed => "FAILED",
        Inactive => "INACTIVE",
        NeedsAttention => "NEEDS_ATTENTION",
    }
}

/// Opaque identifier of a submitted asynchronous operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkRequestId(String);

impl WorkRequestId {
    /// Wrap a raw id. Returns `None` for an empty or blank id.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resource touched by a work request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRequestResource {
    pub entity_type: String,
    pub action_type: ActionType,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_uri: Option<String>,
}

/// Status payload of an asynchronous work request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRequest {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<String>,
    pub status: WorkRequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compartment_id: Option<String>,
    #[serde(default)]
    pub resources: Vec<WorkRequestResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_accepted: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_started: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_finished: Option<DateTime<Utc>>,
}

/// An error reported against a work request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRequestError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Key/value label applied to nodes at creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

/// Placement of nodes for pools sized through `nodeConfigDetails`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementConfig {
    pub availability_domain: String,
    pub subnet_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfigDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placement_configs: Vec<PlacementConfig>,
}

/// A worker node in a node pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip: Option<String>,
    pub lifecycle_state: NodeLifecycleState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_details: Option<String>,
}

/// Full node pool, including its nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePool {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compartment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_image_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_shape: Option<String>,
    #[serde(default)]
    pub subnet_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_per_subnet: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_config_details: Option<NodeConfigDetails>,
    #[serde(default)]
    pub initial_node_labels: Vec<KeyValue>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<NodePoolLifecycleState>,
}

impl NodePool {
    /// Number of nodes the pool should be running.
    ///
    /// Subnet-based pools want `quantityPerSubnet` nodes in every subnet;
    /// pools sized through `nodeConfigDetails` carry the total directly.
    /// `None` when the payload carries neither.
    pub fn expected_node_count(&self) -> Option<usize> {
        match self.quantity_per_subnet {
            Some(quantity) if !self.subnet_ids.is_empty() => {
                Some(self.subnet_ids.len() * quantity as usize)
            }
            _ => self
                .node_config_details
                .as_ref()
                .and_then(|details| details.size)
                .map(|size| size as usize),
        }
    }
}

/// Node pool as returned by list calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePoolSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compartment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_shape: Option<String>,
    #[serde(default)]
    pub subnet_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_per_subnet: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<NodePoolLifecycleState>,
}

/// Request body for creating a node pool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodePoolDetails {
    /// Filled from the profile when left empty
    #[serde(default)]
    pub compartment_id: String,
    pub cluster_id: String,
    pub name: String,
    pub kubernetes_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_image_name: Option<String>,
    pub node_shape: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnet_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_per_subnet: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub initial_node_labels: Vec<KeyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_config_details: Option<NodeConfigDetails>,
}

/// Request body for updating a node pool. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNodePoolDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_per_subnet: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_node_labels: Option<Vec<KeyValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_config_details: Option<NodeConfigDetails>,
}

/// Images, versions and shapes available for node pools
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePoolOptions {
    #[serde(default)]
    pub kubernetes_versions: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub shapes: Vec<String>,
}

/// Filter parameters for listing node pools. The cursor is passed
/// separately so the same filter can be reused for every page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePoolFilter {
    pub compartment_id: String,
    pub cluster_id: Option<String>,
    pub name: Option<String>,
    pub limit: Option<u32>,
}

impl NodePoolFilter {
    pub fn new(compartment_id: impl Into<String>) -> Self {
        Self {
            compartment_id: compartment_id.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn cluster_id(mut self, cluster_id: impl Into<String>) -> Self {
        self.cluster_id = Some(cluster_id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One page of a cursor-paginated listing. `next_cursor` is `None` exactly
/// on the last page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_terminal_states() {
        assert!(WorkRequestStatus::Succeeded.is_terminal());
        assert!(WorkRequestStatus::Failed.is_terminal());
        assert!(WorkRequestStatus::Canceled.is_terminal());
        assert!(!WorkRequestStatus::Accepted.is_terminal());
        assert!(!WorkRequestStatus::InProgress.is_terminal());
        // Canceling has not settled yet
        assert!(!WorkRequestStatus::Canceling.is_terminal());
        assert!(!WorkRequestStatus::from("PAUSED").is_terminal());
    }

    #[test]
    fn test_unknown_values_are_preserved() {
        let status: WorkRequestStatus = serde_json::from_value(json!("WAITING")).unwrap();
        assert_eq!(status, WorkRequestStatus::Unknown("WAITING".to_string()));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("WAITING"));
    }

    #[test]
    fn test_enum_parsing_is_case_insensitive() {
        assert_eq!(ActionType::from("created"), ActionType::Created);
        assert_eq!(
            NodeLifecycleState::from("Active"),
            NodeLifecycleState::Active
        );
    }

    #[test]
    fn test_work_request_deserialization() {
        let wr: WorkRequest = serde_json::from_value(json!({
            "id": "ocid1.workrequest.1",
            "operationType": "NODEPOOL_CREATE",
            "status": "SUCCEEDED",
            "resources": [{
                "entityType": "NODEPOOL",
                "actionType": "CREATED",
                "identifier": "ocid1.nodepool.1"
            }],
            "timeAccepted": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(wr.status, WorkRequestStatus::Succeeded);
        assert_eq!(wr.resources.len(), 1);
        assert_eq!(wr.resources[0].action_type, ActionType::Created);
        assert!(wr.time_finished.is_none());
    }

    #[test]
    fn test_work_request_id_rejects_blank() {
        assert!(WorkRequestId::new("").is_none());
        assert!(WorkRequestId::new("   ").is_none());
        assert_eq!(WorkRequestId::new("wr-1").unwrap().as_str(), "wr-1");
    }

    #[test]
    fn test_expected_node_count_from_subnets() {
        let pool: NodePool = serde_json::from_value(json!({
            "id": "np-1",
            "name": "pool",
            "subnetIds": ["s1", "s2", "s3"],
            "quantityPerSubnet": 2
        }))
        .unwrap();
        assert_eq!(pool.expected_node_count(), Some(6));
    }

    #[test]
    fn test_expected_node_count_from_node_config() {
        let pool: NodePool = serde_json::from_value(json!({
            "id": "np-1",
            "name": "pool",
            "nodeConfigDetails": { "size": 4 }
        }))
        .unwrap();
        assert_eq!(pool.expected_node_count(), Some(4));
    }

    #[test]
    fn test_expected_node_count_unknown_without_sizing() {
        let pool: NodePool = serde_json::from_value(json!({
            "id": "np-1",
            "name": "pool",
            "subnetIds": ["s1"]
        }))
        .unwrap();
        assert_eq!(pool.expected_node_count(), None);
    }

    #[test]
    fn test_update_details_skip_absent_fields() {
        let details = UpdateNodePoolDetails {
            name: Some(String::new()),
            ..Default::default()
        };
        // An explicit empty name is sent, unset fields are not
        assert_eq!(serde_json::to_value(&details).unwrap(), json!({ "name": "" }));
    }
}
