//! Convenience parameter structs for node pool operations
//!
//! These provide a simpler interface for common create/update cases. For
//! anything they don't cover, build [`CreateNodePoolDetails`] or
//! [`UpdateNodePoolDetails`] directly.

use crate::api::{CreateNodePoolDetails, KeyValue, UpdateNodePoolDetails};

/// Parameters for creating a node pool
///
/// # Example
///
/// ```rust
/// use nodepoolctl_core::node_pool::CreateNodePoolParams;
///
/// let details = CreateNodePoolParams::new("ocid1.cluster.oc1..x", "workers", "v1.29.1", "VM.Standard.E4.Flex")
///     .with_subnets(["subnet-a", "subnet-b"], 2)
///     .with_label("team", "data")
///     .into_details("ocid1.compartment.oc1..y");
///
/// assert_eq!(details.subnet_ids.len(), 2);
/// assert_eq!(details.quantity_per_subnet, Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct CreateNodePoolParams {
    /// Cluster the pool joins (required)
    pub cluster_id: String,
    /// Pool name (required)
    pub name: String,
    /// Kubernetes version of the nodes (required)
    pub kubernetes_version: String,
    /// Compute shape of the nodes (required)
    pub node_shape: String,
    /// Image name; the service picks one when unset
    pub node_image_name: Option<String>,
    pub subnet_ids: Vec<String>,
    /// Nodes per subnet
    pub quantity_per_subnet: Option<u32>,
    pub labels: Vec<KeyValue>,
    pub ssh_public_key: Option<String>,
}

impl CreateNodePoolParams {
    /// Create new params with required fields
    #[must_use]
    pub fn new(
        cluster_id: impl Into<String>,
        name: impl Into<String>,
        kubernetes_version: impl Into<String>,
        node_shape: impl Into<String>,
    ) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            name: name.into(),
            kubernetes_version: kubernetes_version.into(),
            node_shape: node_shape.into(),
            node_image_name: None,
            subnet_ids: Vec::new(),
            quantity_per_subnet: None,
            labels: Vec::new(),
            ssh_public_key: None,
        }
    }

    /// Place `quantity` nodes in each of `subnets`
    #[must_use]
    pub fn with_subnets<I, S>(mut self, subnets: I, quantity: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subnet_ids = subnets.into_iter().map(Into::into).collect();
        self.quantity_per_subnet = Some(quantity);
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.node_image_name = Some(image.into());
        self
    }

    /// Add an initial Kubernetes node label
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push(KeyValue {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn with_ssh_public_key(mut self, key: impl Into<String>) -> Self {
        self.ssh_public_key = Some(key.into());
        self
    }

    /// Convert to the request body, in the given compartment
    #[must_use]
    pub fn into_details(self, compartment_id: impl Into<String>) -> CreateNodePoolDetails {
        CreateNodePoolDetails {
            compartment_id: compartment_id.into(),
            cluster_id: self.cluster_id,
            name: self.name,
            kubernetes_version: self.kubernetes_version,
            node_image_name: self.node_image_name,
            node_shape: self.node_shape,
            subnet_ids: self.subnet_ids,
            quantity_per_subnet: self.quantity_per_subnet,
            initial_node_labels: self.labels,
            ssh_public_key: self.ssh_public_key,
            node_config_details: None,
        }
    }
}

/// Parameters for updating a node pool
///
/// All fields are optional - only set fields you want to change.
#[derive(Debug, Clone, Default)]
pub struct UpdateNodePoolParams {
    pub name: Option<String>,
    pub kubernetes_version: Option<String>,
    pub quantity_per_subnet: Option<u32>,
    pub subnet_ids: Option<Vec<String>>,
}

impl UpdateNodePoolParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Upgrade the nodes to a new Kubernetes version
    #[must_use]
    pub fn with_kubernetes_version(mut self, version: impl Into<String>) -> Self {
        self.kubernetes_version = Some(version.into());
        self
    }

    /// Scale to `quantity` nodes per subnet
    #[must_use]
    pub fn with_quantity_per_subnet(mut self, quantity: u32) -> Self {
        self.quantity_per_subnet = Some(quantity);
        self
    }

    #[must_use]
    pub fn with_subnets<I, S>(mut self, subnets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subnet_ids = Some(subnets.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn into_details(self) -> UpdateNodePoolDetails {
        UpdateNodePoolDetails {
            name: self.name,
            kubernetes_version: self.kubernetes_version,
            quantity_per_subnet: self.quantity_per_subnet,
            subnet_ids: self.subnet_ids,
            ..Default::default()
        }
    }
}
