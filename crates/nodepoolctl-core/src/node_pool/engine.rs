//! Node pool workflows - multi-step operations
//!
//! Each mutating workflow submits the change, waits on the returned work
//! request and, where the caller needs it, correlates the affected node
//! pool id out of the finished work request.

use crate::api::{
    ActionType, ContainerEngineApi, CreateNodePoolDetails, NodePool, NodePoolFilter,
    NodePoolOptions, NodePoolSummary, UpdateNodePoolDetails, WorkRequest, WorkRequestId,
};
use crate::correlate::{NODE_POOL_ENTITY, extract_resource_id};
use crate::error::{CoreError, Result};
use crate::paginate::{self, DEFAULT_PAGE_SIZE};
use crate::progress::{ProgressCallback, WaitOptions, poll_work_request};
use crate::readiness::is_ready;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Option id the service answers with options valid for every cluster
pub const ALL_NODE_POOL_OPTIONS: &str = "all";

/// Node pool operations against one compartment
///
/// # Example
///
/// ```rust,ignore
/// use nodepoolctl_core::node_pool::{CreateNodePoolParams, NodePoolEngine};
/// use tokio_util::sync::CancellationToken;
///
/// let engine = NodePoolEngine::new(client, compartment_id);
/// let details = CreateNodePoolParams::new(cluster_id, "workers", "v1.29.1", "VM.Standard.E4.Flex")
///     .with_subnets(subnets, 1)
///     .into_details(engine.compartment_id());
///
/// let pool_id = engine
///     .create_node_pool_and_wait(&details, &CancellationToken::new(), None)
///     .await?;
/// ```
pub struct NodePoolEngine<A> {
    api: A,
    compartment_id: String,
    wait: WaitOptions,
    page_size: u32,
}

impl<A: ContainerEngineApi> NodePoolEngine<A> {
    pub fn new(api: A, compartment_id: impl Into<String>) -> Self {
        Self {
            api,
            compartment_id: compartment_id.into(),
            wait: WaitOptions::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    #[must_use]
    pub fn with_wait_options(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn compartment_id(&self) -> &str {
        &self.compartment_id
    }

    pub fn wait_options(&self) -> &WaitOptions {
        &self.wait
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Wait on a work request with this engine's wait options
    pub async fn wait_for_work_request(
        &self,
        work_request_id: &WorkRequestId,
        cancel: &CancellationToken,
        on_progress: Option<ProgressCallback>,
    ) -> Result<WorkRequest> {
        poll_work_request(&self.api, work_request_id, &self.wait, cancel, on_progress).await
    }

    /// Create a node pool and wait for completion
    ///
    /// This workflow:
    /// 1. Submits the create (returns a work request id)
    /// 2. Polls the work request until it succeeds
    /// 3. Returns the id of the `NODEPOOL` resource it created
    ///
    /// An empty `compartment_id` in `details` is filled with the engine's.
    pub async fn create_node_pool_and_wait(
        &self,
        details: &CreateNodePoolDetails,
        cancel: &CancellationToken,
        on_progress: Option<ProgressCallback>,
    ) -> Result<String> {
        if details.name.trim().is_empty() {
            return Err(CoreError::Validation(
                "node pool name must not be empty".to_string(),
            ));
        }
        if details.cluster_id.trim().is_empty() {
            return Err(CoreError::Validation(
                "cluster id must not be empty".to_string(),
            ));
        }

        let mut details = details.clone();
        if details.compartment_id.is_empty() {
            details.compartment_id = self.compartment_id.clone();
        }

        info!("Creating node pool {}", details.name);
        let work_request_id = self.api.create_node_pool(&details).await?;
        let completed = self
            .wait_for_work_request(&work_request_id, cancel, on_progress)
            .await?;

        extract_resource_id(&completed, &ActionType::Created, NODE_POOL_ENTITY)
    }

    /// Update a node pool and wait for completion
    ///
    /// Returns the id of the `NODEPOOL` resource the work request reports
    /// as updated.
    pub async fn update_node_pool_and_wait(
        &self,
        node_pool_id: &str,
        details: &UpdateNodePoolDetails,
        cancel: &CancellationToken,
        on_progress: Option<ProgressCallback>,
    ) -> Result<String> {
        info!("Updating node pool {}", node_pool_id);
        let work_request_id = self.api.update_node_pool(node_pool_id, details).await?;
        let completed = self
            .wait_for_work_request(&work_request_id, cancel, on_progress)
            .await?;

        extract_resource_id(&completed, &ActionType::Updated, NODE_POOL_ENTITY)
    }

    /// Delete a node pool and wait for completion
    pub async fn delete_node_pool_and_wait(
        &self,
        node_pool_id: &str,
        cancel: &CancellationToken,
        on_progress: Option<ProgressCallback>,
    ) -> Result<()> {
        info!("Deleting node pool {}", node_pool_id);
        let work_request_id = self.api.delete_node_pool(node_pool_id).await?;
        self.wait_for_work_request(&work_request_id, cancel, on_progress)
            .await?;
        Ok(())
    }

    /// Delete the node pool called `name` in a cluster, if there is one
    ///
    /// Returns `false` without touching anything when no pool has that
    /// name. Otherwise the delete is awaited and its outcome returned.
    pub async fn delete_node_pool_by_name(
        &self,
        cluster_id: &str,
        name: &str,
        cancel: &CancellationToken,
        on_progress: Option<ProgressCallback>,
    ) -> Result<bool> {
        let pool = match self.get_node_pool_by_name(cluster_id, name).await {
            Ok(pool) => pool,
            Err(CoreError::EntityNotFound { .. }) => {
                debug!("No node pool named {} in cluster {}", name, cluster_id);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        info!("Deleting node pool {} ({})", pool.name, pool.id);
        self.delete_node_pool_and_wait(&pool.id, cancel, on_progress)
            .await?;
        Ok(true)
    }

    pub async fn get_node_pool(&self, node_pool_id: &str) -> Result<NodePool> {
        Ok(self.api.get_node_pool(node_pool_id).await?)
    }

    /// First node pool in a cluster with the given name
    pub async fn get_node_pool_by_name(
        &self,
        cluster_id: &str,
        name: &str,
    ) -> Result<NodePoolSummary> {
        let filter = NodePoolFilter::new(&self.compartment_id)
            .cluster_id(cluster_id)
            .name(name);

        let mut pools = paginate::list_node_pools(&self.api, filter, self.page_size);
        match pools.next().await {
            Some(result) => result,
            None => Err(CoreError::EntityNotFound {
                kind: "Node Pool".to_string(),
                id: name.to_string(),
            }),
        }
    }

    /// Stream every node pool in a cluster, fetching pages lazily
    pub fn list_node_pools(&self, cluster_id: &str) -> BoxStream<'_, Result<NodePoolSummary>> {
        let filter = NodePoolFilter::new(&self.compartment_id).cluster_id(cluster_id);
        paginate::list_node_pools(&self.api, filter, self.page_size)
    }

    /// Collect every node pool in a cluster
    pub async fn all_node_pools(&self, cluster_id: &str) -> Result<Vec<NodePoolSummary>> {
        self.list_node_pools(cluster_id).try_collect().await
    }

    /// Whether every node the pool should run is `ACTIVE`
    ///
    /// A pool that can't be fetched counts as not active.
    pub async fn is_node_pool_active(&self, node_pool_id: &str) -> bool {
        let pool = match self.api.get_node_pool(node_pool_id).await {
            Ok(pool) => pool,
            Err(e) => {
                warn!("Could not fetch node pool {}: {}", node_pool_id, e);
                return false;
            }
        };

        let Some(expected) = pool.expected_node_count() else {
            warn!(
                "Node pool {} reports no size, treating it as not ready",
                pool.name
            );
            return false;
        };
        let ready = is_ready(expected, &pool.nodes);
        if ready {
            info!("All {} nodes are ACTIVE in node pool {}", expected, pool.name);
        } else {
            debug!(
                "Node pool {} not ready ({} nodes reported, {} expected)",
                pool.name,
                pool.nodes.len(),
                expected
            );
        }
        ready
    }

    /// Images, versions and shapes available for a cluster
    pub async fn node_pool_options(&self, cluster_id: &str) -> Result<NodePoolOptions> {
        Ok(self.api.get_node_pool_options(cluster_id).await?)
    }

    /// Options valid for any cluster
    pub async fn default_node_pool_options(&self) -> Result<NodePoolOptions> {
        self.node_pool_options(ALL_NODE_POOL_OPTIONS).await
    }
}
