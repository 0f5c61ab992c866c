//! Container Engine API surface
//!
//! [`ContainerEngineApi`] is the only remote collaborator the rest of the
//! crate talks to. [`ContainerEngineClient`] implements it over HTTPS; tests
//! implement it with scripted fakes.

pub mod client;
pub mod error;
pub mod models;

pub use client::{ContainerEngineClient, ContainerEngineClientBuilder};
pub use error::ApiError;
pub use models::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Operations the node pool workflows need from the remote service.
///
/// Mutating calls return immediately with a [`WorkRequestId`]; the change
/// is only done once that work request reaches a terminal status. Every
/// read is idempotent and side-effect free.
#[async_trait]
pub trait ContainerEngineApi: Send + Sync {
    async fn create_node_pool(
        &self,
        details: &CreateNodePoolDetails,
    ) -> Result<WorkRequestId, ApiError>;

    async fn update_node_pool(
        &self,
        node_pool_id: &str,
        details: &UpdateNodePoolDetails,
    ) -> Result<WorkRequestId, ApiError>;

    async fn delete_node_pool(&self, node_pool_id: &str) -> Result<WorkRequestId, ApiError>;

    async fn get_node_pool(&self, node_pool_id: &str) -> Result<NodePool, ApiError>;

    /// Fetch one page of node pools. `cursor` is the `next_cursor` of the
    /// previous page, or `None` for the first page.
    async fn list_node_pools(
        &self,
        filter: &NodePoolFilter,
        cursor: Option<&str>,
    ) -> Result<Page<NodePoolSummary>, ApiError>;

    async fn get_work_request(&self, id: &WorkRequestId) -> Result<WorkRequest, ApiError>;

    async fn list_work_request_errors(
        &self,
        id: &WorkRequestId,
    ) -> Result<Vec<WorkRequestError>, ApiError>;

    /// Options for a cluster, or the service-wide defaults for `"all"`
    async fn get_node_pool_options(&self, option_id: &str) -> Result<NodePoolOptions, ApiError>;
}

#[async_trait]
impl<T: ContainerEngineApi + ?Sized> ContainerEngineApi for Arc<T> {
    async fn create_node_pool(
        &self,
        details: &CreateNodePoolDetails,
    ) -> Result<WorkRequestId, ApiError> {
        (**self).create_node_pool(details).await
    }

    async fn update_node_pool(
        &self,
        node_pool_id: &str,
        details: &UpdateNodePoolDetails,
    ) -> Result<WorkRequestId, ApiError> {
        (**self).update_node_pool(node_pool_id, details).await
    }

    async fn delete_node_pool(&self, node_pool_id: &str) -> Result<WorkRequestId, ApiError> {
        (**self).delete_node_pool(node_pool_id).await
    }

    async fn get_node_pool(&self, node_pool_id: &str) -> Result<NodePool, ApiError> {
        (**self).get_node_pool(node_pool_id).await
    }

    async fn list_node_pools(
        &self,
        filter: &NodePoolFilter,
        cursor: Option<&str>,
    ) -> Result<Page<NodePoolSummary>, ApiError> {
        (**self).list_node_pools(filter, cursor).await
    }

    async fn get_work_request(&self, id: &WorkRequestId) -> Result<WorkRequest, ApiError> {
        (**self).get_work_request(id).await
    }

    async fn list_work_request_errors(
        &self,
        id: &WorkRequestId,
    ) -> Result<Vec<WorkRequestError>, ApiError> {
        (**self).list_work_request_errors(id).await
    }

    async fn get_node_pool_options(&self, option_id: &str) -> Result<NodePoolOptions, ApiError> {
        (**self).get_node_pool_options(option_id).await
    }
}
