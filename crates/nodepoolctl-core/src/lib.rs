//! # nodepoolctl-core
//!
//! Library behind the `nodepoolctl` CLI. Tracks asynchronous Container
//! Engine operations and builds node pool workflows on top of them.
//!
//! Mutating calls return a work request id. The pieces here turn that into
//! a finished result:
//!
//! - [`poll_work_request`] waits for a work request to reach a terminal
//!   status, with a timeout and cancellation
//! - [`extract_resource_id`] picks the affected resource out of a finished
//!   work request
//! - [`paginate`] drains cursor-paginated list endpoints lazily
//! - [`is_ready`] decides whether a pool's members have settled
//!
//! [`NodePoolEngine`] composes them into create/update/delete-and-wait
//! workflows. Everything goes through the [`ContainerEngineApi`] trait, so
//! the HTTP [`ContainerEngineClient`] can be swapped for a fake in tests.
//!
//! ## Crate Structure
//!
//! ```text
//! nodepoolctl-core/
//! ├── src/
//! │   ├── lib.rs
//! │   ├── api/          # trait, wire types, HTTP client
//! │   ├── config/       # profiles, credentials, polling settings
//! │   ├── node_pool/    # NodePoolEngine workflows and params
//! │   ├── correlate.rs  # resource correlation
//! │   ├── error.rs      # CoreError
//! │   ├── kubeconfig.rs # cluster client configuration
//! │   ├── paginate.rs   # lazy pagination
//! │   ├── progress.rs   # work request polling
//! │   └── readiness.rs  # readiness decision
//! ```

pub mod api;
pub mod config;
pub mod correlate;
pub mod error;
pub mod kubeconfig;
pub mod node_pool;
pub mod paginate;
pub mod progress;
pub mod readiness;

#[cfg(test)]
mod testing;

// Re-export core types
pub use api::{
    ActionType, ApiError, ContainerEngineApi, ContainerEngineClient, ContainerEngineClientBuilder,
    NodePool, NodePoolFilter, NodePoolSummary, Page, WorkRequest, WorkRequestId,
    WorkRequestStatus,
};
pub use config::{Config, ConfigError, PollingConfig, Profile};
pub use correlate::{NODE_POOL_ENTITY, extract_resource_id, find_resource};
pub use error::{CoreError, Result};
pub use kubeconfig::{ClusterAuth, ClusterClientConfig};
pub use node_pool::NodePoolEngine;
pub use paginate::{DEFAULT_PAGE_SIZE, paginate};
pub use progress::{ProgressCallback, ProgressEvent, WaitOptions, poll_work_request};
pub use readiness::{MemberState, is_ready};
