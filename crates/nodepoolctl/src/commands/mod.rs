//! Command implementations

pub mod kubeconfig;
pub mod node_pool;
pub mod profile;
pub mod work_request;
