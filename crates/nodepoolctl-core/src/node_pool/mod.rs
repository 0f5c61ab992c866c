//! Node pool workflows and helpers
//!
//! [`NodePoolEngine`] composes single API calls with work request polling,
//! resource correlation and readiness checks. For single calls, use the
//! [`ContainerEngineApi`](crate::api::ContainerEngineApi) directly.

pub mod engine;
pub mod params;

pub use engine::*;
pub use params::*;
