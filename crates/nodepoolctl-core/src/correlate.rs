//! Resource correlation for completed work requests
//!
//! A finished work request lists the resources it touched. Callers that
//! created or updated something pick their resource id out of that list by
//! action and entity type.

use crate::api::{ActionType, WorkRequest, WorkRequestResource};
use crate::error::{CoreError, Result};

/// Entity type the service reports for node pools
pub const NODE_POOL_ENTITY: &str = "NODEPOOL";

/// Find the first resource matching `action` and `entity_type`
///
/// Entity types are compared ASCII case-insensitively. When several
/// resources match, the first in the order the service listed them wins.
pub fn find_resource<'a>(
    work_request: &'a WorkRequest,
    action: &ActionType,
    entity_type: &str,
) -> Option<&'a WorkRequestResource> {
    work_request
        .resources
        .iter()
        .find(|r| &r.action_type == action && r.entity_type.eq_ignore_ascii_case(entity_type))
}

/// Extract the id of the resource affected by `action` on `entity_type`
///
/// Absence is reported as [`CoreError::ResourceNotCorrelated`], which callers
/// that only want an id opportunistically can test with
/// [`CoreError::is_not_correlated`].
pub fn extract_resource_id(
    work_request: &WorkRequest,
    action: &ActionType,
    entity_type: &str,
) -> Result<String> {
    find_resource(work_request, action, entity_type)
        .map(|r| r.identifier.clone())
        .ok_or_else(|| CoreError::ResourceNotCorrelated {
            action: action.clone(),
            entity_type: entity_type.to_string(),
        })
}
