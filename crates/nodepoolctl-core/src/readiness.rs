//! Readiness of a node pool from its members' lifecycle states
//!
//! A pool is ready when exactly the expected number of members are
//! `ACTIVE` and none of the remaining members are still moving. Members
//! already `DELETED` are ignored: they count neither for nor against.

use crate::api::{Node, NodeLifecycleState};
use tracing::debug;

/// Lifecycle state of one member, as needed for readiness
pub trait MemberState {
    fn member_id(&self) -> &str;
    fn lifecycle_state(&self) -> &NodeLifecycleState;
    fn lifecycle_detail(&self) -> Option<&str>;
}

impl MemberState for Node {
    fn member_id(&self) -> &str {
        &self.id
    }

    fn lifecycle_state(&self) -> &NodeLifecycleState {
        &self.lifecycle_state
    }

    fn lifecycle_detail(&self) -> Option<&str> {
        self.lifecycle_details.as_deref()
    }
}

/// All-or-nothing readiness verdict
///
/// Members are scanned in the order given. Scanning stops at the first
/// member that is neither `ACTIVE` nor `DELETED`, and the verdict is then
/// `false` whatever follows, so the result doesn't depend on how the
/// service orders its members. Otherwise the pool is ready iff the number
/// of `ACTIVE` members equals `expected` exactly; more than expected (a
/// scale-down still settling) is not ready.
pub fn is_ready<'a, M, I>(expected: usize, members: I) -> bool
where
    M: MemberState + 'a,
    I: IntoIterator<Item = &'a M>,
{
    let mut active = 0usize;

    for member in members {
        match member.lifecycle_state() {
            NodeLifecycleState::Deleted => continue,
            NodeLifecycleState::Active => active += 1,
            other => {
                debug!(
                    member = member.member_id(),
                    state = %other,
                    detail = member.lifecycle_detail().unwrap_or(""),
                    "Member not ready"
                );
                return false;
            }
        }
    }

    active == expected
}
