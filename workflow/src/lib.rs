//! Approval-workflow core for the campus events suite.
//!
//! Three pieces, all pure: the role resolver ([`Role::effective`]), the
//! static stage table ([`stage`]), and the decision engine ([`submit`] /
//! [`decide`]). Persistence, notification delivery, and department
//! scoping live with the callers.

pub mod engine;
pub mod role;
pub mod stage;
pub mod state;

pub use engine::{
    decide, submit, AuditAction, AuditEntry, Decision, Effect, EventSnapshot, Transition,
    WorkflowError,
};
pub use role::{Role, ALL_ROLES};
pub use stage::{actionable_states, eligible_roles, is_eligible, next_on_approve};
pub use state::{initial_pending_state, ApproverTrack, WorkflowState, ALL_STATES};
