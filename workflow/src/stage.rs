//! Static approval-stage table.
//!
//! Exhaustive matches, no default branch: any (state, role) pair absent
//! from the table is ineligible. The table never grants approval by
//! omission.

use crate::role::Role;
use crate::state::WorkflowState;

/// Roles permitted to act (approve or reject) while an event sits in the
/// given state. Empty for draft and terminal states.
pub fn eligible_roles(state: WorkflowState) -> &'static [Role] {
    match state {
        WorkflowState::PendingApproval => {
            &[Role::Staff, Role::EventCoordinator, Role::DepartmentHead]
        }
        WorkflowState::PendingStudentAffairs => &[Role::DeanStudentAffairs],
        WorkflowState::PendingVc => &[Role::SenateMember],
        WorkflowState::Draft
        | WorkflowState::Approved
        | WorkflowState::Rejected
        | WorkflowState::Cancelled
        | WorkflowState::Completed => &[],
    }
}

pub fn is_eligible(state: WorkflowState, role: Role) -> bool {
    eligible_roles(state).contains(&role)
}

/// Inverse of [`eligible_roles`]: the states a role may act on. Drives
/// `listActionable` queries.
pub fn actionable_states(role: Role) -> &'static [WorkflowState] {
    match role {
        Role::Staff | Role::EventCoordinator | Role::DepartmentHead => {
            &[WorkflowState::PendingApproval]
        }
        Role::DeanStudentAffairs => &[WorkflowState::PendingStudentAffairs],
        Role::SenateMember => &[WorkflowState::PendingVc],
        Role::Outsider | Role::Student | Role::Dean | Role::SuperAdmin => &[],
    }
}

/// Next state along the approval chain, defined only for pending states.
pub fn next_on_approve(state: WorkflowState) -> Option<WorkflowState> {
    match state {
        WorkflowState::PendingApproval => Some(WorkflowState::PendingStudentAffairs),
        WorkflowState::PendingStudentAffairs => Some(WorkflowState::PendingVc),
        WorkflowState::PendingVc => Some(WorkflowState::Approved),
        WorkflowState::Draft
        | WorkflowState::Approved
        | WorkflowState::Rejected
        | WorkflowState::Cancelled
        | WorkflowState::Completed => None,
    }
}
