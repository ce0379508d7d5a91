//! Decision engine.
//!
//! `submit` and `decide` are pure, synchronous functions of the event
//! snapshot and the static tables: no I/O, no clock, no ambient session
//! state. The acting role is always an explicit parameter. Side effects
//! come back as descriptors in [`Transition::effects`] for the caller to
//! execute transactionally (status + audit) or best-effort (notify).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::role::Role;
use crate::stage::{is_eligible, next_on_approve};
use crate::state::{initial_pending_state, ApproverTrack, WorkflowState};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Approve => "APPROVE",
            Decision::Reject => "REJECT",
        }
    }
}

/// What happened, for the audit trail. Submission is recorded alongside
/// approval decisions so the history starts at the hand-off.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Submitted,
    Approved,
    Rejected,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Submitted => "SUBMITTED",
            AuditAction::Approved => "APPROVED",
            AuditAction::Rejected => "REJECTED",
        }
    }
}

/// The slice of an event the engine needs to rule on a transition.
#[derive(Clone, Debug, PartialEq)]
pub struct EventSnapshot {
    pub id: Uuid,
    pub title: String,
    pub status: WorkflowState,
    pub approver_track: ApproverTrack,
    pub organizer_id: Uuid,
}

/// One audit-trail row: the stage acted upon (pre-transition state), the
/// actor's role, and the decision.
#[derive(Clone, Debug, PartialEq)]
pub struct AuditEntry {
    pub stage: WorkflowState,
    pub role: Role,
    pub action: AuditAction,
    pub comment: Option<String>,
}

/// Side-effect descriptor. The engine never dispatches anything itself.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Notify { user_id: Uuid, message: String },
}

/// Outcome of a valid transition.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub new_status: WorkflowState,
    pub audit: AuditEntry,
    pub effects: Vec<Effect>,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum WorkflowError {
    #[error("role {} may not act on an event in state {}", role.as_str(), state.as_str())]
    Unauthorized { state: WorkflowState, role: Role },
    #[error("no workflow transition is possible from state {}", state.as_str())]
    InvalidTransition { state: WorkflowState },
}

/// Moves a draft into its first pending stage per the skip logic.
///
/// The caller is responsible for checking that the actor IS the
/// organizer; `actor` is the organizer's resolved role, recorded on the
/// audit row.
pub fn submit(event: &EventSnapshot, actor: Role) -> Result<Transition, WorkflowError> {
    if event.status != WorkflowState::Draft {
        return Err(WorkflowError::InvalidTransition {
            state: event.status,
        });
    }
    let new_status = initial_pending_state(event.approver_track);
    let message = format!(
        "Your event \"{}\" was submitted and is awaiting {}.",
        event.title,
        new_status.stage_label()
    );
    Ok(Transition {
        new_status,
        audit: AuditEntry {
            stage: WorkflowState::Draft,
            role: actor,
            action: AuditAction::Submitted,
            comment: None,
        },
        effects: vec![Effect::Notify {
            user_id: event.organizer_id,
            message,
        }],
    })
}

/// Rules on an approve/reject action against the event's current state.
///
/// Department scoping is NOT evaluated here: a department head's
/// same-department predicate belongs to the caller. The engine validates
/// role eligibility only, and never silently no-ops.
pub fn decide(
    event: &EventSnapshot,
    actor: Role,
    decision: Decision,
    comment: Option<&str>,
) -> Result<Transition, WorkflowError> {
    if !event.status.is_pending() {
        return Err(WorkflowError::InvalidTransition {
            state: event.status,
        });
    }
    if !is_eligible(event.status, actor) {
        return Err(WorkflowError::Unauthorized {
            state: event.status,
            role: actor,
        });
    }

    let (new_status, action) = match decision {
        Decision::Approve => {
            // is_pending above guarantees a next state exists.
            let next = next_on_approve(event.status).ok_or(WorkflowError::InvalidTransition {
                state: event.status,
            })?;
            (next, AuditAction::Approved)
        }
        Decision::Reject => (WorkflowState::Rejected, AuditAction::Rejected),
    };

    let message = outcome_message(&event.title, event.status, new_status, comment);
    Ok(Transition {
        new_status,
        audit: AuditEntry {
            stage: event.status,
            role: actor,
            action,
            comment: comment.map(str::to_owned),
        },
        effects: vec![Effect::Notify {
            user_id: event.organizer_id,
            message,
        }],
    })
}

fn outcome_message(
    title: &str,
    stage: WorkflowState,
    new_status: WorkflowState,
    comment: Option<&str>,
) -> String {
    match new_status {
        WorkflowState::Approved => {
            format!("Your event \"{}\" has been fully approved.", title)
        }
        WorkflowState::Rejected => match comment {
            Some(text) => format!(
                "Your event \"{}\" was rejected at {}: {}",
                title,
                stage.stage_label(),
                text
            ),
            None => format!(
                "Your event \"{}\" was rejected at {}.",
                title,
                stage.stage_label()
            ),
        },
        next => format!(
            "Your event \"{}\" cleared {} and is awaiting {}.",
            title,
            stage.stage_label(),
            next.stage_label()
        ),
    }
}
