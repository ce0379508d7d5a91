use serde::{Deserialize, Serialize};

/// Workflow status of an event, closed set.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
    Draft,
    PendingApproval,
    PendingStudentAffairs,
    PendingVc,
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

pub const ALL_STATES: [WorkflowState; 8] = [
    WorkflowState::Draft,
    WorkflowState::PendingApproval,
    WorkflowState::PendingStudentAffairs,
    WorkflowState::PendingVc,
    WorkflowState::Approved,
    WorkflowState::Rejected,
    WorkflowState::Cancelled,
    WorkflowState::Completed,
];

impl WorkflowState {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowState::Draft => "DRAFT",
            WorkflowState::PendingApproval => "PENDING_APPROVAL",
            WorkflowState::PendingStudentAffairs => "PENDING_STUDENT_AFFAIRS",
            WorkflowState::PendingVc => "PENDING_VC",
            WorkflowState::Approved => "APPROVED",
            WorkflowState::Rejected => "REJECTED",
            WorkflowState::Cancelled => "CANCELLED",
            WorkflowState::Completed => "COMPLETED",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "DRAFT" => Some(WorkflowState::Draft),
            "PENDING_APPROVAL" => Some(WorkflowState::PendingApproval),
            "PENDING_STUDENT_AFFAIRS" => Some(WorkflowState::PendingStudentAffairs),
            "PENDING_VC" => Some(WorkflowState::PendingVc),
            "APPROVED" => Some(WorkflowState::Approved),
            "REJECTED" => Some(WorkflowState::Rejected),
            "CANCELLED" => Some(WorkflowState::Cancelled),
            "COMPLETED" => Some(WorkflowState::Completed),
            _ => None,
        }
    }

    /// States the engine refuses to act on. `Cancelled` and `Completed`
    /// are reached by external lifecycle events, never by the engine.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            WorkflowState::Approved
                | WorkflowState::Rejected
                | WorkflowState::Cancelled
                | WorkflowState::Completed
        )
    }

    pub fn is_pending(self) -> bool {
        matches!(
            self,
            WorkflowState::PendingApproval
                | WorkflowState::PendingStudentAffairs
                | WorkflowState::PendingVc
        )
    }

    /// Human label for the review stage, used in notification text.
    pub fn stage_label(self) -> &'static str {
        match self {
            WorkflowState::PendingApproval => "department review",
            WorkflowState::PendingStudentAffairs => "student affairs review",
            WorkflowState::PendingVc => "senate review",
            other => other.as_str(),
        }
    }
}

/// First-tier approval track, fixed on the event at creation time.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApproverTrack {
    Staff,
    DepartmentHead,
    StudentAffairs,
    SenateMember,
}

impl ApproverTrack {
    pub fn as_str(self) -> &'static str {
        match self {
            ApproverTrack::Staff => "STAFF",
            ApproverTrack::DepartmentHead => "DEPARTMENT_HEAD",
            ApproverTrack::StudentAffairs => "STUDENT_AFFAIRS",
            ApproverTrack::SenateMember => "SENATE_MEMBER",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "STAFF" => Some(ApproverTrack::Staff),
            "DEPARTMENT_HEAD" => Some(ApproverTrack::DepartmentHead),
            "STUDENT_AFFAIRS" => Some(ApproverTrack::StudentAffairs),
            "SENATE_MEMBER" => Some(ApproverTrack::SenateMember),
            _ => None,
        }
    }
}

/// Skip logic: which pending stage a draft enters on submission. Used only
/// at submission time, never at later transitions.
pub fn initial_pending_state(track: ApproverTrack) -> WorkflowState {
    match track {
        ApproverTrack::Staff | ApproverTrack::DepartmentHead => WorkflowState::PendingApproval,
        ApproverTrack::StudentAffairs => WorkflowState::PendingStudentAffairs,
        ApproverTrack::SenateMember => WorkflowState::PendingVc,
    }
}
