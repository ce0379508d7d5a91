use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description_md: Option<String>,
    pub venue: Option<String>,
    pub starts_at: DateTimeWithTimeZone,
    pub ends_at: DateTimeWithTimeZone,
    pub status: Status,
    #[sea_orm(indexed)]
    pub organizer_id: Uuid,
    pub approver_track: Track,
    pub approval_notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::app_user::Entity",
        from = "Column::OrganizerId",
        to = "super::app_user::Column::Id"
    )]
    Organizer,
}

impl Related<super::app_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizer.def()
    }
}

#[derive(
    Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "PENDING_APPROVAL")]
    PendingApproval,
    #[sea_orm(string_value = "PENDING_STUDENT_AFFAIRS")]
    PendingStudentAffairs,
    #[sea_orm(string_value = "PENDING_VC")]
    PendingVc,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

/// First-tier approval track, set at creation and read-only afterward.
#[derive(
    Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Track {
    #[sea_orm(string_value = "STAFF")]
    Staff,
    #[sea_orm(string_value = "DEPARTMENT_HEAD")]
    DepartmentHead,
    #[sea_orm(string_value = "STUDENT_AFFAIRS")]
    StudentAffairs,
    #[sea_orm(string_value = "SENATE_MEMBER")]
    SenateMember,
}

impl From<Status> for workflow::WorkflowState {
    fn from(value: Status) -> Self {
        match value {
            Status::Draft => workflow::WorkflowState::Draft,
            Status::PendingApproval => workflow::WorkflowState::PendingApproval,
            Status::PendingStudentAffairs => workflow::WorkflowState::PendingStudentAffairs,
            Status::PendingVc => workflow::WorkflowState::PendingVc,
            Status::Approved => workflow::WorkflowState::Approved,
            Status::Rejected => workflow::WorkflowState::Rejected,
            Status::Cancelled => workflow::WorkflowState::Cancelled,
            Status::Completed => workflow::WorkflowState::Completed,
        }
    }
}

impl From<workflow::WorkflowState> for Status {
    fn from(value: workflow::WorkflowState) -> Self {
        match value {
            workflow::WorkflowState::Draft => Status::Draft,
            workflow::WorkflowState::PendingApproval => Status::PendingApproval,
            workflow::WorkflowState::PendingStudentAffairs => Status::PendingStudentAffairs,
            workflow::WorkflowState::PendingVc => Status::PendingVc,
            workflow::WorkflowState::Approved => Status::Approved,
            workflow::WorkflowState::Rejected => Status::Rejected,
            workflow::WorkflowState::Cancelled => Status::Cancelled,
            workflow::WorkflowState::Completed => Status::Completed,
        }
    }
}

impl From<Track> for workflow::ApproverTrack {
    fn from(value: Track) -> Self {
        match value {
            Track::Staff => workflow::ApproverTrack::Staff,
            Track::DepartmentHead => workflow::ApproverTrack::DepartmentHead,
            Track::StudentAffairs => workflow::ApproverTrack::StudentAffairs,
            Track::SenateMember => workflow::ApproverTrack::SenateMember,
        }
    }
}

impl From<workflow::ApproverTrack> for Track {
    fn from(value: workflow::ApproverTrack) -> Self {
        match value {
            workflow::ApproverTrack::Staff => Track::Staff,
            workflow::ApproverTrack::DepartmentHead => Track::DepartmentHead,
            workflow::ApproverTrack::StudentAffairs => Track::StudentAffairs,
            workflow::ApproverTrack::SenateMember => Track::SenateMember,
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
