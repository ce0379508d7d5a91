use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only role-assignment log. A user may hold several rows; the
/// effective role is resolved from the full set, never stored.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "user_role")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_id: Uuid,
    #[sea_orm(primary_key)]
    pub role: Role,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::app_user::Entity",
        from = "Column::UserId",
        to = "super::app_user::Column::Id",
        on_delete = "Cascade"
    )]
    AppUser,
}

impl Related<super::app_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AppUser.def()
    }
}

#[derive(
    Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[sea_orm(string_value = "OUTSIDER")]
    Outsider,
    #[sea_orm(string_value = "STUDENT")]
    Student,
    #[sea_orm(string_value = "STAFF")]
    Staff,
    #[sea_orm(string_value = "EVENT_COORDINATOR")]
    EventCoordinator,
    #[sea_orm(string_value = "DEPARTMENT_HEAD")]
    DepartmentHead,
    #[sea_orm(string_value = "DEAN_STUDENT_AFFAIRS")]
    DeanStudentAffairs,
    #[sea_orm(string_value = "DEAN")]
    Dean,
    #[sea_orm(string_value = "SENATE_MEMBER")]
    SenateMember,
    #[sea_orm(string_value = "SUPER_ADMIN")]
    SuperAdmin,
}

impl From<Role> for workflow::Role {
    fn from(value: Role) -> Self {
        match value {
            Role::Outsider => workflow::Role::Outsider,
            Role::Student => workflow::Role::Student,
            Role::Staff => workflow::Role::Staff,
            Role::EventCoordinator => workflow::Role::EventCoordinator,
            Role::DepartmentHead => workflow::Role::DepartmentHead,
            Role::DeanStudentAffairs => workflow::Role::DeanStudentAffairs,
            Role::Dean => workflow::Role::Dean,
            Role::SenateMember => workflow::Role::SenateMember,
            Role::SuperAdmin => workflow::Role::SuperAdmin,
        }
    }
}

impl From<workflow::Role> for Role {
    fn from(value: workflow::Role) -> Self {
        match value {
            workflow::Role::Outsider => Role::Outsider,
            workflow::Role::Student => Role::Student,
            workflow::Role::Staff => Role::Staff,
            workflow::Role::EventCoordinator => Role::EventCoordinator,
            workflow::Role::DepartmentHead => Role::DepartmentHead,
            workflow::Role::DeanStudentAffairs => Role::DeanStudentAffairs,
            workflow::Role::Dean => Role::Dean,
            workflow::Role::SenateMember => Role::SenateMember,
            workflow::Role::SuperAdmin => Role::SuperAdmin,
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
