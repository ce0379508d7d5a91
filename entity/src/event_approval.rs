use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audit trail: one row per workflow transition, append-only. Rows are
/// never updated or deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "event_approval")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub event_id: Uuid,
    /// Stage acted upon: the event's status before the transition.
    pub stage: super::event::Status,
    pub role_at_decision: super::user_role::Role,
    pub decision: Decision,
    pub actor_id: Uuid,
    pub comment: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_delete = "Cascade"
    )]
    Event,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

#[derive(
    Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    #[sea_orm(string_value = "SUBMITTED")]
    Submitted,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl From<workflow::AuditAction> for Decision {
    fn from(value: workflow::AuditAction) -> Self {
        match value {
            workflow::AuditAction::Submitted => Decision::Submitted,
            workflow::AuditAction::Approved => Decision::Approved,
            workflow::AuditAction::Rejected => Decision::Rejected,
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
