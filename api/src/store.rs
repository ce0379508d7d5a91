//! Event store adapter: the persistence boundary between the pure
//! workflow engine and sea-orm.
//!
//! Transitions are applied with optimistic concurrency: the status update
//! is a compare-and-swap on the status the decision was computed against,
//! so two simultaneous decisions on one event cannot both land. The loser
//! observes [`StoreError::Conflict`] and must re-fetch. Contention is
//! per-event; there are no global locks.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use thiserror::Error;
use uuid::Uuid;

use entity::{app_user, event, event_approval};
use workflow::{EventSnapshot, Role, Transition};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("event not found")]
    NotFound,
    #[error("event status changed concurrently")]
    Conflict,
    #[error(transparent)]
    Db(#[from] DbErr),
}

pub async fn load_event(db: &DatabaseConnection, id: Uuid) -> Result<event::Model, StoreError> {
    event::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound)
}

/// The engine-facing view of an event row.
pub fn snapshot(model: &event::Model) -> EventSnapshot {
    EventSnapshot {
        id: model.id,
        title: model.title.clone(),
        status: model.status.into(),
        approver_track: model.approver_track.into(),
        organizer_id: model.organizer_id,
    }
}

/// Persists a computed transition: CAS status update plus one append-only
/// audit row, in a single transaction. `before` must be the row the
/// transition was computed from; if its status has moved in the meantime
/// the update matches zero rows and the whole transaction rolls back.
pub async fn apply_transition(
    db: &DatabaseConnection,
    before: &event::Model,
    transition: &Transition,
    actor_id: Uuid,
) -> Result<event::Model, StoreError> {
    let txn = db.begin().await?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let new_status: event::Status = transition.new_status.into();

    let updated = event::Entity::update_many()
        .col_expr(event::Column::Status, Expr::value(new_status))
        .col_expr(
            event::Column::ApprovalNotes,
            Expr::value(transition.audit.comment.clone()),
        )
        .col_expr(event::Column::UpdatedAt, Expr::value(now))
        .filter(event::Column::Id.eq(before.id))
        .filter(event::Column::Status.eq(before.status))
        .exec(&txn)
        .await?;
    if updated.rows_affected == 0 {
        return Err(StoreError::Conflict);
    }

    let audit = event_approval::ActiveModel {
        id: Set(Uuid::new_v4()),
        event_id: Set(before.id),
        stage: Set(transition.audit.stage.into()),
        role_at_decision: Set(transition.audit.role.into()),
        decision: Set(transition.audit.action.into()),
        actor_id: Set(actor_id),
        comment: Set(transition.audit.comment.clone()),
        created_at: Set(now),
    };
    event_approval::Entity::insert(audit)
        .exec_without_returning(&txn)
        .await?;

    txn.commit().await?;
    load_event(db, before.id).await
}

/// `listActionable`: events whose status has `role` in its eligible set.
///
/// For department heads the caller supplies the scoping context: only
/// events organized within `department` are in scope, and with no
/// department there is nothing to act on. The scoping predicate lives
/// here, outside the engine's role-eligibility check.
pub async fn actionable_events(
    db: &DatabaseConnection,
    role: Role,
    department: Option<&str>,
    limit: u64,
    offset: u64,
) -> Result<Vec<event::Model>, StoreError> {
    let states = workflow::actionable_states(role);
    if states.is_empty() {
        return Ok(vec![]);
    }
    let statuses: Vec<event::Status> = states.iter().copied().map(event::Status::from).collect();
    let mut query = event::Entity::find().filter(event::Column::Status.is_in(statuses));
    if role == Role::DepartmentHead {
        let Some(dept) = department else {
            return Ok(vec![]);
        };
        query = query
            .inner_join(app_user::Entity)
            .filter(app_user::Column::Department.eq(dept));
    }
    let rows = query
        .order_by_asc(event::Column::StartsAt)
        .limit(limit)
        .offset(offset)
        .all(db)
        .await?;
    Ok(rows)
}
