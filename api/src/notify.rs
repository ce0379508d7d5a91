//! Notification dispatcher.
//!
//! Executes the effect descriptors a transition emits. Delivery is
//! best-effort: a failed insert is retried once and then dropped with a
//! warning. A notification failure never rolls back a committed status
//! change and never surfaces to the actor as a failed transition.

use chrono::Utc;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set};
use tracing::warn;
use uuid::Uuid;

use entity::notification;
use workflow::Effect;

pub async fn dispatch_effects(db: &DatabaseConnection, effects: &[Effect]) {
    for effect in effects {
        match effect {
            Effect::Notify { user_id, message } => {
                if let Err(first) = insert_notification(db, *user_id, message).await {
                    warn!(user = %user_id, error = %first, "notification insert failed, retrying");
                    if let Err(second) = insert_notification(db, *user_id, message).await {
                        warn!(user = %user_id, error = %second, "notification dropped after retry");
                    }
                }
            }
        }
    }
}

async fn insert_notification(
    db: &DatabaseConnection,
    user_id: Uuid,
    message: &str,
) -> Result<(), DbErr> {
    let row = notification::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        message: Set(message.to_owned()),
        is_read: Set(false),
        created_at: Set(Utc::now().into()),
    };
    notification::Entity::insert(row)
        .exec_without_returning(db)
        .await
        .map(|_| ())
}
