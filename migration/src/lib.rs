pub use sea_orm_migration::prelude::*;

mod m20260110_000001_users_rbac;
mod m20260110_000002_events;
mod m20260110_000003_notifications;

pub struct Migrator;
#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260110_000001_users_rbac::Migration),
            Box::new(m20260110_000002_events::Migration),
            Box::new(m20260110_000003_notifications::Migration),
        ]
    }
}
