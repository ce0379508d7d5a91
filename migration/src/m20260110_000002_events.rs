use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
#[sea_orm(iden = "app_user")]
enum AppUser {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Event {
    Table,
    Id,
    Title,
    DescriptionMd,
    Venue,
    StartsAt,
    EndsAt,
    Status,
    OrganizerId,
    ApproverTrack,
    ApprovalNotes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EventApproval {
    Table,
    Id,
    EventId,
    Stage,
    RoleAtDecision,
    Decision,
    ActorId,
    Comment,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Event::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Event::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(Event::Title).string().not_null())
                    .col(ColumnDef::new(Event::DescriptionMd).text())
                    .col(ColumnDef::new(Event::Venue).string())
                    .col(
                        ColumnDef::new(Event::StartsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Event::EndsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Event::Status)
                            .string_len(32)
                            .not_null()
                            .default("DRAFT"),
                    )
                    .col(ColumnDef::new(Event::OrganizerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Event::ApproverTrack)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Event::ApprovalNotes).text())
                    .col(
                        ColumnDef::new(Event::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Event::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_organizer")
                            .from(Event::Table, Event::OrganizerId)
                            .to(AppUser::Table, AppUser::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_event_status")
                    .table(Event::Table)
                    .col(Event::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_event_organizer")
                    .table(Event::Table)
                    .col(Event::OrganizerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EventApproval::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventApproval::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(EventApproval::EventId).uuid().not_null())
                    .col(
                        ColumnDef::new(EventApproval::Stage)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventApproval::RoleAtDecision)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventApproval::Decision)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(EventApproval::ActorId).uuid().not_null())
                    .col(ColumnDef::new(EventApproval::Comment).text())
                    .col(
                        ColumnDef::new(EventApproval::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_approval_event")
                            .from(EventApproval::Table, EventApproval::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_event_approval_event")
                    .table(EventApproval::Table)
                    .col(EventApproval::EventId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventApproval::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Event::Table).to_owned())
            .await
    }
}
