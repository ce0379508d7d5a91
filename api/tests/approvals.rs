use std::sync::Arc;

use api::auth::CurrentUser;
use api::schema::{build_schema, AppSchema};
use api::store;
use async_graphql::{Request, Variables};
use chrono::Utc;
use entity::{event, event_approval, notification};
use sea_orm::{
    ColumnTrait, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Statement, Value,
};
use serde_json::json;
use uuid::Uuid;
use workflow::Role;

type EventsSchema = async_graphql::Schema<
    api::schema::QueryRoot,
    api::schema::MutationRoot,
    async_graphql::EmptySubscription,
>;

struct TestContext {
    db: Arc<DatabaseConnection>,
    schema: EventsSchema,
    organizer: Uuid,
}

async fn setup() -> TestContext {
    let conn = Database::connect("sqlite::memory:").await.unwrap();
    let db = Arc::new(conn);
    bootstrap_sqlite(db.as_ref()).await;
    let organizer = insert_user(db.as_ref(), "organizer@campus.test", Some("ENG")).await;
    let AppSchema(schema) = build_schema(db.clone());
    TestContext {
        db,
        schema,
        organizer,
    }
}

async fn bootstrap_sqlite(db: &DatabaseConnection) {
    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "PRAGMA foreign_keys = ON;",
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE app_user (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            department TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE user_role (
            user_id TEXT NOT NULL,
            role TEXT NOT NULL,
            PRIMARY KEY (user_id, role),
            FOREIGN KEY(user_id) REFERENCES app_user(id) ON DELETE CASCADE
        );
        "#,
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE event (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description_md TEXT,
            venue TEXT,
            starts_at TEXT NOT NULL,
            ends_at TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'DRAFT',
            organizer_id TEXT NOT NULL,
            approver_track TEXT NOT NULL,
            approval_notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(organizer_id) REFERENCES app_user(id)
        );
        "#,
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE event_approval (
            id TEXT PRIMARY KEY,
            event_id TEXT NOT NULL,
            stage TEXT NOT NULL,
            role_at_decision TEXT NOT NULL,
            decision TEXT NOT NULL,
            actor_id TEXT NOT NULL,
            comment TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(event_id) REFERENCES event(id) ON DELETE CASCADE
        );
        "#,
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE notification (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            message TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES app_user(id) ON DELETE CASCADE
        );
        "#,
    ))
    .await
    .unwrap();
}

async fn insert_user(db: &DatabaseConnection, email: &str, department: Option<&str>) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now().to_rfc3339();
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO app_user (id, email, display_name, department, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, 1, ?, ?)",
        vec![
            id.into(),
            email.into(),
            "Test User".into(),
            Value::from(department.map(str::to_owned)),
            now.clone().into(),
            now.into(),
        ],
    ))
    .await
    .unwrap();
    id
}

async fn insert_event(
    db: &DatabaseConnection,
    organizer: Uuid,
    status: event::Status,
    track: event::Track,
) -> event::Model {
    let id = Uuid::new_v4();
    let now = Utc::now().to_rfc3339();
    let starts = (Utc::now() + chrono::Duration::days(7)).to_rfc3339();
    let ends = (Utc::now() + chrono::Duration::days(7) + chrono::Duration::hours(3)).to_rfc3339();
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO event (id, title, description_md, venue, starts_at, ends_at, status, organizer_id, approver_track, approval_notes, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        vec![
            id.into(),
            "Robotics Expo".into(),
            Value::from(None::<String>),
            "Main Hall".into(),
            starts.into(),
            ends.into(),
            status_value(status).into(),
            organizer.into(),
            track_value(track).into(),
            Value::from(None::<String>),
            now.clone().into(),
            now.into(),
        ],
    ))
    .await
    .unwrap();

    event::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
}

fn status_value(status: event::Status) -> &'static str {
    match status {
        event::Status::Draft => "DRAFT",
        event::Status::PendingApproval => "PENDING_APPROVAL",
        event::Status::PendingStudentAffairs => "PENDING_STUDENT_AFFAIRS",
        event::Status::PendingVc => "PENDING_VC",
        event::Status::Approved => "APPROVED",
        event::Status::Rejected => "REJECTED",
        event::Status::Cancelled => "CANCELLED",
        event::Status::Completed => "COMPLETED",
    }
}

fn track_value(track: event::Track) -> &'static str {
    match track {
        event::Track::Staff => "STAFF",
        event::Track::DepartmentHead => "DEPARTMENT_HEAD",
        event::Track::StudentAffairs => "STUDENT_AFFAIRS",
        event::Track::SenateMember => "SENATE_MEMBER",
    }
}

fn acting_as(user_id: Uuid, role: Role, department: Option<&str>) -> CurrentUser {
    CurrentUser {
        user_id,
        roles: vec![role],
        department: department.map(str::to_owned),
    }
}

fn error_code(resp: &async_graphql::Response) -> Option<async_graphql::Value> {
    resp.errors
        .first()
        .and_then(|err| err.extensions.as_ref())
        .and_then(|ext| ext.get("code"))
        .cloned()
}

const DECIDE: &str = r#"
    mutation Decide($id: ID!, $decision: EventDecision!, $comment: String) {
        events {
            decideEvent(id: $id, decision: $decision, comment: $comment) {
                id
                status
            }
        }
    }
"#;

const SUBMIT: &str = r#"
    mutation Submit($id: ID!) {
        events {
            submitEvent(id: $id) {
                id
                status
            }
        }
    }
"#;

#[tokio::test]
async fn submit_routes_draft_by_approver_track() {
    let ctx = setup().await;
    let cases = [
        (event::Track::Staff, event::Status::PendingApproval),
        (event::Track::DepartmentHead, event::Status::PendingApproval),
        (event::Track::StudentAffairs, event::Status::PendingStudentAffairs),
        (event::Track::SenateMember, event::Status::PendingVc),
    ];
    for (track, expected) in cases {
        let seeded =
            insert_event(ctx.db.as_ref(), ctx.organizer, event::Status::Draft, track).await;
        let resp = ctx
            .schema
            .execute(
                Request::new(SUBMIT)
                    .variables(Variables::from_json(json!({ "id": seeded.id })))
                    .data(acting_as(ctx.organizer, Role::Student, Some("ENG"))),
            )
            .await;
        assert!(resp.errors.is_empty(), "errors: {:?}", resp.errors);

        let saved = event::Entity::find_by_id(seeded.id)
            .one(ctx.db.as_ref())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.status, expected, "track {:?}", track);

        let audit = event_approval::Entity::find()
            .filter(event_approval::Column::EventId.eq(seeded.id))
            .all(ctx.db.as_ref())
            .await
            .unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].decision, event_approval::Decision::Submitted);
        assert_eq!(audit[0].stage, event::Status::Draft);
    }
}

#[tokio::test]
async fn create_event_starts_in_draft() {
    let ctx = setup().await;
    let mutation = r#"
        mutation Create($input: NewEventInput!) {
            events {
                createEvent(input: $input) {
                    id
                    status
                    approverTrack
                }
            }
        }
    "#;
    let starts = Utc::now() + chrono::Duration::days(21);
    let resp = ctx
        .schema
        .execute(
            Request::new(mutation)
                .variables(Variables::from_json(json!({
                    "input": {
                        "title": "Hackathon",
                        "venue": "Lab 3",
                        "startsAt": starts.to_rfc3339(),
                        "endsAt": (starts + chrono::Duration::hours(8)).to_rfc3339(),
                        "approverTrack": "STAFF"
                    }
                })))
                .data(acting_as(ctx.organizer, Role::Student, Some("ENG"))),
        )
        .await;
    assert!(resp.errors.is_empty(), "errors: {:?}", resp.errors);
    let payload = resp.data.into_json().unwrap();
    assert_eq!(payload["events"]["createEvent"]["status"], json!("DRAFT"));
    assert_eq!(
        payload["events"]["createEvent"]["approverTrack"],
        json!("STAFF")
    );

    let saved = event::Entity::find()
        .filter(event::Column::Title.eq("Hackathon"))
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.status, event::Status::Draft);
    assert_eq!(saved.organizer_id, ctx.organizer);
}

#[tokio::test]
async fn only_the_organizer_may_submit() {
    let ctx = setup().await;
    let other = insert_user(ctx.db.as_ref(), "other@campus.test", None).await;
    let seeded = insert_event(
        ctx.db.as_ref(),
        ctx.organizer,
        event::Status::Draft,
        event::Track::DepartmentHead,
    )
    .await;
    let resp = ctx
        .schema
        .execute(
            Request::new(SUBMIT)
                .variables(Variables::from_json(json!({ "id": seeded.id })))
                .data(acting_as(other, Role::Student, None)),
        )
        .await;
    assert_eq!(
        error_code(&resp),
        Some(async_graphql::Value::from("FORBIDDEN"))
    );
}

#[tokio::test]
async fn department_head_approval_advances_and_records() {
    let ctx = setup().await;
    let head = insert_user(ctx.db.as_ref(), "head@campus.test", Some("ENG")).await;
    let seeded = insert_event(
        ctx.db.as_ref(),
        ctx.organizer,
        event::Status::PendingApproval,
        event::Track::DepartmentHead,
    )
    .await;

    let resp = ctx
        .schema
        .execute(
            Request::new(DECIDE)
                .variables(Variables::from_json(json!({
                    "id": seeded.id,
                    "decision": "APPROVE",
                    "comment": "agenda looks solid"
                })))
                .data(acting_as(head, Role::DepartmentHead, Some("ENG"))),
        )
        .await;
    assert!(resp.errors.is_empty(), "errors: {:?}", resp.errors);
    let status = resp.data.into_json().unwrap()["events"]["decideEvent"]["status"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(status, "PENDING_STUDENT_AFFAIRS");

    let saved = event::Entity::find_by_id(seeded.id)
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.status, event::Status::PendingStudentAffairs);
    assert_eq!(saved.approval_notes.as_deref(), Some("agenda looks solid"));

    let audit = event_approval::Entity::find()
        .filter(event_approval::Column::EventId.eq(seeded.id))
        .all(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(audit.len(), 1);
    let entry = &audit[0];
    assert_eq!(entry.stage, event::Status::PendingApproval);
    assert_eq!(entry.role_at_decision, entity::user_role::Role::DepartmentHead);
    assert_eq!(entry.decision, event_approval::Decision::Approved);
    assert_eq!(entry.actor_id, head);

    let notifications = notification::Entity::find()
        .filter(notification::Column::UserId.eq(ctx.organizer))
        .all(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(!notifications[0].is_read);
}

#[tokio::test]
async fn senate_rejection_is_terminal_and_keeps_comment() {
    let ctx = setup().await;
    let senator = insert_user(ctx.db.as_ref(), "senate@campus.test", None).await;
    let seeded = insert_event(
        ctx.db.as_ref(),
        ctx.organizer,
        event::Status::PendingVc,
        event::Track::SenateMember,
    )
    .await;

    let resp = ctx
        .schema
        .execute(
            Request::new(DECIDE)
                .variables(Variables::from_json(json!({
                    "id": seeded.id,
                    "decision": "REJECT",
                    "comment": "insufficient budget"
                })))
                .data(acting_as(senator, Role::SenateMember, None)),
        )
        .await;
    assert!(resp.errors.is_empty(), "errors: {:?}", resp.errors);

    let saved = event::Entity::find_by_id(seeded.id)
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.status, event::Status::Rejected);

    let audit = event_approval::Entity::find()
        .filter(event_approval::Column::EventId.eq(seeded.id))
        .all(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].comment.as_deref(), Some("insufficient budget"));
    assert_eq!(audit[0].decision, event_approval::Decision::Rejected);
}

#[tokio::test]
async fn ineligible_role_is_forbidden_and_writes_nothing() {
    let ctx = setup().await;
    let student = insert_user(ctx.db.as_ref(), "student@campus.test", None).await;
    let seeded = insert_event(
        ctx.db.as_ref(),
        ctx.organizer,
        event::Status::PendingApproval,
        event::Track::DepartmentHead,
    )
    .await;

    let resp = ctx
        .schema
        .execute(
            Request::new(DECIDE)
                .variables(Variables::from_json(json!({
                    "id": seeded.id,
                    "decision": "APPROVE"
                })))
                .data(acting_as(student, Role::Student, None)),
        )
        .await;
    assert_eq!(
        error_code(&resp),
        Some(async_graphql::Value::from("FORBIDDEN"))
    );

    let saved = event::Entity::find_by_id(seeded.id)
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.status, event::Status::PendingApproval);

    let audit_count = event_approval::Entity::find()
        .filter(event_approval::Column::EventId.eq(seeded.id))
        .count(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(audit_count, 0);

    let notification_count = notification::Entity::find()
        .count(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(notification_count, 0);
}

#[tokio::test]
async fn super_admin_gets_no_implicit_approval() {
    let ctx = setup().await;
    let admin = insert_user(ctx.db.as_ref(), "admin@campus.test", None).await;
    let seeded = insert_event(
        ctx.db.as_ref(),
        ctx.organizer,
        event::Status::PendingVc,
        event::Track::SenateMember,
    )
    .await;

    let resp = ctx
        .schema
        .execute(
            Request::new(DECIDE)
                .variables(Variables::from_json(json!({
                    "id": seeded.id,
                    "decision": "APPROVE"
                })))
                .data(acting_as(admin, Role::SuperAdmin, None)),
        )
        .await;
    assert_eq!(
        error_code(&resp),
        Some(async_graphql::Value::from("FORBIDDEN"))
    );
}

#[tokio::test]
async fn terminal_states_report_conflict() {
    let ctx = setup().await;
    let senator = insert_user(ctx.db.as_ref(), "senate@campus.test", None).await;
    for status in [event::Status::Approved, event::Status::Rejected] {
        let seeded = insert_event(
            ctx.db.as_ref(),
            ctx.organizer,
            status,
            event::Track::SenateMember,
        )
        .await;
        let resp = ctx
            .schema
            .execute(
                Request::new(DECIDE)
                    .variables(Variables::from_json(json!({
                        "id": seeded.id,
                        "decision": "APPROVE"
                    })))
                    .data(acting_as(senator, Role::SenateMember, None)),
            )
            .await;
        assert_eq!(
            error_code(&resp),
            Some(async_graphql::Value::from("CONFLICT")),
            "status {:?}",
            status
        );
    }
}

#[tokio::test]
async fn stale_snapshot_loses_the_compare_and_swap() {
    let ctx = setup().await;
    let senator = insert_user(ctx.db.as_ref(), "senate@campus.test", None).await;
    let seeded = insert_event(
        ctx.db.as_ref(),
        ctx.organizer,
        event::Status::PendingVc,
        event::Track::SenateMember,
    )
    .await;

    // Two decisions computed against the same snapshot: only the first
    // may persist.
    let stale = seeded.clone();
    let first = workflow::decide(
        &store::snapshot(&stale),
        Role::SenateMember,
        workflow::Decision::Approve,
        None,
    )
    .unwrap();
    let second = workflow::decide(
        &store::snapshot(&stale),
        Role::SenateMember,
        workflow::Decision::Reject,
        Some("late veto"),
    )
    .unwrap();

    store::apply_transition(ctx.db.as_ref(), &stale, &first, senator)
        .await
        .unwrap();
    let err = store::apply_transition(ctx.db.as_ref(), &stale, &second, senator)
        .await
        .unwrap_err();
    assert!(matches!(err, store::StoreError::Conflict));

    // Retry against the refreshed row: the event is now terminal.
    let resp = ctx
        .schema
        .execute(
            Request::new(DECIDE)
                .variables(Variables::from_json(json!({
                    "id": seeded.id,
                    "decision": "REJECT"
                })))
                .data(acting_as(senator, Role::SenateMember, None)),
        )
        .await;
    assert_eq!(
        error_code(&resp),
        Some(async_graphql::Value::from("CONFLICT"))
    );

    // The losing decision left no trace.
    let audit_count = event_approval::Entity::find()
        .filter(event_approval::Column::EventId.eq(seeded.id))
        .count(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(audit_count, 1);
}

#[tokio::test]
async fn full_chain_walks_to_approved() {
    let ctx = setup().await;
    let staff = insert_user(ctx.db.as_ref(), "staff@campus.test", Some("ENG")).await;
    let dsa = insert_user(ctx.db.as_ref(), "dsa@campus.test", None).await;
    let senator = insert_user(ctx.db.as_ref(), "senate@campus.test", None).await;
    let seeded = insert_event(
        ctx.db.as_ref(),
        ctx.organizer,
        event::Status::PendingApproval,
        event::Track::DepartmentHead,
    )
    .await;

    let actors = [
        (staff, Role::Staff),
        (dsa, Role::DeanStudentAffairs),
        (senator, Role::SenateMember),
    ];
    for (user_id, role) in actors {
        let resp = ctx
            .schema
            .execute(
                Request::new(DECIDE)
                    .variables(Variables::from_json(json!({
                        "id": seeded.id,
                        "decision": "APPROVE"
                    })))
                    .data(acting_as(user_id, role, Some("ENG"))),
            )
            .await;
        assert!(resp.errors.is_empty(), "{role:?}: {:?}", resp.errors);
    }

    let saved = event::Entity::find_by_id(seeded.id)
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.status, event::Status::Approved);

    let audit_count = event_approval::Entity::find()
        .filter(event_approval::Column::EventId.eq(seeded.id))
        .count(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(audit_count, 3);

    let notification_count = notification::Entity::find()
        .filter(notification::Column::UserId.eq(ctx.organizer))
        .count(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(notification_count, 3);
}

#[tokio::test]
async fn actionable_events_scope_department_heads() {
    let ctx = setup().await;
    let math_organizer = insert_user(ctx.db.as_ref(), "math@campus.test", Some("MATH")).await;
    let head = insert_user(ctx.db.as_ref(), "head@campus.test", Some("ENG")).await;
    let eng_event = insert_event(
        ctx.db.as_ref(),
        ctx.organizer,
        event::Status::PendingApproval,
        event::Track::DepartmentHead,
    )
    .await;
    let _math_event = insert_event(
        ctx.db.as_ref(),
        math_organizer,
        event::Status::PendingApproval,
        event::Track::DepartmentHead,
    )
    .await;

    let query = r#"
        query Actionable {
            events {
                actionableEvents { id status }
            }
        }
    "#;

    let resp = ctx
        .schema
        .execute(
            Request::new(query).data(acting_as(head, Role::DepartmentHead, Some("ENG"))),
        )
        .await;
    assert!(resp.errors.is_empty(), "errors: {:?}", resp.errors);
    let rows = resp.data.into_json().unwrap()["events"]["actionableEvents"]
        .as_array()
        .cloned()
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], json!(eng_event.id));

    // Staff eligibility has no department predicate.
    let staff = insert_user(ctx.db.as_ref(), "staff@campus.test", None).await;
    let resp = ctx
        .schema
        .execute(Request::new(query).data(acting_as(staff, Role::Staff, None)))
        .await;
    let rows = resp.data.into_json().unwrap()["events"]["actionableEvents"]
        .as_array()
        .cloned()
        .unwrap();
    assert_eq!(rows.len(), 2);

    // Students act on nothing.
    let student = insert_user(ctx.db.as_ref(), "student@campus.test", None).await;
    let resp = ctx
        .schema
        .execute(Request::new(query).data(acting_as(student, Role::Student, None)))
        .await;
    let rows = resp.data.into_json().unwrap()["events"]["actionableEvents"]
        .as_array()
        .cloned()
        .unwrap();
    assert!(rows.is_empty());
}
