use std::sync::Arc;

use async_graphql::{
    Context, EmptySubscription, Enum, Error, ErrorExtensions, InputObject, Object, Schema,
    SimpleObject, ID,
};
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::info_span;
use uuid::Uuid;

use entity::{app_user, event, event_approval, notification, user_role};
use workflow::Role;

use crate::auth::CurrentUser;
use crate::notify;
use crate::store::{self, StoreError};

pub struct AppSchema(pub Schema<QueryRoot, MutationRoot, EmptySubscription>);

pub fn build_schema(db: Arc<DatabaseConnection>) -> AppSchema {
    let schema = Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(db)
        .finish();
    AppSchema(schema)
}

pub struct QueryRoot;
pub struct MutationRoot;

const MAX_EVENTS_PAGE: i32 = 100;

#[Object]
impl QueryRoot {
    async fn events(&self) -> EventsQuery {
        EventsQuery
    }
}

#[Object]
impl MutationRoot {
    async fn events(&self) -> EventsMutation {
        EventsMutation
    }
}

pub struct EventsQuery;
pub struct EventsMutation;

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum EventStatus {
    #[graphql(name = "DRAFT")]
    Draft,
    #[graphql(name = "PENDING_APPROVAL")]
    PendingApproval,
    #[graphql(name = "PENDING_STUDENT_AFFAIRS")]
    PendingStudentAffairs,
    #[graphql(name = "PENDING_VC")]
    PendingVc,
    #[graphql(name = "APPROVED")]
    Approved,
    #[graphql(name = "REJECTED")]
    Rejected,
    #[graphql(name = "CANCELLED")]
    Cancelled,
    #[graphql(name = "COMPLETED")]
    Completed,
}

impl From<event::Status> for EventStatus {
    fn from(value: event::Status) -> Self {
        match value {
            event::Status::Draft => EventStatus::Draft,
            event::Status::PendingApproval => EventStatus::PendingApproval,
            event::Status::PendingStudentAffairs => EventStatus::PendingStudentAffairs,
            event::Status::PendingVc => EventStatus::PendingVc,
            event::Status::Approved => EventStatus::Approved,
            event::Status::Rejected => EventStatus::Rejected,
            event::Status::Cancelled => EventStatus::Cancelled,
            event::Status::Completed => EventStatus::Completed,
        }
    }
}

impl From<EventStatus> for event::Status {
    fn from(value: EventStatus) -> Self {
        match value {
            EventStatus::Draft => event::Status::Draft,
            EventStatus::PendingApproval => event::Status::PendingApproval,
            EventStatus::PendingStudentAffairs => event::Status::PendingStudentAffairs,
            EventStatus::PendingVc => event::Status::PendingVc,
            EventStatus::Approved => event::Status::Approved,
            EventStatus::Rejected => event::Status::Rejected,
            EventStatus::Cancelled => event::Status::Cancelled,
            EventStatus::Completed => event::Status::Completed,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(name = "ApproverTrack")]
pub enum EventTrack {
    #[graphql(name = "STAFF")]
    Staff,
    #[graphql(name = "DEPARTMENT_HEAD")]
    DepartmentHead,
    #[graphql(name = "STUDENT_AFFAIRS")]
    StudentAffairs,
    #[graphql(name = "SENATE_MEMBER")]
    SenateMember,
}

impl From<event::Track> for EventTrack {
    fn from(value: event::Track) -> Self {
        match value {
            event::Track::Staff => EventTrack::Staff,
            event::Track::DepartmentHead => EventTrack::DepartmentHead,
            event::Track::StudentAffairs => EventTrack::StudentAffairs,
            event::Track::SenateMember => EventTrack::SenateMember,
        }
    }
}

impl From<EventTrack> for event::Track {
    fn from(value: EventTrack) -> Self {
        match value {
            EventTrack::Staff => event::Track::Staff,
            EventTrack::DepartmentHead => event::Track::DepartmentHead,
            EventTrack::StudentAffairs => event::Track::StudentAffairs,
            EventTrack::SenateMember => event::Track::SenateMember,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum EventDecision {
    #[graphql(name = "APPROVE")]
    Approve,
    #[graphql(name = "REJECT")]
    Reject,
}

impl EventDecision {
    fn as_str(self) -> &'static str {
        match self {
            EventDecision::Approve => "APPROVE",
            EventDecision::Reject => "REJECT",
        }
    }
}

impl From<EventDecision> for workflow::Decision {
    fn from(value: EventDecision) -> Self {
        match value {
            EventDecision::Approve => workflow::Decision::Approve,
            EventDecision::Reject => workflow::Decision::Reject,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum ApprovalDecision {
    #[graphql(name = "SUBMITTED")]
    Submitted,
    #[graphql(name = "APPROVED")]
    Approved,
    #[graphql(name = "REJECTED")]
    Rejected,
}

impl From<event_approval::Decision> for ApprovalDecision {
    fn from(value: event_approval::Decision) -> Self {
        match value {
            event_approval::Decision::Submitted => ApprovalDecision::Submitted,
            event_approval::Decision::Approved => ApprovalDecision::Approved,
            event_approval::Decision::Rejected => ApprovalDecision::Rejected,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Event")]
pub struct EventNode {
    pub id: ID,
    pub title: String,
    #[graphql(name = "descriptionMd")]
    pub description_md: Option<String>,
    pub venue: Option<String>,
    #[graphql(name = "startsAt")]
    pub starts_at: DateTime<Utc>,
    #[graphql(name = "endsAt")]
    pub ends_at: DateTime<Utc>,
    pub status: EventStatus,
    #[graphql(name = "organizerId")]
    pub organizer_id: ID,
    #[graphql(name = "approverTrack")]
    pub approver_track: EventTrack,
    #[graphql(name = "approvalNotes")]
    pub approval_notes: Option<String>,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[graphql(name = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<event::Model> for EventNode {
    fn from(model: event::Model) -> Self {
        Self {
            id: model.id.into(),
            title: model.title,
            description_md: model.description_md,
            venue: model.venue,
            starts_at: model.starts_at.with_timezone(&Utc),
            ends_at: model.ends_at.with_timezone(&Utc),
            status: model.status.into(),
            organizer_id: model.organizer_id.into(),
            approver_track: model.approver_track.into(),
            approval_notes: model.approval_notes,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "EventApproval")]
pub struct EventApprovalNode {
    pub id: ID,
    #[graphql(name = "eventId")]
    pub event_id: ID,
    pub stage: EventStatus,
    /// Role the actor held when the decision was recorded.
    pub role: String,
    pub decision: ApprovalDecision,
    #[graphql(name = "actorId")]
    pub actor_id: ID,
    pub comment: Option<String>,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<event_approval::Model> for EventApprovalNode {
    fn from(model: event_approval::Model) -> Self {
        Self {
            id: model.id.into(),
            event_id: model.event_id.into(),
            stage: model.stage.into(),
            role: Role::from(model.role_at_decision).as_str().to_string(),
            decision: model.decision.into(),
            actor_id: model.actor_id.into(),
            comment: model.comment,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Notification")]
pub struct NotificationNode {
    pub id: ID,
    pub message: String,
    #[graphql(name = "isRead")]
    pub is_read: bool,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<notification::Model> for NotificationNode {
    fn from(model: notification::Model) -> Self {
        Self {
            id: model.id.into(),
            message: model.message,
            is_read: model.is_read,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Clone, Debug, InputObject)]
pub struct NewEventInput {
    pub title: String,
    #[graphql(name = "descriptionMd")]
    pub description_md: Option<String>,
    pub venue: Option<String>,
    #[graphql(name = "startsAt")]
    pub starts_at: DateTime<Utc>,
    #[graphql(name = "endsAt")]
    pub ends_at: DateTime<Utc>,
    #[graphql(name = "approverTrack")]
    pub approver_track: EventTrack,
}

#[derive(Clone, Debug, InputObject)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    #[graphql(name = "organizerId")]
    pub organizer_id: Option<ID>,
}

#[Object]
impl EventsQuery {
    async fn event(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<EventNode>> {
        current_user(ctx)?;
        let db = database(ctx)?;
        let event_id = parse_uuid(&id)?;
        let record = event::Entity::find_by_id(event_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(record.map(EventNode::from))
    }

    async fn events(
        &self,
        ctx: &Context<'_>,
        filter: Option<EventFilter>,
        first: Option<i32>,
        offset: Option<i32>,
    ) -> async_graphql::Result<Vec<EventNode>> {
        current_user(ctx)?;
        let db = database(ctx)?;
        let limit = first.unwrap_or(25).clamp(1, MAX_EVENTS_PAGE) as u64;
        let skip = offset.unwrap_or(0).max(0) as u64;

        let mut query = event::Entity::find();
        if let Some(filter) = filter {
            if let Some(status) = filter.status {
                query = query.filter(event::Column::Status.eq(event::Status::from(status)));
            }
            if let Some(organizer_id) = filter.organizer_id {
                query = query.filter(event::Column::OrganizerId.eq(parse_uuid(&organizer_id)?));
            }
        }
        let rows = query
            .order_by_asc(event::Column::StartsAt)
            .limit(limit)
            .offset(skip)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(EventNode::from).collect())
    }

    /// Events awaiting a decision from the caller's effective role. For
    /// department heads the scoping context is the department: an
    /// explicit argument wins, otherwise the caller's own department.
    #[graphql(name = "actionableEvents")]
    async fn actionable_events(
        &self,
        ctx: &Context<'_>,
        department: Option<String>,
        first: Option<i32>,
        offset: Option<i32>,
    ) -> async_graphql::Result<Vec<EventNode>> {
        let current = current_user(ctx)?;
        let db = database(ctx)?;
        let limit = first.unwrap_or(25).clamp(1, MAX_EVENTS_PAGE) as u64;
        let skip = offset.unwrap_or(0).max(0) as u64;
        let scope = department.or_else(|| current.department.clone());
        let rows = store::actionable_events(
            db.as_ref(),
            current.effective_role(),
            scope.as_deref(),
            limit,
            skip,
        )
        .await
        .map_err(store_error)?;
        Ok(rows.into_iter().map(EventNode::from).collect())
    }

    /// Audit history for one event, latest decision first.
    #[graphql(name = "eventApprovals")]
    async fn event_approvals(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "eventId")] event_id: ID,
        first: Option<i32>,
        offset: Option<i32>,
    ) -> async_graphql::Result<Vec<EventApprovalNode>> {
        current_user(ctx)?;
        let db = database(ctx)?;
        let event_uuid = parse_uuid(&event_id)?;
        let limit = first.unwrap_or(50).clamp(1, 200) as u64;
        let skip = offset.unwrap_or(0).max(0) as u64;

        let rows = event_approval::Entity::find()
            .filter(event_approval::Column::EventId.eq(event_uuid))
            .order_by_desc(event_approval::Column::CreatedAt)
            .limit(limit)
            .offset(skip)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(EventApprovalNode::from).collect())
    }

    #[graphql(name = "myNotifications")]
    async fn my_notifications(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "onlyUnread")] only_unread: Option<bool>,
        first: Option<i32>,
        offset: Option<i32>,
    ) -> async_graphql::Result<Vec<NotificationNode>> {
        let current = current_user(ctx)?;
        let db = database(ctx)?;
        let limit = first.unwrap_or(50).clamp(1, 200) as u64;
        let skip = offset.unwrap_or(0).max(0) as u64;

        let mut query = notification::Entity::find()
            .filter(notification::Column::UserId.eq(current.user_id));
        if only_unread.unwrap_or(false) {
            query = query.filter(notification::Column::IsRead.eq(false));
        }
        let rows = query
            .order_by_desc(notification::Column::CreatedAt)
            .limit(limit)
            .offset(skip)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(NotificationNode::from).collect())
    }
}

#[Object]
impl EventsMutation {
    #[graphql(name = "createEvent")]
    async fn create_event(
        &self,
        ctx: &Context<'_>,
        input: NewEventInput,
    ) -> async_graphql::Result<EventNode> {
        let current = require_role(ctx, Role::Student)?;
        let db = database(ctx)?;
        let title = validate_title(&input.title)?;
        validate_schedule(input.starts_at, input.ends_at)?;
        let now: DateTimeWithTimeZone = Utc::now().into();
        let model = event::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            description_md: Set(input.description_md),
            venue: Set(input.venue),
            starts_at: Set(input.starts_at.into()),
            ends_at: Set(input.ends_at.into()),
            status: Set(event::Status::Draft),
            organizer_id: Set(current.user_id),
            approver_track: Set(input.approver_track.into()),
            approval_notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db.as_ref())
        .await
        .map_err(db_error)?;
        Ok(model.into())
    }

    /// Hands a draft to its first review stage per the event's approver
    /// track. Organizer-only.
    #[graphql(name = "submitEvent")]
    async fn submit_event(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<EventNode> {
        let current = current_user(ctx)?;
        let db = database(ctx)?;
        let event_id = parse_uuid(&id)?;
        let model = store::load_event(db.as_ref(), event_id)
            .await
            .map_err(store_error)?;
        if model.organizer_id != current.user_id {
            return Err(error_with_code(
                "FORBIDDEN",
                "Only the organizer may submit this event",
            ));
        }
        let transition = workflow::submit(&store::snapshot(&model), current.effective_role())
            .map_err(workflow_error)?;
        let updated = store::apply_transition(db.as_ref(), &model, &transition, current.user_id)
            .await
            .map_err(store_error)?;
        notify::dispatch_effects(db.as_ref(), &transition.effects).await;
        Ok(updated.into())
    }

    /// Records an approve/reject decision by the caller's effective role.
    /// The decision itself is computed by the pure workflow engine; this
    /// mutation persists it with a compare-and-swap on the status it was
    /// computed against.
    #[graphql(name = "decideEvent")]
    async fn decide_event(
        &self,
        ctx: &Context<'_>,
        id: ID,
        decision: EventDecision,
        comment: Option<String>,
    ) -> async_graphql::Result<EventNode> {
        let current = current_user(ctx)?;
        let db = database(ctx)?;
        let event_id = parse_uuid(&id)?;
        let role = current.effective_role();
        let span = info_span!(
            "events.decide",
            event = %event_id,
            role = role.as_str(),
            decision = decision.as_str()
        );
        let _guard = span.enter();

        let model = store::load_event(db.as_ref(), event_id)
            .await
            .map_err(store_error)?;
        let transition = workflow::decide(
            &store::snapshot(&model),
            role,
            decision.into(),
            comment.as_deref(),
        )
        .map_err(workflow_error)?;
        let updated = store::apply_transition(db.as_ref(), &model, &transition, current.user_id)
            .await
            .map_err(store_error)?;
        notify::dispatch_effects(db.as_ref(), &transition.effects).await;
        Ok(updated.into())
    }

    #[graphql(name = "markNotificationRead")]
    async fn mark_notification_read(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<NotificationNode> {
        let current = current_user(ctx)?;
        let db = database(ctx)?;
        let notification_id = parse_uuid(&id)?;
        let row = notification::Entity::find_by_id(notification_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or_else(|| error_with_code("NOT_FOUND", "Notification not found"))?;
        if row.user_id != current.user_id {
            return Err(error_with_code("FORBIDDEN", "Not your notification"));
        }
        let mut active: notification::ActiveModel = row.into();
        active.is_read = Set(true);
        let updated = active.update(db.as_ref()).await.map_err(db_error)?;
        Ok(updated.into())
    }
}

fn database(ctx: &Context<'_>) -> async_graphql::Result<Arc<DatabaseConnection>> {
    ctx.data::<Arc<DatabaseConnection>>()
        .cloned()
        .map_err(|_| error_with_code("INTERNAL", "Missing database connection"))
}

fn current_user(ctx: &Context<'_>) -> async_graphql::Result<CurrentUser> {
    ctx.data::<CurrentUser>()
        .cloned()
        .map_err(|_| error_with_code("UNAUTHENTICATED", "Login required"))
}

fn require_role(ctx: &Context<'_>, min: Role) -> async_graphql::Result<CurrentUser> {
    let user = current_user(ctx)?;
    if user.has_role(min) {
        Ok(user)
    } else {
        Err(error_with_code("FORBIDDEN", "Insufficient permissions"))
    }
}

fn parse_uuid(id: &ID) -> async_graphql::Result<Uuid> {
    Uuid::parse_str(id.as_str()).map_err(|_| error_with_code("BAD_REQUEST", "Invalid ID"))
}

fn validate_title(raw: &str) -> async_graphql::Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(error_with_code("BAD_REQUEST", "Title must not be empty"));
    }
    if trimmed.len() > 200 {
        return Err(error_with_code("BAD_REQUEST", "Title is too long"));
    }
    Ok(trimmed.to_string())
}

fn validate_schedule(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> async_graphql::Result<()> {
    if ends_at <= starts_at {
        return Err(error_with_code("BAD_REQUEST", "Event must end after it starts"));
    }
    Ok(())
}

fn db_error(err: DbErr) -> Error {
    error_with_code("INTERNAL", format!("Database error: {}", err))
}

fn store_error(err: StoreError) -> Error {
    match err {
        StoreError::NotFound => error_with_code("NOT_FOUND", "Event not found"),
        StoreError::Conflict => {
            error_with_code("CONFLICT", "Event state changed, please refresh")
        }
        StoreError::Db(e) => db_error(e),
    }
}

fn workflow_error(err: workflow::WorkflowError) -> Error {
    match &err {
        workflow::WorkflowError::Unauthorized { .. } => {
            error_with_code("FORBIDDEN", err.to_string())
        }
        workflow::WorkflowError::InvalidTransition { .. } => {
            error_with_code("CONFLICT", err.to_string())
        }
    }
}

fn error_with_code(code: &'static str, message: impl Into<String>) -> Error {
    Error::new(message).extend_with(|_, e| e.set("code", code))
}

#[derive(Debug, Clone)]
pub struct SeededEventRecords {
    pub users: Vec<app_user::Model>,
    pub events: Vec<event::Model>,
}

impl SeededEventRecords {
    pub fn user_email(&self, email: &str) -> Option<&app_user::Model> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn event_titled(&self, title: &str) -> Option<&event::Model> {
        self.events.iter().find(|e| e.title == title)
    }
}

/// Demo fixtures: one user per review role plus events parked at each
/// stage of the chain. Used by the `seed` CLI command.
pub async fn seed_events_demo(db: &DatabaseConnection) -> Result<SeededEventRecords, DbErr> {
    let seeded_at: DateTimeWithTimeZone = Utc::now().into();
    let mut users = Vec::new();
    let fixtures: [(&str, &str, Option<&str>, &[user_role::Role]); 6] = [
        (
            "organizer@campus.test",
            "Olu Organizer",
            Some("ENG"),
            &[user_role::Role::Student],
        ),
        (
            "coordinator@campus.test",
            "Cora Coordinator",
            Some("ENG"),
            &[user_role::Role::Staff, user_role::Role::EventCoordinator],
        ),
        (
            "head@campus.test",
            "Hana Head",
            Some("ENG"),
            &[user_role::Role::DepartmentHead],
        ),
        (
            "dsa@campus.test",
            "Dina Dean",
            None,
            &[user_role::Role::DeanStudentAffairs],
        ),
        (
            "senate@campus.test",
            "Sami Senate",
            None,
            &[user_role::Role::SenateMember],
        ),
        (
            "admin@campus.test",
            "Ada Admin",
            None,
            &[user_role::Role::SuperAdmin],
        ),
    ];
    for (email, name, department, roles) in fixtures {
        let user = insert_seed_user(db, email, name, department, roles, seeded_at).await?;
        users.push(user);
    }
    let organizer = users[0].id;

    let stages = [
        ("Freshers Fair", event::Status::Draft),
        ("Robotics Expo", event::Status::PendingApproval),
        ("Charity Gala", event::Status::PendingStudentAffairs),
        ("Convocation Rehearsal", event::Status::PendingVc),
        ("Open Day", event::Status::Approved),
    ];
    let mut events = Vec::new();
    for (index, (title, status)) in stages.into_iter().enumerate() {
        let starts = Utc::now() + chrono::Duration::days(14 + index as i64);
        let model = event::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title.into()),
            description_md: Set(Some(format!("Demo fixture for {}", title))),
            venue: Set(Some("Main Hall".into())),
            starts_at: Set(starts.into()),
            ends_at: Set((starts + chrono::Duration::hours(4)).into()),
            status: Set(status),
            organizer_id: Set(organizer),
            approver_track: Set(event::Track::DepartmentHead),
            approval_notes: Set(None),
            created_at: Set(seeded_at),
            updated_at: Set(seeded_at),
        }
        .insert(db)
        .await?;
        events.push(model);
    }

    Ok(SeededEventRecords { users, events })
}

async fn insert_seed_user(
    db: &DatabaseConnection,
    email: &str,
    display_name: &str,
    department: Option<&str>,
    roles: &[user_role::Role],
    seeded_at: DateTimeWithTimeZone,
) -> Result<app_user::Model, DbErr> {
    let user = app_user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.into()),
        display_name: Set(display_name.into()),
        department: Set(department.map(str::to_owned)),
        is_active: Set(true),
        created_at: Set(seeded_at),
        updated_at: Set(seeded_at),
    }
    .insert(db)
    .await?;
    for role in roles {
        user_role::Entity::insert(user_role::ActiveModel {
            user_id: Set(user.id),
            role: Set(*role),
        })
        .exec_without_returning(db)
        .await?;
    }
    Ok(user)
}
