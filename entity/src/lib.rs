pub mod app_user;
pub mod event;
pub mod event_approval;
pub mod notification;
pub mod user_role;
