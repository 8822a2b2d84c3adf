//! Port implementations for [`JsonStateStore`](crate::JsonStateStore).

mod automation_repo;
mod email_log;
mod notes;
mod secrets;
