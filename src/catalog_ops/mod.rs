pub mod api;
pub mod audit_log;
pub mod input;
pub mod planner;
pub mod submitter;

#[cfg(test)]
pub(crate) mod fake;

pub use api::ProductApi;
pub use audit_log::{AuditLog, DEFAULT_LOG_PATH};
pub use submitter::{BatchSubmitter, SubmitReport, ACTIONS_LIMIT};
