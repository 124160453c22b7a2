//! The three sweep jobs, each a library function over a [`ProductApi`], plus
//! the shared binary plumbing.

pub mod remove_images;
pub mod remove_images_checked;
pub mod remove_numbered_images;

use anyhow::Result;
use ctp_client::{CtpClient, CtpConfig};
use tracing::info;

use crate::catalog_ops::{AuditLog, SubmitReport};
use crate::util::env as env_util;
use crate::util::logging;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Products inspected (CSV groups or catalog entries).
    pub scanned: usize,
    /// Products that had at least one action to log or submit.
    pub products: usize,
    pub fetch_failures: usize,
    pub submit: SubmitReport,
}

/// Env, tracing and the API client for a sweep binary. A configuration
/// problem is written to the audit log before the error is returned.
pub fn bootstrap(bin_name: &str, log: &AuditLog) -> Result<CtpClient> {
    logging::init_tracing("info")?;
    env_util::bootstrap_cli(bin_name);
    match CtpConfig::from_env().and_then(CtpClient::new) {
        Ok(client) => {
            info!(target = "bootstrap", bin = bin_name, project = client.project_key(), "api client ready");
            Ok(client)
        }
        Err(err) => {
            log.failure(format!("Script failed: {err}"));
            Err(err.into())
        }
    }
}

/// Record the outcome of a job in the audit log and traces.
pub fn finish(bin_name: &str, log: &AuditLog, result: Result<RunSummary>) {
    match result {
        Ok(summary) => info!(
            target = "summary",
            bin = bin_name,
            scanned = summary.scanned,
            products = summary.products,
            fetch_failures = summary.fetch_failures,
            batches = summary.submit.batches,
            succeeded = summary.submit.succeeded,
            failed = summary.submit.failed,
            conflicts = summary.submit.conflicts,
            "run finished"
        ),
        Err(err) => log.failure(format!("Failed to process products: {err:#}")),
    }
}
