//! Chunked, version-guarded submission of a product's action list.
//!
//! Each chunk re-reads the product version right before posting: earlier
//! chunks of the same product bump the version, so a version read once up
//! front would be stale from the second chunk on.

use std::ops::AddAssign;

use ctp_client::{CtpError, ProductRef, UpdateAction};
use tracing::{debug, warn};

use super::api::ProductApi;
use super::audit_log::AuditLog;

/// Maximum number of update actions accepted per request.
pub const ACTIONS_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitReport {
    pub batches: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Subset of `failed` rejected for a stale version.
    pub conflicts: usize,
}

impl AddAssign for SubmitReport {
    fn add_assign(&mut self, rhs: Self) {
        self.batches += rhs.batches;
        self.succeeded += rhs.succeeded;
        self.failed += rhs.failed;
        self.conflicts += rhs.conflicts;
    }
}

/// Number of requests needed for `len` actions.
pub fn batch_count(len: usize, chunk_size: usize) -> usize {
    len.div_ceil(chunk_size.max(1))
}

pub struct BatchSubmitter<'a, A: ProductApi + ?Sized> {
    api: &'a A,
    log: &'a AuditLog,
    dry_run: bool,
    chunk_size: usize,
}

impl<'a, A: ProductApi + ?Sized> BatchSubmitter<'a, A> {
    pub fn new(api: &'a A, log: &'a AuditLog, dry_run: bool) -> Self {
        Self {
            api,
            log,
            dry_run,
            chunk_size: ACTIONS_LIMIT,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Log and (unless dry-run) submit `actions` in order, one request per
    /// chunk. A failed chunk is logged and the next chunk is still attempted.
    pub async fn submit(
        &self,
        product: &ProductRef,
        label: &str,
        actions: &[UpdateAction],
    ) -> SubmitReport {
        let mut report = SubmitReport::default();
        let mode = if self.dry_run { "[DRY RUN]" } else { "[LIVE]" };

        for (index, chunk) in actions.chunks(self.chunk_size).enumerate() {
            let batch = index + 1;
            report.batches += 1;

            self.log.line("");
            self.log
                .line(format!("{mode} Product {label}, Batch {batch}:"));
            for (i, action) in chunk.iter().enumerate() {
                self.log.line(format!("  {}. {action}", i + 1));
            }

            if self.dry_run {
                continue;
            }

            match self.submit_chunk(product, chunk).await {
                Ok(version) => {
                    debug!(target = "submit", product = %label, batch, version, actions = chunk.len(), "batch applied");
                    self.log
                        .line(format!("Successfully updated product {label}, Batch {batch}"));
                    report.succeeded += 1;
                }
                Err(err) => {
                    if err.is_conflict() {
                        warn!(target = "submit", product = %product, batch, "version moved between read and update");
                        report.conflicts += 1;
                    }
                    self.log.failure(format!(
                        "Failed to update product {label}, Batch {batch}: {err}"
                    ));
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Returns the version the chunk was applied against.
    async fn submit_chunk(
        &self,
        product: &ProductRef,
        chunk: &[UpdateAction],
    ) -> Result<u64, CtpError> {
        let version = self.api.fetch_version(product).await?;
        self.api.update_product(product, version, chunk).await?;
        Ok(version)
    }
}
