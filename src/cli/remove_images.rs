use std::path::PathBuf;

use anyhow::Result;
use ctp_client::ProductRef;
use tracing::info;

use super::RunSummary;
use crate::catalog_ops::input::{self, DEFAULT_CSV_PATH};
use crate::catalog_ops::planner;
use crate::catalog_ops::{AuditLog, BatchSubmitter, ProductApi};

#[derive(Debug, Clone)]
pub struct RemoveImagesConfig {
    pub csv_path: PathBuf,
    pub dry_run: bool,
}

impl Default for RemoveImagesConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            dry_run: false,
        }
    }
}

/// Remove every listed image by sku and publish each touched product.
///
/// A CSV that cannot be read fails the whole run; update failures are logged
/// per batch and do not.
pub async fn run<A>(api: &A, log: &AuditLog, cfg: &RemoveImagesConfig) -> Result<RunSummary>
where
    A: ProductApi + ?Sized,
{
    let rows = input::read_rows_from_path(&cfg.csv_path)?;
    let plan = planner::plan_flat(&rows);
    info!(target = "remove_images", rows = rows.len(), products = plan.len(), dry_run = cfg.dry_run, "plan built");

    let submitter = BatchSubmitter::new(api, log, cfg.dry_run);
    let mut summary = RunSummary {
        scanned: plan.len(),
        ..RunSummary::default()
    };
    for (key, actions) in &plan {
        summary.products += 1;
        summary.submit += submitter
            .submit(&ProductRef::Key(key.clone()), key, actions)
            .await;
    }
    Ok(summary)
}
