use std::path::PathBuf;

use anyhow::Result;
use ctp_client::ProductRef;
use tracing::{debug, info};

use super::RunSummary;
use crate::catalog_ops::input::{self, DEFAULT_CSV_PATH};
use crate::catalog_ops::planner;
use crate::catalog_ops::{AuditLog, BatchSubmitter, ProductApi};

#[derive(Debug, Clone)]
pub struct RemoveImagesCheckedConfig {
    pub csv_path: PathBuf,
    pub dry_run: bool,
}

impl Default for RemoveImagesCheckedConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            dry_run: false,
        }
    }
}

/// Like [`super::remove_images::run`] but reads each product first: images
/// are removed from all of its variants and only already-published products
/// are republished. A product that cannot be read is logged and skipped.
pub async fn run<A>(
    api: &A,
    log: &AuditLog,
    cfg: &RemoveImagesCheckedConfig,
) -> Result<RunSummary>
where
    A: ProductApi + ?Sized,
{
    let grouped = input::group_by_product(input::read_rows_from_path(&cfg.csv_path)?);
    info!(target = "remove_images_checked", products = grouped.len(), dry_run = cfg.dry_run, "csv loaded");

    let submitter = BatchSubmitter::new(api, log, cfg.dry_run);
    let mut summary = RunSummary::default();
    for (key, rows) in &grouped {
        summary.scanned += 1;
        let product_ref = ProductRef::Key(key.clone());
        let product = match api.fetch_product(&product_ref).await {
            Ok(product) => product,
            Err(err) => {
                log.failure(format!("Failed to fetch product {key}: {err}"));
                summary.fetch_failures += 1;
                continue;
            }
        };

        let actions = planner::plan_checked(&product, rows);
        if actions.is_empty() {
            debug!(target = "remove_images_checked", product = %key, "nothing to do");
            continue;
        }
        summary.products += 1;
        summary.submit += submitter.submit(&product_ref, key, &actions).await;
    }
    Ok(summary)
}
