use anyhow::Result;
use ctp_client::ProductRef;
use tracing::info;

use super::RunSummary;
use crate::catalog_ops::planner;
use crate::catalog_ops::{AuditLog, BatchSubmitter, ProductApi};

pub const PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone)]
pub struct RemoveNumberedImagesConfig {
    pub dry_run: bool,
    pub page_size: u64,
}

impl Default for RemoveNumberedImagesConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            page_size: PAGE_SIZE,
        }
    }
}

/// Walk the whole catalog and remove auto-numbered duplicate images, e.g.
/// `photo(2).jpg`, from staged data. A page that cannot be fetched stops the
/// walk; per-product update failures do not.
pub async fn run<A>(
    api: &A,
    log: &AuditLog,
    cfg: &RemoveNumberedImagesConfig,
) -> Result<RunSummary>
where
    A: ProductApi + ?Sized,
{
    let page_size = cfg.page_size.max(1);
    let submitter = BatchSubmitter::new(api, log, cfg.dry_run);
    let mut summary = RunSummary::default();
    let mut offset = 0u64;

    loop {
        let page = match api.fetch_page(page_size, offset).await {
            Ok(page) => page,
            Err(err) => {
                log.failure(format!("Failed to fetch products: {err}"));
                summary.fetch_failures += 1;
                break;
            }
        };
        let fetched = page.results.len() as u64;
        info!(target = "remove_numbered_images", offset, fetched, total = ?page.total, "page loaded");

        for product in &page.results {
            summary.scanned += 1;
            let actions = planner::plan_numbered(product);
            if actions.is_empty() {
                continue;
            }
            summary.products += 1;
            summary.submit += submitter
                .submit(&ProductRef::Id(product.id.clone()), product.label(), &actions)
                .await;
        }

        offset += fetched;
        let has_more = match page.total {
            Some(total) => offset < total,
            None => fetched == page_size,
        };
        if fetched == 0 || !has_more {
            break;
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_ops::fake::{product, variant, Call, FakeCatalog};
    use ctp_client::{Product, UpdateAction, VariantTarget};
    use std::fs;

    fn plain(i: usize) -> Product {
        product(
            &format!("id-{i}"),
            Some(format!("KEY-{i}").as_str()),
            true,
            vec![variant(1, Some("M"), &[])],
            vec![variant(1, Some("M"), &["https://cdn/clean.jpg"])],
        )
    }

    fn numbered() -> Product {
        product(
            "p123",
            None,
            true,
            vec![variant(1, Some("M"), &[])],
            vec![
                variant(1, Some("M"), &["https://cdn/p/photo.jpg"]),
                variant(7, Some("V7"), &["https://cdn/p/photo(2).jpg"]),
            ],
        )
    }

    #[tokio::test]
    async fn finds_numbered_staged_image_and_submits_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("output.log"));
        let api = FakeCatalog::new(vec![plain(0), numbered(), plain(2)]);

        let summary = run(&api, &log, &RemoveNumberedImagesConfig::default())
            .await
            .unwrap();

        assert_eq!(summary.scanned, 3);
        assert_eq!(summary.products, 1);
        let updates = api.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, ProductRef::Id("p123".into()));
        assert_eq!(
            updates[0].2,
            vec![UpdateAction::remove_staged_image(
                VariantTarget::Id(7),
                "https://cdn/p/photo(2).jpg"
            )]
        );
        let text = fs::read_to_string(log.path()).unwrap();
        assert!(text.contains("[LIVE] Product p123, Batch 1:\n"));
        assert!(text.contains("Successfully updated product p123, Batch 1\n"));
    }

    #[tokio::test]
    async fn paginates_until_total_is_reached() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("output.log"));
        let products: Vec<Product> = (0..5).map(plain).collect();
        let api = FakeCatalog::new(products);

        let summary = run(
            &api,
            &log,
            &RemoveNumberedImagesConfig {
                dry_run: true,
                page_size: 2,
            },
        )
        .await
        .unwrap();

        assert_eq!(summary.scanned, 5);
        let pages: Vec<Call> = api.calls();
        assert_eq!(
            pages,
            vec![
                Call::Page { limit: 2, offset: 0 },
                Call::Page { limit: 2, offset: 2 },
                Call::Page { limit: 2, offset: 4 },
            ]
        );
    }

    #[tokio::test]
    async fn paginates_without_total_until_short_page() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("output.log"));
        let api = FakeCatalog::new((0..4).map(plain).collect()).without_total();

        let summary = run(
            &api,
            &log,
            &RemoveNumberedImagesConfig {
                dry_run: true,
                page_size: 2,
            },
        )
        .await
        .unwrap();

        assert_eq!(summary.scanned, 4);
        // third request comes back empty
        assert_eq!(api.calls().len(), 3);
    }

    #[tokio::test]
    async fn page_failure_halts_pagination() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("output.log"));
        let api = FakeCatalog::new((0..5).map(plain).collect()).fail_page_at(2);

        let summary = run(
            &api,
            &log,
            &RemoveNumberedImagesConfig {
                dry_run: false,
                page_size: 2,
            },
        )
        .await
        .unwrap();

        assert_eq!(summary.scanned, 2);
        assert_eq!(summary.fetch_failures, 1);
        assert_eq!(api.calls().len(), 2);
        assert_eq!(
            fs::read_to_string(log.path()).unwrap(),
            "Failed to fetch products: http 502: Bad Gateway\n"
        );
    }

    #[tokio::test]
    async fn update_conflict_does_not_stop_the_scan() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("output.log"));
        let mut second = numbered();
        second.id = "p456".into();
        let api = FakeCatalog::new(vec![numbered(), second]).conflict_on_update(1);

        let summary = run(&api, &log, &RemoveNumberedImagesConfig::default())
            .await
            .unwrap();

        assert_eq!(summary.submit.failed, 1);
        assert_eq!(summary.submit.succeeded, 1);
        let text = fs::read_to_string(log.path()).unwrap();
        assert!(text.contains("Failed to update product p123, Batch 1: http 409"));
        assert!(text.contains("Successfully updated product p456, Batch 1"));
    }
}
