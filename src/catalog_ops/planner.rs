//! Turns CSV rows or live product state into ordered update actions.
//!
//! Mutations always come first; a `publish` action, when present, is last.

use std::sync::OnceLock;

use ctp_client::{Product, UpdateAction, VariantTarget};
use indexmap::IndexMap;
use regex::Regex;

use super::input::ImageRow;

/// Product key -> ordered actions, in first-appearance order.
pub type ProductActionSet = IndexMap<String, Vec<UpdateAction>>;

static NUMBERED_IMAGE: OnceLock<Regex> = OnceLock::new();

/// One `removeImage` per row (by sku), then an unconditional `publish` per
/// product.
pub fn plan_flat(rows: &[ImageRow]) -> ProductActionSet {
    let mut set = ProductActionSet::new();
    for row in rows {
        set.entry(row.product_key.clone())
            .or_default()
            .push(UpdateAction::remove_image(
                VariantTarget::Sku(row.variant_key.clone()),
                row.image_url.clone(),
            ));
    }
    for actions in set.values_mut() {
        actions.push(UpdateAction::Publish);
    }
    set
}

/// Remove each row's image from the master variant and every other variant
/// of the product's current data, skipping (variant, url) pairs already
/// planned. `publish` is appended only when the product is already published.
///
/// Deduplication only looks at the list being built; the images actually
/// present on the variants are not consulted.
pub fn plan_checked(product: &Product, rows: &[ImageRow]) -> Vec<UpdateAction> {
    let mut actions = Vec::new();
    for row in rows {
        for variant in product.master_data.current.all_variants() {
            push_unique(
                &mut actions,
                UpdateAction::remove_image(variant.target(), row.image_url.clone()),
            );
        }
    }
    if product.master_data.published {
        actions.push(UpdateAction::Publish);
    }
    actions
}

/// Staged-only cleanup of auto-numbered duplicates such as `photo(2).jpg`.
/// Never publishes.
pub fn plan_numbered(product: &Product) -> Vec<UpdateAction> {
    product
        .master_data
        .staged
        .all_variants()
        .flat_map(|variant| {
            variant
                .images
                .iter()
                .filter(|image| has_number_in_parentheses(&image.url))
                .map(move |image| {
                    UpdateAction::remove_staged_image(VariantTarget::Id(variant.id), image.url.clone())
                })
        })
        .collect()
}

/// True when the URL contains one or more digits wrapped in parentheses.
pub fn has_number_in_parentheses(url: &str) -> bool {
    NUMBERED_IMAGE
        .get_or_init(|| Regex::new(r"\(\d+\)").expect("static pattern"))
        .is_match(url)
}

fn push_unique(actions: &mut Vec<UpdateAction>, action: UpdateAction) -> bool {
    if actions.contains(&action) {
        return false;
    }
    actions.push(action);
    true
}
