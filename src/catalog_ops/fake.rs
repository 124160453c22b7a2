//! In-memory `ProductApi` that records every call, for unit tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use ctp_client::{
    CtpError, Image, PagedQueryResponse, Product, ProductCatalogData, ProductData, ProductRef,
    ProductVariant, UpdateAction,
};

use super::api::ProductApi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch(ProductRef),
    Page { limit: u64, offset: u64 },
    Update {
        product: ProductRef,
        version: u64,
        actions: Vec<UpdateAction>,
    },
}

#[derive(Default)]
pub struct FakeCatalog {
    products: Mutex<Vec<Product>>,
    calls: Mutex<Vec<Call>>,
    /// 1-based ordinals of update calls that should fail with a 409.
    conflicting_updates: HashSet<usize>,
    failing_page_offsets: HashSet<u64>,
    failing_fetches: HashSet<String>,
    report_total: bool,
}

impl FakeCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
            report_total: true,
            ..Self::default()
        }
    }

    pub fn conflict_on_update(mut self, ordinal: usize) -> Self {
        self.conflicting_updates.insert(ordinal);
        self
    }

    pub fn fail_page_at(mut self, offset: u64) -> Self {
        self.failing_page_offsets.insert(offset);
        self
    }

    /// Fail direct fetches of the product with this key or id.
    pub fn fail_fetch_of(mut self, key_or_id: &str) -> Self {
        self.failing_fetches.insert(key_or_id.to_string());
        self
    }

    pub fn without_total(mut self) -> Self {
        self.report_total = false;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(ProductRef, u64, Vec<UpdateAction>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update {
                    product,
                    version,
                    actions,
                } => Some((product, version, actions)),
                _ => None,
            })
            .collect()
    }

    pub fn fetch_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Fetch(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn find(&self, product: &ProductRef) -> Option<Product> {
        let products = self.products.lock().unwrap();
        products
            .iter()
            .find(|p| matches_ref(p, product))
            .cloned()
    }
}

fn matches_ref(p: &Product, product: &ProductRef) -> bool {
    match product {
        ProductRef::Key(key) => p.key.as_deref() == Some(key.as_str()),
        ProductRef::Id(id) => &p.id == id,
    }
}

fn not_found(product: &ProductRef) -> CtpError {
    CtpError::Http {
        status: 404,
        message: format!("The Resource with key '{product}' was not found."),
    }
}

#[async_trait]
impl ProductApi for FakeCatalog {
    async fn fetch_product(&self, product: &ProductRef) -> Result<Product, CtpError> {
        self.record(Call::Fetch(product.clone()));
        if self.failing_fetches.contains(&product.to_string()) {
            return Err(CtpError::Http {
                status: 503,
                message: "Service Unavailable".into(),
            });
        }
        self.find(product).ok_or_else(|| not_found(product))
    }

    async fn fetch_page(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<PagedQueryResponse<Product>, CtpError> {
        self.record(Call::Page { limit, offset });
        if self.failing_page_offsets.contains(&offset) {
            return Err(CtpError::Http {
                status: 502,
                message: "Bad Gateway".into(),
            });
        }
        let products = self.products.lock().unwrap();
        let results: Vec<Product> = products
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(PagedQueryResponse {
            limit,
            offset,
            count: results.len() as u64,
            total: self.report_total.then_some(products.len() as u64),
            results,
        })
    }

    async fn update_product(
        &self,
        product: &ProductRef,
        version: u64,
        actions: &[UpdateAction],
    ) -> Result<(), CtpError> {
        self.record(Call::Update {
            product: product.clone(),
            version,
            actions: actions.to_vec(),
        });
        let ordinal = self
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Update { .. }))
            .count();
        if self.conflicting_updates.contains(&ordinal) {
            return Err(CtpError::Http {
                status: 409,
                message: format!(
                    "Object {product} has a different version than expected. Expected: {version}."
                ),
            });
        }
        let mut products = self.products.lock().unwrap();
        let stored = products
            .iter_mut()
            .find(|p| matches_ref(p, product))
            .ok_or_else(|| not_found(product))?;
        if stored.version != version {
            return Err(CtpError::Http {
                status: 409,
                message: format!(
                    "Object {product} has a different version than expected. Expected: {version} - Actual: {}.",
                    stored.version
                ),
            });
        }
        stored.version += 1;
        Ok(())
    }
}

pub fn variant(id: u64, sku: Option<&str>, urls: &[&str]) -> ProductVariant {
    ProductVariant {
        id,
        sku: sku.map(str::to_owned),
        images: urls
            .iter()
            .map(|u| Image {
                url: (*u).to_string(),
            })
            .collect(),
    }
}

/// First entry of each variant list is the master variant.
pub fn product(
    id: &str,
    key: Option<&str>,
    published: bool,
    current: Vec<ProductVariant>,
    staged: Vec<ProductVariant>,
) -> Product {
    fn data(mut variants: Vec<ProductVariant>) -> ProductData {
        let master_variant = if variants.is_empty() {
            variant(1, None, &[])
        } else {
            variants.remove(0)
        };
        ProductData {
            master_variant,
            variants,
        }
    }
    Product {
        id: id.to_string(),
        version: 1,
        key: key.map(str::to_owned),
        master_data: ProductCatalogData {
            published,
            current: data(current),
            staged: data(staged),
        },
    }
}
