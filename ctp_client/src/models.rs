use std::fmt;

use serde::{Deserialize, Serialize};

/// How a product is addressed in resource paths.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProductRef {
    Key(String),
    Id(String),
}

impl ProductRef {
    /// Path segment below `/{project}/products/`.
    pub fn path_segment(&self) -> String {
        match self {
            ProductRef::Key(key) => format!("key={key}"),
            ProductRef::Id(id) => id.clone(),
        }
    }
}

impl fmt::Display for ProductRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductRef::Key(key) => f.write_str(key),
            ProductRef::Id(id) => f.write_str(id),
        }
    }
}

/// Variant selector for `removeImage`; flattened into the action body as
/// either `sku` or `variantId`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum VariantTarget {
    #[serde(rename = "sku")]
    Sku(String),
    #[serde(rename = "variantId")]
    Id(u64),
}

impl fmt::Display for VariantTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantTarget::Sku(sku) => f.write_str(sku),
            VariantTarget::Id(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum UpdateAction {
    #[serde(rename_all = "camelCase")]
    RemoveImage {
        #[serde(flatten)]
        target: VariantTarget,
        image_url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        staged: Option<bool>,
    },
    Publish,
}

impl UpdateAction {
    pub fn remove_image(target: VariantTarget, image_url: impl Into<String>) -> Self {
        UpdateAction::RemoveImage {
            target,
            image_url: image_url.into(),
            staged: None,
        }
    }

    pub fn remove_staged_image(target: VariantTarget, image_url: impl Into<String>) -> Self {
        UpdateAction::RemoveImage {
            target,
            image_url: image_url.into(),
            staged: Some(true),
        }
    }

    pub fn is_publish(&self) -> bool {
        matches!(self, UpdateAction::Publish)
    }
}

/// One-line description used in the audit trail.
impl fmt::Display for UpdateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateAction::RemoveImage {
                target, image_url, ..
            } => write!(f, "removeImage from variant {target}: {image_url}"),
            UpdateAction::Publish => f.write_str("publish"),
        }
    }
}

/// Body of `POST /{project}/products/{id|key=..}`.
#[derive(Clone, Debug, Serialize)]
pub struct ProductUpdate<'a> {
    pub version: u64,
    pub actions: &'a [UpdateAction],
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub version: u64,
    #[serde(default)]
    pub key: Option<String>,
    pub master_data: ProductCatalogData,
}

impl Product {
    /// Key when the product has one, id otherwise.
    pub fn label(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCatalogData {
    #[serde(default)]
    pub published: bool,
    pub current: ProductData,
    pub staged: ProductData,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductData {
    pub master_variant: ProductVariant,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

impl ProductData {
    /// Master variant first, then the remaining variants in API order.
    pub fn all_variants(&self) -> impl Iterator<Item = &ProductVariant> {
        std::iter::once(&self.master_variant).chain(self.variants.iter())
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: u64,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl ProductVariant {
    /// Prefer the sku, which is stable across environments.
    pub fn target(&self) -> VariantTarget {
        match &self.sku {
            Some(sku) if !sku.is_empty() => VariantTarget::Sku(sku.clone()),
            _ => VariantTarget::Id(self.id),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub url: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedQueryResponse<T> {
    pub limit: u64,
    pub offset: u64,
    pub count: u64,
    #[serde(default)]
    pub total: Option<u64>,
    pub results: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    #[allow(dead_code)]
    #[serde(default)]
    pub scope: Option<String>,
}
