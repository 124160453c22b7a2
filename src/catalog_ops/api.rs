use async_trait::async_trait;
use ctp_client::{CtpClient, CtpError, PagedQueryResponse, Product, ProductRef, UpdateAction};

/// The slice of the platform API the sweep jobs need. Implemented by
/// [`CtpClient`]; tests substitute a recording fake.
#[async_trait]
pub trait ProductApi: Send + Sync {
    async fn fetch_product(&self, product: &ProductRef) -> Result<Product, CtpError>;

    async fn fetch_page(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<PagedQueryResponse<Product>, CtpError>;

    async fn update_product(
        &self,
        product: &ProductRef,
        version: u64,
        actions: &[UpdateAction],
    ) -> Result<(), CtpError>;

    /// Current optimistic-concurrency version of `product`.
    async fn fetch_version(&self, product: &ProductRef) -> Result<u64, CtpError> {
        Ok(self.fetch_product(product).await?.version)
    }
}

#[async_trait]
impl ProductApi for CtpClient {
    async fn fetch_product(&self, product: &ProductRef) -> Result<Product, CtpError> {
        self.get_product(product).await
    }

    async fn fetch_page(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<PagedQueryResponse<Product>, CtpError> {
        self.query_products(limit, offset).await
    }

    async fn update_product(
        &self,
        product: &ProductRef,
        version: u64,
        actions: &[UpdateAction],
    ) -> Result<(), CtpError> {
        CtpClient::update_product(self, product, version, actions)
            .await
            .map(|_| ())
    }
}
