use std::time::{Duration, Instant};

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::CtpConfig;
use crate::error::CtpError;
use crate::models::{PagedQueryResponse, Product, ProductRef, ProductUpdate, TokenResponse, UpdateAction};

/// A cached token is replaced this long before it actually expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// Authenticated handle on one commercetools project. Build it once and pass
/// it by reference; the bearer token is cached and refreshed on expiry.
pub struct CtpClient {
    cfg: CtpConfig,
    http: Client,
    api_base: Url,
    token_url: Url,
    token: Mutex<Option<AccessToken>>,
}

impl CtpClient {
    pub fn new(cfg: CtpConfig) -> Result<Self, CtpError> {
        let api_base = Url::parse(&cfg.api_url)?;
        let token_url = join_segments(Url::parse(&cfg.auth_url)?, &["oauth", "token"])?;
        let user_agent = std::env::var("CTP_USER_AGENT")
            .unwrap_or_else(|_| "catalog-image-sweep/0.1".to_string());
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            cfg,
            http,
            api_base,
            token_url,
            token: Mutex::new(None),
        })
    }

    pub fn project_key(&self) -> &str {
        &self.cfg.project_key
    }

    pub fn products_url(&self) -> Result<Url, CtpError> {
        join_segments(self.api_base.clone(), &[&self.cfg.project_key, "products"])
    }

    pub fn product_url(&self, product: &ProductRef) -> Result<Url, CtpError> {
        join_segments(
            self.api_base.clone(),
            &[&self.cfg.project_key, "products", &product.path_segment()],
        )
    }

    pub async fn get_product(&self, product: &ProductRef) -> Result<Product, CtpError> {
        let url = self.product_url(product)?;
        self.execute(Method::GET, url, None).await
    }

    /// One page of the product query endpoint, with `total` requested.
    pub async fn query_products(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<PagedQueryResponse<Product>, CtpError> {
        let mut url = self.products_url()?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string())
            .append_pair("withTotal", "true");
        self.execute(Method::GET, url, None).await
    }

    /// Apply `actions` against `version`. The platform rejects a stale version
    /// with 409 (see [`CtpError::is_conflict`]).
    pub async fn update_product(
        &self,
        product: &ProductRef,
        version: u64,
        actions: &[UpdateAction],
    ) -> Result<Product, CtpError> {
        let url = self.product_url(product)?;
        let body = serde_json::to_value(ProductUpdate { version, actions })?;
        self.execute(Method::POST, url, Some(&body)).await
    }

    async fn access_token(&self) -> Result<String, CtpError> {
        {
            let guard = self.token.lock().await;
            if let Some(token) = guard.as_ref() {
                if token.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN {
                    return Ok(token.value.clone());
                }
            }
        }
        let token = self.request_new_token().await?;
        let mut guard = self.token.lock().await;
        *guard = Some(token.clone());
        Ok(token.value)
    }

    async fn request_new_token(&self) -> Result<AccessToken, CtpError> {
        let scope = self.cfg.scopes.join(" ");
        let response = self
            .http
            .post(self.token_url.clone())
            .basic_auth(&self.cfg.client_id, Some(&self.cfg.client_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", scope.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CtpError::from_response(status.as_u16(), &text));
        }
        let token: TokenResponse = response.json().await?;
        info!(target = "ctp", project = %self.cfg.project_key, expires_in = token.expires_in, "access token acquired");
        Ok(AccessToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }

    async fn execute<T>(&self, method: Method, url: Url, body: Option<&Value>) -> Result<T, CtpError>
    where
        T: DeserializeOwned,
    {
        let retry = &self.cfg.retry;
        let mut attempt = 0u32;
        let mut reauthorized = false;
        loop {
            let token = self.access_token().await?;
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .bearer_auth(&token);
            if let Some(body) = body {
                request = request.json(body);
            }
            debug!(target = "ctp", %method, %url, attempt, "request");

            match request.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let text = resp.text().await?;
                        return Ok(serde_json::from_str(&text)?);
                    }

                    if status == StatusCode::UNAUTHORIZED && !reauthorized {
                        // token revoked or expired early
                        *self.token.lock().await = None;
                        reauthorized = true;
                        continue;
                    }

                    let code = status.as_u16();
                    let text = resp.text().await.unwrap_or_default();
                    if retry.should_retry(code) && attempt < retry.max_retries {
                        let wait = retry.delay_ms(attempt);
                        warn!(target = "ctp", %method, %url, status = code, attempt, wait_ms = wait, "transient response, retrying");
                        tokio::time::sleep(Duration::from_millis(wait)).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(CtpError::from_response(code, &text));
                }
                Err(err) => {
                    if attempt >= retry.max_retries {
                        return Err(err.into());
                    }
                    let wait = retry.delay_ms(attempt);
                    warn!(target = "ctp", %method, %url, error = %err, attempt, wait_ms = wait, "network error, retrying");
                    tokio::time::sleep(Duration::from_millis(wait)).await;
                    attempt += 1;
                }
            }
        }
    }
}

fn join_segments(mut base: Url, segments: &[&str]) -> Result<Url, CtpError> {
    let shown = base.to_string();
    base.path_segments_mut()
        .map_err(|_| CtpError::Config(format!("{shown} cannot be used as a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(base)
}
