//! HTTP client for the finance backend.

use super::util::{check_status, read_json};
use crate::core::backtest::{BacktestApi, BacktestRequest, BacktestResult};
use crate::core::config::BackendConfig;
use crate::core::error::{ClientError, Result};
use crate::core::link::{AccessGrant, LinkApi};
use crate::core::profile::{DatasetApi, DatasetUpload};
use crate::core::snapshot::{NetWorth, SnapshotApi, Transaction};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct LinkTokenResponse {
    link_token: String,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    access_token: String,
    item_id: String,
}

#[derive(Deserialize)]
struct TransactionsResponse {
    transactions: Vec<Transaction>,
}

/// Talks to the backend over JSON/HTTP.
///
/// The underlying client keeps a cookie store, so the session cookie set when
/// the access token is stored is sent with later credentialed calls.
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("finlink/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(BackendClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        read_json(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self.client.post(&url).json(body).send().await?;
        read_json(response).await
    }

    #[instrument(name = "BackendHealth", skip(self))]
    pub async fn health(&self) -> Result<HealthStatus> {
        self.get_json("/api/health").await
    }
}

#[async_trait]
impl LinkApi for BackendClient {
    #[instrument(name = "CreateLinkToken", skip(self))]
    async fn create_link_token(&self, user_id: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Request<'a> {
            user_id: &'a str,
        }

        let response: LinkTokenResponse = self
            .post_json("/api/plaid/create_link_token", &Request { user_id })
            .await?;
        Ok(response.link_token)
    }

    #[instrument(name = "ExchangePublicToken", skip(self, public_token))]
    async fn exchange_public_token(
        &self,
        public_token: &str,
        user_id: &str,
        institution_id: &str,
    ) -> Result<AccessGrant> {
        #[derive(Serialize)]
        struct Request<'a> {
            public_token: &'a str,
            user_id: &'a str,
            institution_id: &'a str,
        }

        let response: ExchangeResponse = self
            .post_json(
                "/api/plaid/exchange_public_token",
                &Request {
                    public_token,
                    user_id,
                    institution_id,
                },
            )
            .await?;
        Ok(AccessGrant::new(&response.access_token, &response.item_id))
    }

    #[instrument(name = "StoreAccessToken", skip(self, grant), fields(item_id = %grant.item_id))]
    async fn store_access_token(
        &self,
        user_id: &str,
        grant: &AccessGrant,
        institution_id: &str,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct Request<'a> {
            user_id: &'a str,
            access_token: &'a str,
            item_id: &'a str,
            institution_id: &'a str,
        }

        let url = self.url("/api/plaid/store_access_token");
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(&Request {
                user_id,
                access_token: grant.access_token.expose_secret(),
                item_id: &grant.item_id,
                institution_id,
            })
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    #[instrument(name = "CheckSession", skip(self))]
    async fn check_session(&self) -> Result<()> {
        let url = self.url("/api/auth/check");
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotApi for BackendClient {
    #[instrument(name = "FetchTransactions", skip(self))]
    async fn fetch_transactions(&self) -> Result<Vec<Transaction>> {
        let response: TransactionsResponse = self.get_json("/api/transactions").await?;
        Ok(response.transactions)
    }

    #[instrument(name = "FetchNetWorth", skip(self))]
    async fn fetch_net_worth(&self) -> Result<NetWorth> {
        self.get_json("/api/net-worth").await
    }
}

#[async_trait]
impl BacktestApi for BackendClient {
    #[instrument(name = "RunBacktest", skip(self), fields(symbol = %request.symbol))]
    async fn run_backtest(&self, request: &BacktestRequest) -> Result<BacktestResult> {
        request.validate()?;
        self.post_json("/api/trading/backtest", request).await
    }
}

#[async_trait]
impl DatasetApi for BackendClient {
    #[instrument(name = "UploadDataset", skip(self), fields(path = %path.display()))]
    async fn upload_dataset(&self, path: &Path) -> Result<DatasetUpload> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ClientError::Validation(format!("Failed to read dataset {}: {e}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset.csv".to_string());

        let part = Part::bytes(bytes).file_name(file_name).mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        let url = self.url("/upload-dataset");
        debug!("POST {}", url);
        let response = self.client.post(&url).multipart(form).send().await?;
        read_json(response).await
    }
}
