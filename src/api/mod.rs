pub mod models;

#[cfg(test)]
pub(crate) mod fake;

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{StatusCode, Url};
use thiserror::Error;

use crate::utils;
pub use models::{
    Address, Credentials, CustomerPage, CustomerRecord, ListQuery, LoginResponse, PageInfo,
};

pub const LOGIN_PATH: &str = "/api/v1/login";
pub const CUSTOMERS_PATH: &str = "/api/v1/fayda-customers";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authorization rejected (status {status})")]
    AuthRejected { status: u16 },

    #[error("request failed (status {status}): {body}")]
    RequestFailed { status: u16, body: String },

    #[error("network error: {source}")]
    Network {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse response: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    #[error("{message}")]
    LoginRejected { message: String },

    #[error("invalid API base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, ApiError::AuthRejected { .. })
    }
}

/// Remote side of the dashboard: the login exchange and the customer listing.
#[async_trait]
pub trait CustomerApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<String, ApiError>;

    async fn list_customers(&self, token: &str, query: &ListQuery)
        -> Result<CustomerPage, ApiError>;
}

#[derive(Clone, Debug)]
pub struct HttpOptions {
    pub timeout: Duration,
    pub proxy: Option<String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            proxy: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpApi {
    client: reqwest::Client,
    base: String,
}

impl HttpApi {
    pub fn new(api_base: &str, options: &HttpOptions) -> Result<Self, ApiError> {
        let base = utils::normalize_base_url(api_base).ok_or_else(|| ApiError::InvalidBaseUrl {
            url: api_base.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(options.timeout);

        // Proxies are explicit only; environment proxy variables are ignored.
        match options.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(proxy) => {
                let proxy_cfg = reqwest::Proxy::all(proxy).map_err(|e| ApiError::ProxySetup {
                    proxy: proxy.to_string(),
                    source: e,
                })?;
                builder = builder.proxy(proxy_cfg);
            }
            None => builder = builder.no_proxy(),
        }

        let client = builder
            .build()
            .map_err(|source| ApiError::HttpClientBuild { source })?;
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.base, path);
        Url::parse(&raw).map_err(|_| ApiError::InvalidBaseUrl { url: raw })
    }

    pub fn listing_url(&self, query: &ListQuery) -> Result<Url, ApiError> {
        let mut url = self.endpoint(CUSTOMERS_PATH)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.pairs() {
                pairs.append_pair(key, &value);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl CustomerApi for HttpApi {
    async fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let url = self.endpoint(LOGIN_PATH)?;
        debug!("POST {url}");
        let response = self
            .client
            .post(url)
            .form(&[
                ("email", credentials.email.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|source| ApiError::Network { source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Network { source })?;
        let parsed = serde_json::from_str::<LoginResponse>(&body);

        match parsed {
            Ok(LoginResponse {
                access_token: Some(token),
                ..
            }) if status.is_success() && !token.is_empty() => Ok(token),
            Ok(rejected) => Err(ApiError::LoginRejected {
                message: rejected
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Login failed".to_string()),
            }),
            Err(_) if !status.is_success() => Err(ApiError::LoginRejected {
                message: "Login failed".to_string(),
            }),
            Err(source) => Err(ApiError::Parse { source }),
        }
    }

    async fn list_customers(
        &self,
        token: &str,
        query: &ListQuery,
    ) -> Result<CustomerPage, ApiError> {
        let url = self.listing_url(query)?;
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| ApiError::Network { source })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::AuthRejected {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Network { source })?;
        if !status.is_success() {
            return Err(ApiError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<CustomerPage>(&body).map_err(|source| ApiError::Parse { source })
    }
}
