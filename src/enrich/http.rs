// src/enrich/http.rs
//! GET helper shared by third-party clients.
//!
//! The base URL and key are immutable; every call builds its own request URL,
//! so concurrent lookups through one client never wait on each other.

use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = "travel-article-headings";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("client ({endpoint}) responds with too many requests error")]
    TooManyRequests { endpoint: String },

    /// The API key was refused. No later call with the same key can succeed.
    #[error("client ({endpoint}) rejected credentials: HTTP status = {status}")]
    Unauthorized { endpoint: String, status: u16 },

    #[error("failure to retrieve data from {endpoint}: HTTP status = {status}")]
    Status { endpoint: String, status: u16 },

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, FetchError::Unauthorized { .. })
    }
}

#[derive(Clone)]
pub struct ApiEndpoint {
    http: Client,
    base: Url,
    api_key: String,
    /// Query parameter carrying the key (`apiKey`, `key`, ...).
    key_param: &'static str,
}

impl ApiEndpoint {
    pub fn new(base_url: &str, api_key: &str, key_param: &'static str) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("parsing url {base_url}"))?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .context("building http client")?;
        Ok(Self {
            http,
            base,
            api_key: api_key.to_string(),
            key_param,
        })
    }

    /// Base URL without query; safe to log.
    pub fn endpoint(&self) -> &str {
        self.base.as_str()
    }

    /// Fresh URL for one call: base + `query` + key.
    pub fn request_url(&self, query: &[(&str, &str)]) -> Url {
        let mut url = self.base.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
            pairs.append_pair(self.key_param, &self.api_key);
        }
        url
    }

    pub async fn get_bytes(&self, query: &[(&str, &str)]) -> Result<Vec<u8>, FetchError> {
        let endpoint = self.endpoint().to_string();
        let res = self
            .http
            .get(self.request_url(query))
            .header(ACCEPT, "application/json")
            .header(ACCEPT_LANGUAGE, "en-GB, en-US")
            .header(CACHE_CONTROL, "max-age=0")
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        match res.status() {
            StatusCode::OK => {}
            StatusCode::TOO_MANY_REQUESTS => return Err(FetchError::TooManyRequests { endpoint }),
            s @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                return Err(FetchError::Unauthorized {
                    endpoint,
                    status: s.as_u16(),
                })
            }
            s => {
                return Err(FetchError::Status {
                    endpoint,
                    status: s.as_u16(),
                })
            }
        }

        let body = res
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;
        Ok(body.to_vec())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, query: &[(&str, &str)]) -> Result<T, FetchError> {
        let body = self.get_bytes(query).await?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            endpoint: self.endpoint().to_string(),
            source,
        })
    }
}
