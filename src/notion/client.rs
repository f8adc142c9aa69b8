//! Authenticated HTTP client for the Notion REST API.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::NotionSection;
use crate::error::{Error, NotionError, Result};
use crate::notion::cache::NotionCache;

const TIMEOUT_SECONDS: u64 = 30;

/// Connection settings for [`NotionClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_key: String,
    pub base_url: String,
    pub api_version: String,
    pub cache_ttl: Duration,
    pub max_retries: usize,
    /// First backoff delay; later retries grow exponentially.
    pub retry_delay: Duration,
    pub timeout: Duration,
}

impl ClientOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        let defaults = NotionSection::default();
        Self {
            api_key: api_key.into(),
            base_url: defaults.base_url,
            api_version: defaults.api_version,
            cache_ttl: Duration::from_secs(defaults.cache_ttl_secs),
            max_retries: defaults.max_retries,
            retry_delay: Duration::from_millis(500),
            timeout: Duration::from_secs(TIMEOUT_SECONDS),
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }
}

/// Notion API client with response caching and retries.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    base_url: String,
    cache: NotionCache,
    max_retries: usize,
    retry_delay: Duration,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl NotionClient {
    pub fn new(options: ClientOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", options.api_key))
            .map_err(|_| Error::Config("Notion API key is not a valid header value".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            "Notion-Version",
            HeaderValue::from_str(&options.api_version)
                .map_err(|_| Error::Config("Invalid Notion API version".into()))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .map_err(NotionError::from)?;

        Ok(Self {
            http,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            cache: NotionCache::with_ttl(options.cache_ttl),
            max_retries: options.max_retries,
            retry_delay: options.retry_delay,
        })
    }

    /// Build a client from the `[notion]` configuration section.
    pub fn from_config(section: &NotionSection) -> Result<Self> {
        let (api_key, _) = section.credentials()?;
        let mut options = ClientOptions::new(api_key)
            .base_url(section.base_url.clone())
            .max_retries(section.max_retries);
        options.api_version = section.api_version.clone();
        options.cache_ttl = Duration::from_secs(section.cache_ttl_secs);
        Self::new(options)
    }

    pub fn cache(&self) -> &NotionCache {
        &self.cache
    }

    /// GET `path` with query parameters; successful responses are cached.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path, query)?;

        if let Some(cached) = self.cache.get(url.as_str()).await {
            debug!(%url, "Notion cache hit");
            return decode(&cached);
        }

        let value = self.send(|| self.http.get(url.clone())).await?;
        let value = self.cache.insert(url.to_string(), value).await;
        decode(&value)
    }

    /// POST a JSON body to `path`. Never cached.
    pub async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let url = self.url(path, &[])?;
        let value = self.send(|| self.http.post(url.clone()).json(body)).await?;
        decode(&value)
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, path);
        let url = if query.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, query)
        };
        url.map_err(|e| Error::Config(format!("Invalid Notion URL {}: {}", raw, e)))
    }

    async fn send<F>(&self, request: F) -> Result<Value>
    where
        F: Fn() -> RequestBuilder,
    {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.retry_delay)
            .with_max_times(self.max_retries);

        let value = (|| async { execute(request()).await })
            .retry(backoff)
            .when(NotionError::is_retryable)
            .notify(|err, delay| {
                warn!(error = %err, ?delay, "Retrying Notion request");
            })
            .await?;

        Ok(value)
    }
}

async fn execute(request: RequestBuilder) -> std::result::Result<Value, NotionError> {
    let response = request.send().await?;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(NotionError::RateLimited);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(parsed) => (parsed.code, parsed.message),
            Err(_) => ("unknown".to_string(), body),
        };
        return Err(NotionError::Api {
            status: status.as_u16(),
            code,
            message,
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| NotionError::Decode(e.to_string()))
}

fn decode<T: DeserializeOwned>(value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|e| NotionError::Decode(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let client = NotionClient::new(ClientOptions::new("secret").base_url("http://localhost:1/"))
            .unwrap();
        let url = client
            .url(
                "/v1/blocks/abc/children",
                &[("page_size", "100".to_string()), ("start_cursor", "a b".to_string())],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:1/v1/blocks/abc/children?page_size=100&start_cursor=a+b"
        );
    }

    #[test]
    fn test_invalid_api_key() {
        let err = NotionClient::new(ClientOptions::new("bad\nkey")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_config_requires_key() {
        let err = NotionClient::from_config(&NotionSection::default()).unwrap_err();
        assert!(err.to_string().contains("NOTION_API_KEY"));
    }
}
