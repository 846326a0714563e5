use crate::traits::DiscoveryBackend;
use crate::types::{
    CityTiers, ClientConfig, DiscoveryError, DiscoveryStatus, Lead, LeadStats, Result, StartRequest,
    StartResponse, StopResponse,
};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// JSON-over-HTTP client for the discovery backend.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true);
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        let base_url = api_base_url(&config.base_url)?;
        debug!("Discovery backend at {}", base_url);

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path)?;
        Ok(self.client.request(method, url))
    }

    async fn send<T: DeserializeOwned>(&self, method: Method, path: &str, request: RequestBuilder) -> Result<T> {
        let start_time = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        debug!(
            "{} /{} -> {} in {}ms",
            method,
            path,
            status.as_u16(),
            start_time.elapsed().as_millis()
        );

        if !status.is_success() {
            let detail = error_detail(response).await;
            warn!("{} /{} failed with {}: {}", method, path, status.as_u16(), detail);
            return Err(DiscoveryError::Backend {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let request = self.request(Method::GET, path)?.query(query);
        self.send(Method::GET, path, request).await
    }
}

#[async_trait]
impl DiscoveryBackend for HttpBackend {
    async fn status(&self) -> Result<DiscoveryStatus> {
        self.get("status", &[]).await
    }

    async fn start(&self, request: &StartRequest) -> Result<StartResponse> {
        let builder = self.request(Method::POST, "start")?.json(request);
        self.send(Method::POST, "start", builder).await
    }

    async fn stop(&self) -> Result<StopResponse> {
        let builder = self.request(Method::POST, "stop")?;
        self.send(Method::POST, "stop", builder).await
    }

    async fn leads(&self, run_id: &str) -> Result<Vec<Lead>> {
        self.get("leads", &[("run_id", run_id)]).await
    }

    async fn countries(&self) -> Result<Vec<String>> {
        self.get("countries", &[]).await
    }

    async fn categories(&self) -> Result<Vec<String>> {
        self.get("categories", &[]).await
    }

    async fn cities(&self, country: &str) -> Result<CityTiers> {
        self.get("cities", &[("country", country)]).await
    }

    async fn stats(&self) -> Result<LeadStats> {
        self.get("stats", &[]).await
    }
}

/// Normalise a host-provided URL so it points at the `/api` prefix and ends
/// with a slash, which `Url::join` needs to keep the prefix.
pub fn api_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(DiscoveryError::InvalidInput("backend URL is empty".to_string()));
    }

    let with_prefix = if trimmed.ends_with("/api") {
        format!("{}/", trimmed)
    } else {
        format!("{}/api/", trimmed)
    };

    let url = Url::parse(&with_prefix)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(DiscoveryError::InvalidInput(format!(
            "unsupported backend URL scheme: {}",
            url.scheme()
        )));
    }
    Ok(url)
}

// FastAPI reports failures as {"detail": "..."}; fall back to the raw body.
async fn error_detail(response: Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    let detail = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|value| match value.get("detail") {
            Some(serde_json::Value::String(detail)) => Some(detail.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        })
        .unwrap_or(text);

    if detail.trim().is_empty() {
        status.canonical_reason().unwrap_or("Unknown").to_string()
    } else {
        detail
    }
}
