//! Client for the carousel generation and image search service.
//!
//! The service is an external collaborator: every call is a single fallible
//! HTTP request and failures are propagated to the caller without retries.

use std::time::Duration;

use async_trait::async_trait;
use carousel_core::SlideContent;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

/// Request timeout for every call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Keys a list payload may be wrapped under.
const LIST_KEYS: &[&str] = &["results", "data", "images", "slides", "items"];

/// Keys an image entry may carry its URL under.
const URL_KEYS: &[&str] = &["url", "src", "image_url", "media_url"];

/// One generated slide row.
pub type CarouselResult = SlideContent;

/// Errors that can occur when talking to the generation service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL is invalid.
    #[error("invalid service URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed (connection, timeout, etc.).
    #[error("service request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// JSON parsing failed.
    #[error("failed to parse service payload: {0}")]
    Json(#[from] serde_json::Error),
    /// The response did not have the expected structure.
    #[error("unexpected service response: {0}")]
    UnexpectedResponse(String),
    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },
}

/// Source of replacement media.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Image URLs matching a keyword, best match first.
    async fn search_images(&self, keyword: &str) -> Result<Vec<String>, ClientError>;
}

/// Asynchronous client for the generation/search service.
#[derive(Debug, Clone)]
pub struct StudioClient {
    http: Client,
    base: Url,
}

impl StudioClient {
    /// Create a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the URL is malformed.
    /// Returns [`ClientError::Http`] if the HTTP client fails to build.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ClientError> {
        let mut base =
            Url::parse(base_url.as_ref()).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!(
                "{} cannot be used as a base URL",
                base_url.as_ref()
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .user_agent(format!("carousel-studio/{}", crate::VERSION))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { http, base })
    }

    /// The service base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    /// Generate slide rows for a carousel.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is not a list of
    /// slide rows.
    pub async fn generate_carousel(
        &self,
        code: &str,
        template_id: &str,
    ) -> Result<Vec<CarouselResult>, ClientError> {
        let url = self.endpoint("carousels/generate")?;
        tracing::debug!("Generating carousel {code} with template {template_id}");
        let response = self
            .http
            .post(url)
            .json(&json!({ "code": code, "template_id": template_id }))
            .send()
            .await?;
        let payload: Value = check_status(response).await?.json().await?;
        let rows = list_payload(payload)?
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<CarouselResult>, _>>()?;
        tracing::info!("Generated {} slides", rows.len());
        Ok(rows)
    }

    /// Search for image URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload has no URLs.
    pub async fn search_images(&self, keyword: &str) -> Result<Vec<String>, ClientError> {
        let mut url = self.endpoint("images/search")?;
        url.query_pairs_mut().append_pair("q", keyword);
        let response = self.http.get(url).send().await?;
        let payload: Value = check_status(response).await?.json().await?;
        let urls: Vec<String> = list_payload(payload)?
            .iter()
            .filter_map(image_url)
            .collect();
        tracing::debug!("Search for {keyword:?} returned {} images", urls.len());
        Ok(urls)
    }

    /// Fetch a template's markup.
    ///
    /// A JSON body is accepted when it carries the markup under `html` or
    /// `template`; anything else is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn fetch_template(&self, template_id: &str) -> Result<String, ClientError> {
        let url = self.endpoint(&format!("templates/{template_id}"))?;
        let response = check_status(self.http.get(url).send().await?).await?;
        let body = response.text().await?;
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&body) {
            return ["html", "template"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::to_string)
                .ok_or_else(|| {
                    ClientError::UnexpectedResponse("template JSON has no markup".to_string())
                });
        }
        Ok(body)
    }
}

#[async_trait]
impl MediaSource for StudioClient {
    async fn search_images(&self, keyword: &str) -> Result<Vec<String>, ClientError> {
        StudioClient::search_images(self, keyword).await
    }
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body: body.chars().take(512).collect(),
    })
}

/// Accept a bare array or an object wrapping one under a known key.
fn list_payload(payload: Value) -> Result<Vec<Value>, ClientError> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => LIST_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| {
                ClientError::UnexpectedResponse(format!(
                    "expected a list under one of {LIST_KEYS:?}"
                ))
            }),
        other => Err(ClientError::UnexpectedResponse(format!(
            "expected a list, got {other}"
        ))),
    }
}

fn image_url(entry: &Value) -> Option<String> {
    match entry {
        Value::String(url) => Some(url.clone()),
        Value::Object(map) => URL_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}
