use std::time::Duration;

use imagegen_core::{extract_image_source, GenerationRequest, ImageSource};
use imagegen_logging::{imagegen_debug, imagegen_info, imagegen_warn};
use serde::Serialize;

use crate::{FailureKind, GenerationError};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/images/generations";
pub const DEFAULT_MODEL: &str = "gpt-image-1";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub connect_timeout: Duration,
    /// Whole-request timeout. `None` leaves it to the transport.
    pub request_timeout: Option<Duration>,
}

impl ClientSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }
}

#[async_trait::async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<ImageSource, GenerationError>;
}

#[derive(Debug, Serialize)]
struct ImageRequestBody<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'static str,
    quality: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'a str>,
}

impl<'a> ImageRequestBody<'a> {
    fn new(model: &'a str, request: &'a GenerationRequest) -> Self {
        Self {
            model,
            prompt: request.prompt(),
            size: request.size().as_str(),
            quality: request.quality().as_str(),
            negative_prompt: request.negative_prompt(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestImageGenerator {
    settings: ClientSettings,
}

impl ReqwestImageGenerator {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, GenerationError> {
        let mut builder = reqwest::Client::builder().connect_timeout(self.settings.connect_timeout);
        if let Some(timeout) = self.settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|err| GenerationError::new(FailureKind::Network, err.to_string()))
    }
}

#[async_trait::async_trait]
impl ImageGenerator for ReqwestImageGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<ImageSource, GenerationError> {
        let endpoint = reqwest::Url::parse(&self.settings.endpoint)
            .map_err(|err| GenerationError::new(FailureKind::InvalidEndpoint, err.to_string()))?;
        let client = self.build_client()?;
        let body = ImageRequestBody::new(&self.settings.model, request);

        imagegen_info!(
            "POST {} model={} size={} quality={}",
            endpoint,
            body.model,
            body.size,
            body.quality
        );

        let response = client
            .post(endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            imagegen_warn!("image api returned {}", status);
            return Err(GenerationError::new(
                FailureKind::HttpStatus(status.as_u16()),
                failure_message(status.as_u16(), &text),
            ));
        }

        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|err| GenerationError::new(FailureKind::InvalidResponse, err.to_string()))?;
        let source = extract_image_source(&value).map_err(|err| {
            GenerationError::new(FailureKind::UnrecognizedResponseShape, err.to_string())
        })?;
        imagegen_debug!("image api answered with remote={}", source.is_remote());
        Ok(source)
    }
}

/// Raw response text when there is any, a generic line otherwise.
fn failure_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("Request failed with status {status}")
    } else {
        body.to_string()
    }
}

fn map_reqwest_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        return GenerationError::new(FailureKind::Timeout, err.to_string());
    }
    GenerationError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn body_omits_missing_negative_prompt() {
        let request = GenerationRequest::from_form("a cat", "", "1:1", 2.0).unwrap();
        let body = serde_json::to_value(ImageRequestBody::new("gpt-image-1", &request)).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-image-1",
                "prompt": "a cat",
                "size": "1024x1024",
                "quality": "low",
            })
        );
    }

    #[test]
    fn failure_message_prefers_body() {
        assert_eq!(failure_message(500, "  upstream broke \n"), "upstream broke");
        assert_eq!(failure_message(502, ""), "Request failed with status 502");
    }
}
