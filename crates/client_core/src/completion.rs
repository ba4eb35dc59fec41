//! HTTP client for the chat-completion endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{CompletionRequest, CompletionResponse};
use tracing::{debug, info};
use url::Url;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// One request, one response. No retries.
    async fn complete(&self, request: &CompletionRequest) -> ClientResult<CompletionResponse>;
}

#[derive(Debug, Clone)]
pub struct EndpointSettings {
    pub url: Url,
    /// Sent as a bearer token when set; key-holding proxies need none.
    pub api_key: Option<String>,
    pub request_timeout: Duration,
}

impl EndpointSettings {
    pub fn new(url: &str) -> ClientResult<Self> {
        let url = Url::parse(url.trim()).map_err(|err| {
            ClientError::Validation(format!("invalid completion url '{url}': {err}"))
        })?;
        Ok(Self {
            url,
            api_key: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }
}

pub struct HttpCompletionClient {
    http: Client,
    settings: EndpointSettings,
}

impl HttpCompletionClient {
    pub fn new(settings: EndpointSettings) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::fetch(settings.url.as_str(), err))?;
        Ok(Self { http, settings })
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> ClientResult<CompletionResponse> {
        let target = self.settings.url.as_str();
        debug!(
            endpoint = target,
            model = %request.model,
            messages = request.messages.len(),
            "posting completion request"
        );

        let mut builder = self.http.post(self.settings.url.clone()).json(request);
        if let Some(api_key) = &self.settings.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let body = builder
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|err| ClientError::fetch(target, err))?
            .text()
            .await
            .map_err(|err| ClientError::fetch(target, err))?;

        let response: CompletionResponse =
            serde_json::from_str(&body).map_err(|source| ClientError::Parse {
                what: "completion response",
                source,
            })?;
        info!(choices = response.choices.len(), "completion received");
        Ok(response)
    }
}
