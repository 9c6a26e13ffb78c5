use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use chatops_core::api::{CompletionBackend, CompletionError, CompletionRequest, Message};

use super::http_error::{preview_body, CompletionHttpError};

#[derive(Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: &'a [Message],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client for OpenAI-compatible and Azure OpenAI endpoints.
///
/// OpenAI: `POST {endpoint}/chat/completions` with a bearer token.
/// Azure: `POST {endpoint}/openai/deployments/{model}/chat/completions?api-version=..`
/// with an `api-key` header; the model names the deployment.
#[derive(Clone)]
pub struct ChatCompletionBackend {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    azure_api_version: Option<String>,
}

impl ChatCompletionBackend {
    pub fn openai(endpoint: String, api_key: String, timeout_ms: u64) -> anyhow::Result<Self> {
        Self::build(endpoint, api_key, None, timeout_ms)
    }

    pub fn azure(
        endpoint: String,
        api_key: String,
        api_version: String,
        timeout_ms: u64,
    ) -> anyhow::Result<Self> {
        Self::build(endpoint, api_key, Some(api_version), timeout_ms)
    }

    fn build(
        endpoint: String,
        api_key: String,
        azure_api_version: Option<String>,
        timeout_ms: u64,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            azure_api_version,
        })
    }

    fn url(&self, model: &str) -> String {
        match &self.azure_api_version {
            Some(version) => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.endpoint, model, version
            ),
            None => format!("{}/chat/completions", self.endpoint),
        }
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.trim().is_empty() {
            return req;
        }
        match self.azure_api_version {
            Some(_) => req.header("api-key", &self.api_key),
            None => req.bearer_auth(&self.api_key),
        }
    }

    async fn send(&self, request: &CompletionRequest) -> Result<String, CompletionHttpError> {
        let url = self.url(&request.model);
        let body = ChatRequest {
            model: self
                .azure_api_version
                .is_none()
                .then_some(request.model.as_str()),
            messages: &request.messages,
            temperature: request.temperature,
        };

        let resp = self
            .auth(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|err| CompletionHttpError::from_reqwest(err, url.clone()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|err| CompletionHttpError::from_reqwest(err, url.clone()))?;

        if !status.is_success() {
            return Err(CompletionHttpError::status_error(
                status.as_u16(),
                url,
                preview_body(&text),
            ));
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|err| {
            CompletionHttpError::decode_error(status.as_u16(), url.clone(), err, preview_body(&text))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CompletionHttpError::empty(status.as_u16(), url))
    }
}

#[async_trait]
impl CompletionBackend for ChatCompletionBackend {
    fn name(&self) -> &str {
        match self.azure_api_version {
            Some(_) => "azure",
            None => "openai",
        }
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        tracing::debug!(
            target: "chatops.chain",
            backend = self.name(),
            model = %request.model,
            messages = request.messages.len(),
            "sending completion request"
        );
        self.send(&request).await.map_err(|err| {
            tracing::warn!(target: "chatops.chain", kind = %err.kind(), status = ?err.status(), "completion request failed");
            CompletionError::from(err)
        })
    }
}
