use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::translate::interface::TranslationResult;

/// Typed HTTP client over every endpoint of the textbook backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskRequest {
    pub query: String,
    pub background: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub target_language: String,
    pub source_language: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateBatchRequest {
    pub texts: Vec<String>,
    pub target_language: String,
    pub source_language: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateBatchResponse {
    pub results: Vec<TranslationResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateTechnicalRequest {
    pub text: String,
    pub target_language: String,
    pub domain: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateContextRequest {
    pub text: String,
    pub target_language: String,
    pub context: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguagesResponse {
    pub languages: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStatsResponse {
    #[serde(default)]
    pub stats: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub gpu: Option<String>,
    #[serde(default)]
    pub ros_level: Option<String>,
    #[serde(default)]
    pub programming_level: Option<String>,
    #[serde(default)]
    pub preferred_language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SigninResponse {
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub gpu: String,
    pub ros_level: String,
    pub programming_level: String,
    pub preferred_language: String,
}

impl Default for SignupForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            full_name: String::new(),
            gpu: "None".to_string(),
            ros_level: "Beginner".to_string(),
            programming_level: "Beginner".to_string(),
            preferred_language: "en".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub user_id: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

impl BackendClient {
    #[cfg(test)]
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse, BackendError> {
        let builder = self.client.post(self.url("/rag/ask")).json(request);
        send_json(builder).await
    }

    pub async fn translate(&self, request: &TranslateRequest) -> Result<TranslationResult, BackendError> {
        let builder = self.client.post(self.url("/rag/translate")).json(request);
        send_json(builder).await
    }

    pub async fn translate_batch(
        &self,
        request: &TranslateBatchRequest,
    ) -> Result<TranslateBatchResponse, BackendError> {
        let builder = self.client.post(self.url("/rag/translate/batch")).json(request);
        send_json(builder).await
    }

    pub async fn translate_technical(
        &self,
        request: &TranslateTechnicalRequest,
    ) -> Result<TranslationResult, BackendError> {
        let builder = self.client.post(self.url("/rag/translate/technical")).json(request);
        send_json(builder).await
    }

    pub async fn translate_with_context(
        &self,
        request: &TranslateContextRequest,
    ) -> Result<TranslationResult, BackendError> {
        let builder = self.client.post(self.url("/rag/translate/context")).json(request);
        send_json(builder).await
    }

    pub async fn supported_languages(&self) -> Result<LanguagesResponse, BackendError> {
        let builder = self.client.get(self.url("/rag/translate/languages"));
        send_json(builder).await
    }

    pub async fn cache_stats(&self) -> Result<CacheStatsResponse, BackendError> {
        let builder = self.client.get(self.url("/rag/translate/cache"));
        send_json(builder).await
    }

    pub async fn clear_cache(&self) -> Result<(), BackendError> {
        let builder = self.client.delete(self.url("/rag/translate/cache"));
        send(builder).await.map(|_| ())
    }

    pub async fn signin(&self, request: &SigninRequest) -> Result<SigninResponse, BackendError> {
        let builder = self.client.post(self.url("/auth/signin")).json(request);
        send_json(builder).await
    }

    pub async fn signup(&self, form: &SignupForm) -> Result<SignupResponse, BackendError> {
        let builder = self.client.post(self.url("/auth/signup")).json(form);
        send_json(builder).await
    }
}

async fn send(builder: RequestBuilder) -> Result<reqwest::Response, BackendError> {
    let response = builder.send().await?;
    let status = response.status();
    debug!("Backend responded {} for {}", status, response.url());

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Server {
        status,
        detail: extract_detail(&body),
    })
}

async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, BackendError> {
    let response = send(builder).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Pull `detail` out of an error body. Structured details are kept as compact JSON.
pub fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
