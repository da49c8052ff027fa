//! Typed client for Open WebUI's configuration endpoints.
//!
//! Every operation resolves the bearer token from the credential store at
//! call time and fails fast with `MissingToken` before any network I/O.
//! Tool-server connections travel as raw JSON values so foreign entries
//! survive a round trip byte-for-byte.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use url::Url;

use mcpsync_core::credentials::CredentialStore;
use mcpsync_core::ports::{ModelSummary, OpenAiSettings, WebUiApi, WebUiError};

use crate::wire::{self, OpenAiWireConfig};

/// Key wrapping the connection list in the configs endpoint body.
const CONNECTIONS_KEY: &str = "TOOL_SERVER_CONNECTIONS";

/// Client for the Open WebUI config API.
pub struct WebUiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialStore>,
}

impl WebUiClient {
    /// Create a client for the given instance.
    ///
    /// # Errors
    ///
    /// Rejects an unparseable base URL; a misconfigured address must fail
    /// loudly rather than reconcile against the wrong instance.
    pub fn new(
        base_url: &str,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, url::ParseError> {
        let mut base_url = Url::parse(base_url)?;
        // A trailing slash makes relative joins extend the path instead of
        // replacing its last segment
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create HTTP client");

        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    /// Join a relative endpoint path onto the base URL, preserving any
    /// path prefix the base carries.
    fn endpoint(&self, path: &str) -> Result<Url, WebUiError> {
        self.base_url
            .join(path)
            .map_err(|e| WebUiError::InvalidResponse(format!("bad endpoint '{path}': {e}")))
    }

    async fn token(&self) -> Result<String, WebUiError> {
        self.credentials
            .get_token()
            .await
            .map_err(|e| WebUiError::Network(format!("credential store: {e}")))?
            .ok_or(WebUiError::MissingToken)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, WebUiError> {
        let token = self.token().await?;
        self.http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| WebUiError::Network(e.to_string()))
    }

    async fn post(&self, url: Url, body: &Value) -> Result<reqwest::Response, WebUiError> {
        let token = self.token().await?;
        self.http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| WebUiError::Network(e.to_string()))
    }

    /// Parse a successful response as JSON, or map the status to an error.
    async fn expect_json(response: reqwest::Response) -> Result<Value, WebUiError> {
        let status = response.status();
        let url = response.url().to_string();
        if !status.is_success() {
            return Err(WebUiError::Api {
                status: status.as_u16(),
                url,
            });
        }
        response
            .json()
            .await
            .map_err(|e| WebUiError::InvalidResponse(e.to_string()))
    }

    async fn expect_ok(response: reqwest::Response) -> Result<(), WebUiError> {
        let status = response.status();
        let url = response.url().to_string();
        if status.is_success() {
            Ok(())
        } else {
            Err(WebUiError::Api {
                status: status.as_u16(),
                url,
            })
        }
    }
}

/// Whether an error body reads as "the thing does not exist". The remote
/// reports absent models with varying statuses but a stable message shape.
fn is_not_found_body(body: &str) -> bool {
    body.to_lowercase().contains("not found")
}

#[async_trait]
impl WebUiApi for WebUiClient {
    async fn tool_server_connections(&self) -> Result<Vec<Value>, WebUiError> {
        let url = self.endpoint("api/v1/configs/tool_servers")?;
        let body = Self::expect_json(self.get(url).await?).await?;

        body.get(CONNECTIONS_KEY)
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| {
                WebUiError::InvalidResponse(format!("missing {CONNECTIONS_KEY} list"))
            })
    }

    async fn set_tool_server_connections(
        &self,
        connections: &[Value],
    ) -> Result<(), WebUiError> {
        let url = self.endpoint("api/v1/configs/tool_servers")?;
        let body = json!({ CONNECTIONS_KEY: connections });
        tracing::debug!(count = connections.len(), "writing tool-server connections");
        Self::expect_ok(self.post(url, &body).await?).await
    }

    async fn list_models(&self) -> Result<Vec<ModelSummary>, WebUiError> {
        let url = self.endpoint("api/v1/models/")?;
        let body = Self::expect_json(self.get(url).await?).await?;

        let data = body
            .get("data")
            .cloned()
            .ok_or_else(|| WebUiError::InvalidResponse("missing model list".to_string()))?;
        Ok(serde_json::from_value(data)?)
    }

    async fn model_detail(&self, id: &str) -> Result<Option<Value>, WebUiError> {
        let mut url = self.endpoint("api/v1/models/model")?;
        url.query_pairs_mut().append_pair("id", id);

        let response = self.get(url).await?;
        let status = response.status();
        let request_url = response.url().to_string();
        if status.is_success() {
            let detail = response
                .json()
                .await
                .map_err(|e| WebUiError::InvalidResponse(e.to_string()))?;
            return Ok(Some(detail));
        }

        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 404 || is_not_found_body(&body) {
            return Ok(None);
        }
        Err(WebUiError::Api {
            status: status.as_u16(),
            url: request_url,
        })
    }

    async fn create_model(&self, model: &Value) -> Result<(), WebUiError> {
        let url = self.endpoint("api/v1/models/create")?;
        Self::expect_ok(self.post(url, model).await?).await
    }

    async fn update_model(&self, id: &str, model: &Value) -> Result<(), WebUiError> {
        let mut url = self.endpoint("api/v1/models/model/update")?;
        url.query_pairs_mut().append_pair("id", id);

        let response = self.post(url, model).await?;
        let status = response.status();
        let request_url = response.url().to_string();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 404 || is_not_found_body(&body) {
            return Err(WebUiError::ModelNotFound(id.to_string()));
        }
        Err(WebUiError::Api {
            status: status.as_u16(),
            url: request_url,
        })
    }

    async fn openai_config(&self) -> Result<OpenAiSettings, WebUiError> {
        let url = self.endpoint("openai/config")?;
        let body = Self::expect_json(self.get(url).await?).await?;
        let config: OpenAiWireConfig = serde_json::from_value(body)?;
        Ok(wire::to_settings(&config))
    }

    async fn set_openai_config(&self, settings: &OpenAiSettings) -> Result<(), WebUiError> {
        let url = self.endpoint("openai/config/update")?;
        let body = serde_json::to_value(wire::to_wire(settings))?;
        Self::expect_ok(self.post(url, &body).await?).await
    }
}
