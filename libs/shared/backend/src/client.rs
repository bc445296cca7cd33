use anyhow::{anyhow, Context, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, Method,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::auth::{UserToken, TOKEN_HEADER};

/// Envelope every backend reply is wrapped in: `{ success, message, ...payload }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiReply<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> ApiReply<T> {
    /// Turns a `success: false` reply into an error carrying the backend's message.
    pub fn into_result(self) -> Result<T> {
        if self.success {
            Ok(self.data)
        } else {
            Err(anyhow!(self
                .message
                .unwrap_or_else(|| "Request was not successful".to_string())))
        }
    }
}

/// Reply shape for endpoints that only acknowledge an action.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Acknowledgement {}

/// Non-2xx reply whose body still carried the backend's `message`.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct BackendRejection {
    pub status: u16,
    pub message: String,
}

pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.backend_url.clone(),
        }
    }

    fn get_headers(&self, token: Option<&UserToken>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = token {
            let value = HeaderValue::from_str(token.as_str())
                .context("Session token contains invalid header characters")?;
            headers.insert(TOKEN_HEADER, value);
        }

        Ok(headers)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        token: Option<&UserToken>,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let headers = self.get_headers(token)?;

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            let reply = serde_json::from_str::<ApiReply<Acknowledgement>>(&error_text).ok();
            if let Some(message) = reply.and_then(|reply| reply.message) {
                return Err(BackendRejection {
                    status: status.as_u16(),
                    message,
                }
                .into());
            }

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }
}
