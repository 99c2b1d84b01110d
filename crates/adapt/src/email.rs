// crates/adapt/src/email.rs

//! Outbound email collaborator.

use async_trait::async_trait;
use domain::contact::EmailMessage;
use domain::setting::EmailSettings;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::UpstreamError;

/// Sends one message, returning the provider's message id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<String, UpstreamError>;
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

/// JSON-over-HTTPS email API (`POST {api_url}/emails`, bearer key).
#[derive(Clone)]
pub struct HttpEmailSender {
    client: reqwest::Client,
    api_url: String,
    api_key: SecretString,
}

impl HttpEmailSender {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key,
        }
    }

    pub fn from_settings(client: reqwest::Client, settings: &EmailSettings) -> Self {
        Self::new(client, settings.api_url.clone(), settings.api_key.clone())
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    #[tracing::instrument(skip_all, fields(subject = %message.subject))]
    async fn send(&self, message: &EmailMessage) -> Result<String, UpstreamError> {
        let url = format!("{}/emails", self.api_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(message)
            .send()
            .await?;

        let resp = UpstreamError::check(resp).await?;
        let body: SendResponse = resp.json().await?;
        debug!("email accepted with id {}", body.id);
        Ok(body.id)
    }
}
