// crates/adapt/src/registrar.rs

//! Outbound domain-registrar collaborator (batch availability check).

use async_trait::async_trait;
use domain::registrar::RegistrarAvailability;
use domain::setting::RegistrarSettings;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::UpstreamError;

pub const CHECK_AVAILABILITY_PATH: &str = "/v4/domains:checkAvailability";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrarClient: Send + Sync {
    async fn check_availability(
        &self,
        domain_names: &[String],
    ) -> Result<Vec<RegistrarAvailability>, UpstreamError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckRequest<'a> {
    domain_names: &'a [String],
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    results: Vec<RegistrarAvailability>,
}

/// Registrar JSON API over HTTPS with basic authentication.
#[derive(Clone)]
pub struct HttpRegistrarClient {
    client: reqwest::Client,
    api_url: String,
    username: String,
    password: SecretString,
}

impl HttpRegistrarClient {
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            username: username.into(),
            password,
        }
    }

    pub fn from_settings(client: reqwest::Client, settings: &RegistrarSettings) -> Self {
        Self::new(
            client,
            settings.api_url.clone(),
            settings.username.clone(),
            settings.password.clone(),
        )
    }
}

#[async_trait]
impl RegistrarClient for HttpRegistrarClient {
    #[tracing::instrument(skip_all, fields(count = domain_names.len()))]
    async fn check_availability(
        &self,
        domain_names: &[String],
    ) -> Result<Vec<RegistrarAvailability>, UpstreamError> {
        let url = format!(
            "{}{}",
            self.api_url.trim_end_matches('/'),
            CHECK_AVAILABILITY_PATH
        );
        let resp = self
            .client
            .post(url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .json(&CheckRequest { domain_names })
            .send()
            .await?;

        let resp = UpstreamError::check(resp).await?;
        let body: CheckResponse = resp.json().await?;
        debug!("registrar returned {} results", body.results.len());
        Ok(body.results)
    }
}
