// crates/adapt/src/lib.rs

//! Outbound collaborators (email, registrar) and the JSON `/api` surface
//! that drives them.

pub mod email;
pub mod http;
pub mod registrar;
pub mod templates;

pub use email::{EmailSender, HttpEmailSender};
pub use registrar::{HttpRegistrarClient, RegistrarClient};
pub use templates::MailTemplates;

use thiserror::Error;
use tracing::warn;

/// Failure talking to an outbound HTTP collaborator.
///
/// The message carries the provider's response text for logs only; it is
/// never sent back to API callers.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned {status}: {message}")]
    Status { status: u16, message: String },
}

impl UpstreamError {
    /// Pass a successful response through; turn anything else into
    /// [`UpstreamError::Status`] with the body text.
    pub async fn check(resp: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = match resp.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!("could not read upstream error body: {e}");
                String::new()
            }
        };
        Err(UpstreamError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("render error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),
}
