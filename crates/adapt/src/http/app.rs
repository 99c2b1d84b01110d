// crates/adapt/src/http/app.rs

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use domain::locale::Locale;
use serve::I18n;

use crate::email::EmailSender;
use crate::registrar::RegistrarClient;
use crate::templates::MailTemplates;

/// Contact-form delivery: who sends, and who gets notified.
#[derive(Clone)]
pub struct ContactConfig {
    pub sender: Arc<dyn EmailSender>,
    pub from: String,
    pub notify_to: Vec<String>,
}

/// Domain search: registrar client plus the TLDs bare names expand to.
#[derive(Clone)]
pub struct DomainConfig {
    pub client: Arc<dyn RegistrarClient>,
    pub tlds: Vec<String>,
    /// Site base URL that checkout links point at.
    pub checkout_base: String,
}

/// Shared, immutable state of the `/api` routes. A missing collaborator
/// turns its route into a 503.
#[derive(Clone)]
pub struct ApiState {
    pub i18n: Arc<I18n>,
    pub templates: Arc<MailTemplates>,
    pub contact: Option<ContactConfig>,
    pub domains: Option<DomainConfig>,
    pub default_locale: Locale,
}

/// Routes are relative; the edge nests this under `/api`.
#[tracing::instrument(skip_all)]
pub fn build_api(state: ApiState) -> Router {
    Router::new()
        .route("/contact", post(crate::http::contact::submit))
        .route(
            "/domains/check",
            get(crate::http::domains::check_query).post(crate::http::domains::check_batch),
        )
        .with_state(state)
}
