// crates/adapt/src/http/contact.rs

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use domain::contact::{ContactRequest, EmailMessage};
use domain::locale::{negotiate, Locale};
use http::header::ACCEPT_LANGUAGE;
use http::HeaderMap;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::http::{ApiError, ApiState};
use crate::templates::{AckModel, NotifyModel};

pub const EMAILS_NAMESPACE: &str = "emails";

#[derive(Debug, Serialize)]
pub struct ContactAccepted {
    pub ok: bool,
    pub reference: Uuid,
}

/// Validate, then send the sender's acknowledgment and the internal
/// notification concurrently. Either failing fails the request; the other
/// is not recalled.
///
/// The acknowledgment uses the posted `locale`, else the best match from
/// `Accept-Language`.
#[tracing::instrument(skip_all)]
pub async fn submit(
    State(state): State<ApiState>,
    headers: HeaderMap,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<ContactAccepted>, ApiError> {
    let Json(req) = payload?;
    req.validate().map_err(ApiError::Validation)?;
    let contact = state
        .contact
        .as_ref()
        .ok_or(ApiError::NotConfigured("contact form"))?;

    let reference = Uuid::new_v4();
    let reference_str = reference.to_string();
    let locale = req
        .locale
        .as_deref()
        .and_then(Locale::parse)
        .unwrap_or_else(|| {
            let header = headers
                .get(ACCEPT_LANGUAGE)
                .and_then(|v| v.to_str().ok());
            negotiate(header, state.default_locale)
        });

    let t = state
        .i18n
        .init(locale.as_str(), &[EMAILS_NAMESPACE], None, None);

    let name = req.name.trim();
    let email = req.email.trim();
    let subject = req
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let ack_html = state.templates.ack(&AckModel {
        lang: locale.as_str(),
        greeting: t.t_with("contact.ack.greeting", &[("name", name)]),
        intro: t.t("contact.ack.intro"),
        message: req.message.trim(),
        reference_line: t.t_with("contact.ack.reference", &[("reference", reference_str.as_str())]),
        signature: t.t("contact.ack.signature"),
    })?;
    let ack = EmailMessage {
        from: contact.from.clone(),
        to: vec![email.to_owned()],
        subject: t.t("contact.ack.subject"),
        html: ack_html,
        reply_to: None,
    };

    let notify_html = state.templates.notify(&NotifyModel {
        reference: reference_str.clone(),
        name,
        email,
        subject,
        locale: locale.as_str(),
        message: req.message.trim(),
    })?;
    let notify = EmailMessage {
        from: contact.from.clone(),
        to: contact.notify_to.clone(),
        subject: format!("[{reference_str}] {}", subject.unwrap_or("Contact form")),
        html: notify_html,
        reply_to: Some(email.to_owned()),
    };

    let (ack_sent, notify_sent) = tokio::join!(
        contact.sender.send(&ack),
        contact.sender.send(&notify)
    );
    match (ack_sent, notify_sent) {
        (Ok(ack_id), Ok(notify_id)) => {
            info!("contact {reference} delivered (ack {ack_id}, notify {notify_id})");
            Ok(Json(ContactAccepted {
                ok: true,
                reference,
            }))
        }
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(ApiError::Email(e)),
        (Err(e), Err(second)) => {
            error!("contact {reference}: notification also failed: {second}");
            Err(ApiError::Email(e))
        }
    }
}
