// crates/adapt/src/http/domains.rs

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use domain::checkout::{confirmation_url, PurchaseKind, PurchaseLine};
use domain::registrar::{expand_search, AvailabilityStatus, DomainAvailability};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::{ApiError, ApiState};

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckBatch {
    #[serde(default)]
    pub domains: Vec<String>,
}

pub const CHECKOUT_PATH: &str = "checkout/confirm";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainResult {
    #[serde(flatten)]
    pub availability: DomainAvailability,
    /// Only for available names with a known price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResults {
    pub results: Vec<DomainResult>,
}

pub async fn check_query(
    State(state): State<ApiState>,
    query: Result<Query<CheckQuery>, QueryRejection>,
) -> Result<Json<CheckResults>, ApiError> {
    let Query(q) = query?;
    let inputs: Vec<String> = q.name.into_iter().collect();
    check(&state, &inputs).await.map(Json)
}

pub async fn check_batch(
    State(state): State<ApiState>,
    payload: Result<Json<CheckBatch>, JsonRejection>,
) -> Result<Json<CheckResults>, ApiError> {
    let Json(batch) = payload?;
    check(&state, &batch.domains).await.map(Json)
}

/// Sanitize and expand the inputs, ask the registrar once, and answer in
/// request order. Names the registrar skipped come back `unknown`.
#[tracing::instrument(skip_all, fields(inputs = inputs.len()))]
async fn check(state: &ApiState, inputs: &[String]) -> Result<CheckResults, ApiError> {
    let domains = state
        .domains
        .as_ref()
        .ok_or(ApiError::NotConfigured("domain search"))?;

    let names = expand_search(inputs, &domains.tlds)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    debug!("checking {} names", names.len());

    let records = domains
        .client
        .check_availability(&names)
        .await
        .map_err(ApiError::Registrar)?;

    let results = names
        .iter()
        .map(|name| {
            records
                .iter()
                .find(|r| r.domain_name.eq_ignore_ascii_case(name))
                .map(DomainAvailability::from)
                .unwrap_or_else(|| DomainAvailability {
                    domain: name.clone(),
                    available: false,
                    status: AvailabilityStatus::Unknown,
                    premium: false,
                    price: None,
                })
        })
        .map(|availability| DomainResult {
            checkout_url: checkout_url(&domains.checkout_base, &availability),
            availability,
        })
        .collect();

    Ok(CheckResults { results })
}

fn checkout_url(base_url: &str, availability: &DomainAvailability) -> Option<String> {
    if !availability.available {
        return None;
    }
    let price = availability.price.filter(|p| p.is_finite() && *p >= 0.0)?;
    let line = PurchaseLine {
        kind: PurchaseKind::Domain,
        item: availability.domain.clone(),
        price_cents: (price * 100.0).round() as u64,
    };
    Some(confirmation_url(base_url, CHECKOUT_PATH, &[line]))
}
