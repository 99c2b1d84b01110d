// crates/domain/src/registrar.rs

//! Domain-name sanitization and the mapping from registrar availability
//! records to the search result shown to customers.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

/// Upper bound on names sent to the registrar in one availability call.
pub const MAX_BATCH: usize = 50;

const MAX_NAME_LEN: usize = 253;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainNameError {
    #[error("domain name is empty")]
    Empty,

    #[error("domain name is longer than {MAX_NAME_LEN} characters")]
    TooLong,

    #[error("invalid label `{0}`")]
    InvalidLabel(String),

    #[error("too many domain names ({0}), at most {MAX_BATCH} per request")]
    TooMany(usize),
}

/// A sanitized search term: either a full name or a bare label that still
/// needs a TLD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainQuery {
    Full(String),
    Bare(String),
}

impl DomainQuery {
    /// Full names pass through; bare labels get one candidate per TLD.
    pub fn candidates(&self, tlds: &[String]) -> Vec<String> {
        match self {
            DomainQuery::Full(name) => vec![name.clone()],
            DomainQuery::Bare(label) => tlds
                .iter()
                .map(|tld| tld.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|tld| !tld.is_empty())
                .map(|tld| format!("{label}.{tld}"))
                .collect(),
        }
    }
}

/// Normalize user input into a registrable name.
///
/// Strips scheme, `www.`, credentials, port, path, query and a trailing dot,
/// lowercases, then checks every label.
pub fn sanitize_domain_name(input: &str) -> Result<DomainQuery, DomainNameError> {
    static LABEL: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$").unwrap());

    let mut s = input.trim().to_ascii_lowercase();
    if let Some(idx) = s.find("://") {
        s.drain(..idx + 3);
    }
    if let Some(idx) = s.find(['/', '?', '#']) {
        s.truncate(idx);
    }
    if let Some(idx) = s.rfind('@') {
        s.drain(..=idx);
    }
    if let Some(idx) = s.find(':') {
        s.truncate(idx);
    }
    let s = s.trim_end_matches('.');
    let s = s.strip_prefix("www.").unwrap_or(s);

    if s.is_empty() {
        return Err(DomainNameError::Empty);
    }
    if s.len() > MAX_NAME_LEN {
        return Err(DomainNameError::TooLong);
    }
    for label in s.split('.') {
        if !LABEL.is_match(label) {
            return Err(DomainNameError::InvalidLabel(label.to_owned()));
        }
    }

    if s.contains('.') {
        Ok(DomainQuery::Full(s.to_owned()))
    } else {
        Ok(DomainQuery::Bare(s.to_owned()))
    }
}

/// Sanitize every input and expand bare labels, de-duplicating while
/// keeping first-seen order.
pub fn expand_search(inputs: &[String], tlds: &[String]) -> Result<Vec<String>, DomainNameError> {
    let mut out: Vec<String> = Vec::new();
    for input in inputs {
        for name in sanitize_domain_name(input)?.candidates(tlds) {
            if !out.contains(&name) {
                out.push(name);
            }
        }
    }
    if out.is_empty() {
        return Err(DomainNameError::Empty);
    }
    if out.len() > MAX_BATCH {
        return Err(DomainNameError::TooMany(out.len()));
    }
    Ok(out)
}

// ─────────────────────────────────────────────────────────────────────────────
// Registrar records
// ─────────────────────────────────────────────────────────────────────────────

/// One entry of the registrar's batch availability response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrarAvailability {
    pub domain_name: String,
    #[serde(default)]
    pub purchasable: Option<bool>,
    #[serde(default)]
    pub purchase_type: Option<String>,
    #[serde(default)]
    pub premium: Option<bool>,
    #[serde(default)]
    pub purchase_price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Available,
    Taken,
    Unknown,
}

impl AvailabilityStatus {
    pub fn classify(record: &RegistrarAvailability) -> Self {
        let kind = record.purchase_type.as_deref();
        match record.purchasable {
            Some(true) if kind == Some("registration") => AvailabilityStatus::Available,
            Some(false) => AvailabilityStatus::Taken,
            _ if kind == Some("backorder") => AvailabilityStatus::Taken,
            _ => AvailabilityStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainAvailability {
    pub domain: String,
    pub available: bool,
    pub status: AvailabilityStatus,
    pub premium: bool,
    pub price: Option<f64>,
}

impl From<&RegistrarAvailability> for DomainAvailability {
    fn from(record: &RegistrarAvailability) -> Self {
        let status = AvailabilityStatus::classify(record);
        Self {
            domain: record.domain_name.clone(),
            available: status == AvailabilityStatus::Available,
            status,
            premium: record.premium.unwrap_or(false),
            price: record.purchase_price,
        }
    }
}
