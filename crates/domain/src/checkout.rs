// crates/domain/src/checkout.rs

//! Query strings for purchase confirmation/payment pages.
//!
//! Every purchase kind has its own item and price parameter so a URL that
//! carries more than one kind cannot be misread.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseKind {
    Domain,
    Hosting,
    Support,
}

impl PurchaseKind {
    /// `(item_param, price_param)`
    pub const fn params(self) -> (&'static str, &'static str) {
        match self {
            PurchaseKind::Domain => ("domain", "domain_price"),
            PurchaseKind::Hosting => ("plan", "hosting_price"),
            PurchaseKind::Support => ("package", "support_price"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub kind: PurchaseKind,
    pub item: String,
    /// Price in the smallest currency unit.
    pub price_cents: u64,
}

/// `<base>/<path>?<namespaced params>`
pub fn confirmation_url(base_url: &str, path: &str, lines: &[PurchaseLine]) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for line in lines {
        let (item_key, price_key) = line.kind.params();
        query.append_pair(item_key, &line.item);
        query.append_pair(price_key, &line.price_cents.to_string());
    }
    let query = query.finish();

    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if query.is_empty() {
        format!("{base}/{path}")
    } else {
        format!("{base}/{path}?{query}")
    }
}
