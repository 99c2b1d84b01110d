// crates/domain/src/locale.rs

//! Supported locales and the ordered fallback chain used by content and
//! translation lookups.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Locale
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Es,
    De,
    Fr,
    Pl,
}

/// The universal fallback target for content and translations.
pub const DEFAULT_LOCALE: Locale = Locale::En;

pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::Es, Locale::De, Locale::Fr, Locale::Pl];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported locale: {0:?}")]
pub struct UnsupportedLocale(pub String);

impl Locale {
    pub const fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
            Locale::De => "de",
            Locale::Fr => "fr",
            Locale::Pl => "pl",
        }
    }

    /// Parse a language tag. Matching is case-insensitive and only the
    /// primary subtag is considered, so `pl-PL` and `PL` both yield `Pl`.
    pub fn parse(tag: &str) -> Option<Locale> {
        let primary = tag.trim().split(['-', '_']).next().unwrap_or("");
        SUPPORTED_LOCALES
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(primary))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::parse(s).ok_or_else(|| UnsupportedLocale(s.to_owned()))
    }
}

/// Pick the best supported locale from an `Accept-Language` header value.
///
/// Entries are ranked by q-value (default 1.0, ties keep header order);
/// entries with `q=0` are ignored. Falls back to `default`.
pub fn negotiate(accept_language: Option<&str>, default: Locale) -> Locale {
    let Some(header) = accept_language else {
        return default;
    };

    let mut ranked: Vec<(f32, usize, Locale)> = header
        .split(',')
        .enumerate()
        .filter_map(|(idx, part)| {
            let mut pieces = part.split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let q = pieces
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|v| v.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            if q <= 0.0 {
                return None;
            }
            Locale::parse(tag).map(|l| (q, idx, l))
        })
        .collect();

    ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    ranked.first().map(|(_, _, l)| *l).unwrap_or(default)
}

// ─────────────────────────────────────────────────────────────────────────────
// Fallback chain
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered list of locales to try for one lookup.
///
/// Always ends with the default locale and never contains duplicates, so
/// whatever step succeeds is a supported locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackChain {
    requested: String,
    steps: Vec<Locale>,
}

impl FallbackChain {
    /// `requested → default`. An unsupported `requested` contributes no step.
    pub fn new(requested: &str, default: Locale) -> Self {
        let mut steps = Vec::with_capacity(2);
        if let Some(l) = Locale::parse(requested) {
            steps.push(l);
        }
        if !steps.contains(&default) {
            steps.push(default);
        }
        Self {
            requested: requested.to_owned(),
            steps,
        }
    }

    pub fn requested(&self) -> &str {
        &self.requested
    }

    pub fn steps(&self) -> &[Locale] {
        &self.steps
    }

    /// The locale used when the first step misses.
    pub fn fallback(&self) -> Locale {
        // `new` always pushes at least one step.
        self.steps[self.steps.len() - 1]
    }
}
