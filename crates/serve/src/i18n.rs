// crates/serve/src/i18n.rs

//! Translation bootstrap and lookup.
//!
//! Bundles are JSON objects, one per `(locale, namespace)`, stored as
//! `<root>/<locale>/<namespace>.json`. A [`Translator`] is built per request
//! (or per client mount, from a serialized [`ResourceSet`]) and is never
//! shared as a global.
//!
//! Lookup order: requested locale → fallback locale → the key itself.

use domain::locale::{Locale, DEFAULT_LOCALE};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as Json};
use std::{
    collections::{BTreeMap, HashMap},
    fs, io,
    path::PathBuf,
    sync::{Arc, LazyLock},
};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_NAMESPACE: &str = "common";

const NS_SEPARATOR: char = ':';
const KEY_SEPARATOR: char = '.';

// -----------------------------------------------------------------------------
// Error Type
// -----------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum I18nError {
    #[error("invalid namespace {0:?}")]
    InvalidNamespace(String),

    #[error("I/O error reading bundle {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("bundle {path:?} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("bundle {0:?} is not a JSON object")]
    NotAnObject(PathBuf),
}

fn is_valid_namespace(ns: &str) -> bool {
    static NS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").unwrap());
    NS.is_match(ns)
}

// -----------------------------------------------------------------------------
// Resources
// -----------------------------------------------------------------------------

/// `locale → namespace → bundle`. Serializes to the plain nested JSON a
/// client re-hydrates from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceSet(BTreeMap<Locale, BTreeMap<String, Json>>);

impl ResourceSet {
    pub fn get(&self, locale: Locale, namespace: &str) -> Option<&Json> {
        self.0.get(&locale).and_then(|m| m.get(namespace))
    }

    pub fn contains(&self, locale: Locale, namespace: &str) -> bool {
        self.get(locale, namespace).is_some()
    }

    pub fn insert(&mut self, locale: Locale, namespace: impl Into<String>, bundle: Json) {
        self.0
            .entry(locale)
            .or_default()
            .insert(namespace.into(), bundle);
    }

    pub fn namespaces(&self, locale: Locale) -> impl Iterator<Item = &str> {
        self.0
            .get(&locale)
            .into_iter()
            .flat_map(|m| m.keys().map(String::as_str))
    }

    /// Keep only the given locales and namespaces, for handing a minimal
    /// snapshot to a client.
    pub fn subset(&self, locales: &[Locale], namespaces: &[String]) -> ResourceSet {
        let mut out = ResourceSet::default();
        for &locale in locales {
            for ns in namespaces {
                if let Some(bundle) = self.get(locale, ns) {
                    out.insert(locale, ns.clone(), bundle.clone());
                }
            }
        }
        out
    }
}

// -----------------------------------------------------------------------------
// Bundle sources
// -----------------------------------------------------------------------------

/// Where bundles come from.
pub trait BundleSource: Send + Sync {
    fn load(&self, locale: Locale, namespace: &str) -> Result<Json, I18nError>;
}

/// `<root>/<locale>/<namespace>.json`
#[derive(Debug, Clone)]
pub struct FsBundles {
    root: PathBuf,
}

impl FsBundles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BundleSource for FsBundles {
    fn load(&self, locale: Locale, namespace: &str) -> Result<Json, I18nError> {
        if !is_valid_namespace(namespace) {
            return Err(I18nError::InvalidNamespace(namespace.to_owned()));
        }
        let path = self
            .root
            .join(locale.as_str())
            .join(format!("{namespace}.json"));

        let text = fs::read_to_string(&path).map_err(|source| I18nError::Io {
            path: path.clone(),
            source,
        })?;
        let value: Json = serde_json::from_str(&text).map_err(|source| I18nError::Json {
            path: path.clone(),
            source,
        })?;
        if !value.is_object() {
            return Err(I18nError::NotAnObject(path));
        }
        Ok(value)
    }
}

/// Bundles held in memory, keyed by `(locale, namespace)`.
#[derive(Debug, Clone, Default)]
pub struct StaticBundles(HashMap<(Locale, String), Json>);

impl StaticBundles {
    pub fn with(mut self, locale: Locale, namespace: &str, bundle: Json) -> Self {
        self.0.insert((locale, namespace.to_owned()), bundle);
        self
    }
}

impl BundleSource for StaticBundles {
    fn load(&self, locale: Locale, namespace: &str) -> Result<Json, I18nError> {
        self.0
            .get(&(locale, namespace.to_owned()))
            .cloned()
            .ok_or_else(|| I18nError::Io {
                path: PathBuf::from(format!("{locale}/{namespace}.json")),
                source: io::Error::from(io::ErrorKind::NotFound),
            })
    }
}

// -----------------------------------------------------------------------------
// Bootstrap
// -----------------------------------------------------------------------------

/// Builds [`Translator`]s. Holds no translations itself.
#[derive(Clone)]
pub struct I18n {
    source: Arc<dyn BundleSource>,
    fallback: Locale,
}

impl I18n {
    pub fn new(source: Arc<dyn BundleSource>) -> Self {
        Self {
            source,
            fallback: DEFAULT_LOCALE,
        }
    }

    pub fn with_fallback(mut self, fallback: Locale) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> Locale {
        self.fallback
    }

    /// Build a translator for `locale` and `namespaces` (first = default).
    ///
    /// - `preloaded`: a snapshot from an earlier render; used as-is, no I/O.
    /// - `existing`: its bundles are reused and only missing pairs load.
    ///
    /// A bundle that fails to load becomes an empty namespace; lookups into
    /// it degrade to the fallback locale and then to the key.
    #[tracing::instrument(skip(self, existing, preloaded))]
    pub fn init(
        &self,
        locale: &str,
        namespaces: &[&str],
        existing: Option<Translator>,
        preloaded: Option<ResourceSet>,
    ) -> Translator {
        let locale = Locale::parse(locale).unwrap_or(self.fallback);
        let namespaces: Vec<String> = if namespaces.is_empty() {
            vec![DEFAULT_NAMESPACE.to_owned()]
        } else {
            namespaces.iter().map(|ns| (*ns).to_owned()).collect()
        };

        let mut targets = vec![locale];
        if locale != self.fallback {
            targets.push(self.fallback);
        }

        let resources = match preloaded {
            Some(mut snapshot) => {
                if !snapshot.contains(self.fallback, &namespaces[0]) {
                    snapshot.insert(self.fallback, namespaces[0].clone(), empty_bundle());
                }
                snapshot
            }
            None => {
                let mut resources = existing.map(Translator::into_resources).unwrap_or_default();
                for &target in &targets {
                    for ns in &namespaces {
                        if resources.contains(target, ns) {
                            continue;
                        }
                        let bundle = match self.source.load(target, ns) {
                            Ok(bundle) => bundle,
                            Err(e) => {
                                warn!("translations {target}/{ns} unavailable: {e}");
                                empty_bundle()
                            }
                        };
                        resources.insert(target, ns.clone(), bundle);
                    }
                }
                resources
            }
        };

        Translator {
            locale,
            fallback: self.fallback,
            namespaces,
            resources,
        }
    }
}

fn empty_bundle() -> Json {
    Json::Object(JsonMap::new())
}

// -----------------------------------------------------------------------------
// Lookup
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct LookupOptions<'a> {
    /// `{{name}}` replacements.
    pub vars: &'a [(&'a str, &'a str)],
    /// Accept array entries (lists of strings).
    pub return_objects: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Text(String),
    List(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Translator {
    locale: Locale,
    fallback: Locale,
    namespaces: Vec<String>,
    resources: ResourceSet,
}

impl Translator {
    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn default_namespace(&self) -> &str {
        &self.namespaces[0]
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn resources(&self) -> &ResourceSet {
        &self.resources
    }

    pub fn into_resources(self) -> ResourceSet {
        self.resources
    }

    /// The bundles this translator reads, for client hydration.
    pub fn snapshot(&self) -> ResourceSet {
        let mut locales = vec![self.locale];
        if self.fallback != self.locale {
            locales.push(self.fallback);
        }
        self.resources.subset(&locales, &self.namespaces)
    }

    pub fn t(&self, key: &str) -> String {
        self.t_with(key, &[])
    }

    pub fn t_with(&self, key: &str, vars: &[(&str, &str)]) -> String {
        match self.lookup(
            key,
            &LookupOptions {
                vars,
                return_objects: false,
            },
        ) {
            Translation::Text(s) => s,
            Translation::List(_) => key.to_owned(),
        }
    }

    /// List entries (feature bullets etc.). A string entry is a one-item list.
    pub fn t_list(&self, key: &str) -> Vec<String> {
        match self.lookup(
            key,
            &LookupOptions {
                vars: &[],
                return_objects: true,
            },
        ) {
            Translation::Text(s) => vec![s],
            Translation::List(items) => items,
        }
    }

    /// Never fails: a key with no usable entry comes back verbatim.
    pub fn lookup(&self, key: &str, opts: &LookupOptions<'_>) -> Translation {
        let (ns, path) = self.split_key(key);
        let miss = || Translation::Text(key.to_owned());

        let Some(value) = self.find(ns, path) else {
            debug!("missing translation {key:?} for {}", self.locale);
            return miss();
        };

        match value {
            Json::String(s) => Translation::Text(interpolate(s, opts.vars)),
            Json::Array(items) if opts.return_objects => Translation::List(
                items
                    .iter()
                    .filter_map(Json::as_str)
                    .map(|s| interpolate(s, opts.vars))
                    .collect(),
            ),
            _ => miss(),
        }
    }

    fn split_key<'k>(&'k self, key: &'k str) -> (&'k str, &'k str) {
        match key.split_once(NS_SEPARATOR) {
            Some((ns, path)) if is_valid_namespace(ns) => (ns, path),
            _ => (self.default_namespace(), key),
        }
    }

    /// First string/array entry along `locale → fallback`.
    fn find(&self, ns: &str, path: &str) -> Option<&Json> {
        let mut order = vec![self.locale];
        if self.fallback != self.locale {
            order.push(self.fallback);
        }
        order
            .into_iter()
            .filter_map(|l| self.resources.get(l, ns))
            .filter_map(|bundle| walk(bundle, path))
            .find(|v| v.is_string() || v.is_array())
    }
}

/// Resolve a dotted path; a literal top-level key wins over nesting.
fn walk<'a>(bundle: &'a Json, path: &str) -> Option<&'a Json> {
    if path.is_empty() {
        return None;
    }
    if let Some(v) = bundle.get(path) {
        return Some(v);
    }
    path.split(KEY_SEPARATOR)
        .try_fold(bundle, |node, segment| node.get(segment))
}

fn interpolate(template: &str, vars: &[(&str, &str)]) -> String {
    static PLACEHOLDER: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.]+)\s*\}\}").unwrap());

    if vars.is_empty() {
        return template.to_owned();
    }
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v).to_owned())
                .unwrap_or_else(|| caps[0].to_owned())
        })
        .into_owned()
}
