// crates/edge/src/router.rs

use std::sync::Arc;

use adapt::http::{build_api, ApiState, ContactConfig, DomainConfig};
use adapt::{HttpEmailSender, HttpRegistrarClient, MailTemplates};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use domain::content::{Category, Collection, Document, ListQuery, Listing, PageOf};
use domain::setting::Settings;
use serde::{Deserialize, Serialize};
use serve::{ContentStore, FsBundles, I18n, ResourceSet};
use tracing::{debug, info};

use crate::Error;

pub const DEFAULT_FEATURED_LIMIT: usize = 3;

/// Page-route state. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub content: Arc<ContentStore>,
    pub i18n: Arc<I18n>,
    pub per_page: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Router construction
// ─────────────────────────────────────────────────────────────────────────────

/// Wire content, translations, and the outbound collaborators the settings
/// enable into one router.
#[tracing::instrument(skip_all)]
pub fn build_app(settings: &Settings) -> Result<Router, Error> {
    let content = Arc::new(ContentStore::from_settings(&settings.content));
    let i18n = Arc::new(
        I18n::new(Arc::new(FsBundles::new(settings.content.locales_dir.clone())))
            .with_fallback(settings.content.default_locale),
    );

    let client = reqwest::Client::builder().build()?;

    let contact = settings.email.as_ref().map(|email| ContactConfig {
        sender: Arc::new(HttpEmailSender::from_settings(client.clone(), email)),
        from: email.from.clone(),
        notify_to: email.notify_to.clone(),
    });
    if contact.is_none() {
        info!("no [email] settings, contact form disabled");
    }

    let domains = settings.registrar.as_ref().map(|registrar| DomainConfig {
        client: Arc::new(HttpRegistrarClient::from_settings(client.clone(), registrar)),
        tlds: registrar.tlds.clone(),
        checkout_base: settings.site.base_url.clone(),
    });
    if domains.is_none() {
        info!("no [registrar] settings, domain search disabled");
    }

    let api = build_api(ApiState {
        i18n: Arc::clone(&i18n),
        templates: Arc::new(MailTemplates::new()?),
        contact,
        domains,
        default_locale: settings.content.default_locale,
    });

    let state = AppState {
        content,
        i18n,
        per_page: settings.content.per_page,
    };

    Ok(build(state, api))
}

/// Page routes plus `api` nested under `/api`.
pub fn build(state: AppState, api: Router) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/{locale}/blog", get(blog_index))
        .route("/{locale}/blog/featured", get(blog_featured))
        .route("/{locale}/blog/categories", get(blog_categories))
        .route("/{locale}/blog/{slug}", get(blog_document))
        .route("/{locale}/legal", get(legal_index))
        .route("/{locale}/legal/{slug}", get(legal_document))
        .route("/{locale}/i18n", get(translations))
        .with_state(state)
        .nest("/api", api)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub page: Option<usize>,
    pub category: Option<String>,
}

#[tracing::instrument(skip(state))]
async fn blog_index(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    Query(q): Query<IndexQuery>,
) -> Result<Json<PageOf<Document>>, Error> {
    let page = q.page.unwrap_or(1);
    state
        .content
        .page(Collection::Blog, &locale, page, state.per_page, q.category)?
        .map(Json)
        .ok_or(Error::PageNotFound(page))
}

#[derive(Debug, Deserialize)]
pub struct FeaturedQuery {
    pub limit: Option<usize>,
}

async fn blog_featured(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    Query(q): Query<FeaturedQuery>,
) -> Result<Json<Vec<Document>>, Error> {
    let limit = q.limit.unwrap_or(DEFAULT_FEATURED_LIMIT);
    Ok(Json(state.content.featured(Collection::Blog, &locale, limit)?))
}

async fn blog_categories(
    State(state): State<AppState>,
    Path(locale): Path<String>,
) -> Result<Json<Vec<Category>>, Error> {
    Ok(Json(state.content.categories(Collection::Blog, &locale)?))
}

async fn blog_document(
    State(state): State<AppState>,
    Path((locale, slug)): Path<(String, String)>,
) -> Result<Json<Document>, Error> {
    Ok(Json(state.content.resolve(Collection::Blog, &slug, &locale)?))
}

async fn legal_index(
    State(state): State<AppState>,
    Path(locale): Path<String>,
) -> Result<Json<Listing<Document>>, Error> {
    let query = ListQuery::new(0, usize::MAX);
    Ok(Json(state.content.list(Collection::Legal, &locale, &query)?))
}

async fn legal_document(
    State(state): State<AppState>,
    Path((locale, slug)): Path<(String, String)>,
) -> Result<Json<Document>, Error> {
    Ok(Json(state.content.resolve(Collection::Legal, &slug, &locale)?))
}

#[derive(Debug, Deserialize)]
pub struct TranslationsQuery {
    /// Comma-separated namespaces; the first is the default one.
    pub ns: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationsSnapshot {
    pub locale: String,
    pub namespaces: Vec<String>,
    pub resources: ResourceSet,
}

/// Bundles a client needs to hydrate with the same translations the
/// server used.
async fn translations(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    Query(q): Query<TranslationsQuery>,
) -> Json<TranslationsSnapshot> {
    let requested: Vec<&str> = q
        .ns
        .as_deref()
        .map(|ns| {
            ns.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let t = state.i18n.init(&locale, &requested, None, None);
    debug!("translations for {} ({:?})", t.locale(), t.namespaces());
    Json(TranslationsSnapshot {
        locale: t.locale().to_string(),
        namespaces: t.namespaces().to_vec(),
        resources: t.snapshot(),
    })
}
