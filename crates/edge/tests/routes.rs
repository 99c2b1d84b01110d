use std::fs;
use std::path::Path;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value as Json};
use tempfile::TempDir;
use tower::ServiceExt; // oneshot

use edge::cli::load_settings;
use edge::router::build_app;

// === Site fixture ===
const SETTINGS: &str = r#"
[content]
blog_dir = "content/blog"
legal_dir = "content/legal"
locales_dir = "locales"
per_page = 2

[site]
base_url = "https://example.org"
"#;

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn add_post(root: &Path, locale: &str, slug: &str, date: &str, featured: bool) {
    let meta = json!({
        "slug": slug,
        "title": format!("Post {slug}"),
        "description": "d",
        "publishedAt": date,
        "status": "published",
        "category": { "slug": "news", "name": "News" },
        "author": { "name": "Ada" },
        "featured": featured
    });
    write(root, &format!("content/blog/{locale}/{slug}.json"), &meta.to_string());
    write(
        root,
        &format!("content/blog/{locale}/{slug}.mdx"),
        "---\ntitle: ignored\n---\nHello world",
    );
}

fn site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "settings.toml", SETTINGS);

    add_post(root, "en", "first", "2024-01-01T00:00:00Z", false);
    add_post(root, "en", "second", "2024-02-01T00:00:00Z", true);
    add_post(root, "en", "third", "2024-03-01T00:00:00Z", false);

    let legal = json!({
        "slug": "privacy-policy",
        "title": "Privacy",
        "description": "d",
        "publishedAt": "2023-01-01T00:00:00Z"
    });
    write(root, "content/legal/en/privacy-policy.json", &legal.to_string());
    write(root, "content/legal/en/privacy-policy.mdx", "We keep your data safe.");

    write(
        root,
        "locales/en/common.json",
        &json!({ "nav": { "home": "Home" } }).to_string(),
    );
    write(
        root,
        "locales/pl/common.json",
        &json!({ "nav": { "home": "Strona główna" } }).to_string(),
    );
    tmp
}

fn app(tmp: &TempDir) -> Router {
    let settings = load_settings(tmp.path()).unwrap();
    build_app(&settings).unwrap()
}

// === Small IO helpers ===
async fn read(resp: Response) -> (StatusCode, String) {
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap(); // Axum 0.8
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

async fn get(app: &Router, path: &str) -> (StatusCode, String) {
    let req = Request::get(path).body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    read(resp).await
}

async fn get_json(app: &Router, path: &str) -> (StatusCode, Json) {
    let (status, body) = get(app, path).await;
    (status, serde_json::from_str(&body).unwrap())
}

// === Tests ===

#[tokio::test]
async fn health_is_ok() {
    let tmp = site();
    let (status, body) = get(&app(&tmp), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn blog_index_pages_newest_first() {
    let tmp = site();
    let app = app(&tmp);

    let (status, page) = get_json(&app, "/en/blog").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 3);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["items"][0]["meta"]["slug"], "third");
    assert_eq!(page["items"][1]["meta"]["slug"], "second");

    let (_, page) = get_json(&app, "/en/blog?page=2").await;
    assert_eq!(page["items"][0]["meta"]["slug"], "first");
}

#[tokio::test]
async fn page_past_the_end_is_not_found() {
    let tmp = site();
    let (status, body) = get_json(&app(&tmp), "/en/blog?page=3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn featured_and_categories() {
    let tmp = site();
    let app = app(&tmp);

    let (_, featured) = get_json(&app, "/en/blog/featured?limit=5").await;
    assert_eq!(featured.as_array().unwrap().len(), 1);
    assert_eq!(featured[0]["meta"]["slug"], "second");

    let (_, cats) = get_json(&app, "/en/blog/categories").await;
    assert_eq!(cats, json!([{ "slug": "news", "name": "News" }]));
}

#[tokio::test]
async fn document_falls_back_to_default_locale() {
    let tmp = site();
    let (status, doc) = get_json(&app(&tmp), "/pl/legal/privacy-policy").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["language"], "en");
    assert_eq!(doc["body"], "We keep your data safe.");
    assert_eq!(doc["meta"]["kind"], "legal");
}

#[tokio::test]
async fn blog_body_has_front_matter_stripped() {
    let tmp = site();
    let (_, doc) = get_json(&app(&tmp), "/en/blog/first").await;
    assert_eq!(doc["body"], "Hello world");
}

#[tokio::test]
async fn missing_document_is_not_found() {
    let tmp = site();
    let (status, _) = get_json(&app(&tmp), "/en/legal/terms").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn legal_listing_does_not_fall_back() {
    let tmp = site();
    let app = app(&tmp);

    let (_, en) = get_json(&app, "/en/legal").await;
    assert_eq!(en["total"], 1);

    let (_, pl) = get_json(&app, "/pl/legal").await;
    assert_eq!(pl["total"], 0);
}

#[tokio::test]
async fn i18n_snapshot_carries_requested_and_fallback_bundles() {
    let tmp = site();
    let (status, snap) = get_json(&app(&tmp), "/pl/i18n?ns=common").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snap["locale"], "pl");
    assert_eq!(snap["namespaces"], json!(["common"]));
    assert_eq!(snap["resources"]["pl"]["common"]["nav"]["home"], "Strona główna");
    assert_eq!(snap["resources"]["en"]["common"]["nav"]["home"], "Home");
}

#[tokio::test]
async fn api_routes_without_collaborators_are_unavailable() {
    let tmp = site();
    let app = app(&tmp);

    let (status, _) = get(&app, "/api/domains/check?name=example").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let req = Request::post("/api/contact")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "name": "Jo",
                "email": "jo@example.com",
                "message": "Hello there, anyone home?"
            })
            .to_string(),
        ))
        .unwrap();
    let (status, _) = read(app.clone().oneshot(req).await.unwrap()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[test]
fn missing_settings_file_is_a_config_error() {
    let tmp = TempDir::new().unwrap();
    let err = load_settings(tmp.path()).unwrap_err();
    assert!(matches!(err, edge::Error::Config(_)));
}

#[test]
fn relative_content_dirs_resolve_against_the_site_dir() {
    let tmp = site();
    let settings = load_settings(tmp.path()).unwrap();
    assert_eq!(settings.content.blog_dir, tmp.path().join("content/blog"));
    assert_eq!(settings.content.per_page, 2);
    assert!(settings.email.is_none());
}

#[test]
fn zero_page_size_is_rejected() {
    let tmp = site();
    write(
        tmp.path(),
        "settings.toml",
        &SETTINGS.replace("per_page = 2", "per_page = 0"),
    );
    let err = load_settings(tmp.path()).unwrap_err();
    assert!(matches!(err, edge::Error::Config(msg) if msg.contains("per_page")));
}
