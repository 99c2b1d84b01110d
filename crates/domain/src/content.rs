use crate::locale::Locale;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Words per minute used when a blog record does not carry `readingTime`.
pub const WORDS_PER_MINUTE: u32 = 200;

// ─────────────────────────────────────────────────────────────────────────────
// Collections
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Blog,
    Legal,
}

impl Collection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Collection::Blog => "blog",
            Collection::Legal => "legal",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blog" => Ok(Collection::Blog),
            "legal" => Ok(Collection::Legal),
            other => Err(format!("unknown collection: {other}")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Metadata records
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Published,
    Draft,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogMeta {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub status: PublishStatus,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: Author,
    #[serde(default)]
    pub featured: bool,
    pub reading_time: Option<u32>,
    pub word_count: Option<u32>,
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalMeta {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub category: Option<Category>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetaError {
    #[error("field `{0}` must not be empty")]
    Empty(&'static str),

    #[error("slug `{found}` does not match file name `{expected}`")]
    SlugMismatch { expected: String, found: String },

    #[error("updatedAt is earlier than publishedAt")]
    UpdatedBeforePublished,
}

fn require(field: &'static str, value: &str) -> Result<(), MetaError> {
    if value.trim().is_empty() {
        return Err(MetaError::Empty(field));
    }
    Ok(())
}

fn require_slug(expected: &str, found: &str) -> Result<(), MetaError> {
    require("slug", found)?;
    if expected != found {
        return Err(MetaError::SlugMismatch {
            expected: expected.to_owned(),
            found: found.to_owned(),
        });
    }
    Ok(())
}

fn require_dates(
    published: DateTime<Utc>,
    updated: Option<DateTime<Utc>>,
) -> Result<(), MetaError> {
    match updated {
        Some(u) if u < published => Err(MetaError::UpdatedBeforePublished),
        _ => Ok(()),
    }
}

impl BlogMeta {
    /// Load-time validation; `file_slug` is the stem of the metadata file.
    pub fn validate(&self, file_slug: &str) -> Result<(), MetaError> {
        require_slug(file_slug, &self.slug)?;
        require("title", &self.title)?;
        require("category.slug", &self.category.slug)?;
        require("category.name", &self.category.name)?;
        require("author.name", &self.author.name)?;
        require_dates(self.published_at, self.updated_at)
    }

    pub fn is_published(&self) -> bool {
        self.status == PublishStatus::Published
    }

    /// Fill in `wordCount`/`readingTime` from the body when the record omits them.
    pub fn with_reading_stats(mut self, body: &str) -> Self {
        let words = self
            .word_count
            .unwrap_or_else(|| body.split_whitespace().count() as u32);
        self.word_count = Some(words);
        if self.reading_time.is_none() {
            self.reading_time = Some(words.div_ceil(WORDS_PER_MINUTE).max(1));
        }
        self
    }
}

impl LegalMeta {
    pub fn validate(&self, file_slug: &str) -> Result<(), MetaError> {
        require_slug(file_slug, &self.slug)?;
        require("title", &self.title)?;
        if let Some(cat) = &self.category {
            require("category.slug", &cat.slug)?;
            require("category.name", &cat.name)?;
        }
        require_dates(self.published_at, self.updated_at)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Documents
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DocumentMeta {
    Blog(BlogMeta),
    Legal(LegalMeta),
}

/// A fully loaded metadata + body pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub meta: DocumentMeta,
    /// Body text with front matter removed.
    pub body: String,
    /// Locale whose files were actually read.
    pub language: Locale,
}

impl Document {
    pub fn collection(&self) -> Collection {
        match self.meta {
            DocumentMeta::Blog(_) => Collection::Blog,
            DocumentMeta::Legal(_) => Collection::Legal,
        }
    }

    pub fn slug(&self) -> &str {
        match &self.meta {
            DocumentMeta::Blog(m) => &m.slug,
            DocumentMeta::Legal(m) => &m.slug,
        }
    }

    pub fn title(&self) -> &str {
        match &self.meta {
            DocumentMeta::Blog(m) => &m.title,
            DocumentMeta::Legal(m) => &m.title,
        }
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        match &self.meta {
            DocumentMeta::Blog(m) => m.published_at,
            DocumentMeta::Legal(m) => m.published_at,
        }
    }

    pub fn category(&self) -> Option<&Category> {
        match &self.meta {
            DocumentMeta::Blog(m) => Some(&m.category),
            DocumentMeta::Legal(m) => m.category.as_ref(),
        }
    }

    pub fn is_featured(&self) -> bool {
        matches!(&self.meta, DocumentMeta::Blog(m) if m.featured)
    }

    /// Legal documents have no status and are always publishable.
    pub fn is_published(&self) -> bool {
        match &self.meta {
            DocumentMeta::Blog(m) => m.is_published(),
            DocumentMeta::Legal(_) => true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Listing
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListQuery {
    pub offset: usize,
    pub limit: usize,
    pub category: Option<String>,
}

impl ListQuery {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit,
            category: None,
        }
    }

    pub fn with_category(mut self, slug: impl Into<String>) -> Self {
        self.category = Some(slug.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    /// Count after filtering, before slicing.
    pub total: usize,
}

/// One 1-based page of a listing, as served by the blog index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOf<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn blog_json() -> serde_json::Value {
        serde_json::json!({
            "slug": "hello-world",
            "title": "Hello",
            "description": "First post",
            "publishedAt": "2024-03-01T10:00:00Z",
            "status": "published",
            "category": { "slug": "news", "name": "News" },
            "tags": ["intro"],
            "author": { "name": "Ada" }
        })
    }

    #[test]
    fn blog_meta_parses_camel_case_and_defaults() {
        let meta: BlogMeta = serde_json::from_value(blog_json()).unwrap();
        assert_eq!(meta.slug, "hello-world");
        assert_eq!(
            meta.published_at,
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
        );
        assert!(!meta.featured);
        assert!(meta.is_published());
        assert!(meta.validate("hello-world").is_ok());
    }

    #[test]
    fn blog_meta_rejects_missing_required_fields_and_unknown_status() {
        let mut v = blog_json();
        v.as_object_mut().unwrap().remove("author");
        assert!(serde_json::from_value::<BlogMeta>(v).is_err());

        let mut v = blog_json();
        v["status"] = "pending".into();
        assert!(serde_json::from_value::<BlogMeta>(v).is_err());
    }

    #[test]
    fn validate_flags_slug_mismatch_and_empty_title() {
        let mut meta: BlogMeta = serde_json::from_value(blog_json()).unwrap();
        assert_eq!(
            meta.validate("other"),
            Err(MetaError::SlugMismatch {
                expected: "other".into(),
                found: "hello-world".into()
            })
        );
        meta.title = "  ".into();
        assert_eq!(meta.validate("hello-world"), Err(MetaError::Empty("title")));
    }

    #[test]
    fn validate_flags_update_before_publish() {
        let mut v = blog_json();
        v["updatedAt"] = "2024-01-01T00:00:00Z".into();
        let meta: BlogMeta = serde_json::from_value(v).unwrap();
        assert_eq!(
            meta.validate("hello-world"),
            Err(MetaError::UpdatedBeforePublished)
        );
    }

    #[test]
    fn reading_stats_are_derived_when_missing() {
        let meta: BlogMeta = serde_json::from_value(blog_json()).unwrap();
        let body = "word ".repeat(401);
        let meta = meta.with_reading_stats(&body);
        assert_eq!(meta.word_count, Some(401));
        assert_eq!(meta.reading_time, Some(3));

        let short: BlogMeta = serde_json::from_value(blog_json()).unwrap();
        assert_eq!(short.with_reading_stats("").reading_time, Some(1));
    }

    #[test]
    fn reading_stats_keep_authored_values() {
        let mut v = blog_json();
        v["readingTime"] = 7.into();
        v["wordCount"] = 1200.into();
        let meta: BlogMeta = serde_json::from_value(v).unwrap();
        let meta = meta.with_reading_stats("short body");
        assert_eq!(meta.reading_time, Some(7));
        assert_eq!(meta.word_count, Some(1200));
    }

    #[test]
    fn legal_meta_category_is_optional() {
        let meta: LegalMeta = serde_json::from_value(serde_json::json!({
            "slug": "privacy-policy",
            "title": "Privacy",
            "description": "How we handle data",
            "publishedAt": "2023-05-01T00:00:00Z"
        }))
        .unwrap();
        assert!(meta.category.is_none());
        assert!(meta.validate("privacy-policy").is_ok());
    }

    #[test]
    fn document_serializes_kind_tag_and_language() {
        let meta: BlogMeta = serde_json::from_value(blog_json()).unwrap();
        let doc = Document {
            meta: DocumentMeta::Blog(meta),
            body: "Hi".into(),
            language: Locale::En,
        };
        let v = serde_json::to_value(&doc).unwrap();
        assert_eq!(v["meta"]["kind"], "blog");
        assert_eq!(v["meta"]["publishedAt"], "2024-03-01T10:00:00Z");
        assert_eq!(v["language"], "en");
        assert_eq!(doc.collection(), Collection::Blog);
        assert_eq!(doc.category().map(|c| c.slug.as_str()), Some("news"));
    }

    #[test]
    fn collection_parses_case_insensitively() {
        assert_eq!("Blog".parse::<Collection>(), Ok(Collection::Blog));
        assert_eq!("legal".parse::<Collection>(), Ok(Collection::Legal));
        assert!("docs".parse::<Collection>().is_err());
    }
}
