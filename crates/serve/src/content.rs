// crates/serve/src/content.rs

//! File-backed content resolution.
//!
//! Layout per collection:
//!
//! ```text
//! <collection-root>/<locale>/<slug>.json   metadata record
//! <collection-root>/<locale>/<slug>.mdx    body
//! ```
//!
//! A document exists only when both files exist. Single-document lookups
//! walk a [`FallbackChain`]; listings never merge locales. Nothing is
//! cached, every call reads the file system.

use domain::content::{
    BlogMeta, Category, Collection, Document, DocumentMeta, LegalMeta, ListQuery, Listing,
    MetaError, PageOf,
};
use domain::locale::{FallbackChain, Locale};
use domain::setting::ContentSettings;
use regex::Regex;
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::LazyLock,
};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::fm::strip_front_matter;

pub const META_EXT: &str = "json";
pub const BODY_EXT: &str = "mdx";

// -----------------------------------------------------------------------------
// Error Type
// -----------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{collection} document `{slug}` not found")]
    NotFound { collection: Collection, slug: String },

    #[error("malformed metadata at {path:?}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl ContentError {
    fn malformed(path: &Path, reason: impl ToString) -> Self {
        ContentError::Malformed {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

// -----------------------------------------------------------------------------
// Utility
// -----------------------------------------------------------------------------

/// URL-safe slug; anything else never reaches the file system.
pub fn is_valid_slug(slug: &str) -> bool {
    static SLUG: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());
    SLUG.is_match(slug)
}

fn read_optional(path: &Path) -> Result<Option<String>, ContentError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ContentError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse_meta(
    collection: Collection,
    path: &Path,
    slug: &str,
    raw: &str,
    body: &str,
) -> Result<DocumentMeta, ContentError> {
    fn check(r: Result<(), MetaError>, path: &Path) -> Result<(), ContentError> {
        r.map_err(|e| ContentError::malformed(path, e))
    }

    match collection {
        Collection::Blog => {
            let meta: BlogMeta =
                serde_json::from_str(raw).map_err(|e| ContentError::malformed(path, e))?;
            check(meta.validate(slug), path)?;
            Ok(DocumentMeta::Blog(meta.with_reading_stats(body)))
        }
        Collection::Legal => {
            let meta: LegalMeta =
                serde_json::from_str(raw).map_err(|e| ContentError::malformed(path, e))?;
            check(meta.validate(slug), path)?;
            Ok(DocumentMeta::Legal(meta))
        }
    }
}

fn sort_documents(collection: Collection, docs: &mut [Document]) {
    match collection {
        Collection::Blog => docs.sort_by(|a, b| {
            b.published_at()
                .cmp(&a.published_at())
                .then_with(|| a.slug().cmp(b.slug()))
        }),
        Collection::Legal => docs.sort_by(|a, b| a.slug().cmp(b.slug())),
    }
}

// -----------------------------------------------------------------------------
// Store
// -----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ContentStore {
    blog_root: PathBuf,
    legal_root: PathBuf,
    default_locale: Locale,
}

impl ContentStore {
    pub fn new(blog_root: PathBuf, legal_root: PathBuf, default_locale: Locale) -> Self {
        Self {
            blog_root,
            legal_root,
            default_locale,
        }
    }

    pub fn from_settings(settings: &ContentSettings) -> Self {
        Self::new(
            settings.blog_dir.clone(),
            settings.legal_dir.clone(),
            settings.default_locale,
        )
    }

    pub fn default_locale(&self) -> Locale {
        self.default_locale
    }

    pub fn root(&self, collection: Collection) -> &Path {
        match collection {
            Collection::Blog => &self.blog_root,
            Collection::Legal => &self.legal_root,
        }
    }

    /// Load one `(collection, locale, slug)` pair. `Ok(None)` when either
    /// file is missing or a blog record is not published.
    fn load(
        &self,
        collection: Collection,
        locale: Locale,
        slug: &str,
    ) -> Result<Option<Document>, ContentError> {
        let dir = self.root(collection).join(locale.as_str());
        let meta_path = dir.join(format!("{slug}.{META_EXT}"));
        let body_path = dir.join(format!("{slug}.{BODY_EXT}"));

        let Some(raw_meta) = read_optional(&meta_path)? else {
            return Ok(None);
        };
        let Some(raw_body) = read_optional(&body_path)? else {
            debug!("{} has no body file", meta_path.display());
            return Ok(None);
        };

        let body = strip_front_matter(&raw_body).body.to_owned();
        let meta = parse_meta(collection, &meta_path, slug, &raw_meta, &body)?;
        let doc = Document {
            meta,
            body,
            language: locale,
        };

        Ok(doc.is_published().then_some(doc))
    }

    /// Resolve a single document, walking `requested → default`.
    ///
    /// A malformed record is logged and treated as missing for that locale,
    /// so the next step of the chain still gets a chance.
    #[tracing::instrument(skip(self))]
    pub fn resolve(
        &self,
        collection: Collection,
        slug: &str,
        locale: &str,
    ) -> Result<Document, ContentError> {
        let not_found = || ContentError::NotFound {
            collection,
            slug: slug.to_owned(),
        };

        if !is_valid_slug(slug) {
            debug!("rejecting unsafe slug {slug:?}");
            return Err(not_found());
        }

        let chain = FallbackChain::new(locale, self.default_locale);
        for &step in chain.steps() {
            match self.load(collection, step, slug) {
                Ok(Some(doc)) => {
                    debug!("resolved {collection}/{slug} in {step}");
                    return Ok(doc);
                }
                Ok(None) if step != chain.fallback() => {
                    debug!("{collection}/{slug} missing in {step}, trying {}", chain.fallback())
                }
                Ok(None) => debug!("{collection}/{slug} missing in {step}"),
                Err(e @ ContentError::Malformed { .. }) => warn!("{e}"),
                Err(e) => return Err(e),
            }
        }

        debug!("{collection}/{slug} not found for {:?}", chain.requested());
        Err(not_found())
    }

    /// Every valid, published document of one locale, in listing order.
    fn load_all(&self, collection: Collection, locale: &str) -> Result<Vec<Document>, ContentError> {
        let Some(locale) = Locale::parse(locale) else {
            return Ok(Vec::new());
        };
        let dir = self.root(collection).join(locale.as_str());
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut docs = Vec::new();
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(META_EXT)
            {
                continue;
            }
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_valid_slug(slug) {
                debug!("skipping {} (unsafe slug)", path.display());
                continue;
            }

            match self.load(collection, locale, slug) {
                Ok(Some(doc)) => docs.push(doc),
                Ok(None) => {}
                Err(e @ ContentError::Malformed { .. }) => warn!("skipping: {e}"),
                Err(e) => return Err(e),
            }
        }

        sort_documents(collection, &mut docs);
        Ok(docs)
    }

    /// Filtered page of a collection plus the post-filter total.
    #[tracing::instrument(skip(self))]
    pub fn list(
        &self,
        collection: Collection,
        locale: &str,
        query: &ListQuery,
    ) -> Result<Listing<Document>, ContentError> {
        let mut docs = self.load_all(collection, locale)?;
        if let Some(wanted) = &query.category {
            docs.retain(|d| d.category().is_some_and(|c| &c.slug == wanted));
        }

        let total = docs.len();
        let items = docs
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();

        Ok(Listing { items, total })
    }

    /// Distinct categories present in the locale, sorted by display name.
    #[tracing::instrument(skip(self))]
    pub fn categories(
        &self,
        collection: Collection,
        locale: &str,
    ) -> Result<Vec<Category>, ContentError> {
        let mut out: Vec<Category> = Vec::new();
        for doc in self.load_all(collection, locale)? {
            if let Some(cat) = doc.category() {
                if !out.iter().any(|c| c.slug == cat.slug) {
                    out.push(cat.clone());
                }
            }
        }
        out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.slug.cmp(&b.slug)));
        Ok(out)
    }

    /// Featured documents in listing order, at most `limit`.
    #[tracing::instrument(skip(self))]
    pub fn featured(
        &self,
        collection: Collection,
        locale: &str,
        limit: usize,
    ) -> Result<Vec<Document>, ContentError> {
        Ok(self
            .load_all(collection, locale)?
            .into_iter()
            .filter(Document::is_featured)
            .take(limit)
            .collect())
    }

    /// 1-based page for index pages.
    ///
    /// `None` means "page not found": page 0, or a page past the end other
    /// than the first. Page 1 of an empty collection is a valid empty page.
    pub fn page(
        &self,
        collection: Collection,
        locale: &str,
        page: usize,
        per_page: usize,
        category: Option<String>,
    ) -> Result<Option<PageOf<Document>>, ContentError> {
        if page == 0 || per_page == 0 {
            return Ok(None);
        }
        let Some(offset) = (page - 1).checked_mul(per_page) else {
            return Ok(None);
        };

        let query = ListQuery {
            offset,
            limit: per_page,
            category,
        };
        let listing = self.list(collection, locale, &query)?;
        if page > 1 && listing.items.is_empty() {
            return Ok(None);
        }

        Ok(Some(PageOf {
            total_pages: listing.total.div_ceil(per_page),
            items: listing.items,
            total: listing.total,
            page,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::locale::DEFAULT_LOCALE;
    use serde_json::json;
    use tempfile::TempDir;

    // ─────────────────────────────────────────────────────────────
    // Fixtures
    // ─────────────────────────────────────────────────────────────

    fn store(tmp: &TempDir) -> ContentStore {
        ContentStore::new(
            tmp.path().join("blog"),
            tmp.path().join("legal"),
            DEFAULT_LOCALE,
        )
    }

    fn write(tmp: &TempDir, collection: &str, locale: &str, file: &str, text: &str) {
        let dir = tmp.path().join(collection).join(locale);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), text).unwrap();
    }

    fn blog_meta(slug: &str, date: &str, category: &str, status: &str, featured: bool) -> String {
        json!({
            "slug": slug,
            "title": format!("Title {slug}"),
            "description": "desc",
            "publishedAt": date,
            "status": status,
            "category": { "slug": category, "name": category.to_uppercase() },
            "author": { "name": "Ada" },
            "featured": featured
        })
        .to_string()
    }

    fn add_post(tmp: &TempDir, locale: &str, slug: &str, date: &str, category: &str) {
        add_post_with(tmp, locale, slug, date, category, "published", false);
    }

    fn add_post_with(
        tmp: &TempDir,
        locale: &str,
        slug: &str,
        date: &str,
        category: &str,
        status: &str,
        featured: bool,
    ) {
        write(
            tmp,
            "blog",
            locale,
            &format!("{slug}.json"),
            &blog_meta(slug, date, category, status, featured),
        );
        write(tmp, "blog", locale, &format!("{slug}.mdx"), "Body of the post");
    }

    fn add_legal(tmp: &TempDir, locale: &str, slug: &str, body: &str) {
        let meta = json!({
            "slug": slug,
            "title": format!("Legal {slug}"),
            "description": "d",
            "publishedAt": "2023-01-01T00:00:00Z"
        });
        write(tmp, "legal", locale, &format!("{slug}.json"), &meta.to_string());
        write(tmp, "legal", locale, &format!("{slug}.mdx"), body);
    }

    fn slugs(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(Document::slug).collect()
    }

    // ─────────────────────────────────────────────────────────────
    // resolve
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn privacy_policy_in_polish_falls_back_to_english() {
        let tmp = TempDir::new().unwrap();
        add_legal(&tmp, "en", "privacy-policy", "---\ntitle: x\n---\nWe keep your data safe.");

        let doc = store(&tmp)
            .resolve(Collection::Legal, "privacy-policy", "pl")
            .unwrap();
        assert_eq!(doc.language, Locale::En);
        assert_eq!(doc.slug(), "privacy-policy");
        assert_eq!(doc.body, "We keep your data safe.");
    }

    #[test]
    fn requested_locale_wins_when_present() {
        let tmp = TempDir::new().unwrap();
        add_legal(&tmp, "en", "terms", "English");
        add_legal(&tmp, "pl", "terms", "Polski");

        let doc = store(&tmp).resolve(Collection::Legal, "terms", "pl").unwrap();
        assert_eq!(doc.language, Locale::Pl);
        assert_eq!(doc.body, "Polski");
    }

    #[test]
    fn default_only_documents_resolve_for_every_locale() {
        let tmp = TempDir::new().unwrap();
        add_post(&tmp, "en", "launch", "2024-01-01T00:00:00Z", "news");
        let s = store(&tmp);

        for locale in ["en", "es", "de", "fr", "pl", "xx", ""] {
            let doc = s.resolve(Collection::Blog, "launch", locale).unwrap();
            assert_eq!(doc.language, Locale::En, "locale {locale:?}");
        }
    }

    #[test]
    fn missing_everywhere_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = store(&tmp)
            .resolve(Collection::Legal, "privacy-policy", "pl")
            .unwrap_err();
        assert!(matches!(err, ContentError::NotFound { .. }));
    }

    #[test]
    fn half_a_document_is_not_found() {
        let tmp = TempDir::new().unwrap();
        write(&tmp, "legal", "en", "meta-only.json", &json!({
            "slug": "meta-only", "title": "t", "description": "d",
            "publishedAt": "2023-01-01T00:00:00Z"
        }).to_string());
        write(&tmp, "legal", "en", "body-only.mdx", "text");
        let s = store(&tmp);

        assert!(matches!(
            s.resolve(Collection::Legal, "meta-only", "en"),
            Err(ContentError::NotFound { .. })
        ));
        assert!(matches!(
            s.resolve(Collection::Legal, "body-only", "en"),
            Err(ContentError::NotFound { .. })
        ));
    }

    #[test]
    fn drafts_are_not_resolvable() {
        let tmp = TempDir::new().unwrap();
        add_post_with(&tmp, "en", "wip", "2024-01-01T00:00:00Z", "news", "draft", false);
        assert!(matches!(
            store(&tmp).resolve(Collection::Blog, "wip", "en"),
            Err(ContentError::NotFound { .. })
        ));
    }

    #[test]
    fn malformed_translation_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        add_post(&tmp, "en", "post", "2024-01-01T00:00:00Z", "news");
        write(&tmp, "blog", "de", "post.json", "{ not json");
        write(&tmp, "blog", "de", "post.mdx", "Deutsch");

        let doc = store(&tmp).resolve(Collection::Blog, "post", "de").unwrap();
        assert_eq!(doc.language, Locale::En);
    }

    #[test]
    fn unsafe_slugs_never_resolve() {
        let tmp = TempDir::new().unwrap();
        add_legal(&tmp, "en", "terms", "x");
        let s = store(&tmp);
        for slug in ["", "../en/terms", "terms/", ".hidden", "a b"] {
            assert!(matches!(
                s.resolve(Collection::Legal, slug, "en"),
                Err(ContentError::NotFound { .. })
            ));
        }
    }

    #[test]
    fn slugs_may_start_with_underscore_or_hyphen() {
        let tmp = TempDir::new().unwrap();
        add_legal(&tmp, "en", "_imprint", "Impressum");
        add_legal(&tmp, "en", "-cookies", "Cookies");
        let s = store(&tmp);

        assert_eq!(s.resolve(Collection::Legal, "_imprint", "pl").unwrap().body, "Impressum");
        assert_eq!(s.resolve(Collection::Legal, "-cookies", "en").unwrap().body, "Cookies");
        let listed = s.list(Collection::Legal, "en", &ListQuery::new(0, 10)).unwrap();
        assert_eq!(listed.total, 2);
    }

    #[test]
    fn blog_reading_stats_are_filled_in() {
        let tmp = TempDir::new().unwrap();
        add_post(&tmp, "en", "stats", "2024-01-01T00:00:00Z", "news");
        let doc = store(&tmp).resolve(Collection::Blog, "stats", "en").unwrap();
        match doc.meta {
            DocumentMeta::Blog(m) => {
                assert_eq!(m.word_count, Some(4));
                assert_eq!(m.reading_time, Some(1));
            }
            DocumentMeta::Legal(_) => panic!("expected blog"),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // list / categories / featured
    // ─────────────────────────────────────────────────────────────

    fn seeded() -> TempDir {
        let tmp = TempDir::new().unwrap();
        add_post(&tmp, "en", "a-old", "2023-01-01T00:00:00Z", "news");
        add_post(&tmp, "en", "b-new", "2024-06-01T00:00:00Z", "guides");
        add_post(&tmp, "en", "c-tie", "2024-03-01T00:00:00Z", "news");
        add_post(&tmp, "en", "d-tie", "2024-03-01T00:00:00Z", "news");
        add_post_with(&tmp, "en", "e-draft", "2025-01-01T00:00:00Z", "news", "draft", false);
        add_post_with(&tmp, "en", "f-feat", "2022-01-01T00:00:00Z", "dns", "published", true);
        add_post_with(&tmp, "en", "g-feat", "2024-07-01T00:00:00Z", "guides", "published", true);
        write(&tmp, "blog", "en", "h-broken.json", "{\"slug\": 3}");
        write(&tmp, "blog", "en", "h-broken.mdx", "x");
        tmp
    }

    #[test]
    fn listing_is_recency_ordered_and_excludes_drafts_and_broken() {
        let tmp = seeded();
        let listing = store(&tmp)
            .list(Collection::Blog, "en", &ListQuery::new(0, 100))
            .unwrap();
        assert_eq!(
            slugs(&listing.items),
            vec!["g-feat", "b-new", "c-tie", "d-tie", "a-old", "f-feat"]
        );
        assert_eq!(listing.total, 6);
        assert!(listing.items.iter().all(Document::is_published));
    }

    #[test]
    fn category_filter_applies_before_total() {
        let tmp = seeded();
        let listing = store(&tmp)
            .list(
                Collection::Blog,
                "en",
                &ListQuery::new(1, 1).with_category("news"),
            )
            .unwrap();
        assert_eq!(listing.total, 3);
        assert_eq!(slugs(&listing.items), vec!["d-tie"]);
    }

    #[test]
    fn pages_are_slices_of_the_full_listing() {
        let tmp = seeded();
        let s = store(&tmp);
        for offset in 0..8 {
            for limit in 0..8 {
                let page = s
                    .list(Collection::Blog, "en", &ListQuery::new(offset, limit))
                    .unwrap();
                let prefix = s
                    .list(Collection::Blog, "en", &ListQuery::new(0, offset + limit))
                    .unwrap();
                assert!(page.items.len() <= limit);
                let expected: Vec<_> = prefix.items.iter().skip(offset).cloned().collect();
                assert_eq!(page.items, expected, "offset {offset} limit {limit}");
            }
        }
    }

    #[test]
    fn listing_is_idempotent() {
        let tmp = seeded();
        let s = store(&tmp);
        let q = ListQuery::new(1, 3);
        let first = s.list(Collection::Blog, "en", &q).unwrap();
        let second = s.list(Collection::Blog, "en", &q).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn offset_past_total_is_an_empty_page() {
        let tmp = seeded();
        let listing = store(&tmp)
            .list(Collection::Blog, "en", &ListQuery::new(50, 10))
            .unwrap();
        assert!(listing.items.is_empty());
        assert_eq!(listing.total, 6);
    }

    #[test]
    fn listing_does_not_fall_back_across_locales() {
        let tmp = seeded();
        let s = store(&tmp);
        for locale in ["pl", "zz"] {
            let listing = s
                .list(Collection::Blog, locale, &ListQuery::new(0, 10))
                .unwrap();
            assert!(listing.items.is_empty());
            assert_eq!(listing.total, 0);
        }
    }

    #[test]
    fn legal_listing_is_slug_ordered() {
        let tmp = TempDir::new().unwrap();
        add_legal(&tmp, "en", "terms", "t");
        add_legal(&tmp, "en", "cookies", "c");
        add_legal(&tmp, "en", "privacy-policy", "p");
        let listing = store(&tmp)
            .list(Collection::Legal, "en", &ListQuery::new(0, 10))
            .unwrap();
        assert_eq!(slugs(&listing.items), vec!["cookies", "privacy-policy", "terms"]);
    }

    #[test]
    fn categories_are_distinct_and_sorted_by_name() {
        let tmp = seeded();
        let cats = store(&tmp).categories(Collection::Blog, "en").unwrap();
        let names: Vec<_> = cats.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["DNS", "GUIDES", "NEWS"]);
    }

    #[test]
    fn featured_keeps_recency_and_limit() {
        let tmp = seeded();
        let s = store(&tmp);
        assert_eq!(
            slugs(&s.featured(Collection::Blog, "en", 10).unwrap()),
            vec!["g-feat", "f-feat"]
        );
        assert_eq!(
            slugs(&s.featured(Collection::Blog, "en", 1).unwrap()),
            vec!["g-feat"]
        );
    }

    // ─────────────────────────────────────────────────────────────
    // page
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn page_beyond_results_is_not_found() {
        let tmp = seeded();
        let s = store(&tmp);
        let first = s.page(Collection::Blog, "en", 1, 9, None).unwrap().unwrap();
        assert_eq!(first.total_pages, 1);
        assert_eq!(first.items.len(), 6);
        assert!(s.page(Collection::Blog, "en", 3, 9, None).unwrap().is_none());
        assert!(s.page(Collection::Blog, "en", 0, 9, None).unwrap().is_none());
    }

    #[test]
    fn first_page_of_empty_collection_is_valid() {
        let tmp = TempDir::new().unwrap();
        let page = store(&tmp)
            .page(Collection::Blog, "fr", 1, 9, None)
            .unwrap()
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn second_page_holds_the_remainder() {
        let tmp = seeded();
        let page = store(&tmp)
            .page(Collection::Blog, "en", 2, 4, None)
            .unwrap()
            .unwrap();
        assert_eq!(slugs(&page.items), vec!["a-old", "f-feat"]);
        assert_eq!(page.total_pages, 2);
    }
}
