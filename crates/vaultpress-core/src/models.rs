//! Core data models for published content.
//!
//! These types are designed to be:
//! - **Serializable**: All types derive Serialize/Deserialize
//! - **Immutable once loaded**: documents are read once per build and never mutated
//! - **Type-Safe**: Enums replace collection-name strings

use crate::error::{Error, Result};
use crate::utils::{normalize_index, parse_date};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// ============================================================================
// Collections
// ============================================================================

/// Content collection a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Posts,
    Pages,
    Projects,
    Docs,
    Special,
}

impl Collection {
    /// Every collection, in URL-prefix matching order.
    pub const ALL: [Collection; 5] = [
        Collection::Posts,
        Collection::Pages,
        Collection::Projects,
        Collection::Docs,
        Collection::Special,
    ];

    /// Collections that can back a base table.
    pub const QUERYABLE: [Collection; 4] = [
        Collection::Posts,
        Collection::Pages,
        Collection::Projects,
        Collection::Docs,
    ];

    /// Directory / prefix name of the collection
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Posts => "posts",
            Collection::Pages => "pages",
            Collection::Projects => "projects",
            Collection::Docs => "docs",
            Collection::Special => "special",
        }
    }

    /// Collection whose public asset folder serves this collection's images.
    ///
    /// Special pages publish their attachments under `pages`.
    pub fn asset_collection(&self) -> Collection {
        match self {
            Collection::Special => Collection::Pages,
            other => *other,
        }
    }

    /// Split a collection prefix (`posts/x` or `/posts/x`) off a path.
    ///
    /// Returns the collection and the remainder after the prefix.
    ///
    /// ```
    /// use vaultpress_core::Collection;
    ///
    /// assert_eq!(
    ///     Collection::split_prefix("/docs/setup/index"),
    ///     Some((Collection::Docs, "setup/index"))
    /// );
    /// assert_eq!(Collection::split_prefix("notes/x"), None);
    /// ```
    pub fn split_prefix(path: &str) -> Option<(Collection, &str)> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        Self::ALL.iter().find_map(|collection| {
            trimmed
                .strip_prefix(collection.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .map(|rest| (*collection, rest))
        })
    }

    /// Public URL of a document slug in this collection.
    ///
    /// Pages have no collection prefix and special pages map onto the site
    /// root. The result never ends in `/index`.
    pub fn public_url(&self, slug: &str) -> String {
        let slug = slug.trim_matches('/');
        let url = match self {
            Collection::Posts => format!("/posts/{}", slug),
            Collection::Projects => format!("/projects/{}", slug),
            Collection::Docs => format!("/docs/{}", slug),
            Collection::Pages => match slug {
                "" | "index" => "/".to_string(),
                other => format!("/{}", other),
            },
            Collection::Special => match slug {
                "" | "home" | "index" => "/".to_string(),
                other => format!("/{}", other),
            },
        };
        normalize_index(&url)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| Error::parse_error(format!("unknown collection: {}", s)))
    }
}

/// How a document stores its assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentLayout {
    /// `<slug>/index.md` with co-located assets
    Folder { slug: String },
    /// A flat file sharing the collection's `attachments/` folder
    File,
}

// ============================================================================
// Frontmatter
// ============================================================================

/// Frontmatter fields the pipeline reads, plus everything else as an opaque map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frontmatter {
    pub title: String,
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub draft: bool,
    pub category: Option<String>,
    pub order: Option<i64>,
    pub image: Option<String>,
    pub aliases: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Frontmatter {
    /// Frontmatter with just a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the publication date (builder style)
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Publication date, when present and parseable
    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(parse_date)
    }
}

// ============================================================================
// Documents
// ============================================================================

/// A single content document. Identity is `id` within its collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Slug-like identifier, possibly folder-based (`my-post/index`)
    pub id: String,
    pub collection: Collection,
    /// Raw Markdown body, frontmatter already removed
    pub body: String,
    pub frontmatter: Frontmatter,
    /// Source path relative to the content root (`posts/my-post/index.md`)
    pub path: Option<PathBuf>,
}

impl Document {
    /// Create a document with empty frontmatter
    pub fn new(collection: Collection, id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            collection,
            body: body.into(),
            frontmatter: Frontmatter::default(),
            path: None,
        }
    }

    /// Attach frontmatter (builder style)
    pub fn with_frontmatter(mut self, frontmatter: Frontmatter) -> Self {
        self.frontmatter = frontmatter;
        self
    }

    /// Attach the source path (builder style)
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Display title: frontmatter title, falling back to the slug
    pub fn title(&self) -> &str {
        if self.frontmatter.title.is_empty() {
            self.slug()
        } else {
            &self.frontmatter.title
        }
    }

    /// Canonical slug: the id without a folder-based `/index` suffix
    pub fn slug(&self) -> &str {
        self.id.strip_suffix("/index").unwrap_or(&self.id)
    }

    /// Canonical public URL
    pub fn url(&self) -> String {
        self.collection.public_url(self.slug())
    }

    /// Folder-based vs. file-based storage.
    ///
    /// Decided from the source path when known (`.../index.md`), otherwise
    /// from the id (`slug/index`).
    pub fn layout(&self) -> ContentLayout {
        if let Some(path) = &self.path {
            let normalized = path.to_string_lossy().replace('\\', "/");
            if normalized.ends_with("/index.md") {
                let parts: Vec<&str> = normalized.split('/').collect();
                let slug = parts
                    .iter()
                    .position(|p| *p == self.collection.as_str())
                    .and_then(|i| parts.get(i + 1))
                    .or_else(|| parts.iter().rev().nth(1))
                    .map(|s| s.to_string());
                if let Some(slug) = slug {
                    return ContentLayout::Folder { slug };
                }
            }
            return ContentLayout::File;
        }

        match self.id.strip_suffix("/index") {
            Some(slug) if !slug.is_empty() => ContentLayout::Folder {
                slug: slug.split('/').next().unwrap_or(slug).to_string(),
            },
            _ => ContentLayout::File,
        }
    }
}

// ============================================================================
// Corpus
// ============================================================================

/// Read-only snapshot of every document in the build.
///
/// Built once before any per-document pass runs and then shared by
/// reference (or `Arc`) with every pass that resolves links.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    index: HashMap<(Collection, String), usize>,
}

impl Corpus {
    /// Build a corpus from documents. Later duplicates of an id are ignored.
    pub fn new(documents: Vec<Document>) -> Self {
        let mut index = HashMap::with_capacity(documents.len());
        let mut kept = Vec::with_capacity(documents.len());
        for doc in documents {
            let key = (doc.collection, doc.id.clone());
            if index.contains_key(&key) {
                log::warn!("Duplicate document id {}/{} ignored", doc.collection, doc.id);
                continue;
            }
            index.insert(key, kept.len());
            kept.push(doc);
        }
        Self {
            documents: kept,
            index,
        }
    }

    /// All documents in load order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Documents of one collection
    pub fn collection(&self, collection: Collection) -> impl Iterator<Item = &Document> + Clone {
        self.documents
            .iter()
            .filter(move |d| d.collection == collection)
    }

    /// All posts (the only collection wikilinks and backlinks address)
    pub fn posts(&self) -> impl Iterator<Item = &Document> + Clone {
        self.collection(Collection::Posts)
    }

    /// Look up a document by exact id
    pub fn get(&self, collection: Collection, id: &str) -> Option<&Document> {
        self.index
            .get(&(collection, id.to_string()))
            .map(|&i| &self.documents[i])
    }

    /// Find a post by canonical slug (accepts folder-based ids)
    pub fn find_post(&self, slug: &str) -> Option<&Document> {
        self.get(Collection::Posts, slug)
            .or_else(|| self.posts().find(|d| d.slug() == slug))
    }

    /// Posts that should be published.
    ///
    /// A post needs a title and a date; drafts only show when
    /// `include_drafts` is set.
    pub fn visible_posts(&self, include_drafts: bool) -> Vec<&Document> {
        self.posts()
            .filter(|d| !d.frontmatter.title.is_empty() && d.frontmatter.date.is_some())
            .filter(|d| include_drafts || !d.frontmatter.draft)
            .collect()
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the corpus is empty
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl FromIterator<Document> for Corpus {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ============================================================================
// Links and backlinks
// ============================================================================

/// A logical internal link found in raw Markdown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkMatch {
    /// Raw target text, anchor removed
    pub link: String,
    /// Text shown to the reader
    pub display: String,
    /// Resolved canonical post slug
    pub slug: String,
}

impl LinkMatch {
    pub fn new(link: impl Into<String>, display: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            display: display.into(),
            slug: slug.into(),
        }
    }
}

/// A post that references another post, with context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedMention {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
}

/// A cleaned text window around a reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Excerpt {
    pub excerpt: String,
    pub is_at_start: bool,
    pub is_at_end: bool,
}
