//! Logical internal links in raw Markdown, for backlinks and validation.

use crate::resolver::{is_internal_link, link_text_from_url, split_anchor};
use crate::scanner::{scan_markdown_links, scan_wikilinks};
use std::collections::HashSet;
use vaultpress_core::utils::{slugify, strip_folder_index};
use vaultpress_core::{Collection, Document, LinkMatch, LinkValidation};

/// Canonical post slug for a link path.
///
/// `posts/` is dropped and folder `x/index` paths lose `/index`; other
/// slashed paths are slugified whole.
fn post_slug(path: &str) -> String {
    let path = path.strip_prefix("posts/").unwrap_or(path);
    slugify(strip_folder_index(path))
}

/// Post wikilinks outside code.
///
/// Image wikilinks and same-page anchors are skipped. `link` is the target
/// without its anchor; `display` defaults to the whole target.
pub fn extract_wikilinks(content: &str) -> Vec<LinkMatch> {
    scan_wikilinks(content)
        .into_iter()
        .filter(|span| !span.is_image())
        .filter_map(|span| {
            let target = span.group(0)?;
            let display = span.group(1).unwrap_or(target);
            let (base, _) = split_anchor(target.trim());
            if target.trim().starts_with('#') || base.is_empty() {
                return None;
            }
            Some(LinkMatch::new(base, display.trim(), post_slug(base)))
        })
        .collect()
}

/// Standard `[text](url)` links to posts, outside code.
///
/// Post targets are `posts/` paths, `.md` files and bare slugs; pages,
/// projects and docs links are not collected.
pub fn extract_standard_links(content: &str) -> Vec<LinkMatch> {
    scan_markdown_links(content)
        .into_iter()
        .filter_map(|span| {
            let display = span.group(0)?;
            let url = span.group(1)?.trim();
            if !is_internal_link(url) {
                return None;
            }
            let (link, _) = split_anchor(url);
            if matches!(Collection::split_prefix(link), Some((c, _)) if c != Collection::Posts) {
                return None;
            }
            let link_text = link_text_from_url(url)?;
            let is_post_link = link_text.starts_with("posts/")
                || link.starts_with("/posts/")
                || link.starts_with("posts/")
                || link.ends_with(".md")
                || (!link_text.contains('/') && !link.starts_with('/'));
            if !is_post_link {
                return None;
            }
            let slug = post_slug(&link_text);
            Some(LinkMatch::new(link_text, display.trim(), slug))
        })
        .collect()
}

/// Wikilinks then standard links, de-duplicated by slug (first wins)
pub fn extract_all_internal_links(content: &str) -> Vec<LinkMatch> {
    let mut seen = HashSet::new();
    extract_wikilinks(content)
        .into_iter()
        .chain(extract_standard_links(content))
        .filter(|link| seen.insert(link.slug.clone()))
        .collect()
}

/// Find the post a wikilink target names: exact id first, then title slug
pub fn resolve_wikilink<'a, I>(link: &str, posts: I) -> Option<&'a Document>
where
    I: IntoIterator<Item = &'a Document>,
    I::IntoIter: Clone,
{
    let target = slugify(link);
    let posts = posts.into_iter();
    posts
        .clone()
        .find(|post| post.id == target || post.slug() == target)
        .or_else(|| posts.into_iter().find(|post| slugify(post.title()) == target))
}

/// Split a document's wikilinks into resolvable and dangling ones
pub fn validate_wikilinks<'a, I>(content: &str, posts: I) -> LinkValidation
where
    I: IntoIterator<Item = &'a Document>,
    I::IntoIter: Clone,
{
    let posts = posts.into_iter();
    let mut validation = LinkValidation::default();
    for link in extract_wikilinks(content) {
        if resolve_wikilink(&link.link, posts.clone()).is_some() {
            validation.valid.push(link);
        } else {
            validation.invalid.push(link);
        }
    }
    if !validation.invalid.is_empty() {
        log::debug!("{} unresolved wikilinks", validation.invalid.len());
    }
    validation
}
