//! Link target resolution to canonical site URLs.
//!
//! Pure functions: nothing here reads the corpus. Whether a resolved post
//! exists is a separate question answered by
//! [`validate_wikilinks`](crate::links::validate_wikilinks).

use vaultpress_core::utils::{decode_uri_component, normalize_index, slugify, strip_folder_index};
use vaultpress_core::Collection;

/// Where a link is being resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkContext<'a> {
    pub collection: Collection,
    pub current_slug: &'a str,
}

impl<'a> LinkContext<'a> {
    pub fn new(collection: Collection, current_slug: &'a str) -> Self {
        Self {
            collection,
            current_slug,
        }
    }
}

/// Result of resolving a link target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Canonical URL, or the original text when unresolved or external
    pub url: String,
    /// Whether the target is site content that was rewritten
    pub is_internal: bool,
    /// Slugified anchor, when the target carried one
    pub anchor: Option<String>,
}

impl Resolution {
    fn unchanged(raw: &str) -> Self {
        Self {
            url: raw.to_string(),
            is_internal: false,
            anchor: None,
        }
    }
}

/// Heading-id form of an anchor: percent-decoded (fail soft), then slugified
pub fn anchor_slug(raw: &str) -> String {
    slugify(&decode_uri_component(raw))
}

/// Split a target at its first `#`.
///
/// The anchor comes back percent-decoded; an empty anchor is `None`.
pub fn split_anchor(target: &str) -> (&str, Option<String>) {
    match target.split_once('#') {
        Some((link, anchor)) if !anchor.is_empty() => (link, Some(decode_uri_component(anchor))),
        Some((link, _)) => (link, None),
        None => (target, None),
    }
}

fn is_external(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://") || target.starts_with("mailto:")
}

/// Whether a link target addresses site content.
///
/// True for `.md` targets, collection-prefixed paths (with or without a
/// leading `/`) and bare slugs without any `/`.
pub fn is_internal_link(target: &str) -> bool {
    let target = target.trim();
    if is_external(target) || target.starts_with('#') {
        return false;
    }
    let (link, _) = split_anchor(target);
    link.ends_with(".md") || Collection::split_prefix(link).is_some() || !link.contains('/')
}

/// A bare name with a non-Markdown file extension (`report.pdf`)
fn has_asset_extension(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty()
                && (1..=5).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
                && !ext.eq_ignore_ascii_case("md")
        }
        None => false,
    }
}

/// Resolve a raw link target to a canonical URL.
///
/// ```
/// use vaultpress_core::Collection;
/// use vaultpress_parser::resolver::{resolve, LinkContext};
///
/// let ctx = LinkContext::new(Collection::Posts, "current");
/// assert_eq!(resolve("posts/trip/index.md#Day%201", &ctx).url, "/posts/trip#day-1");
/// assert_eq!(resolve("special/home.md", &ctx).url, "/");
/// assert_eq!(resolve("My Post", &ctx).url, "/posts/my-post");
/// assert!(!resolve("https://example.com", &ctx).is_internal);
/// ```
pub fn resolve(raw: &str, ctx: &LinkContext<'_>) -> Resolution {
    let target = raw.trim();
    if target.is_empty() || is_external(target) {
        return Resolution::unchanged(raw);
    }

    if let Some(fragment) = target.strip_prefix('#') {
        if fragment.is_empty() {
            return Resolution::unchanged(raw);
        }
        let anchor = anchor_slug(fragment);
        return Resolution {
            url: format!("#{}", anchor),
            is_internal: false,
            anchor: Some(anchor),
        };
    }

    if !is_internal_link(target) {
        return Resolution::unchanged(raw);
    }

    let (link, anchor) = split_anchor(target);
    let path = link.strip_suffix(".md").unwrap_or(link);

    let base = if let Some((collection, rest)) = Collection::split_prefix(path) {
        match collection {
            Collection::Posts | Collection::Projects | Collection::Docs if rest.is_empty() => {
                format!("/{}", collection)
            }
            Collection::Posts | Collection::Projects | Collection::Docs => {
                collection.public_url(strip_folder_index(rest))
            }
            Collection::Pages | Collection::Special => collection.public_url(rest),
        }
    } else if path.contains('/') {
        // only `.md` targets reach here with a slash
        format!("/posts/{}", strip_folder_index(path.trim_start_matches('/')))
    } else if has_asset_extension(path) {
        log::debug!("Leaving asset link {} in {} unresolved", raw, ctx.current_slug);
        return Resolution::unchanged(raw);
    } else {
        let slug = slugify(&decode_uri_component(path));
        if slug.is_empty() {
            log::debug!("Unresolvable link target {} in {}", raw, ctx.current_slug);
            return Resolution::unchanged(raw);
        }
        format!("/posts/{}", slug)
    };

    let anchor = anchor.map(|a| slugify(&a)).filter(|a| !a.is_empty());
    let url = match &anchor {
        Some(anchor) => format!("{}#{}", base, anchor),
        None => base,
    };

    Resolution {
        url: normalize_index(&url),
        is_internal: true,
        anchor,
    }
}

// ============================================================================
// Wikilink targets
// ============================================================================

/// A wikilink target resolved for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikilinkTarget {
    pub url: String,
    /// Post reference carried in `data-wikilink`; empty for same-page anchors
    pub data: String,
    pub same_page: bool,
}

/// Resolve the target half of `[[target|display]]`.
///
/// Wikilinks address posts only. `posts/x` and `x/index` resolve to the
/// post, bare names are slugified, and `[[#heading]]` stays on the page.
/// Other slashed paths return `None` and are left as text.
pub fn resolve_wikilink_target(target: &str) -> Option<WikilinkTarget> {
    let target = target.trim();
    let (link, anchor) = split_anchor(target);

    if target.starts_with('#') || link.is_empty() {
        let fragment = target.strip_prefix('#').unwrap_or(target);
        return Some(WikilinkTarget {
            url: format!("#{}", anchor_slug(fragment)),
            data: String::new(),
            same_page: true,
        });
    }

    let (url, data) = if let Some(post_path) = link.strip_prefix("posts/") {
        let clean = strip_folder_index(post_path);
        (format!("/posts/{}", clean), clean.to_string())
    } else if link.contains('/') {
        let folder = link.strip_suffix("/index").filter(|_| link.split('/').count() == 2)?;
        (format!("/posts/{}", folder), folder.to_string())
    } else {
        (format!("/posts/{}", slugify(link)), link.trim().to_string())
    };

    let url = match anchor {
        Some(anchor) => format!("{}#{}", url, slugify(&anchor)),
        None => url,
    };
    Some(WikilinkTarget {
        url,
        data,
        same_page: false,
    })
}

/// Post-relative link text for a standard link URL.
///
/// Collection prefixes, `.md` and folder `/index` suffixes are removed;
/// `special/home` and empty page paths become `homepage`. Returns `None`
/// for slashed paths outside any known form.
pub fn link_text_from_url(url: &str) -> Option<String> {
    let (link, _) = split_anchor(url.trim());

    let folder_stripped = |path: &str| strip_folder_index(path).to_string();

    if let Some(rest) = link.strip_prefix("posts/").or_else(|| link.strip_prefix("/posts/")) {
        return Some(folder_stripped(rest.strip_suffix(".md").unwrap_or(rest)));
    }
    if let Some(rest) = link.strip_prefix("special/").or_else(|| link.strip_prefix("/special/")) {
        let rest = rest.strip_suffix(".md").unwrap_or(rest);
        return Some(match rest {
            "home" => "homepage".to_string(),
            other => other.to_string(),
        });
    }
    if let Some(rest) = link.strip_prefix("pages/").or_else(|| link.strip_prefix("/pages/")) {
        let rest = rest.strip_suffix(".md").unwrap_or(rest);
        let rest = rest.strip_suffix("/index").unwrap_or(rest);
        let rest = if rest == "index" { "" } else { rest };
        return Some(if rest.is_empty() {
            "homepage".to_string()
        } else {
            rest.to_string()
        });
    }
    if let Some(rest) = link.strip_suffix(".md") {
        return Some(folder_stripped(rest));
    }
    if !link.contains('/') {
        return Some(link.to_string());
    }
    None
}
