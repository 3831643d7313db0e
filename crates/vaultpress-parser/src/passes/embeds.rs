//! Media, web and base embeds.
//!
//! Image nodes pointing at audio, video, PDF or SVG files become players,
//! YouTube and Twitter/X URLs become embed markup, and `.base` references
//! plus ```` ```base ```` blocks become table placeholders resolved later
//! by the site.

use super::{Transform, TransformContext};
use crate::edit::{Flow, TreeEditor, Visit, walk};
use crate::tree::{Node, NodeKind};
use regex::Regex;
use std::sync::LazyLock;
use vaultpress_bases::{ERROR_PLACEHOLDER, placeholder_html, resolve_base_block, resolve_base_embed};
use vaultpress_core::utils::escape_html;
use vaultpress_core::{ContentLayout, Result};

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "3gp", "flac", "aac"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogv", "mov", "mkv", "avi"];

static YOUTUBE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:(?:www\.)?youtube\.com/watch\?v=|youtu\.be/|(?:www\.)?youtube\.com/embed/)([^&\n?#]+)",
    )
    .unwrap()
});

static TWITTER_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://(?:www\.)?(?:twitter|x)\.com/\w+/status/(\d+)").unwrap());

/// Embeddable file types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
    Pdf,
    Svg,
}

/// Media type of a URL from its extension (query, fragment and `|alias` ignored)
pub fn media_kind(url: &str) -> Option<MediaKind> {
    let path = url.split(['?', '#', '|']).next().unwrap_or(url);
    let name = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Audio)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else if ext == "pdf" {
        Some(MediaKind::Pdf)
    } else if ext == "svg" {
        Some(MediaKind::Svg)
    } else {
        None
    }
}

pub fn youtube_id(url: &str) -> Option<&str> {
    YOUTUBE_URL.captures(url).and_then(|c| c.get(1)).map(|m| m.as_str())
}

pub fn twitter_id(url: &str) -> Option<&str> {
    TWITTER_URL.captures(url).and_then(|c| c.get(1)).map(|m| m.as_str())
}

// ============================================================================
// Markup
// ============================================================================

pub fn twitter_embed(id: &str, title: &str) -> String {
    let title = if title.is_empty() { "Twitter post" } else { title };
    format!(
        "<blockquote class=\"twitter-tweet\" data-twitter-embed data-theme=\"preferred_color_scheme\" data-conversation=\"none\" title=\"{}\"><a href=\"https://twitter.com/user/status/{}\"></a></blockquote>",
        escape_html(title),
        id
    )
}

pub fn youtube_embed(id: &str, title: &str) -> String {
    let title = if title.is_empty() { "YouTube video player" } else { title };
    format!(
        concat!(
            "\n<div class=\"youtube-embed aspect-video overflow-hidden rounded-xl my-8\">\n",
            "  <iframe \n",
            "    src=\"https://www.youtube.com/embed/{}?rel=0&modestbranding=1\" \n",
            "    title=\"{}\" \n",
            "    allow=\"accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share\" \n",
            "    allowfullscreen \n",
            "    loading=\"lazy\"\n",
            "    class=\"w-full h-full\"\n",
            "  ></iframe>\n",
            "</div>"
        ),
        escape_html(id),
        escape_html(title)
    )
}

fn player_embed(kind: &str, src: &str, title: &str) -> String {
    format!(
        "<div class=\"{kind}-embed\">\n  <{kind} class=\"{kind}-player\" controls src=\"{}\" title=\"{}\"></{kind}>\n</div>",
        escape_html(src),
        escape_html(title),
    )
}

fn pdf_embed(src: &str, filename: &str, title: &str) -> String {
    let src = escape_html(src);
    format!(
        concat!(
            "<div class=\"pdf-embed\">\n",
            "  <iframe class=\"pdf-viewer\" src=\"{src}\" title=\"{title}\"></iframe>\n",
            "  <div class=\"pdf-info\">\n",
            "    <span class=\"pdf-filename\">{filename}</span>\n",
            "    <a href=\"{src}\" download class=\"pdf-download-link\" target=\"_blank\" rel=\"noopener noreferrer\">Download PDF</a>\n",
            "  </div>\n",
            "</div>"
        ),
        src = src,
        title = escape_html(title),
        filename = escape_html(filename),
    )
}

fn svg_embed(src: &str, alt: &str) -> String {
    format!(
        "<div class=\"svg-embed\">\n  <img src=\"{}\" alt=\"{}\" class=\"svg-image\" />\n</div>",
        escape_html(src),
        escape_html(alt)
    )
}

// ============================================================================
// Pass
// ============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct Embeds;

impl Transform for Embeds {
    fn name(&self) -> &'static str {
        "embeds"
    }

    fn apply(&self, tree: &mut Node, ctx: &TransformContext<'_>) -> Result<()> {
        let mut editor = TreeEditor::new();
        walk(tree, &mut |visit| {
            let html = match &visit.node.kind {
                NodeKind::Image { url, alt, .. } => image_embed(url, alt, ctx),
                NodeKind::Link { url, title } => link_embed(url, title),
                NodeKind::Code {
                    lang: Some(lang),
                    value,
                } if lang.eq_ignore_ascii_case("base") => Some(base_block_html(value)),
                _ => None,
            };
            match html {
                Some(html) => {
                    editor.update(embed_target(&visit), Node::html(html));
                    Flow::Skip
                }
                None => Flow::Continue,
            }
        });
        let embedded = editor.commit(tree);
        if embedded > 0 {
            log::debug!("Rendered {} embeds in {}", embedded, ctx.document.id);
        }
        Ok(())
    }
}

/// The embed's own path, or its paragraph's when it is the paragraph's only content
fn embed_target<'a>(visit: &Visit<'a>) -> &'a [usize] {
    let sole_content = visit.parent().is_some_and(|parent| {
        parent.kind == NodeKind::Paragraph
            && parent
                .children
                .iter()
                .enumerate()
                .all(|(i, c)| i == visit.index() || c.is_blank_text())
    });
    if sole_content {
        &visit.path[..visit.path.len() - 1]
    } else {
        visit.path
    }
}

fn is_external(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn image_embed(raw_url: &str, alt: &str, ctx: &TransformContext<'_>) -> Option<String> {
    let without_alias = raw_url.split('|').next().unwrap_or(raw_url);
    let url = without_alias.split('#').next().unwrap_or(without_alias);

    if is_external(url) {
        if let Some(id) = twitter_id(url) {
            return Some(twitter_embed(id, alt));
        }
        if let Some(id) = youtube_id(url) {
            return Some(youtube_embed(id, alt));
        }
    }

    if url.to_ascii_lowercase().ends_with(".base") {
        return Some(base_embed_html(raw_url, url, alt, ctx));
    }

    let kind = media_kind(url)?;
    let src = media_url(url, ctx);
    let file_name = url.rsplit('/').next().filter(|n| !n.is_empty());
    Some(match kind {
        MediaKind::Audio => {
            let title = non_empty(alt).or(file_name).unwrap_or("Audio file");
            player_embed("audio", &src, title)
        }
        MediaKind::Video => {
            let title = non_empty(alt).or(file_name).unwrap_or("Video file");
            player_embed("video", &src, title)
        }
        MediaKind::Pdf => {
            // keep `#page=N` for the viewer
            let fragment = without_alias.find('#').map_or("", |i| &without_alias[i..]);
            let src = format!("{}{}", src, fragment);
            let filename = file_name.unwrap_or("document.pdf");
            pdf_embed(&src, filename, non_empty(alt).unwrap_or(filename))
        }
        MediaKind::Svg => svg_embed(&src, alt),
    })
}

fn non_empty(s: &str) -> Option<&str> {
    Some(s).filter(|s| !s.is_empty())
}

fn link_embed(url: &str, title: &str) -> Option<String> {
    if let Some(id) = youtube_id(url) {
        return Some(youtube_embed(id, title));
    }
    twitter_id(url).map(|id| twitter_embed(id, title))
}

/// Public URL of a relative `attachments/` media file; other URLs are kept
fn media_url(url: &str, ctx: &TransformContext<'_>) -> String {
    let relative_attachment =
        !url.starts_with('/') && (url.starts_with("attachments/") || url.contains("/attachments/"));
    if !relative_attachment {
        return url.to_string();
    }
    let collection = ctx.document.collection.asset_collection();
    match ctx.document.layout() {
        ContentLayout::Folder { slug } => format!("/{}/{}/{}", collection, slug, url),
        ContentLayout::File => format!("/{}/{}", collection, url),
    }
}

/// Placeholder for `![[name.base|params]]`; parameters may also arrive as
/// the alt text after the wikilink pass split them off.
fn base_embed_html(raw_url: &str, url: &str, alt: &str, ctx: &TransformContext<'_>) -> String {
    let target = if raw_url.contains('|') {
        raw_url.to_string()
    } else if alt.contains('=') {
        format!("{}|{}", url, alt)
    } else {
        url.to_string()
    };
    let html = resolve_base_embed(&target, ctx.bases).and_then(|config| placeholder_html(&config));
    html.unwrap_or_else(|e| {
        log::warn!("Failed to resolve base embed {} in {}: {}", target, ctx.document.id, e);
        ERROR_PLACEHOLDER.to_string()
    })
}

fn base_block_html(body: &str) -> String {
    resolve_base_block(body)
        .and_then(|config| placeholder_html(&config))
        .unwrap_or_else(|e| {
            log::warn!("Failed to parse base block: {}", e);
            ERROR_PLACEHOLDER.to_string()
        })
}
