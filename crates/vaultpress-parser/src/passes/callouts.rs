//! Obsidian callouts: `> [!type][+|-] Title` blockquotes.
//!
//! A callout blockquote is replaced by an opening HTML fragment, its
//! content nodes and a closing fragment, so the content keeps going through
//! the remaining passes as ordinary Markdown.

use super::{Transform, TransformContext};
use crate::edit::{Flow, TreeEditor, walk};
use crate::scanner::scan_callout_header;
use crate::tree::{Node, NodeKind};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use vaultpress_core::Result;
use vaultpress_core::utils::escape_html;

/// Marker alone on the first line of the first text node
static OWN_LINE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[![\w-]+\][+\-]?\s*\n\s*").unwrap());

static MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[![\w-]+\][+\-]?[ \t]*").unwrap());

/// Nesting depth handled; each round converts one more level
const MAX_ROUNDS: usize = 16;

pub const CALLOUT_CLOSE: &str = "</div></div>";

/// Visual style of a callout type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalloutStyle {
    /// CSS modifier (`callout-{kind}`)
    pub kind: &'static str,
    /// Lucide icon name
    pub icon: &'static str,
    pub title: Cow<'static, str>,
}

/// Style for a callout type as written (`[!Warning]` gives `Warning`).
///
/// Unknown types render as notes titled with the capitalized type.
pub fn callout_style(callout_type: &str) -> CalloutStyle {
    let (kind, icon, title) = match callout_type.to_lowercase().as_str() {
        "note" => ("note", "info", "Note"),
        "tip" => ("tip", "lightbulb", "Tip"),
        "important" => ("important", "star", "Important"),
        "warning" => ("warning", "triangle-alert", "Warning"),
        "caution" => ("caution", "circle-alert", "Caution"),
        "danger" => ("caution", "circle-x", "Danger"),
        "info" => ("note", "info", "Info"),
        "question" => ("important", "circle-help", "Question"),
        "success" => ("tip", "circle-check", "Success"),
        "failure" => ("caution", "circle-x", "Failure"),
        "bug" => ("caution", "bug", "Bug"),
        "example" => ("tip", "code", "Example"),
        "quote" => ("note", "quote", "Quote"),
        "abstract" => ("important", "file-text", "Abstract"),
        "summary" => ("important", "file-text", "Summary"),
        "tldr" => ("important", "file-text", "TL;DR"),
        _ => {
            let mut chars = callout_type.chars();
            let title = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            };
            return CalloutStyle {
                kind: "note",
                icon: "info",
                title: Cow::Owned(title),
            };
        }
    };
    CalloutStyle {
        kind,
        icon,
        title: Cow::Borrowed(title),
    }
}

fn icon_paths(icon: &str) -> &'static str {
    match icon {
        "lightbulb" => r#"<path d="M15 14c.2-1 .7-1.7 1.5-2.5 1-.9 1.5-2.2 1.5-3.5A6 6 0 0 0 6 8c0 1 .2 2.2 1.5 3.5.7.7 1.3 1.5 1.5 2.5"/><path d="M9 18h6"/><path d="M10 22h4"/>"#,
        "star" => r#"<polygon points="12,2 15.09,8.26 22,9.27 17,14.14 18.18,21.02 12,17.77 5.82,21.02 7,14.14 2,9.27 8.91,8.26"/>"#,
        "triangle-alert" => r#"<path d="m21.73 18-8-14a2 2 0 0 0-3.48 0l-8 14A2 2 0 0 0 4 21h16a2 2 0 0 0 1.73-3Z"/><path d="M12 9v4"/><path d="m12 17 .01 0"/>"#,
        "circle-alert" => r#"<circle cx="12" cy="12" r="10"/><path d="M12 8v4"/><path d="m12 16 .01 0"/>"#,
        "circle-x" => r#"<circle cx="12" cy="12" r="10"/><path d="m15 9-6 6"/><path d="m9 9 6 6"/>"#,
        "circle-help" => r#"<circle cx="12" cy="12" r="10"/><path d="M9.09 9a3 3 0 0 1 5.83 1c0 2-3 3-3 3"/><path d="M12 17h.01"/>"#,
        "circle-check" => r#"<circle cx="12" cy="12" r="10"/><path d="m9 12 2 2 4-4"/>"#,
        "bug" => r#"<path d="m8 2 1.88 1.88"/><path d="M14.12 3.88 16 2"/><path d="M9 7.13v-1a3.003 3.003 0 1 1 6 0v1"/><path d="M12 20c-3.3 0-6-2.7-6-6v-3a4 4 0 0 1 4-4h4a4 4 0 0 1 4 4v3c0 3.3-2.7 6-6 6"/><path d="M12 20v-9"/><path d="M6.53 9C4.6 8.8 3 7.1 3 5"/><path d="M6 13H2"/><path d="M3 21c0-2.1 1.7-3.9 3.8-4"/><path d="M20.97 5c0 2.1-1.6 3.8-3.5 4"/><path d="M22 13h-4"/><path d="M17.2 17c2.1.1 3.8 1.9 3.8 4"/>"#,
        "code" => r#"<polyline points="16 18 22 12 16 6"/><polyline points="8 6 2 12 8 18"/>"#,
        "quote" => r#"<path d="M3 21c3 0 7-1 7-8V5c0-1.25-.756-2.017-2-2H4c-1.25 0-2 .75-2 1.972V11c0 1.25.75 2 2 2 1 0 1 0 1 1v1c0 1-1 2-2 2s-1 .008-1 1.031V20c0 1 0 1 1 1z"/><path d="M15 21c3 0 7-1 7-8V5c0-1.25-.757-2.017-2-2h-4c-1.25 0-2 .75-2 1.972V11c0 1.25.75 2 2 2h.75c0 2.25.25 4-2.75 4v3c0 1 0 1 1 1z"/>"#,
        "file-text" => r#"<path d="M15 2H6a2 2 0 0 0-2 2v16a2 2 0 0 0 2 2h12a2 2 0 0 0 2-2V7Z"/><path d="M14 2v4a2 2 0 0 0 2 2h4"/><path d="M10 9H8"/><path d="M16 13H8"/><path d="M16 17H8"/>"#,
        // info
        _ => r#"<circle cx="12" cy="12" r="10"/><path d="M12 16v-4"/><path d="m12 8 .01 0"/>"#,
    }
}

fn icon_svg(icon: &str) -> String {
    format!(
        r#"<svg width="16" height="16" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" class="callout-icon">{}</svg>"#,
        icon_paths(icon)
    )
}

fn toggle_button(collapsed: bool) -> String {
    format!(
        concat!(
            "<button class=\"callout-toggle\" aria-expanded=\"{}\" aria-label=\"Toggle callout content\">\n",
            "          <svg class=\"callout-toggle-icon\" width=\"16\" height=\"16\" viewBox=\"0 0 24 24\" fill=\"none\" stroke=\"currentColor\" stroke-width=\"2\" stroke-linecap=\"round\" stroke-linejoin=\"round\">\n",
            "            <polyline points=\"6,9 12,15 18,9\"></polyline>\n",
            "          </svg>\n",
            "        </button>"
        ),
        !collapsed
    )
}

/// Opening fragment: wrapper, title bar and the start of the content div
pub fn callout_open_html(style: &CalloutStyle, title: &str, fold: &str) -> String {
    let collapsible = fold == "+" || fold == "-";
    let collapsed = fold == "-";
    format!(
        concat!(
            "<div class=\"callout callout-{kind}{collapsible}{collapsed}\">\n",
            "          <div class=\"callout-title\">\n",
            "            {svg}\n",
            "            <span>{title}</span>\n",
            "            {toggle}\n",
            "          </div>\n",
            "          <div class=\"callout-content\"{style}>"
        ),
        kind = style.kind,
        collapsible = if collapsible { " callout-collapsible" } else { "" },
        collapsed = if collapsed { " callout-collapsed" } else { "" },
        svg = icon_svg(style.icon),
        title = escape_html(title),
        toggle = if collapsible { toggle_button(collapsed) } else { String::new() },
        style = if collapsed { " style=\"display: none;\"" } else { "" },
    )
}

/// Concatenated text nodes of a subtree, inline code excluded
fn text_of(node: &Node) -> String {
    match node.text_value() {
        Some(text) => text.to_string(),
        None => node.children.iter().map(text_of).collect(),
    }
}

/// Rewrite the first text node containing `needle`, depth first
fn replace_first_text(node: &mut Node, needle: &str, rewrite: &dyn Fn(&str) -> String) -> bool {
    if let NodeKind::Text { value } = &mut node.kind {
        if value.contains(needle) {
            *value = rewrite(value);
            return true;
        }
        return false;
    }
    node.children
        .iter_mut()
        .any(|child| replace_first_text(child, needle, rewrite))
}

/// Replacement nodes for a callout blockquote, or `None` when it is a plain quote
fn convert_callout(blockquote: &Node) -> Option<Vec<Node>> {
    let first = blockquote.children.first()?;
    if first.kind != NodeKind::Paragraph {
        return None;
    }
    let paragraph_text = text_of(first);
    let header = scan_callout_header(&paragraph_text)?;
    let callout_type = header.group(0)?;
    let fold = header.group(1).unwrap_or("");
    let full_match = &paragraph_text[header.range()];
    let remaining = paragraph_text[header.end..].trim();

    let style = callout_style(callout_type);
    let first_text = first.children.iter().find_map(Node::text_value).unwrap_or("");

    let (title, content): (String, Vec<Node>) = if blockquote.children.len() > 1 {
        (style.title.to_string(), blockquote.children[1..].to_vec())
    } else if OWN_LINE_HEADER.is_match(first_text) {
        let mut paragraph = first.clone();
        if let Some(Node {
            kind: NodeKind::Text { value },
            ..
        }) = paragraph.children.iter_mut().find(|c| c.is_text())
        {
            *value = OWN_LINE_HEADER.replace(value, "").into_owned();
        }
        (style.title.to_string(), vec![paragraph])
    } else if remaining.is_empty() {
        (style.title.to_string(), Vec::new())
    } else {
        let title = header
            .group(2)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map_or_else(|| style.title.to_string(), str::to_string);
        let mut paragraph = first.clone();
        let rewrite = |value: &str| {
            let (before, after) = value.split_once(full_match).unwrap_or((value, ""));
            let after = after.trim();
            if after.is_empty() {
                before.trim().to_string()
            } else {
                format!("{} {}", before, after).trim().to_string()
            }
        };
        if !replace_first_text(&mut paragraph, full_match, &rewrite) {
            // header spans several inline nodes; drop just the marker
            if let Some(Node {
                kind: NodeKind::Text { value },
                ..
            }) = paragraph.children.iter_mut().find(|c| c.is_text())
            {
                *value = MARKER.replace(value, "").into_owned();
            }
        }
        (title, vec![paragraph])
    };

    let mut nodes = Vec::with_capacity(content.len() + 2);
    nodes.push(Node::html(callout_open_html(&style, &title, fold)));
    nodes.extend(content);
    nodes.push(Node::html(CALLOUT_CLOSE));
    Some(nodes)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Callouts;

impl Transform for Callouts {
    fn name(&self) -> &'static str {
        "callouts"
    }

    fn apply(&self, tree: &mut Node, ctx: &TransformContext<'_>) -> Result<()> {
        // a converted callout's content may hold nested callouts; go again
        for round in 0..MAX_ROUNDS {
            let mut editor = TreeEditor::new();
            walk(tree, &mut |visit| {
                if visit.node.kind != NodeKind::Blockquote {
                    return Flow::Continue;
                }
                match convert_callout(visit.node) {
                    Some(nodes) => {
                        editor.replace(visit.path, nodes);
                        Flow::Skip
                    }
                    None => Flow::Continue,
                }
            });
            if editor.is_empty() {
                return Ok(());
            }
            let converted = editor.commit(tree);
            log::debug!("Converted {} callouts in {} (round {})", converted, ctx.document.id, round + 1);
        }
        log::warn!("Callouts in {} nested deeper than {} levels", ctx.document.id, MAX_ROUNDS);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::test_support::{pass_html, run_pass};

    fn title_of(html: &str) -> &str {
        let start = html.find("<span>").unwrap() + "<span>".len();
        let end = html[start..].find("</span>").unwrap() + start;
        &html[start..end]
    }

    #[test]
    fn test_style_lookup() {
        assert_eq!(callout_style("WARNING").kind, "warning");
        assert_eq!(callout_style("danger").kind, "caution");
        assert_eq!(callout_style("tldr").title, "TL;DR");
        let custom = callout_style("recipe");
        assert_eq!((custom.kind, custom.icon, custom.title.as_ref()), ("note", "info", "Recipe"));
    }

    #[test]
    fn test_multi_paragraph_uses_mapped_title() {
        let html = pass_html(&Callouts, "> [!tip] Ignored\n>\n> Body text");
        assert_eq!(title_of(&html), "Tip");
        assert!(html.starts_with("<div class=\"callout callout-tip\">"));
        assert!(html.contains("<div class=\"callout-content\">\n<p>Body text</p>\n</div></div>\n"));
        assert!(!html.contains("Ignored"));
    }

    #[test]
    fn test_header_on_own_line() {
        let html = pass_html(&Callouts, "> [!note]\n> First line\n> second");
        assert_eq!(title_of(&html), "Note");
        assert!(html.contains("<p>First line\nsecond</p>"));
        assert!(!html.contains("[!note]"));
    }

    #[test]
    fn test_header_only() {
        let tree = run_pass(&Callouts, "post", "> [!info]");
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[1], Node::html(CALLOUT_CLOSE));
    }

    #[test]
    fn test_inline_title_collapsed() {
        let html = pass_html(&Callouts, "> [!warning]- Custom Title\n> Body");
        assert_eq!(title_of(&html), "Custom Title");
        assert!(html.starts_with("<div class=\"callout callout-warning callout-collapsible callout-collapsed\">"));
        assert!(html.contains("aria-expanded=\"false\""));
        assert!(html.contains("<div class=\"callout-content\" style=\"display: none;\">\n<p>Body</p>\n"));
    }

    #[test]
    fn test_inline_title_without_body() {
        let html = pass_html(&Callouts, "> [!question]+ Why & how");
        assert_eq!(title_of(&html), "Why &amp; how");
        assert!(html.contains("aria-expanded=\"true\""));
    }

    #[test]
    fn test_nested_callouts() {
        let html = pass_html(&Callouts, "> [!note]\n>\n> > [!tip]\n> > inner");
        assert!(html.contains("callout-note"));
        assert!(html.contains("callout-tip"));
        assert!(!html.contains("<blockquote>"));
        assert_eq!(html.matches(CALLOUT_CLOSE).count(), 2);
    }

    #[test]
    fn test_plain_blockquote_untouched() {
        assert_eq!(
            pass_html(&Callouts, "> just a quote"),
            "<blockquote>\n<p>just a quote</p>\n</blockquote>\n"
        );
    }
}
