//! Inline `#tags` in text become pill links to the tag archive.

use super::{Transform, TransformContext, splice_text};
use crate::edit::{Flow, TreeEditor, walk};
use crate::scanner::scan_tags;
use crate::tree::Node;
use vaultpress_core::Result;
use vaultpress_core::utils::{encode_uri_component, escape_html};

const TAG_CLASSES: &str = "text-xs text-primary-600 dark:text-primary-300 bg-primary-100 dark:bg-primary-800 px-2.5 py-1 rounded-full border border-primary-200 dark:border-primary-700 transition-colors hover:bg-highlight-100 dark:hover:bg-highlight-800";

/// Pill link markup for one tag
pub fn tag_link_html(tag_base_url: &str, tag: &str) -> String {
    format!(
        "<a href=\"{}{}\" class=\"{}\">#{}</a>",
        escape_html(tag_base_url),
        encode_uri_component(tag),
        TAG_CLASSES,
        escape_html(tag)
    )
}

#[derive(Debug, Default, Clone, Copy)]
pub struct InlineTags;

impl Transform for InlineTags {
    fn name(&self) -> &'static str {
        "inline-tags"
    }

    fn apply(&self, tree: &mut Node, ctx: &TransformContext<'_>) -> Result<()> {
        let base_url = ctx.config.tag_base_url.as_str();
        let mut editor = TreeEditor::new();
        walk(tree, &mut |visit| {
            let Some(value) = visit.node.text_value() else {
                return Flow::Continue;
            };
            if visit.in_link() {
                return Flow::Continue;
            }
            let replacements: Vec<_> = scan_tags(value)
                .into_iter()
                .filter_map(|span| {
                    let html = tag_link_html(base_url, span.group(0)?);
                    Some((span.range(), vec![Node::html(html)]))
                })
                .collect();
            if !replacements.is_empty() {
                editor.replace(visit.path, splice_text(value, replacements));
            }
            Flow::Continue
        });
        editor.commit(tree);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::test_support::pass_html;

    #[test]
    fn test_tag_link_markup() {
        assert_eq!(
            tag_link_html("/posts/tag/", "quick-start"),
            format!("<a href=\"/posts/tag/quick-start\" class=\"{}\">#quick-start</a>", TAG_CLASSES)
        );
    }

    #[test]
    fn test_tags_keep_surrounding_text() {
        let html = pass_html(&InlineTags, "Filed under #rust, (#async) and foo#bar");
        assert!(html.starts_with("<p>Filed under <a href=\"/posts/tag/rust\""));
        assert!(html.contains(">#rust</a>, (<a href=\"/posts/tag/async\""));
        assert!(html.contains(">#async</a>) and foo#bar</p>"));
    }

    #[test]
    fn test_tags_in_links_and_code_ignored() {
        let html = pass_html(&InlineTags, "[see #x](/a) `#y`");
        assert!(!html.contains("/posts/tag/"));
    }

    #[test]
    fn test_heading_is_not_a_tag() {
        let html = pass_html(&InlineTags, "# Title");
        assert_eq!(html, "<h1>Title</h1>\n");
    }
}
