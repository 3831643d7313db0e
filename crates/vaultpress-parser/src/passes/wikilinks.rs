//! `[[target|display]]` and `![[image.png]]` in text become link and image nodes.

use super::{Transform, TransformContext, splice_text};
use crate::edit::{Flow, TreeEditor, walk};
use crate::resolver::{resolve_wikilink_target, split_anchor};
use crate::scanner::{MatchSpan, scan_wikilinks_in_text};
use crate::tree::Node;
use vaultpress_core::Result;

#[derive(Debug, Default, Clone, Copy)]
pub struct Wikilinks;

impl Transform for Wikilinks {
    fn name(&self) -> &'static str {
        "wikilinks"
    }

    fn apply(&self, tree: &mut Node, ctx: &TransformContext<'_>) -> Result<()> {
        let mut editor = TreeEditor::new();
        walk(tree, &mut |visit| {
            let Some(value) = visit.node.text_value() else {
                return Flow::Continue;
            };
            if visit.in_link() || !value.contains("[[") {
                return Flow::Continue;
            }
            let replacements: Vec<_> = scan_wikilinks_in_text(value)
                .iter()
                .filter_map(|span| Some((span.range(), vec![wikilink_node(span)?])))
                .collect();
            if !replacements.is_empty() {
                editor.replace(visit.path, splice_text(value, replacements));
            }
            Flow::Continue
        });
        let replaced = editor.commit(tree);
        if replaced > 0 {
            log::debug!("Converted wikilinks in {} text nodes of {}", replaced, ctx.document.id);
        }
        Ok(())
    }
}

/// Node for one wikilink, or `None` to leave it as text
fn wikilink_node(span: &MatchSpan) -> Option<Node> {
    let target = span.group(0)?.trim();
    let display = span.group(1).map(str::trim).filter(|d| !d.is_empty());

    if span.is_image() {
        return Some(Node::image(target, display.unwrap_or("")));
    }

    let Some(resolved) = resolve_wikilink_target(target) else {
        log::debug!("Leaving wikilink [[{}]] as text", target);
        return None;
    };

    let text = match display {
        Some(display) => display.to_string(),
        None if resolved.same_page => target.trim_start_matches('#').to_string(),
        None => split_anchor(target).0.trim().to_string(),
    };

    let mut link = Node::link(resolved.url, vec![Node::text(text)])
        .with_prop("class", "wikilink")
        .with_prop("data-wikilink", resolved.data);
    if let Some(display) = display {
        link.props.set("data-display-override", display);
    }
    Some(link)
}
