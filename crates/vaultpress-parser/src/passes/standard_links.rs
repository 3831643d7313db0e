//! Standard Markdown links to site content get canonical URLs.

use super::{Transform, TransformContext};
use crate::edit::{Flow, TreeEditor, walk};
use crate::resolver::{anchor_slug, resolve};
use crate::tree::{Node, NodeKind};
use vaultpress_core::Result;

#[derive(Debug, Default, Clone, Copy)]
pub struct StandardLinks;

impl Transform for StandardLinks {
    fn name(&self) -> &'static str {
        "standard-links"
    }

    fn apply(&self, tree: &mut Node, ctx: &TransformContext<'_>) -> Result<()> {
        let link_ctx = ctx.link_context();
        let mut editor = TreeEditor::new();
        walk(tree, &mut |visit| {
            let NodeKind::Link { url, .. } = &visit.node.kind else {
                return Flow::Continue;
            };
            if visit.node.props.contains("data-wikilink") {
                return Flow::Continue;
            }

            let (new_url, wikilink_class) = match url.strip_prefix('#') {
                Some(fragment) if !fragment.is_empty() => (format!("#{}", anchor_slug(fragment)), true),
                _ => {
                    let resolution = resolve(url, &link_ctx);
                    let new_url = if resolution.is_internal { resolution.url } else { url.clone() };
                    let is_post = new_url.starts_with("/posts/");
                    (new_url, is_post)
                }
            };

            if new_url != *url || (wikilink_class && !visit.node.props.has_class("wikilink")) {
                let mut link = visit.node.clone();
                if let NodeKind::Link { url, .. } = &mut link.kind {
                    *url = new_url;
                }
                if wikilink_class {
                    link.props.add_class("wikilink");
                }
                editor.update(visit.path, link);
            }
            Flow::Continue
        });
        let rewritten = editor.commit(tree);
        if rewritten > 0 {
            log::debug!("Rewrote {} standard links in {}", rewritten, ctx.document.id);
        }
        Ok(())
    }
}
