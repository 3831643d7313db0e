//! Heading ids, self-links on section headings, and same-page anchor cleanup.
//!
//! Runs last so every link produced by earlier passes is normalized.

use std::collections::HashMap;

use super::{Transform, TransformContext};
use crate::edit::{Flow, TreeEditor, walk};
use crate::resolver::anchor_slug;
use crate::tree::{Node, NodeKind};
use vaultpress_core::Result;
use vaultpress_core::utils::slugify;

const ANCHOR_CLASS: &str = "anchor-link";
const ANCHOR_LABEL: &str = "Link to this section";

#[derive(Debug, Default, Clone, Copy)]
pub struct HeadingAnchors;

/// Hands out unique heading ids: `intro`, `intro-1`, `intro-2`, ...
#[derive(Debug, Default)]
struct IdAllocator {
    seen: HashMap<String, usize>,
}

impl IdAllocator {
    fn allocate(&mut self, base: String) -> String {
        let mut count = self.seen.get(&base).copied().unwrap_or(0);
        let mut candidate = base.clone();
        while self.seen.contains_key(&candidate) {
            count += 1;
            candidate = format!("{}-{}", base, count);
        }
        self.seen.insert(base, count);
        self.seen.entry(candidate.clone()).or_insert(0);
        candidate
    }
}

/// Page titles (`h1`) keep no id or self-link
fn is_section_heading(node: &Node) -> bool {
    matches!(node.kind, NodeKind::Heading { depth } if depth >= 2)
}

impl HeadingAnchors {
    fn anchor_headings(tree: &mut Node) -> usize {
        let mut ids = IdAllocator::default();
        let mut editor = TreeEditor::new();
        walk(tree, &mut |visit| {
            if !visit.node.is_heading() {
                return Flow::Continue;
            }
            if !is_section_heading(visit.node) {
                return Flow::Skip;
            }
            let base = slugify(&visit.node.plain_text());
            if base.is_empty() {
                return Flow::Skip;
            }
            let id = ids.allocate(base);

            let mut heading = visit.node.clone();
            let link = Node::link(format!("#{}", id), std::mem::take(&mut heading.children))
                .with_prop("class", ANCHOR_CLASS)
                .with_prop("aria-label", ANCHOR_LABEL);
            heading.props.set("id", id);
            heading.children = vec![link];
            editor.update(visit.path, heading);
            Flow::Skip
        });
        editor.commit(tree)
    }

    fn normalize_anchor_links(tree: &mut Node) -> usize {
        let mut editor = TreeEditor::new();
        walk(tree, &mut |visit| {
            let NodeKind::Link { url, .. } = &visit.node.kind else {
                return Flow::Continue;
            };
            if visit.node.props.has_class(ANCHOR_CLASS) || visit.parent().is_some_and(Node::is_heading) {
                return Flow::Continue;
            }
            let Some(fragment) = url.strip_prefix('#').filter(|f| !f.is_empty()) else {
                return Flow::Continue;
            };
            let href = format!("#{}", anchor_slug(fragment));
            if href != *url || !visit.node.props.has_class("wikilink") {
                let mut link = visit.node.clone();
                if let NodeKind::Link { url, .. } = &mut link.kind {
                    *url = href;
                }
                link.props.add_class("wikilink");
                editor.update(visit.path, link);
            }
            Flow::Continue
        });
        editor.commit(tree)
    }
}

impl Transform for HeadingAnchors {
    fn name(&self) -> &'static str {
        "heading-anchors"
    }

    fn apply(&self, tree: &mut Node, ctx: &TransformContext<'_>) -> Result<()> {
        let headings = Self::anchor_headings(tree);
        let links = Self::normalize_anchor_links(tree);
        log::debug!(
            "Anchored {} headings and normalized {} links in {}",
            headings,
            links,
            ctx.document.id
        );
        Ok(())
    }
}
