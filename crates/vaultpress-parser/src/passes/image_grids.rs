//! Paragraphs made only of images are laid out as grids.

use super::{Transform, TransformContext};
use crate::edit::{Flow, TreeEditor, walk};
use crate::tree::{Node, NodeKind};
use vaultpress_core::Result;

/// Widest grid; more images wrap onto further rows
const MAX_COLUMNS: usize = 6;

#[derive(Debug, Default, Clone, Copy)]
pub struct ImageGrids;

/// Number of images when the paragraph holds two or more and nothing else.
///
/// Linked images, non-blank text and any other node disqualify it.
fn grid_size(paragraph: &Node) -> Option<usize> {
    let mut images = 0;
    for child in &paragraph.children {
        if child.is_image() {
            images += 1;
        } else if !child.is_blank_text() {
            return None;
        }
    }
    (images >= 2).then_some(images)
}

impl Transform for ImageGrids {
    fn name(&self) -> &'static str {
        "image-grids"
    }

    fn apply(&self, tree: &mut Node, _ctx: &TransformContext<'_>) -> Result<()> {
        let mut editor = TreeEditor::new();
        walk(tree, &mut |visit| {
            if visit.node.kind != NodeKind::Paragraph {
                return Flow::Continue;
            }
            if let Some(images) = grid_size(visit.node) {
                let mut paragraph = visit.node.clone();
                paragraph.props.retain_classes(|c| !c.starts_with("image-grid"));
                paragraph.props.add_class("image-grid");
                paragraph
                    .props
                    .add_class(&format!("image-grid-{}", images.min(MAX_COLUMNS)));
                editor.update(visit.path, paragraph);
            }
            Flow::Skip
        });
        editor.commit(tree);
        Ok(())
    }
}
