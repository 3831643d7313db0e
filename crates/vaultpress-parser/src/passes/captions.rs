//! Image titles double as captions.

use super::{Transform, TransformContext};
use crate::edit::{Flow, TreeEditor, walk};
use crate::tree::{Node, NodeKind};
use vaultpress_core::Result;

#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCaptions;

impl Transform for ImageCaptions {
    fn name(&self) -> &'static str {
        "image-captions"
    }

    fn apply(&self, tree: &mut Node, _ctx: &TransformContext<'_>) -> Result<()> {
        let mut editor = TreeEditor::new();
        walk(tree, &mut |visit| {
            if let NodeKind::Image { title, .. } = &visit.node.kind {
                if !title.is_empty() {
                    let mut image = visit.node.clone();
                    image.props.set("data-caption", title.as_str());
                    image.props.set("title", title.as_str());
                    editor.update(visit.path, image);
                }
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
    fn test_title_becomes_caption() {
        assert_eq!(
            pass_html(&ImageCaptions, "![dusk](sky.png \"Sunset & sea\")"),
            "<p><img src=\"sky.png\" alt=\"dusk\" title=\"Sunset &amp; sea\" data-caption=\"Sunset &amp; sea\" /></p>\n"
        );
    }

    #[test]
    fn test_untitled_image_unchanged() {
        assert_eq!(
            pass_html(&ImageCaptions, "![dusk](sky.png)"),
            "<p><img src=\"sky.png\" alt=\"dusk\" /></p>\n"
        );
    }
}
