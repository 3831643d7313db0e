//! Lazy loading hints on every image.

use super::{Transform, TransformContext};
use crate::edit::{Flow, TreeEditor, walk};
use crate::tree::Node;
use vaultpress_core::Result;

#[derive(Debug, Default, Clone, Copy)]
pub struct ImageAttributes;

impl Transform for ImageAttributes {
    fn name(&self) -> &'static str {
        "image-attributes"
    }

    fn apply(&self, tree: &mut Node, _ctx: &TransformContext<'_>) -> Result<()> {
        let mut editor = TreeEditor::new();
        walk(tree, &mut |visit| {
            if visit.node.is_image() {
                let mut image = visit.node.clone();
                image.props.set_if_absent("loading", "lazy");
                image.props.set_if_absent("decoding", "async");
                if image.props != visit.node.props {
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
    use crate::tree::NodeKind;

    #[test]
    fn test_lazy_attributes_added() {
        assert_eq!(
            pass_html(&ImageAttributes, "![](a.png)"),
            "<p><img src=\"a.png\" alt=\"\" loading=\"lazy\" decoding=\"async\" /></p>\n"
        );
    }

    #[test]
    fn test_existing_loading_kept() {
        let image = Node::image("a.png", "a").with_prop("loading", "eager");
        let mut tree = Node::new(NodeKind::Root)
            .with_children(vec![Node::new(NodeKind::Paragraph).with_children(vec![image])]);
        let document = vaultpress_core::Document::new(vaultpress_core::Collection::Posts, "p", "");
        let corpus = vaultpress_core::Corpus::default();
        let bases = vaultpress_bases::MemoryBaseStore::new();
        let config = vaultpress_core::SiteConfig::default();
        ImageAttributes
            .apply(&mut tree, &TransformContext::new(&document, &corpus, &bases, &config))
            .unwrap();
        let props = &tree.children[0].children[0].props;
        assert_eq!(props.get("loading"), Some("eager"));
        assert_eq!(props.get("decoding"), Some("async"));
    }
}
