//! `==highlight==` becomes `<mark>`.

use super::{Transform, TransformContext, splice_text};
use crate::edit::{Flow, TreeEditor, walk};
use crate::scanner::scan_marks;
use crate::tree::{Node, NodeKind};
use vaultpress_core::Result;

#[derive(Debug, Default, Clone, Copy)]
pub struct Marks;

impl Transform for Marks {
    fn name(&self) -> &'static str {
        "marks"
    }

    fn apply(&self, tree: &mut Node, _ctx: &TransformContext<'_>) -> Result<()> {
        let mut editor = TreeEditor::new();
        walk(tree, &mut |visit| {
            let Some(value) = visit.node.text_value() else {
                return Flow::Continue;
            };
            if visit.has_ancestor(|n| n.kind == NodeKind::Mark) {
                return Flow::Continue;
            }
            let replacements: Vec<_> = scan_marks(value)
                .into_iter()
                .filter_map(|span| {
                    let inner = span.group(0)?;
                    let mark = Node::new(NodeKind::Mark).with_children(vec![Node::text(inner)]);
                    Some((span.range(), vec![mark]))
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
