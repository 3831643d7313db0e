//! Obsidian `%%comments%%` are removed from the output.

use super::{Transform, TransformContext};
use crate::edit::{Flow, TreeEditor, walk};
use crate::scanner::scan_comments;
use crate::tree::{Node, NodeKind};
use std::ops::Range;
use vaultpress_core::Result;

/// Stands in for a non-text child when joining siblings
const OBJECT_MARK: char = '\u{FFFC}';

/// Removes comments, including ones spanning several inline nodes, then
/// drops paragraphs left empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct Comments;

impl Transform for Comments {
    fn name(&self) -> &'static str {
        "comments"
    }

    fn apply(&self, tree: &mut Node, _ctx: &TransformContext<'_>) -> Result<()> {
        let mut editor = TreeEditor::new();
        walk(tree, &mut |visit| {
            if !has_comment(visit.node) {
                return Flow::Continue;
            }
            editor.update(visit.path, strip_comments(visit.node));
            Flow::Skip
        });
        let stripped = editor.commit(tree);

        if stripped > 0 {
            let mut editor = TreeEditor::new();
            walk(tree, &mut |visit| {
                if visit.node.kind == NodeKind::Paragraph
                    && visit.node.children.iter().all(Node::is_blank_text)
                {
                    editor.remove(visit.path);
                }
                Flow::Continue
            });
            let removed = editor.commit(tree);
            log::debug!("Stripped comments from {} nodes, removed {} empty paragraphs", stripped, removed);
        }
        Ok(())
    }
}

/// Siblings joined into one string with the byte range each child covers
fn join_children(node: &Node) -> (String, Vec<Range<usize>>) {
    let mut joined = String::new();
    let mut ranges = Vec::with_capacity(node.children.len());
    for child in &node.children {
        let start = joined.len();
        match child.text_value() {
            Some(text) => joined.push_str(text),
            None => joined.push(OBJECT_MARK),
        }
        ranges.push(start..joined.len());
    }
    (joined, ranges)
}

fn has_comment(node: &Node) -> bool {
    if node.is_code() || node.children.is_empty() {
        return false;
    }
    let (joined, _) = join_children(node);
    !scan_comments(&joined).is_empty()
}

/// Copy of `node` with comments cut out of its children, recursively
fn strip_comments(node: &Node) -> Node {
    let (joined, ranges) = join_children(node);
    let comments: Vec<Range<usize>> = scan_comments(&joined).iter().map(|s| s.range()).collect();

    let mut children = Vec::with_capacity(node.children.len());
    for (child, range) in node.children.iter().zip(ranges) {
        match child.text_value() {
            Some(text) => {
                let kept: String = text
                    .char_indices()
                    .filter(|(i, _)| {
                        let offset = range.start + i;
                        !comments.iter().any(|c| c.contains(&offset))
                    })
                    .map(|(_, c)| c)
                    .collect();
                if !kept.is_empty() {
                    children.push(Node::text(kept));
                }
            }
            None => {
                let hidden = comments
                    .iter()
                    .any(|c| c.start <= range.start && range.end <= c.end);
                if hidden {
                    continue;
                }
                if has_comment(child) {
                    children.push(strip_comments(child));
                } else {
                    children.push(child.clone());
                }
            }
        }
    }

    Node {
        kind: node.kind.clone(),
        props: node.props.clone(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::test_support::pass_html;

    #[test]
    fn test_inline_comment_removed() {
        assert_eq!(pass_html(&Comments, "Visible %%hidden%% text"), "<p>Visible  text</p>\n");
    }

    #[test]
    fn test_comment_only_paragraph_removed() {
        let html = pass_html(&Comments, "Before\n\n%%\nnote to self\n%%\n\nAfter");
        assert_eq!(html, "<p>Before</p>\n<p>After</p>\n");
    }

    #[test]
    fn test_comment_spanning_inline_nodes() {
        let html = pass_html(&Comments, "Keep %%drop *this* and [link](x)%% end");
        assert_eq!(html, "<p>Keep  end</p>\n");
    }

    #[test]
    fn test_comment_inside_emphasis() {
        let html = pass_html(&Comments, "a *b %%c%% d* e");
        assert_eq!(html, "<p>a <em>b  d</em> e</p>\n");
    }

    #[test]
    fn test_code_untouched() {
        let html = pass_html(&Comments, "`%%kept%%`");
        assert_eq!(html, "<p><code>%%kept%%</code></p>\n");
    }
}
