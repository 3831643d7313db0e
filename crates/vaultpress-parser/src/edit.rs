//! Tree traversal and deferred edits.
//!
//! Passes walk an immutable tree, queue edits by path, and commit them once
//! the walk is over. Edits are applied from the end of the document back
//! so earlier paths stay valid when a node is replaced by several.

use crate::tree::Node;

/// Whether the walk descends into the visited node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Skip,
}

/// A node seen during [`walk`]
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub node: &'a Node,
    /// Root first, direct parent last
    pub ancestors: &'a [&'a Node],
    /// Child indices from the root to `node`
    pub path: &'a [usize],
}

impl<'a> Visit<'a> {
    pub fn parent(&self) -> Option<&'a Node> {
        self.ancestors.last().copied()
    }

    /// Position of the node among its siblings
    pub fn index(&self) -> usize {
        self.path.last().copied().unwrap_or(0)
    }

    pub fn has_ancestor(&self, pred: impl Fn(&Node) -> bool) -> bool {
        self.ancestors.iter().any(|n| pred(n))
    }

    /// Inside link text
    pub fn in_link(&self) -> bool {
        self.has_ancestor(Node::is_link)
    }
}

/// Depth-first, document-order walk below `root`.
///
/// The root itself is not visited and code nodes are never entered.
pub fn walk<F>(root: &Node, visitor: &mut F)
where
    F: FnMut(Visit<'_>) -> Flow,
{
    let mut ancestors = Vec::new();
    let mut path = Vec::new();
    walk_children(root, &mut ancestors, &mut path, visitor);
}

fn walk_children<'t, F>(
    node: &'t Node,
    ancestors: &mut Vec<&'t Node>,
    path: &mut Vec<usize>,
    visitor: &mut F,
) where
    F: FnMut(Visit<'_>) -> Flow,
{
    ancestors.push(node);
    for (i, child) in node.children.iter().enumerate() {
        path.push(i);
        let flow = visitor(Visit {
            node: child,
            ancestors: ancestors.as_slice(),
            path: path.as_slice(),
        });
        if flow == Flow::Continue && !child.is_code() {
            walk_children(child, ancestors, path, visitor);
        }
        path.pop();
    }
    ancestors.pop();
}

#[derive(Debug, Clone)]
struct Edit {
    path: Vec<usize>,
    replacement: Vec<Node>,
}

/// Edits collected during a walk, applied by [`TreeEditor::commit`]
#[derive(Debug, Default)]
pub struct TreeEditor {
    edits: Vec<Edit>,
}

impl TreeEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the node at `path` with zero or more nodes
    pub fn replace(&mut self, path: &[usize], replacement: Vec<Node>) {
        self.edits.push(Edit {
            path: path.to_vec(),
            replacement,
        });
    }

    pub fn update(&mut self, path: &[usize], node: Node) {
        self.replace(path, vec![node]);
    }

    pub fn remove(&mut self, path: &[usize]) {
        self.replace(path, Vec::new());
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply all edits, returning how many took effect.
    ///
    /// For two edits of the same node the later one wins. An edit below a
    /// node that is itself replaced is overwritten by the outer edit. Paths
    /// that no longer exist are skipped.
    pub fn commit(self, root: &mut Node) -> usize {
        let mut edits = self.edits;
        // stable: queue order survives among equal paths
        edits.sort_by(|a, b| a.path.cmp(&b.path));

        let mut deduped: Vec<Edit> = Vec::with_capacity(edits.len());
        for edit in edits {
            match deduped.last_mut() {
                Some(last) if last.path == edit.path => *last = edit,
                _ => deduped.push(edit),
            }
        }

        let mut applied = 0;
        for edit in deduped.into_iter().rev() {
            let Some((&index, parent_path)) = edit.path.split_last() else {
                log::debug!("Ignoring edit of the root node");
                continue;
            };
            let Some(parent) = node_at_mut(root, parent_path) else {
                log::debug!("Skipping edit at missing path {:?}", edit.path);
                continue;
            };
            if index >= parent.children.len() {
                log::debug!("Skipping edit at missing path {:?}", edit.path);
                continue;
            }
            parent.children.splice(index..=index, edit.replacement);
            applied += 1;
        }
        applied
    }
}

/// Node at a child-index path
pub fn node_at<'a>(root: &'a Node, path: &[usize]) -> Option<&'a Node> {
    path.iter().try_fold(root, |node, &i| node.children.get(i))
}

fn node_at_mut<'a>(root: &'a mut Node, path: &[usize]) -> Option<&'a mut Node> {
    path.iter()
        .try_fold(root, |node, &i| node.children.get_mut(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeKind, parse_markdown};

    #[test]
    fn test_walk_order_and_paths() {
        let root = parse_markdown("# A\n\npara *em*\n\n```\ncode\n```");
        let mut seen = Vec::new();
        walk(&root, &mut |visit| {
            seen.push((visit.path.to_vec(), visit.ancestors.len()));
            Flow::Continue
        });
        assert_eq!(
            seen,
            vec![
                (vec![0], 1),
                (vec![0, 0], 2),
                (vec![1], 1),
                (vec![1, 0], 2),
                (vec![1, 1], 2),
                (vec![1, 1, 0], 3),
                (vec![2], 1),
            ]
        );
    }

    #[test]
    fn test_skip_prunes_subtree() {
        let root = parse_markdown("> quoted *text*\n\nplain");
        let mut count = 0;
        walk(&root, &mut |visit| {
            count += 1;
            if visit.node.kind == NodeKind::Blockquote {
                Flow::Skip
            } else {
                Flow::Continue
            }
        });
        // blockquote, paragraph, text
        assert_eq!(count, 3);
    }

    #[test]
    fn test_commit_in_reverse_order() {
        let mut root = Node::new(NodeKind::Root).with_children(vec![
            Node::text("a"),
            Node::text("b"),
            Node::text("c"),
        ]);
        let mut editor = TreeEditor::new();
        editor.replace(&[0], vec![Node::text("a1"), Node::text("a2")]);
        editor.remove(&[1]);
        editor.update(&[2], Node::text("x"));
        editor.update(&[2], Node::text("c2"));
        editor.remove(&[7]);

        assert_eq!(editor.commit(&mut root), 3);
        let values: Vec<_> = root.children.iter().filter_map(Node::text_value).collect();
        assert_eq!(values, vec!["a1", "a2", "c2"]);
    }

    #[test]
    fn test_node_at() {
        let root = parse_markdown("one *two*");
        let em = node_at(&root, &[0, 1]).unwrap();
        assert_eq!(em.kind, NodeKind::Emphasis);
        assert!(node_at(&root, &[3]).is_none());
    }
}
