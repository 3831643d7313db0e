//! HTML serialization of the document tree.

use crate::tree::{HProperties, Node, NodeKind};
use vaultpress_core::utils::escape_html;

/// Render a tree to HTML. Raw HTML nodes are emitted as-is.
pub fn to_html(root: &Node) -> String {
    let mut out = String::with_capacity(1024);
    render_children(root, &mut out);
    out
}

fn render_children(node: &Node, out: &mut String) {
    let block_parent = matches!(node.kind, NodeKind::Root | NodeKind::Blockquote);
    for child in &node.children {
        render_node(child, block_parent, out);
    }
}

fn push_attrs(props: &HProperties, out: &mut String) {
    for (key, value) in props.iter() {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_html(value));
        out.push('"');
    }
}

/// Built-in attributes first; node properties override them by key
fn merged_attrs(base: &[(&str, &str)], props: &HProperties) -> HProperties {
    let mut merged = HProperties::new();
    for (key, value) in base {
        merged.set(*key, *value);
    }
    for (key, value) in props.iter() {
        merged.set(key, value);
    }
    merged
}

fn wrap(tag: &str, node: &Node, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    push_attrs(&node.props, out);
    out.push('>');
    render_children(node, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn render_node(node: &Node, block_context: bool, out: &mut String) {
    match &node.kind {
        NodeKind::Root => render_children(node, out),
        NodeKind::Paragraph => {
            wrap("p", node, out);
            out.push('\n');
        }
        NodeKind::Heading { depth } => {
            wrap(&format!("h{}", depth), node, out);
            out.push('\n');
        }
        NodeKind::Blockquote => {
            out.push_str("<blockquote");
            push_attrs(&node.props, out);
            out.push_str(">\n");
            render_children(node, out);
            out.push_str("</blockquote>\n");
        }
        NodeKind::List { ordered, start } => {
            let tag = if *ordered { "ol" } else { "ul" };
            out.push('<');
            out.push_str(tag);
            if let Some(start) = start.filter(|s| *ordered && *s != 1) {
                out.push_str(&format!(" start=\"{}\"", start));
            }
            push_attrs(&node.props, out);
            out.push_str(">\n");
            render_children(node, out);
            out.push_str(&format!("</{}>\n", tag));
        }
        NodeKind::ListItem { checked } => {
            out.push_str("<li");
            push_attrs(&node.props, out);
            out.push('>');
            if let Some(checked) = checked {
                out.push_str("<input type=\"checkbox\" disabled=\"\"");
                if *checked {
                    out.push_str(" checked=\"\"");
                }
                out.push_str(" /> ");
            }
            render_children(node, out);
            out.push_str("</li>\n");
        }
        NodeKind::Code { lang, value } => {
            out.push_str("<pre><code");
            if let Some(lang) = lang {
                out.push_str(&format!(" class=\"language-{}\"", escape_html(lang)));
            }
            out.push('>');
            out.push_str(&escape_html(value));
            if !value.is_empty() {
                out.push('\n');
            }
            out.push_str("</code></pre>\n");
        }
        NodeKind::InlineCode { value } => {
            out.push_str("<code>");
            out.push_str(&escape_html(value));
            out.push_str("</code>");
        }
        NodeKind::Html { value } => {
            out.push_str(value);
            if block_context && !value.ends_with('\n') {
                out.push('\n');
            }
        }
        NodeKind::Text { value } => out.push_str(&escape_html(value)),
        NodeKind::Emphasis => wrap("em", node, out),
        NodeKind::Strong => wrap("strong", node, out),
        NodeKind::Delete => wrap("del", node, out),
        NodeKind::Mark => wrap("mark", node, out),
        NodeKind::Link { url, title } => {
            let mut base = vec![("href", url.as_str())];
            if !title.is_empty() {
                base.push(("title", title.as_str()));
            }
            out.push_str("<a");
            push_attrs(&merged_attrs(&base, &node.props), out);
            out.push('>');
            render_children(node, out);
            out.push_str("</a>");
        }
        NodeKind::Image { url, title, alt } => {
            let mut base = vec![("src", url.as_str()), ("alt", alt.as_str())];
            if !title.is_empty() {
                base.push(("title", title.as_str()));
            }
            out.push_str("<img");
            push_attrs(&merged_attrs(&base, &node.props), out);
            out.push_str(" />");
        }
        NodeKind::Break => out.push_str("<br />\n"),
        NodeKind::ThematicBreak => out.push_str("<hr />\n"),
        NodeKind::Table => render_table(node, out),
        // rows and cells are rendered by their table
        NodeKind::TableHead | NodeKind::TableRow | NodeKind::TableCell => render_children(node, out),
    }
}

fn render_table(table: &Node, out: &mut String) {
    out.push_str("<table");
    push_attrs(&table.props, out);
    out.push_str(">\n");

    let (head, rows): (Vec<&Node>, Vec<&Node>) = table
        .children
        .iter()
        .partition(|n| n.kind == NodeKind::TableHead);
    for head in head {
        out.push_str("<thead>\n");
        render_row(head, "th", out);
        out.push_str("</thead>\n");
    }
    if !rows.is_empty() {
        out.push_str("<tbody>\n");
        for row in rows {
            render_row(row, "td", out);
        }
        out.push_str("</tbody>\n");
    }
    out.push_str("</table>\n");
}

fn render_row(row: &Node, cell_tag: &str, out: &mut String) {
    out.push_str("<tr>\n");
    for cell in &row.children {
        wrap(cell_tag, cell, out);
        out.push('\n');
    }
    out.push_str("</tr>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse_markdown;
    use insta::assert_snapshot;

    fn html(md: &str) -> String {
        to_html(&parse_markdown(md))
    }

    #[test]
    fn test_basic_blocks() {
        assert_snapshot!(html("# Title\n\nSome *em* and **strong** & `code`.\n\n> quote\n\n---").trim_end(), @r"
        <h1>Title</h1>
        <p>Some <em>em</em> and <strong>strong</strong> &amp; <code>code</code>.</p>
        <blockquote>
        <p>quote</p>
        </blockquote>
        <hr />
        ");
    }

    #[test]
    fn test_lists_and_code() {
        let out = html("- [x] done\n- todo\n\n3. three\n\n```rust\nfn main() {}\n```");
        assert!(out.contains("<ul>\n<li><input type=\"checkbox\" disabled=\"\" checked=\"\" /> done</li>\n<li>todo</li>\n</ul>\n"));
        assert!(out.contains("<ol start=\"3\">\n<li>three</li>\n</ol>\n"));
        assert!(out.contains("<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n"));
    }

    #[test]
    fn test_properties_override_builtin_attributes() {
        let link = Node::link("/a", vec![Node::text("A")])
            .with_prop("class", "wikilink")
            .with_prop("href", "/b");
        let image = Node::image("x.png", "").with_prop("loading", "lazy");
        let root = Node::new(NodeKind::Paragraph).with_children(vec![link, image]);
        assert_eq!(
            to_html(&Node::new(NodeKind::Root).with_children(vec![root])),
            "<p><a href=\"/b\" class=\"wikilink\">A</a><img src=\"x.png\" alt=\"\" loading=\"lazy\" /></p>\n"
        );
    }

    #[test]
    fn test_table() {
        let out = html("| a | b |\n|---|---|\n| 1 | 2 |");
        assert_eq!(
            out,
            "<table>\n<thead>\n<tr>\n<th>a</th>\n<th>b</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td>1</td>\n<td>2</td>\n</tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn test_block_html_gets_newline() {
        let root = Node::new(NodeKind::Root).with_children(vec![Node::html("<div>x</div>"), Node::html("<hr>\n")]);
        assert_eq!(to_html(&root), "<div>x</div>\n<hr>\n");
    }
}
