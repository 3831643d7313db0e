//! Document tree built from pulldown-cmark events.
//!
//! pulldown-cmark gives a flat event stream; the transform passes need a
//! tree they can rewrite. [`parse_markdown`] folds the events into [`Node`]s
//! with a stack, merging adjacent text so Obsidian syntax that CommonMark
//! splits (`[[`, `]]`, `==`, `%%`) is seen in one piece.

use crate::scanner::code_ranges;
use pulldown_cmark::{CodeBlockKind, Event, LinkType, Options, Parser, Tag, TagEnd};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// ============================================================================
// Node model
// ============================================================================

/// Node type and the data that belongs to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    Root,
    Paragraph,
    Heading { depth: u8 },
    Blockquote,
    List { ordered: bool, start: Option<u64> },
    ListItem { checked: Option<bool> },
    Code { lang: Option<String>, value: String },
    InlineCode { value: String },
    Html { value: String },
    Text { value: String },
    Emphasis,
    Strong,
    Delete,
    Mark,
    Link { url: String, title: String },
    Image { url: String, title: String, alt: String },
    Break,
    ThematicBreak,
    Table,
    TableHead,
    TableRow,
    TableCell,
}

/// Ordered HTML attribute bag attached to a node (`class`, `href`, `data-*`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HProperties(Vec<(String, String)>);

impl HProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set a value, keeping the attribute's original position when present
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Set a value only when the attribute is missing or empty
    pub fn set_if_absent(&mut self, key: &str, value: &str) {
        if self.get(key).is_none_or(str::is_empty) {
            self.set(key, value);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Entries of the space-separated `class` attribute
    pub fn classes(&self) -> Vec<&str> {
        self.get("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().contains(&class)
    }

    /// Append a class unless already present
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let mut classes: Vec<String> = self.classes().into_iter().map(String::from).collect();
        classes.push(class.to_string());
        self.set("class", classes.join(" "));
    }

    /// Keep only the classes matching `keep`; drops `class` when none remain
    pub fn retain_classes(&mut self, keep: impl Fn(&str) -> bool) {
        let classes: Vec<String> = self
            .classes()
            .into_iter()
            .filter(|c| keep(c))
            .map(String::from)
            .collect();
        if classes.is_empty() {
            self.remove("class");
        } else {
            self.set("class", classes.join(" "));
        }
    }
}

/// A tree node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "HProperties::is_empty")]
    pub props: HProperties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            props: HProperties::new(),
            children: Vec::new(),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(NodeKind::Text {
            value: value.into(),
        })
    }

    pub fn html(value: impl Into<String>) -> Self {
        Self::new(NodeKind::Html {
            value: value.into(),
        })
    }

    pub fn link(url: impl Into<String>, children: Vec<Node>) -> Self {
        Self::new(NodeKind::Link {
            url: url.into(),
            title: String::new(),
        })
        .with_children(children)
    }

    pub fn image(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self::new(NodeKind::Image {
            url: url.into(),
            title: String::new(),
            alt: alt.into(),
        })
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.set(key, value);
        self
    }

    /// Value of a text node
    pub fn text_value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { value } => Some(value),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }

    /// Text node with nothing but whitespace
    pub fn is_blank_text(&self) -> bool {
        self.text_value().is_some_and(|v| v.trim().is_empty())
    }

    /// Code blocks and inline code, whose content passes never touch
    pub fn is_code(&self) -> bool {
        matches!(self.kind, NodeKind::Code { .. } | NodeKind::InlineCode { .. })
    }

    pub fn is_link(&self) -> bool {
        matches!(self.kind, NodeKind::Link { .. })
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, NodeKind::Image { .. })
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.kind, NodeKind::Heading { .. })
    }

    /// Concatenated text and inline code of the subtree
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text { value } | NodeKind::InlineCode { value } => out.push_str(value),
            _ => self.children.iter().for_each(|c| c.collect_text(out)),
        }
    }

    /// Append a text child, merging with a trailing text child
    fn push_text(&mut self, text: &str) {
        if let Some(Node {
            kind: NodeKind::Text { value },
            ..
        }) = self.children.last_mut()
        {
            value.push_str(text);
            return;
        }
        self.children.push(Node::text(text));
    }
}

// ============================================================================
// Markdown -> tree
// ============================================================================

/// Link targets containing spaces, which CommonMark only accepts in `<...>`
static SPACED_LINK_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(!?\[[^\]\n]*\])\(([^)<>"\n]+)\)"#).unwrap());

/// Wrap `[x](My Note.md)` targets in angle brackets so they parse as links.
///
/// Titled targets (`(url "title")`) and code are left alone.
fn escape_spaced_link_targets(markdown: &str) -> String {
    if !markdown.contains("](") {
        return markdown.to_string();
    }
    let code = code_ranges(markdown);
    let mut out = String::with_capacity(markdown.len() + 16);
    let mut last = 0;
    for caps in SPACED_LINK_TARGET.captures_iter(markdown) {
        let (Some(whole), Some(label), Some(target)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        if !target.as_str().trim().contains(' ') || code.overlaps(&whole.range()) {
            continue;
        }
        out.push_str(&markdown[last..whole.start()]);
        out.push_str(label.as_str());
        out.push_str("(<");
        out.push_str(target.as_str().trim());
        out.push_str(">)");
        last = whole.end();
    }
    out.push_str(&markdown[last..]);
    out
}

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

fn open(tag: Tag<'_>) -> Node {
    let kind = match tag {
        Tag::Paragraph => NodeKind::Paragraph,
        Tag::Heading { level, .. } => NodeKind::Heading { depth: level as u8 },
        Tag::BlockQuote(_) => NodeKind::Blockquote,
        Tag::CodeBlock(kind) => NodeKind::Code {
            lang: match kind {
                CodeBlockKind::Fenced(info) => info
                    .split_whitespace()
                    .next()
                    .map(str::to_string),
                CodeBlockKind::Indented => None,
            },
            value: String::new(),
        },
        Tag::HtmlBlock => NodeKind::Html {
            value: String::new(),
        },
        Tag::List(start) => NodeKind::List {
            ordered: start.is_some(),
            start,
        },
        Tag::Item => NodeKind::ListItem { checked: None },
        Tag::Table(_) => NodeKind::Table,
        Tag::TableHead => NodeKind::TableHead,
        Tag::TableRow => NodeKind::TableRow,
        Tag::TableCell => NodeKind::TableCell,
        Tag::Emphasis => NodeKind::Emphasis,
        Tag::Strong => NodeKind::Strong,
        Tag::Strikethrough => NodeKind::Delete,
        Tag::Link {
            link_type,
            dest_url,
            title,
            ..
        } => NodeKind::Link {
            url: if link_type == LinkType::Email {
                format!("mailto:{}", dest_url)
            } else {
                dest_url.to_string()
            },
            title: title.to_string(),
        },
        Tag::Image {
            dest_url, title, ..
        } => NodeKind::Image {
            url: dest_url.to_string(),
            title: title.to_string(),
            alt: String::new(),
        },
        // anything else is transparent: its children join the parent
        _ => NodeKind::Root,
    };
    Node::new(kind)
}

/// Finish a node popped off the stack and attach it to `parent`
fn close(mut node: Node, parent: &mut Node) {
    match &mut node.kind {
        NodeKind::Root => {
            for child in std::mem::take(&mut node.children) {
                match child.text_value() {
                    Some(text) => parent.push_text(text),
                    None => parent.children.push(child),
                }
            }
            return;
        }
        NodeKind::Image { alt, .. } => {
            *alt = node.children.iter().map(Node::plain_text).collect();
            node.children.clear();
        }
        NodeKind::Code { value, .. } => {
            if value.ends_with('\n') {
                value.pop();
            }
        }
        _ => {}
    }
    parent.children.push(node);
}

/// Parse Markdown into a tree rooted at [`NodeKind::Root`].
///
/// Never fails: malformed Markdown degrades to text as CommonMark specifies.
pub fn parse_markdown(markdown: &str) -> Node {
    let prepared = escape_spaced_link_targets(markdown);
    let mut stack = vec![Node::new(NodeKind::Root)];

    for event in Parser::new_ext(&prepared, options()) {
        match event {
            Event::Start(tag) => stack.push(open(tag)),
            Event::End(_) => {
                if stack.len() > 1
                    && let (Some(node), Some(parent)) = (stack.pop(), stack.last_mut())
                {
                    close(node, parent);
                }
            }
            Event::Text(text) => {
                let Some(top) = stack.last_mut() else { continue };
                match &mut top.kind {
                    NodeKind::Code { value, .. } => value.push_str(&text),
                    _ => top.push_text(&text),
                }
            }
            Event::Code(code) => {
                if let Some(top) = stack.last_mut() {
                    top.children.push(Node::new(NodeKind::InlineCode {
                        value: code.to_string(),
                    }));
                }
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                let Some(top) = stack.last_mut() else { continue };
                match &mut top.kind {
                    NodeKind::Html { value } => value.push_str(&html),
                    _ => top.children.push(Node::html(html.to_string())),
                }
            }
            Event::SoftBreak => {
                if let Some(top) = stack.last_mut() {
                    top.push_text("\n");
                }
            }
            Event::HardBreak => {
                if let Some(top) = stack.last_mut() {
                    top.children.push(Node::new(NodeKind::Break));
                }
            }
            Event::Rule => {
                if let Some(top) = stack.last_mut() {
                    top.children.push(Node::new(NodeKind::ThematicBreak));
                }
            }
            Event::TaskListMarker(checked) => {
                // the marker arrives inside the item (tight) or its first paragraph (loose)
                if let Some(item) = stack
                    .iter_mut()
                    .rev()
                    .find(|n| matches!(n.kind, NodeKind::ListItem { .. }))
                {
                    item.kind = NodeKind::ListItem {
                        checked: Some(checked),
                    };
                }
            }
            Event::FootnoteReference(label) => {
                if let Some(top) = stack.last_mut() {
                    top.push_text(&format!("[^{}]", label));
                }
            }
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                if let Some(top) = stack.last_mut() {
                    top.push_text(&math);
                }
            }
        }
    }

    while stack.len() > 1 {
        if let (Some(node), Some(parent)) = (stack.pop(), stack.last_mut()) {
            close(node, parent);
        }
    }
    stack.pop().unwrap_or_else(|| Node::new(NodeKind::Root))
}
