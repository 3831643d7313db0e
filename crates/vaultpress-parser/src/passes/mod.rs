//! Tree-rewriting passes run by the [`Pipeline`](crate::pipeline::Pipeline).
//!
//! Each pass walks the tree read-only, queues edits in a
//! [`TreeEditor`](crate::edit::TreeEditor) and commits them at the end.

use crate::resolver::LinkContext;
use crate::tree::Node;
use std::ops::Range;
use vaultpress_bases::BaseStore;
use vaultpress_core::{Corpus, Document, Result, SiteConfig};

pub mod anchors;
pub mod callouts;
pub mod captions;
pub mod comments;
pub mod embeds;
pub mod folder_images;
pub mod image_attributes;
pub mod image_grids;
pub mod inline_tags;
pub mod marks;
pub mod standard_links;
pub mod wikilinks;

pub use anchors::HeadingAnchors;
pub use callouts::Callouts;
pub use captions::ImageCaptions;
pub use comments::Comments;
pub use embeds::Embeds;
pub use folder_images::FolderImages;
pub use image_attributes::ImageAttributes;
pub use image_grids::ImageGrids;
pub use inline_tags::InlineTags;
pub use marks::Marks;
pub use standard_links::StandardLinks;
pub use wikilinks::Wikilinks;

/// Everything a pass may read besides the tree
#[derive(Clone, Copy)]
pub struct TransformContext<'a> {
    /// Document being rendered
    pub document: &'a Document,
    pub corpus: &'a Corpus,
    /// Source of `.base` files for base embeds
    pub bases: &'a dyn BaseStore,
    pub config: &'a SiteConfig,
}

impl<'a> TransformContext<'a> {
    pub fn new(
        document: &'a Document,
        corpus: &'a Corpus,
        bases: &'a dyn BaseStore,
        config: &'a SiteConfig,
    ) -> Self {
        Self {
            document,
            corpus,
            bases,
            config,
        }
    }

    /// Resolution context for links written in this document
    pub fn link_context(&self) -> LinkContext<'a> {
        LinkContext::new(self.document.collection, self.document.slug())
    }
}

impl std::fmt::Debug for TransformContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformContext")
            .field("document", &self.document.id)
            .field("collection", &self.document.collection)
            .finish_non_exhaustive()
    }
}

/// One rewriting step over a document tree
pub trait Transform: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn apply(&self, tree: &mut Node, ctx: &TransformContext<'_>) -> Result<()>;
}

/// Split `value` around `replacements` (sorted, non-overlapping byte ranges).
///
/// Text between replacements survives as text nodes; empty pieces are dropped.
pub(crate) fn splice_text(value: &str, replacements: Vec<(Range<usize>, Vec<Node>)>) -> Vec<Node> {
    let mut out = Vec::with_capacity(replacements.len() * 2 + 1);
    let mut last = 0;
    for (range, nodes) in replacements {
        if range.start > last {
            out.push(Node::text(&value[last..range.start]));
        }
        out.extend(nodes);
        last = range.end;
    }
    if last < value.len() {
        out.push(Node::text(&value[last..]));
    }
    out
}
