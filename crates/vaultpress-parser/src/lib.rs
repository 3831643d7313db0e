//! # Vaultpress Parser
//!
//! Obsidian-flavored Markdown to HTML for the publishing site, built on
//! `pulldown-cmark`.
//!
//! This crate provides:
//! - Pattern scanners for wikilinks, tags, callout headers, highlights and
//!   comments, all **code aware** (matches inside code are dropped)
//! - Link resolution from vault paths to canonical site URLs
//! - Link extraction and validation over raw Markdown (feeds backlinks)
//! - A document tree built from pulldown-cmark events, a set of rewriting
//!   passes and an HTML renderer
//! - Frontmatter splitting and reading-time estimates
//!
//! ## Architecture
//!
//! ### Phase 1: tree building
//! [`parse_markdown`] turns CommonMark events into a [`Node`] tree. Obsidian
//! syntax survives as text because pulldown-cmark does not know it.
//!
//! ### Phase 2: passes
//! Each [`Transform`] walks the tree read-only and queues edits in a
//! [`TreeEditor`]; the edits are committed in reverse document order so no
//! pending edit sees shifted indices. [`Pipeline::standard`] fixes the order.
//!
//! ### Phase 3: rendering
//! [`to_html`] serializes the tree; HTML produced by passes is emitted raw.
//!
//! ## Quick Start
//!
//! ```
//! use vaultpress_bases::MemoryBaseStore;
//! use vaultpress_core::{Collection, Corpus, Document, SiteConfig};
//! use vaultpress_parser::{Pipeline, TransformContext};
//!
//! let post = Document::new(Collection::Posts, "trip", "See [[Packing List]] #travel");
//! let corpus = Corpus::new(vec![post.clone()]);
//! let bases = MemoryBaseStore::new();
//! let config = SiteConfig::default();
//! let ctx = TransformContext::new(&post, &corpus, &bases, &config);
//!
//! let html = Pipeline::standard().render_document(&ctx).unwrap();
//! assert!(html.contains("href=\"/posts/packing-list\""));
//! assert!(html.contains("href=\"/posts/tag/travel\""));
//! ```
//!
//! ### Link extraction
//!
//! ```
//! use vaultpress_parser::extract_all_internal_links;
//!
//! let links = extract_all_internal_links("[[Trip]] and [again](posts/trip.md)");
//! assert_eq!(links.len(), 1);
//! assert_eq!(links[0].slug, "trip");
//! ```

pub mod edit;
pub mod frontmatter;
pub mod links;
pub mod passes;
pub mod pipeline;
pub mod reading;
pub mod render;
pub mod resolver;
pub mod scanner;
pub mod tree;

pub use edit::{Flow, TreeEditor, Visit, walk};
pub use frontmatter::{parse_document, parse_frontmatter, split_frontmatter, strip_frontmatter};
pub use links::{
    extract_all_internal_links, extract_standard_links, extract_wikilinks, resolve_wikilink,
    validate_wikilinks,
};
pub use passes::{Transform, TransformContext};
pub use pipeline::Pipeline;
pub use reading::{ReadingTime, calculate_reading_time};
pub use render::to_html;
pub use resolver::{LinkContext, Resolution, anchor_slug, is_internal_link, resolve};
pub use tree::{HProperties, Node, NodeKind, parse_markdown};

/// Convenience prelude for rendering documents
pub mod prelude {
    pub use crate::links::{extract_all_internal_links, validate_wikilinks};
    pub use crate::passes::{Transform, TransformContext};
    pub use crate::pipeline::Pipeline;
    pub use crate::render::to_html;
    pub use crate::tree::{Node, NodeKind, parse_markdown};
}
