//! # Link Graph and Linked Mentions
//!
//! Cross-post references for the publishing site, computed after every
//! document is loaded.
//!
//! Provides:
//! - Directed graph of posts and the internal links between them (petgraph)
//! - Backlink and forward-link queries, orphans, cycles and statistics
//! - Linked mentions: every post referencing a target, each with a cleaned
//!   excerpt around the reference
//!
//! ## Quick Start
//!
//! ```
//! use vaultpress_core::{Collection, Corpus, Document, ExcerptConfig};
//! use vaultpress_graph::{LinkGraph, find_backlinks};
//!
//! let corpus = Corpus::new(vec![
//!     Document::new(Collection::Posts, "a", "See [[b]] for more"),
//!     Document::new(Collection::Posts, "b", "..."),
//! ]);
//!
//! let graph = LinkGraph::from_corpus(&corpus);
//! assert_eq!(graph.edge_count(), 1);
//!
//! let mentions = find_backlinks(&corpus, "b", &ExcerptConfig::default());
//! assert_eq!(mentions[0].slug, "a");
//! assert_eq!(mentions[0].excerpt, "See [[b]] for more");
//! ```
//!
//! ## Excerpts
//!
//! Excerpts are cut from raw Markdown around the first reference, cleaned of
//! Markdown syntax (links are kept whole) and truncated at a word boundary.
//! See [`excerpt`] for the window rules.

pub mod backlinks;
pub mod excerpt;
pub mod graph;

pub use backlinks::find_backlinks;
pub use excerpt::{create_excerpt_around_link, extract_excerpt_at, truncate_excerpt};
pub use graph::{GraphStats, LinkGraph};

pub mod prelude {
    pub use crate::backlinks::find_backlinks;
    pub use crate::excerpt::create_excerpt_around_link;
    pub use crate::graph::{GraphStats, LinkGraph};
    pub use vaultpress_core::prelude::*;
}
