//! # vaultpress
//!
//! Publish an Obsidian vault as a blog. This crate ties the workspace
//! together:
//!
//! - [`Site`] loads the content tree into a [`Corpus`], renders documents
//!   through the standard [`Pipeline`] and fills in base tables
//! - [`ThemeRegistry`] holds named colour themes with a default fallback
//! - [`init_logging`] installs a `tracing` subscriber for applications
//!
//! ```
//! use vaultpress::prelude::*;
//!
//! let corpus = Corpus::new(vec![
//!     Document::new(Collection::Posts, "a", "See [[b]] for more"),
//!     Document::new(Collection::Posts, "b", "The target"),
//! ]);
//! let site = Site::new(SiteConfig::default(), corpus).unwrap();
//!
//! let page = site.render(Collection::Posts, "a").unwrap();
//! assert!(page.html.contains("href=\"/posts/b\""));
//! assert_eq!(site.backlinks("b")[0].slug, "a");
//! ```

pub mod logging;
pub mod site;
pub mod theme;

pub use logging::{init_from_config, init_logging};
pub use site::{RenderedPage, Site};
pub use theme::{ColorScale, DEFAULT_THEME, Palette, PaletteTheme, ThemeProvider, ThemeRegistry};

pub use vaultpress_bases as bases;
pub use vaultpress_graph as graph;
pub use vaultpress_parser as parser;

pub use vaultpress_core::{Collection, Corpus, Document, Error, Result, SiteConfig};
pub use vaultpress_parser::Pipeline;

pub mod prelude {
    pub use crate::site::{RenderedPage, Site};
    pub use crate::theme::{ThemeProvider, ThemeRegistry};
    pub use vaultpress_core::prelude::*;
    pub use vaultpress_graph::prelude::*;
    pub use vaultpress_parser::prelude::*;
}
