//! # Vaultpress Core
//!
//! Core data models, error types, and configuration for the vaultpress
//! publishing pipeline. This crate defines the canonical types that all other
//! crates depend on.
//!
//! ## Architecture Principles
//!
//! - **Type-Driven Design**: collections and layouts are enums, not strings
//! - **Zero Panic in Libraries**: fallible operations return [`Result`]
//! - **Explicit context**: the [`Corpus`] snapshot is passed to whoever needs it
//!   instead of living in a process-wide cache
//! - **Builder Pattern for Complex Types**: configuration structs use builders
//!
//! ## Core Modules
//!
//! - [`models`] - Documents, collections, corpus, link and backlink records
//! - [`error`] - Error type and Result alias
//! - [`config`] - Site and excerpt configuration
//! - [`validation`] - Build-time warnings for links and frontmatter
//! - [`utils`] - Slugify, URL decoding, `/index` normalization, dates
//!
//! ## Usage
//!
//! ```
//! use vaultpress_core::prelude::*;
//!
//! let corpus = Corpus::new(vec![
//!     Document::new(Collection::Posts, "hello-world", "See [[Other Post]]"),
//! ]);
//! assert_eq!(corpus.find_post("hello-world").unwrap().url(), "/posts/hello-world");
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod utils;
pub mod validation;

pub use config::{ExcerptConfig, SiteConfig, SiteConfigBuilder};
pub use error::{Error, Result};
pub use models::*;
pub use validation::{
    FrontmatterValidator, LinkValidation, Severity, ValidationIssue, ValidationReport,
};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ExcerptConfig, SiteConfig};
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        Collection, ContentLayout, Corpus, Document, Excerpt, Frontmatter, LinkMatch,
        LinkedMention,
    };
    pub use crate::utils::slugify;
    pub use crate::validation::{LinkValidation, Severity, ValidationIssue, ValidationReport};
}
