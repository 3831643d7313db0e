//! # Vaultpress Bases
//!
//! Obsidian "base" directives: spreadsheet-like table views over content
//! collections.
//!
//! Provides:
//! - Shallow fenced-block configs (`select: [..]`, `source:`, `limit:`, `view:`)
//! - `.base` files with `views:` and `properties:` sections
//! - Placeholder markup carrying the resolved config as JSON
//! - Table rendering against any [`ItemSource`]
//! - A per-embed [`BusyFlag`] so concurrent triggers never double-render
//! - Vault file listing for files-mode tables
//!
//! ## Quick Start
//!
//! ```
//! use vaultpress_bases::{parse_base_file, BaseConfig};
//!
//! let base = parse_base_file(
//!     "views:\n  - type: table\n    name: Posts\n    order:\n      - note.title\n      - formula.Slug\n",
//! )
//! .unwrap();
//!
//! let mut config = BaseConfig::table();
//! base.apply_to(&mut config);
//! assert_eq!(config.select, Some(vec!["title".to_string(), "path".to_string()]));
//! ```

pub mod config;
pub mod embed;
pub mod files;
pub mod guard;
pub mod store;
pub mod table;
pub mod view;

pub use config::{BaseConfig, SortDirection, SortSpec, parse_shallow_config};
pub use embed::{BaseEmbed, decode_config_attribute, placeholder_html};
pub use files::list_vault_files;
pub use guard::{BusyFlag, BusyGuard};
pub use store::{BaseStore, DirBaseStore, MemoryBaseStore, resolve_base_block, resolve_base_embed};
pub use table::{ERROR_PLACEHOLDER, Item, ItemSource, TableRenderer, build_table_html};
pub use view::{BaseFile, BaseView, alias_column, parse_base_file};
