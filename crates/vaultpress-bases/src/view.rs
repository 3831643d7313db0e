//! `.base` file parsing: views, property display names and view selection.
//!
//! A base file looks like:
//!
//! ```yaml
//! filters:
//!   and:
//!     - file.ext == "md"
//! properties:
//!   note.title:
//!     displayName: Title
//! views:
//!   - type: table
//!     name: Posts
//!     filters:
//!       and:
//!         - file.folder.startsWith("posts")
//!     order:
//!       - note.title
//!       - note.date
//!     sort:
//!       - property: note.date
//!         direction: DESC
//!     limit: 10
//! ```
//!
//! Only the subset the table renderer needs is interpreted; every other key
//! is ignored.

use crate::config::{BaseConfig, SortDirection, SortSpec};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use vaultpress_core::{Collection, Error, Result};

static FOLDER_FILTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"file\.folder\.startsWith\("([^"]+)"\)"#).unwrap());

static REQUIRE_MD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"file\.ext\s*==\s*"md""#).unwrap());

// ============================================================================
// Raw file shape
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawBaseFile {
    #[serde(default)]
    properties: BTreeMap<String, Option<RawProperty>>,
    #[serde(default)]
    views: Vec<RawView>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProperty {
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawView {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    filters: Option<serde_yaml::Value>,
    #[serde(default)]
    order: Vec<String>,
    #[serde(default)]
    sort: Option<RawSort>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSort {
    Many(Vec<RawSortKey>),
    One(RawSortKey),
}

#[derive(Debug, Deserialize)]
struct RawSortKey {
    property: String,
    #[serde(default)]
    direction: String,
}

// ============================================================================
// Parsed views
// ============================================================================

/// One view declared in a base file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseView {
    /// Layout kind (`table`, `cards`, ...)
    pub kind: String,
    pub name: String,
    /// Folder prefix from a `file.folder.startsWith("...")` filter
    pub folder: Option<String>,
    /// Column order, raw property names
    pub order: Vec<String>,
    pub sort: Option<SortSpec>,
    pub limit: Option<usize>,
}

impl BaseView {
    /// Collection named by the folder filter's first path segment
    pub fn source(&self) -> Option<Collection> {
        let folder = self.folder.as_deref()?;
        if folder.to_ascii_lowercase().starts_with("posts") {
            return Some(Collection::Posts);
        }
        folder.split('/').next()?.parse().ok()
    }
}

/// A parsed base file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseFile {
    pub views: Vec<BaseView>,
    /// Property key -> `displayName`
    pub display_names: BTreeMap<String, String>,
    /// A global `file.ext == "md"` filter is present
    pub require_md: bool,
}

/// Parse a base file (or a fenced block in base-file form).
///
/// Fails when the text is not YAML or declares no views.
pub fn parse_base_file(text: &str) -> Result<BaseFile> {
    let raw: RawBaseFile = serde_yaml::from_str(text)?;
    if raw.views.is_empty() {
        return Err(Error::parse_error("base declares no views"));
    }

    let display_names = raw
        .properties
        .into_iter()
        .filter_map(|(key, prop)| {
            let name = prop?.display_name?;
            Some((key, name.trim().to_string()))
        })
        .collect();

    let views = raw.views.into_iter().map(convert_view).collect();

    Ok(BaseFile {
        views,
        display_names,
        require_md: REQUIRE_MD.is_match(text),
    })
}

fn convert_view(raw: RawView) -> BaseView {
    let folder = raw.filters.as_ref().and_then(find_folder_filter);
    let sort = raw.sort.and_then(|sort| {
        let key = match sort {
            RawSort::Many(keys) => keys.into_iter().next()?,
            RawSort::One(key) => key,
        };
        Some(SortSpec {
            property: key.property.trim().to_string(),
            direction: SortDirection::parse(&key.direction),
        })
    });

    BaseView {
        kind: raw.kind,
        name: raw.name.trim().to_string(),
        folder,
        order: raw.order.into_iter().map(|o| o.trim().to_string()).collect(),
        sort,
        limit: raw.limit.filter(|&n| n > 0),
    }
}

/// First `file.folder.startsWith("X")` anywhere in a filter tree
fn find_folder_filter(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => FOLDER_FILTER.captures(s).map(|c| c[1].to_string()),
        serde_yaml::Value::Sequence(items) => items.iter().find_map(find_folder_filter),
        serde_yaml::Value::Mapping(map) => map.values().find_map(find_folder_filter),
        _ => None,
    }
}

/// Canonical column name for a base property
pub fn alias_column(property: &str) -> String {
    match property.to_ascii_lowercase().as_str() {
        "formula.slug" => "path".to_string(),
        "note.pubdate" | "note.date" | "date" => "date".to_string(),
        "note.title" | "title" => "title".to_string(),
        _ => property.to_string(),
    }
}

/// Property key a canonical column's label is looked up under
fn label_key(column: &str) -> &str {
    match column {
        "path" => "formula.Slug",
        "date" => "note.date",
        "title" => "note.title",
        other => other,
    }
}

impl BaseFile {
    /// Requested view by name (ASCII case-insensitive), else `Posts`, else the first view
    pub fn choose_view(&self, requested: Option<&str>) -> Option<&BaseView> {
        let by_name = |name: &str| {
            self.views
                .iter()
                .find(|v| v.name.eq_ignore_ascii_case(name))
        };
        requested
            .filter(|name| !name.is_empty())
            .and_then(by_name)
            .or_else(|| by_name("posts"))
            .or_else(|| self.views.first())
    }

    /// Header labels for `columns` from the `displayName` map
    pub fn header_labels(&self, columns: &[String]) -> Vec<String> {
        columns.iter().map(|column| self.label(column, column)).collect()
    }

    /// Label for `property` as written in the base file, shown as `column`
    fn label(&self, property: &str, column: &str) -> String {
        self.display_names
            .get(property)
            .or_else(|| self.display_names.get(label_key(column)))
            .cloned()
            .unwrap_or_else(|| column.to_string())
    }

    /// Fill in whatever `config` leaves unset from the chosen view.
    ///
    /// Explicit alias parameters already on the config win, except that a
    /// `posts` folder filter always selects the posts collection.
    pub fn apply_to(&self, config: &mut BaseConfig) {
        if self.require_md {
            config.require_md = true;
        }

        let Some(view) = self.choose_view(config.view_name.as_deref()) else {
            return;
        };
        log::debug!("Using base view '{}'", view.name);

        match view.source() {
            Some(Collection::Posts) => config.source = Some(Collection::Posts),
            Some(source) if config.source.is_none() => config.source = Some(source),
            _ => {}
        }

        if config.select.is_none() && !view.order.is_empty() {
            let columns: Vec<String> = view.order.iter().map(|o| alias_column(o)).collect();
            config.header_labels = Some(
                view.order
                    .iter()
                    .zip(&columns)
                    .map(|(property, column)| self.label(property, column))
                    .collect(),
            );
            config.select = Some(columns);
        } else if let Some(select) = config.select.as_ref().filter(|s| !s.is_empty()) {
            config.header_labels = Some(self.header_labels(select));
        }
        if config.sort.is_none() {
            config.sort = view.sort.clone();
        }
        if config.limit.is_none() {
            config.limit = view.limit;
        }
    }
}
