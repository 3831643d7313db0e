//! Base-directive configuration and the shallow fenced-block parser.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use vaultpress_core::{Collection, Error, Result};

static SELECT_LIST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^select:\s*\[(.*)\]").unwrap());

/// Sort direction of a base view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything other than `DESC` (any case) sorts ascending
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

/// `{property, direction}` sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub property: String,
    pub direction: SortDirection,
}

/// Declarative table configuration carried by a base embed.
///
/// Serialized (camelCase JSON) into the placeholder's `data-base-config`
/// attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Collection>,
    /// Columns, rendered in this order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Layout kind; only `table` exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    /// Name of the requested view inside a `.base` file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    /// Enumerate raw vault file names instead of collection items
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub files: bool,
    /// Column headers from the `.base` `displayName` map
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub require_md: bool,
}

impl BaseConfig {
    /// Table layout with nothing else set
    pub fn table() -> Self {
        Self {
            view: Some("table".to_string()),
            ..Default::default()
        }
    }

    /// Files mode only applies when no source collection is named
    pub fn enumerates_files(&self) -> bool {
        self.files && self.source.is_none()
    }

    /// Selected columns, or the single `file name` column
    pub fn columns(&self) -> Vec<String> {
        let selected: Vec<String> = self
            .select
            .iter()
            .flatten()
            .filter(|c| !c.is_empty())
            .cloned()
            .collect();
        if selected.is_empty() {
            vec!["file name".to_string()]
        } else {
            selected
        }
    }

    /// Apply `.base` embed alias parameters (`source=posts;select=title,date;limit=5;view=Posts`)
    pub fn apply_alias_params(&mut self, params: &str) -> Result<()> {
        for pair in params.split(';') {
            let mut parts = pair.split('=').map(str::trim);
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                continue;
            };
            if key.is_empty() || value.is_empty() {
                continue;
            }
            match key.to_ascii_lowercase().as_str() {
                "source" => self.source = Some(parse_source(value)?),
                "limit" => self.limit = Some(parse_limit(value)?),
                "select" => self.select = Some(split_list(value)),
                "view" => self.view_name = Some(value.to_string()),
                other => log::debug!("Ignoring unknown base parameter: {}", other),
            }
        }
        Ok(())
    }
}

/// Parse the body of a fenced ```` ```base ```` block in its shallow form.
///
/// Recognized lines are `select: [a, b]`, `source: <collection>`,
/// `limit: <n>` and `view: table`. `files` defaults to `true`, so a block
/// without a source lists vault files. Unknown keys are ignored; a
/// recognized key with an unusable value is a parse error.
pub fn parse_shallow_config(raw: &str) -> Result<BaseConfig> {
    let mut config = BaseConfig {
        files: true,
        ..Default::default()
    };

    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with("select:") {
            let caps = SELECT_LIST
                .captures(line)
                .ok_or_else(|| Error::parse_error(format!("select must be a list: {}", line)))?;
            config.select = Some(split_list(&caps[1]));
        } else if let Some(value) = line.strip_prefix("source:") {
            config.source = Some(parse_source(value.trim())?);
        } else if let Some(value) = line.strip_prefix("limit:") {
            config.limit = Some(parse_limit(value.trim())?);
        } else if let Some(value) = line.strip_prefix("view:") {
            let value = value.trim();
            if value != "table" {
                return Err(Error::parse_error(format!("unsupported base view: {}", value)));
            }
            config.view = Some(value.to_string());
        }
    }

    Ok(config)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_source(raw: &str) -> Result<Collection> {
    let collection: Collection = raw.parse()?;
    if Collection::QUERYABLE.contains(&collection) {
        Ok(collection)
    } else {
        Err(Error::parse_error(format!("collection cannot back a base: {}", raw)))
    }
}

fn parse_limit(raw: &str) -> Result<usize> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::parse_error(format!(
            "limit must be a positive integer: {}",
            raw
        ))),
    }
}
