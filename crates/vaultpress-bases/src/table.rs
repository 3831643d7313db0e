//! Table rendering for resolved base configs.

use crate::config::{BaseConfig, SortDirection, SortSpec};
use serde_json::Value;
use std::cmp::Ordering;
use vaultpress_core::utils::{escape_html, format_date, parse_date};
use vaultpress_core::{Collection, Result};

/// One queryable item: the JSON record a collection listing exposes
/// (`id`, `url`, `title`, `date`, `tags`, ...)
pub type Item = serde_json::Map<String, Value>;

/// Rows shown in files mode
pub const DEFAULT_FILES_LIMIT: usize = 36;

/// Placeholder shown when a base cannot be resolved or rendered
pub const ERROR_PLACEHOLDER: &str = r#"<div class="table-wrapper"><div class="overflow-x-auto"><div class="py-3 px-4 text-sm text-primary-600 dark:text-primary-300">Failed to load base.</div></div></div>"#;

/// Where table rows come from
pub trait ItemSource {
    /// Items of one collection
    fn items(&self, collection: Collection) -> Result<Vec<Item>>;

    /// Every vault file name (notes without `.md`)
    fn file_names(&self) -> Result<Vec<String>>;
}

/// Renders base configs against an [`ItemSource`]
#[derive(Debug, Clone)]
pub struct TableRenderer {
    files_limit: usize,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_FILES_LIMIT)
    }
}

impl TableRenderer {
    pub fn new(files_limit: usize) -> Self {
        Self { files_limit }
    }

    /// Render the table HTML for `config`
    pub fn render(&self, config: &BaseConfig, source: &dyn ItemSource) -> Result<String> {
        if config.enumerates_files() {
            let mut names = source.file_names()?;
            names.sort_by_key(|name| name.to_lowercase());
            names.truncate(self.files_limit);

            let columns = vec!["file name".to_string()];
            let rows: Vec<Vec<String>> = names.into_iter().map(|n| vec![escape_html(&n)]).collect();
            return Ok(build_table_html(&columns, &rows, None));
        }

        let mut items = match config.source {
            Some(collection) => source.items(collection)?,
            None => {
                let mut all = Vec::new();
                for collection in Collection::QUERYABLE {
                    all.extend(source.items(collection)?);
                }
                all
            }
        };

        if let Some(sort) = config.sort.as_ref().filter(|s| !s.property.is_empty()) {
            sort_items(&mut items, sort);
        }
        if let Some(limit) = config.limit.filter(|&n| n > 0) {
            items.truncate(limit);
        }

        let columns = config.columns();
        let rows: Vec<Vec<String>> = items
            .iter()
            .map(|item| columns.iter().map(|c| escape_html(&cell_value(item, c))).collect())
            .collect();

        let labels: Option<Vec<String>> = config
            .header_labels
            .as_ref()
            .map(|labels| labels.iter().map(|l| escape_html(l)).collect());
        Ok(build_table_html(&columns, &rows, labels.as_deref()))
    }

    /// Render, falling back to the error placeholder on any failure
    pub fn render_or_placeholder(&self, config: &BaseConfig, source: &dyn ItemSource) -> String {
        match self.render(config, source) {
            Ok(html) => html,
            Err(e) => {
                log::warn!("Failed to render base: {}", e);
                ERROR_PLACEHOLDER.to_string()
            }
        }
    }
}

/// Sort items in place, stable.
///
/// Properties whose name contains `date` compare by parsed timestamp (0 when
/// unparseable). Other values group by kind: numbers (missing values and
/// booleans count as numbers, missing as 0) sort before strings, strings
/// before lists and maps. Numbers compare numerically, strings
/// lexicographically.
pub fn sort_items(items: &mut [Item], sort: &SortSpec) {
    let property = sort.property.as_str();
    let by_date = property.to_ascii_lowercase().contains("date");

    items.sort_by(|a, b| {
        let (av, bv) = (a.get(property), b.get(property));
        let ordering = if by_date {
            timestamp(av).cmp(&timestamp(bv))
        } else {
            compare_values(av, bv)
        };
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn timestamp(value: Option<&Value>) -> i64 {
    value
        .and_then(Value::as_str)
        .and_then(parse_date)
        .map(|d| d.timestamp_millis())
        .unwrap_or(0)
}

fn kind_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null | Value::Bool(_) | Value::Number(_)) => 0,
        Some(Value::String(_)) => 1,
        Some(_) => 2,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    kind_rank(a).cmp(&kind_rank(b)).then_with(|| match (a, b) {
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) if kind_rank(a) == 2 => x.to_string().cmp(&y.to_string()),
        _ => numeric(a).total_cmp(&numeric(b)),
    })
}

fn numeric(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Text shown in one cell.
///
/// `file name` is the id's last segment (else the URL basename), `path` the
/// URL pathname, `date` the formatted date; any other column shows the raw
/// field.
pub fn cell_value(item: &Item, column: &str) -> String {
    match column.to_ascii_lowercase().as_str() {
        "file name" => {
            if let Some(id) = item.get("id").and_then(Value::as_str) {
                id.rsplit('/').next().unwrap_or(id).to_string()
            } else if let Some(url) = item.get("url").and_then(Value::as_str) {
                let path = url_pathname(url);
                path.rsplit('/').next().unwrap_or_default().to_string()
            } else {
                String::new()
            }
        }
        "path" => item
            .get("url")
            .and_then(Value::as_str)
            .map(|u| url_pathname(u).to_string())
            .unwrap_or_default(),
        "date" => item
            .get("date")
            .and_then(Value::as_str)
            .and_then(parse_date)
            .map(|d| format_date(&d))
            .unwrap_or_default(),
        _ => item.get(column).map(display_value).unwrap_or_default(),
    }
}

/// Path part of a site-relative or absolute URL
fn url_pathname(url: &str) -> &str {
    let without_origin = match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("/", |i| &rest[i..]),
        None => url,
    };
    let end = without_origin
        .find(['?', '#'])
        .unwrap_or(without_origin.len());
    &without_origin[..end]
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Build the styled table markup.
///
/// Cells and labels are inserted as given. `header_labels` replace the
/// column names only when there is one label per column.
pub fn build_table_html(
    columns: &[String],
    rows: &[Vec<String>],
    header_labels: Option<&[String]>,
) -> String {
    let headers = header_labels
        .filter(|labels| labels.len() == columns.len())
        .unwrap_or(columns);

    let mut html = String::from(
        r#"<div class="table-wrapper"><div class="overflow-x-auto"><table class="w-full text-left border-collapse">"#,
    );

    html.push_str(r#"<thead><tr class="border-b border-primary-200 dark:border-primary-600">"#);
    for header in headers {
        html.push_str(r#"<th class="py-2 pr-4 text-primary-600 dark:text-primary-300 whitespace-nowrap">"#);
        html.push_str(header);
        html.push_str("</th>");
    }
    html.push_str("</tr></thead><tbody>");

    for row in rows {
        html.push_str(r#"<tr class="border-b border-primary-200/60 dark:border-primary-600/60 last:border-0">"#);
        for cell in row {
            html.push_str(r#"<td class="py-2 pr-4 text-primary-900 dark:text-primary-100 whitespace-nowrap">"#);
            html.push_str(cell);
            html.push_str("</td>");
        }
        html.push_str("</tr>");
    }

    html.push_str("</tbody></table></div></div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vaultpress_core::Error;

    struct FixtureSource;

    fn item(value: Value) -> Item {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("fixtures are objects"),
        }
    }

    impl ItemSource for FixtureSource {
        fn items(&self, collection: Collection) -> Result<Vec<Item>> {
            Ok(match collection {
                Collection::Posts => vec![
                    item(json!({"id": "alpha", "url": "/posts/alpha", "title": "Alpha", "date": "2024-01-05", "tags": ["a", "b"]})),
                    item(json!({"id": "gamma/index", "url": "/posts/gamma", "title": "Gamma", "date": "2024-03-01"})),
                    item(json!({"id": "beta", "url": "/posts/beta", "title": "<Beta>", "date": "not a date"})),
                ],
                Collection::Docs => vec![item(json!({"url": "https://example.com/docs/setup?x=1", "title": "Setup", "order": 2}))],
                _ => vec![],
            })
        }

        fn file_names(&self) -> Result<Vec<String>> {
            Ok(vec!["zeta".into(), "Alpha".into(), "beta.png".into()])
        }
    }

    struct FailingSource;

    impl ItemSource for FailingSource {
        fn items(&self, _: Collection) -> Result<Vec<Item>> {
            Err(Error::other("listing unavailable"))
        }

        fn file_names(&self) -> Result<Vec<String>> {
            Err(Error::other("listing unavailable"))
        }
    }

    fn posts_config(select: &[&str]) -> BaseConfig {
        BaseConfig {
            source: Some(Collection::Posts),
            select: Some(select.iter().map(|s| s.to_string()).collect()),
            ..BaseConfig::table()
        }
    }

    #[test]
    fn test_files_mode_sorted_and_capped() {
        let config = BaseConfig {
            files: true,
            ..Default::default()
        };
        let html = TableRenderer::new(2).render(&config, &FixtureSource).unwrap();
        assert!(html.contains(">Alpha</td>"));
        assert!(html.contains(">beta.png</td>"));
        assert!(!html.contains("zeta"));
        assert!(html.find("Alpha").unwrap() < html.find("beta.png").unwrap());
    }

    #[test]
    fn test_cells() {
        let posts = FixtureSource.items(Collection::Posts).unwrap();
        assert_eq!(cell_value(&posts[1], "file name"), "index");
        assert_eq!(cell_value(&posts[0], "File Name"), "alpha");
        assert_eq!(cell_value(&posts[0], "path"), "/posts/alpha");
        assert_eq!(cell_value(&posts[0], "date"), "1/5/2024");
        assert_eq!(cell_value(&posts[2], "date"), "");
        assert_eq!(cell_value(&posts[0], "tags"), "a,b");
        assert_eq!(cell_value(&posts[0], "missing"), "");

        let docs = FixtureSource.items(Collection::Docs).unwrap();
        assert_eq!(cell_value(&docs[0], "file name"), "setup");
        assert_eq!(cell_value(&docs[0], "path"), "/docs/setup");
        assert_eq!(cell_value(&docs[0], "order"), "2");
    }

    #[test]
    fn test_sort_before_limit() {
        let mut config = posts_config(&["title"]);
        config.sort = Some(SortSpec {
            property: "date".into(),
            direction: SortDirection::Desc,
        });
        config.limit = Some(2);

        let html = TableRenderer::default().render(&config, &FixtureSource).unwrap();
        let gamma = html.find(">Gamma<").unwrap();
        let alpha = html.find(">Alpha<").unwrap();
        assert!(gamma < alpha);
        assert!(!html.contains("Beta"));
    }

    #[test]
    fn test_string_and_numeric_sorts() {
        let mut items = FixtureSource.items(Collection::Posts).unwrap();
        sort_items(
            &mut items,
            &SortSpec {
                property: "title".into(),
                direction: SortDirection::Asc,
            },
        );
        let titles: Vec<_> = items.iter().map(|i| cell_value(i, "title")).collect();
        assert_eq!(titles, vec!["<Beta>", "Alpha", "Gamma"]);

        let mut numbers = vec![item(json!({"n": 3})), item(json!({})), item(json!({"n": 1}))];
        sort_items(
            &mut numbers,
            &SortSpec {
                property: "n".into(),
                direction: SortDirection::Asc,
            },
        );
        let ns: Vec<_> = numbers.iter().map(|i| cell_value(i, "n")).collect();
        assert_eq!(ns, vec!["", "1", "3"]);
    }

    #[test]
    fn test_mixed_kinds_sort_consistently() {
        let values = [json!("10"), json!("9"), json!(9.5), json!(null), json!(["x"]), json!(2), json!("abc")];
        for a in &values {
            for b in &values {
                let forward = compare_values(Some(a), Some(b));
                assert_eq!(forward.reverse(), compare_values(Some(b), Some(a)), "{} vs {}", a, b);
                for c in &values {
                    if forward.is_le() && compare_values(Some(b), Some(c)).is_le() {
                        assert!(compare_values(Some(a), Some(c)).is_le(), "{} <= {} <= {}", a, b, c);
                    }
                }
            }
        }

        let mut items: Vec<Item> = values.iter().map(|v| item(json!({ "n": v }))).collect();
        sort_items(
            &mut items,
            &SortSpec {
                property: "n".into(),
                direction: SortDirection::Asc,
            },
        );
        let ns: Vec<_> = items.iter().map(|i| i["n"].to_string()).collect();
        assert_eq!(ns, vec!["null", "2", "9.5", "\"10\"", "\"9\"", "\"abc\"", "[\"x\"]"]);
    }

    #[test]
    fn test_no_source_aggregates_collections() {
        let config = BaseConfig::table();
        let html = TableRenderer::default().render(&config, &FixtureSource).unwrap();
        assert_eq!(html.matches("<td ").count(), 4);
        assert!(html.contains(">file name</th>"));
    }

    #[test]
    fn test_header_labels_and_escaping() {
        let mut config = posts_config(&["title", "path"]);
        config.header_labels = Some(vec!["Title".into(), "Link".into()]);
        let html = TableRenderer::default().render(&config, &FixtureSource).unwrap();
        assert!(html.contains(">Title</th>"));
        assert!(html.contains(">Link</th>"));
        assert!(html.contains("&lt;Beta&gt;"));

        config.header_labels = Some(vec!["Only one".into()]);
        let html = TableRenderer::default().render(&config, &FixtureSource).unwrap();
        assert!(html.contains(">title</th>"));
    }

    #[test]
    fn test_failure_renders_placeholder() {
        let html = TableRenderer::default().render_or_placeholder(&posts_config(&["title"]), &FailingSource);
        assert_eq!(html, ERROR_PLACEHOLDER);
    }

    #[test]
    fn test_table_markup_snapshot() {
        let columns = vec!["title".to_string()];
        let rows = vec![vec!["Hello".to_string()]];
        insta::assert_snapshot!(build_table_html(&columns, &rows, None), @r#"<div class="table-wrapper"><div class="overflow-x-auto"><table class="w-full text-left border-collapse"><thead><tr class="border-b border-primary-200 dark:border-primary-600"><th class="py-2 pr-4 text-primary-600 dark:text-primary-300 whitespace-nowrap">title</th></tr></thead><tbody><tr class="border-b border-primary-200/60 dark:border-primary-600/60 last:border-0"><td class="py-2 pr-4 text-primary-900 dark:text-primary-100 whitespace-nowrap">Hello</td></tr></tbody></table></div></div>"#);
    }
}
