//! Base-embed placeholders and their later resolution into tables.

use crate::config::BaseConfig;
use crate::guard::BusyFlag;
use crate::table::{ItemSource, TableRenderer};
use vaultpress_core::utils::to_json_string;
use vaultpress_core::Result;

/// Placeholder container emitted by the Markdown pass.
///
/// The config travels as JSON in a single-quoted `data-base-config`
/// attribute, so `&` and `'` are entity-encoded.
pub fn placeholder_html(config: &BaseConfig) -> Result<String> {
    let json = to_json_string(config, "base config")?;
    let attr = json.replace('&', "&amp;").replace('\'', "&apos;");
    Ok(format!(
        concat!(
            "<div class=\"base-embed base-embed--table\" data-base-config='{}'>\n",
            "  <div class=\"prose w-full overflow-x-auto\">\n",
            "    <div class=\"rounded-lg border border-primary-200 dark:border-primary-600 p-4 bg-primary-50 dark:bg-primary-800 text-primary-600 dark:text-primary-300\">\n",
            "      <strong>Loading base…</strong>\n",
            "    </div>\n",
            "  </div>\n",
            "</div>"
        ),
        attr
    ))
}

/// Decode a `data-base-config` attribute value back into a config.
///
/// Accepts the entity forms that show up after HTML caching round-trips.
pub fn decode_config_attribute(raw: &str) -> Result<BaseConfig> {
    let decoded = raw
        .replace("&apos;", "'")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    let raw = if decoded.trim().is_empty() { "{}" } else { decoded.as_str() };
    Ok(serde_json::from_str(raw)?)
}

/// One embedded base awaiting rendering
#[derive(Debug, Default)]
pub struct BaseEmbed {
    attribute: String,
    busy: BusyFlag,
}

impl BaseEmbed {
    /// Wrap the raw `data-base-config` attribute of a placeholder
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            busy: BusyFlag::new(),
        }
    }

    /// Render the embed's table.
    ///
    /// Returns `None` when another render of this embed is in progress.
    /// Decode and fetch failures render the error placeholder.
    pub fn render(&self, renderer: &TableRenderer, source: &dyn ItemSource) -> Option<String> {
        let _guard = self.busy.try_acquire()?;
        let html = match decode_config_attribute(&self.attribute) {
            Ok(config) => renderer.render_or_placeholder(&config, source),
            Err(e) => {
                log::warn!("Invalid base embed config: {}", e);
                crate::table::ERROR_PLACEHOLDER.to_string()
            }
        };
        Some(html)
    }

    /// Whether a render currently holds this embed
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }
}
