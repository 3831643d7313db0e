//! Configuration types for the publishing pipeline.
//!
//! Follows a builder pattern for complex configuration with validation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Excerpt window and cleanup limits for backlink context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcerptConfig {
    /// Desired context on each side of the link
    pub context_length: usize,
    /// Minimum context on each side before re-widening
    pub min_context_length: usize,
    /// Target maximum excerpt length
    pub max_length: usize,
    /// Minimum word count of a cleaned excerpt before re-widening
    pub min_words: usize,
    /// Cap on fixed-point cleanup iterations
    pub cleanup_passes: usize,
    /// How far past `max_length` a complete trailing link may extend the excerpt
    pub link_overrun: f64,
}

impl Default for ExcerptConfig {
    fn default() -> Self {
        Self {
            context_length: 100,
            min_context_length: 60,
            max_length: 200,
            min_words: 10,
            cleanup_passes: 5,
            link_overrun: 1.5,
        }
    }
}

impl ExcerptConfig {
    /// Hard ceiling on excerpt length, including the complete-link allowance
    pub fn ceiling(&self) -> usize {
        (self.max_length as f64 * self.link_overrun).floor() as usize
    }

    /// Validate limits
    pub fn validate(&self) -> Result<()> {
        if self.max_length == 0 {
            return Err(Error::config_error("excerpt max_length must be positive"));
        }
        if self.min_context_length > self.context_length {
            return Err(Error::config_error(
                "excerpt min_context_length cannot exceed context_length",
            ));
        }
        if self.link_overrun < 1.0 {
            return Err(Error::config_error("excerpt link_overrun must be at least 1.0"));
        }
        Ok(())
    }
}

/// Site-wide pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Root of the content tree (holds `posts/`, `pages/`, `bases/`, ...)
    pub content_root: PathBuf,
    /// Directory of `.base` files, relative to `content_root`
    pub bases_dir: PathBuf,
    /// URL prefix for inline tag archive links
    pub tag_base_url: String,
    /// Maximum rows in the enumerate-files base table
    pub files_table_limit: usize,
    /// Publish drafts (development builds)
    pub include_drafts: bool,
    /// Name of the theme provider to use
    pub theme: String,
    /// Log level for `init_logging`
    pub log_level: String,
    pub excerpt: ExcerptConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("src/content"),
            bases_dir: PathBuf::from("bases"),
            tag_base_url: "/posts/tag/".to_string(),
            files_table_limit: 36,
            include_drafts: false,
            theme: "default".to_string(),
            log_level: "info".to_string(),
            excerpt: ExcerptConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Create a config with builder
    pub fn builder() -> SiteConfigBuilder {
        SiteConfigBuilder::default()
    }

    /// Load from YAML text; missing keys take their defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: SiteConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Absolute location of the bases directory
    pub fn bases_path(&self) -> PathBuf {
        self.content_root.join(&self.bases_dir)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.tag_base_url.starts_with('/') || !self.tag_base_url.ends_with('/') {
            return Err(Error::config_error(format!(
                "tag_base_url must start and end with '/': {}",
                self.tag_base_url
            )));
        }
        if self.files_table_limit == 0 {
            return Err(Error::config_error("files_table_limit must be positive"));
        }
        if self.theme.trim().is_empty() {
            return Err(Error::config_error("theme name cannot be empty"));
        }
        self.excerpt.validate()
    }
}

/// Builder for SiteConfig
#[derive(Debug, Default)]
pub struct SiteConfigBuilder {
    config: SiteConfig,
}

impl SiteConfigBuilder {
    /// Set the content root
    pub fn content_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.content_root = root.into();
        self
    }

    /// Set the bases directory (relative to the content root)
    pub fn bases_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.bases_dir = dir.into();
        self
    }

    /// Set the tag archive URL prefix
    pub fn tag_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.tag_base_url = url.into();
        self
    }

    /// Publish drafts
    pub fn include_drafts(mut self, include: bool) -> Self {
        self.config.include_drafts = include;
        self
    }

    /// Select a theme by name
    pub fn theme(mut self, name: impl Into<String>) -> Self {
        self.config.theme = name.into();
        self
    }

    /// Override excerpt limits
    pub fn excerpt(mut self, excerpt: ExcerptConfig) -> Self {
        self.config.excerpt = excerpt;
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<SiteConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SiteConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.excerpt.max_length, 200);
        assert_eq!(config.excerpt.ceiling(), 300);
        assert_eq!(config.bases_path(), PathBuf::from("src/content/bases"));
    }

    #[test]
    fn test_builder_rejects_bad_tag_url() {
        let result = SiteConfig::builder().tag_base_url("tags").build();
        assert!(matches!(result, Err(Error::ConfigError { .. })));
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = SiteConfig::from_yaml_str("theme: midnight\nexcerpt:\n  max_length: 120\n").unwrap();
        assert_eq!(config.theme, "midnight");
        assert_eq!(config.excerpt.max_length, 120);
        assert_eq!(config.excerpt.context_length, 100);
        assert_eq!(config.files_table_limit, 36);
    }

    #[test]
    fn test_excerpt_validation() {
        let excerpt = ExcerptConfig {
            min_context_length: 150,
            ..Default::default()
        };
        assert!(excerpt.validate().is_err());
    }
}
