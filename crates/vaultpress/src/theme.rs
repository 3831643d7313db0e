//! Named colour themes.
//!
//! A theme supplies two colour scales (`primary` and `highlight`, keyed
//! 50..950). Themes are registered explicitly by name; asking for an
//! unknown name yields the default theme.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::sync::Arc;
use vaultpress_core::{Error, Result};

/// Name the fallback theme is registered under
pub const DEFAULT_THEME: &str = "default";

/// Shade (50, 100, ... 950) to CSS colour
pub type ColorScale = BTreeMap<u16, String>;

/// Colour scales a theme provides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: ColorScale,
    pub highlight: ColorScale,
}

impl Palette {
    fn from_static(primary: &[(u16, &str)], highlight: &[(u16, &str)]) -> Self {
        let scale = |shades: &[(u16, &str)]| -> ColorScale {
            shades
                .iter()
                .map(|(shade, color)| (*shade, color.to_string()))
                .collect()
        };
        Self {
            primary: scale(primary),
            highlight: scale(highlight),
        }
    }

    /// CSS custom properties, `--color-primary-50: #f8fafc;` one per line
    pub fn css_variables(&self) -> String {
        let mut css = String::new();
        for (name, scale) in [("primary", &self.primary), ("highlight", &self.highlight)] {
            for (shade, color) in scale {
                let _ = writeln!(css, "--color-{}-{}: {};", name, shade, color);
            }
        }
        css
    }

    fn validate(&self) -> Result<()> {
        if self.primary.is_empty() || self.highlight.is_empty() {
            return Err(Error::config_error("theme palette needs primary and highlight scales"));
        }
        let bad = self
            .primary
            .values()
            .chain(self.highlight.values())
            .find(|color| color.trim().is_empty());
        if bad.is_some() {
            return Err(Error::config_error("theme palette has an empty colour"));
        }
        Ok(())
    }
}

/// Something that can theme the site
pub trait ThemeProvider: Send + Sync {
    fn name(&self) -> &str;

    fn palette(&self) -> Palette;
}

/// Theme with a fixed palette, built in or loaded from YAML
#[derive(Debug, Clone)]
pub struct PaletteTheme {
    pub name: String,
    pub palette: Palette,
}

#[derive(Deserialize)]
struct ThemeFile {
    name: String,
    primary: ColorScale,
    highlight: ColorScale,
}

impl PaletteTheme {
    pub fn new(name: impl Into<String>, palette: Palette) -> Self {
        Self {
            name: name.into(),
            palette,
        }
    }

    /// Parse a theme file: `name`, `primary` and `highlight` maps
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: ThemeFile = serde_yaml::from_str(yaml)?;
        if file.name.trim().is_empty() {
            return Err(Error::config_error("theme name cannot be empty"));
        }
        let palette = Palette {
            primary: file.primary,
            highlight: file.highlight,
        };
        palette.validate()?;
        Ok(Self::new(file.name, palette))
    }
}

impl ThemeProvider for PaletteTheme {
    fn name(&self) -> &str {
        &self.name
    }

    fn palette(&self) -> Palette {
        self.palette.clone()
    }
}

/// Themes by name with a guaranteed fallback
#[derive(Clone)]
pub struct ThemeRegistry {
    themes: HashMap<String, Arc<dyn ThemeProvider>>,
    fallback: Arc<dyn ThemeProvider>,
}

impl ThemeRegistry {
    /// Registry holding the built-in themes
    pub fn new() -> Self {
        let fallback: Arc<dyn ThemeProvider> = Arc::new(builtin::default_theme());
        let mut registry = Self {
            themes: HashMap::new(),
            fallback: Arc::clone(&fallback),
        };
        registry.themes.insert(DEFAULT_THEME.to_string(), fallback);
        for theme in builtin::themes() {
            registry.register(theme);
        }
        registry
    }

    /// Add or replace a theme under its own name
    pub fn register(&mut self, theme: impl ThemeProvider + 'static) {
        let name = theme.name().to_string();
        if self.themes.insert(name.clone(), Arc::new(theme)).is_some() {
            log::debug!("Replaced theme {}", name);
        }
    }

    /// The named theme, or the default one when it is not registered
    pub fn get(&self, name: &str) -> &dyn ThemeProvider {
        match self.themes.get(name) {
            Some(theme) => theme.as_ref(),
            None => {
                log::warn!("Theme '{}' not found, using {}", name, DEFAULT_THEME);
                self.fallback.as_ref()
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.themes.contains_key(name)
    }

    /// Registered theme names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.themes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ThemeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeRegistry")
            .field("themes", &self.names())
            .finish()
    }
}

mod builtin {
    use super::{DEFAULT_THEME, Palette, PaletteTheme};

    const SLATE: &[(u16, &str)] = &[
        (50, "#f8fafc"),
        (100, "#f1f5f9"),
        (200, "#e2e8f0"),
        (300, "#cbd5e1"),
        (400, "#94a3b8"),
        (500, "#64748b"),
        (600, "#475569"),
        (700, "#334155"),
        (800, "#1e293b"),
        (900, "#0f172a"),
        (950, "#020617"),
    ];

    pub(super) fn default_theme() -> PaletteTheme {
        PaletteTheme::new(
            DEFAULT_THEME,
            Palette::from_static(
                SLATE,
                &[
                    (50, "#fef2f2"),
                    (100, "#fee2e2"),
                    (200, "#fecaca"),
                    (300, "#fca5a5"),
                    (400, "#f87171"),
                    (500, "#ef4444"),
                    (600, "#dc2626"),
                    (700, "#b91c1c"),
                    (800, "#991b1b"),
                    (900, "#7f1d1d"),
                    (950, "#450a0a"),
                ],
            ),
        )
    }

    pub(super) fn themes() -> Vec<PaletteTheme> {
        vec![
            PaletteTheme::new(
                "minimal",
                Palette::from_static(
                    &[
                        (50, "#fafafa"),
                        (100, "#f5f5f5"),
                        (200, "#e5e5e5"),
                        (300, "#d4d4d4"),
                        (400, "#a3a3a3"),
                        (500, "#737373"),
                        (600, "#525252"),
                        (700, "#404040"),
                        (800, "#262626"),
                        (900, "#212121"),
                        (950, "#1a1a1a"),
                    ],
                    &[
                        (50, "#f0f7f9"),
                        (100, "#e1eff3"),
                        (200, "#c3dfe7"),
                        (300, "#a5cfdb"),
                        (400, "#87bfcf"),
                        (500, "#708794"),
                        (600, "#5a6d77"),
                        (700, "#43535a"),
                        (800, "#2d383c"),
                        (900, "#161d1f"),
                    ],
                ),
            ),
            PaletteTheme::new(
                "oxygen",
                Palette::from_static(
                    SLATE,
                    &[
                        (50, "#f0f9ff"),
                        (100, "#e0f2fe"),
                        (200, "#bae6fd"),
                        (300, "#7dd3fc"),
                        (400, "#38bdf8"),
                        (500, "#0ea5e9"),
                        (600, "#0284c7"),
                        (700, "#0369a1"),
                        (800, "#075985"),
                        (900, "#0c4a6e"),
                    ],
                ),
            ),
            PaletteTheme::new(
                "atom",
                Palette::from_static(
                    &[
                        (50, "#fafafa"),
                        (100, "#eaeaeb"),
                        (200, "#dbdbdc"),
                        (300, "#d8d8d9"),
                        (400, "#8e8e90"),
                        (500, "#71717a"),
                        (600, "#52525b"),
                        (700, "#3f3f46"),
                        (800, "#282c34"),
                        (900, "#21252c"),
                        (950, "#181a1f"),
                    ],
                    &[
                        (50, "#e6f3ff"),
                        (100, "#cce7ff"),
                        (200, "#99cfff"),
                        (300, "#66b7ff"),
                        (400, "#578af2"),
                        (500, "#3d74e2"),
                        (600, "#1a92ff"),
                        (700, "#0369a1"),
                        (800, "#075985"),
                        (900, "#0c4a6e"),
                    ],
                ),
            ),
        ]
    }
}
