use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::data::data_view::PAGE_SIZES;
use crate::markup::TagProfile;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub view: ViewConfig,
    pub search: SearchConfig,
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Rows per page when the editor opens: 25, 50, 100 or 200
    pub default_page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Idle time after the last keystroke before a search runs
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Tag the rich-text surface wraps paragraphs in
    pub default_block_tag: String,

    /// Tag the rich-text surface uses for inline content it does not know
    pub default_inline_tag: String,

    /// Tags treated as inline when restoring structure
    pub inline_tags: Vec<String>,

    /// Tags treated as blocks when restoring structure
    pub block_tags: Vec<String>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_page_size: 25,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        let profile = TagProfile::default();
        Self {
            default_block_tag: profile.default_block_tag,
            default_inline_tag: profile.default_inline_tag,
            inline_tags: profile.inline_tags,
            block_tags: profile.block_tags,
        }
    }
}

impl EditorConfig {
    pub fn tag_profile(&self) -> TagProfile {
        TagProfile {
            default_block_tag: self.default_block_tag.to_lowercase(),
            default_inline_tag: self.default_inline_tag.to_lowercase(),
            inline_tags: self.inline_tags.iter().map(|t| t.to_lowercase()).collect(),
            block_tags: self.block_tags.iter().map(|t| t.to_lowercase()).collect(),
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Create default config if it doesn't exist
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;

        if !PAGE_SIZES.contains(&config.view.default_page_size) {
            warn!(
                target: "config",
                "Page size {} not one of {:?}, using {}",
                config.view.default_page_size,
                PAGE_SIZES,
                PAGE_SIZES[0]
            );
            config.view.default_page_size = PAGE_SIZES[0];
        }

        info!(target: "config", "Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("trans-matrix").join("config.toml"))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# trans-matrix configuration file
# Location: ~/.config/trans-matrix/config.toml (Linux)
#           ~/Library/Application Support/trans-matrix/config.toml (macOS)
#           %APPDATA%\trans-matrix\config.toml (Windows)

[view]
# Rows per page when the editor opens: 25, 50, 100 or 200
default_page_size = 25

[search]
# Milliseconds of idle typing before the search runs
debounce_ms = 300

[editor]
# Tags the rich-text editor produces by default. Elements using these tags
# and carrying no id/class/data-* attributes are not recorded for restore.
default_block_tag = "p"
default_inline_tag = "span"

# Leave these out to use the built-in tag lists
# inline_tags = ["a", "b", "em", "i", "span", "strong"]
# block_tags = ["div", "h1", "h2", "li", "p", "ul"]
"#
        .to_string()
    }
}
