// Grid settings
// Loaded from ~/.config/gridkit/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How header clicks combine sort criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Plain click replaces the sort; shift-click appends a tie-breaker
    #[default]
    Multi,
    /// Every click replaces the sort, shift is ignored
    Single,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    // Layout
    #[serde(rename = "grid.rowHeight")]
    pub row_height: f64,

    #[serde(rename = "grid.headerHeight")]
    pub header_height: f64,

    #[serde(rename = "grid.overscan")]
    pub overscan: usize,

    // Editing
    #[serde(rename = "grid.editable")]
    pub editable: bool,

    #[serde(rename = "grid.maxRows")]
    pub max_rows: Option<usize>,  // None = unbounded

    // History
    #[serde(rename = "history.maxSize")]
    pub max_undo: usize,

    // Sorting
    #[serde(rename = "sort.mode")]
    pub sort_mode: SortMode,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            // Layout
            row_height: 32.0,
            header_height: 40.0,
            overscan: 5,
            // Editing
            editable: true,
            max_rows: None,
            // History
            max_undo: 100,
            // Sorting
            sort_mode: SortMode::Multi,
        }
    }
}

const DEFAULT_SETTINGS_JSON: &str = r#"{
    // Layout (pixels)
    "grid.rowHeight": 32,
    "grid.headerHeight": 40,
    "grid.overscan": 5,

    // Editing
    "grid.editable": true,
    "grid.maxRows": null,

    // Undo history depth (minimum 1)
    "history.maxSize": 100,

    // Header click sorting: "multi" (shift-click adds tie-breakers) or "single"
    "sort.mode": "multi"
}
"#;

impl GridSettings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gridkit");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location, creating the file if missing
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }

        Self::load_from(&path)
    }

    /// Load settings from a specific file, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                log::warn!("error parsing {}: {}; using default settings", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring `//` comment lines
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        let mut settings: Self = serde_json::from_str(&cleaned).map_err(|e| e.to_string())?;
        settings.max_undo = settings.max_undo.max(1);
        Ok(settings)
    }

    /// Save current settings to a file
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("error creating config directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(path, DEFAULT_SETTINGS_JSON) {
            log::warn!("error writing default settings.json: {}", e);
        }
    }
}
