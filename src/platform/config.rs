// ListingDesk - platform/config.rs
//
// Platform directory resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for ListingDesk configuration and data.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/listingdesk/ or %APPDATA%\ListingDesk\config\)
    pub config_dir: PathBuf,

    /// Data directory for persisted view settings.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self { config_dir, data_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored so a newer config file still loads
/// with an older binary.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub view: ViewSection,
    pub import: ImportSection,
    pub export: ExportSection,
    pub logging: LoggingSection,
}

/// `[view]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ViewSection {
    /// Page size used until the user picks one.
    pub default_rows_per_page: Option<usize>,
    /// Viewports narrower than this start with the smaller page size.
    pub narrow_viewport_width: Option<u32>,
}

/// `[import]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ImportSection {
    /// CATEGORY given to imported records that lack one.
    pub default_category: Option<String>,
}

/// `[export]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Append the AUTOFILLED review column.
    pub include_autofill_column: Option<bool>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- View --
    /// `None` means "pick by viewport width".
    pub default_rows_per_page: Option<usize>,
    pub narrow_viewport_width: u32,

    // -- Import --
    pub default_category: String,

    // -- Export --
    pub include_autofill_column: bool,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_rows_per_page: None,
            narrow_viewport_width: constants::DEFAULT_NARROW_VIEWPORT_WIDTH,
            default_category: constants::DEFAULT_CATEGORY.to_string(),
            include_autofill_column: false,
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// A missing file gives defaults with no warnings (first run). An
/// unparseable file gives defaults plus a warning so the user is informed.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    load_config_file(&config_dir.join(constants::CONFIG_FILE_NAME))
}

/// Same as [`load_config`] for an explicit file path.
pub fn load_config_file(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let config = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

/// Check each field against named constants, accumulating all problems.
fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- View: default_rows_per_page --
    if let Some(rows) = raw.view.default_rows_per_page {
        if constants::ROWS_PER_PAGE_OPTIONS.contains(&rows) {
            config.default_rows_per_page = Some(rows);
        } else {
            warnings.push(format!(
                "[view] default_rows_per_page = {rows} is not one of {:?}. Using the viewport default.",
                constants::ROWS_PER_PAGE_OPTIONS,
            ));
        }
    }

    // -- View: narrow_viewport_width --
    if let Some(width) = raw.view.narrow_viewport_width {
        if (constants::MIN_NARROW_VIEWPORT_WIDTH..=constants::MAX_NARROW_VIEWPORT_WIDTH).contains(&width) {
            config.narrow_viewport_width = width;
        } else {
            warnings.push(format!(
                "[view] narrow_viewport_width = {width} is out of range ({}-{}). Using default ({}).",
                constants::MIN_NARROW_VIEWPORT_WIDTH,
                constants::MAX_NARROW_VIEWPORT_WIDTH,
                constants::DEFAULT_NARROW_VIEWPORT_WIDTH,
            ));
        }
    }

    // -- Import: default_category --
    if let Some(category) = raw.import.default_category {
        let trimmed = category.trim();
        let chars = trimmed.chars().count();
        if chars == 0 || chars > constants::MAX_DEFAULT_CATEGORY_CHARS {
            warnings.push(format!(
                "[import] default_category must be 1-{} characters. Using default (\"{}\").",
                constants::MAX_DEFAULT_CATEGORY_CHARS,
                constants::DEFAULT_CATEGORY,
            ));
        } else {
            config.default_category = trimmed.to_string();
        }
    }

    // -- Export: include_autofill_column --
    if let Some(include) = raw.export.include_autofill_column {
        config.include_autofill_column = include;
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default ({}).",
                constants::DEFAULT_LOG_LEVEL,
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    config
}
