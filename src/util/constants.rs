// ListingDesk - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "ListingDesk";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "ListingDesk";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Listing field limits
// =============================================================================

/// Maximum TITLE length in characters before the record is flagged.
pub const MAX_TITLE_CHARS: usize = 150;

/// Maximum DESCRIPTION length in characters before the record is flagged.
pub const MAX_DESCRIPTION_CHARS: usize = 5_000;

/// Smallest price any arithmetic price adjustment may produce.
pub const MIN_ADJUSTED_PRICE: f64 = 0.01;

// =============================================================================
// Pagination
// =============================================================================

/// Rows-per-page values offered by the paginator. Anything else is rejected.
pub const ROWS_PER_PAGE_OPTIONS: &[usize] = &[10, 25, 50, 100, 250];

/// Default rows per page on narrow viewports.
pub const NARROW_ROWS_PER_PAGE: usize = 25;

/// Default rows per page on regular viewports.
pub const DEFAULT_ROWS_PER_PAGE: usize = 50;

/// Viewport width (logical pixels) below which the layout counts as narrow.
pub const DEFAULT_NARROW_VIEWPORT_WIDTH: u32 = 768;

/// Bounds for the configurable narrow viewport width.
pub const MIN_NARROW_VIEWPORT_WIDTH: u32 = 320;
pub const MAX_NARROW_VIEWPORT_WIDTH: u32 = 2_560;

// =============================================================================
// Import defaults
// =============================================================================

/// Category substituted when an imported record has none.
pub const DEFAULT_CATEGORY: &str = "General";

/// Maximum length of a configured default category.
pub const MAX_DEFAULT_CATEGORY_CHARS: usize = 100;

// =============================================================================
// Analytics
// =============================================================================

/// Default number of histogram bins for the price distribution.
pub const DEFAULT_PRICE_BINS: usize = 10;

/// Upper bound on histogram bins.
pub const MAX_PRICE_BINS: usize = 100;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration and persistence
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Persisted view settings file name (stored in the platform data directory).
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Prefix for generated export file names.
pub const EXPORT_FILE_PREFIX: &str = "listings";
