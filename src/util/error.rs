// ListingDesk - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation.
//
// Field-level validation problems are NOT errors: they are reported as
// `core::validate::ValidationIssue` markers and never block editing.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all ListingDesk operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum ListingDeskError {
    /// Single-cell edit failed.
    Edit(EditError),

    /// Bulk operation was rejected before touching any record.
    Bulk(BulkError),

    /// Incoming spreadsheet data could not be read.
    Import(ImportError),

    /// Export operation failed.
    Export(ExportError),

    /// Persisted settings could not be written.
    Settings(SettingsError),
}

impl fmt::Display for ListingDeskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Edit(e) => write!(f, "Edit error: {e}"),
            Self::Bulk(e) => write!(f, "Bulk operation error: {e}"),
            Self::Import(e) => write!(f, "Import error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Settings(e) => write!(f, "Settings error: {e}"),
        }
    }
}

impl std::error::Error for ListingDeskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Edit(e) => Some(e),
            Self::Bulk(e) => Some(e),
            Self::Import(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Settings(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Edit errors
// ---------------------------------------------------------------------------

/// Errors from single-cell edits.
#[derive(Debug, PartialEq)]
pub enum EditError {
    /// No listing with this id exists in the working set.
    UnknownListing { id: u64 },

    /// The typed text cannot be stored in the field at all
    /// (e.g. "abc" for PRICE, "Broken" for CONDITION).
    InvalidValue {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// An edit was requested while no cell is being edited.
    NotEditing,
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownListing { id } => write!(f, "No listing with id {id}"),
            Self::InvalidValue {
                field,
                value,
                reason,
            } => write!(f, "Cannot set {field} to '{value}': {reason}"),
            Self::NotEditing => write!(f, "No cell is currently being edited"),
        }
    }
}

impl std::error::Error for EditError {}

impl From<EditError> for ListingDeskError {
    fn from(e: EditError) -> Self {
        Self::Edit(e)
    }
}

// ---------------------------------------------------------------------------
// Bulk errors
// ---------------------------------------------------------------------------

/// Errors from bulk operations. Every variant means nothing was changed.
#[derive(Debug, PartialEq)]
pub enum BulkError {
    /// A selection-scoped operation was requested with zero selected rows.
    NoRowsSelected { operation: &'static str },

    /// The value cannot be stored in the target field.
    InvalidValue {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// Price adjustment amount is negative or not a finite number.
    InvalidAdjustment { amount: f64 },
}

impl fmt::Display for BulkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRowsSelected { operation } => {
                write!(f, "{operation}: no rows are selected. Nothing was changed.")
            }
            Self::InvalidValue {
                field,
                value,
                reason,
            } => write!(
                f,
                "Cannot set {field} to '{value}': {reason}. Nothing was changed."
            ),
            Self::InvalidAdjustment { amount } => write!(
                f,
                "Price adjustment amount {amount} must be a non-negative number"
            ),
        }
    }
}

impl std::error::Error for BulkError {}

impl From<BulkError> for ListingDeskError {
    fn from(e: BulkError) -> Self {
        Self::Bulk(e)
    }
}

// ---------------------------------------------------------------------------
// Import errors
// ---------------------------------------------------------------------------

/// Errors reading incoming spreadsheet data. Per-record problems are not
/// errors; they are counted in the import summary instead.
#[derive(Debug)]
pub enum ImportError {
    /// CSV input could not be decoded.
    Csv { source: csv::Error },

    /// I/O error opening the import file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv { source } => write!(f, "Malformed CSV input: {source}"),
            Self::Io { path, source } => {
                write!(f, "Cannot read '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Csv { source } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ImportError> for ListingDeskError {
    fn from(e: ImportError) -> Self {
        Self::Import(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for ListingDeskError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Settings errors
// ---------------------------------------------------------------------------

/// Errors persisting view settings. Loading never fails; a missing or
/// unreadable settings file just means defaults.
#[derive(Debug)]
pub enum SettingsError {
    /// Could not create the directory or write the file.
    Io { path: PathBuf, source: io::Error },

    /// Settings could not be serialised.
    Serialise { source: serde_json::Error },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Cannot write settings '{}': {source}", path.display())
            }
            Self::Serialise { source } => write!(f, "Cannot serialise settings: {source}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialise { source } => Some(source),
        }
    }
}

impl From<SettingsError> for ListingDeskError {
    fn from(e: SettingsError) -> Self {
        Self::Settings(e)
    }
}

/// Convenience type alias for ListingDesk results.
pub type Result<T> = std::result::Result<T, ListingDeskError>;
