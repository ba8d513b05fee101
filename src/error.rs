use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvoiceError {
    #[error("Config directory not found at {0}. Run 'salon-invoice init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Failed to read batch file {path}: {source}")]
    BatchRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Batch row {line} has {found} column(s), expected {expected}")]
    RowShape {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Batch row {line}: invalid {column} value '{value}'")]
    RowField {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("No stylist entry in stylists.toml for: {0}")]
    UnknownStylists(String),

    #[error("Stylist '{0}' has no entry in stylists.toml")]
    StylistNotFound(String),

    #[error("Template not found for stylist '{stylist}': {path}")]
    TemplateNotFound { stylist: String, path: PathBuf },

    #[error("PDF error in {path}: {reason}")]
    Pdf { path: PathBuf, reason: String },

    #[error("Failed to place field '{field}': {reason}")]
    Placement { field: String, reason: String },

    #[error("Layout has no placements. Check layout.toml.")]
    EmptyLayout,

    #[error("Destination folder missing for {stylist} invoice {invoice}: {path}")]
    DestinationMissing {
        stylist: String,
        invoice: String,
        path: PathBuf,
    },

    #[error("Failed to write {path}: {source}")]
    DestinationWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Email API token not set. Export {0} before running with email enabled.")]
    EmailTokenMissing(String),

    #[error("Email send failed for {stylist} invoice {invoice}: {reason}")]
    EmailSend {
        stylist: String,
        invoice: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InvoiceError>;
