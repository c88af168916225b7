//! Error types for the NeXus conversion library.

use thiserror::Error as ThisError;

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when reading scan files or writing tables.
///
/// Skips that are part of normal operation (unknown scan type, empty
/// regions, unknown schema) are not errors; they are reported through
/// [`SkipReason`](crate::models::SkipReason).
#[derive(Debug, ThisError)]
pub enum Error {
    /// I/O error occurred while reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The hierarchical container could not be read (bad dataset, wrong type)
    #[error("Container error: {0}")]
    Container(String),

    /// A node that the conversion requires is not present
    #[error("Missing node: {0}")]
    MissingNode(String),

    /// Invalid argument, e.g. a batch folder that is not a directory
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Tab-separated output could not be written
    #[error("Table write error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file could not be parsed or is inconsistent
    #[error("Config error: {0}")]
    Config(String),

    /// ISO timestamp in a scan file could not be parsed
    #[error("Timestamp error: {0}")]
    Timestamp(#[from] chrono::ParseError),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

#[cfg(feature = "hdf5")]
impl From<hdf5::Error> for Error {
    fn from(err: hdf5::Error) -> Self {
        Error::Container(err.to_string())
    }
}
