//! CLI error types.

use std::fmt;

use tilecacher::{AddressingError, ConfigError, FetchError, StoreError};

/// Errors surfaced to the command-line user.
#[derive(Debug)]
pub enum CliError {
    /// Failed to load or interpret the layers configuration.
    Config(ConfigError),

    /// Failed to open or upgrade the tile store.
    Store(StoreError),

    /// Failed to construct the HTTP client.
    Fetch(FetchError),

    /// The --bounds argument could not be parsed.
    InvalidBounds(String),

    /// The parsed bounds are not a valid geographic rectangle.
    Addressing(AddressingError),

    /// Tokio runtime or task failure.
    Runtime(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "configuration error: {}", e),
            CliError::Store(e) => write!(f, "tile store error: {}", e),
            CliError::Fetch(e) => write!(f, "HTTP client error: {}", e),
            CliError::InvalidBounds(msg) => {
                write!(f, "invalid --bounds (expected S,W,N,E degrees): {}", msg)
            }
            CliError::Addressing(e) => write!(f, "invalid region: {}", e),
            CliError::Runtime(msg) => write!(f, "runtime error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Store(e) => Some(e),
            CliError::Fetch(e) => Some(e),
            CliError::Addressing(e) => Some(e),
            CliError::InvalidBounds(_) | CliError::Runtime(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::Fetch(e)
    }
}

impl From<AddressingError> for CliError {
    fn from(e: AddressingError) -> Self {
        CliError::Addressing(e)
    }
}
