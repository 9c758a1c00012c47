//! Error types for the table store.

/// Result type alias for table store operations.
pub type Result<T> = std::result::Result<T, TableError>;

/// Errors raised by table store operations.
///
/// Reconciliation and toggle operations never fail; unresolvable identities
/// are treated as "not found". Only operations that need a stable row key,
/// and identity resolution on an absent row, return errors.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// An operation that needs cross-refresh identity ran without a row key.
    #[error("'{operation}' requires a row key to be configured")]
    MissingRowKey {
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// Identity resolution was asked for a row that does not exist.
    #[error("row is required when resolving row identity")]
    InvalidRow,

    /// A configuration value could not be interpreted.
    #[error("invalid value for '{property}': {message}")]
    InvalidConfiguration {
        /// The offending property.
        property: String,
        /// What was wrong with it.
        message: String,
    },

    /// Options text failed to parse as TOML.
    #[error("failed to parse table options: {0}")]
    Config(#[from] toml::de::Error),

    /// Row or options JSON failed to load.
    #[error("failed to load JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl TableError {
    /// Create a missing row key error.
    pub fn missing_row_key(operation: &'static str) -> Self {
        Self::MissingRowKey { operation }
    }

    /// Create a configuration error.
    pub fn invalid_configuration(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            property: property.into(),
            message: message.into(),
        }
    }
}
