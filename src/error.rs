//! Error types for clustering and view configuration.

use thiserror::Error;

/// Errors produced by the clustering engine and the view controller.
///
/// Only configuration errors are expected to reach the host. Everything
/// raised while indexing or querying is converted by the view controller into
/// an empty result set or a skipped item.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// A configuration value is missing or out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A coordinate or region handed to a validating helper is malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A domain item has no usable numeric location.
    #[error("Item has no numeric location")]
    MissingLocation,

    /// The current index has no cluster with this id.
    #[error("Unknown cluster id: {0}")]
    UnknownCluster(u64),

    /// The clustering index could not be constructed.
    #[error("Index build failed: {0}")]
    IndexBuild(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A TOML configuration document could not be parsed.
    #[error("Config parse error: {0}")]
    ConfigParse(String),
}

pub type Result<T> = std::result::Result<T, ClusterError>;
