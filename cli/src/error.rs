//! Explorer error types.

use metanet_core::Entity;
use thiserror::Error;

/// Errors raised while loading, configuring or driving the explorer.
#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Traversal named a node the current network does not have
    #[error("Node '{0}' not found in the current network")]
    NodeNotFound(String),

    /// Designation named an entity that is not a current candidate
    #[error("{entity:?} '{identifier}' is not a current candidate")]
    UnknownCandidate { entity: Entity, identifier: String },

    #[error("Invalid direction '{0}': use 'successors', 'predecessors' or 'neighbors'")]
    InvalidDirection(String),

    #[error("Invalid simplification method '{0}': use 'omission' or 'replication'")]
    InvalidStrategy(String),

    #[error("Invalid entity '{0}': use 'metabolite' or 'reaction'")]
    InvalidEntity(String),

    #[error("Invalid combination '{0}': use 'union' or 'difference'")]
    InvalidCombination(String),

    /// Designation flag not of the form `entity:identifier`
    #[error("Invalid designation '{0}': expected <entity>:<identifier>")]
    InvalidDesignation(String),

    #[error("{parameter} must be between {minimum} and {maximum}, got {value}")]
    Limit {
        parameter: &'static str,
        value: i64,
        minimum: i64,
        maximum: i64,
    },
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
