//! Idea Vault - a personal graph of ideas.
//!
//! Ideas link to any number of parent ideas, forming a directed graph, and
//! may belong to one collection. This library provides the core
//! functionality for the `iv` CLI tool: the graph engine, the read-side
//! projections, integrity checks and the document store client.

pub mod action_log;
pub mod cli;
pub mod commands;
pub mod config;
pub mod integrity;
pub mod logging;
pub mod models;
pub mod query;
pub mod session;
pub mod storage;

/// Library-level error type for Idea Vault operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid document key: {0}")]
    InvalidKey(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Stable snake_case name of the error kind, used in JSON error output.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::NotFound(_) => "not_found",
            Error::Validation(_) => "validation",
            Error::StoreUnavailable(_) => "store_unavailable",
            Error::InvalidKey(_) => "invalid_key",
            Error::Config(_) => "config",
            Error::Other(_) => "other",
        }
    }
}

/// Result type alias for Idea Vault operations.
pub type Result<T> = std::result::Result<T, Error>;
