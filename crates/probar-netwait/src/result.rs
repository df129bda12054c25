//! Result and error types for probar-netwait.

use thiserror::Error;

/// Result type for netwait operations
pub type NetwaitResult<T> = Result<T, NetwaitError>;

/// Errors that can occur while installing mocks or waiting on calls
///
/// Only waits and call lookups surface errors to the test. Decode
/// failures and orphan completions are absorbed inside the pipeline.
#[derive(Debug, Error)]
pub enum NetwaitError {
    /// A wait never saw its call complete
    #[error("Timed out after {ms}ms waiting for {target}")]
    Timeout {
        /// Alias-annotated description of the awaited key
        target: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// The suite was reset while the wait was pending
    #[error("Wait for {target} abandoned: interception state was reset")]
    WaitAbandoned {
        /// Alias-annotated description of the awaited key
        target: String,
    },

    /// No call was ever registered under this key
    #[error("No calls registered for {key}")]
    NotFound {
        /// Key that was looked up
        key: String,
    },

    /// `@alias` lookup failed
    #[error("Alias @{alias} was never registered")]
    AliasNotFound {
        /// Alias without the leading `@`
        alias: String,
    },

    /// Route pattern could not be compiled
    #[error("Invalid route pattern {pattern}: {message}")]
    InvalidPattern {
        /// Pattern as supplied
        pattern: String,
        /// Error message
        message: String,
    },

    /// Fixture file missing or malformed
    #[error("Fixture {name} failed to load: {message}")]
    Fixture {
        /// Fixture name
        name: String,
        /// Error message
        message: String,
    },

    /// Configuration rejected
    #[error("Invalid configuration: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Invalid state error (operation called in wrong state)
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}
