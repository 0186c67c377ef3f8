use std::time::Duration;

use thiserror::Error;

use crate::model::persona::Persona;

/// A waited-for condition never became true within its budget.
#[derive(Debug, Clone, Error)]
#[error("timed out after {elapsed:?} (budget {timeout:?}) waiting for {condition} on '{selector}'")]
pub struct TimeoutError {
    /// Human-readable condition, e.g. "visible" or "text == \"3\""
    pub condition: String,
    pub selector: String,
    pub elapsed: Duration,
    pub timeout: Duration,
}

/// An observed value did not match the expected value or invariant.
#[derive(Debug, Clone, Error)]
#[error("{operation}: expected {expected}, got {actual}")]
pub struct AssertionError {
    pub operation: String,
    pub expected: String,
    pub actual: String,
}

impl AssertionError {
    pub fn new(
        operation: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self {
            operation: operation.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// A persona deviated from nominal behaviour in a way its tolerance entry does not cover.
#[derive(Debug, Clone, Error)]
#[error("unexpected defect for {persona} during {operation}: {detail}")]
pub struct UnexpectedDefectError {
    pub persona: Persona,
    pub operation: String,
    pub detail: String,
}

/// Failures reported by the automation driver itself.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to spawn {program} (is Node.js installed?): {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("browser server I/O: {0}")]
    Io(String),

    #[error("browser server rejected '{command}': {error}")]
    Protocol { command: String, error: String },

    #[error("JSON error ({context}): {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("element handle {0} is no longer attached")]
    StaleHandle(String),

    #[error("browser page already closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum JourneyError {
    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    #[error(transparent)]
    Assertion(#[from] AssertionError),

    #[error(transparent)]
    UnexpectedDefect(#[from] UnexpectedDefectError),

    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl JourneyError {
    pub fn assertion(
        operation: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::Assertion(AssertionError::new(operation, expected, actual))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, JourneyError>;
