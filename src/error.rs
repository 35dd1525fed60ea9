#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use crate::outcome::{Fault, Outcome};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error code constants for type-safe error handling
pub mod code {
    pub const VALIDATION: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const DUPLICATE: &str = "DUPLICATE";
    pub const INSUFFICIENT_STOCK: &str = "INSUFFICIENT_STOCK";
    pub const INVALID_OPERATION: &str = "INVALID_OPERATION";
    pub const CONCURRENCY: &str = "CONCURRENCY_CONFLICT";
    pub const CONNECTION: &str = "CONNECTION_ERROR";
    pub const QUERY: &str = "QUERY_ERROR";
    pub const UNEXPECTED: &str = "UNEXPECTED";
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AppError {
    #[error("Validation failed for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{entity_type} with id {id} was not found")]
    NotFound { entity_type: String, id: String },

    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    #[error("Insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: u32,
    },

    #[error("Cannot {operation}: {reason}")]
    InvalidOperation { operation: String, reason: String },

    #[error("{entity_type} {id} was modified concurrently")]
    Concurrency { entity_type: String, id: String },

    #[error("Connection error: {message}")]
    Connection {
        message: String,
        cause: Option<String>,
    },

    #[error("Query failed: {query}")]
    Query { query: String, cause: Option<String> },

    #[error("{message}")]
    Generic {
        code: String,
        message: String,
        cause: Option<String>,
    },
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity_type: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn insufficient_stock(name: impl Into<String>, requested: u32, available: u32) -> Self {
        Self::InsufficientStock {
            name: name.into(),
            requested,
            available,
        }
    }

    pub fn invalid_operation(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub fn generic(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generic {
            code: code.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Returns the protocol error code for this error
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Validation { .. } => code::VALIDATION,
            Self::NotFound { .. } => code::NOT_FOUND,
            Self::Duplicate { .. } => code::DUPLICATE,
            Self::InsufficientStock { .. } => code::INSUFFICIENT_STOCK,
            Self::InvalidOperation { .. } => code::INVALID_OPERATION,
            Self::Concurrency { .. } => code::CONCURRENCY,
            Self::Connection { .. } => code::CONNECTION,
            Self::Query { .. } => code::QUERY,
            Self::Generic { code, .. } => code,
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    #[must_use]
    pub fn cause(&self) -> Option<&str> {
        match self {
            Self::Connection { cause, .. } | Self::Query { cause, .. } | Self::Generic { cause, .. } => {
                cause.as_deref()
            }
            _ => None,
        }
    }

    /// Returns the HTTP status a transport layer reports for this error
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation { .. } | Self::InsufficientStock { .. } | Self::InvalidOperation { .. } => {
                400
            }
            Self::Duplicate { .. } => 409,
            Self::Concurrency { .. }
            | Self::Connection { .. }
            | Self::Query { .. }
            | Self::Generic { .. } => 500,
        }
    }
}

impl From<Fault> for AppError {
    fn from(fault: Fault) -> Self {
        Self::Generic {
            code: code::UNEXPECTED.to_string(),
            message: "An unexpected error occurred".to_string(),
            cause: Some(fault.message().to_string()),
        }
    }
}

/// Error code details: (code, description, fix hint)
pub const ERROR_CODES: &[(&str, &str, &str)] = &[
    (
        code::VALIDATION,
        "Request payload failed validation",
        "Correct the reported field and resend",
    ),
    (
        code::NOT_FOUND,
        "Resource was not found",
        "List resources and verify identifier",
    ),
    (
        code::DUPLICATE,
        "Resource already exists",
        "Use a different value for the unique field",
    ),
    (
        code::INSUFFICIENT_STOCK,
        "Not enough stock to fulfil the request",
        "Lower the requested quantity or restock first",
    ),
    (
        code::INVALID_OPERATION,
        "Operation not allowed in the current state",
        "Inspect the resource status before retrying",
    ),
    (
        code::CONCURRENCY,
        "Resource changed while being updated",
        "Reload the resource and retry",
    ),
    (
        code::CONNECTION,
        "Storage connection failed",
        "Check storage availability and retry",
    ),
    (
        code::QUERY,
        "Storage query failed",
        "Inspect logs for the failing query",
    ),
    (
        code::UNEXPECTED,
        "Unexpected internal failure",
        "Inspect logs and retry",
    ),
];

/// Get error code details (description and fix) for a given error code
#[must_use]
pub fn get_error_info(error_code: &str) -> Option<(&'static str, &'static str)> {
    ERROR_CODES
        .iter()
        .find(|(code, _, _)| *code == error_code)
        .map(|(_, desc, fix)| (*desc, *fix))
}

pub type AppOutcome<T> = Outcome<T, AppError>;
