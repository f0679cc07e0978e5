//! Error types for the PI Web API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers routinely tell
//! "no such WebId or path" apart from other failures. Every other non-2xx
//! response lands in `HttpError` with the status and the server's error
//! payload, parsed as far as its shape allows. Nothing here is retried.

use std::fmt;

use thiserror::Error;

use crate::types::{PIErrors, PIPropertyError};

/// Server-provided description of a failed request.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorPayload {
    /// `{"Errors": ["..."]}`, the common PI Web API error body.
    Errors(Vec<String>),
    /// `[{"Field": "...", "Message": ["..."]}]`, returned for invalid bodies.
    Properties(Vec<PIPropertyError>),
    /// Any other body, kept verbatim. Empty for bodiless responses.
    Raw(String),
}

impl ErrorPayload {
    pub fn parse(body: &str) -> Self {
        if let Ok(PIErrors {
            errors: Some(errors),
        }) = serde_json::from_str::<PIErrors>(body)
        {
            return ErrorPayload::Errors(errors);
        }
        if let Ok(properties) = serde_json::from_str::<Vec<PIPropertyError>>(body) {
            if !properties.is_empty() {
                return ErrorPayload::Properties(properties);
            }
        }
        ErrorPayload::Raw(body.to_string())
    }

    /// Flattened human-readable messages.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ErrorPayload::Errors(errors) => errors.clone(),
            ErrorPayload::Properties(properties) => properties
                .iter()
                .flat_map(|property| {
                    let field = property.field.as_deref().unwrap_or("<unknown>");
                    property
                        .message
                        .iter()
                        .flatten()
                        .map(move |message| format!("{field}: {message}"))
                })
                .collect(),
            ErrorPayload::Raw(body) if body.trim().is_empty() => Vec::new(),
            ErrorPayload::Raw(body) => vec![body.clone()],
        }
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages = self.messages();
        if messages.is_empty() {
            f.write_str("(empty body)")
        } else {
            f.write_str(&messages.join("; "))
        }
    }
}

/// Errors returned by the request builders, response parsers and transport.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the WebId or path does not exist.
    #[error("resource not found: {payload}")]
    NotFound { payload: ErrorPayload },

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {payload}")]
    HttpError { status: u16, payload: ErrorPayload },

    /// The request never produced a response (connection, DNS, TLS, timeout).
    #[error("transport failed: {0}")]
    TransportError(String),

    /// A 2xx body did not match the expected record shape.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// A create call succeeded without a `Location` header naming the new WebId.
    #[error("create response carried no usable Location header")]
    MissingLocation,

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl ApiError {
    /// HTTP status of a server-side failure; `None` for local failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            ApiError::NotFound { payload } | ApiError::HttpError { payload, .. } => Some(payload),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}
