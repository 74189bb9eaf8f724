//! Error types for the receipt-extract library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * **Local** ([`ReceiptError`]): something on this side of the wire is
//!   wrong (the receipt file is missing, the configuration is invalid, the
//!   HTTP client could not be built). Returned as `Err(ReceiptError)` before
//!   any request is made.
//!
//! * **Remote** ([`ApiError`]): a single call to the extraction API failed
//!   (connection refused, non-success status, unreadable body). The form
//!   turns these into the inline error message shown to the user; they are
//!   terminal for that one attempt and never retried.
//!
//! [`MissingInput`] is the form's own validation failure; it never reaches
//! the network either.

use std::path::PathBuf;
use thiserror::Error;

/// Local errors raised before a request reaches the network.
#[derive(Debug, Error)]
pub enum ReceiptError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Receipt file was not found at the given path.
    #[error("Receipt file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read.
    #[error("Failed to read receipt file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// reqwest refused to build a client from the configuration.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Local validation failure: the request never left the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{}", crate::form::MISSING_INPUT_MESSAGE)]
pub struct MissingInput;

/// A failed call to the receipt API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request could not be assembled, so nothing was sent.
    #[error("Could not build request to '{url}': {reason}")]
    Request { url: String, reason: String },

    /// The request never produced a response (DNS, refused connection,
    /// timeout, TLS).
    #[error("Request to '{url}' failed: {reason}")]
    Transport { url: String, reason: String },

    /// The server answered with a non-success status.
    ///
    /// `server_message` holds the body's `error` field when the body was a
    /// JSON object carrying a non-empty string there.
    #[error("Server responded with HTTP {status} for '{url}'{}", display_server_message(.server_message))]
    Status {
        url: String,
        status: u16,
        server_message: Option<String>,
    },

    /// The response arrived but its body could not be read or decoded.
    #[error("Unreadable response body from '{url}': {reason}")]
    Body { url: String, reason: String },
}

impl ApiError {
    /// The human-readable message supplied by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { server_message, .. } => server_message.as_deref(),
            _ => None,
        }
    }

    /// The message to show the user: the server's own message when it sent
    /// one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

fn display_server_message(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {m}"),
        None => String::new(),
    }
}

/// Pull the `error` field out of a failed response body.
///
/// Only a JSON object with a non-empty string `error` counts; anything else
/// (HTML error pages, plain text, `{"message": ..}`) yields `None` so callers
/// fall back to their fixed message.
pub fn server_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_includes_server_message() {
        let e = ApiError::Status {
            url: "http://localhost:8080/api/receipts/extract".into(),
            status: 400,
            server_message: Some("Please upload a valid image file".into()),
        };
        let msg = e.to_string();
        assert!(msg.contains("400"), "got: {msg}");
        assert!(msg.contains("valid image"), "got: {msg}");
    }

    #[test]
    fn status_display_without_server_message() {
        let e = ApiError::Status {
            url: "http://x/api".into(),
            status: 502,
            server_message: None,
        };
        assert!(e.to_string().ends_with("'http://x/api'"));
    }

    #[test]
    fn user_message_prefers_server_text() {
        let e = ApiError::Status {
            url: "u".into(),
            status: 500,
            server_message: Some("We couldn't process this receipt image.".into()),
        };
        assert_eq!(
            e.user_message("Failed to extract receipt."),
            "We couldn't process this receipt image."
        );

        let transport = ApiError::Transport {
            url: "u".into(),
            reason: "connection refused".into(),
        };
        assert_eq!(
            transport.user_message("Failed to extract receipt."),
            "Failed to extract receipt."
        );
    }

    #[test]
    fn server_error_message_shapes() {
        assert_eq!(
            server_error_message(r#"{"error":"No file selected."}"#).as_deref(),
            Some("No file selected.")
        );
        assert_eq!(server_error_message(r#"{"error":""}"#), None);
        assert_eq!(server_error_message(r#"{"error":42}"#), None);
        assert_eq!(server_error_message(r#"{"message":"nope"}"#), None);
        assert_eq!(server_error_message("<html>502</html>"), None);
        assert_eq!(server_error_message(""), None);
    }

    #[test]
    fn missing_input_display_matches_form_message() {
        assert_eq!(
            MissingInput.to_string(),
            crate::form::MISSING_INPUT_MESSAGE
        );
        let boxed: Box<dyn std::error::Error> = Box::new(MissingInput);
        assert_eq!(boxed.to_string(), "Please provide a file and user ID.");
    }

    #[test]
    fn file_not_found_display() {
        let e = ReceiptError::FileNotFound {
            path: PathBuf::from("/tmp/missing.png"),
        };
        assert!(e.to_string().contains("missing.png"));
    }
}
