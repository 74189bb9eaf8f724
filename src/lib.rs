//! # receipt-extract
//!
//! Upload receipt images to a receipt-extraction service and inspect what
//! it found.
//!
//! The crate models the service's upload screen as plain data: a
//! [`ReceiptForm`] holds the chosen file, the user id, the last response and
//! the last error, and exposes the two things a user can do with it:
//! submit the receipt for extraction, and fetch the raw recognised text of
//! the receipt that came back.
//!
//! ## Flow
//!
//! ```text
//! file + user id
//!  │
//!  ├─ submit          POST /api/receipts/extract (multipart: file, userId)
//!  │                   ├─ ok    → response stored, error cleared
//!  │                   └─ error → server `error` text or fallback, response cleared
//!  │
//!  └─ fetch_raw_text  GET /api/receipts/{userId}/{receiptId}
//!                      (offered only when the response has a receiptId)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use receipt_extract::{ClientConfig, HttpReceiptApi, ReceiptForm, ReceiptUpload};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = HttpReceiptApi::new(&ClientConfig::default())?;
//!
//!     let mut form = ReceiptForm::new();
//!     form.set_file(ReceiptUpload::from_path("receipt.png").await?);
//!     form.set_user_id("42");
//!     form.submit(&api).await;
//!
//!     if let Some(response) = form.response() {
//!         println!("{response}");
//!     }
//!     if form.can_fetch_raw_text() {
//!         form.fetch_raw_text(&api).await;
//!         if let Some(notice) = form.dismiss_notice() {
//!             println!("{notice}");
//!         }
//!     }
//!     if let Some(error) = form.error() {
//!         eprintln!("{error}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `receipt` binary (clap + anyhow + tracing-subscriber + dialoguer) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod response;
pub mod upload;
pub mod view;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use api::{HttpReceiptApi, ReceiptApi};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL};
pub use error::{ApiError, MissingInput, ReceiptError};
pub use form::{
    FetchOutcome, FetchRequest, Notice, ReceiptForm, SubmitOutcome, SubmitRequest,
    Ticket,
};
pub use response::{ExtractionResponse, ReceiptDate, ReceiptItem, ReceiptSummary};
pub use upload::ReceiptUpload;
pub use view::FormView;
