//! The receipt API as seen by the form.
//!
//! [`ReceiptApi`] is the seam between [`crate::form::ReceiptForm`] and the
//! network. The form never builds requests itself; it hands an owned
//! request to an implementation and applies whatever comes back. That keeps
//! the form testable with an in-memory fake and lets the CLI swap in
//! [`HttpReceiptApi`].
//!
//! ## Endpoints
//!
//! ```text
//! POST {base}/api/receipts/extract               multipart: file, userId
//! GET  {base}/api/receipts/{userId}/{receiptId}  → raw text
//! POST {base}/api/split/calculate-split          (HttpReceiptApi only)
//! POST {base}/api/split/assign-users             (HttpReceiptApi only)
//! ```

pub mod http;

pub use http::HttpReceiptApi;

use crate::error::ApiError;
use crate::response::ExtractionResponse;
use crate::upload::ReceiptUpload;
use std::future::Future;

/// The two calls the receipt form makes.
///
/// Each call is a single attempt: implementations must not retry, and a
/// failure is reported as-is so the form can pick the right message.
pub trait ReceiptApi: Send + Sync {
    /// Upload a receipt image for extraction on behalf of `user_id`.
    fn extract(
        &self,
        upload: &ReceiptUpload,
        user_id: &str,
    ) -> impl Future<Output = Result<ExtractionResponse, ApiError>> + Send;

    /// Fetch the stored raw text of a previously extracted receipt.
    fn receipt_text(
        &self,
        user_id: &str,
        receipt_id: &str,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;
}
