//! The receipt upload form.
//!
//! [`ReceiptForm`] is the whole UI state of the upload screen: the selected
//! file, the user id text, the last extraction response, the last error
//! message, and a pending notice. Only the form's own operations write to
//! it.
//!
//! ## Actions
//!
//! ```text
//! submit          validate ──▶ POST extract ──▶ response XOR error
//! fetch_raw_text  receiptId? ──▶ GET text ──▶ notice | error
//! ```
//!
//! Both actions come in two halves so a driver can keep several requests in
//! flight without sharing the form: `begin_*` validates and hands out an
//! owned request stamped with a [`Ticket`], and `finish_*` applies the
//! outcome. Tickets are issued per action in increasing order; an outcome
//! whose ticket has been overtaken by a newer request of the same action is
//! dropped, so the latest request issued is the one whose answer sticks.
//! Nothing is cancelled: a stale answer is simply ignored when it arrives.

use crate::api::ReceiptApi;
use crate::error::{ApiError, MissingInput};
use crate::response::ExtractionResponse;
use crate::upload::ReceiptUpload;
use tracing::{debug, info, warn};

/// Shown when `submit` is attempted without a file or a user id.
pub const MISSING_INPUT_MESSAGE: &str = "Please provide a file and user ID.";

/// Shown when extraction fails and the server gave no `error` text.
pub const EXTRACT_FAILED_MESSAGE: &str = "Failed to extract receipt.";

/// Shown when the raw text fetch fails, whatever the reason.
pub const FETCH_TEXT_FAILED_MESSAGE: &str = "Failed to fetch receipt text.";

/// Title of the notice that presents raw receipt text.
pub const RAW_TEXT_NOTICE_TITLE: &str = "Raw Receipt Text";

/// Sequence number of one request, per action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// An extraction request handed out by [`ReceiptForm::begin_submit`].
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub ticket: Ticket,
    pub upload: ReceiptUpload,
    pub user_id: String,
}

/// A raw text request handed out by [`ReceiptForm::begin_fetch_raw_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: Ticket,
    pub user_id: String,
    pub receipt_id: String,
}

/// A message the user has to acknowledge before carrying on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn raw_text(text: impl Into<String>) -> Self {
        Self {
            title: RAW_TEXT_NOTICE_TITLE.to_string(),
            body: text.into(),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:\n{}", self.title, self.body)
    }
}

/// What happened to one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Missing file or user id; no request was made.
    Invalid,
    /// The response was stored and the error cleared.
    Extracted,
    /// The error was stored and the response cleared.
    Failed,
    /// A newer submission was issued before this one resolved.
    Stale,
}

/// What happened to one raw text fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// No stored response carries a receipt id.
    Unavailable,
    /// The text is waiting in [`ReceiptForm::notice`].
    Fetched,
    /// The fixed fetch error was stored.
    Failed,
    /// A newer fetch was issued before this one resolved.
    Stale,
}

/// UI state of the receipt upload form.
#[derive(Debug, Clone, Default)]
pub struct ReceiptForm {
    file: Option<ReceiptUpload>,
    user_id: String,
    response: Option<ExtractionResponse>,
    error: Option<String>,
    notice: Option<Notice>,
    last_submit: u64,
    last_fetch: u64,
}

impl ReceiptForm {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Inputs ────────────────────────────────────────────────────────────

    pub fn set_file(&mut self, upload: ReceiptUpload) {
        self.file = Some(upload);
    }

    pub fn clear_file(&mut self) {
        self.file = None;
    }

    pub fn set_user_id(&mut self, user_id: impl Into<String>) {
        self.user_id = user_id.into();
    }

    pub fn file(&self) -> Option<&ReceiptUpload> {
        self.file.as_ref()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    // ── Outputs ───────────────────────────────────────────────────────────

    pub fn response(&self) -> Option<&ExtractionResponse> {
        self.response.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Acknowledge and remove the pending notice.
    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// The receipt id the secondary action would fetch, if it is available.
    pub fn fetchable_receipt_id(&self) -> Option<String> {
        self.response.as_ref()?.receipt_id()
    }

    /// Whether the "fetch raw text" action is offered.
    pub fn can_fetch_raw_text(&self) -> bool {
        self.fetchable_receipt_id().is_some()
    }

    // ── Submit ────────────────────────────────────────────────────────────

    /// Validate the inputs and issue an extraction request.
    ///
    /// On missing input the validation message becomes the current error and
    /// the stored response is left alone.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, MissingInput> {
        let upload = match (&self.file, self.user_id.is_empty()) {
            (Some(upload), false) => upload.clone(),
            _ => {
                debug!("Submit rejected: file or user id missing");
                self.error = Some(MISSING_INPUT_MESSAGE.to_string());
                return Err(MissingInput);
            }
        };

        self.last_submit += 1;
        Ok(SubmitRequest {
            ticket: Ticket(self.last_submit),
            upload,
            user_id: self.user_id.clone(),
        })
    }

    /// Apply the result of the request stamped `ticket`.
    pub fn finish_submit(
        &mut self,
        ticket: Ticket,
        result: Result<ExtractionResponse, ApiError>,
    ) -> SubmitOutcome {
        if ticket.0 < self.last_submit {
            debug!(
                "Dropping extraction result #{} (latest is #{})",
                ticket.0, self.last_submit
            );
            return SubmitOutcome::Stale;
        }

        match result {
            Ok(response) => {
                info!(
                    "Extraction #{} succeeded (receiptId: {})",
                    ticket.0,
                    response.receipt_id().as_deref().unwrap_or("none")
                );
                self.response = Some(response);
                self.error = None;
                SubmitOutcome::Extracted
            }
            Err(e) => {
                warn!("Extraction #{} failed: {}", ticket.0, e);
                self.error = Some(e.user_message(EXTRACT_FAILED_MESSAGE));
                self.response = None;
                SubmitOutcome::Failed
            }
        }
    }

    /// Validate, upload, and record the outcome in one go.
    pub async fn submit<A: ReceiptApi>(&mut self, api: &A) -> SubmitOutcome {
        let Ok(request) = self.begin_submit() else {
            return SubmitOutcome::Invalid;
        };
        let result = api.extract(&request.upload, &request.user_id).await;
        self.finish_submit(request.ticket, result)
    }

    // ── Fetch raw text ────────────────────────────────────────────────────

    /// Issue a raw text request for the stored receipt id, using the user id
    /// currently typed into the form. `None` when no receipt id is stored.
    pub fn begin_fetch_raw_text(&mut self) -> Option<FetchRequest> {
        let receipt_id = self.fetchable_receipt_id()?;
        self.last_fetch += 1;
        Some(FetchRequest {
            ticket: Ticket(self.last_fetch),
            user_id: self.user_id.clone(),
            receipt_id,
        })
    }

    /// Apply the result of the fetch stamped `ticket`.
    ///
    /// Success raises a notice; failure sets the fixed fetch error. Neither
    /// touches the stored response, and success leaves an existing error in
    /// place.
    pub fn finish_fetch_raw_text(
        &mut self,
        ticket: Ticket,
        result: Result<String, ApiError>,
    ) -> FetchOutcome {
        if ticket.0 < self.last_fetch {
            debug!(
                "Dropping raw text result #{} (latest is #{})",
                ticket.0, self.last_fetch
            );
            return FetchOutcome::Stale;
        }

        match result {
            Ok(text) => {
                self.notice = Some(Notice::raw_text(text));
                FetchOutcome::Fetched
            }
            Err(e) => {
                warn!("Raw text fetch #{} failed: {}", ticket.0, e);
                self.error = Some(FETCH_TEXT_FAILED_MESSAGE.to_string());
                FetchOutcome::Failed
            }
        }
    }

    /// Fetch the raw text of the stored receipt and record the outcome.
    pub async fn fetch_raw_text<A: ReceiptApi>(&mut self, api: &A) -> FetchOutcome {
        let Some(request) = self.begin_fetch_raw_text() else {
            return FetchOutcome::Unavailable;
        };
        let result = api
            .receipt_text(&request.user_id, &request.receipt_id)
            .await;
        self.finish_fetch_raw_text(request.ticket, result)
    }
}
