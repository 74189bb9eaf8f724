//! Rendering of the form state.
//!
//! [`FormView`] is what the screen shows for a given [`ReceiptForm`]: a
//! snapshot computed on demand, never stored. Front ends decide how to draw
//! it (the CLI adds colour); the plain [`std::fmt::Display`] output is the
//! reference layout.

use crate::form::{Notice, ReceiptForm};
use crate::response::ReceiptSummary;
use std::fmt;

pub const FORM_TITLE: &str = "Extract Receipt Data";
pub const RESPONSE_TITLE: &str = "Extracted Receipt";
pub const FETCH_ACTION_LABEL: &str = "Test Get Receipt";
pub const USER_ID_PLACEHOLDER: &str = "Enter User ID";

/// The secondary action, present only when the stored response carries a
/// receipt id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAction {
    pub label: &'static str,
    pub receipt_id: String,
}

/// Everything one render of the form needs.
#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    pub title: &'static str,
    pub file_label: String,
    pub user_id_label: String,
    pub fetch_action: Option<FetchAction>,
    pub error: Option<String>,
    /// Pretty-printed response body.
    pub response_json: Option<String>,
    pub summary: Option<ReceiptSummary>,
    pub notice: Option<Notice>,
}

impl FormView {
    pub fn of(form: &ReceiptForm) -> Self {
        let file_label = match form.file() {
            Some(upload) => format!(
                "{} ({}, {} bytes)",
                upload.file_name(),
                upload.mime_type(),
                upload.len()
            ),
            None => "No file chosen".to_string(),
        };
        let user_id_label = if form.user_id().is_empty() {
            format!("<{USER_ID_PLACEHOLDER}>")
        } else {
            form.user_id().to_string()
        };

        Self {
            title: FORM_TITLE,
            file_label,
            user_id_label,
            fetch_action: form.fetchable_receipt_id().map(|receipt_id| FetchAction {
                label: FETCH_ACTION_LABEL,
                receipt_id,
            }),
            error: form.error().map(str::to_string),
            response_json: form.response().map(|r| r.pretty()),
            summary: form.response().and_then(|r| r.summary()),
            notice: form.notice().cloned(),
        }
    }
}

impl fmt::Display for FormView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title)?;
        writeln!(f, "File:    {}", self.file_label)?;
        writeln!(f, "User ID: {}", self.user_id_label)?;
        if let Some(action) = &self.fetch_action {
            writeln!(f, "[{}]  receipt {}", action.label, action.receipt_id)?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "Error: {error}")?;
        }
        if let Some(json) = &self.response_json {
            writeln!(f)?;
            writeln!(f, "-- {RESPONSE_TITLE} --")?;
            writeln!(f, "{json}")?;
        }
        if let Some(notice) = &self.notice {
            writeln!(f)?;
            writeln!(f, "{notice}")?;
        }
        Ok(())
    }
}

/// Human-readable lines for a receipt summary, as shown under the JSON.
pub fn summary_lines(summary: &ReceiptSummary) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(store) = &summary.store_name {
        lines.push(format!("Store: {store}"));
    }
    if let Some(date) = &summary.date {
        lines.push(format!("Date: {date}"));
    }
    if let Some(total) = summary.total {
        lines.push(format!("Total: ${total:.2}"));
    }
    if !summary.items.is_empty() {
        lines.push("Items:".to_string());
        for item in &summary.items {
            lines.push(format!(
                "- {} x{}: ${:.2}",
                item.name, item.quantity, item.price
            ));
        }
        lines.push(format!(
            "Expected subtotal: ${:.2}",
            summary.expected_subtotal()
        ));
    }
    lines
}
