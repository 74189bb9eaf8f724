//! Behavioural tests for `ReceiptForm` against an in-memory API.

use receipt_extract::form::{EXTRACT_FAILED_MESSAGE, FETCH_TEXT_FAILED_MESSAGE, MISSING_INPUT_MESSAGE};
use receipt_extract::{
    ApiError, ExtractionResponse, FetchOutcome, FormView, ReceiptApi, ReceiptForm, ReceiptUpload,
    SubmitOutcome,
};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Fake API ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Extract { file_name: String, user_id: String },
    Text { user_id: String, receipt_id: String },
}

/// Replays scripted results and records every call.
#[derive(Default)]
struct ScriptedApi {
    extract_results: Mutex<VecDeque<Result<ExtractionResponse, ApiError>>>,
    text_results: Mutex<VecDeque<Result<String, ApiError>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedApi {
    fn with_extract(self, result: Result<serde_json::Value, ApiError>) -> Self {
        self.extract_results
            .lock()
            .unwrap()
            .push_back(result.map(ExtractionResponse::new));
        self
    }

    fn with_text(self, result: Result<&str, ApiError>) -> Self {
        self.text_results
            .lock()
            .unwrap()
            .push_back(result.map(str::to_string));
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl ReceiptApi for ScriptedApi {
    async fn extract(
        &self,
        upload: &ReceiptUpload,
        user_id: &str,
    ) -> Result<ExtractionResponse, ApiError> {
        self.calls.lock().unwrap().push(Call::Extract {
            file_name: upload.file_name().to_string(),
            user_id: user_id.to_string(),
        });
        self.extract_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected extract call")
    }

    async fn receipt_text(&self, user_id: &str, receipt_id: &str) -> Result<String, ApiError> {
        self.calls.lock().unwrap().push(Call::Text {
            user_id: user_id.to_string(),
            receipt_id: receipt_id.to_string(),
        });
        self.text_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected text call")
    }
}

fn img() -> ReceiptUpload {
    ReceiptUpload::new("img.png", b"\x89PNG\r\n\x1a\n".to_vec())
}

fn server_error(status: u16, message: Option<&str>) -> ApiError {
    ApiError::Status {
        url: "http://localhost:8080/api/receipts/extract".into(),
        status,
        server_message: message.map(str::to_string),
    }
}

// ── Submit ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_form_never_calls_the_api() {
    let api = ScriptedApi::default();
    let mut form = ReceiptForm::new();

    assert_eq!(form.submit(&api).await, SubmitOutcome::Invalid);
    assert_eq!(form.error(), Some(MISSING_INPUT_MESSAGE));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn file_without_user_id_is_rejected_locally() {
    let api = ScriptedApi::default();
    let mut form = ReceiptForm::new();
    form.set_file(img());
    form.set_user_id("");

    assert_eq!(form.submit(&api).await, SubmitOutcome::Invalid);
    assert_eq!(form.error(), Some("Please provide a file and user ID."));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn valid_submit_calls_extract_exactly_once() {
    let body = json!({"receiptId": "r1", "total": 12.5});
    let api = ScriptedApi::default().with_extract(Ok(body.clone()));
    let mut form = ReceiptForm::new();
    form.set_file(img());
    form.set_user_id("u1");

    assert_eq!(form.submit(&api).await, SubmitOutcome::Extracted);
    assert_eq!(
        api.calls(),
        vec![Call::Extract {
            file_name: "img.png".into(),
            user_id: "u1".into()
        }]
    );
    assert_eq!(form.response().unwrap().as_value(), &body);
    assert_eq!(form.error(), None);
}

#[tokio::test]
async fn success_after_failure_clears_error() {
    let api = ScriptedApi::default()
        .with_extract(Err(server_error(400, Some("Please upload a valid image file"))))
        .with_extract(Ok(json!({"receiptId": "r2"})));
    let mut form = ReceiptForm::new();
    form.set_file(img());
    form.set_user_id("u1");

    assert_eq!(form.submit(&api).await, SubmitOutcome::Failed);
    assert_eq!(form.error(), Some("Please upload a valid image file"));
    assert!(form.response().is_none());

    assert_eq!(form.submit(&api).await, SubmitOutcome::Extracted);
    assert_eq!(form.error(), None);
    assert!(form.response().is_some());
}

#[tokio::test]
async fn failure_after_success_clears_response() {
    let api = ScriptedApi::default()
        .with_extract(Ok(json!({"receiptId": "r1"})))
        .with_extract(Err(ApiError::Transport {
            url: "http://localhost:8080/api/receipts/extract".into(),
            reason: "connection refused".into(),
        }));
    let mut form = ReceiptForm::new();
    form.set_file(img());
    form.set_user_id("u1");

    form.submit(&api).await;
    assert!(form.can_fetch_raw_text());

    assert_eq!(form.submit(&api).await, SubmitOutcome::Failed);
    assert!(form.response().is_none());
    assert!(!form.can_fetch_raw_text());
    assert_eq!(form.error(), Some(EXTRACT_FAILED_MESSAGE));
}

// ── Fetch raw text ───────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_is_unavailable_without_receipt_id() {
    let api = ScriptedApi::default().with_extract(Ok(json!({"total": 4.0})));
    let mut form = ReceiptForm::new();
    form.set_file(img());
    form.set_user_id("u1");
    form.submit(&api).await;

    assert!(FormView::of(&form).fetch_action.is_none());
    assert_eq!(form.fetch_raw_text(&api).await, FetchOutcome::Unavailable);
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn fetch_presents_raw_text() {
    let api = ScriptedApi::default()
        .with_extract(Ok(json!({"receiptId": "r1", "total": 12.5})))
        .with_text(Ok("CORNER MARKET\nMILK 3.25"));
    let mut form = ReceiptForm::new();
    form.set_file(img());
    form.set_user_id("u1");
    form.submit(&api).await;

    let view = FormView::of(&form);
    assert_eq!(view.fetch_action.as_ref().unwrap().receipt_id, "r1");
    assert!(view.response_json.unwrap().contains("\"receiptId\": \"r1\""));

    assert_eq!(form.fetch_raw_text(&api).await, FetchOutcome::Fetched);
    assert_eq!(
        api.calls()[1],
        Call::Text {
            user_id: "u1".into(),
            receipt_id: "r1".into()
        }
    );
    assert_eq!(
        form.notice().map(|n| n.to_string()).as_deref(),
        Some("Raw Receipt Text:\nCORNER MARKET\nMILK 3.25")
    );
}

#[tokio::test]
async fn failed_fetch_sets_fixed_error_only() {
    let body = json!({"receiptId": "r1"});
    let api = ScriptedApi::default()
        .with_extract(Ok(body.clone()))
        .with_text(Err(server_error(404, Some("Receipt not found"))));
    let mut form = ReceiptForm::new();
    form.set_file(img());
    form.set_user_id("u1");
    form.submit(&api).await;

    assert_eq!(form.fetch_raw_text(&api).await, FetchOutcome::Failed);
    assert_eq!(form.error(), Some(FETCH_TEXT_FAILED_MESSAGE));
    assert_eq!(form.response().unwrap().as_value(), &body);
    assert!(form.can_fetch_raw_text());
}

#[tokio::test]
async fn actions_can_repeat() {
    let api = ScriptedApi::default()
        .with_extract(Ok(json!({"receiptId": "r1"})))
        .with_text(Ok("first"))
        .with_text(Ok("second"));
    let mut form = ReceiptForm::new();
    form.set_file(img());
    form.set_user_id("u1");
    form.submit(&api).await;

    form.fetch_raw_text(&api).await;
    assert_eq!(form.dismiss_notice().unwrap().body, "first");
    form.fetch_raw_text(&api).await;
    assert_eq!(form.dismiss_notice().unwrap().body, "second");
}

// ── Overlapping submissions ──────────────────────────────────────────────────

/// Answers after a per-user delay, echoing the user id as the receipt id.
struct SlowApi;

impl ReceiptApi for SlowApi {
    async fn extract(
        &self,
        _upload: &ReceiptUpload,
        user_id: &str,
    ) -> Result<ExtractionResponse, ApiError> {
        let delay = if user_id == "slow" { 120 } else { 10 };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(ExtractionResponse::new(json!({ "receiptId": user_id })))
    }

    async fn receipt_text(&self, _user_id: &str, _receipt_id: &str) -> Result<String, ApiError> {
        Ok(String::new())
    }
}

/// Issue a submission per user id back to back, then apply the outcomes in
/// the order they arrive.
async fn race(user_ids: [&str; 2]) -> (ReceiptForm, Vec<SubmitOutcome>) {
    let api = Arc::new(SlowApi);
    let mut form = ReceiptForm::new();
    form.set_file(img());

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    for user_id in user_ids {
        form.set_user_id(user_id);
        let request = form.begin_submit().expect("inputs present");
        let api = Arc::clone(&api);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = api.extract(&request.upload, &request.user_id).await;
            let _ = tx.send((request.ticket, result));
        });
    }
    drop(tx);

    let mut outcomes = Vec::new();
    while let Some((ticket, result)) = rx.recv().await {
        outcomes.push(form.finish_submit(ticket, result));
    }
    (form, outcomes)
}

#[tokio::test]
async fn late_answer_to_older_submit_is_ignored() {
    let (form, outcomes) = race(["slow", "fast"]).await;

    assert_eq!(outcomes, vec![SubmitOutcome::Extracted, SubmitOutcome::Stale]);
    assert_eq!(form.fetchable_receipt_id().as_deref(), Some("fast"));
}

#[tokio::test]
async fn early_answer_to_older_submit_is_ignored() {
    let (form, outcomes) = race(["fast", "slow"]).await;

    assert_eq!(outcomes, vec![SubmitOutcome::Stale, SubmitOutcome::Extracted]);
    assert_eq!(form.fetchable_receipt_id().as_deref(), Some("slow"));
}
