//! Extraction responses.
//!
//! The server's answer is kept as opaque JSON: the form only ever looks at
//! `receiptId`, and the response panel prints the body as received. For
//! callers that want more, [`ExtractionResponse::summary`] offers a
//! best-effort typed view matching what the extraction service returns
//! today (`storeName`, `date`, `total`, `items`).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The body of a successful extraction call, stored unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResponse(Value);

impl ExtractionResponse {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Interpret a raw success body.
    ///
    /// JSON bodies are parsed; anything else is kept verbatim as a JSON
    /// string so the panel still shows exactly what the server sent.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str(body) {
            Ok(value) => Self(value),
            Err(_) => Self(Value::String(body.to_string())),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The receipt identifier, if the response carries a truthy `receiptId`.
    ///
    /// Truthy follows the usual JSON-client rules: a non-empty string, a
    /// non-zero number, `true`, or any object or array. Non-string values are
    /// rendered as their JSON text.
    pub fn receipt_id(&self) -> Option<String> {
        match self.0.get("receiptId")? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => Some(other.to_string()),
        }
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }

    /// Typed view of the response, when it is a JSON object.
    ///
    /// Fields that are missing or of an unexpected type are left at their
    /// defaults rather than failing the whole view.
    pub fn summary(&self) -> Option<ReceiptSummary> {
        let obj = self.0.as_object()?;
        let store_name = obj
            .get("storeName")
            .and_then(Value::as_str)
            .map(str::to_string);
        let date: Option<ReceiptDate> = obj
            .get("date")
            .and_then(|v| serde_json::from_value(v.clone()).ok());
        let total = obj.get("total").and_then(Value::as_f64);
        let items: Vec<ReceiptItem> = obj
            .get("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        Some(ReceiptSummary {
            receipt_id: self.receipt_id(),
            store_name,
            date,
            total,
            items,
        })
    }
}

impl fmt::Display for ExtractionResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty())
    }
}

/// Structured receipt fields as produced by the extraction service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptSummary {
    pub receipt_id: Option<String>,
    pub store_name: Option<String>,
    pub date: Option<ReceiptDate>,
    pub total: Option<f64>,
    pub items: Vec<ReceiptItem>,
}

impl ReceiptSummary {
    /// Sum of item prices.
    ///
    /// The service compares this against the printed subtotal to spot
    /// misread lines, so quantity is deliberately not multiplied in.
    pub fn expected_subtotal(&self) -> f64 {
        self.items.iter().map(|item| item.price).sum()
    }
}

/// The service serialises dates either as epoch milliseconds or as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReceiptDate {
    EpochMillis(i64),
    Text(String),
}

impl fmt::Display for ReceiptDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiptDate::EpochMillis(ms) => write!(f, "{ms} (epoch ms)"),
            ReceiptDate::Text(s) => f.write_str(s),
        }
    }
}

/// A single purchased line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Participants sharing this line, set through the split endpoints.
    #[serde(default, alias = "assignedUser", skip_serializing_if = "Vec::is_empty")]
    pub assigned_users: Vec<i64>,
}

fn default_quantity() -> u32 {
    1
}
