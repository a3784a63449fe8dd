//! Quote records and lenient payload parsing

use crate::{QuoteError, Result};
use ptbr_text::{parse_count, parse_decimal};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

/// A priced line of a quote; quantity is always 1
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub description: String,
    pub unit_price: f64,
}

impl LineItem {
    pub fn new(description: impl Into<String>, unit_price: f64) -> Self {
        Self {
            description: description.into(),
            unit_price,
        }
    }
}

/// Everything needed to render one quote
///
/// Parts and labor keep the order in which items were entered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteRecord {
    pub order_id: Option<String>,
    pub defect_description: Option<String>,
    pub cause_description: Option<String>,
    pub parts: Vec<LineItem>,
    pub labor: Vec<LineItem>,
    /// Cash / instant-transfer total as typed by the attendant
    pub cash_total: f64,
    /// Card installments, at least 1
    pub installments: u32,
}

impl Default for QuoteRecord {
    fn default() -> Self {
        Self {
            order_id: None,
            defect_description: None,
            cause_description: None,
            parts: Vec::new(),
            labor: Vec::new(),
            cash_total: 0.0,
            installments: 1,
        }
    }
}

const ORDER_ID_KEYS: &[&str] = &["os", "orderId", "order_id"];
const DEFECT_KEYS: &[&str] = &["defeito", "defectDescription"];
const CAUSE_KEYS: &[&str] = &["causa", "causeDescription"];
const PARTS_KEYS: &[&str] = &["pecas", "parts", "pecas_json"];
const LABOR_KEYS: &[&str] = &["mao_obra", "labor", "mao_obra_json"];
const CASH_TOTAL_KEYS: &[&str] = &["valor_total", "cashTotal"];
const INSTALLMENTS_KEYS: &[&str] = &["parcelas", "installments"];

impl QuoteRecord {
    /// Empty record for an order id
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id.into()),
            ..Self::default()
        }
    }

    pub fn with_defect(mut self, text: impl Into<String>) -> Self {
        self.defect_description = Some(text.into());
        self
    }

    pub fn with_cause(mut self, text: impl Into<String>) -> Self {
        self.cause_description = Some(text.into());
        self
    }

    pub fn with_part(mut self, description: impl Into<String>, unit_price: f64) -> Self {
        self.parts.push(LineItem::new(description, unit_price));
        self
    }

    pub fn with_labor(mut self, description: impl Into<String>, unit_price: f64) -> Self {
        self.labor.push(LineItem::new(description, unit_price));
        self
    }

    pub fn with_cash_total(mut self, cash_total: f64) -> Self {
        self.cash_total = cash_total;
        self
    }

    pub fn with_installments(mut self, installments: u32) -> Self {
        self.installments = installments.max(1);
        self
    }

    /// Sum of every part and labor price
    ///
    /// Independent of `cash_total`; the two are never reconciled.
    pub fn card_total(&self) -> f64 {
        self.parts
            .iter()
            .chain(&self.labor)
            .map(|item| item.unit_price)
            .sum()
    }

    /// Parse a form payload from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Build a record from a form payload
    ///
    /// Field names of the web form (`os`, `defeito`, `pecas_json`, ...) and
    /// their English equivalents are accepted. Unusable values fall back to
    /// defaults; only a payload that is not a JSON object is rejected.
    pub fn from_value(value: &Value) -> Result<Self> {
        let payload = value.as_object().ok_or_else(|| {
            QuoteError::InvalidInput("payload must be a JSON object".to_string())
        })?;

        let installments = lookup(payload, INSTALLMENTS_KEYS)
            .and_then(count_from_value)
            .filter(|&n| n > 0)
            .unwrap_or(1);

        Ok(Self {
            order_id: lookup(payload, ORDER_ID_KEYS).and_then(text_from_value),
            defect_description: lookup(payload, DEFECT_KEYS).and_then(text_from_value),
            cause_description: lookup(payload, CAUSE_KEYS).and_then(text_from_value),
            parts: lookup(payload, PARTS_KEYS)
                .map(|v| items_from_value(v, "pecas"))
                .unwrap_or_default(),
            labor: lookup(payload, LABOR_KEYS)
                .map(|v| items_from_value(v, "mao_obra"))
                .unwrap_or_default(),
            cash_total: lookup(payload, CASH_TOTAL_KEYS)
                .and_then(number_from_value)
                .unwrap_or(0.0),
            installments,
        })
    }
}

/// First non-null value among `keys`
fn lookup<'a>(payload: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| payload.get(*key))
        .find(|value| !value.is_null())
}

/// Non-blank text; numbers are accepted for ids typed as digits
fn text_from_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_decimal(s).ok(),
        _ => None,
    }
}

fn count_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => parse_count(s).ok(),
        _ => None,
    }
}

/// Line items from an object, or from a string holding a JSON object
fn items_from_value(value: &Value, field: &str) -> Vec<LineItem> {
    match value {
        Value::Object(map) => items_from_map(map, field),
        Value::String(s) if s.trim().is_empty() => Vec::new(),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => items_from_map(&map, field),
            Ok(_) | Err(_) => {
                warn!(field, "ignoring item list that is not a JSON object");
                Vec::new()
            }
        },
        _ => {
            warn!(field, "ignoring item list that is not a JSON object");
            Vec::new()
        }
    }
}

fn items_from_map(map: &Map<String, Value>, field: &str) -> Vec<LineItem> {
    map.iter()
        .filter_map(|(description, price)| {
            match number_from_value(price).filter(|p| p.is_finite() && *p >= 0.0) {
                Some(unit_price) => Some(LineItem::new(description.as_str(), unit_price)),
                None => {
                    warn!(field, %description, %price, "skipping item with invalid price");
                    None
                }
            }
        })
        .collect()
}
