//! Bus summary carried in the page URL.
//!
//! The page is opened with `?busInfo=<json>`. Any JSON value is accepted and
//! kept as-is; the status panel only reads `nbr` and `places_vacantes` from
//! it. Falsy values (`null`, `false`, `0`, `""`) count as no summary at all.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query parameter holding the JSON-encoded bus summary.
pub const BUS_INFO_PARAM: &str = "busInfo";

/// Shown while no bus summary is available.
pub const LOADING_PLACEHOLDER: &str = "Loading...";

/// Printed for a field the summary does not have.
pub const UNDEFINED: &str = "undefined";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusInfo(Value);

#[derive(Debug, thiserror::Error)]
pub enum BusInfoError {
    #[error("unparsable page url: {0}")]
    UnparsableUrl(String),

    #[error("busInfo is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl BusInfo {
    /// `Ok(None)` for falsy JSON.
    pub fn from_json(json: &str) -> Result<Option<Self>, BusInfoError> {
        let value: Value = serde_json::from_str(json)?;
        Ok(is_truthy(&value).then_some(Self(value)))
    }

    /// Read the bus summary from a full page URL.
    ///
    /// `Ok(None)` when the URL carries no (or an empty) `busInfo` parameter,
    /// or when it decodes to a falsy value.
    pub fn from_page_url(page_url: &str) -> Result<Option<Self>, BusInfoError> {
        let url = Url::parse(page_url).map_err(|e| BusInfoError::UnparsableUrl(e.to_string()))?;

        match url.query_pairs().find(|(key, _)| key == BUS_INFO_PARAM) {
            Some((_, value)) if !value.is_empty() => Self::from_json(&value),
            _ => Ok(None),
        }
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// `None` when the summary is not an object or lacks the field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.as_object()?.get(name)
    }

    pub fn number(&self) -> Option<&Value> {
        self.field("nbr")
    }

    pub fn vacant_seats(&self) -> Option<&Value> {
        self.field("places_vacantes")
    }

    /// A field as the status panel prints it, `undefined` when missing.
    pub fn display_field(&self, name: &str) -> String {
        self.field(name)
            .map(display_value)
            .unwrap_or_else(|| UNDEFINED.to_owned())
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text for a JSON value the way a browser stringifies it into a template.
///
/// Integral numbers drop the fraction, arrays join their items with commas
/// (null items print empty) and objects print as `[object Object]`.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => display_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_owned(),
    }
}

fn display_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }

    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f + 0.0),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Status panel text for the current bus summary.
pub fn status_text(info: Option<&BusInfo>) -> String {
    match info {
        Some(info) => format!(
            "Bus nunmero : {}, Places vacantes: {}",
            info.display_field("nbr"),
            info.display_field("places_vacantes")
        ),
        None => LOADING_PLACEHOLDER.to_owned(),
    }
}
