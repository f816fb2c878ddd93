//! Shared formatting and raw-reply helpers used by every gateway family.

use error_stack::report;
use serde_json::Value;
use unipos_domain_models::{MappingError, MappingResult};

use crate::types::ThreeDAuthParams;

/// Fixed-point amount with exactly two decimal digits and `.` as the
/// separator: `10.1` becomes `"10.10"`, `1000.0` becomes `"1000.00"`.
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Plain decimal rendering without forced padding, for gateways that take
/// the amount as the caller wrote it: `10.1` becomes `"10.1"`.
pub fn amount_to_string(amount: f64) -> String {
    format!("{amount}")
}

/// Major-to-minor conversion for gateways that wire amounts as integer
/// minor units: `1000.01` becomes `"100001"`.
#[allow(clippy::as_conversions)]
pub fn to_minor_units(amount: f64) -> String {
    ((amount * 100.0).round() as i64).to_string()
}

/// Minor-unit decode: `"100001"` becomes `1000.01`, `"000000"` becomes
/// `0.0`. Malformed input resolves to `None`, decode anomalies are not
/// errors on the response path.
#[allow(clippy::as_conversions)]
pub fn from_minor_units(raw: &str) -> Option<f64> {
    raw.trim().parse::<i64>().ok().map(|value| value as f64 / 100.0)
}

/// Recurring end date in the `YYYYMMDD` shape the gateways expect.
pub fn format_end_date(date: time::Date) -> String {
    format!(
        "{:04}{:02}{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Whether a raw reply carries no data at all (pre-redirect failure or
/// network-level absence). Mappers answer these with the default shape.
pub fn raw_is_empty(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Recursively turn empty-string values into nulls.
///
/// The banks signal "not applicable" through empty strings inconsistently;
/// the canonical model must not conflate an empty string with real data.
pub fn empty_strings_to_null(raw: Value) -> Value {
    match raw {
        Value::String(text) if text.is_empty() => Value::Null,
        Value::Array(items) => Value::Array(items.into_iter().map(empty_strings_to_null).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, empty_strings_to_null(value)))
                .collect(),
        ),
        other => other,
    }
}

/// Decode a normalized raw reply into a typed view, falling back to the
/// all-absent default when the shape is unexpected. Banks omit fields
/// freely on decline paths; that must never panic or error here.
pub(crate) fn decode_or_default<T>(normalized: &Value, gateway: &'static str) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    match serde_json::from_value(normalized.clone()) {
        Ok(parsed) => parsed,
        Err(error) => {
            tracing::warn!(gateway, %error, "unexpected raw reply shape, using defaults");
            T::default()
        }
    }
}

/// Read a string out of a possibly-string, possibly-numeric raw field.
pub(crate) fn lenient_str(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    }
}

/// Fetch a mandatory 3-D Secure callback parameter.
///
/// Absence is a usage error: the caller tried to complete a payment
/// without the authentication proofs from the redirect step.
pub fn require_auth_param<'a>(
    params: &'a ThreeDAuthParams,
    key: &'static str,
) -> MappingResult<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| report!(MappingError::MissingRequiredField { field_name: key }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn amount_is_forced_to_two_decimals() {
        assert_eq!("10.10", format_amount(10.1));
        assert_eq!("1000.00", format_amount(1000.0));
    }

    #[test]
    fn minor_unit_round_trips() {
        assert_eq!("100001", to_minor_units(1000.01));
        assert_eq!(Some(1000.01), from_minor_units("100001"));
        assert_eq!(Some(0.0), from_minor_units("000000"));
        assert_eq!(None, from_minor_units("not-a-number"));
    }

    #[test]
    fn end_date_is_compact() {
        let date = time::Date::from_calendar_date(2024, time::Month::March, 5).unwrap();
        assert_eq!("20240305", format_end_date(date));
    }

    #[test]
    fn empty_strings_become_null_recursively() {
        let raw = json!({
            "AuthCode": "",
            "Nested": { "Inner": "", "Kept": "x" },
            "List": ["", "y"],
        });
        let normalized = empty_strings_to_null(raw);
        assert_eq!(
            json!({
                "AuthCode": null,
                "Nested": { "Inner": null, "Kept": "x" },
                "List": [null, "y"],
            }),
            normalized
        );
    }

    #[test]
    fn empty_reply_detection() {
        assert!(raw_is_empty(&Value::Null));
        assert!(raw_is_empty(&json!({})));
        assert!(!raw_is_empty(&json!({"a": 1})));
    }

    #[test]
    fn missing_auth_param_is_a_hard_error() {
        let params = ThreeDAuthParams::new();
        let err = require_auth_param(&params, "cavv").unwrap_err();
        assert_eq!(
            &unipos_domain_models::MappingError::MissingRequiredField { field_name: "cavv" },
            err.current_context()
        );
    }
}
