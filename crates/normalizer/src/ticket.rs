//! Ticket identity across the representations the backend emits.
//!
//! The same lottery number shows up as `3`, `"3"`, `"0003"`, `"000003"` or
//! `"0000003"` depending on which endpoint produced it. Every helper here is
//! total: unexpected shapes collapse to "no digits", which never matches and
//! is never awarded.

use std::borrow::Cow;

use chrono::{DateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SHORT_PAD: usize = 6;
pub const LONG_PAD: usize = 7;

static ISO_TIMESTAMP_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\d{4}-\d{2}-\d{2}t\d{2}:\d{2}:").expect("invalid regex"));

const AWARDED_WORDS: [&str; 4] = ["true", "1", "y", "yes"];
const AWARDED_OBJECT_KEYS: [&str; 4] = ["awarded", "awardedAt", "winnerId", "isAwarded"];

/// Anything a ticket number can arrive as.
pub trait TicketSource {
    fn ticket_text(&self) -> Cow<'_, str>;
}

impl TicketSource for str {
    fn ticket_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl TicketSource for String {
    fn ticket_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl TicketSource for Value {
    fn ticket_text(&self) -> Cow<'_, str> {
        match self {
            Value::String(text) => Cow::Borrowed(text.as_str()),
            Value::Number(number) => Cow::Owned(number_text(number)),
            _ => Cow::Borrowed(""),
        }
    }
}

impl<T: TicketSource> TicketSource for Option<T> {
    fn ticket_text(&self) -> Cow<'_, str> {
        match self {
            Some(inner) => inner.ticket_text(),
            None => Cow::Borrowed(""),
        }
    }
}

impl<T: TicketSource + ?Sized> TicketSource for &T {
    fn ticket_text(&self) -> Cow<'_, str> {
        (**self).ticket_text()
    }
}

macro_rules! integer_ticket_source {
    ($($ty:ty),*) => {
        $(
            impl TicketSource for $ty {
                fn ticket_text(&self) -> Cow<'_, str> {
                    Cow::Owned(self.to_string())
                }
            }
        )*
    };
}

integer_ticket_source!(u32, u64, i32, i64, usize);

fn number_text(number: &serde_json::Number) -> String {
    if let Some(value) = number.as_u64() {
        return value.to_string();
    }
    if let Some(value) = number.as_i64() {
        return value.to_string();
    }
    match number.as_f64() {
        Some(value) if value.fract() == 0.0 && value.abs() < 1e15 => (value as i64).to_string(),
        Some(value) => value.to_string(),
        None => String::new(),
    }
}

pub fn digits_only<T: TicketSource + ?Sized>(value: &T) -> String {
    value
        .ticket_text()
        .chars()
        .filter(char::is_ascii_digit)
        .collect()
}

pub fn canonical_form<T: TicketSource + ?Sized>(value: &T) -> String {
    canonical_digits(&digits_only(value))
}

pub fn padded_form<T: TicketSource + ?Sized>(value: &T, width: usize) -> String {
    pad_digits(&digits_only(value), width)
}

/// Lookup keys under which a ticket may have been recorded, deduplicated in
/// the order raw digits, canonical, 6-padded, 7-padded.
pub fn equivalent_keys<T: TicketSource + ?Sized>(value: &T) -> Vec<String> {
    keys_from_digits(&digits_only(value))
}

pub fn tickets_equal<A, B>(a: &A, b: &B) -> bool
where
    A: TicketSource + ?Sized,
    B: TicketSource + ?Sized,
{
    let left = equivalent_keys(a);
    if left.is_empty() {
        return false;
    }
    let right = equivalent_keys(b);
    left.iter().any(|key| right.contains(key))
}

fn canonical_digits(digits: &str) -> String {
    if digits.is_empty() {
        return String::new();
    }
    match digits.parse::<u64>() {
        Ok(number) => number.to_string(),
        Err(_) => {
            let trimmed = digits.trim_start_matches('0');
            if trimmed.is_empty() {
                "0".to_string()
            } else {
                trimmed.to_string()
            }
        }
    }
}

fn pad_digits(digits: &str, width: usize) -> String {
    format!("{digits:0>width$}")
}

fn keys_from_digits(digits: &str) -> Vec<String> {
    if digits.is_empty() {
        return Vec::new();
    }
    let mut keys: Vec<String> = Vec::with_capacity(4);
    for key in [
        digits.to_string(),
        canonical_digits(digits),
        pad_digits(digits, SHORT_PAD),
        pad_digits(digits, LONG_PAD),
    ] {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// The faces of one ticket, captured when a record is normalized.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketFaces {
    pub canonical: String,
    pub pad6: String,
    pub pad7: String,
    pub raw: String,
}

impl TicketFaces {
    pub fn of<T: TicketSource + ?Sized>(value: &T) -> Self {
        let digits = digits_only(value);
        if digits.is_empty() {
            return Self {
                raw: value.ticket_text().into_owned(),
                ..Self::default()
            };
        }
        Self {
            canonical: canonical_digits(&digits),
            pad6: pad_digits(&digits, SHORT_PAD),
            pad7: pad_digits(&digits, LONG_PAD),
            raw: value.ticket_text().into_owned(),
        }
    }

    /// Every non-empty key worth probing for this ticket.
    pub fn lookup_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        let faces = [
            self.canonical.clone(),
            self.pad6.clone(),
            self.pad7.clone(),
            self.raw.clone(),
        ];
        for key in faces.into_iter().chain(equivalent_keys(&self.raw)) {
            if !key.is_empty() && !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

/// A value that may say "this ticket has been awarded".
pub trait AwardSignal {
    fn is_awarded(&self) -> bool;
}

impl AwardSignal for bool {
    fn is_awarded(&self) -> bool {
        *self
    }
}

impl AwardSignal for i64 {
    fn is_awarded(&self) -> bool {
        *self == 1
    }
}

impl AwardSignal for f64 {
    fn is_awarded(&self) -> bool {
        *self == 1.0
    }
}

impl AwardSignal for str {
    fn is_awarded(&self) -> bool {
        let text = self.trim().to_lowercase();
        AWARDED_WORDS.contains(&text.as_str())
            || ISO_TIMESTAMP_PREFIX.is_match(&text)
            || text.starts_with("purchase-")
    }
}

impl AwardSignal for String {
    fn is_awarded(&self) -> bool {
        self.as_str().is_awarded()
    }
}

impl<Tz: TimeZone> AwardSignal for DateTime<Tz> {
    fn is_awarded(&self) -> bool {
        true
    }
}

impl AwardSignal for Value {
    fn is_awarded(&self) -> bool {
        match self {
            Value::Bool(flag) => *flag,
            Value::Number(number) => number.as_f64() == Some(1.0),
            Value::String(text) => text.is_awarded(),
            Value::Object(map) => AWARDED_OBJECT_KEYS
                .iter()
                .any(|key| map.get(*key).is_some_and(is_truthy)),
            Value::Null | Value::Array(_) => false,
        }
    }
}

impl<T: AwardSignal> AwardSignal for Option<T> {
    fn is_awarded(&self) -> bool {
        self.as_ref().is_some_and(|inner| inner.is_awarded())
    }
}

impl<T: AwardSignal + ?Sized> AwardSignal for &T {
    fn is_awarded(&self) -> bool {
        (**self).is_awarded()
    }
}

pub fn is_awarded_flag<T: AwardSignal + ?Sized>(value: &T) -> bool {
    value.is_awarded()
}

/// Loose truthiness of a JSON field, as the backend's producers intend it.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn digits_only_strips_everything_else() {
        assert_eq!(digits_only("Nº 00-12 3"), "00123");
        assert_eq!(digits_only(""), "");
        assert_eq!(digits_only(&Value::Null), "");
        assert_eq!(digits_only(&json!({"ticket": 5})), "");
        assert_eq!(digits_only(&json!(42)), "42");
        assert_eq!(digits_only(&json!(7.0)), "7");
        assert_eq!(digits_only(&None::<String>), "");
    }

    #[test]
    fn canonical_form_strips_leading_zeros() {
        assert_eq!(canonical_form("0000007"), "7");
        assert_eq!(canonical_form("000"), "0");
        assert_eq!(canonical_form("abc"), "");
        assert_eq!(canonical_form(&3u64), "3");
    }

    #[test]
    fn canonical_form_survives_integer_overflow() {
        let long = "000123456789012345678901234567890";
        assert_eq!(canonical_form(long), "123456789012345678901234567890");
    }

    #[test]
    fn canonical_form_is_idempotent() {
        for sample in ["0", "7", "0007", "123456", "0000000", "00012300", "99999999999999999999999"] {
            let once = canonical_form(sample);
            assert_eq!(canonical_form(&once), once, "sample {sample}");
        }
    }

    #[test]
    fn padded_form_left_pads_and_never_truncates() {
        assert_eq!(padded_form("42", 6), "000042");
        assert_eq!(padded_form("42", 7), "0000042");
        assert_eq!(padded_form("12345678", 6), "12345678");
    }

    #[test]
    fn equivalent_keys_cover_all_paddings() {
        let keys = equivalent_keys("42");
        assert!(keys.contains(&"42".to_string()));
        assert!(keys.contains(&"000042".to_string()));
        assert!(keys.contains(&"0000042".to_string()));
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn equivalent_keys_empty_without_digits() {
        assert!(equivalent_keys("").is_empty());
        assert!(equivalent_keys(&Value::Bool(true)).is_empty());
    }

    #[test]
    fn tickets_equal_across_paddings() {
        assert!(tickets_equal("7", "0000007"));
        assert!(tickets_equal("000123", "123"));
        assert!(tickets_equal(&json!(3), "0003"));
        assert!(!tickets_equal("7", "70"));
        assert!(!tickets_equal("", ""));
        assert!(!tickets_equal(&Value::Null, "0"));
    }

    #[test]
    fn awarded_flag_accepts_known_encodings() {
        assert!(is_awarded_flag(&true));
        assert!(is_awarded_flag(&1i64));
        assert!(is_awarded_flag(&Utc::now()));
        assert!(is_awarded_flag("2025-08-28T14:30:00Z"));
        assert!(is_awarded_flag(" YES "));
        assert!(is_awarded_flag("purchase-8f2c"));
        assert!(is_awarded_flag(&json!({"winnerId": "u1"})));
        assert!(is_awarded_flag(&json!(1)));
        assert!(is_awarded_flag(&json!("1")));
    }

    #[test]
    fn awarded_flag_rejects_everything_else() {
        assert!(!is_awarded_flag("pending"));
        assert!(!is_awarded_flag(&None::<Value>));
        assert!(!is_awarded_flag(&Value::Null));
        assert!(!is_awarded_flag(&json!(2)));
        assert!(!is_awarded_flag(&json!(false)));
        assert!(!is_awarded_flag(&json!({"winnerId": ""})));
        assert!(!is_awarded_flag(&json!([true])));
        assert!(!is_awarded_flag("2025-08-28"));
    }

    #[test]
    fn faces_lookup_keys_skip_empty_faces() {
        let faces = TicketFaces::of("0003");
        assert_eq!(faces.canonical, "3");
        assert_eq!(faces.pad6, "000003");
        assert_eq!(faces.pad7, "0000003");
        assert!(faces.lookup_keys().contains(&"0003".to_string()));

        let empty = TicketFaces::of(&Value::Null);
        assert!(empty.lookup_keys().is_empty());
    }
}
