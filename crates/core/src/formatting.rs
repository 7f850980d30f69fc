//! Date and currency parsing/formatting for the console's display locale.
//!
//! The console renders a single locale (`vi-VN`): day-first dates in the
//! UTC+07:00 zone and Vietnamese dong amounts. Anything that cannot be parsed
//! renders as [`UNKNOWN_DISPLAY`] instead of failing.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Locale constants
// ---------------------------------------------------------------------------

/// Placeholder for absent or unparseable dates and names.
pub const UNKNOWN_DISPLAY: &str = "N/A";

/// Offset of the display time zone (Asia/Ho_Chi_Minh, no DST).
pub const DISPLAY_UTC_OFFSET_SECS: i32 = 7 * 3600;

/// Currency symbol appended to amounts.
pub const CURRENCY_SYMBOL: &str = "₫";

const THOUSANDS_SEPARATOR: char = '.';

/// Non-breaking space between amount and symbol.
const CURRENCY_SPACER: char = '\u{a0}';

const DATE_FORMAT: &str = "%d/%m/%Y";
const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

pub fn display_offset() -> FixedOffset {
    FixedOffset::east_opt(DISPLAY_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Today's calendar date in the display zone.
pub fn today() -> NaiveDate {
    Utc::now().with_timezone(&display_offset()).date_naive()
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a date from any of the representations the backend emits.
///
/// Strategies, in order:
/// 1. ISO-8601 (has a `T`, a trailing `Z`, or starts with `YYYY-MM-DD`).
/// 2. `DD/MM/YYYY HH:mm[:ss]`.
/// 3. `DD/MM/YYYY`.
/// 4. RFC 2822 or `YYYY/MM/DD[ HH:MM:SS]`.
///
/// Values without an offset are taken as display-zone local time. Returns
/// `None` when nothing yields a valid instant.
pub fn parse_date(text: &str) -> Option<Timestamp> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if looks_like_iso(text) {
        if let Some(ts) = parse_iso(text) {
            return Some(ts);
        }
    }

    if let Some((date, time)) = text.split_once(' ') {
        if let Some(ts) = parse_day_first_date_time(date, time) {
            return Some(ts);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%d/%m/%Y") {
        return local_to_utc(date.and_time(NaiveTime::MIN));
    }

    parse_fallback(text)
}

fn looks_like_iso(text: &str) -> bool {
    let bytes = text.as_bytes();
    let date_prefix = bytes.len() >= 10
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[7] == b'-';
    date_prefix || text.contains('T') || text.ends_with('Z')
}

fn parse_iso(text: &str) -> Option<Timestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return local_to_utc(naive);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| local_to_utc(date.and_time(NaiveTime::MIN)))
}

fn parse_day_first_date_time(date: &str, time: &str) -> Option<Timestamp> {
    let date = NaiveDate::parse_from_str(date, "%d/%m/%Y").ok()?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M"))
        .ok()?;
    local_to_utc(date.and_time(time))
}

fn parse_fallback(text: &str) -> Option<Timestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y/%m/%d %H:%M:%S") {
        return local_to_utc(naive);
    }
    NaiveDate::parse_from_str(text, "%Y/%m/%d")
        .ok()
        .and_then(|date| local_to_utc(date.and_time(NaiveTime::MIN)))
}

fn local_to_utc(naive: NaiveDateTime) -> Option<Timestamp> {
    display_offset()
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

// ---------------------------------------------------------------------------
// Date formatting
// ---------------------------------------------------------------------------

/// `DD/MM/YYYY` in the display zone.
pub fn format_timestamp_date(ts: &Timestamp) -> String {
    ts.with_timezone(&display_offset()).format(DATE_FORMAT).to_string()
}

/// `DD/MM/YYYY HH:mm` in the display zone.
pub fn format_timestamp_date_time(ts: &Timestamp) -> String {
    ts.with_timezone(&display_offset())
        .format(DATE_TIME_FORMAT)
        .to_string()
}

/// Format a backend date string as `DD/MM/YYYY`, or [`UNKNOWN_DISPLAY`].
pub fn format_date(text: Option<&str>) -> String {
    text.and_then(parse_date)
        .map(|ts| format_timestamp_date(&ts))
        .unwrap_or_else(|| UNKNOWN_DISPLAY.to_string())
}

/// Format a backend date string as `DD/MM/YYYY HH:mm`, or [`UNKNOWN_DISPLAY`].
pub fn format_date_time(text: Option<&str>) -> String {
    text.and_then(parse_date)
        .map(|ts| format_timestamp_date_time(&ts))
        .unwrap_or_else(|| UNKNOWN_DISPLAY.to_string())
}

/// Optional timestamp as `DD/MM/YYYY HH:mm`, or [`UNKNOWN_DISPLAY`].
pub fn format_optional_date_time(ts: Option<&Timestamp>) -> String {
    ts.map(format_timestamp_date_time)
        .unwrap_or_else(|| UNKNOWN_DISPLAY.to_string())
}

/// `YYYY-MM-DD`, used in export filenames.
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ---------------------------------------------------------------------------
// Currency formatting
// ---------------------------------------------------------------------------

/// Format an amount in dong, e.g. `1.500.000 ₫`.
///
/// Amounts are rounded to whole dong. Non-finite input renders as zero.
pub fn format_currency(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let rounded = amount.round() as i64;
    let sign = if rounded < 0 { "-" } else { "" };
    format!(
        "{sign}{}{CURRENCY_SPACER}{CURRENCY_SYMBOL}",
        group_thousands(rounded.unsigned_abs())
    )
}

/// Format a JSON amount. Numeric strings are accepted; anything else renders
/// as the zero amount.
pub fn format_currency_value(value: &serde_json::Value) -> String {
    format_currency(amount_from_value(value).unwrap_or(0.0))
}

/// Numeric amount from a JSON number or numeric string.
pub fn amount_from_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(THOUSANDS_SEPARATOR);
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
