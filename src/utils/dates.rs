//! Permissive date parsing for free-form WHOIS date fields
//!
//! Registries disagree on date layout, so parsing walks a list of known
//! formats and gives up quietly when none match.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Formats carrying an explicit UTC offset
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%a %b %d %H:%M:%S %z %Y",
];

/// Date-time formats without an offset, read as UTC
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d-%b-%Y %H:%M:%S",
    "%a %b %d %H:%M:%S %Y",
];

/// Date-only formats, read as midnight UTC
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%Y.%m.%d",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Parse an expiration date as found in a WHOIS record.
///
/// Returns `None` when the text matches none of the known layouts.
pub fn parse_expiry_date(raw: &str) -> Option<DateTime<Utc>> {
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(cleaned) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(cleaned, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(dt.and_utc());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(cleaned, fmt) {
            return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    None
}

/// Strip zone names and trailing parenthetical hints such as `(YYYY-MM-DD)`
fn clean(raw: &str) -> &str {
    let mut s = raw.trim();

    if s.ends_with(')') {
        if let Some(pos) = s.rfind(" (") {
            s = s[..pos].trim_end();
        }
    }

    for zone in [" UTC", " GMT", " Z"] {
        if let Some(stripped) = s.strip_suffix(zone) {
            s = stripped.trim_end();
            break;
        }
    }

    s
}
