//! Rendering of expiry lookups
//!
//! Formats an `ExpiringResource` as `name<TAB>time`, the bare time, or
//! JSON, with the time in ISO 8601, UNIX, RFC 1123Z, or RFC 3339 form.

use crate::models::ExpiringResource;
use crate::utils::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

const ISO8601: &str = "%Y-%m-%dT%H:%M:%S%z";
const RFC1123Z: &str = "%a, %d %b %Y %H:%M:%S %z";

/// How the expiration time is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeFormat {
    #[default]
    Iso8601,
    Unix,
    Rfc1123z,
    Rfc3339,
}

impl TimeFormat {
    pub fn format(&self, time: &DateTime<Utc>) -> String {
        match self {
            TimeFormat::Iso8601 => time.format(ISO8601).to_string(),
            TimeFormat::Unix => time.timestamp().to_string(),
            TimeFormat::Rfc1123z => time.format(RFC1123Z).to_string(),
            TimeFormat::Rfc3339 => time.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Overall output layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputStyle {
    /// `name<TAB>time`
    #[default]
    Plain,
    /// Only the time
    Bare,
    /// Pretty-printed JSON object
    Json,
}

/// Rendering choices made at the command boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub style: OutputStyle,
    pub time: TimeFormat,
}

/// JSON-serializable output structure
#[derive(Serialize)]
pub struct JsonOutput<'a> {
    #[serde(rename = "domainName")]
    pub domain_name: &'a str,
    pub expiry: &'a str,
}

/// Resolve `resource` and render its expiry
pub fn render<R: ExpiringResource + ?Sized>(resource: &mut R, options: &RenderOptions) -> Result<String> {
    let expiry = resource.expiry()?;
    render_expiry(&resource.name(), &expiry, options)
}

/// Render an already-resolved expiry for `name`
pub fn render_expiry(name: &str, expiry: &DateTime<Utc>, options: &RenderOptions) -> Result<String> {
    let time = options.time.format(expiry);

    let output = match options.style {
        OutputStyle::Plain => format!("{name}\t{time}"),
        OutputStyle::Bare => time,
        OutputStyle::Json => serde_json::to_string_pretty(&JsonOutput {
            domain_name: name,
            expiry: &time,
        })?,
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn expiry() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 13, 4, 0, 0).unwrap()
    }

    #[test]
    fn test_time_formats() {
        let t = expiry();
        assert_eq!(TimeFormat::Iso8601.format(&t), "2025-08-13T04:00:00+0000");
        assert_eq!(TimeFormat::Unix.format(&t), "1755057600");
        assert_eq!(TimeFormat::Rfc1123z.format(&t), "Wed, 13 Aug 2025 04:00:00 +0000");
        assert_eq!(TimeFormat::Rfc3339.format(&t), "2025-08-13T04:00:00Z");
    }

    #[test]
    fn test_plain_output() {
        let out = render_expiry("example.com", &expiry(), &RenderOptions::default()).unwrap();
        assert_eq!(out, "example.com\t2025-08-13T04:00:00+0000");
    }

    #[test]
    fn test_bare_output() {
        let options = RenderOptions {
            style: OutputStyle::Bare,
            time: TimeFormat::Unix,
        };
        assert_eq!(render_expiry("example.com", &expiry(), &options).unwrap(), "1755057600");
    }

    #[test]
    fn test_json_output() {
        let options = RenderOptions {
            style: OutputStyle::Json,
            time: TimeFormat::Rfc3339,
        };
        let out = render_expiry("example.com", &expiry(), &options).unwrap();
        assert_eq!(
            out,
            "{\n  \"domainName\": \"example.com\",\n  \"expiry\": \"2025-08-13T04:00:00Z\"\n}"
        );
    }
}
