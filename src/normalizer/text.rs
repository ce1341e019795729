use std::fmt::{Display, Write};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime};
use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

static IMG_SRC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\ssrc\s*=\s*["']([^"']+)["']"#).expect("valid img regex")
});

pub const ELLIPSIS: char = '…';

/// Drop markup, decode entities and collapse whitespace.
pub fn strip_html(html: &str) -> String {
    let without_tags = TAG_RE.replace_all(html, "");
    let decoded = decode_html_entities(&without_tags);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most `limit` characters, marking the cut with an ellipsis.
/// A limit of zero disables truncation.
pub fn truncate(text: &str, limit: usize) -> String {
    if limit == 0 || text.chars().count() <= limit {
        return text.to_string();
    }

    let mut cut: String = text.chars().take(limit).collect();
    cut.truncate(cut.trim_end().len());
    cut.push(ELLIPSIS);
    cut
}

/// First `<img src="…">` in a chunk of HTML.
pub fn sniff_image(html: &str) -> Option<String> {
    IMG_SRC_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| decode_html_entities(m.as_str().trim()).into_owned())
        .filter(|src| !src.is_empty())
}

pub fn is_valid_date_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Parse the date formats feeds actually use and render them in local time.
/// Unparseable input renders as an empty string.
pub fn format_date(raw: &str, format: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    if let Some(dt) = parse_datetime(raw) {
        return render(dt.with_timezone(&Local).format(format), raw);
    }

    // Date-only values count as local midnight so time fields still render.
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date.and_time(NaiveTime::MIN);
        return match midnight.and_local_timezone(Local).earliest() {
            Some(local) => render(local.format(format), raw),
            None => render(midnight.format(format), raw),
        };
    }

    tracing::debug!("Unparseable publish date: {}", raw);
    String::new()
}

/// chrono's formatter reports fields the value cannot supply as `fmt::Error`;
/// those dates render empty instead of panicking in `to_string`.
fn render(formatted: impl Display, raw: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", formatted).is_err() {
        tracing::debug!("Date format does not fit {}", raw);
        return String::new();
    }
    out
}

fn parse_datetime(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }

    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];
    NAIVE_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(raw, fmt)
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>World</p>"), "World");
        assert_eq!(
            strip_html("<div>\n  Tom &amp; <b>Jerry</b>\n</div>"),
            "Tom & Jerry"
        );
        assert_eq!(strip_html("plain"), "plain");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly ten", 11), "exactly ten");
        assert_eq!(truncate("hello world again", 6), "hello…");
        assert_eq!(truncate("héllo wörld", 4), "héll…");
        assert_eq!(truncate("anything", 0), "anything");
    }

    #[test]
    fn test_sniff_image() {
        assert_eq!(
            sniff_image(r#"<p>x</p><IMG class="a" SRC='http://i/1.png?a=1&amp;b=2'>"#),
            Some("http://i/1.png?a=1&b=2".into())
        );
        assert_eq!(
            sniff_image(r#"<img data-src="lazy.png" src="real.png">"#),
            Some("real.png".into())
        );
        assert_eq!(sniff_image("<p>no images</p>"), None);
    }

    #[test]
    fn test_format_date_rfc2822() {
        let out = format_date("Mon, 01 Jan 2024 12:00:00 GMT", "%Y");
        assert_eq!(out, "2024");
    }

    #[test]
    fn test_format_date_rfc3339_and_naive() {
        assert_eq!(format_date("2023-06-15T12:00:00Z", "%Y-%m"), "2023-06");
        assert_eq!(format_date("2023-06-15T12:00:00", "%Y-%m"), "2023-06");
        assert_eq!(format_date("2023-06-15", "%Y-%m-%d"), "2023-06-15");
    }

    #[test]
    fn test_date_only_value_with_time_fields() {
        assert_eq!(
            format_date("2023-06-15", "%Y-%m-%d %H:%M"),
            "2023-06-15 00:00"
        );
    }

    #[test]
    fn test_unrenderable_field_is_empty() {
        let date = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
        assert_eq!(render(date.format("%H:%M"), "2023-06-15"), "");
    }

    #[test]
    fn test_format_date_garbage_is_empty() {
        assert_eq!(format_date("yesterday-ish", "%Y"), "");
        assert_eq!(format_date("", "%Y"), "");
    }

    #[test]
    fn test_date_format_validation() {
        assert!(is_valid_date_format("%-m/%-d/%Y"));
        assert!(!is_valid_date_format("%Y %"));
    }
}
