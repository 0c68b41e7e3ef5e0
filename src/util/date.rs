use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Offset-carrying layouts seen in feeds that are not strict RFC 3339.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Layouts without an offset, read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a feed timestamp.
///
/// Accepts RFC 3339, RFC 2822 (with a mismatched weekday or a `UTC`/`Z`
/// zone tolerated), ISO 8601 with a compact offset, and naive date-times or
/// plain dates, which are read as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = parse_rfc2822_lenient(raw) {
        return Some(dt);
    }
    if let Some(padded) = pad_single_digit_hour(raw) {
        if let Some(dt) = parse_rfc2822_lenient(&padded) {
            return Some(dt);
        }
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_rfc2822_lenient(raw: &str) -> Option<DateTime<Utc>> {
    let rfc2822 = |s: &str| {
        DateTime::parse_from_rfc2822(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    };

    if let Some(dt) = rfc2822(raw) {
        return Some(dt);
    }

    // `UTC` and `Z` are common in the wild but are not RFC 2822 zone names
    let zoned = raw
        .strip_suffix("UTC")
        .or_else(|| raw.strip_suffix('Z'))
        .map(|prefix| format!("{} +0000", prefix.trim_end()));
    let candidate = zoned.as_deref().unwrap_or(raw);
    if zoned.is_some() {
        if let Some(dt) = rfc2822(candidate) {
            return Some(dt);
        }
    }

    // Publishers get the weekday wrong often enough that it is not worth trusting
    candidate
        .split_once(", ")
        .and_then(|(_, without_weekday)| rfc2822(without_weekday))
}

/// Rewrites a `H:MM[:SS]` time token as `HH:MM[:SS]`, which RFC 2822
/// requires. Returns `None` when there is nothing to pad.
fn pad_single_digit_hour(raw: &str) -> Option<String> {
    let mut padded = false;
    let tokens: Vec<String> = raw
        .split_whitespace()
        .map(|token| match token.split_once(':') {
            Some((hour, _)) if hour.len() == 1 && hour.bytes().all(|b| b.is_ascii_digit()) => {
                padded = true;
                format!("0{token}")
            }
            _ => token.to_string(),
        })
        .collect();
    padded.then(|| tokens.join(" "))
}

/// Normalizes a raw feed date into `YYYY-MM-DDTHH:MM:SS.mmmZ`.
///
/// Returns `None` for strings that do not parse; callers keep the raw value
/// and simply omit the normalized one.
///
/// # Examples
///
/// ```
/// use feedcanon::util::to_iso_date;
///
/// assert_eq!(
///     to_iso_date("Wed, 04 May 2016 06:53:45 GMT").as_deref(),
///     Some("2016-05-04T06:53:45.000Z")
/// );
/// assert_eq!(to_iso_date("last tuesday"), None);
/// ```
pub fn to_iso_date(raw: &str) -> Option<String> {
    parse_date(raw).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}
