// ── WSDOT date wrapper ──
//
// The upstream services encode instants as `/Date(<millis>[+-HHMM])/`,
// sometimes JSON-escaped as `\/Date(...)\/`. Millis are UTC-relative and may
// be negative (historical schedule data predates 1970). The offset suffix
// only records the zone the server computed the value in; it never shifts
// the instant.
//
// URL parameters use a different, unrelated convention: plain `YYYY-MM-DD`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use thiserror::Error;

const PREFIX: &str = "/Date(";
const ESCAPED_PREFIX: &str = "\\/Date(";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    #[error("empty date string")]
    Empty,

    #[error("missing /Date(...)/ delimiters in {input:?}")]
    MissingDelimiters { input: String },

    #[error("invalid millisecond count in {input:?}")]
    InvalidMillis { input: String },

    #[error("timestamp {millis}ms is outside the representable range")]
    OutOfRange { millis: i64 },

    #[error("invalid timezone offset {offset:?}")]
    InvalidOffset { offset: String },
}

/// An instant decoded from the wrapper format, plus the raw offset the
/// server attached to it (if any).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WsdotDate {
    instant: DateTime<Utc>,
    offset: Option<FixedOffset>,
}

impl WsdotDate {
    pub fn new(instant: DateTime<Utc>, offset: Option<FixedOffset>) -> Self {
        Self { instant, offset }
    }

    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(|instant| Self {
            instant,
            offset: None,
        })
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    pub fn millis(&self) -> i64 {
        self.instant.timestamp_millis()
    }

    /// RFC 3339 with millisecond precision, rendered in the server's offset
    /// when one was present so display fidelity survives the conversion.
    pub fn to_rfc3339(&self) -> String {
        match self.offset {
            Some(offset) => self
                .instant
                .with_timezone(&offset)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            None => self.instant.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Re-encode in the upstream wrapper format.
    pub fn to_wrapper(&self) -> String {
        match self.offset {
            Some(offset) => format!("/Date({}{})/", self.millis(), format_offset(offset)),
            None => format!("/Date({})/", self.millis()),
        }
    }
}

impl fmt::Display for WsdotDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wrapper())
    }
}

impl FromStr for WsdotDate {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl From<WsdotDate> for DateTime<Utc> {
    fn from(date: WsdotDate) -> Self {
        date.instant
    }
}

/// Parse a wrapper-format date in either escaped or unescaped form.
pub fn parse(text: &str) -> Result<WsdotDate, DateParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DateParseError::Empty);
    }

    let inner = strip_wrapper(text).ok_or_else(|| DateParseError::MissingDelimiters {
        input: text.to_owned(),
    })?;

    // A sign at position 0 belongs to the millis, not the offset.
    let split = inner
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '+' || c == '-')
        .map(|(i, _)| i);

    let (millis_text, offset_text) = match split {
        Some(i) => (&inner[..i], Some(&inner[i..])),
        None => (inner, None),
    };

    let millis: i64 = millis_text
        .parse()
        .map_err(|_| DateParseError::InvalidMillis {
            input: text.to_owned(),
        })?;

    let instant =
        DateTime::from_timestamp_millis(millis).ok_or(DateParseError::OutOfRange { millis })?;

    let offset = offset_text.map(parse_offset).transpose()?;

    Ok(WsdotDate { instant, offset })
}

/// Shape check for strings that claim to be wrapper dates: the whole
/// (trimmed) value is `/Date(...)/` in either form.
///
/// Used by the payload walker: anything that passes this check but then
/// fails [`parse`] is a malformed date, not an ordinary string.
pub fn is_wrapper(text: &str) -> bool {
    strip_wrapper(text.trim()).is_some()
}

/// Encode an instant in the wrapper format without an offset suffix.
pub fn format_wrapper(instant: DateTime<Utc>) -> String {
    format!("/Date({})/", instant.timestamp_millis())
}

/// Format a calendar date the way URL parameters expect it.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn strip_wrapper(text: &str) -> Option<&str> {
    let rest = text
        .strip_prefix(ESCAPED_PREFIX)
        .or_else(|| text.strip_prefix(PREFIX))?;
    let rest = rest.strip_suffix("\\/").or_else(|| rest.strip_suffix('/'))?;
    rest.strip_suffix(')')
}

fn parse_offset(text: &str) -> Result<FixedOffset, DateParseError> {
    let invalid = || DateParseError::InvalidOffset {
        offset: text.to_owned(),
    };

    let (sign, digits) = match text.split_at_checked(1) {
        Some(("+", digits)) => (1, digits),
        Some(("-", digits)) => (-1, digits),
        _ => return Err(invalid()),
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

fn format_offset(offset: FixedOffset) -> String {
    let secs = offset.local_minus_utc();
    let sign = if secs < 0 { '-' } else { '+' };
    let secs = secs.abs();
    format!("{sign}{:02}{:02}", secs / 3600, (secs % 3600) / 60)
}

/// Serde adapter for `DateTime<Utc>` fields that may arrive either in the
/// wrapper format (raw payloads) or as RFC 3339 (normalized payloads).
///
/// ```ignore
/// #[serde(deserialize_with = "dottie_api::timestamp::serde_wrapper::deserialize")]
/// time_stamp: DateTime<Utc>,
/// ```
pub mod serde_wrapper {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, de};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        decode(&text).map_err(de::Error::custom)
    }

    pub(crate) fn decode(text: &str) -> Result<DateTime<Utc>, String> {
        if super::is_wrapper(text) {
            return super::parse(text)
                .map(|d| d.instant())
                .map_err(|e| e.to_string());
        }
        DateTime::parse_from_rfc3339(text)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| format!("invalid date {text:?}: {e}"))
    }

    /// Variant for nullable date fields.
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, de};

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                Some(text) => super::decode(&text).map(Some).map_err(de::Error::custom),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_unescaped_wrapper() {
        let date = parse("/Date(1640995200000)/").unwrap();
        assert_eq!(
            date.instant(),
            Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(date.offset(), None);
    }

    #[test]
    fn parses_pre_epoch_wrapper() {
        let date = parse("/Date(-2208988800000)/").unwrap();
        assert_eq!(
            date.instant(),
            Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn escaped_form_is_equivalent() {
        assert_eq!(parse("/Date(1000)/"), parse("\\/Date(1000)\\/"));
    }

    #[test]
    fn offset_does_not_shift_instant() {
        let plain = parse("/Date(1640995200000)/").unwrap();
        let zoned = parse("/Date(1640995200000-0800)/").unwrap();
        assert_eq!(plain.instant(), zoned.instant());
        assert_eq!(
            zoned.offset(),
            Some(FixedOffset::west_opt(8 * 3600).unwrap())
        );
    }

    #[test]
    fn negative_millis_with_offset() {
        let date = parse("/Date(-2208988800000+0100)/").unwrap();
        assert_eq!(date.millis(), -2_208_988_800_000);
        assert_eq!(date.offset(), Some(FixedOffset::east_opt(3600).unwrap()));
    }

    #[test]
    fn wrapper_round_trip_keeps_millis_and_offset() {
        for text in [
            "/Date(0)/",
            "/Date(1640995200000)/",
            "/Date(-2208988800000)/",
            "/Date(1700000000123-0700)/",
            "/Date(-1+0530)/",
        ] {
            let date = parse(text).unwrap();
            assert_eq!(date.to_wrapper(), text);
            assert_eq!(parse(&date.to_wrapper()).unwrap(), date);
        }
    }

    #[test]
    fn format_wrapper_round_trips_negative() {
        let instant = Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse(&format_wrapper(instant)).unwrap().instant(), instant);
    }

    #[test]
    fn rfc3339_rendering_preserves_offset() {
        let date = parse("/Date(1640995200000-0800)/").unwrap();
        assert_eq!(date.to_rfc3339(), "2021-12-31T16:00:00.000-08:00");

        let utc = parse("/Date(1640995200000)/").unwrap();
        assert_eq!(utc.to_rfc3339(), "2022-01-01T00:00:00.000Z");
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse(""), Err(DateParseError::Empty));
        assert!(matches!(
            parse("2022-01-01"),
            Err(DateParseError::MissingDelimiters { .. })
        ));
        assert!(matches!(
            parse("/Date(1000"),
            Err(DateParseError::MissingDelimiters { .. })
        ));
        assert!(matches!(
            parse("/Date(abc)/"),
            Err(DateParseError::InvalidMillis { .. })
        ));
        assert!(matches!(
            parse("/Date()/"),
            Err(DateParseError::InvalidMillis { .. })
        ));
        assert!(matches!(
            parse("/Date(99999999999999999999)/"),
            Err(DateParseError::InvalidMillis { .. })
        ));
        assert!(matches!(
            parse("/Date(1000+08)/"),
            Err(DateParseError::InvalidOffset { .. })
        ));
    }

    #[test]
    fn out_of_range_millis_fail() {
        assert_eq!(
            parse(&format!("/Date({})/", i64::MAX)),
            Err(DateParseError::OutOfRange { millis: i64::MAX })
        );
    }

    #[test]
    fn format_date_is_plain_calendar_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(format_date(date), "2024-03-09");
    }

    #[test]
    fn serde_adapter_accepts_both_forms() {
        let expected = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            serde_wrapper::decode("/Date(1640995200000)/").unwrap(),
            expected
        );
        assert_eq!(
            serde_wrapper::decode("2021-12-31T16:00:00.000-08:00").unwrap(),
            expected
        );
        assert!(serde_wrapper::decode("yesterday").is_err());
    }
}
