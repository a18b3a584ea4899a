//! Primitive scalar payloads
//!
//! FHIR primitive types collapse onto a small set of scalar kinds. Literals are
//! parsed per kind (with a few type-specific lexical rules such as `id` or
//! `positiveInt`) and rendered back to FHIR literal form with their original
//! precision.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Scalar representation shared by a family of FHIR primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalarKind {
    Boolean,
    Integer,
    Decimal,
    /// Free text and string-like types (uri, id, markdown, ...)
    String,
    /// Coded value, optionally restricted by a required code set on the field
    Code,
    Date,
    DateTime,
    Time,
}

impl ScalarKind {
    /// Scalar kind for a FHIR primitive type name, `None` for non-primitive types.
    pub fn for_type(type_name: &str) -> Option<Self> {
        let kind = match type_name {
            "boolean" => ScalarKind::Boolean,
            "integer" | "integer64" | "positiveInt" | "unsignedInt" => ScalarKind::Integer,
            "decimal" => ScalarKind::Decimal,
            "code" => ScalarKind::Code,
            "date" => ScalarKind::Date,
            "dateTime" | "instant" => ScalarKind::DateTime,
            "time" => ScalarKind::Time,
            "string" | "markdown" | "id" | "uri" | "url" | "canonical" | "oid" | "uuid"
            | "base64Binary" | "xhtml" => ScalarKind::String,
            _ => return None,
        };
        Some(kind)
    }
}

/// How much of a `date` literal was given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePrecision {
    Year,
    Month,
    Day,
}

impl DatePrecision {
    fn pattern(self) -> &'static str {
        match self {
            Self::Year => "%Y",
            Self::Month => "%Y-%m",
            Self::Day => "%Y-%m-%d",
        }
    }
}

/// How much of a `dateTime` literal was given, `2015` up to `2015-02-04T14:30:00.000`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DateTimePrecision {
    Year,
    Month,
    Day,
    Minute,
    Second,
    Millisecond,
}

impl DateTimePrecision {
    fn pattern(self) -> &'static str {
        match self {
            Self::Year => "%Y",
            Self::Month => "%Y-%m",
            Self::Day => "%Y-%m-%d",
            Self::Minute => "%Y-%m-%dT%H:%M",
            Self::Second => "%Y-%m-%dT%H:%M:%S",
            Self::Millisecond => "%Y-%m-%dT%H:%M:%S%.3f",
        }
    }

    pub fn has_time(self) -> bool {
        self > Self::Day
    }
}

impl From<DatePrecision> for DateTimePrecision {
    fn from(precision: DatePrecision) -> Self {
        match precision {
            DatePrecision::Year => Self::Year,
            DatePrecision::Month => Self::Month,
            DatePrecision::Day => Self::Day,
        }
    }
}

impl From<TimePrecision> for DateTimePrecision {
    fn from(precision: TimePrecision) -> Self {
        match precision {
            TimePrecision::Minute => Self::Minute,
            TimePrecision::Second => Self::Second,
            TimePrecision::Millisecond => Self::Millisecond,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimePrecision {
    Minute,
    Second,
    Millisecond,
}

impl TimePrecision {
    fn pattern(self) -> &'static str {
        match self {
            Self::Minute => "%H:%M",
            Self::Second => "%H:%M:%S",
            Self::Millisecond => "%H:%M:%S%.3f",
        }
    }
}

/// Parsed scalar held by a primitive element
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveData {
    Boolean(bool),
    Integer(i64),
    Decimal(Decimal),
    String(String),
    Date {
        value: NaiveDate,
        precision: DatePrecision,
    },
    DateTime {
        value: DateTime<Utc>,
        precision: DateTimePrecision,
        /// Offset in seconds east of UTC; `None` when the literal carried no zone.
        timezone_offset: Option<i32>,
    },
    Time {
        value: NaiveTime,
        precision: TimePrecision,
    },
}

fn code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s]+(\s[^\s]+)*$").expect("valid code regex"))
}

fn id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9\-\.]{1,64}$").expect("valid id regex"))
}

fn decimal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?$")
            .expect("valid decimal regex")
    })
}

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}(-\d{2}(-\d{2})?)?$").expect("valid date regex"))
}

fn datetime_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(\d{4}(?:-\d{2}(?:-\d{2})?)?)(?:T(\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?)(Z|[+-]\d{2}:\d{2})?)?$",
        )
        .expect("valid dateTime regex")
    })
}

fn time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{2}:\d{2}(:\d{2}(\.\d+)?)?$").expect("valid time regex"))
}

impl PrimitiveData {
    /// Parse a literal of the given primitive type.
    ///
    /// `type_name` only refines the lexical rules (e.g. `id`, `positiveInt`);
    /// the representation is decided by `kind`.
    pub fn parse(type_name: &str, kind: ScalarKind, literal: &str) -> Result<Self> {
        let invalid = |reason: String| Error::invalid_literal(type_name, literal, reason);

        match kind {
            ScalarKind::Boolean => match literal {
                "true" => Ok(PrimitiveData::Boolean(true)),
                "false" => Ok(PrimitiveData::Boolean(false)),
                _ => Err(invalid("expected 'true' or 'false'".into())),
            },
            ScalarKind::Integer => {
                let value: i64 = literal.parse().map_err(|e| invalid(format!("{e}")))?;
                match type_name {
                    "integer64" => {}
                    _ if i32::try_from(value).is_err() => {
                        return Err(invalid("out of 32-bit integer range".into()))
                    }
                    "positiveInt" if value < 1 => {
                        return Err(invalid("positiveInt must be at least 1".into()))
                    }
                    "unsignedInt" if value < 0 => {
                        return Err(invalid("unsignedInt must not be negative".into()))
                    }
                    _ => {}
                }
                Ok(PrimitiveData::Integer(value))
            }
            ScalarKind::Decimal => {
                if !decimal_regex().is_match(literal) {
                    return Err(invalid("not a decimal literal".into()));
                }
                let parsed = if literal.contains(['e', 'E']) {
                    Decimal::from_scientific(&literal.to_ascii_lowercase())
                } else {
                    Decimal::from_str(literal)
                };
                parsed
                    .map(PrimitiveData::Decimal)
                    .map_err(|e| invalid(format!("{e}")))
            }
            ScalarKind::String => {
                if type_name == "id" && !id_regex().is_match(literal) {
                    return Err(invalid("ids are 1-64 characters of [A-Za-z0-9-.]".into()));
                }
                Ok(PrimitiveData::String(literal.to_string()))
            }
            ScalarKind::Code => {
                if !code_regex().is_match(literal) {
                    return Err(invalid("codes may not be empty or carry stray whitespace".into()));
                }
                Ok(PrimitiveData::String(literal.to_string()))
            }
            ScalarKind::Date => {
                let (value, precision) = parse_partial_date(literal)
                    .ok_or_else(|| invalid("expected YYYY[-MM[-DD]]".into()))?;
                Ok(PrimitiveData::Date { value, precision })
            }
            ScalarKind::DateTime => parse_datetime(literal).ok_or_else(|| {
                invalid("expected YYYY[-MM[-DD[Thh:mm[:ss[.fff]][Z|+hh:mm]]]]".into())
            }),
            ScalarKind::Time => {
                if !time_regex().is_match(literal) {
                    return Err(invalid("expected hh:mm[:ss[.fff]]".into()));
                }
                let (value, precision) =
                    parse_time(literal).ok_or_else(|| invalid("time out of range".into()))?;
                Ok(PrimitiveData::Time { value, precision })
            }
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PrimitiveData::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PrimitiveData::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            PrimitiveData::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrimitiveData::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Render back to FHIR literal form, preserving temporal precision.
    pub fn to_literal(&self) -> String {
        match self {
            PrimitiveData::Boolean(b) => b.to_string(),
            PrimitiveData::Integer(i) => i.to_string(),
            PrimitiveData::Decimal(d) => d.to_string(),
            PrimitiveData::String(s) => s.clone(),
            PrimitiveData::Date { value, precision } => {
                value.format(precision.pattern()).to_string()
            }
            PrimitiveData::DateTime {
                value,
                precision,
                timezone_offset,
            } => datetime_literal(value, *precision, *timezone_offset),
            PrimitiveData::Time { value, precision } => {
                value.format(precision.pattern()).to_string()
            }
        }
    }
}

impl fmt::Display for PrimitiveData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

fn parse_partial_date(literal: &str) -> Option<(NaiveDate, DatePrecision)> {
    if !date_regex().is_match(literal) {
        return None;
    }
    match literal.len() {
        4 => NaiveDate::from_ymd_opt(literal.parse().ok()?, 1, 1)
            .map(|d| (d, DatePrecision::Year)),
        7 => NaiveDate::parse_from_str(&format!("{literal}-01"), "%Y-%m-%d")
            .ok()
            .map(|d| (d, DatePrecision::Month)),
        _ => NaiveDate::parse_from_str(literal, "%Y-%m-%d")
            .ok()
            .map(|d| (d, DatePrecision::Day)),
    }
}

fn parse_time(literal: &str) -> Option<(NaiveTime, TimePrecision)> {
    match literal.len() {
        5 => NaiveTime::parse_from_str(literal, "%H:%M")
            .ok()
            .map(|t| (t, TimePrecision::Minute)),
        8 => NaiveTime::parse_from_str(literal, "%H:%M:%S")
            .ok()
            .map(|t| (t, TimePrecision::Second)),
        _ => NaiveTime::parse_from_str(literal, "%H:%M:%S%.f")
            .ok()
            .map(|t| (t, TimePrecision::Millisecond)),
    }
}

fn parse_offset(zone: &str) -> Option<i32> {
    if zone == "Z" {
        return Some(0);
    }
    let sign = if zone.starts_with('-') { -1 } else { 1 };
    let hours: i32 = zone.get(1..3)?.parse().ok()?;
    let minutes: i32 = zone.get(4..6)?.parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}

fn parse_datetime(literal: &str) -> Option<PrimitiveData> {
    let caps = datetime_regex().captures(literal)?;
    let (date, date_precision) = parse_partial_date(caps.get(1)?.as_str())?;

    let Some(time_part) = caps.get(2) else {
        return Some(PrimitiveData::DateTime {
            value: Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?),
            precision: date_precision.into(),
            timezone_offset: None,
        });
    };

    // A time of day needs a full date in front of it.
    if date_precision != DatePrecision::Day {
        return None;
    }
    let (time, time_precision) = parse_time(time_part.as_str())?;
    let timezone_offset = match caps.get(3) {
        Some(zone) => Some(parse_offset(zone.as_str())?),
        None => None,
    };

    let local = NaiveDateTime::new(date, time);
    let utc = local - Duration::seconds(i64::from(timezone_offset.unwrap_or(0)));
    Some(PrimitiveData::DateTime {
        value: Utc.from_utc_datetime(&utc),
        precision: time_precision.into(),
        timezone_offset,
    })
}

/// Literal in the offset it was written with; zone-less values stay in UTC.
fn datetime_literal(
    value: &DateTime<Utc>,
    precision: DateTimePrecision,
    timezone_offset: Option<i32>,
) -> String {
    let pattern = precision.pattern();
    let Some(seconds) = timezone_offset.filter(|_| precision.has_time()) else {
        return value.naive_utc().format(pattern).to_string();
    };
    match FixedOffset::east_opt(seconds) {
        Some(offset) => format!(
            "{}{}",
            value.with_timezone(&offset).format(pattern),
            zone_designator(seconds)
        ),
        None => value.naive_utc().format(pattern).to_string(),
    }
}

/// `Z`, or a signed `HH:MM` offset
fn zone_designator(seconds: i32) -> String {
    if seconds == 0 {
        return String::from("Z");
    }
    let minutes = seconds.unsigned_abs() / 60;
    let sign = if seconds < 0 { '-' } else { '+' };
    format!("{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_kind_for_type() {
        assert_eq!(ScalarKind::for_type("boolean"), Some(ScalarKind::Boolean));
        assert_eq!(ScalarKind::for_type("positiveInt"), Some(ScalarKind::Integer));
        assert_eq!(ScalarKind::for_type("instant"), Some(ScalarKind::DateTime));
        assert_eq!(ScalarKind::for_type("uri"), Some(ScalarKind::String));
        assert_eq!(ScalarKind::for_type("HumanName"), None);
    }

    #[test]
    fn test_parse_integer() {
        let value = PrimitiveData::parse("integer", ScalarKind::Integer, "1").unwrap();
        assert_eq!(value.as_integer(), Some(1));

        assert!(PrimitiveData::parse("integer", ScalarKind::Integer, "abc").is_err());
        assert!(PrimitiveData::parse("integer", ScalarKind::Integer, "3000000000").is_err());
        assert!(PrimitiveData::parse("integer64", ScalarKind::Integer, "3000000000").is_ok());
        assert!(PrimitiveData::parse("positiveInt", ScalarKind::Integer, "0").is_err());
        assert!(PrimitiveData::parse("unsignedInt", ScalarKind::Integer, "0").is_ok());
    }

    #[test]
    fn test_parse_decimal() {
        let value = PrimitiveData::parse("decimal", ScalarKind::Decimal, "1.50").unwrap();
        assert_eq!(value.to_literal(), "1.50");

        let value = PrimitiveData::parse("decimal", ScalarKind::Decimal, "1e3").unwrap();
        assert_eq!(value.as_decimal(), Some(Decimal::new(1000, 0)));
        let value = PrimitiveData::parse("decimal", ScalarKind::Decimal, "1.5E-2").unwrap();
        assert_eq!(value.as_decimal(), Some(Decimal::new(15, 3)));
        assert!(PrimitiveData::parse("decimal", ScalarKind::Decimal, "-0.5").is_ok());

        for literal in ["1_000", "+1", ".5", "01", "1.", "1e", "NaN", ""] {
            assert!(
                PrimitiveData::parse("decimal", ScalarKind::Decimal, literal).is_err(),
                "{literal} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_boolean() {
        assert_eq!(
            PrimitiveData::parse("boolean", ScalarKind::Boolean, "true").unwrap(),
            PrimitiveData::Boolean(true)
        );
        assert!(PrimitiveData::parse("boolean", ScalarKind::Boolean, "TRUE").is_err());
    }

    #[test]
    fn test_parse_code_and_id() {
        assert!(PrimitiveData::parse("code", ScalarKind::Code, "male").is_ok());
        assert!(PrimitiveData::parse("code", ScalarKind::Code, " male").is_err());
        assert!(PrimitiveData::parse("code", ScalarKind::Code, "").is_err());
        assert!(PrimitiveData::parse("id", ScalarKind::String, "pat-1.a").is_ok());
        assert!(PrimitiveData::parse("id", ScalarKind::String, "pat 1").is_err());
    }

    #[test]
    fn test_parse_date_precision() {
        let year = PrimitiveData::parse("date", ScalarKind::Date, "1999").unwrap();
        let day = PrimitiveData::parse("date", ScalarKind::Date, "1999-01-01").unwrap();
        assert_eq!(year.to_literal(), "1999");
        assert_eq!(day.to_literal(), "1999-01-01");
        assert_ne!(year, day);
        assert!(PrimitiveData::parse("date", ScalarKind::Date, "1999-13-01").is_err());
        assert!(PrimitiveData::parse("date", ScalarKind::Date, "99-01-01").is_err());
    }

    #[test]
    fn test_parse_datetime_round_trip_literal() {
        for literal in [
            "2021-01-02",
            "2021-01-02T11:13:15",
            "2021-01-02T11:13:15Z",
            "2021-01-02T11:13:15+05:30",
            "2021-01-02T11:13:15.120-08:00",
        ] {
            let value = PrimitiveData::parse("dateTime", ScalarKind::DateTime, literal).unwrap();
            assert_eq!(value.to_literal(), literal);
        }
        assert!(PrimitiveData::parse("dateTime", ScalarKind::DateTime, "2021-01T10:00").is_err());
    }

    #[test]
    fn test_datetime_offsets_normalize_to_utc() {
        let a = PrimitiveData::parse("dateTime", ScalarKind::DateTime, "2021-01-02T12:00:00+01:00")
            .unwrap();
        let PrimitiveData::DateTime { value, .. } = a else {
            panic!("expected dateTime");
        };
        assert_eq!(value.format("%H:%M").to_string(), "11:00");
    }

    #[test]
    fn test_parse_time() {
        let value = PrimitiveData::parse("time", ScalarKind::Time, "10:30:00").unwrap();
        assert_eq!(value.to_literal(), "10:30:00");
        assert!(PrimitiveData::parse("time", ScalarKind::Time, "25:00:00").is_err());
    }

    #[test]
    fn test_zone_designator() {
        assert_eq!(zone_designator(0), "Z");
        assert_eq!(zone_designator(-3600), "-01:00");
        assert_eq!(zone_designator(19800), "+05:30");
        assert!(DateTimePrecision::Minute.has_time());
        assert!(!DateTimePrecision::Day.has_time());
    }
}
