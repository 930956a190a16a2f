use std::fmt::Write as _;

use chrono::format::ParseErrorKind;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use super::{Params, Parser, SetLayout};
use crate::error::ParseError;

/// Timestamps, `time` in descriptions.
///
/// The layout is a chrono strftime pattern such as `%Y-%m-%d %H:%M`; when
/// empty, values must be RFC 3339. Layouts without an offset are read as UTC,
/// and date-only layouts as midnight UTC.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeParser {
    layout: String,
}

impl Parser for TimeParser {
    type Output = DateTime<FixedOffset>;

    fn type_name(&self) -> String {
        "time.Time".to_string()
    }

    fn parse(&self, raw: &str) -> Result<Self::Output, ParseError> {
        let invalid = |source| ParseError::Time {
            raw: raw.to_string(),
            source,
        };
        if self.layout.is_empty() {
            return DateTime::parse_from_rfc3339(raw).map_err(invalid);
        }

        match DateTime::parse_from_str(raw, &self.layout) {
            Ok(time) => Ok(time),
            Err(err) if err.kind() == ParseErrorKind::NotEnough => self
                .parse_without_offset(raw)
                .ok_or(err)
                .map_err(invalid),
            Err(err) => Err(invalid(err)),
        }
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        if !self.layout.is_empty() {
            params.insert("layout".to_string(), self.layout.clone().into());
        }
        params
    }

    fn render(&self, value: &Self::Output) -> serde_json::Value {
        if self.layout.is_empty() {
            return value.to_rfc3339().into();
        }
        let mut out = String::new();
        match write!(out, "{}", value.format(&self.layout)) {
            Ok(()) => out.into(),
            Err(_) => value.to_rfc3339().into(),
        }
    }

    fn layout_mut(&mut self) -> Option<&mut dyn SetLayout> {
        Some(self)
    }
}

impl TimeParser {
    fn parse_without_offset(&self, raw: &str) -> Option<DateTime<FixedOffset>> {
        let naive = NaiveDateTime::parse_from_str(raw, &self.layout)
            .or_else(|_| {
                NaiveDate::parse_from_str(raw, &self.layout)
                    .map(|date| date.and_time(NaiveTime::default()))
            })
            .ok()?;
        Some(naive.and_utc().fixed_offset())
    }
}

impl SetLayout for TimeParser {
    fn set_layout(&mut self, layout: String) {
        self.layout = layout;
    }
}
