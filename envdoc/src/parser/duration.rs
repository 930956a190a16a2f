use std::time::Duration;

use super::Parser;
use crate::error::ParseError;

const NANOS_PER_SEC: u128 = 1_000_000_000;

const UNITS: [(&str, u128); 6] = [
    ("h", 3_600 * NANOS_PER_SEC),
    ("m", 60 * NANOS_PER_SEC),
    ("s", NANOS_PER_SEC),
    ("ms", 1_000_000),
    ("us", 1_000),
    ("ns", 1),
];

/// Durations such as `30m`, `1h30m`, `1.5s` or `15ms`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationParser;

impl Parser for DurationParser {
    type Output = Duration;

    fn type_name(&self) -> String {
        "time.Duration".to_string()
    }

    fn parse(&self, raw: &str) -> Result<Duration, ParseError> {
        parse_duration(raw)
    }

    fn render(&self, value: &Duration) -> serde_json::Value {
        format_duration(*value).into()
    }
}

fn unit_scale(unit: &str) -> Option<u128> {
    match unit {
        "µs" | "μs" => Some(1_000),
        _ => UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale),
    }
}

fn leading_digits(s: &str) -> (&str, &str) {
    let len = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(len)
}

/// Parse a sequence of decimal numbers, each with a unit suffix
/// (`ns`, `us`, `µs`, `ms`, `s`, `m`, `h`). A bare `0` is accepted.
pub fn parse_duration(raw: &str) -> Result<Duration, ParseError> {
    let invalid = |reason| ParseError::Duration {
        raw: raw.to_string(),
        reason,
    };

    let mut rest = raw.strip_prefix('+').unwrap_or(raw);
    if rest.starts_with('-') {
        return Err(invalid("negative durations are not supported"));
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid("empty duration"));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (whole, after) = leading_digits(rest);
        let (fraction, after) = match after.strip_prefix('.') {
            Some(after_dot) => leading_digits(after_dot),
            None => ("", after),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("expected a number"));
        }

        let unit_len = after
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_len);
        if unit.is_empty() {
            return Err(invalid("missing unit"));
        }
        let scale = unit_scale(unit).ok_or_else(|| invalid("unknown unit"))?;

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("overflow"))?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(|| invalid("overflow"))?;

        // digits past nanosecond precision cannot change the result
        let mut numerator: u128 = 0;
        let mut denominator: u128 = 1;
        for digit in fraction.bytes().take(18) {
            numerator = numerator * 10 + u128::from(digit - b'0');
            denominator *= 10;
        }
        nanos += numerator * scale / denominator;

        total = total.checked_add(nanos).ok_or_else(|| invalid("overflow"))?;
        rest = after;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| invalid("overflow"))?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

/// Canonical compound form, e.g. `1h30m` or `1s500ms`; zero is `0s`.
///
/// The result always parses back to the same duration.
pub fn format_duration(duration: Duration) -> String {
    let mut remaining = duration.as_nanos();
    if remaining == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    for (unit, scale) in UNITS {
        let count = remaining / scale;
        if count > 0 {
            out.push_str(&count.to_string());
            out.push_str(unit);
            remaining %= scale;
        }
    }
    out
}
