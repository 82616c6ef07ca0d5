//! Human-readable durations.
//!
//! Durations are accepted and printed in the compact `1h2m3.5s` / `250ms` notation.
//! [`UNBOUNDED`] stands for "no limit" and prints as `unbounded`; a zero duration is a
//! real (immediately expiring) limit and is never used to mean "no limit".
use std::fmt::Write as _;
use std::time::Duration;

use thiserror::Error;

/// The effectively-infinite duration.
pub const UNBOUNDED: Duration = Duration::MAX;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;
const NANOS_PER_MIN: u128 = 60 * NANOS_PER_SEC;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("invalid duration {0:?}")]
    Invalid(String),
    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),
    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },
    #[error("duration {0:?} is out of range")]
    Overflow(String),
}

/// Format a duration, e.g. `0s`, `850µs`, `12.5ms`, `1.204s`, `2m5s`, `1h0m0s`.
pub fn fmt_duration(d: Duration) -> String {
    if d == UNBOUNDED {
        return "unbounded".to_string();
    }
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_MICRO {
        return format!("{nanos}ns");
    }
    if nanos < NANOS_PER_MILLI {
        return format!("{}µs", decimal(nanos, NANOS_PER_MICRO));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", decimal(nanos, NANOS_PER_MILLI));
    }

    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if hours > 0 || mins > 0 {
        let _ = write!(out, "{mins}m");
    }
    let _ = write!(out, "{}s", decimal(nanos % NANOS_PER_MIN, NANOS_PER_SEC));
    out
}

/// `value / unit` as a decimal string without trailing zeros.
fn decimal(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let frac = value % unit;
    if frac == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let s = format!("{whole}.{frac:0width$}");
    s.trim_end_matches('0').to_string()
}

/// Parse a duration such as `300ms`, `10s`, `1m30s` or `1.5h`.
///
/// A bare `0` and the empty string are zero. Units: `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let s = input.trim();
    if s.is_empty() || s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total: u128 = 0;
    let mut rest = s;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return Err(DurationParseError::Invalid(input.to_string()));
        }
        let (num, tail) = rest.split_at(num_len);

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        if unit.is_empty() {
            return Err(DurationParseError::MissingUnit(input.to_string()));
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationParseError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let value = scaled(num, scale).ok_or_else(|| DurationParseError::Invalid(input.to_string()))?;
        total = total
            .checked_add(value)
            .ok_or_else(|| DurationParseError::Overflow(input.to_string()))?;
        rest = tail;
    }

    u64::try_from(total)
        .map(Duration::from_nanos)
        .map_err(|_| DurationParseError::Overflow(input.to_string()))
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(NANOS_PER_MIN),
        "h" => Some(60 * NANOS_PER_MIN),
        _ => None,
    }
}

/// `num` (decimal, optional fraction) multiplied by `scale` nanoseconds.
fn scaled(num: &str, scale: u128) -> Option<u128> {
    let (whole, frac) = num.split_once('.').unwrap_or((num, ""));
    if (whole.is_empty() && frac.is_empty()) || frac.contains('.') {
        return None;
    }
    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut value = whole.checked_mul(scale)?;

    // Digits past nanosecond precision carry no information.
    let frac = &frac[..frac.len().min(18)];
    if !frac.is_empty() {
        let digits: u128 = frac.parse().ok()?;
        value = value.checked_add(digits * scale / 10u128.pow(frac.len() as u32))?;
    }
    Some(value)
}

/// Serde helpers for durations in human notation.
pub mod serde_human {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::fmt_duration(*d))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s == "unbounded" {
            return Ok(super::UNBOUNDED);
        }
        super::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

/// Like [`serde_human`], but truncated to whole milliseconds when written.
pub mod serde_human_ms {
    use std::time::Duration;

    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let truncated = if *d == super::UNBOUNDED {
            *d
        } else {
            Duration::from_millis(d.as_millis() as u64)
        };
        super::serde_human::serialize(&truncated, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::serde_human::deserialize(deserializer)
    }
}
