// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Duration literal parsing and age comparisons shared by the predicate evaluator and the
//! rule engine's retry ladder.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Parse a duration literal of the form `"2d"`, `"3h"`, `"30m"`, `"45s"`, or a bare integer
/// (interpreted as seconds). Returns `None` if the string has no recognizable numeric prefix.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let (digits, unit) = match input.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => (&input[..input.len() - 1], Some(c)),
        _ => (input, None),
    };
    let n: u64 = digits.parse().ok()?;
    let secs = match unit {
        Some('d') => n.checked_mul(86_400)?,
        Some('h') => n.checked_mul(3_600)?,
        Some('m') => n.checked_mul(60)?,
        Some('s') | None => n,
        Some(_) => return None,
    };
    Some(Duration::from_secs(secs))
}

/// Parse an RFC 3339 timestamp, returning `None` on malformed input rather than erroring —
/// callers (the predicate evaluator) treat all evaluation failures as `false`.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// True if `ts` is strictly older than `dur` relative to `now`.
pub fn is_older_than(ts: &str, dur: Duration, now: DateTime<Utc>) -> bool {
    match parse_timestamp(ts) {
        Some(when) => match chrono::Duration::from_std(dur) {
            Ok(d) => now.signed_duration_since(when) > d,
            Err(_) => false,
        },
        None => false,
    }
}

#[cfg(test)]
#[path = "timeutil_tests.rs"]
mod tests;
