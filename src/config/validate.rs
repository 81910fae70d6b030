//! Option validation
//!
//! Each parser turns one raw string into a typed value or reports why it could
//! not. Nothing here returns an error: a bad value is logged and the option is
//! treated as unset, so one malformed entry never aborts the whole configuration.

use super::{KEEP_ALIVE_COUNT, KEEP_ALIVE_IDLE, KEEP_ALIVE_INTERVAL};
use crate::metrics::labels;

/// Inclusive bounds for integer options
const OPTION_LIMITS: &[(&str, i32, i32)] = &[
    (KEEP_ALIVE_IDLE, 1, 32767),
    (KEEP_ALIVE_INTERVAL, 1, 32767),
    (KEEP_ALIVE_COUNT, 1, 255),
];

/// Look up the inclusive `(min, max)` bounds registered for an option
pub fn option_limits(name: &str) -> Option<(i32, i32)> {
    OPTION_LIMITS
        .iter()
        .find(|(option, _, _)| *option == name)
        .map(|&(_, min, max)| (min, max))
}

/// Parse a boolean option
///
/// Accepts `true` / `false` in any case, surrounded by any whitespace. Any other
/// literal is logged and resolves to `false`.
pub fn parse_boolean(name: &str, value: &str) -> bool {
    let normalized = value.trim().to_lowercase();
    match normalized.as_str() {
        "true" => true,
        "false" => false,
        _ => {
            tracing::warn!(
                option = name,
                value,
                "invalid boolean value, using default (false)"
            );
            crate::metrics::counters::option_rejected(name, labels::REASON_INVALID_BOOLEAN);
            false
        }
    }
}

/// Parse a bounded integer option
///
/// Returns `None` (and logs) when the value is not a base-10 `i32` or falls
/// outside the bounds registered for `name`. Out-of-range values are dropped,
/// not clamped.
pub fn parse_bounded_integer(name: &str, value: &str) -> Option<i32> {
    let parsed = match value.trim().parse::<i32>() {
        Ok(parsed) => parsed,
        Err(_) => {
            tracing::warn!(option = name, value, "invalid integer value, ignoring");
            crate::metrics::counters::option_rejected(name, labels::REASON_NOT_A_NUMBER);
            return None;
        }
    };

    if let Some((min, max)) = option_limits(name) {
        if parsed < min || parsed > max {
            tracing::warn!(
                option = name,
                value,
                min,
                max,
                "value must be between {} and {}, ignoring",
                min,
                max
            );
            crate::metrics::counters::option_rejected(name, labels::REASON_OUT_OF_RANGE);
            return None;
        }
    }

    Some(parsed)
}
