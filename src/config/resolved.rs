//! Validated keepalive configuration

use super::raw::RawConfig;
use super::validate::{option_limits, parse_boolean, parse_bounded_integer};
use super::{KEEP_ALIVE, KEEP_ALIVE_COUNT, KEEP_ALIVE_IDLE, KEEP_ALIVE_INTERVAL};
use crate::{Error, Result};
use serde::Serialize;
use std::time::Duration;

/// Keepalive settings that survived validation
///
/// A `None` field means "leave the platform default alone". Every `Some` value
/// is within the bounds returned by [`option_limits`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive_idle: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive_interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive_count: Option<u32>,
}

impl ResolvedConfig {
    /// Resolve a raw option bag
    ///
    /// Unknown keys are ignored. Known keys with no value, and values that fail
    /// validation, are logged and left unset.
    pub fn from_raw(raw: &RawConfig) -> Self {
        let mut config = Self::default();

        for (key, value) in raw.iter() {
            if !is_known_option(key) {
                continue;
            }
            let Some(value) = value else {
                tracing::warn!(option = key, "option has no value and will be ignored");
                crate::metrics::counters::option_rejected(
                    key,
                    crate::metrics::labels::REASON_MISSING_VALUE,
                );
                continue;
            };

            match key {
                KEEP_ALIVE => config.keep_alive = Some(parse_boolean(key, value)),
                KEEP_ALIVE_IDLE => config.keep_alive_idle = bounded_u32(key, value),
                KEEP_ALIVE_INTERVAL => config.keep_alive_interval = bounded_u32(key, value),
                KEEP_ALIVE_COUNT => config.keep_alive_count = bounded_u32(key, value),
                _ => {}
            }
        }

        tracing::debug!(config = ?config, "resolved socket configuration");
        config
    }

    /// Create a builder for typed configuration
    pub fn builder() -> ResolvedConfigBuilder {
        ResolvedConfigBuilder::default()
    }

    /// Whether keepalive is explicitly enabled or disabled
    pub fn keep_alive(&self) -> Option<bool> {
        self.keep_alive
    }

    /// Idle time before the first keepalive probe
    pub fn keep_alive_idle(&self) -> Option<Duration> {
        self.keep_alive_idle.map(|secs| Duration::from_secs(secs.into()))
    }

    /// Time between keepalive probes
    pub fn keep_alive_interval(&self) -> Option<Duration> {
        self.keep_alive_interval
            .map(|secs| Duration::from_secs(secs.into()))
    }

    /// Unanswered probes before the connection is dropped
    pub fn keep_alive_count(&self) -> Option<u32> {
        self.keep_alive_count
    }

    /// True when no option overrides the platform defaults
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn is_known_option(key: &str) -> bool {
    matches!(
        key,
        KEEP_ALIVE | KEEP_ALIVE_IDLE | KEEP_ALIVE_INTERVAL | KEEP_ALIVE_COUNT
    )
}

fn bounded_u32(name: &str, value: &str) -> Option<u32> {
    parse_bounded_integer(name, value).and_then(|v| u32::try_from(v).ok())
}

/// Builder for creating `ResolvedConfig` from typed values
///
/// Values go through the same bounds as the string path; `build` rejects
/// anything out of range instead of dropping it.
///
/// # Examples
///
/// ```
/// use pg_socket_factory::config::ResolvedConfig;
///
/// let config = ResolvedConfig::builder()
///     .keep_alive(true)
///     .keep_alive_idle(60)
///     .keep_alive_count(5)
///     .build()
///     .unwrap();
/// assert_eq!(config.keep_alive_count(), Some(5));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfigBuilder {
    keep_alive: Option<bool>,
    keep_alive_idle: Option<u32>,
    keep_alive_interval: Option<u32>,
    keep_alive_count: Option<u32>,
}

impl ResolvedConfigBuilder {
    /// Enable or disable keepalive
    pub fn keep_alive(mut self, enabled: bool) -> Self {
        self.keep_alive = Some(enabled);
        self
    }

    /// Idle seconds before the first probe (1-32767)
    pub fn keep_alive_idle(mut self, secs: u32) -> Self {
        self.keep_alive_idle = Some(secs);
        self
    }

    /// Seconds between probes (1-32767)
    pub fn keep_alive_interval(mut self, secs: u32) -> Self {
        self.keep_alive_interval = Some(secs);
        self
    }

    /// Probe count (1-255)
    pub fn keep_alive_count(mut self, count: u32) -> Self {
        self.keep_alive_count = Some(count);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ResolvedConfig> {
        Ok(ResolvedConfig {
            keep_alive: self.keep_alive,
            keep_alive_idle: check_bounds(KEEP_ALIVE_IDLE, self.keep_alive_idle)?,
            keep_alive_interval: check_bounds(KEEP_ALIVE_INTERVAL, self.keep_alive_interval)?,
            keep_alive_count: check_bounds(KEEP_ALIVE_COUNT, self.keep_alive_count)?,
        })
    }
}

fn check_bounds(name: &str, value: Option<u32>) -> Result<Option<u32>> {
    let (Some(value), Some((min, max))) = (value, option_limits(name)) else {
        return Ok(value);
    };
    let in_range = i64::from(value) >= i64::from(min) && i64::from(value) <= i64::from(max);
    if !in_range {
        return Err(Error::Config(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        )));
    }
    Ok(Some(value))
}
