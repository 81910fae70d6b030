//! Keepalive configuration
//!
//! This module handles:
//! * The untyped option bag supplied by callers (`RawConfig`)
//! * Per-option validation and coercion (`validate`)
//! * The typed, bounds-checked result the factory applies (`ResolvedConfig`)

mod raw;
mod resolved;
pub mod validate;

pub use raw::RawConfig;
pub use resolved::{ResolvedConfig, ResolvedConfigBuilder};
pub use validate::{option_limits, parse_boolean, parse_bounded_integer};

/// Option name: enable TCP keepalive (`SO_KEEPALIVE`)
pub const KEEP_ALIVE: &str = "keepAlive";

/// Option name: idle seconds before the first probe (`TCP_KEEPIDLE`)
pub const KEEP_ALIVE_IDLE: &str = "keepAliveIdle";

/// Option name: seconds between probes (`TCP_KEEPINTVL`)
pub const KEEP_ALIVE_INTERVAL: &str = "keepAliveInterval";

/// Option name: unanswered probes before the connection drops (`TCP_KEEPCNT`)
pub const KEEP_ALIVE_COUNT: &str = "keepAliveCount";
