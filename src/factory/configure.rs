//! Applying resolved options to a socket

use crate::config::{ResolvedConfig, KEEP_ALIVE_COUNT, KEEP_ALIVE_IDLE, KEEP_ALIVE_INTERVAL};
use socket2::{Socket, TcpKeepalive};
use std::io;
use std::time::Duration;

/// Apply keepalive settings to a freshly created socket
///
/// Does nothing when `keepAlive` is unset. When keepalive is enabled, each tuning
/// option that is set is applied on its own. If the platform cannot tune one of
/// them, or rejects the value (Linux caps `TCP_KEEPCNT` at 127), a warning is
/// logged and that option keeps its default. Errors from `SO_KEEPALIVE` itself
/// and any other kernel error are returned.
pub fn configure_socket(socket: &Socket, config: &ResolvedConfig) -> io::Result<()> {
    let Some(keep_alive) = config.keep_alive() else {
        return Ok(());
    };

    socket.set_keepalive(keep_alive)?;
    if !keep_alive {
        return Ok(());
    }

    if let Some(idle) = config.keep_alive_idle() {
        tolerate_refused(KEEP_ALIVE_IDLE, set_idle(socket, idle))?;
    }
    if let Some(interval) = config.keep_alive_interval() {
        tolerate_refused(KEEP_ALIVE_INTERVAL, set_interval(socket, interval))?;
    }
    if let Some(count) = config.keep_alive_count() {
        tolerate_refused(KEEP_ALIVE_COUNT, set_count(socket, count))?;
    }

    tracing::debug!(config = ?config, "applied keepalive options");
    Ok(())
}

fn tolerate_refused(option: &'static str, result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(err) if is_refused(&err) => {
            tracing::warn!(
                option,
                error = %err,
                "keepalive tuning refused by this system, keeping platform default"
            );
            crate::metrics::counters::tuning_unsupported(option);
            Ok(())
        }
        other => other,
    }
}

fn is_refused(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::Unsupported
        || err.raw_os_error().is_some_and(is_refused_os_error)
}

// EINVAL here means the kernel accepts the option but not this value
#[cfg(unix)]
fn is_refused_os_error(code: i32) -> bool {
    code == libc::ENOPROTOOPT || code == libc::EOPNOTSUPP || code == libc::EINVAL
}

#[cfg(not(unix))]
fn is_refused_os_error(_code: i32) -> bool {
    false
}

#[allow(dead_code)] // only targets without a tuning option build the fallback
fn not_supported(option: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("{} is not available on this platform", option),
    )
}

#[cfg(not(any(target_os = "haiku", target_os = "openbsd", target_os = "vita")))]
fn set_idle(socket: &Socket, idle: Duration) -> io::Result<()> {
    socket.set_tcp_keepalive(&TcpKeepalive::new().with_time(idle))
}

#[cfg(any(target_os = "haiku", target_os = "openbsd", target_os = "vita"))]
fn set_idle(_socket: &Socket, _idle: Duration) -> io::Result<()> {
    Err(not_supported(KEEP_ALIVE_IDLE))
}

#[cfg(any(
    target_os = "android",
    target_os = "freebsd",
    target_os = "ios",
    target_os = "linux",
    target_os = "macos",
    target_os = "netbsd"
))]
fn set_interval(socket: &Socket, interval: Duration) -> io::Result<()> {
    socket.set_tcp_keepalive(&TcpKeepalive::new().with_interval(interval))
}

#[cfg(not(any(
    target_os = "android",
    target_os = "freebsd",
    target_os = "ios",
    target_os = "linux",
    target_os = "macos",
    target_os = "netbsd"
)))]
fn set_interval(_socket: &Socket, _interval: Duration) -> io::Result<()> {
    Err(not_supported(KEEP_ALIVE_INTERVAL))
}

#[cfg(any(
    target_os = "android",
    target_os = "freebsd",
    target_os = "ios",
    target_os = "linux",
    target_os = "macos",
    target_os = "netbsd"
))]
fn set_count(socket: &Socket, count: u32) -> io::Result<()> {
    socket.set_tcp_keepalive(&TcpKeepalive::new().with_retries(count))
}

#[cfg(not(any(
    target_os = "android",
    target_os = "freebsd",
    target_os = "ios",
    target_os = "linux",
    target_os = "macos",
    target_os = "netbsd"
)))]
fn set_count(_socket: &Socket, _count: u32) -> io::Result<()> {
    Err(not_supported(KEEP_ALIVE_COUNT))
}
