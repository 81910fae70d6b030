//! Shared socket handle

use serde::Serialize;
use socket2::Socket;
use std::net::SocketAddr;
use std::ops::Deref;
use std::sync::Arc;

/// A socket produced by a factory
///
/// Clones share the same underlying socket. The socket closes when the last
/// clone is dropped; the registry only observes it and never keeps it open.
#[derive(Debug, Clone)]
pub struct SocketHandle {
    id: u64,
    socket: Arc<Socket>,
}

impl SocketHandle {
    pub(crate) fn new(id: u64, socket: Arc<Socket>) -> Self {
        Self { id, socket }
    }

    /// Position of this socket in the registry it was recorded in
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Borrow the underlying socket
    pub fn socket(&self) -> &Socket {
        &self.socket
    }

    /// True if both handles refer to the same socket
    pub fn same_socket(&self, other: &SocketHandle) -> bool {
        Arc::ptr_eq(&self.socket, &other.socket)
    }

    /// Read the socket's current state back from the kernel
    pub fn inspect(&self) -> SocketInfo {
        SocketInfo::read(self)
    }
}

impl Deref for SocketHandle {
    type Target = Socket;

    fn deref(&self) -> &Socket {
        &self.socket
    }
}

#[cfg(unix)]
impl std::os::fd::AsRawFd for SocketHandle {
    fn as_raw_fd(&self) -> std::os::fd::RawFd {
        self.socket.as_raw_fd()
    }
}

#[cfg(unix)]
impl std::os::fd::AsFd for SocketHandle {
    fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
        self.socket.as_fd()
    }
}

/// Snapshot of a socket's addresses and keepalive options
///
/// Fields the platform cannot report are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketInfo {
    pub id: u64,
    pub local_addr: Option<SocketAddr>,
    pub peer_addr: Option<SocketAddr>,
    pub keep_alive: Option<bool>,
    pub keep_alive_idle: Option<u64>,
    pub keep_alive_interval: Option<u64>,
    pub keep_alive_count: Option<u32>,
}

impl SocketInfo {
    fn read(handle: &SocketHandle) -> Self {
        let socket = handle.socket();
        Self {
            id: handle.id(),
            local_addr: socket.local_addr().ok().and_then(|a| a.as_socket()),
            peer_addr: socket.peer_addr().ok().and_then(|a| a.as_socket()),
            keep_alive: socket.keepalive().ok(),
            keep_alive_idle: read_idle(socket),
            keep_alive_interval: read_interval(socket),
            keep_alive_count: read_count(socket),
        }
    }
}

#[cfg(not(any(windows, target_os = "haiku", target_os = "openbsd", target_os = "vita")))]
fn read_idle(socket: &Socket) -> Option<u64> {
    socket.keepalive_time().ok().map(|d| d.as_secs())
}

#[cfg(any(windows, target_os = "haiku", target_os = "openbsd", target_os = "vita"))]
fn read_idle(_socket: &Socket) -> Option<u64> {
    None
}

#[cfg(any(
    target_os = "android",
    target_os = "freebsd",
    target_os = "ios",
    target_os = "linux",
    target_os = "macos",
    target_os = "netbsd"
))]
fn read_interval(socket: &Socket) -> Option<u64> {
    socket.keepalive_interval().ok().map(|d| d.as_secs())
}

#[cfg(not(any(
    target_os = "android",
    target_os = "freebsd",
    target_os = "ios",
    target_os = "linux",
    target_os = "macos",
    target_os = "netbsd"
)))]
fn read_interval(_socket: &Socket) -> Option<u64> {
    None
}

#[cfg(any(
    target_os = "android",
    target_os = "freebsd",
    target_os = "ios",
    target_os = "linux",
    target_os = "macos",
    target_os = "netbsd"
))]
fn read_count(socket: &Socket) -> Option<u32> {
    socket.keepalive_retries().ok()
}

#[cfg(not(any(
    target_os = "android",
    target_os = "freebsd",
    target_os = "ios",
    target_os = "linux",
    target_os = "macos",
    target_os = "netbsd"
)))]
fn read_count(_socket: &Socket) -> Option<u32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use socket2::{Domain, Protocol, Type};

    fn new_handle(id: u64) -> SocketHandle {
        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP)).unwrap();
        SocketHandle::new(id, Arc::new(socket))
    }

    #[test]
    fn test_clone_shares_socket() {
        let handle = new_handle(3);
        let clone = handle.clone();
        assert!(handle.same_socket(&clone));
        assert_eq!(clone.id(), 3);
        assert!(!handle.same_socket(&new_handle(3)));
    }

    #[test]
    fn test_inspect_unconnected_socket() {
        let handle = new_handle(0);
        let info = handle.inspect();
        assert_eq!(info.id, 0);
        assert_eq!(info.peer_addr, None);
        assert_eq!(info.keep_alive, Some(false));
    }
}
