//! Socket creation
//!
//! This module handles:
//! * The socket-creation capability a driver depends on (`MakeSocket`)
//! * The keepalive-tuning implementation of it (`KeepaliveSocketFactory`)
//! * Applying resolved options to a fresh socket (`configure_socket`)
//! * The process-wide log of every socket created (`SocketRegistry`)

mod configure;
mod handle;
mod registry;
mod socket_factory;

pub use configure::configure_socket;
pub use handle::{SocketHandle, SocketInfo};
pub use registry::{global_registry, RegistryEntry, SocketRegistry};
pub use socket_factory::KeepaliveSocketFactory;

use std::io;
use std::net::{IpAddr, SocketAddr};

/// Socket-creation capability
///
/// A driver that accepts a `MakeSocket` asks it for sockets instead of opening
/// its own, so any implementation can stand in for plain socket creation. All
/// methods block the calling thread; errors from allocation, bind and connect
/// are returned unchanged.
pub trait MakeSocket: Send + Sync {
    /// Create an unconnected TCP socket
    fn create_socket(&self) -> io::Result<SocketHandle>;

    /// Create a socket and connect it to `host:port`
    ///
    /// Every address `host` resolves to is tried in order until one connects.
    fn connect(&self, host: &str, port: u16) -> io::Result<SocketHandle>;

    /// Create a socket, bind it to `local_addr:local_port`, then connect it to `host:port`
    ///
    /// Only resolved addresses of the same family as `local_addr` are tried.
    fn connect_from(
        &self,
        host: &str,
        port: u16,
        local_addr: IpAddr,
        local_port: u16,
    ) -> io::Result<SocketHandle>;

    /// Create a socket and connect it to an already resolved address
    fn connect_addr(&self, addr: SocketAddr) -> io::Result<SocketHandle>;

    /// Create a socket, bind it to `local`, then connect it to `addr`
    fn connect_addr_from(&self, addr: SocketAddr, local: SocketAddr) -> io::Result<SocketHandle>;
}
