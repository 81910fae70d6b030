//! Keepalive-tuning socket factory

use super::configure::configure_socket;
use super::handle::SocketHandle;
use super::registry::{global_registry, SocketRegistry};
use super::MakeSocket;
use crate::config::{RawConfig, ResolvedConfig};
use crate::metrics::{counters, labels};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::sync::Arc;

/// Socket factory that applies keepalive settings to every socket it creates
///
/// The configuration is fixed at construction. Clones share the configuration
/// and the registry, and a factory can be used from many threads at once.
///
/// # Examples
///
/// ```no_run
/// use pg_socket_factory::config::RawConfig;
/// use pg_socket_factory::factory::{KeepaliveSocketFactory, MakeSocket};
///
/// let raw = RawConfig::new()
///     .set("keepAlive", "true")
///     .set("keepAliveIdle", "60")
///     .set("keepAliveInterval", "30")
///     .set("keepAliveCount", "5");
/// let factory = KeepaliveSocketFactory::from_raw(&raw);
/// let socket = factory.connect("localhost", 5432)?;
/// assert!(socket.keepalive()?);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct KeepaliveSocketFactory {
    config: ResolvedConfig,
    registry: Arc<SocketRegistry>,
}

impl KeepaliveSocketFactory {
    /// Factory that leaves every option at the platform default
    pub fn new() -> Self {
        Self::with_config(ResolvedConfig::default())
    }

    /// Factory configured from an untyped option bag
    ///
    /// Invalid entries are logged and skipped; construction never fails.
    pub fn from_raw(raw: &RawConfig) -> Self {
        Self::with_config(ResolvedConfig::from_raw(raw))
    }

    /// Factory with an already validated configuration
    pub fn with_config(config: ResolvedConfig) -> Self {
        Self {
            config,
            registry: global_registry(),
        }
    }

    /// Record sockets in `registry` instead of the process-wide one
    pub fn with_registry(mut self, registry: Arc<SocketRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// The configuration applied to each socket
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// The registry sockets are recorded in
    pub fn registry(&self) -> &Arc<SocketRegistry> {
        &self.registry
    }

    /// Create an unconnected socket of the given address family
    pub fn create_socket_in(&self, domain: Domain) -> io::Result<SocketHandle> {
        let result = self.new_socket(domain);
        self.finish(labels::OP_CREATE, result)
    }

    fn new_socket(&self, domain: Domain) -> io::Result<Socket> {
        let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
        configure_socket(&socket, &self.config)?;
        Ok(socket)
    }

    fn open(&self, remote: SocketAddr, local: Option<SocketAddr>) -> io::Result<Socket> {
        let socket = self.new_socket(Domain::for_address(remote))?;
        // A connected socket cannot be rebound
        if let Some(local) = local {
            socket.bind(&local.into())?;
        }
        socket.connect(&remote.into())?;
        Ok(socket)
    }

    fn open_host(
        &self,
        host: &str,
        port: u16,
        local: Option<SocketAddr>,
    ) -> io::Result<Socket> {
        let mut last_err = None;

        for addr in (host, port).to_socket_addrs()? {
            if local.is_some_and(|local| local.is_ipv4() != addr.is_ipv4()) {
                continue;
            }
            match self.open(addr, local) {
                Ok(socket) => return Ok(socket),
                Err(err) => {
                    tracing::debug!(%addr, error = %err, "connect attempt failed");
                    last_err = Some(err);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("could not resolve {}:{} to a usable address", host, port),
            )
        }))
    }

    fn finish(
        &self,
        operation: &'static str,
        result: io::Result<Socket>,
    ) -> io::Result<SocketHandle> {
        match result {
            Ok(socket) => {
                let handle = self.registry.register(socket);
                tracing::debug!(id = handle.id(), operation, "socket created");
                counters::socket_created(operation);
                Ok(handle)
            }
            Err(err) => {
                tracing::debug!(operation, error = %err, "socket creation failed");
                counters::socket_create_failed(operation, err.kind());
                Err(err)
            }
        }
    }
}

impl Default for KeepaliveSocketFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MakeSocket for KeepaliveSocketFactory {
    fn create_socket(&self) -> io::Result<SocketHandle> {
        self.create_socket_in(Domain::IPV4)
    }

    fn connect(&self, host: &str, port: u16) -> io::Result<SocketHandle> {
        let result = self.open_host(host, port, None);
        self.finish(labels::OP_CONNECT, result)
    }

    fn connect_from(
        &self,
        host: &str,
        port: u16,
        local_addr: IpAddr,
        local_port: u16,
    ) -> io::Result<SocketHandle> {
        let local = SocketAddr::new(local_addr, local_port);
        let result = self.open_host(host, port, Some(local));
        self.finish(labels::OP_CONNECT_FROM, result)
    }

    fn connect_addr(&self, addr: SocketAddr) -> io::Result<SocketHandle> {
        let result = self.open(addr, None);
        self.finish(labels::OP_CONNECT_ADDR, result)
    }

    fn connect_addr_from(&self, addr: SocketAddr, local: SocketAddr) -> io::Result<SocketHandle> {
        let result = self.open(addr, Some(local));
        self.finish(labels::OP_CONNECT_ADDR_FROM, result)
    }
}
