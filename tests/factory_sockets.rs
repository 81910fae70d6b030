//! Socket factory tests over loopback
//!
//! These run against local listeners and read the options back from the
//! kernel, so they need no database.

use pg_socket_factory::config::RawConfig;
use pg_socket_factory::factory::{
    global_registry, KeepaliveSocketFactory, MakeSocket, SocketHandle, SocketRegistry,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

fn listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("bind listener");
    let addr = listener.local_addr().expect("listener address");
    (listener, addr)
}

fn tuned() -> RawConfig {
    RawConfig::new()
        .set("keepAlive", "true")
        .set("keepAliveIdle", "60")
        .set("keepAliveInterval", "30")
        .set("keepAliveCount", "5")
}

/// Every creation variant should hand back a socket with the same options
fn all_variants(factory: &dyn MakeSocket, addr: SocketAddr) -> Vec<SocketHandle> {
    let local = IpAddr::V4(Ipv4Addr::LOCALHOST);
    vec![
        factory.create_socket().expect("create_socket"),
        factory.connect("127.0.0.1", addr.port()).expect("connect"),
        factory
            .connect_from("127.0.0.1", addr.port(), local, 0)
            .expect("connect_from"),
        factory.connect_addr(addr).expect("connect_addr"),
        factory
            .connect_addr_from(addr, SocketAddr::new(local, 0))
            .expect("connect_addr_from"),
    ]
}

#[test]
fn test_full_keepalive_configuration_is_applied() {
    let (_listener, addr) = listener();
    let registry = Arc::new(SocketRegistry::new());
    let factory = KeepaliveSocketFactory::from_raw(&tuned()).with_registry(Arc::clone(&registry));

    let socket = factory.connect_addr(addr).expect("connect");
    assert_eq!(registry.len(), 1);

    let info = socket.inspect();
    assert_eq!(info.peer_addr, Some(addr));
    assert_eq!(info.keep_alive, Some(true));

    #[cfg(target_os = "linux")]
    {
        assert_eq!(info.keep_alive_idle, Some(60));
        assert_eq!(info.keep_alive_interval, Some(30));
        assert_eq!(info.keep_alive_count, Some(5));
        assert_eq!(socket.keepalive_time().unwrap(), Duration::from_secs(60));
    }
}

#[test]
fn test_every_variant_is_configured_and_registered_in_order() {
    let (_listener, addr) = listener();
    let registry = Arc::new(SocketRegistry::new());
    let factory = KeepaliveSocketFactory::from_raw(&tuned()).with_registry(Arc::clone(&registry));

    let sockets = all_variants(&factory, addr);

    assert_eq!(registry.len(), sockets.len());
    for (index, (socket, entry)) in sockets.iter().zip(registry.entries()).enumerate() {
        assert_eq!(entry.id(), index as u64);
        assert!(entry.socket().expect("still open").same_socket(socket));
        assert!(socket.keepalive().unwrap());
    }
}

#[test]
fn test_no_configuration_matches_plain_sockets() {
    let (_listener, addr) = listener();
    let registry = Arc::new(SocketRegistry::new());
    let factory = KeepaliveSocketFactory::new().with_registry(Arc::clone(&registry));

    let plain = std::net::TcpStream::connect(addr).expect("plain connect");
    let plain = socket2::SockRef::from(&plain);

    for socket in all_variants(&factory, addr) {
        assert_eq!(socket.keepalive().unwrap(), plain.keepalive().unwrap());
        #[cfg(target_os = "linux")]
        {
            assert_eq!(socket.keepalive_time().unwrap(), plain.keepalive_time().unwrap());
            assert_eq!(socket.keepalive_retries().unwrap(), plain.keepalive_retries().unwrap());
        }
    }
}

#[test]
fn test_out_of_range_count_uses_platform_default() {
    let (_listener, addr) = listener();
    let raw = RawConfig::new()
        .set("keepAlive", "true")
        .set("keepAliveCount", "10000000");
    let factory = KeepaliveSocketFactory::from_raw(&raw)
        .with_registry(Arc::new(SocketRegistry::new()));
    assert_eq!(factory.config().keep_alive_count(), None);

    let socket = factory.connect_addr(addr).expect("connect");
    assert!(socket.keepalive().unwrap());

    #[cfg(target_os = "linux")]
    {
        let plain = std::net::TcpStream::connect(addr).expect("plain connect");
        let default_count = socket2::SockRef::from(&plain).keepalive_retries().unwrap();
        assert_eq!(socket.keepalive_retries().unwrap(), default_count);
    }
}

#[cfg(target_os = "linux")]
#[test]
fn test_count_above_kernel_cap_does_not_block_creation() {
    let (_listener, addr) = listener();
    let raw = RawConfig::new()
        .set("keepAlive", "true")
        .set("keepAliveCount", "200");
    let registry = Arc::new(SocketRegistry::new());
    let factory = KeepaliveSocketFactory::from_raw(&raw).with_registry(Arc::clone(&registry));
    assert_eq!(factory.config().keep_alive_count(), Some(200));

    let plain = std::net::TcpStream::connect(addr).expect("plain connect");
    let default_count = socket2::SockRef::from(&plain).keepalive_retries().unwrap();

    let connected = factory.connect_addr(addr).expect("connect_addr");
    let unconnected = factory.create_socket().expect("create_socket");
    for socket in [&connected, &unconnected] {
        assert!(socket.keepalive().unwrap());
        assert_eq!(socket.keepalive_retries().unwrap(), default_count);
    }
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_invalid_boolean_disables_keepalive() {
    let (_listener, addr) = listener();
    let raw = RawConfig::new()
        .set("keepAlive", "yes")
        .set("keepAliveIdle", "61");
    let factory = KeepaliveSocketFactory::from_raw(&raw)
        .with_registry(Arc::new(SocketRegistry::new()));

    let socket = factory.connect_addr(addr).expect("connect");
    assert!(!socket.keepalive().unwrap());

    #[cfg(target_os = "linux")]
    assert_ne!(socket.keepalive_time().unwrap(), Duration::from_secs(61));
}

#[test]
fn test_global_registry_sees_every_factory() {
    let (_listener, addr) = listener();
    let first = KeepaliveSocketFactory::from_raw(&tuned());
    let second = KeepaliveSocketFactory::new();

    let a = first.connect_addr(addr).expect("connect");
    let b = second.create_socket().expect("create");

    // Other tests share the global registry, so look for our sockets by identity
    let registry = global_registry();
    let entries = registry.entries();
    let position = |handle: &SocketHandle| {
        entries
            .iter()
            .filter(|e| e.socket().is_some_and(|s| s.same_socket(handle)))
            .map(|e| e.id())
            .collect::<Vec<_>>()
    };

    let a_ids = position(&a);
    let b_ids = position(&b);
    assert_eq!(a_ids, vec![a.id()]);
    assert_eq!(b_ids, vec![b.id()]);
    assert!(a.id() < b.id());
}

#[test]
fn test_dropped_socket_is_reported_closed() {
    let (_listener, addr) = listener();
    let registry = Arc::new(SocketRegistry::new());
    let factory = KeepaliveSocketFactory::new().with_registry(Arc::clone(&registry));

    let kept = factory.connect_addr(addr).expect("connect");
    let dropped = factory.connect_addr(addr).expect("connect");
    let dropped_id = dropped.id();
    drop(dropped);

    assert_eq!(registry.len(), 2);
    assert!(registry.get(dropped_id).expect("entry kept").is_closed());

    let open = registry.open_sockets();
    assert_eq!(open.len(), 1);
    assert!(open[0].same_socket(&kept));
}

#[test]
fn test_concurrent_creation_from_one_factory() {
    let (_listener, addr) = listener();
    let registry = Arc::new(SocketRegistry::new());
    let factory = Arc::new(
        KeepaliveSocketFactory::from_raw(&tuned()).with_registry(Arc::clone(&registry)),
    );

    let threads: Vec<_> = (0..4)
        .map(|_| {
            let factory = Arc::clone(&factory);
            std::thread::spawn(move || {
                (0..8)
                    .map(|_| factory.connect_addr(addr).expect("connect"))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let sockets: Vec<SocketHandle> = threads
        .into_iter()
        .flat_map(|t| t.join().expect("thread"))
        .collect();

    assert_eq!(sockets.len(), 32);
    assert_eq!(registry.len(), 32);
    assert!(sockets.iter().all(|s| s.keepalive().unwrap()));
}

#[test]
fn test_driver_transport_uses_factory_socket() {
    use pg_socket_factory::connection::Transport;

    let (_listener, addr) = listener();
    let registry = Arc::new(SocketRegistry::new());
    let factory = KeepaliveSocketFactory::from_raw(&tuned()).with_registry(Arc::clone(&registry));

    let transport = tokio_test::block_on(Transport::connect_with(
        Arc::new(factory),
        "127.0.0.1",
        addr.port(),
    ));
    let transport = tokio_test::assert_ok!(transport);

    assert_eq!(registry.len(), 1);
    let entry = registry.get(transport.socket().id()).expect("registered");
    assert!(entry.socket().expect("open").same_socket(transport.socket()));
    assert!(transport.socket().keepalive().unwrap());
}
