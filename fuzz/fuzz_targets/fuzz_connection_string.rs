#![no_main]

use libfuzzer_sys::fuzz_target;
use pg_socket_factory::client::ConnectionInfo;
use pg_socket_factory::config::{RawConfig, ResolvedConfig};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let options = match ConnectionInfo::parse(text) {
        Ok(info) => info.options,
        Err(_) => RawConfig::parse_query(text),
    };

    // Whatever survives validation must be inside the kernel's limits
    let config = ResolvedConfig::from_raw(&options);
    if let Some(idle) = config.keep_alive_idle() {
        assert!((1..=32767).contains(&idle.as_secs()));
    }
    if let Some(interval) = config.keep_alive_interval() {
        assert!((1..=32767).contains(&interval.as_secs()));
    }
    if let Some(count) = config.keep_alive_count() {
        assert!((1..=255).contains(&count));
    }
});
