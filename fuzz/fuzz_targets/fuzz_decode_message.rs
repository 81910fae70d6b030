#![no_main]

use bytes::{Buf, BytesMut};
use libfuzzer_sys::fuzz_target;
use pg_socket_factory::protocol::decode_message;

fuzz_target!(|data: &[u8]| {
    let mut buf = BytesMut::from(data);

    // Several replies may arrive in one segment during startup
    while !buf.is_empty() {
        match decode_message(&buf) {
            Ok((_, consumed)) if consumed > 0 && consumed <= buf.len() => buf.advance(consumed),
            _ => break,
        }
    }
});
