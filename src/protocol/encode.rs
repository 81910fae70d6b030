//! Protocol message encoding

use super::constants::tags;
use super::message::FrontendMessage;
use bytes::{BufMut, BytesMut};

/// Encode a frontend message into bytes
pub fn encode_message(msg: &FrontendMessage) -> BytesMut {
    let mut buf = BytesMut::new();

    match msg {
        FrontendMessage::Startup { version, params } => encode_startup(&mut buf, *version, params),
        FrontendMessage::Terminate => encode_terminate(&mut buf),
    }

    buf
}

fn encode_startup(buf: &mut BytesMut, version: i32, params: &[(String, String)]) {
    // Startup messages don't have a type byte
    let len_pos = buf.len();
    buf.put_i32(0);

    buf.put_i32(version);

    for (key, value) in params {
        buf.put(key.as_bytes());
        buf.put_u8(0);
        buf.put(value.as_bytes());
        buf.put_u8(0);
    }

    buf.put_u8(0);

    let len = buf.len() - len_pos;
    buf[len_pos..len_pos + 4].copy_from_slice(&(len as i32).to_be_bytes());
}

fn encode_terminate(buf: &mut BytesMut) {
    buf.put_u8(tags::TERMINATE);
    buf.put_i32(4); // Length includes itself
}
