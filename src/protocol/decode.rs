//! Protocol message decoding

use super::constants::{auth, tags};
use super::message::{AuthenticationRequest, BackendMessage, ErrorFields};
use bytes::BytesMut;
use std::io;

/// Largest handshake message accepted (64 KiB)
///
/// The answers to a startup packet are small; anything longer is treated as a
/// peer that is not speaking the Postgres protocol.
const MAX_MESSAGE_LENGTH: usize = 64 * 1024;

/// Decode one backend message from the front of `data`
///
/// # Returns
/// `Ok((msg, consumed))` - Message and number of bytes consumed
/// `Err(e)` - `UnexpectedEof` if more bytes are needed, `InvalidData` otherwise
pub fn decode_message(data: &BytesMut) -> io::Result<(BackendMessage, usize)> {
    if data.len() < 5 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "incomplete message header",
        ));
    }

    let tag = data[0];
    let len = i32::from_be_bytes([data[1], data[2], data[3], data[4]]);

    if len < 4 || len as usize > MAX_MESSAGE_LENGTH {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid message length {}", len),
        ));
    }
    let len = len as usize;

    if data.len() < len + 1 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "incomplete message body",
        ));
    }

    let msg_data = &data[5..len + 1];

    let msg = match tag {
        tags::AUTHENTICATION => decode_authentication(msg_data)?,
        tags::ERROR_RESPONSE => BackendMessage::ErrorResponse(decode_error_fields(msg_data)?),
        tags::NOTICE_RESPONSE => BackendMessage::NoticeResponse(decode_error_fields(msg_data)?),
        _ => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unexpected message tag: 0x{:02X}", tag),
            ))
        }
    };

    Ok((msg, len + 1))
}

fn decode_authentication(data: &[u8]) -> io::Result<BackendMessage> {
    if data.len() < 4 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "auth type"));
    }
    let auth_type = i32::from_be_bytes([data[0], data[1], data[2], data[3]]);

    let request = match auth_type {
        auth::OK => AuthenticationRequest::Ok,
        auth::CLEARTEXT_PASSWORD => AuthenticationRequest::CleartextPassword,
        auth::MD5_PASSWORD => AuthenticationRequest::Md5Password,
        auth::SASL => {
            // Mechanism list: null-terminated strings, closed by an empty one
            let mechanisms = data[4..]
                .split(|&b| b == 0)
                .take_while(|name| !name.is_empty())
                .map(|name| String::from_utf8_lossy(name).to_string())
                .collect();
            AuthenticationRequest::Sasl { mechanisms }
        }
        other => AuthenticationRequest::Other(other),
    };

    Ok(BackendMessage::Authentication(request))
}

fn decode_error_fields(data: &[u8]) -> io::Result<ErrorFields> {
    let mut fields = ErrorFields::default();
    let mut offset = 0;

    while offset < data.len() {
        let field_type = data[offset];
        offset += 1;
        if field_type == 0 {
            break;
        }

        let end = data[offset..].iter().position(|&b| b == 0).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "missing null terminator in error field",
            )
        })?;
        let value = String::from_utf8_lossy(&data[offset..offset + end]).to_string();
        offset += end + 1;

        match field_type {
            b'S' => fields.severity = Some(value),
            b'C' => fields.code = Some(value),
            b'M' => fields.message = Some(value),
            _ => {} // Ignore unknown fields
        }
    }

    Ok(fields)
}
