//! Opening a Postgres session over a factory-made socket

use super::connection_string::ConnectionInfo;
use crate::connection::Transport;
use crate::factory::{MakeSocket, SocketHandle};
use crate::protocol::constants::PROTOCOL_VERSION;
use crate::protocol::{
    decode_message, encode_message, AuthenticationRequest, BackendMessage, FrontendMessage,
};
use crate::{Error, Result};
use bytes::{Buf, BytesMut};
use std::io;
use std::sync::Arc;
use tracing::Instrument;

/// A connection that has sent its startup packet and heard back from the server
///
/// Authentication itself is left to the driver; the session only proves the
/// server accepted the connection and reports what it asked for.
#[derive(Debug)]
pub struct Session {
    transport: Transport,
    outcome: AuthenticationRequest,
}

impl Session {
    /// Open a session using the keepalive options from the connection string
    pub async fn open(info: &ConnectionInfo) -> Result<Self> {
        Self::open_with(info, Arc::new(info.socket_factory())).await
    }

    /// Open a session using `factory` to create the socket
    pub async fn open_with(info: &ConnectionInfo, factory: Arc<dyn MakeSocket>) -> Result<Self> {
        let result: Result<Self> = async {
            let mut transport = Transport::connect_with(factory, &info.host, info.port).await?;

            let startup = FrontendMessage::Startup {
                version: PROTOCOL_VERSION,
                params: info.startup_params(),
            };
            transport.write_all(&encode_message(&startup)).await?;
            transport.flush().await?;

            let outcome = read_startup_reply(&mut transport).await?;
            tracing::info!(outcome = ?outcome, "server accepted startup");

            Ok(Self { transport, outcome })
        }
        .instrument(tracing::info_span!(
            "session_open",
            host = %info.host,
            port = info.port,
            user = %info.user,
            database = %info.database
        ))
        .await;

        if let Err(e) = &result {
            tracing::warn!(
                host = %info.host,
                port = info.port,
                category = e.category(),
                retriable = e.is_retriable(),
                error = %e,
                "session open failed"
            );
            crate::metrics::counters::session_failed(e.category(), e.is_retriable());
        }
        result
    }

    /// What the server asked for in reply to the startup packet
    pub fn outcome(&self) -> &AuthenticationRequest {
        &self.outcome
    }

    /// The socket this session runs on
    pub fn socket(&self) -> &SocketHandle {
        self.transport.socket()
    }

    /// Send Terminate and shut the socket down
    pub async fn close(mut self) -> Result<()> {
        self.transport
            .write_all(&encode_message(&FrontendMessage::Terminate))
            .await?;
        self.transport.shutdown().await?;
        tracing::debug!("session closed");
        Ok(())
    }
}

async fn read_startup_reply(transport: &mut Transport) -> Result<AuthenticationRequest> {
    let mut buf = BytesMut::with_capacity(512);

    loop {
        match decode_message(&buf) {
            Ok((msg, consumed)) => {
                buf.advance(consumed);
                match msg {
                    BackendMessage::Authentication(request) => return Ok(request),
                    BackendMessage::ErrorResponse(fields) => {
                        return Err(Error::Server {
                            code: fields.code.clone().unwrap_or_default(),
                            message: fields.message.clone().unwrap_or_default(),
                        })
                    }
                    BackendMessage::NoticeResponse(fields) => {
                        tracing::debug!(notice = %fields, "notice during startup");
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                if transport.read_buf(&mut buf).await? == 0 {
                    return Err(Error::ConnectionClosed);
                }
            }
            Err(e) => return Err(Error::Protocol(e.to_string())),
        }
    }
}
