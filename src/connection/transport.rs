//! Transport over a factory-made socket

use crate::factory::{KeepaliveSocketFactory, MakeSocket, SocketHandle};
use crate::Result;
use bytes::BytesMut;
use std::io::{self, Read, Write};
use std::net::Shutdown;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use tokio::io::unix::AsyncFd;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};

/// Async TCP transport
///
/// The socket comes from a [`MakeSocket`], so whatever options the factory
/// applies are in place before the first byte is written. The factory's
/// blocking connect runs on tokio's blocking pool.
#[derive(Debug)]
pub struct Transport {
    inner: AsyncFd<SocketHandle>,
}

impl Transport {
    /// Connect via plain TCP with platform-default socket options
    pub async fn connect_tcp(host: &str, port: u16) -> Result<Self> {
        Self::connect_with(Arc::new(KeepaliveSocketFactory::new()), host, port).await
    }

    /// Connect using `factory` to create the socket
    pub async fn connect_with(
        factory: Arc<dyn MakeSocket>,
        host: &str,
        port: u16,
    ) -> Result<Self> {
        let host_owned = host.to_string();
        let socket = tokio::task::spawn_blocking(move || factory.connect(&host_owned, port))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))??;

        tracing::debug!(id = socket.id(), host, port, "socket connected");
        Self::from_socket(socket)
    }

    /// Wrap a socket that is already connected
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_socket(socket: SocketHandle) -> Result<Self> {
        socket.set_nonblocking(true)?;
        Ok(Self {
            inner: AsyncFd::new(socket)?,
        })
    }

    /// The underlying socket
    pub fn socket(&self) -> &SocketHandle {
        self.inner.get_ref()
    }

    /// Write all bytes to the transport
    pub async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        AsyncWriteExt::write_all(self, buf).await?;
        Ok(())
    }

    /// Flush the transport
    pub async fn flush(&mut self) -> Result<()> {
        AsyncWriteExt::flush(self).await?;
        Ok(())
    }

    /// Read bytes into buffer
    pub async fn read_buf(&mut self, buf: &mut BytesMut) -> Result<usize> {
        let n = AsyncReadExt::read_buf(self, buf).await?;
        Ok(n)
    }

    /// Shutdown the write half
    pub async fn shutdown(&mut self) -> Result<()> {
        AsyncWriteExt::shutdown(self).await?;
        Ok(())
    }
}

impl AsyncRead for Transport {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        loop {
            let mut guard = ready!(self.inner.poll_read_ready(cx))?;
            let unfilled = buf.initialize_unfilled();
            match guard.try_io(|inner| inner.get_ref().socket().read(unfilled)) {
                Ok(Ok(len)) => {
                    buf.advance(len);
                    return Poll::Ready(Ok(()));
                }
                Ok(Err(err)) => return Poll::Ready(Err(err)),
                Err(_would_block) => continue,
            }
        }
    }
}

impl AsyncWrite for Transport {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        loop {
            let mut guard = ready!(self.inner.poll_write_ready(cx))?;
            match guard.try_io(|inner| inner.get_ref().socket().write(buf)) {
                Ok(result) => return Poll::Ready(result),
                Err(_would_block) => continue,
            }
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(self.inner.get_ref().shutdown(Shutdown::Write))
    }
}
