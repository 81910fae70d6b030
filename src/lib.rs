//! Keepalive-tuning socket factory for Postgres client drivers
//!
//! A driver hands socket creation to a [`factory::MakeSocket`] instead of
//! opening TCP connections itself. [`factory::KeepaliveSocketFactory`] validates
//! an untyped option bag once, applies the surviving keepalive settings to every
//! socket it creates, and records each socket in a process-wide registry so
//! tests and diagnostics can look at what was actually opened.
//!
//! # Example
//!
//! ```no_run
//! # async fn example() -> pg_socket_factory::Result<()> {
//! use pg_socket_factory::client::{ConnectionInfo, Session};
//!
//! let info = ConnectionInfo::parse(
//!     "postgres://app@localhost:5432/app?keepAlive=true&keepAliveIdle=60&keepAliveCount=5",
//! )?;
//! let session = Session::open(&info).await?;
//! println!("{:?}", session.outcome());
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_debug_implementations, rust_2018_idioms)]

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod factory;
pub mod metrics;
pub mod protocol;

pub use error::{Error, Result};
pub use factory::{global_registry, KeepaliveSocketFactory, MakeSocket, SocketHandle};
