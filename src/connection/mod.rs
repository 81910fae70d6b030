//! Connection management
//!
//! This module handles:
//! * Opening TCP connections through a socket factory
//! * Async I/O over the factory-made socket

mod transport;

pub use transport::Transport;
