//! Client side: connection strings and session opening

mod connection_string;
mod session;

pub use connection_string::ConnectionInfo;
pub use session::Session;
