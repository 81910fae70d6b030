//! Postgres session-opening messages
//!
//! Only what is needed to open a session over a factory-made socket: the
//! startup packet, Terminate, and the server's first answer.

pub mod constants;
mod decode;
mod encode;
mod message;

pub use decode::decode_message;
pub use encode::encode_message;
pub use message::{AuthenticationRequest, BackendMessage, ErrorFields, FrontendMessage};
