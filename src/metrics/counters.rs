//! Counter helpers

use super::labels;

/// Record a socket returned to a caller
pub fn socket_created(operation: &'static str) {
    ::metrics::counter!(labels::SOCKETS_CREATED, "operation" => operation).increment(1);
}

/// Record a failed creation call
pub fn socket_create_failed(operation: &'static str, kind: std::io::ErrorKind) {
    ::metrics::counter!(
        labels::SOCKET_CREATE_FAILED,
        "operation" => operation,
        "kind" => format!("{:?}", kind)
    )
    .increment(1);
}

/// Record an option dropped by validation
pub fn option_rejected(option: &str, reason: &'static str) {
    ::metrics::counter!(
        labels::OPTIONS_REJECTED,
        "option" => option.to_string(),
        "reason" => reason
    )
    .increment(1);
}

/// Record a keepalive tuning option the platform does not support
pub fn tuning_unsupported(option: &'static str) {
    ::metrics::counter!(labels::TUNING_UNSUPPORTED, "option" => option).increment(1);
}

/// Record a session that failed to open
pub fn session_failed(category: &'static str, retriable: bool) {
    ::metrics::counter!(
        labels::SESSIONS_FAILED,
        "category" => category,
        "retriable" => if retriable { "true" } else { "false" }
    )
    .increment(1);
}
