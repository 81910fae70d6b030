//! Metric names and label values

/// Counter: sockets handed out by a factory
pub const SOCKETS_CREATED: &str = "pg_socket_factory_sockets_created_total";

/// Counter: socket creation calls that failed
pub const SOCKET_CREATE_FAILED: &str = "pg_socket_factory_socket_create_failed_total";

/// Counter: configuration options discarded during validation
pub const OPTIONS_REJECTED: &str = "pg_socket_factory_options_rejected_total";

/// Counter: keepalive tuning options the platform refused
pub const TUNING_UNSUPPORTED: &str = "pg_socket_factory_keepalive_tuning_unsupported_total";

/// Counter: sessions that failed to open, labelled by error category
pub const SESSIONS_FAILED: &str = "pg_socket_factory_sessions_failed_total";

/// Rejection reason: option named without a value
pub const REASON_MISSING_VALUE: &str = "missing_value";

/// Rejection reason: boolean literal other than true/false
pub const REASON_INVALID_BOOLEAN: &str = "invalid_boolean";

/// Rejection reason: value is not a base-10 integer
pub const REASON_NOT_A_NUMBER: &str = "not_a_number";

/// Rejection reason: integer outside the option's bounds
pub const REASON_OUT_OF_RANGE: &str = "out_of_range";

/// Operation: unconnected socket
pub const OP_CREATE: &str = "create";

/// Operation: connect by host name
pub const OP_CONNECT: &str = "connect";

/// Operation: bind, then connect by host name
pub const OP_CONNECT_FROM: &str = "connect_from";

/// Operation: connect to a resolved address
pub const OP_CONNECT_ADDR: &str = "connect_addr";

/// Operation: bind, then connect to a resolved address
pub const OP_CONNECT_ADDR_FROM: &str = "connect_addr_from";
