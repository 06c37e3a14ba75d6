/// Bounds for user-configurable values

/// Smallest accepted package size limit (MiB)
pub const MIN_PACKAGE_SIZE_MIB: u64 = 1;

/// Largest accepted package size limit (MiB)
pub const MAX_PACKAGE_SIZE_MIB: u64 = 1024;

/// Package size limit used when none is configured (MiB)
pub const DEFAULT_PACKAGE_SIZE_MIB: u64 = 100;

/// Catalog request timeout bounds (seconds)
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

/// Accepted `logging.level` values
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Accepted `apply.backend` values
pub const APPLY_BACKENDS: [&str; 2] = ["state_file", "command"];
