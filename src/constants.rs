//! # Constants
//!
//! Shared constants used throughout the operator.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Finalizer marker that defers physical deletion of a `Redis` until its
/// dependents are gone
pub const REDIS_FINALIZER: &str = "redis.cache.tc/finalizer";

/// Key inside the credential Secret that holds the password
pub const PASSWORD_KEY: &str = "password";

/// Environment variable through which the container receives the password
pub const PASSWORD_ENV_VAR: &str = "REDIS_PASSWORD";

/// Suffix appended to the `Redis` name to form the credential Secret name
pub const SECRET_NAME_SUFFIX: &str = "-secret";

/// Label key carried by every owned object and used as the pod selector
pub const APP_LABEL: &str = "app";

/// Field manager recorded on status patches
pub const FIELD_MANAGER: &str = "redis-operator";

/// Number of random bytes in a generated password
pub const PASSWORD_BYTES: usize = 16;

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 5000;

/// Default HTTP server startup timeout (how long to wait for server to be ready)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Default HTTP server readiness poll interval
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;

/// Default delay before the pass that follows a Deployment creation (seconds)
pub const DEFAULT_CREATE_REQUEUE_SECS: u64 = 1;

/// Default first step of the per-object error backoff (seconds)
pub const DEFAULT_BACKOFF_MIN_SECS: u64 = 5;

/// Default cap of the per-object error backoff (seconds)
pub const DEFAULT_BACKOFF_MAX_SECS: u64 = 300;

/// Default delay before restarting the controller stream after it ends (seconds)
pub const DEFAULT_WATCH_RESTART_DELAY_SECS: u64 = 5;

/// Log filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "redis_operator=info,kube=warn";
