//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use std::time::Duration;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Environment variables are populated from a ConfigMap using `envFrom` in the deployment.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Port of the metrics and probe HTTP server
    pub metrics_port: u16,
    /// How long to wait before re-running a pass that just created the Deployment (seconds)
    pub create_requeue_secs: u64,
    /// First backoff step after a failed pass (seconds)
    pub backoff_min_secs: u64,
    /// Maximum backoff between failed passes (seconds)
    pub backoff_max_secs: u64,
    /// Restrict the watch to one namespace; `None` watches the whole cluster
    pub watch_namespace: Option<String>,
    /// Create the `Redis` CRD at startup when it is not served yet
    pub install_crd: bool,
    /// Log output format
    pub log_format: LogFormat,
    /// How long startup waits for the HTTP server to bind (seconds)
    pub server_startup_timeout_secs: u64,
    /// Poll interval while waiting for the HTTP server (milliseconds)
    pub server_poll_interval_ms: u64,
    /// Delay before restarting the controller stream after it ends (seconds)
    pub watch_restart_delay_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            metrics_port: DEFAULT_METRICS_PORT,
            create_requeue_secs: DEFAULT_CREATE_REQUEUE_SECS,
            backoff_min_secs: DEFAULT_BACKOFF_MIN_SECS,
            backoff_max_secs: DEFAULT_BACKOFF_MAX_SECS,
            watch_namespace: None,
            install_crd: false,
            log_format: LogFormat::Json,
            server_startup_timeout_secs: DEFAULT_SERVER_STARTUP_TIMEOUT_SECS,
            server_poll_interval_ms: DEFAULT_SERVER_POLL_INTERVAL_MS,
            watch_restart_delay_secs: DEFAULT_WATCH_RESTART_DELAY_SECS,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            metrics_port: parse_or(&lookup, "METRICS_PORT", defaults.metrics_port),
            create_requeue_secs: parse_or(
                &lookup,
                "CREATE_REQUEUE_SECS",
                defaults.create_requeue_secs,
            ),
            backoff_min_secs: parse_or(&lookup, "BACKOFF_MIN_SECS", defaults.backoff_min_secs),
            backoff_max_secs: parse_or(&lookup, "BACKOFF_MAX_SECS", defaults.backoff_max_secs),
            watch_namespace: lookup("WATCH_NAMESPACE").filter(|ns| !ns.trim().is_empty()),
            install_crd: lookup("INSTALL_CRD").map_or(defaults.install_crd, |v| parse_bool(&v)),
            log_format: lookup("LOG_FORMAT").map_or(defaults.log_format, |v| LogFormat::parse(&v)),
            server_startup_timeout_secs: parse_or(
                &lookup,
                "SERVER_STARTUP_TIMEOUT_SECS",
                defaults.server_startup_timeout_secs,
            ),
            server_poll_interval_ms: parse_or(
                &lookup,
                "SERVER_POLL_INTERVAL_MS",
                defaults.server_poll_interval_ms,
            ),
            watch_restart_delay_secs: parse_or(
                &lookup,
                "WATCH_RESTART_DELAY_SECS",
                defaults.watch_restart_delay_secs,
            ),
        }
    }

    /// Get the requeue delay that follows a Deployment creation
    #[must_use]
    pub fn create_requeue_duration(&self) -> Duration {
        Duration::from_secs(self.create_requeue_secs)
    }

    /// Get the watch restart delay
    #[must_use]
    pub fn watch_restart_delay_duration(&self) -> Duration {
        Duration::from_secs(self.watch_restart_delay_secs)
    }
}

/// Read a variable through `lookup` and parse it, or return the default
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_bool(value: &str) -> bool {
    let v_lower = value.to_lowercase();
    v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = ControllerConfig::from_lookup(|_| None);
        assert_eq!(config.metrics_port, 5000);
        assert_eq!(config.create_requeue_secs, 1);
        assert_eq!(config.backoff_min_secs, 5);
        assert_eq!(config.backoff_max_secs, 300);
        assert_eq!(config.watch_namespace, None);
        assert!(!config.install_crd);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = ControllerConfig::from_lookup(lookup_from(&[
            ("METRICS_PORT", "9090"),
            ("CREATE_REQUEUE_SECS", "3"),
            ("WATCH_NAMESPACE", "cache"),
            ("INSTALL_CRD", "yes"),
            ("LOG_FORMAT", "text"),
        ]));
        assert_eq!(config.metrics_port, 9090);
        assert_eq!(config.create_requeue_duration(), Duration::from_secs(3));
        assert_eq!(config.watch_namespace.as_deref(), Some("cache"));
        assert!(config.install_crd);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_unparseable_values_fall_back_to_defaults() {
        let config = ControllerConfig::from_lookup(lookup_from(&[
            ("METRICS_PORT", "not-a-port"),
            ("BACKOFF_MAX_SECS", "-1"),
            ("WATCH_NAMESPACE", "  "),
        ]));
        assert_eq!(config.metrics_port, 5000);
        assert_eq!(config.backoff_max_secs, 300);
        assert_eq!(config.watch_namespace, None);
    }
}
