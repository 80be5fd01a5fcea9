use std::net::SocketAddr;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub fn compose_config<'de, CFG: Deserialize<'de>>(external_path: &str, env_prefix: &str) -> Result<CFG, ConfigError> {
    Config::builder()

        // Add in a local configuration file
        .add_source(File::with_name(external_path).required(false))

        // Add in settings from the environment (with a prefix of SYNTHETIC_HPA)
        .add_source(Environment::with_prefix(env_prefix))

        .build()?
        .try_deserialize()
}

fn default_metrics_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_error_requeue_secs() -> u64 {
    60
}

fn default_resync_secs() -> u64 {
    300
}

#[derive(Deserialize, Debug)]
pub struct ControllerConfig {
    #[serde(default = "default_metrics_address")]
    pub metrics_address: SocketAddr,
    /// Namespace to watch StatefulSets in, all namespaces when unset.
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default = "default_error_requeue_secs")]
    pub error_requeue_secs: u64,
    /// Delay before a reconciled StatefulSet is checked again without any event.
    #[serde(default = "default_resync_secs")]
    pub resync_secs: u64,
}

impl ControllerConfig {
    pub fn error_requeue(&self) -> Duration {
        Duration::from_secs(self.error_requeue_secs)
    }

    pub fn resync(&self) -> Duration {
        Duration::from_secs(self.resync_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg: ControllerConfig = compose_config("/nonexistent/synthetic-hpa-controller", "SYNTHETIC_HPA_TEST_DEFAULTS").unwrap();

        assert_eq!(cfg.metrics_address, default_metrics_address());
        assert_eq!(cfg.namespace, None);
        assert_eq!(cfg.error_requeue(), Duration::from_secs(60));
        assert_eq!(cfg.resync(), Duration::from_secs(300));
    }

    #[test]
    fn file_settings_are_loaded() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "metrics_address = \"127.0.0.1:9100\"").unwrap();
        writeln!(file, "namespace = \"dynatrace\"").unwrap();
        writeln!(file, "error_requeue_secs = 5").unwrap();
        writeln!(file, "resync_secs = 30").unwrap();

        let path = file.path().to_str().unwrap();
        let cfg: ControllerConfig = compose_config(path, "SYNTHETIC_HPA_TEST_FILE").unwrap();

        assert_eq!(cfg.metrics_address, SocketAddr::from(([127, 0, 0, 1], 9100)));
        assert_eq!(cfg.namespace.as_deref(), Some("dynatrace"));
        assert_eq!(cfg.error_requeue(), Duration::from_secs(5));
        assert_eq!(cfg.resync(), Duration::from_secs(30));
    }
}
