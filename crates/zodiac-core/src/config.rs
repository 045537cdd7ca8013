//! Gateway configuration: built-in defaults, optional TOML file, then environment.
//!
//! | Source | Example | Notes |
//! |--------|---------|-------|
//! | defaults | port 5000 | see `Default` impls below |
//! | file | `config/zodiac.toml` | path override: `ZODIAC_CONFIG` |
//! | env | `ZODIAC_GEOCODER__MAX_ATTEMPTS=5` | prefix `ZODIAC`, section separator `__` |
//! | env | `PORT=8080` | bare `PORT` always wins for the listening port |

use crate::location::RetryPolicy;
use crate::session::DEFAULT_SESSION_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 5000;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app_name: String,
    /// Bind address for the HTTP listener.
    pub host: String,
    pub port: u16,
    pub geocoder: GeocoderConfig,
    pub ephemeris: EphemerisConfig,
    pub traits: TraitsConfig,
    pub sessions: SessionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "Zodiac Oracle".to_string(),
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            geocoder: GeocoderConfig::default(),
            ephemeris: EphemerisConfig::default(),
            traits: TraitsConfig::default(),
            sessions: SessionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load config from file and environment. Precedence: `PORT` > `ZODIAC_*` env > file > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("ZODIAC_CONFIG").unwrap_or_else(|_| "config/zodiac".to_string());
        let defaults = AppConfig::default();
        let built = config::Config::builder()
            .set_default("app_name", defaults.app_name)?
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .add_source(config::File::with_name(&config_path).required(false))
            .add_source(config::Environment::with_prefix("ZODIAC").separator("__"))
            .build()?;

        let mut cfg: AppConfig = built.try_deserialize()?;
        if let Some(port) = env_port() {
            cfg.port = port;
        }
        Ok(cfg)
    }

    /// `host:port` for the TCP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Live geocoding (Nominatim) and the runtime cache in front of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    /// Nominatim usage policy requires an identifying user agent.
    pub user_agent: String,
    /// Per-call HTTP timeout.
    pub timeout_secs: u64,
    /// Minimum spacing between consecutive live calls, process-wide.
    pub min_interval_ms: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    /// Delay multiplier between attempts; 1.0 keeps the delay fixed.
    pub backoff: f64,
    /// Maximum cached place names; 0 disables eviction.
    pub cache_capacity: usize,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: format!("zodiac-oracle/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 20,
            min_interval_ms: 1000,
            max_attempts: 3,
            retry_delay_ms: 2000,
            backoff: 1.0,
            cache_capacity: 1024,
        }
    }
}

impl GeocoderConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            delay: Duration::from_millis(self.retry_delay_ms),
            backoff: if self.backoff.is_finite() && self.backoff >= 1.0 {
                self.backoff
            } else {
                1.0
            },
        }
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EphemerisBackend {
    /// Closed-form solar/lunar theory, no data files.
    Analytic,
    /// Swiss Ephemeris via the `swisseph` crate (feature `swiss-ephemeris`).
    Swiss,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EphemerisConfig {
    pub backend: EphemerisBackend,
    /// Directory holding `sepl_18.se1`, `semo_18.se1` and `seas_18.se1`.
    pub path: PathBuf,
    /// Base URL the data files are fetched from when missing.
    pub data_url: String,
    pub auto_download: bool,
}

impl Default for EphemerisConfig {
    fn default() -> Self {
        Self {
            backend: EphemerisBackend::Analytic,
            path: PathBuf::from("./ephe"),
            data_url: "https://raw.githubusercontent.com/aloistr/swisseph/master/ephe".to_string(),
            auto_download: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitModel {
    Fixed,
    Regression,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraitsConfig {
    pub model: TraitModel,
}

impl Default for TraitsConfig {
    fn default() -> Self {
        Self {
            model: TraitModel::Regression,
        }
    }
}

/// Per-client chart storage used by the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum stored sessions; the least recently written is dropped first. 0 disables eviction.
    pub capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_SESSION_CAPACITY,
        }
    }
}

fn env_port() -> Option<u16> {
    std::env::var("PORT")
        .ok()
        .and_then(|v| v.trim().parse::<u16>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_port_5000_with_three_attempts() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:5000");
        assert_eq!(cfg.geocoder.max_attempts, 3);
        assert_eq!(cfg.geocoder.min_interval(), Duration::from_secs(1));
        assert_eq!(cfg.ephemeris.backend, EphemerisBackend::Analytic);
        assert_eq!(cfg.traits.model, TraitModel::Regression);
        assert_eq!(cfg.sessions.capacity, 10_000);
    }

    #[test]
    fn retry_policy_clamps_nonsense_values() {
        let cfg = GeocoderConfig {
            max_attempts: 0,
            backoff: 0.2,
            ..GeocoderConfig::default()
        };
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.backoff, 1.0);
    }

    #[test]
    fn sections_deserialize_from_partial_toml_shape() {
        let json = r#"{"port": 8080, "geocoder": {"max_attempts": 5}, "traits": {"model": "fixed"}, "sessions": {"capacity": 64}}"#;
        let cfg: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.geocoder.max_attempts, 5);
        assert_eq!(cfg.geocoder.retry_delay_ms, 2000);
        assert_eq!(cfg.traits.model, TraitModel::Fixed);
        assert_eq!(cfg.app_name, "Zodiac Oracle");
        assert_eq!(cfg.sessions.capacity, 64);
    }

    #[test]
    fn load_reads_file_then_port_env_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zodiac.toml");
        std::fs::write(
            &path,
            "port = 7000\n[geocoder]\nmin_interval_ms = 250\n[ephemeris]\nbackend = \"swiss\"\n",
        )
        .unwrap();

        std::env::set_var("ZODIAC_CONFIG", &path);
        std::env::set_var("PORT", "9100");
        let cfg = AppConfig::load();
        std::env::remove_var("ZODIAC_CONFIG");
        std::env::remove_var("PORT");

        let cfg = cfg.unwrap();
        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.geocoder.min_interval(), Duration::from_millis(250));
        assert_eq!(cfg.geocoder.max_attempts, 3);
        assert_eq!(cfg.ephemeris.backend, EphemerisBackend::Swiss);
    }
}
