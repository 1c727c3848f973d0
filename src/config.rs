use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use snafu::{Location, ResultExt as _, Snafu};
use url::Url;

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("invalid configuration in the environment: {source}"))]
    Environment {
        source: envy::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

/// Application configuration, read from environment variables (and `.env`).
///
/// | variable        | default                          |
/// |-----------------|----------------------------------|
/// | `SURREAL_URL`   | `surrealkv://channel-growth.db`  |
/// | `SURREAL_NS`    | `channel_growth`                 |
/// | `SURREAL_DB`    | `channel_growth`                 |
/// | `LOG_DIR`       | `logs`                           |
/// | `ACTIVITY_DIR`  | `logs/activity`                  |
/// | `REMEMBER_FILE` | `remember.json`                  |
/// | `STAGE_DELAY`   | `500ms`                          |
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_surreal_url")]
    pub surreal_url: Url,
    #[serde(rename = "surreal_ns", default = "default_name")]
    pub namespace: String,
    #[serde(rename = "surreal_db", default = "default_name")]
    pub database: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_activity_dir")]
    pub activity_dir: PathBuf,
    #[serde(default = "default_remember_file")]
    pub remember_file: PathBuf,

    /// Pause before each stage of a staged simulation.
    #[serde(default = "default_stage_delay", deserialize_with = "human_duration")]
    pub stage_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        envy::from_env::<Config>().context(EnvironmentSnafu)
    }
}

fn default_surreal_url() -> Url {
    Url::parse("surrealkv://channel-growth.db").expect("static url is valid")
}

fn default_name() -> String {
    "channel_growth".into()
}

fn default_log_dir() -> PathBuf {
    "logs".into()
}

fn default_activity_dir() -> PathBuf {
    PathBuf::from("logs").join("activity")
}

fn default_remember_file() -> PathBuf {
    "remember.json".into()
}

fn default_stage_delay() -> Duration {
    Duration::from_millis(500)
}

fn human_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let text = String::deserialize(deserializer)?;
    humantime::parse_duration(&text).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, envy::Error> {
        envy::from_iter(
            pairs
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        )
    }

    #[test]
    fn every_field_has_a_default() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.surreal_url.scheme(), "surrealkv");
        assert_eq!(config.namespace, "channel_growth");
        assert_eq!(config.stage_delay, Duration::from_millis(500));
        assert_eq!(config.remember_file, PathBuf::from("remember.json"));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = from_pairs(&[
            ("SURREAL_URL", "mem://"),
            ("SURREAL_NS", "test"),
            ("STAGE_DELAY", "1s 250ms"),
            ("ACTIVITY_DIR", "/tmp/activity"),
        ])
        .unwrap();

        assert_eq!(config.surreal_url.scheme(), "mem");
        assert_eq!(config.namespace, "test");
        assert_eq!(config.database, "channel_growth");
        assert_eq!(config.stage_delay, Duration::from_millis(1250));
        assert_eq!(config.activity_dir, PathBuf::from("/tmp/activity"));
    }

    #[test]
    fn malformed_delay_is_rejected() {
        assert!(from_pairs(&[("STAGE_DELAY", "soon")]).is_err());
    }
}
