use crate::store::RecoveryPolicy;
use std::{collections::HashMap, env, path::PathBuf};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub seed_enabled: bool,
    pub recovery: RecoveryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_map(vars: &HashMap<&str, &str>) -> Self {
        Self::from_lookup(|key| vars.get(key).map(|value| value.to_string()))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let recovery = match lookup("APP_RECOVERY") {
            Some(value) => RecoveryPolicy::parse(&value).unwrap_or_else(|| {
                warn!("unknown APP_RECOVERY value {value:?}, using discard");
                RecoveryPolicy::DiscardAll
            }),
            None => RecoveryPolicy::DiscardAll,
        };

        Self {
            host: lookup("HOST")
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| "127.0.0.1".into()),
            port: lookup("PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(8080),
            data_dir: lookup("APP_DATA_DIR")
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            seed_enabled: lookup("APP_ENABLE_SEED")
                .map(|value| matches!(value.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
            recovery,
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
