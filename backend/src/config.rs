use log::warn;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_FEATURES_PATH: &str = "assets/selected_features.json";
pub const DEFAULT_MODEL_PATH: &str = "assets/model_pipeline_gb.json";
pub const DEFAULT_RATE_LIMIT: u32 = 100;
const DEFAULT_ORIGINS: &str = "http://localhost:8080,http://127.0.0.1:8080";

/// Server settings, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub features_path: PathBuf,
    pub model_path: PathBuf,
    pub rate_limit_per_minute: u32,
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(get("PORT"), "PORT", 8080),
            workers: parse_or(get("WORKERS"), "WORKERS", num_cpus::get()).max(1),
            features_path: get("BURNOUT_FEATURES_PATH")
                .unwrap_or_else(|| DEFAULT_FEATURES_PATH.to_string())
                .into(),
            model_path: get("BURNOUT_MODEL_PATH")
                .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string())
                .into(),
            rate_limit_per_minute: parse_or(
                get("BURNOUT_RATE_LIMIT"),
                "BURNOUT_RATE_LIMIT",
                DEFAULT_RATE_LIMIT,
            ),
            allowed_origins: split_csv(
                &get("BURNOUT_ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ORIGINS.to_string()),
            ),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr + Copy>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        Some(v) => v.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {key}={v}, using default");
            default
        }),
        None => default,
    }
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_address(), "127.0.0.1:8080");
        assert!(cfg.workers >= 1);
        assert_eq!(cfg.features_path, PathBuf::from(DEFAULT_FEATURES_PATH));
        assert_eq!(cfg.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(cfg.rate_limit_per_minute, DEFAULT_RATE_LIMIT);
        assert_eq!(cfg.allowed_origins.len(), 2);
    }

    #[test]
    fn variables_override_defaults() {
        let cfg = config(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("WORKERS", "3"),
            ("BURNOUT_MODEL_PATH", "/srv/models/gb.json"),
            ("BURNOUT_FEATURES_PATH", "/srv/models/features.json"),
            ("BURNOUT_RATE_LIMIT", "10"),
            ("BURNOUT_ALLOWED_ORIGINS", "https://survey.example.org, ,https://hr.example.org"),
        ]);
        assert_eq!(cfg.bind_address(), "0.0.0.0:9000");
        assert_eq!(cfg.workers, 3);
        assert_eq!(cfg.model_path, PathBuf::from("/srv/models/gb.json"));
        assert_eq!(cfg.features_path, PathBuf::from("/srv/models/features.json"));
        assert_eq!(cfg.rate_limit_per_minute, 10);
        assert_eq!(
            cfg.allowed_origins,
            vec!["https://survey.example.org", "https://hr.example.org"]
        );
    }

    #[test]
    fn unparsable_numbers_fall_back() {
        let cfg = config(&[("PORT", "eighty"), ("WORKERS", "0"), ("BURNOUT_RATE_LIMIT", "-5")]);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.workers, 1);
        assert_eq!(cfg.rate_limit_per_minute, DEFAULT_RATE_LIMIT);
    }
}
