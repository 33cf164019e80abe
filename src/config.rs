use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Application-level constants
pub const APP_NAME: &str = "ReportSight";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND: &str = "127.0.0.1:8700";
pub const DEFAULT_LLM_URL: &str = "http://localhost:11434";
pub const DEFAULT_LLM_MODEL: &str = "medllama2";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LLM_RETRIES: u32 = 1;
/// Prompt-context budget in characters.
pub const DEFAULT_PROMPT_BUDGET: usize = 6000;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "reportsight_lib=info,tower_http=info"
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub llm_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub llm_retries: u32,
    pub prompt_budget: usize,
    /// Optional JSON file extending the built-in catalog.
    pub catalog_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8700)),
            llm_url: DEFAULT_LLM_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            llm_retries: DEFAULT_LLM_RETRIES,
            prompt_budget: DEFAULT_PROMPT_BUDGET,
            catalog_path: None,
        }
    }
}

impl AppConfig {
    /// Read `REPORTSIGHT_*` environment variables over the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source. Invalid values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        Self {
            bind: parsed(&lookup, "REPORTSIGHT_BIND", defaults.bind),
            llm_url: text("REPORTSIGHT_LLM_URL", defaults.llm_url),
            llm_model: text("REPORTSIGHT_LLM_MODEL", defaults.llm_model),
            llm_timeout_secs: parsed(&lookup, "REPORTSIGHT_LLM_TIMEOUT_SECS", defaults.llm_timeout_secs),
            llm_retries: parsed(&lookup, "REPORTSIGHT_LLM_RETRIES", defaults.llm_retries),
            prompt_budget: parsed(&lookup, "REPORTSIGHT_PROMPT_BUDGET", defaults.prompt_budget),
            catalog_path: lookup("REPORTSIGHT_CATALOG")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default = %default, "Invalid config value, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let c = config(&[]);
        assert_eq!(c, AppConfig::default());
        assert_eq!(c.bind.to_string(), DEFAULT_BIND);
        assert!(c.catalog_path.is_none());
    }

    #[test]
    fn values_override_defaults() {
        let c = config(&[
            ("REPORTSIGHT_BIND", "0.0.0.0:9000"),
            ("REPORTSIGHT_LLM_URL", "http://gpu-box:11434"),
            ("REPORTSIGHT_LLM_MODEL", "llama3"),
            ("REPORTSIGHT_LLM_TIMEOUT_SECS", "15"),
            ("REPORTSIGHT_LLM_RETRIES", "3"),
            ("REPORTSIGHT_PROMPT_BUDGET", "2000"),
            ("REPORTSIGHT_CATALOG", "/etc/reportsight/catalog.json"),
        ]);
        assert_eq!(c.bind.port(), 9000);
        assert_eq!(c.llm_url, "http://gpu-box:11434");
        assert_eq!(c.llm_model, "llama3");
        assert_eq!(c.llm_timeout_secs, 15);
        assert_eq!(c.llm_retries, 3);
        assert_eq!(c.prompt_budget, 2000);
        assert_eq!(
            c.catalog_path,
            Some(PathBuf::from("/etc/reportsight/catalog.json"))
        );
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let c = config(&[
            ("REPORTSIGHT_LLM_TIMEOUT_SECS", "soon"),
            ("REPORTSIGHT_LLM_RETRIES", "-1"),
            ("REPORTSIGHT_BIND", "not-an-address"),
        ]);
        assert_eq!(c.llm_timeout_secs, DEFAULT_LLM_TIMEOUT_SECS);
        assert_eq!(c.llm_retries, DEFAULT_LLM_RETRIES);
        assert_eq!(c.bind, AppConfig::default().bind);
    }

    #[test]
    fn blank_strings_keep_defaults() {
        let c = config(&[("REPORTSIGHT_LLM_MODEL", "  "), ("REPORTSIGHT_CATALOG", "")]);
        assert_eq!(c.llm_model, DEFAULT_LLM_MODEL);
        assert!(c.catalog_path.is_none());
    }

    #[test]
    fn app_name_is_reportsight() {
        assert_eq!(APP_NAME, "ReportSight");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }
}
