use std::{env, sync::Arc};

use crate::config::Config;

pub trait ConfigService: Send + Sync {
    fn port(&self) -> u16;
    fn values(&self) -> &Config;
}

pub struct ConfigServiceImpl {
    config: Arc<Config>,
}

impl ConfigServiceImpl {
    fn strip_wrapping_quotes(value: &str) -> &str {
        let quoted = value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')));
        if quoted {
            &value[1..value.len() - 1]
        } else {
            value
        }
    }

    fn normalize(raw: &str) -> Option<String> {
        let value = Self::strip_wrapping_quotes(raw.trim()).trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    fn env_nonempty(key: &str) -> Option<String> {
        env::var(key).ok().and_then(|value| Self::normalize(&value))
    }

    fn env_bool(key: &str, default: bool) -> bool {
        Self::env_nonempty(key)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(default)
    }

    pub fn new() -> Self {
        let port = Self::env_nonempty("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3333);
        let database_url = Self::env_nonempty("DATABASE_URL");
        let apply_schema = Self::env_bool("APPLY_SCHEMA", true);
        let log_filter = Self::env_nonempty("RUST_LOG").unwrap_or_else(|| "info".to_string());

        Self {
            config: Arc::new(Config {
                port,
                database_url,
                apply_schema,
                log_filter,
            }),
        }
    }
}

impl Default for ConfigServiceImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigService for ConfigServiceImpl {
    fn port(&self) -> u16 {
        self.config.port
    }

    fn values(&self) -> &Config {
        &self.config
    }
}
