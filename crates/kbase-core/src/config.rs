//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! Retrieval tuning lives under the `[retrieval]` table; every key is optional
//! and falls back to [`RetrievalSettings::default`].
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::chunker::DEFAULT_CHUNK_SIZE;
use crate::error::Error;
use crate::keywords::MAX_KEYWORDS;

/// BM25 term-frequency saturation.
pub const BM25_K1: f64 = 1.5;
/// BM25 length-normalization strength.
pub const BM25_B: f64 = 0.75;
/// Results returned by a search when the caller gives no limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Figment::new(), &env_name)
    }

    /// Loads the file and environment layers, then merges `overrides` last so
    /// injected values win over anything found on disk or in `APP_*`.
    pub fn load_from(overrides: Figment, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__")).merge(overrides);

        let config = Self { figment };
        config.retrieval()?.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Retrieval settings, with defaults filled in for anything not configured.
    pub fn retrieval(&self) -> anyhow::Result<RetrievalSettings> {
        let mut figment = Figment::from(Serialized::defaults(RetrievalSettings::default()));
        if let Ok(configured) = self.figment.find_value("retrieval") {
            figment = figment.merge(Serialized::defaults(configured));
        }
        figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read 'retrieval' settings: {}", e))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalSettings {
    pub chunk_size: usize,
    pub default_limit: usize,
    pub max_keywords: usize,
    pub k1: f64,
    pub b: f64,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            default_limit: DEFAULT_SEARCH_LIMIT,
            max_keywords: MAX_KEYWORDS,
            k1: BM25_K1,
            b: BM25_B,
        }
    }
}

impl RetrievalSettings {
    pub fn validate(&self) -> Result<(), Error> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("retrieval.chunk_size must be > 0".into()));
        }
        if !(self.k1.is_finite() && self.k1 >= 0.0) {
            return Err(Error::InvalidConfig(format!("retrieval.k1 must be >= 0, got {}", self.k1)));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(Error::InvalidConfig(format!("retrieval.b must be within [0, 1], got {}", self.b)));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_when_nothing_configured() {
        Jail::expect_with(|_| {
            let config = Config::load_from(Figment::new(), "none").expect("load");
            assert_eq!(config.retrieval().expect("retrieval"), RetrievalSettings::default());
            Ok(())
        });
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        Jail::expect_with(|_| {
            let overrides = Figment::from(Serialized::default("retrieval.chunk_size", 800));
            let settings = Config::load_from(overrides, "none").expect("load").retrieval().expect("retrieval");
            assert_eq!(settings.chunk_size, 800);
            assert_eq!(settings.default_limit, DEFAULT_SEARCH_LIMIT);
            assert_eq!(settings.k1, BM25_K1);
            Ok(())
        });
    }

    #[test]
    fn invalid_settings_rejected() {
        Jail::expect_with(|_| {
            let overrides = Figment::from(Serialized::default("retrieval.b", 1.5));
            assert!(Config::load_from(overrides, "none").is_err());
            Ok(())
        });

        let zero = RetrievalSettings { chunk_size: 0, ..RetrievalSettings::default() };
        assert!(matches!(zero.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn layers_files_env_then_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                "[data]\ndocs_dir = \"./kb\"\n[retrieval]\nchunk_size = 700\ndefault_limit = 3\nk1 = 1.2\n",
            )?;
            jail.create_file("config.test.toml", "[retrieval]\ndefault_limit = 9\n")?;
            jail.set_env("APP_RETRIEVAL__K1", "2.0");

            let config = Config::load_from(Figment::new(), "test").expect("load");
            let settings = config.retrieval().expect("retrieval");
            assert_eq!(settings.chunk_size, 700);
            assert_eq!(settings.default_limit, 9);
            assert_eq!(settings.k1, 2.0);
            assert_eq!(settings.b, BM25_B);
            assert_eq!(config.get::<String>("data.docs_dir").expect("docs_dir"), "./kb");

            let overrides = Figment::from(Serialized::default("retrieval.chunk_size", 250));
            let settings = Config::load_from(overrides, "test").expect("load").retrieval().expect("retrieval");
            assert_eq!(settings.chunk_size, 250);
            assert_eq!(settings.default_limit, 9);
            Ok(())
        });
    }
}
