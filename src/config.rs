//! Runtime settings: environment first (a `.env` file is honoured), plus an optional YAML
//! file for catalog presentation.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::catalog::session::{Paging, DISPLAY_STEP, INITIAL_DISPLAY_LIMIT};
use crate::catalog::view::{ViewConfig, DEFAULT_BEER_IMAGE, DEFAULT_BREWERY_IMAGE};
use crate::data::country::{CountryDirectory, CountryInfo};

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_SOURCE: &str = "beer_data.xlsx";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Contents of the optional YAML file named by `BEERLIST_CONFIG`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub page_size: Option<usize>,
    pub page_step: Option<usize>,
    pub countries: BTreeMap<String, CountryInfo>,
    pub default_beer_image: Option<String>,
    pub default_brewery_image: Option<String>,
}

impl FileConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
            path: display,
            source,
        })
    }

    pub fn view_config(&self) -> Result<ViewConfig, ConfigError> {
        let initial = self.page_size.unwrap_or(INITIAL_DISPLAY_LIMIT);
        let step = self.page_step.unwrap_or(DISPLAY_STEP);
        if initial == 0 {
            return Err(ConfigError::Invalid {
                key: "page_size",
                message: "must be at least 1".to_string(),
            });
        }
        if step == 0 {
            return Err(ConfigError::Invalid {
                key: "page_step",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(ViewConfig {
            paging: Paging { initial, step },
            countries: CountryDirectory::default().merged(&self.countries),
            default_beer_image: self
                .default_beer_image
                .clone()
                .unwrap_or_else(|| DEFAULT_BEER_IMAGE.to_string()),
            default_brewery_image: self
                .default_brewery_image
                .clone()
                .unwrap_or_else(|| DEFAULT_BREWERY_IMAGE.to_string()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: String,
    pub source: String,
    /// Admin routes are disabled (403) when unset.
    pub admin_token: Option<String>,
    pub view: ViewConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            source: DEFAULT_SOURCE.to_string(),
            admin_token: None,
            view: ViewConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let view = match non_empty("BEERLIST_CONFIG") {
            Some(path) => FileConfig::load(path)?.view_config()?,
            None => ViewConfig::default(),
        };
        Ok(Self {
            bind: non_empty("BEERLIST_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            source: non_empty("BEERLIST_SOURCE").unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            admin_token: non_empty("BEERLIST_ADMIN_TOKEN"),
            view,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let cfg = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.bind, DEFAULT_BIND);
        assert_eq!(cfg.source, DEFAULT_SOURCE);
        assert!(cfg.admin_token.is_none());
        assert_eq!(cfg.view.paging, Paging::default());
    }

    #[test]
    fn blank_token_counts_as_unset() {
        let cfg = AppConfig::from_lookup(|k| match k {
            "BEERLIST_ADMIN_TOKEN" => Some("  ".to_string()),
            "BEERLIST_SOURCE" => Some("stock.csv".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(cfg.admin_token.is_none());
        assert_eq!(cfg.source, "stock.csv");
    }

    #[test]
    fn yaml_file_overrides_paging_and_countries() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "page_size: 20\ncountries:\n  Japan:\n    local_name: にっぽん\n  Norway:\n    local_name: ノルウェー\n"
        )
        .unwrap();
        let path = file.path().display().to_string();
        let cfg = AppConfig::from_lookup(|k| (k == "BEERLIST_CONFIG").then(|| path.clone())).unwrap();
        assert_eq!(cfg.view.paging.initial, 20);
        assert_eq!(cfg.view.paging.step, DISPLAY_STEP);
        assert_eq!(cfg.view.countries.local_name("Japan"), "にっぽん");
        assert!(cfg.view.countries.flag_url("Japan").is_some());
        assert_eq!(cfg.view.countries.local_name("Norway"), "ノルウェー");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let file = FileConfig {
            page_size: Some(0),
            ..FileConfig::default()
        };
        assert!(matches!(
            file.view_config(),
            Err(ConfigError::Invalid { key: "page_size", .. })
        ));
    }
}
