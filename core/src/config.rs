use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use dirs::home_dir;
use serde::Deserialize;

use crate::error::Result;
use crate::error::SelectError;

pub const DEFAULT_QUIET_MILLIS: u64 = 200;
pub const DEFAULT_CACHE_CAPACITY: usize = 20;
pub const DEFAULT_LOOKAHEAD: usize = 20;
pub const DEFAULT_BLUR_DELAY_MILLIS: u64 = 300;

/// Widget configuration, usually read from `~/.rapid-select/config.toml`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SelectConfig {
    /// Prefix the url-encoded query text is appended to. Required.
    #[serde(default)]
    pub endpoint: String,

    /// Keep every chosen option instead of replacing the selection.
    #[serde(default)]
    pub multi: bool,

    /// Reserved. Focusing the input does not search yet.
    #[serde(default)]
    pub search_on_focus: bool,

    #[serde(default)]
    pub placeholder: String,

    /// Debounce window for typed input.
    #[serde(default = "default_quiet_millis")]
    pub quiet_millis: u64,

    /// Serve repeated queries from the in-memory LRU.
    #[serde(default = "default_true")]
    pub cache: bool,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// How close the cursor may get to the end of the loaded results before
    /// the next page is requested.
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,

    /// Delay between losing focus and closing the result list, so a click on
    /// an option still lands.
    #[serde(default = "default_blur_delay_millis")]
    pub blur_delay_millis: u64,

    /// Unset means a request may stay pending forever.
    #[serde(default)]
    pub request_timeout_millis: Option<u64>,

    /// Response field holding the option array.
    #[serde(default = "default_results_key")]
    pub results_key: String,

    /// Response field that is truthy while more pages exist.
    #[serde(default = "default_more_key")]
    pub more_key: String,

    /// Extra option field shown next to the name by renderers.
    #[serde(default)]
    pub detail_key: Option<String>,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            multi: false,
            search_on_focus: false,
            placeholder: String::new(),
            quiet_millis: DEFAULT_QUIET_MILLIS,
            cache: true,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            lookahead: DEFAULT_LOOKAHEAD,
            blur_delay_millis: DEFAULT_BLUR_DELAY_MILLIS,
            request_timeout_millis: None,
            results_key: default_results_key(),
            more_key: default_more_key(),
            detail_key: None,
        }
    }
}

/// Optional overrides for user configuration (e.g., from CLI flags).
#[derive(Default, Debug, Clone)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub multi: Option<bool>,
    pub placeholder: Option<String>,
    pub quiet_millis: Option<u64>,
    pub cache: Option<bool>,
}

impl SelectConfig {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let cfg: SelectConfig = toml::from_str(contents)?;
        Ok(cfg)
    }

    /// Load from `path` (or the default config file when `None`), merge any
    /// already-parsed `-c` overrides in `toml_overrides`, then apply the typed
    /// `overrides` (highest precedence) and validate the result. A missing
    /// file is not an error.
    pub fn load_with_overrides(
        path: Option<&Path>,
        toml_overrides: Option<toml::Table>,
        overrides: ConfigOverrides,
    ) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_file()?,
        };
        let mut table = match std::fs::read_to_string(&path) {
            Ok(contents) => contents.parse::<toml::Table>()?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => toml::Table::new(),
            Err(err) => return Err(err.into()),
        };
        if let Some(extra) = toml_overrides {
            merge_tables(&mut table, extra);
        }

        let mut cfg: SelectConfig = toml::Value::Table(table).try_into()?;
        cfg.apply(overrides);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply(&mut self, overrides: ConfigOverrides) {
        let ConfigOverrides {
            endpoint,
            multi,
            placeholder,
            quiet_millis,
            cache,
        } = overrides;
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        if let Some(multi) = multi {
            self.multi = multi;
        }
        if let Some(placeholder) = placeholder {
            self.placeholder = placeholder;
        }
        if let Some(quiet_millis) = quiet_millis {
            self.quiet_millis = quiet_millis;
        }
        if let Some(cache) = cache {
            self.cache = cache;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(SelectError::Config("`endpoint` is required".to_string()));
        }
        if self.cache_capacity == 0 {
            return Err(SelectError::Config(
                "`cache_capacity` must be at least 1".to_string(),
            ));
        }
        if self.lookahead == 0 {
            return Err(SelectError::Config(
                "`lookahead` must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_millis)
    }

    pub fn blur_delay(&self) -> Duration {
        Duration::from_millis(self.blur_delay_millis)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_millis.map(Duration::from_millis)
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_quiet_millis() -> u64 {
    DEFAULT_QUIET_MILLIS
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_lookahead() -> usize {
    DEFAULT_LOOKAHEAD
}

fn default_blur_delay_millis() -> u64 {
    DEFAULT_BLUR_DELAY_MILLIS
}

fn default_results_key() -> String {
    "results".to_string()
}

fn default_more_key() -> String {
    "more".to_string()
}

/// Returns the path to the configuration directory, which is `~/.rapid-select`.
/// Does not verify that the directory exists.
pub fn config_dir() -> std::io::Result<PathBuf> {
    let mut p = home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not find home directory",
        )
    })?;
    p.push(".rapid-select");
    Ok(p)
}

pub fn config_file() -> std::io::Result<PathBuf> {
    let mut p = config_dir()?;
    p.push("config.toml");
    Ok(p)
}

/// Returns the path to the folder where logs are stored. Does not verify
/// that the directory exists.
pub fn log_dir() -> std::io::Result<PathBuf> {
    let mut p = config_dir()?;
    p.push("log");
    Ok(p)
}
