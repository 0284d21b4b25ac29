use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, error};

use crate::error::{ConfigError, Result};
use crate::summary::provider::{DEFAULT_API_URL, DEFAULT_MODEL};

pub const DEFAULT_MAX_ITEMS: usize = 15;
pub const DEFAULT_LANGUAGE: &str = "english";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Parameters as they arrive from the command line. `None` means the flag
/// was not given and the stored value (or default) applies.
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub api_key: Option<String>,
    pub rss_url: Option<String>,
    pub max_items: Option<usize>,
    pub language: Option<String>,
    pub model: String,
    pub api_url: String,
    pub timeout: u64,
    pub prompt: Option<String>,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            api_key: None,
            rss_url: None,
            max_items: None,
            language: None,
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
            prompt: None,
        }
    }
}

/// The durable mirror of the resolvable parameters. This is the only state
/// the tool persists between runs. Defaults are never written here, so a
/// stored file only ever contains values the user passed explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rss_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Durable fallback storage for run parameters.
pub trait ParamStore {
    /// Read the stored parameters; an absent store reads as empty.
    fn load(&self) -> Result<StoredParams>;

    /// Replace the stored parameters.
    fn save(&self, params: &StoredParams) -> Result<()>;

    /// Remove all stored parameters.
    fn clear(&self) -> Result<()>;
}

/// TOML-file parameter store under the platform config directory.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn open_default() -> Result<Self> {
        Ok(Self {
            path: Self::default_path()?,
        })
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("rss-digest").join("params.toml"))
            .ok_or_else(|| ConfigError::Config("Could not determine config directory".to_string()))
    }
}

impl ParamStore for FileStore {
    fn load(&self) -> Result<StoredParams> {
        if !self.path.exists() {
            return Ok(StoredParams::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let params: StoredParams = toml::from_str(&content)?;
        Ok(params)
    }

    fn save(&self, params: &StoredParams) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(params)?;

        // Write-then-rename so a crash never leaves a half-written store.
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!("Saved parameters to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-memory parameter store. Useful for tests and embedded use where no
/// file should be touched.
#[derive(Default)]
pub struct MemoryStore {
    params: Mutex<StoredParams>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: StoredParams) -> Self {
        Self {
            params: Mutex::new(params),
        }
    }

    pub fn snapshot(&self) -> StoredParams {
        self.params.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl ParamStore for MemoryStore {
    fn load(&self) -> Result<StoredParams> {
        Ok(self.snapshot())
    }

    fn save(&self, params: &StoredParams) -> Result<()> {
        *self.params.lock().unwrap_or_else(|e| e.into_inner()) = params.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.save(&StoredParams::default())
    }
}

/// Fully resolved parameters for one digest run. Immutable once built.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub api_key: String,
    pub rss_url: String,
    pub max_items: usize,
    pub language: String,
    pub model: String,
    pub api_url: String,
    pub timeout: u64,
    pub prompt: Option<String>,
}

impl RunConfig {
    /// Resolve the run parameters against the store.
    ///
    /// An explicitly passed value wins and is written back to the store;
    /// otherwise the stored value applies; `max_items` and `language` fall
    /// back to defaults. Defaults are not persisted. A missing api key or
    /// feed URL fails resolution here, before any network activity, and the
    /// error names every missing parameter.
    pub fn resolve(args: &RunArgs, store: &dyn ParamStore) -> Result<Self> {
        let stored = store.load()?;
        let mut merged = stored.clone();

        if args.api_key.is_some() {
            merged.api_key = args.api_key.clone();
        }
        if args.rss_url.is_some() {
            merged.rss_url = args.rss_url.clone();
        }
        if args.max_items.is_some() {
            merged.max_items = args.max_items;
        }
        if args.language.is_some() {
            merged.language = args.language.clone();
        }

        if merged != stored {
            store.save(&merged)?;
        }

        let mut missing = Vec::new();
        if merged.api_key.as_deref().map_or(true, |v| v.trim().is_empty()) {
            missing.push("api-key");
        }
        if merged.rss_url.as_deref().map_or(true, |v| v.trim().is_empty()) {
            missing.push("rss-url");
        }
        if !missing.is_empty() {
            for name in &missing {
                error!("Missing required parameter: {}", name);
            }
            return Err(ConfigError::Config(format!(
                "Missing required parameters: {}",
                missing.join(", ")
            )));
        }

        let max_items = merged.max_items.unwrap_or(DEFAULT_MAX_ITEMS);
        if max_items == 0 {
            return Err(ConfigError::Config(
                "max-items must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            api_key: merged.api_key.unwrap_or_default(),
            rss_url: merged.rss_url.unwrap_or_default(),
            max_items,
            language: merged
                .language
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            model: args.model.clone(),
            api_url: args.api_url.clone(),
            timeout: args.timeout,
            prompt: args.prompt.clone(),
        })
    }
}
