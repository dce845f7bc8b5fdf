//! Configuration loading and resolution.
//!
//! Every fetch operation takes a `FetchConfig` explicitly, so changes to the
//! environment take effect on the next call.

use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;

/// Environment variable naming the raw data directory.
pub const RAW_DATA_DIR_ENV: &str = "PROCUREMENT_RAW_DATA_DIR";

/// Environment variable holding the SAM.gov API key.
pub const SAM_API_KEY_ENV: &str = "SAM_API_KEY";

pub const DEFAULT_AWARD_BASE_URL: &str = "https://api.usaspending.gov/api/v2/recipient/children";
pub const DEFAULT_CAPABILITY_BASE_URL: &str = "https://certify.sba.gov/capabilities";
pub const DEFAULT_ENTITY_BASE_URL: &str = "https://api.sam.gov/entity-information/v2/entities";

/// Desktop Chrome; the capability pages reject unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/110.0.0.0 Safari/537.36";

/// Notice shown on capability pages of firms without an uploaded statement.
/// Both "no capability statement" and "no capabilities statement" occur.
pub const DEFAULT_NO_DOCUMENT_PATTERN: &str = r"(?i)no\s+capabilit(?:y|ies)\s+statement";

/// Runtime settings shared by all fetchers.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Root under which `raw_award_data/`, `raw_pdfs/` and `raw_uei_data/` live.
    pub raw_data_dir: PathBuf,
    pub award_base_url: String,
    pub capability_base_url: String,
    pub entity_base_url: String,
    pub user_agent: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Searched for in capability page bodies that carry no PDF payload.
    pub no_document_pattern: Regex,
}

impl FetchConfig {
    /// Production endpoints rooted at `raw_data_dir`.
    pub fn new(raw_data_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_data_dir: raw_data_dir.into(),
            award_base_url: DEFAULT_AWARD_BASE_URL.to_string(),
            capability_base_url: DEFAULT_CAPABILITY_BASE_URL.to_string(),
            entity_base_url: DEFAULT_ENTITY_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            no_document_pattern: default_no_document_pattern(),
        }
    }

    /// Resolve the data directory from `explicit`, then the environment.
    pub fn from_env(explicit: Option<&str>) -> Self {
        Self::new(resolve_raw_data_dir(explicit))
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn award_dir(&self) -> PathBuf {
        self.raw_data_dir.join("raw_award_data")
    }

    pub fn pdf_dir(&self) -> PathBuf {
        self.raw_data_dir.join("raw_pdfs")
    }

    pub fn entity_dir(&self) -> PathBuf {
        self.raw_data_dir.join("raw_uei_data")
    }

    /// Where `fetch_entities` saves the SAM snapshot.
    pub fn entity_snapshot_path(&self) -> PathBuf {
        self.entity_dir().join("sam_data.json")
    }
}

fn default_no_document_pattern() -> Regex {
    Regex::new(DEFAULT_NO_DOCUMENT_PATTERN).expect("static pattern is valid")
}

/// Resolve the raw data directory.
pub fn resolve_raw_data_dir(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(RAW_DATA_DIR_ENV) {
        if !env_path.trim().is_empty() {
            return PathBuf::from(env_path);
        }
    }

    Path::new("data").join("raw")
}

/// Resolve the SAM.gov API key, read at call time.
pub fn resolve_sam_api_key(explicit: Option<&str>) -> Option<String> {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(SAM_API_KEY_ENV).ok())
        .filter(|k| !k.trim().is_empty())
}
