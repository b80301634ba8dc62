//! Runtime configuration from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use crate::gemini::GeminiConfig;
use crate::haversine::DEFAULT_SPEED_KMH;
use crate::osrm::OsrmConfig;

#[derive(Debug, Clone)]
pub struct NavigatorConfig {
    /// Directory for [`FileStorage`](crate::storage::FileStorage).
    pub storage_dir: PathBuf,
    pub osrm: OsrmConfig,
    pub gemini: GeminiConfig,
    /// Average speed used for drive-time estimates.
    pub speed_kmh: f64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(".tacna-navigator"),
            osrm: OsrmConfig::default(),
            gemini: GeminiConfig::default(),
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl NavigatorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`, keeping defaults for unset keys and
    /// for values that fail to parse.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("TACNA_STORAGE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("TACNA_OSRM_URL") {
            config.osrm.base_url = url;
        }
        if let Some(profile) = lookup("TACNA_OSRM_PROFILE") {
            config.osrm.profile = profile;
        }
        parse_into(&lookup, "TACNA_OSRM_TIMEOUT_SECS", &mut config.osrm.timeout_secs);
        if let Some(url) = lookup("TACNA_GEMINI_URL") {
            config.gemini.base_url = url;
        }
        if let Some(model) = lookup("TACNA_GEMINI_MODEL") {
            config.gemini.model = model;
        }
        config.gemini.api_key = lookup("GEMINI_API_KEY").filter(|key| !key.trim().is_empty());
        parse_into(&lookup, "TACNA_GEMINI_TIMEOUT_SECS", &mut config.gemini.timeout_secs);
        parse_into(&lookup, "TACNA_SPEED_KMH", &mut config.speed_kmh);

        if config.speed_kmh <= 0.0 {
            warn!(speed_kmh = config.speed_kmh, "non-positive speed, using default");
            config.speed_kmh = DEFAULT_SPEED_KMH;
        }

        config
    }
}

fn parse_into<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => warn!(key, value = %raw, "ignoring malformed config value"),
    }
}
