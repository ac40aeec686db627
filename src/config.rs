use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const OUI_URL: &str = "https://standards-oui.ieee.org/oui.txt";
pub const CACHE_FILE_NAME: &str = "mac-vendors.txt";

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Where the registry comes from and where its reduced copy lives.
#[derive(Debug, Clone)]
pub struct Config {
    pub registry_url: String,
    /// Written on every update and checked first on load.
    pub cache_path: PathBuf,
    /// Checked in order when `cache_path` does not exist.
    pub fallback_paths: Vec<PathBuf>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            registry_url: OUI_URL.to_string(),
            cache_path: Path::new(".").join(CACHE_FILE_NAME),
            fallback_paths: default_fallback_paths(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Defaults with the transport timeouts taken from the environment.
    ///
    /// Registry URL and cache location are left to the caller; the binary
    /// reads them from its own flags (`MAC_VENDOR_URL`, `MAC_VENDOR_CACHE`).
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Some(secs) = env_secs("MAC_VENDOR_TIMEOUT_SECS") {
            config.timeout = secs;
        }
        if let Some(secs) = env_secs("MAC_VENDOR_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout = secs;
        }

        config
    }

    /// A config that only ever touches `cache_path`.
    pub fn with_cache_path<P: Into<PathBuf>>(cache_path: P) -> Self {
        Config {
            cache_path: cache_path.into(),
            fallback_paths: Vec::new(),
            ..Config::default()
        }
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// `<prefix>/cache/mac-vendors.txt`, where the prefix is the directory above
/// the one holding the executable, then the per-user cache directory.
fn default_fallback_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    let prefix = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().and_then(Path::parent).map(Path::to_path_buf));
    if let Some(prefix) = prefix {
        paths.push(prefix.join("cache").join(CACHE_FILE_NAME));
    }

    if let Some(cache_dir) = dirs::cache_dir() {
        paths.push(cache_dir.join("mac-vendor").join(CACHE_FILE_NAME));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cache_is_in_working_dir() {
        let config = Config::default();
        assert_eq!(config.cache_path, Path::new("./mac-vendors.txt"));
        assert_eq!(config.registry_url, OUI_URL);
        assert!(config.fallback_paths.iter().all(|p| p.ends_with(CACHE_FILE_NAME)));
    }

    #[test]
    fn with_cache_path_has_no_fallbacks() {
        let config = Config::with_cache_path("/tmp/vendors.txt");
        assert_eq!(config.cache_path, Path::new("/tmp/vendors.txt"));
        assert!(config.fallback_paths.is_empty());
    }
}
