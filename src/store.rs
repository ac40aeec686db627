use crate::config::Config;
use crate::errors::*;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Readiness of the in-memory vendor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Uninitialized,
    Loading,
    Ready,
    /// The cache file was malformed. Only an explicit `load()` leaves this state.
    Failed,
}

/// The on-disk vendor cache and the table loaded from it.
///
/// Records are stored one per line as `prefix:vendor`. Updates always go to
/// the primary path; reads use the first candidate path that exists.
pub struct CacheStore {
    primary: PathBuf,
    fallbacks: Vec<PathBuf>,
    table: HashMap<String, String>,
    state: CacheState,
    corrupt_at: Option<(PathBuf, usize)>,
    loads: usize,
}

impl CacheStore {
    pub fn new<P: Into<PathBuf>>(primary: P, fallbacks: Vec<PathBuf>) -> Self {
        CacheStore {
            primary: primary.into(),
            fallbacks,
            table: HashMap::new(),
            state: CacheState::Uninitialized,
            corrupt_at: None,
            loads: 0,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        CacheStore::new(config.cache_path.clone(), config.fallback_paths.clone())
    }

    pub fn primary_path(&self) -> &Path {
        &self.primary
    }

    /// Primary path first, then the fallbacks in order.
    pub fn candidates(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.primary.as_path()).chain(self.fallbacks.iter().map(PathBuf::as_path))
    }

    pub fn resolve_path(&self) -> Option<&Path> {
        self.candidates().find(|p| p.is_file())
    }

    pub fn exists(&self) -> bool {
        self.resolve_path().is_some()
    }

    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        let path = self.resolve_path()?;
        let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
        Some(DateTime::from(modified))
    }

    /// Replaces the primary cache file with `records`.
    ///
    /// Records are streamed into a temporary file next to the cache, which is
    /// then renamed over it, so readers see either the old or the new cache.
    /// Returns the number of records written.
    pub fn persist<I, P, V>(&self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = (P, V)>,
        P: fmt::Display,
        V: fmt::Display,
    {
        let dir = match self.primary.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)
            .chain_err(|| format!("Failed to create cache directory {}", dir.display()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .chain_err(|| "Failed to create temp file")?;

        let mut count = 0;
        {
            let mut out = BufWriter::new(&mut tmp);
            for (prefix, vendor) in records {
                writeln!(out, "{}:{}", prefix, vendor)
                    .chain_err(|| "Failed to write vendor cache")?;
                count += 1;
            }
            out.flush().chain_err(|| "Failed to write vendor cache")?;
        }

        if let Ok(meta) = fs::metadata(&self.primary) {
            fs::set_permissions(tmp.path(), meta.permissions())
                .chain_err(|| "Failed to set permissions")?;
        }

        tmp.persist(&self.primary)
            .map_err(|e| e.error)
            .chain_err(|| format!("Failed to replace vendor cache {}", self.primary.display()))?;

        debug!(path = %self.primary.display(), records = count, "Wrote vendor cache");
        Ok(count)
    }

    /// Reads the resolved cache file into the table, replacing its contents.
    pub fn load(&mut self) -> Result<()> {
        let path = match self.resolve_path() {
            Some(path) => path.to_path_buf(),
            None => {
                self.table.clear();
                self.corrupt_at = None;
                self.state = CacheState::Uninitialized;
                bail!(ErrorKind::CacheMissing(self.describe_candidates()))
            }
        };

        debug!(path = %path.display(), "Loading prefixes into memory");
        self.state = CacheState::Loading;
        self.loads += 1;

        match read_table(&path) {
            Ok(table) => {
                debug!(prefixes = table.len(), "Loaded vendor cache");
                self.table = table;
                self.corrupt_at = None;
                self.state = CacheState::Ready;
                Ok(())
            }
            Err(e) => {
                self.table.clear();
                self.state = match *e.kind() {
                    ErrorKind::CacheCorrupt(_, line) => {
                        self.corrupt_at = Some((path, line));
                        CacheState::Failed
                    }
                    _ => CacheState::Uninitialized,
                };
                Err(e)
            }
        }
    }

    /// Loads the table unless that already happened.
    pub fn ensure_loaded(&mut self) -> Result<()> {
        match self.state {
            CacheState::Ready => Ok(()),
            CacheState::Failed => {
                let (path, line) = self.corrupt_at.clone().unwrap_or_default();
                bail!(ErrorKind::CacheCorrupt(path.display().to_string(), line))
            }
            CacheState::Uninitialized | CacheState::Loading => self.load(),
        }
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.table.get(prefix).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    /// How many times the cache file has been read.
    pub fn load_count(&self) -> usize {
        self.loads
    }

    fn describe_candidates(&self) -> String {
        self.candidates()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn read_table(path: &Path) -> Result<HashMap<String, String>> {
    let file = File::open(path)
        .chain_err(|| format!("Failed to open vendor cache {}", path.display()))?;

    let mut table = HashMap::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.chain_err(|| "Failed to read vendor cache line")?;
        let (prefix, vendor) = line.split_once(':')
            .ok_or_else(|| ErrorKind::CacheCorrupt(path.display().to_string(), idx + 1))?;
        table.insert(prefix.to_string(), vendor.to_string());
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> CacheStore {
        CacheStore::new(dir.path().join("mac-vendors.txt"), Vec::new())
    }

    #[test]
    fn persist_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let records = vec![("00000C", "CISCO SYSTEMS, INC."), ("001B63", "Apple, Inc.")];

        assert_eq!(store.persist(records.clone()).unwrap(), 2);
        store.load().unwrap();

        assert_eq!(store.len(), records.len());
        for (prefix, vendor) in records {
            assert_eq!(store.get(prefix), Some(vendor));
        }
    }

    #[test]
    fn persisted_file_format() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.persist(vec![("ABCDEF", "First"), ("ABCDEF", "Second")]).unwrap();

        let contents = fs::read_to_string(store.primary_path()).unwrap();
        assert_eq!(contents, "ABCDEF:First\nABCDEF:Second\n");
    }

    #[test]
    fn later_duplicate_wins() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.persist(vec![("ABCDEF", "First"), ("ABCDEF", "Second")]).unwrap();
        store.load().unwrap();
        assert_eq!(store.get("ABCDEF"), Some("Second"));
    }

    #[test]
    fn persist_replaces_old_contents() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.persist(vec![("111111", "Old")]).unwrap();
        store.persist(vec![("222222", "New")]).unwrap();
        store.load().unwrap();

        assert_eq!(store.get("111111"), None);
        assert_eq!(store.get("222222"), Some("New"));
    }

    #[test]
    fn vendor_keeps_extra_colons() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        fs::write(store.primary_path(), "ABCDEF:Vendor: Subsidiary\n").unwrap();
        store.load().unwrap();
        assert_eq!(store.get("ABCDEF"), Some("Vendor: Subsidiary"));
    }

    #[test]
    fn missing_separator_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        fs::write(store.primary_path(), "00000C:CISCO\nno separator here\n").unwrap();

        let err = store.load().unwrap_err();
        match *err.kind() {
            ErrorKind::CacheCorrupt(_, line) => assert_eq!(line, 2),
            ref other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(store.state(), CacheState::Failed);
        assert!(store.is_empty());

        // Stays failed without touching the file again.
        assert!(store.ensure_loaded().is_err());
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn ensure_loaded_reads_once() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.persist(vec![("00000C", "CISCO")]).unwrap();

        assert_eq!(store.state(), CacheState::Uninitialized);
        store.ensure_loaded().unwrap();
        store.ensure_loaded().unwrap();
        assert_eq!(store.load_count(), 1);
        assert_eq!(store.state(), CacheState::Ready);

        store.load().unwrap();
        assert_eq!(store.load_count(), 2);
    }

    #[test]
    fn missing_cache() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        assert!(!store.exists());
        assert!(store.last_updated().is_none());
        match *store.ensure_loaded().unwrap_err().kind() {
            ErrorKind::CacheMissing(_) => {}
            ref other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(store.state(), CacheState::Uninitialized);
        assert_eq!(store.load_count(), 0);
    }

    #[test]
    fn reload_after_cache_removed_drops_table() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.persist(vec![("00000C", "CISCO")]).unwrap();
        store.load().unwrap();
        assert_eq!(store.state(), CacheState::Ready);

        fs::remove_file(store.primary_path()).unwrap();
        match *store.load().unwrap_err().kind() {
            ErrorKind::CacheMissing(_) => {}
            ref other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(store.state(), CacheState::Uninitialized);
        assert!(store.is_empty());
        assert_eq!(store.get("00000C"), None);
        assert!(store.ensure_loaded().is_err());
    }

    #[test]
    fn falls_back_when_primary_absent() {
        let dir = TempDir::new().unwrap();
        let fallback = dir.path().join("cache").join("mac-vendors.txt");
        fs::create_dir_all(fallback.parent().unwrap()).unwrap();
        fs::write(&fallback, "00000C:CISCO\n").unwrap();

        let mut store = CacheStore::new(dir.path().join("mac-vendors.txt"), vec![fallback.clone()]);
        assert_eq!(store.resolve_path(), Some(fallback.as_path()));
        assert!(store.last_updated().is_some());
        store.ensure_loaded().unwrap();
        assert_eq!(store.get("00000C"), Some("CISCO"));

        // Once written, the primary path shadows the fallback.
        store.persist(vec![("00000C", "Primary")]).unwrap();
        assert_eq!(store.resolve_path(), Some(store.primary_path()));
    }

    #[test]
    fn persist_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path().join("a").join("b").join("mac-vendors.txt"), Vec::new());
        store.persist(vec![("00000C", "CISCO")]).unwrap();
        assert!(store.exists());
    }
}
