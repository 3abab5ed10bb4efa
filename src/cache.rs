use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};

use crate::paths::cache_dir_path;

const MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Best-effort page cache: one file per fetched page, keyed by page kind and
/// a hash of the request key, refreshed after a day. Continuation tokens run
/// to hundreds of characters, hence the hash instead of the key itself.
pub(crate) struct PageCache {
    dir: PathBuf,
    max_age: Duration,
}

impl PageCache {
    pub(crate) fn open() -> Result<Self> {
        Self::open_at(cache_dir_path()?, MAX_AGE)
    }

    pub(crate) fn open_at(dir: PathBuf, max_age: Duration) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create cache directory {}", dir.display()))?;
        Ok(Self { dir, max_age })
    }

    fn entry_path(&self, kind: &str, key: &str) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        self.dir.join(format!("{kind}-{:016x}", hasher.finish()))
    }

    /// An entry that cannot be read, or one older than `max_age`, is a miss.
    pub(crate) fn load(&self, kind: &str, key: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(kind, key);
        let modified = fs::metadata(&path).ok()?.modified().ok()?;
        let age = SystemTime::now().duration_since(modified).ok()?;
        if age > self.max_age {
            return None;
        }
        fs::read(&path).ok()
    }

    pub(crate) fn store(&self, kind: &str, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.entry_path(kind, key);
        fs::write(&path, bytes)
            .with_context(|| format!("failed to write cache entry {}", path.display()))
    }
}
