use crate::compact::compact;
use crate::errors::*;
use crate::fetch::RegistrySource;
use crate::store::CacheStore;
use tracing::info;

/// Fetches the registry from `url` and rewrites the cache from it.
///
/// A failed fetch leaves any existing cache as it was. Returns the number
/// of records written.
pub fn download_and_persist<S>(source: &S, url: &str, store: &CacheStore) -> Result<usize>
where
    S: RegistrySource + ?Sized,
{
    let doc = source.fetch(url)?;
    let count = store.persist(compact(&doc))?;
    info!(records = count, path = %store.primary_path().display(), "Updated vendor cache");
    Ok(count)
}
