use crate::address::{normalize, NormalizedAddress};
use crate::errors::*;
use crate::store::{CacheState, CacheStore};
use eui48::MacAddress;

/// Answers "who made this MAC" from a vendor cache.
///
/// The cache is read on the first lookup and kept in memory afterwards.
pub struct Resolver {
    store: CacheStore,
}

impl Resolver {
    pub fn new(store: CacheStore) -> Self {
        Resolver { store }
    }

    pub fn lookup(&mut self, raw: &str) -> Result<String> {
        let mac = normalize(raw)?;
        self.lookup_normalized(&mac)
    }

    pub fn lookup_mac(&mut self, mac: MacAddress) -> Result<String> {
        self.lookup_normalized(&NormalizedAddress::from(mac))
    }

    pub fn lookup_normalized(&mut self, mac: &NormalizedAddress) -> Result<String> {
        self.store.ensure_loaded()?;

        mac.prefix()
            .and_then(|prefix| self.store.get(prefix))
            .map(str::to_string)
            .ok_or_else(|| ErrorKind::VendorNotFound(mac.to_string()).into())
    }

    pub fn state(&self) -> CacheState {
        self.store.state()
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }
}
