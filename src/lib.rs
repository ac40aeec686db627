//! Resolve MAC addresses to their registered manufacturer using a local,
//! reduced copy of the IEEE OUI registry.
//!
//! ```ignore
//! use mac_vendor::{CacheStore, Config, Resolver};
//!
//! let config = Config::from_env();
//! let mut resolver = Resolver::new(CacheStore::from_config(&config));
//! println!("{}", resolver.lookup("00:00:0c:11:22:33")?);
//! ```

#[macro_use]
extern crate error_chain;

pub mod address;
pub mod batch;
pub mod compact;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod resolver;
pub mod store;
pub mod update;

pub use address::{normalize, NormalizedAddress};
pub use compact::compact;
pub use config::Config;
pub use errors::{Error, ErrorKind, Result, ResultExt};
pub use fetch::{HttpFetcher, RegistrySource};
pub use resolver::Resolver;
pub use store::{CacheState, CacheStore};
pub use update::download_and_persist;
