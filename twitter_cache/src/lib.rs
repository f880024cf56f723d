mod api;
mod backend;
mod config;
mod entry;
mod error;
mod fetch;
mod key;
mod orchestrator;
#[cfg(test)]
mod test;

pub use crate::api::{Api, ErrorChannel, Pending};
pub use crate::backend::CacheBackend;
pub use crate::config::ApiConfig;
pub use crate::entry::{CacheEntry, Cacheable, Entity};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::fetch::Fetcher;
pub use crate::key::{CacheKey, EntityKind, Identifier};

pub use twitter_client::{ClientConfig, Credential, SearchResult, Status, TwitterClient, User};
