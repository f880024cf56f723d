use std::sync::Arc;

use twitter_client::{SearchResult, Status, User};

use crate::key::CacheKey;

/// A cached payload. Cloning an entry only clones the `Arc`, so every reader
/// of a key sees the same allocation until the key is overwritten.
#[derive(Debug, Clone)]
pub enum CacheEntry {
    Status(Arc<Status>),
    User(Arc<User>),
    SearchResult(Arc<SearchResult>),
    Users(Arc<Vec<Arc<User>>>),
    Statuses(Arc<Vec<Arc<Status>>>),
}

impl CacheEntry {
    /// Whether both entries point to the same cached allocation.
    pub fn ptr_eq(&self, other: &CacheEntry) -> bool {
        match (self, other) {
            (CacheEntry::Status(a), CacheEntry::Status(b)) => Arc::ptr_eq(a, b),
            (CacheEntry::User(a), CacheEntry::User(b)) => Arc::ptr_eq(a, b),
            (CacheEntry::SearchResult(a), CacheEntry::SearchResult(b)) => Arc::ptr_eq(a, b),
            (CacheEntry::Users(a), CacheEntry::Users(b)) => Arc::ptr_eq(a, b),
            (CacheEntry::Statuses(a), CacheEntry::Statuses(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Anything that can be stored in the cache.
pub trait Cacheable: Sized {
    fn into_entry(this: Arc<Self>) -> CacheEntry;
    fn from_entry(entry: CacheEntry) -> Option<Arc<Self>>;
}

/// A single entity with its own identity. An entity with id `0` carries
/// nothing to key it by and is never cached.
pub trait Entity: Cacheable {
    fn id(&self) -> u64;

    /// Every key the entity is stored under. The first one is the primary key.
    fn keys(&self) -> Vec<CacheKey>;

    fn is_valid(&self) -> bool {
        self.id() != 0
    }
}

macro_rules! impl_cacheable {
    ($ty:ty, $variant:ident) => {
        impl Cacheable for $ty {
            fn into_entry(this: Arc<Self>) -> CacheEntry {
                CacheEntry::$variant(this)
            }

            fn from_entry(entry: CacheEntry) -> Option<Arc<Self>> {
                match entry {
                    CacheEntry::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

impl_cacheable!(Status, Status);
impl_cacheable!(User, User);
impl_cacheable!(SearchResult, SearchResult);
impl_cacheable!(Vec<Arc<User>>, Users);
impl_cacheable!(Vec<Arc<Status>>, Statuses);

impl Entity for Status {
    fn id(&self) -> u64 {
        self.id
    }

    fn keys(&self) -> Vec<CacheKey> {
        vec![CacheKey::status(self.id)]
    }
}

impl Entity for User {
    fn id(&self) -> u64 {
        self.id
    }

    fn keys(&self) -> Vec<CacheKey> {
        let mut keys = vec![CacheKey::user(self.id)];
        if !self.screen_name.is_empty() {
            keys.push(CacheKey::user_by_screen_name(&self.screen_name));
        }
        keys
    }
}

impl Entity for SearchResult {
    fn id(&self) -> u64 {
        self.id
    }

    fn keys(&self) -> Vec<CacheKey> {
        vec![CacheKey::search_result(self.id)]
    }
}
