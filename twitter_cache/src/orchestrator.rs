// Cache-check, fetch, populate. Every logical request goes through here.
//
// 1. Build the key and serve it from the cache if present.
// 2. On a miss, ask the fetcher.
// 3. Store the fetched entity under its keys, then cross-populate the entity
//    it embeds (status <-> user), unless that one has no id. A derived copy
//    never replaces an entry that is already cached.
// 4. Failures go to the error channel and leave the cache untouched.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};

use twitter_client::{SearchResult, Status, User};

use crate::backend::CacheBackend;
use crate::entry::{CacheEntry, Cacheable, Entity};
use crate::error::Error;
use crate::fetch::Fetcher;
use crate::key::CacheKey;

pub(crate) struct Orchestrator<F> {
    pub(crate) fetcher: Arc<F>,
    pub(crate) cache: Arc<CacheBackend>,
    pub(crate) errors: mpsc::Sender<Error>,
    pub(crate) cache_lists: bool,
}

impl<F> Clone for Orchestrator<F> {
    fn clone(&self) -> Self {
        Orchestrator {
            fetcher: self.fetcher.clone(),
            cache: self.cache.clone(),
            errors: self.errors.clone(),
            cache_lists: self.cache_lists,
        }
    }
}

// MARK: Logical requests

impl<F: Fetcher> Orchestrator<F> {
    pub(crate) async fn status(&self, id: u64) -> Option<Arc<Status>> {
        if let Some(status) = self.cached(&CacheKey::status(id)).await {
            return Some(status);
        }
        match self.fetcher.fetch_status(id).await {
            Ok(status) => Some(self.store_status(status).await),
            Err(e) => {
                self.report(format!("status {}", id), e);
                None
            }
        }
    }

    pub(crate) async fn user(&self, screen_name: &str) -> Option<Arc<User>> {
        if let Some(user) = self.cached(&CacheKey::user_by_screen_name(screen_name)).await {
            return Some(user);
        }
        match self.fetcher.fetch_user(screen_name).await {
            Ok(user) => Some(self.store_user(user).await),
            Err(e) => {
                self.report(format!("user @{}", screen_name), e);
                None
            }
        }
    }

    pub(crate) async fn user_by_id(&self, id: u64) -> Option<Arc<User>> {
        if let Some(user) = self.cached(&CacheKey::user(id)).await {
            return Some(user);
        }
        match self.fetcher.fetch_user_by_id(id).await {
            Ok(user) => Some(self.store_user(user).await),
            Err(e) => {
                self.report(format!("user {}", id), e);
                None
            }
        }
    }

    pub(crate) async fn followers(&self, screen_name: &str, cursor: i64) -> Vec<Arc<User>> {
        let key = CacheKey::followers(screen_name, cursor);
        if let Some(users) = self.cached_list(&key).await {
            return users;
        }
        let users = match self.fetcher.fetch_followers(screen_name, cursor).await {
            Ok(users) => users,
            Err(e) => {
                self.report(format!("followers of @{}", screen_name), e);
                return Vec::new();
            }
        };
        let users = self.resolve_users(users).await;
        self.store_list(key, &users).await;
        users
    }

    pub(crate) async fn friends(&self, screen_name: &str, cursor: i64) -> Vec<Arc<User>> {
        let key = CacheKey::friends(screen_name, cursor);
        if let Some(users) = self.cached_list(&key).await {
            return users;
        }
        let users = match self.fetcher.fetch_friends(screen_name, cursor).await {
            Ok(users) => users,
            Err(e) => {
                self.report(format!("friends of @{}", screen_name), e);
                return Vec::new();
            }
        };
        let users = self.resolve_users(users).await;
        self.store_list(key, &users).await;
        users
    }

    /// Results are cached one by one. They embed nothing, so there is nothing to cross-populate.
    pub(crate) async fn search(&self, query: &str) -> Vec<Arc<SearchResult>> {
        let results = match self.fetcher.search_simple(query).await {
            Ok(results) => results,
            Err(e) => {
                self.report(format!("search {:?}", query), e);
                return Vec::new();
            }
        };
        let mut resolved = Vec::with_capacity(results.len());
        for result in results {
            resolved.push(self.resolve_search_result(result).await);
        }
        tracing::info!("Search {:?} returned {} results", query, resolved.len());
        resolved
    }

    pub(crate) async fn public_timeline(&self) -> Vec<Arc<Status>> {
        let key = CacheKey::public_timeline();
        if let Some(statuses) = self.cached_list(&key).await {
            return statuses;
        }
        let statuses = match self.fetcher.fetch_public_timeline().await {
            Ok(statuses) => statuses,
            Err(e) => {
                self.report("public timeline", e);
                return Vec::new();
            }
        };
        let mut resolved = Vec::with_capacity(statuses.len());
        for status in statuses {
            resolved.push(self.resolve_status(status).await);
        }
        tracing::info!("Public timeline returned {} statuses", resolved.len());
        self.store_list(key, &resolved).await;
        resolved
    }
}

// MARK: Population

impl<F: Fetcher> Orchestrator<F> {
    /// Store a status and its author. An author not cached yet gets this status as its last status.
    async fn store_status(&self, status: Status) -> Arc<Status> {
        if !status.is_valid() {
            return Arc::new(status);
        }
        let author = status.user.as_ref().filter(|u| u.is_valid()).map(|user| User {
            status: Some(Box::new(status.without_user())),
            ..user.without_status()
        });

        let status = Arc::new(status);
        self.put(&status).await;
        if let Some(author) = author {
            self.put_missing(&Arc::new(author)).await;
        }
        status
    }

    /// Store a user and its last status. A status not cached yet gets this user as its author.
    async fn store_user(&self, user: User) -> Arc<User> {
        if !user.is_valid() {
            return Arc::new(user);
        }
        let last_status = user
            .status
            .as_deref()
            .filter(|s| s.is_valid())
            .map(|status| Status {
                user: Some(user.without_status()),
                ..status.without_user()
            });

        let user = Arc::new(user);
        self.put(&user).await;
        if let Some(last_status) = last_status {
            self.put_missing(&Arc::new(last_status)).await;
        }
        user
    }

    async fn resolve_users(&self, users: Vec<User>) -> Vec<Arc<User>> {
        let mut resolved = Vec::with_capacity(users.len());
        for user in users {
            let cached: Option<Arc<User>> = if user.is_valid() {
                self.cached(&CacheKey::user(user.id)).await
            } else {
                None
            };
            match cached {
                Some(cached) => resolved.push(cached),
                None => resolved.push(self.store_user(user).await),
            }
        }
        resolved
    }

    async fn resolve_status(&self, status: Status) -> Arc<Status> {
        if status.is_valid() {
            if let Some(cached) = self.cached(&CacheKey::status(status.id)).await {
                return cached;
            }
        }
        self.store_status(status).await
    }

    async fn resolve_search_result(&self, result: SearchResult) -> Arc<SearchResult> {
        if !result.is_valid() {
            return Arc::new(result);
        }
        if let Some(cached) = self.cached(&CacheKey::search_result(result.id)).await {
            return cached;
        }
        let result = Arc::new(result);
        self.put(&result).await;
        result
    }
}

// MARK: Cache access

impl<F> Orchestrator<F> {
    async fn cached<T: Cacheable>(&self, key: &CacheKey) -> Option<Arc<T>> {
        if !self.cache.has(key).await {
            return None;
        }
        self.cache.get_as(key).await
    }

    /// Put an entity under all of its keys.
    async fn put<T: Entity>(&self, entity: &Arc<T>) {
        let mut inserted = 0;
        for key in entity.keys() {
            if self.cache.put(key, T::into_entry(entity.clone())).await {
                inserted += 1;
            }
        }
        if inserted > 0 {
            tracing::debug!("Stored {} new keys for {}", inserted, entity.keys()[0]);
        }
    }

    /// Put an entity under those of its keys that are not cached yet.
    async fn put_missing<T: Entity>(&self, entity: &Arc<T>) {
        for key in entity.keys() {
            if self.cache.put_if_absent(key.clone(), T::into_entry(entity.clone())).await {
                tracing::debug!("Cross-populated {}", key);
            }
        }
    }

    async fn cached_list<T>(&self, key: &CacheKey) -> Option<Vec<Arc<T>>>
    where
        Vec<Arc<T>>: Cacheable,
    {
        if !self.cache_lists {
            return None;
        }
        let list: Arc<Vec<Arc<T>>> = self.cached(key).await?;
        Some(list.as_ref().clone())
    }

    async fn store_list<T>(&self, key: CacheKey, list: &[Arc<T>])
    where
        Vec<Arc<T>>: Cacheable,
    {
        if !self.cache_lists {
            return;
        }
        let entry: CacheEntry = <Vec<Arc<T>> as Cacheable>::into_entry(Arc::new(list.to_vec()));
        self.cache.put(key, entry).await;
    }

    fn report(&self, operation: impl Into<String>, source: twitter_client::Error) {
        let operation = operation.into();
        tracing::warn!("Fetching {} failed: {}", operation, source);
        push_error(&self.errors, Error::fetch(operation, source));
    }
}

/// Queue an error for the caller without blocking. A full channel drops the error.
pub(crate) fn push_error(errors: &mpsc::Sender<Error>, error: Error) {
    match errors.try_send(error) {
        Ok(()) => {}
        Err(TrySendError::Full(error)) => tracing::error!("Error channel is full, dropped: {}", error),
        Err(TrySendError::Closed(error)) => tracing::debug!("Error channel is closed, dropped: {}", error),
    }
}
