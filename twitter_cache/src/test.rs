use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use twitter_client::{Error as ClientError, Result as ClientResult, SearchResult, Status, User};

use crate::{Api, ApiConfig, CacheBackend, CacheEntry, CacheKey, Error, ErrorKind, Fetcher};

const STATUS_ID: u64 = 5641609144;
const USER_ID: u64 = 9918032;
const LAST_STATUS_ID: u64 = 5723450981;
const PANIC_ID: u64 = 666;

// MARK: Fixtures

fn user(id: u64, screen_name: &str) -> User {
    User {
        id,
        created_at: Utc.timestamp_opt(1194055459, 0).unwrap(),
        name: format!("{} name", screen_name),
        screen_name: screen_name.to_string(),
        description: String::new(),
        location: String::new(),
        followers_count: 10,
        friends_count: 20,
        statuses_count: 30,
        protected: false,
        profile_image_url_https: None,
        status: None,
    }
}

fn status(id: u64, text: &str, user: Option<User>) -> Status {
    Status {
        id,
        created_at: Utc.timestamp_opt(1289245961 + id as i64 % 1000, 0).unwrap(),
        text: text.to_string(),
        in_reply_to_status_id: None,
        in_reply_to_user_id: None,
        in_reply_to_screen_name: None,
        favorited: false,
        user,
    }
}

fn jb55() -> User {
    User {
        status: Some(Box::new(status(LAST_STATUS_ID, "last words", None))),
        ..user(USER_ID, "jb55")
    }
}

fn follower(id: u64, screen_name: &str, status_id: u64) -> User {
    User {
        status: Some(Box::new(status(status_id, "hello", None))),
        ..user(id, screen_name)
    }
}

/// Serves fixed entities and counts how often each request reaches the "network".
#[derive(Default)]
struct FakeFetcher {
    statuses: HashMap<u64, Status>,
    users: Vec<User>,
    followers: Vec<User>,
    friends: Vec<User>,
    search: Vec<SearchResult>,
    timeline: Vec<Status>,
    fail: AtomicBool,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl FakeFetcher {
    fn twitter() -> Self {
        let author = user(USER_ID, "jb55");
        let statuses = HashMap::from([
            (STATUS_ID, status(STATUS_ID, "trying out the bindings", Some(author))),
            (42, status(42, "anonymous", Some(user(0, "")))),
        ]);
        FakeFetcher {
            statuses,
            users: vec![jb55()],
            followers: vec![follower(100, "ada", 1000), user(101, "quiet")],
            friends: vec![follower(200, "rob_pike", 2000), follower(201, "ken", 2001)],
            search: vec![
                SearchResult {
                    id: 3001,
                    created_at: Utc.timestamp_opt(1289577662, 0).unwrap(),
                    text: "#ff @ada".to_string(),
                    from_user: "jb55".to_string(),
                    from_user_id: USER_ID,
                    profile_image_url: None,
                },
                SearchResult {
                    id: 3000,
                    created_at: Utc.timestamp_opt(1289577640, 0).unwrap(),
                    text: "#ff everyone".to_string(),
                    from_user: "ada".to_string(),
                    from_user_id: 100,
                    profile_image_url: None,
                },
            ],
            timeline: vec![
                status(5641700001, "good morning", Some(user(783214, "twitter"))),
                status(5641699990, "@twitter morning!", Some(user(200, "rob_pike"))),
            ],
            ..Default::default()
        }
    }

    fn record(&self, op: &'static str) -> ClientResult<()> {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;
        if self.fail.load(Ordering::SeqCst) {
            let e = serde_json::from_str::<u64>("not json").unwrap_err();
            return Err(ClientError::JSONError(e));
        }
        Ok(())
    }

    fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch_status(&self, id: u64) -> ClientResult<Status> {
        self.record("status")?;
        if id == PANIC_ID {
            panic!("fetcher blew up");
        }
        self.statuses
            .get(&id)
            .cloned()
            .ok_or(ClientError::NotFound(format!("status {}", id)))
    }

    async fn fetch_user(&self, screen_name: &str) -> ClientResult<User> {
        self.record("user")?;
        self.users
            .iter()
            .find(|u| u.screen_name.eq_ignore_ascii_case(screen_name))
            .cloned()
            .ok_or(ClientError::NotFound(format!("user {}", screen_name)))
    }

    async fn fetch_user_by_id(&self, id: u64) -> ClientResult<User> {
        self.record("user_by_id")?;
        self.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(ClientError::NotFound(format!("user {}", id)))
    }

    async fn fetch_followers(&self, _screen_name: &str, _cursor: i64) -> ClientResult<Vec<User>> {
        self.record("followers")?;
        Ok(self.followers.clone())
    }

    async fn fetch_friends(&self, _screen_name: &str, _cursor: i64) -> ClientResult<Vec<User>> {
        self.record("friends")?;
        Ok(self.friends.clone())
    }

    async fn search_simple(&self, _query: &str) -> ClientResult<Vec<SearchResult>> {
        self.record("search")?;
        Ok(self.search.clone())
    }

    async fn fetch_public_timeline(&self) -> ClientResult<Vec<Status>> {
        self.record("timeline")?;
        Ok(self.timeline.clone())
    }
}

fn verify_valid_user(u: &User) {
    assert!(u.id > 0);
    assert!(!u.screen_name.is_empty());
    assert!(!u.name.is_empty());
}

fn verify_valid_status(s: &Status) {
    assert!(s.id > 0);
    assert!(s.created_at_in_seconds() > 0);
    assert!(!s.text.is_empty());
    assert!(s.user.is_some());
}

// MARK: Backend

#[tokio::test]
async fn test_backend_starts_empty() {
    let cache = CacheBackend::new();
    assert_eq!(cache.hits(), 0);
    assert_eq!(cache.stores(), 0);
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_backend_miss_then_hit() {
    let cache = CacheBackend::new();
    let key = CacheKey::status(STATUS_ID);
    assert!(cache.get(&key).await.is_none());
    assert!(!cache.has(&key).await);
    assert_eq!(cache.hits(), 0);

    let entry = CacheEntry::Status(Arc::new(status(STATUS_ID, "text", None)));
    assert!(cache.put(key.clone(), entry.clone()).await);
    assert_eq!(cache.stores(), 1);
    assert!(cache.has(&key).await);
    assert_eq!(cache.hits(), 0);

    let found = cache.get(&key).await.unwrap();
    assert!(found.ptr_eq(&entry));
    assert_eq!(cache.hits(), 1);
}

#[tokio::test]
async fn test_backend_get_is_identical() {
    let cache = CacheBackend::new();
    let key = CacheKey::user(USER_ID);
    cache.put(key.clone(), CacheEntry::User(Arc::new(jb55()))).await;

    let first: Arc<User> = cache.get_as(&key).await.unwrap();
    let second: Arc<User> = cache.get_as(&key).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.hits(), 2);
}

#[tokio::test]
async fn test_backend_overwrite_is_not_a_store() {
    let cache = CacheBackend::new();
    let key = CacheKey::status(1);
    let replacement = CacheEntry::Status(Arc::new(status(1, "edited", None)));
    assert!(cache.put(key.clone(), CacheEntry::Status(Arc::new(status(1, "first", None)))).await);
    assert!(!cache.put(key.clone(), replacement.clone()).await);

    assert_eq!(cache.stores(), 1);
    assert_eq!(cache.len().await, 1);
    assert!(cache.get(&key).await.unwrap().ptr_eq(&replacement));
}

#[test]
fn test_backend_screen_names_ignore_case() {
    assert_eq!(CacheKey::user_by_screen_name("JB55"), CacheKey::user_by_screen_name("jb55"));
    assert_ne!(CacheKey::user(1), CacheKey::status(1));
    assert_eq!(CacheKey::followers("jb55", 0).to_string(), "FollowerList:@jb55#0");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_backend_concurrent_puts() {
    let cache = CacheBackend::shared();
    let handles = (1..=16u64).map(|i| {
        let cache = cache.clone();
        tokio::spawn(async move {
            cache
                .put(CacheKey::status(i), CacheEntry::Status(Arc::new(status(i, "own", None))))
                .await;
            cache
                .put(CacheKey::status(0xFFFF), CacheEntry::Status(Arc::new(status(0xFFFF, "shared", None))))
                .await;
            cache.get(&CacheKey::status(i)).await.is_some()
        })
    });
    let results = futures::future::join_all(handles).await;

    assert!(results.into_iter().all(|r| r.unwrap()));
    assert_eq!(cache.stores(), 17);
    assert_eq!(cache.hits(), 16);
    assert_eq!(cache.len().await, 17);
}

// MARK: Orchestrator

#[tokio::test]
async fn test_status_populates_author() {
    let api = Api::new(FakeFetcher::twitter());
    let errors = api.error_channel();
    let cache = api.cache();

    let status = api.status(STATUS_ID).await.unwrap();
    verify_valid_status(&status);
    verify_valid_user(status.user.as_ref().unwrap());

    let hit_before = cache.hits();
    let user = api.user_by_id(USER_ID).await.unwrap();
    assert!(cache.hits() > hit_before, "user lookup did not hit the cache");
    assert_eq!(api.fetcher().calls("user_by_id"), 0);

    verify_valid_user(&user);
    let last_status = user.status.as_ref().unwrap();
    assert_eq!(last_status.id, STATUS_ID);
    assert!(last_status.user.is_none());

    // also reachable by screen name
    assert!(cache.has(&CacheKey::user_by_screen_name("jb55")).await);
    assert!(errors.drain().await.is_empty());
}

#[tokio::test]
async fn test_user_populates_status() {
    let api = Api::new(FakeFetcher::twitter());
    let errors = api.error_channel();

    let user = api.user("JB55").await.unwrap();
    verify_valid_user(&user);

    let status = api.status(LAST_STATUS_ID).await.unwrap();
    assert_eq!(api.fetcher().calls("status"), 0);
    verify_valid_status(&status);
    let author = status.user.as_ref().unwrap();
    assert_eq!(author.id, USER_ID);
    assert!(author.status.is_none());

    let by_id = api.user_by_id(USER_ID).await.unwrap();
    assert!(Arc::ptr_eq(&user, &by_id));
    assert_eq!(api.fetcher().calls("user_by_id"), 0);
    assert!(errors.drain().await.is_empty());
}

#[tokio::test]
async fn test_older_status_keeps_last_status() {
    let api = Api::new(FakeFetcher::twitter());

    let user = api.user("jb55").await.unwrap();
    assert_eq!(user.status.as_ref().unwrap().id, LAST_STATUS_ID);

    // an older status of the same author must not replace the cached user
    let status = api.status(STATUS_ID).await.unwrap();
    assert_eq!(status.user.as_ref().unwrap().id, USER_ID);

    let by_id = api.user_by_id(USER_ID).await.unwrap();
    assert_eq!(by_id.status.as_ref().unwrap().id, LAST_STATUS_ID);
    assert!(Arc::ptr_eq(&user, &by_id));
    assert_eq!(api.fetcher().calls("user_by_id"), 0);
}

#[tokio::test]
async fn test_backend_put_if_absent() {
    let cache = CacheBackend::new();
    let key = CacheKey::status(1);
    let first = CacheEntry::Status(Arc::new(status(1, "first", None)));
    assert!(cache.put_if_absent(key.clone(), first.clone()).await);
    assert!(!cache.put_if_absent(key.clone(), CacheEntry::Status(Arc::new(status(1, "second", None)))).await);

    assert_eq!(cache.stores(), 1);
    assert!(cache.get(&key).await.unwrap().ptr_eq(&first));
}

#[tokio::test]
async fn test_repeated_status_is_identical() {
    let api = Api::new(FakeFetcher::twitter());
    let mut last: Option<Arc<Status>> = None;

    for _ in 0..5 {
        let current = api.status(STATUS_ID).await.unwrap();
        if let Some(last) = &last {
            assert!(Arc::ptr_eq(last, &current), "cache not storing status data");
        }
        last = Some(current);
    }

    assert_eq!(api.fetcher().calls("status"), 1);
    assert_eq!(api.cache().hits(), 4);
}

#[tokio::test]
async fn test_store_count_is_monotonic() {
    let api = Api::new(FakeFetcher::twitter());
    let cache = api.cache();
    let mut last = cache.stores();

    api.status(STATUS_ID).await.unwrap();
    assert!(cache.stores() > last);
    last = cache.stores();

    api.user("jb55").await.unwrap();
    assert!(cache.stores() >= last);
    last = cache.stores();

    api.status(STATUS_ID).await.unwrap();
    assert_eq!(cache.stores(), last);
    assert!(cache.stores() >= 2);
}

#[tokio::test]
async fn test_failed_fetch_is_not_cached() {
    let api = Api::new(FakeFetcher::twitter());
    let errors = api.error_channel();
    api.fetcher().fail.store(true, Ordering::SeqCst);

    assert!(api.status(STATUS_ID).await.is_none());
    assert!(api.followers("jb55", 0).await.is_empty());
    assert!(!api.cache().has(&CacheKey::status(STATUS_ID)).await);
    assert_eq!(api.cache().stores(), 0);

    let collected = errors.drain().await;
    assert_eq!(collected.len(), 2);
    assert!(collected.iter().all(|e| e.kind() == ErrorKind::Parse));

    api.fetcher().fail.store(false, Ordering::SeqCst);
    assert!(api.status(STATUS_ID).await.is_some());
    assert!(api.cache().has(&CacheKey::status(STATUS_ID)).await);
    assert!(errors.drain().await.is_empty());
}

#[tokio::test]
async fn test_not_found_is_reported() {
    let api = Api::new(FakeFetcher::twitter());
    let errors = api.error_channel();

    assert!(api.status(1).await.is_none());
    assert!(api.user("nobody").await.is_none());

    let collected = errors.drain().await;
    assert_eq!(collected.len(), 2);
    assert!(collected.iter().all(|e| e.kind() == ErrorKind::NotFound));
    assert!(matches!(&collected[0], Error::Fetch { operation, .. } if operation == "status 1"));
}

#[tokio::test]
async fn test_zero_id_author_is_not_cached() {
    let api = Api::new(FakeFetcher::twitter());

    let status = api.status(42).await.unwrap();
    assert_eq!(status.user.as_ref().unwrap().id, 0);
    assert!(!api.cache().has(&CacheKey::user(0)).await);
    assert_eq!(api.cache().stores(), 1);
}

#[tokio::test]
async fn test_followers_cache_elements_only() {
    let api = Api::new(FakeFetcher::twitter());
    let cache = api.cache();

    let first = api.followers("jb55", 0).await;
    assert_eq!(first.len(), 2);
    first.iter().for_each(|u| verify_valid_user(u));
    assert!(cache.has(&CacheKey::user(100)).await);
    assert!(cache.has(&CacheKey::status(1000)).await);
    assert!(!cache.has(&CacheKey::followers("jb55", 0)).await);

    let second = api.followers("jb55", 0).await;
    assert_eq!(api.fetcher().calls("followers"), 2);
    assert!(first.iter().zip(second.iter()).all(|(a, b)| Arc::ptr_eq(a, b)));

    let friends = api.friends("jb55", 0).await;
    assert_eq!(friends.len(), 2);
    let ken = api.user_by_id(201).await.unwrap();
    assert!(Arc::ptr_eq(&ken, &friends[1]));
    assert_eq!(api.fetcher().calls("user_by_id"), 0);
}

#[tokio::test]
async fn test_lists_cached_when_enabled() {
    let config = ApiConfig {
        cache_lists: true,
        ..Default::default()
    };
    let api = Api::with_config(FakeFetcher::twitter(), config);

    let first = api.friends("jb55", 0).await;
    let second = api.friends("JB55", 0).await;
    assert_eq!(api.fetcher().calls("friends"), 1);
    assert_eq!(first.len(), second.len());
    assert!(api.cache().has(&CacheKey::friends("jb55", 0)).await);

    // another page is another key
    api.friends("jb55", 42).await;
    assert_eq!(api.fetcher().calls("friends"), 2);

    api.public_timeline().await;
    api.public_timeline().await;
    assert_eq!(api.fetcher().calls("timeline"), 1);
}

#[tokio::test]
async fn test_search_results_are_not_cross_populated() {
    let api = Api::new(FakeFetcher::twitter());
    let cache = api.cache();

    let results = api.search("#ff").await;
    assert!(results.len() > 1);
    for result in &results {
        assert!(result.id > 0);
        assert!(!result.text.is_empty());
        assert!(cache.has(&CacheKey::search_result(result.id)).await);
    }
    assert!(!cache.has(&CacheKey::user(USER_ID)).await);
    assert_eq!(cache.stores(), 2);
}

#[tokio::test]
async fn test_public_timeline_populates_authors() {
    let api = Api::new(FakeFetcher::twitter());
    let cache = api.cache();

    let statuses = api.public_timeline().await;
    assert!(statuses.len() > 1);
    assert_ne!(statuses[0], statuses[1]);
    statuses.iter().for_each(|s| verify_valid_status(s));

    let author = api.user_by_id(783214).await.unwrap();
    assert_eq!(author.status.as_ref().unwrap().id, 5641700001);
    assert!(!cache.has(&CacheKey::public_timeline()).await);
    assert_eq!(api.fetcher().calls("user_by_id"), 0);
}

#[tokio::test]
async fn test_shared_cache_across_clients() {
    let first = Api::new(FakeFetcher::twitter());
    first.status(STATUS_ID).await.unwrap();

    let mut second = Api::new(FakeFetcher::default());
    second.set_cache(first.cache());
    let hit_before = first.cache().hits();
    let user = second.user_by_id(USER_ID).await.unwrap();

    assert_eq!(user.screen_name, "jb55");
    assert!(first.cache().hits() > hit_before);
    assert_eq!(second.fetcher().calls("user_by_id"), 0);
    assert!(second.error_channel().drain().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests() {
    let api = Api::new(FakeFetcher::twitter());
    let errors = api.error_channel();

    let pending = (0..8).map(|_| api.status(STATUS_ID)).collect::<Vec<_>>();
    let results = futures::future::join_all(pending).await;

    assert!(results.iter().all(|s| s.as_ref().map(|s| s.id) == Some(STATUS_ID)));
    // duplicate fetches are allowed, duplicate stores are not:
    // the status plus the author under id and screen name
    assert!(api.fetcher().calls("status") >= 1);
    assert_eq!(api.cache().stores(), 3);
    assert!(api.cache().has(&CacheKey::user(USER_ID)).await);

    let followers = api.followers("jb55", 0);
    let search = api.search("#ff");
    let (followers, search) = futures::join!(followers, search);
    assert_eq!(followers.len(), 2);
    assert_eq!(search.len(), 2);
    assert!(errors.drain().await.is_empty());

    let cached = api.status(STATUS_ID).await.unwrap();
    let again = api.status(STATUS_ID).await.unwrap();
    assert!(Arc::ptr_eq(&cached, &again));
}

#[tokio::test]
async fn test_panicked_request_yields_empty() {
    let api = Api::new(FakeFetcher::twitter());
    let errors = api.error_channel();

    assert!(api.status(PANIC_ID).await.is_none());
    let collected = errors.drain().await;
    assert_eq!(collected.len(), 1);
    assert!(matches!(collected[0], Error::Other(_)));
}

#[tokio::test]
async fn test_dropped_panicked_request_is_reported() {
    let api = Api::new(FakeFetcher::twitter());
    let errors = api.error_channel();

    let pending = api.status(PANIC_ID);
    while !pending.is_finished() {
        tokio::task::yield_now().await;
    }
    drop(pending);

    let collected = errors.drain().await;
    assert_eq!(collected.len(), 1);
    assert!(matches!(collected[0], Error::Other(_)));
}

#[tokio::test]
async fn test_error_channel_capacity() {
    let config = ApiConfig {
        error_capacity: 1,
        ..Default::default()
    };
    let api = Api::with_config(FakeFetcher::twitter(), config);
    let errors = api.error_channel();

    assert!(api.status(1).await.is_none());
    assert!(api.status(2).await.is_none());
    assert_eq!(errors.drain().await.len(), 1);
    assert!(errors.drain().await.is_empty());
}
