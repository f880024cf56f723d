use async_trait::async_trait;

use twitter_client::{Result, SearchResult, Status, TwitterClient, User};

/// The network side of the cache: performs a request and parses the result.
/// The cache only decides whether to call it.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch_status(&self, id: u64) -> Result<Status>;
    async fn fetch_user(&self, screen_name: &str) -> Result<User>;
    async fn fetch_user_by_id(&self, id: u64) -> Result<User>;
    async fn fetch_followers(&self, screen_name: &str, cursor: i64) -> Result<Vec<User>>;
    async fn fetch_friends(&self, screen_name: &str, cursor: i64) -> Result<Vec<User>>;
    async fn search_simple(&self, query: &str) -> Result<Vec<SearchResult>>;
    async fn fetch_public_timeline(&self) -> Result<Vec<Status>>;
}

#[async_trait]
impl Fetcher for TwitterClient {
    async fn fetch_status(&self, id: u64) -> Result<Status> {
        self.status_by_id(id).await
    }

    async fn fetch_user(&self, screen_name: &str) -> Result<User> {
        self.user_by_screen_name(screen_name).await
    }

    async fn fetch_user_by_id(&self, id: u64) -> Result<User> {
        self.user_by_id(id).await
    }

    async fn fetch_followers(&self, screen_name: &str, cursor: i64) -> Result<Vec<User>> {
        Ok(self.followers(screen_name, cursor).await?.users)
    }

    async fn fetch_friends(&self, screen_name: &str, cursor: i64) -> Result<Vec<User>> {
        Ok(self.friends(screen_name, cursor).await?.users)
    }

    async fn search_simple(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.search(query).await
    }

    async fn fetch_public_timeline(&self) -> Result<Vec<Status>> {
        self.public_timeline().await
    }
}
