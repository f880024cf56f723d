mod config;
mod consts;
mod credential;
mod error;
mod response;
mod result;
mod util;

use reqwest::{Client, Response, StatusCode, Url};

use consts::*;
use response::{CursoredUsers, SearchResponse};
pub use result::*;
use util::build_params;

pub use crate::config::ClientConfig;
pub use crate::credential::Credential;
pub use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct TwitterClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl TwitterClient {
    pub fn new(config: ClientConfig) -> Result<TwitterClient> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(TwitterClient { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn status_by_id(&self, status_id: u64) -> Result<Status> {
        let params = build_params! {
            required id => status_id,
        };
        let status: response::Status = self.rest_get("StatusById", params).await?;
        Ok(status.into())
    }

    pub async fn user_by_screen_name(&self, screen_name: &str) -> Result<User> {
        let params = build_params! {
            required screen_name => screen_name,
        };
        let user: response::User = self.rest_get("UserShow", params).await?;
        Ok(user.into())
    }

    pub async fn user_by_id(&self, user_id: u64) -> Result<User> {
        let params = build_params! {
            required user_id => user_id,
        };
        let user: response::User = self.rest_get("UserShow", params).await?;
        Ok(user.into())
    }

    /// Cursor `0` requests the first page.
    pub async fn followers(&self, screen_name: &str, cursor: i64) -> Result<UserPage> {
        self.user_list("Followers", screen_name, cursor).await
    }

    /// Cursor `0` requests the first page.
    pub async fn friends(&self, screen_name: &str, cursor: i64) -> Result<UserPage> {
        self.user_list("Friends", screen_name, cursor).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let params = build_params! {
            required q => query,
            required count => SEARCH_API_MAX_COUNT,
        };
        let response: SearchResponse = self.rest_get("Search", params).await?;
        Ok(response.into())
    }

    pub async fn public_timeline(&self) -> Result<Vec<Status>> {
        let statuses: Vec<response::Status> = self.rest_get("PublicTimeline", build_params! {}).await?;
        Ok(statuses.into_iter().map(Status::from).collect())
    }
}

impl TwitterClient {
    async fn user_list(&self, endpoint: &str, screen_name: &str, cursor: i64) -> Result<UserPage> {
        let cursor = if cursor == 0 { FIRST_PAGE_CURSOR } else { cursor };
        let params = build_params! {
            required screen_name => screen_name,
            required cursor => cursor,
            required count => LIST_API_MAX_COUNT,
            required skip_status => false,
        };
        let response: CursoredUsers = self.rest_get(endpoint, params).await?;
        Ok(response.into())
    }

    async fn rest_get<R>(&self, endpoint: &str, params: Vec<(&'static str, String)>) -> Result<R>
    where
        R: serde::de::DeserializeOwned,
    {
        let Some(path) = ENDPOINTS.get(endpoint) else {
            return Err(Error::InvalidEndpoint(endpoint.to_string()));
        };

        let base_url = format!("{}{}", self.config.api_base, path);
        let url = if params.is_empty() {
            Url::parse(&base_url)?
        } else {
            Url::parse_with_params(&base_url, &params)?
        };
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url);
        if let Some(credential) = &self.config.credential {
            request = credential.apply(request);
        }
        let response: Response = request.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(describe(endpoint, &params)));
        }
        let status_error = response.error_for_status_ref().err();
        let content = response.text().await?;
        log(endpoint, &content).await?;
        if let Some(status_error) = status_error {
            return Err(status_error.into());
        }

        serde_json::from_str(&content).map_err(|e| e.into())
    }
}

fn describe(endpoint: &str, params: &[(&'static str, String)]) -> String {
    let params = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    format!("{} {}", endpoint, params)
}

async fn log(name: &str, content: &str) -> Result<()> {
    use std::path::PathBuf;
    use tokio::{fs::File, io::AsyncWriteExt};

    if let Ok(dir) = std::env::var("CLIENT_LOG_DIR") {
        let time = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let filepath = PathBuf::from(dir).join(format!("twitter_{}_{}.json", name, time));
        let mut file = File::create(filepath).await?;
        file.write_all(content.as_bytes()).await?;
    }
    Ok(())
}
