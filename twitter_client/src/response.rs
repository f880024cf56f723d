use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::util::twitter_date_format;

// User

#[serde_as]
#[derive(Deserialize, Serialize, Debug)]
pub struct User {
    #[serde(rename = "id_str")]
    #[serde_as(as = "DisplayFromStr")]
    pub id: u64,
    #[serde(with = "twitter_date_format")]
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub screen_name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub followers_count: u32,
    #[serde(default)]
    pub friends_count: u32,
    #[serde(default)]
    pub statuses_count: u32,
    #[serde(default)]
    pub protected: bool,
    pub profile_image_url_https: Option<String>,
    /// Last status of the user. Absent for protected users and in embedded authors.
    pub status: Option<Box<Status>>,
}

// Status

#[serde_as]
#[derive(Deserialize, Serialize, Debug)]
pub struct Status {
    #[serde(rename = "id_str")]
    #[serde_as(as = "DisplayFromStr")]
    pub id: u64,
    #[serde(with = "twitter_date_format")]
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub in_reply_to_status_id: Option<u64>,
    pub in_reply_to_user_id: Option<u64>,
    pub in_reply_to_screen_name: Option<String>,
    #[serde(default)]
    pub favorited: bool,
    pub user: Option<User>,
}

// Lists

#[derive(Deserialize, Serialize, Debug)]
pub struct CursoredUsers {
    pub users: Vec<User>,
    #[serde(default)]
    pub next_cursor: i64,
    #[serde(default)]
    pub previous_cursor: i64,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct SearchMetadata {
    pub query: Option<String>,
    pub count: Option<u32>,
    pub max_id: Option<u64>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct SearchResponse {
    pub statuses: Vec<Status>,
    pub search_metadata: Option<SearchMetadata>,
}
