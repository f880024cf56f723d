use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::response::{self, CursoredUsers, SearchResponse};
use crate::util::twitter_date_format;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    #[serde(with = "twitter_date_format")]
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub screen_name: String,
    pub description: String,
    pub location: String,
    pub followers_count: u32,
    pub friends_count: u32,
    pub statuses_count: u32,
    pub protected: bool,
    pub profile_image_url_https: Option<String>,
    pub status: Option<Box<Status>>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub id: u64,
    #[serde(with = "twitter_date_format")]
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub in_reply_to_status_id: Option<u64>,
    pub in_reply_to_user_id: Option<u64>,
    pub in_reply_to_screen_name: Option<String>,
    pub favorited: bool,
    pub user: Option<User>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub id: u64,
    #[serde(with = "twitter_date_format")]
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub from_user: String,
    pub from_user_id: u64,
    pub profile_image_url: Option<String>,
}

/// One page of a cursored user list, like followers or friends.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct UserPage {
    pub users: Vec<User>,
    pub next_cursor: i64,
    pub previous_cursor: i64,
}

// MARK: Helpers

impl Status {
    pub fn created_at_in_seconds(&self) -> i64 {
        self.created_at.timestamp()
    }

    pub fn is_reply(&self) -> bool {
        self.in_reply_to_status_id.is_some()
    }

    /// The status without its embedded author, used as a user's last status.
    pub fn without_user(&self) -> Status {
        Status {
            user: None,
            ..self.clone()
        }
    }
}

impl User {
    /// The user without its embedded last status, used as a status author.
    pub fn without_status(&self) -> User {
        User {
            status: None,
            ..self.clone()
        }
    }
}

impl UserPage {
    /// Whether there is another page after this one.
    pub fn has_next(&self) -> bool {
        self.next_cursor != 0
    }
}

// MARK: Conversions

impl From<response::User> for User {
    fn from(user: response::User) -> Self {
        User {
            id: user.id,
            created_at: user.created_at,
            name: user.name,
            screen_name: user.screen_name,
            description: user.description.unwrap_or_default(),
            location: user.location.unwrap_or_default(),
            followers_count: user.followers_count,
            friends_count: user.friends_count,
            statuses_count: user.statuses_count,
            protected: user.protected,
            profile_image_url_https: user.profile_image_url_https,
            status: user.status.map(|s| Box::new((*s).into())),
        }
    }
}

impl From<response::Status> for Status {
    fn from(status: response::Status) -> Self {
        Status {
            id: status.id,
            created_at: status.created_at,
            text: status.text,
            in_reply_to_status_id: status.in_reply_to_status_id,
            in_reply_to_user_id: status.in_reply_to_user_id,
            in_reply_to_screen_name: status.in_reply_to_screen_name,
            favorited: status.favorited,
            user: status.user.map(User::from),
        }
    }
}

impl From<response::Status> for SearchResult {
    fn from(status: response::Status) -> Self {
        let (from_user, from_user_id, profile_image_url) = match status.user {
            Some(user) => (user.screen_name, user.id, user.profile_image_url_https),
            None => (String::new(), 0, None),
        };
        SearchResult {
            id: status.id,
            created_at: status.created_at,
            text: status.text,
            from_user,
            from_user_id,
            profile_image_url,
        }
    }
}

impl From<CursoredUsers> for UserPage {
    fn from(value: CursoredUsers) -> Self {
        UserPage {
            users: value.users.into_iter().map(User::from).collect(),
            next_cursor: value.next_cursor,
            previous_cursor: value.previous_cursor,
        }
    }
}

impl From<SearchResponse> for Vec<SearchResult> {
    fn from(value: SearchResponse) -> Self {
        value.statuses.into_iter().map(SearchResult::from).collect()
    }
}
