use phf::phf_map;

pub const REST_API: &str = "https://api.twitter.com/1.1";
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/113.0.0.0 Safari/537.36";

pub const DEFAULT_AUTH_FILE: &str = ".twitterauth";

pub const LIST_API_MAX_COUNT: u32 = 200;
pub const SEARCH_API_MAX_COUNT: u32 = 100;

/// Cursor value the list endpoints treat as "first page".
pub const FIRST_PAGE_CURSOR: i64 = -1;

pub const ENDPOINTS: phf::Map<&str, &str> = phf_map! {
    "StatusById" => "/statuses/show.json",
    "UserShow" => "/users/show.json",
    "Followers" => "/followers/list.json",
    "Friends" => "/friends/list.json",
    "Search" => "/search/tweets.json",
    "PublicTimeline" => "/statuses/public_timeline.json",
};
