use std::env;
use std::str::FromStr;

use crate::error::{Error, Result};

pub const DEFAULT_ERROR_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Capacity of the error channel. Errors beyond it are dropped and logged.
    pub error_capacity: usize,
    /// Cache follower/friend pages and the public timeline as whole lists.
    pub cache_lists: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            error_capacity: DEFAULT_ERROR_CAPACITY,
            cache_lists: false,
        }
    }
}

impl ApiConfig {
    /// Load from `TWITTER_ERROR_CAPACITY` and `TWITTER_CACHE_LISTS`, falling back to defaults.
    pub fn from_env() -> Result<ApiConfig> {
        let default = ApiConfig::default();
        let error_capacity = read_var("TWITTER_ERROR_CAPACITY")?.unwrap_or(default.error_capacity);
        if error_capacity == 0 {
            return Err(Error::InvalidConfig("TWITTER_ERROR_CAPACITY must be positive".to_string()));
        }
        let cache_lists = read_var("TWITTER_CACHE_LISTS")?.unwrap_or(default.cache_lists);
        Ok(ApiConfig {
            error_capacity,
            cache_lists,
        })
    }
}

fn read_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidConfig(format!("{}={}", name, value))),
        Err(_) => Ok(None),
    }
}
