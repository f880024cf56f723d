use dotenvy::dotenv;
use itertools::Itertools;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use twitter_cache::{Api, Status, User};

const STATUS_ID: u64 = 5641609144;
const USER_ID: u64 = 9918032;
const DEFAULT_SCREEN_NAME: &str = "jb55";
const SEARCH_QUERY: &str = "#ff";
const REPEATED_READS: usize = 5;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv().ok();

    // 1. Initialize logger
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .from_env()?
        .add_directive("hyper::proto=info".parse()?)
        .add_directive("hyper::client=info".parse()?)
        .add_directive("reqwest=info".parse()?);
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    // 2. Initialize client
    let screen_name = env::args().nth(1).unwrap_or_else(|| DEFAULT_SCREEN_NAME.to_string());
    let api = Api::from_env()?;
    let cache = api.cache();
    let errors = api.error_channel();

    // 3. Single entities. The status embeds its author, so the user lookup by id
    // should be served from the cache.
    let status = api.status(STATUS_ID).await;
    log_status("status", status.as_deref());
    let user = api.user(&screen_name).await;
    log_user("user", user.as_deref());

    let hit_before = cache.hits();
    let user_by_id = api.user_by_id(USER_ID).await;
    let hit_after = cache.hits();
    log_user("user by id", user_by_id.as_deref());
    if hit_before == hit_after {
        tracing::warn!("User {} was not served from the cache", USER_ID);
    }

    // 4. Lists, all in flight at once
    let (followers, friends, results, timeline) = tokio::join!(
        api.followers(&screen_name, 0),
        api.friends(&screen_name, 0),
        api.search(SEARCH_QUERY),
        api.public_timeline(),
    );
    tracing::info!(
        "Followers of @{} ({}): {}",
        screen_name,
        followers.len(),
        followers.iter().map(|u| &u.screen_name).join(", ")
    );
    tracing::info!(
        "Friends of @{} ({}): {}",
        screen_name,
        friends.len(),
        friends.iter().map(|u| &u.screen_name).join(", ")
    );
    tracing::info!("Search {:?}: {} results", SEARCH_QUERY, results.len());
    let repeated = timeline.iter().tuple_windows().filter(|(a, b)| a == b).count();
    tracing::info!(
        "Public timeline: {} statuses, {} adjacent duplicates",
        timeline.len(),
        repeated
    );

    // 5. Repeated reads must return the cached status
    let mut identical = true;
    let first = api.status(STATUS_ID).await;
    for _ in 1..REPEATED_READS {
        let again = api.status(STATUS_ID).await;
        identical &= matches!((&first, &again), (Some(a), Some(b)) if Arc::ptr_eq(a, b));
    }
    if !identical {
        tracing::warn!("Repeated reads of status {} were not served from the cache", STATUS_ID);
    }

    // 6. Report
    tracing::info!(
        "Cache: {} hits, {} stores, {} entries",
        cache.hits(),
        cache.stores(),
        cache.len().await
    );
    let collected = errors.drain().await;
    for error in &collected {
        tracing::error!("{}", error);
    }

    if collected.is_empty() && identical && repeated == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn log_status(label: &str, status: Option<&Status>) {
    match status {
        Some(s) => tracing::info!(
            "{}: {} at {} by @{}: {}",
            label,
            s.id,
            s.created_at,
            s.user.as_ref().map(|u| u.screen_name.as_str()).unwrap_or("?"),
            s.text
        ),
        None => tracing::warn!("{}: nothing returned", label),
    }
}

fn log_user(label: &str, user: Option<&User>) {
    match user {
        Some(u) => tracing::info!(
            "{}: {} @{} ({}), last status {:?}",
            label,
            u.id,
            u.screen_name,
            u.name,
            u.status.as_ref().map(|s| s.id)
        ),
        None => tracing::warn!("{}: nothing returned", label),
    }
}
