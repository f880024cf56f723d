use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use futures::FutureExt;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{self, JoinHandle};

use twitter_client::{ClientConfig, SearchResult, Status, TwitterClient, User};

use crate::backend::CacheBackend;
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::orchestrator::{push_error, Orchestrator};

/// Cached access to the Twitter API.
///
/// Every request runs as its own tokio task and returns a [`Pending`] handle right away,
/// so many requests can be in flight at once. Failures never surface from the handle: it
/// resolves to an empty value and the error is queued on the [`ErrorChannel`].
///
/// Must be used inside a tokio runtime.
pub struct Api<F = TwitterClient> {
    orchestrator: Orchestrator<F>,
    errors: ErrorChannel,
}

impl Api<TwitterClient> {
    /// Build a client from `ClientConfig::from_env` and `ApiConfig::from_env`.
    pub fn from_env() -> Result<Self> {
        let client = TwitterClient::new(ClientConfig::from_env()?)?;
        Ok(Api::with_config(client, ApiConfig::from_env()?))
    }
}

impl<F: Fetcher> Api<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_config(fetcher, ApiConfig::default())
    }

    pub fn with_config(fetcher: F, config: ApiConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.error_capacity.max(1));
        Api {
            orchestrator: Orchestrator {
                fetcher: Arc::new(fetcher),
                cache: CacheBackend::shared(),
                errors: sender,
                cache_lists: config.cache_lists,
            },
            errors: ErrorChannel {
                receiver: Arc::new(Mutex::new(receiver)),
            },
        }
    }

    /// Use a shared cache instead of the one created with this client.
    pub fn with_cache(mut self, cache: Arc<CacheBackend>) -> Self {
        self.set_cache(cache);
        self
    }

    /// Swap the cache. Requests already in flight keep the previous one.
    pub fn set_cache(&mut self, cache: Arc<CacheBackend>) {
        self.orchestrator.cache = cache;
    }

    pub fn cache(&self) -> Arc<CacheBackend> {
        self.orchestrator.cache.clone()
    }

    pub fn fetcher(&self) -> &F {
        &self.orchestrator.fetcher
    }

    pub fn error_channel(&self) -> ErrorChannel {
        self.errors.clone()
    }

    pub fn status(&self, id: u64) -> Pending<Option<Arc<Status>>> {
        self.spawn(move |o| async move { o.status(id).await })
    }

    pub fn user(&self, screen_name: &str) -> Pending<Option<Arc<User>>> {
        let screen_name = screen_name.to_string();
        self.spawn(move |o| async move { o.user(&screen_name).await })
    }

    pub fn user_by_id(&self, id: u64) -> Pending<Option<Arc<User>>> {
        self.spawn(move |o| async move { o.user_by_id(id).await })
    }

    /// Cursor `0` is the first page.
    pub fn followers(&self, screen_name: &str, cursor: i64) -> Pending<Vec<Arc<User>>> {
        let screen_name = screen_name.to_string();
        self.spawn(move |o| async move { o.followers(&screen_name, cursor).await })
    }

    /// Cursor `0` is the first page.
    pub fn friends(&self, screen_name: &str, cursor: i64) -> Pending<Vec<Arc<User>>> {
        let screen_name = screen_name.to_string();
        self.spawn(move |o| async move { o.friends(&screen_name, cursor).await })
    }

    pub fn search(&self, query: &str) -> Pending<Vec<Arc<SearchResult>>> {
        let query = query.to_string();
        self.spawn(move |o| async move { o.search(&query).await })
    }

    pub fn public_timeline(&self) -> Pending<Vec<Arc<Status>>> {
        self.spawn(move |o| async move { o.public_timeline().await })
    }

    fn spawn<T, Fut>(&self, job: impl FnOnce(Orchestrator<F>) -> Fut) -> Pending<T>
    where
        Fut: Future<Output = T> + Send + 'static,
        T: Default + Send + 'static,
    {
        let errors = self.orchestrator.errors.clone();
        let job = AssertUnwindSafe(job(self.orchestrator.clone())).catch_unwind();
        let handle = task::spawn({
            let errors = errors.clone();
            async move {
                job.await.unwrap_or_else(|panic| {
                    let message = panic_message(&*panic);
                    tracing::error!("Request task panicked: {}", message);
                    push_error(&errors, Error::Other(anyhow::anyhow!("request task panicked: {}", message)));
                    T::default()
                })
            }
        });
        Pending { handle, errors }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// Handle of a request in flight. Resolves to the result, or to the empty value
/// (`None`, empty `Vec`) if the request failed.
///
/// The request runs to completion whether or not the handle is awaited, and its
/// errors reach the [`ErrorChannel`] either way.
#[must_use = "the result is only observable by awaiting the handle"]
pub struct Pending<T> {
    handle: JoinHandle<T>,
    errors: mpsc::Sender<Error>,
}

impl<T> Pending<T> {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T: Default> Future for Pending<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        match ready!(Pin::new(&mut self.handle).poll(cx)) {
            Ok(value) => Poll::Ready(value),
            Err(e) => {
                tracing::error!("Request task was cancelled: {}", e);
                push_error(&self.errors, Error::Other(e.into()));
                Poll::Ready(T::default())
            }
        }
    }
}

/// Receiving side of the errors produced by an [`Api`]. Clones share one queue.
#[derive(Debug, Clone)]
pub struct ErrorChannel {
    receiver: Arc<Mutex<mpsc::Receiver<Error>>>,
}

impl ErrorChannel {
    /// Take every error queued so far without waiting for new ones.
    /// An empty result after all handles resolved means the whole batch succeeded.
    pub async fn drain(&self) -> Vec<Error> {
        let mut receiver = self.receiver.lock().await;
        let mut errors = Vec::new();
        while let Ok(error) = receiver.try_recv() {
            errors.push(error);
        }
        errors
    }
}
