use std::{
    collections::HashMap,
    future::Future,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use anyhow::Context;
use tokio::sync::OnceCell;

use crate::{
    assets::decode::{LogoAsset, decode_logo},
    foundation::error::{NoteError, NoteResult},
};

/// Source of raw logo bytes.
pub trait FetchBytes: Send + Sync {
    /// Fetch the bytes behind `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = anyhow::Result<Vec<u8>>> + Send;
}

/// Fetches `http(s)://` URLs with a GET request and reads anything else from
/// the filesystem, relative to an optional base directory.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_dir: Option<PathBuf>,
}

impl HttpFetcher {
    /// Fetcher with a default `reqwest` client and no base directory.
    pub fn new() -> NoteResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| NoteError::asset(format!("build http client: {e}")))?;
        Ok(Self {
            client,
            base_dir: None,
        })
    }

    /// Resolve non-URL sources against `dir`.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    fn local_path(&self, src: &str) -> PathBuf {
        let path = Path::new(src.strip_prefix("file://").unwrap_or(src));
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl FetchBytes for HttpFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        if url.starts_with("http://") || url.starts_with("https://") {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .with_context(|| format!("requesting {url}"))?
                .error_for_status()
                .with_context(|| format!("logo request for {url} failed"))?;
            let bytes = response
                .bytes()
                .await
                .with_context(|| format!("reading body of {url}"))?;
            return Ok(bytes.to_vec());
        }

        let path = self.local_path(url);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("read logo bytes from '{}'", path.display()))
    }
}

/// Outcome of a single [`LogoLoader::load`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogoLoad {
    /// Fetched and decoded; now the loader's current logo.
    Ready(Arc<LogoAsset>),
    /// Fetch or decode failed; the loader now holds no logo.
    Unavailable,
    /// A newer request was issued before this one finished; result discarded.
    Superseded,
}

impl LogoLoad {
    /// The asset, for [`LogoLoad::Ready`] only.
    pub fn asset(&self) -> Option<&Arc<LogoAsset>> {
        match self {
            LogoLoad::Ready(asset) => Some(asset),
            LogoLoad::Unavailable | LogoLoad::Superseded => None,
        }
    }
}

type SharedFetch = Arc<OnceCell<Option<Arc<LogoAsset>>>>;

#[derive(Default)]
struct LoaderState {
    current_url: Option<String>,
    current: Option<Arc<LogoAsset>>,
    inflight: HashMap<String, SharedFetch>,
}

/// Async logo loader with last-issued-request-wins resolution.
///
/// Every [`load`](Self::load) call takes a token when it is *called*. Only a
/// completion holding the newest token is applied to [`current`](Self::current);
/// older completions resolve to [`LogoLoad::Superseded`]. Concurrent loads of
/// the same URL share one fetch.
pub struct LogoLoader<F> {
    fetcher: F,
    issued: AtomicU64,
    state: Mutex<LoaderState>,
}

impl<F: FetchBytes> LogoLoader<F> {
    /// Loader with no current logo.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            issued: AtomicU64::new(0),
            state: Mutex::new(LoaderState::default()),
        }
    }

    /// Logo of the latest applied request, if it succeeded.
    pub fn current(&self) -> Option<Arc<LogoAsset>> {
        self.lock().current.clone()
    }

    /// URL of the latest applied request.
    pub fn current_url(&self) -> Option<String> {
        self.lock().current_url.clone()
    }

    /// Request the logo at `url`. Ordering is fixed at call time, not when
    /// the returned future is first polled.
    pub fn load(&self, url: &str) -> impl Future<Output = LogoLoad> + Send + '_ {
        let token = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let url = url.to_string();
        async move { self.resolve(token, url).await }
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn resolve(&self, token: u64, url: String) -> LogoLoad {
        let cell = {
            let mut state = self.lock();
            if state.current_url.as_deref() == Some(url.as_str())
                && let Some(asset) = state.current.clone()
                && self.is_latest(token)
            {
                return LogoLoad::Ready(asset);
            }
            state.inflight.entry(url.clone()).or_default().clone()
        };

        let result = cell
            .get_or_init(|| self.fetch_and_decode(&url))
            .await
            .clone();

        let mut state = self.lock();
        if state
            .inflight
            .get(&url)
            .is_some_and(|existing| Arc::ptr_eq(existing, &cell))
        {
            state.inflight.remove(&url);
        }

        if !self.is_latest(token) {
            tracing::debug!(%url, token, "discarding superseded logo load");
            return LogoLoad::Superseded;
        }

        state.current_url = Some(url);
        state.current = result.clone();
        match result {
            Some(asset) => LogoLoad::Ready(asset),
            None => LogoLoad::Unavailable,
        }
    }

    async fn fetch_and_decode(&self, url: &str) -> Option<Arc<LogoAsset>> {
        let bytes = match self.fetcher.fetch(url).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(url, error = %format!("{err:#}"), "logo unavailable");
                return None;
            }
        };
        match decode_logo(url, &bytes) {
            Ok(asset) => {
                tracing::debug!(url, width = asset.width, height = asset.height, "decoded logo");
                Some(Arc::new(asset))
            }
            Err(err) => {
                tracing::warn!(url, error = %err, "logo unavailable");
                None
            }
        }
    }

    fn is_latest(&self, token: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == token
    }

    fn lock(&self) -> MutexGuard<'_, LoaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
