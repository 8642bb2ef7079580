//! Lazy, shared loading of the rendering library.
//!
//! [`LibraryLoader::get`] runs the load at most once at a time. The state
//! machine is:
//!
//! ```text
//!   NotStarted ──get()──▶ InFlight(shared future) ──ok──▶ Loaded(Arc<L>)
//!       ▲                        │
//!       └────────── err ─────────┘
//! ```
//!
//! Callers that arrive while the load is in flight clone the same
//! [`Shared`] future instead of starting their own, so N concurrent
//! conversions trigger exactly one load and all see the same handle. A
//! failed load hands the same error to every waiter and resets the state to
//! `NotStarted`, so the next call retries.
//!
//! The mutex only guards the state transition and is never held across an
//! `.await`.

use crate::error::LibraryLoadError;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

type LoadResult<L> = Result<Arc<L>, LibraryLoadError>;
type PendingLoad<L> = Shared<BoxFuture<'static, LoadResult<L>>>;
type LoadFn<L> = dyn Fn() -> BoxFuture<'static, Result<L, LibraryLoadError>> + Send + Sync;

enum LoadState<L> {
    NotStarted,
    InFlight(PendingLoad<L>),
    Loaded(Arc<L>),
}

/// Observable phase of a [`LibraryLoader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    NotStarted,
    InFlight,
    Loaded,
}

/// Memoises a library handle that is expensive to create.
pub struct LibraryLoader<L> {
    state: Arc<Mutex<LoadState<L>>>,
    load: Arc<LoadFn<L>>,
}

impl<L: Send + Sync + 'static> LibraryLoader<L> {
    /// Create a loader that calls `load` whenever a (re)load is needed.
    pub fn new<F, Fut>(load: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<L, LibraryLoadError>> + Send + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(LoadState::NotStarted)),
            load: Arc::new(move || load().boxed()),
        }
    }

    /// A loader that is already in the `Loaded` state.
    pub fn preloaded(library: L) -> Self {
        Self {
            state: Arc::new(Mutex::new(LoadState::Loaded(Arc::new(library)))),
            load: Arc::new(|| {
                async { Err::<L, _>(LibraryLoadError::new("preloaded library cannot be reloaded")) }
                    .boxed()
            }),
        }
    }

    /// Get the library, loading it on first use.
    ///
    /// Returns without suspending once loaded.
    pub async fn get(&self) -> Result<Arc<L>, LibraryLoadError> {
        let pending = {
            let mut state = lock(&self.state);
            match &*state {
                LoadState::Loaded(library) => return Ok(Arc::clone(library)),
                LoadState::InFlight(pending) => {
                    debug!("Library load already in flight; waiting on it");
                    pending.clone()
                }
                LoadState::NotStarted => {
                    info!("Loading PDF rendering library");
                    let pending = self.start_load();
                    *state = LoadState::InFlight(pending.clone());
                    pending
                }
            }
        };
        pending.await
    }

    pub fn status(&self) -> LoadStatus {
        match &*lock(&self.state) {
            LoadState::NotStarted => LoadStatus::NotStarted,
            LoadState::InFlight(_) => LoadStatus::InFlight,
            LoadState::Loaded(_) => LoadStatus::Loaded,
        }
    }

    fn start_load(&self) -> PendingLoad<L> {
        let state = Arc::clone(&self.state);
        let load = (self.load)();
        async move {
            let outcome = load.await.map(Arc::new);
            let next = match &outcome {
                Ok(library) => {
                    info!("PDF rendering library loaded");
                    LoadState::Loaded(Arc::clone(library))
                }
                Err(e) => {
                    warn!("{}; next call will retry", e);
                    LoadState::NotStarted
                }
            };
            *lock(&state) = next;
            outcome
        }
        .boxed()
        .shared()
    }
}

impl<L> fmt::Debug for LibraryLoader<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match &*lock(&self.state) {
            LoadState::NotStarted => "NotStarted",
            LoadState::InFlight(_) => "InFlight",
            LoadState::Loaded(_) => "Loaded",
        };
        f.debug_struct("LibraryLoader")
            .field("status", &status)
            .finish()
    }
}

fn lock<L>(state: &Mutex<LoadState<L>>) -> MutexGuard<'_, LoadState<L>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
