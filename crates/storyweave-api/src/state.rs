//! Shared application state.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use storyweave_core::clock::{Clock, SystemClock};
use storyweave_telemetry::application::store::{InMemorySessionStore, SessionStore};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for session timestamps and ids.
    pub clock: Arc<dyn Clock>,
    /// Randomness for session id suffixes.
    pub rng: Arc<Mutex<dyn RngCore + Send>>,
    /// Session storage.
    pub store: Arc<dyn SessionStore>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        rng: Arc<Mutex<dyn RngCore + Send>>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self { clock, rng, store }
    }

    /// Production state: system clock, OS-seeded RNG, in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(SystemClock),
            Arc::new(Mutex::new(StdRng::from_os_rng())),
            Arc::new(InMemorySessionStore::new()),
        )
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("now", &self.clock.now())
            .finish_non_exhaustive()
    }
}
