use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use super::service::{FavoriteStatus, FavoriteTarget, Favorites};
use crate::error::FavoriteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleState {
    Checking,
    Favorited,
    NotFavorited,
    /// The last status check failed.
    Unknown,
}

impl From<FavoriteStatus> for ToggleState {
    fn from(status: FavoriteStatus) -> Self {
        match status {
            FavoriteStatus::Favorited => ToggleState::Favorited,
            FavoriteStatus::NotFavorited => ToggleState::NotFavorited,
        }
    }
}

/// Favorite status of one poem for one user.
///
/// State only moves after the store has answered. While a call is running the
/// toggle is loading and refuses a second call with [`FavoriteError::Busy`].
/// If the caller's token is cancelled before the answer arrives, the answer is
/// dropped and the state stays where it was.
pub struct FavoriteToggle {
    favorites: Favorites,
    user_id: String,
    target: FavoriteTarget,
    state: Mutex<ToggleState>,
    loading: AtomicBool,
}

struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl FavoriteToggle {
    pub fn new(favorites: Favorites, user_id: impl Into<String>, target: FavoriteTarget) -> Self {
        Self {
            favorites,
            user_id: user_id.into(),
            target,
            state: Mutex::new(ToggleState::Checking),
            loading: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> ToggleState {
        *self.lock_state()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    fn lock_state(&self) -> MutexGuard<'_, ToggleState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self) -> Result<LoadingGuard<'_>, FavoriteError> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| FavoriteError::Busy)?;
        Ok(LoadingGuard(&self.loading))
    }

    pub async fn refresh(&self, cancel: &CancellationToken) -> Result<ToggleState, FavoriteError> {
        let _loading = self.begin()?;
        let result = self.favorites.check(&self.user_id, &self.target.poem_slug).await;

        if cancel.is_cancelled() {
            return Err(FavoriteError::Cancelled);
        }

        let mut state = self.lock_state();
        match result {
            Ok(status) => {
                *state = status.into();
                Ok(*state)
            }
            Err(e) => {
                *state = ToggleState::Unknown;
                Err(e)
            }
        }
    }

    pub async fn toggle(&self, cancel: &CancellationToken) -> Result<ToggleState, FavoriteError> {
        let _loading = self.begin()?;

        let next = match self.state() {
            ToggleState::Favorited => self
                .favorites
                .remove(&self.user_id, &self.target.poem_slug)
                .await
                .map(|_| ToggleState::NotFavorited),
            ToggleState::NotFavorited => self
                .favorites
                .add(&self.user_id, self.target.clone())
                .await
                .map(|_| ToggleState::Favorited),
            ToggleState::Checking | ToggleState::Unknown => return Err(FavoriteError::StatusUnknown),
        };

        if cancel.is_cancelled() {
            tracing::debug!(
                user_id = %self.user_id,
                poem_slug = %self.target.poem_slug,
                "toggle finished after cancellation, result discarded"
            );
            return Err(FavoriteError::Cancelled);
        }

        let next = next?;
        *self.lock_state() = next;
        Ok(next)
    }
}

/// (user_id, poem_slug) pairs with a toggle running somewhere in the process.
#[derive(Debug, Default)]
pub struct InFlight {
    pairs: Mutex<HashSet<(String, String)>>,
}

pub struct InFlightPermit {
    registry: Arc<InFlight>,
    key: (String, String),
}

impl InFlight {
    pub fn try_acquire(self: &Arc<Self>, user_id: &str, poem_slug: &str) -> Option<InFlightPermit> {
        let key = (user_id.to_string(), poem_slug.to_string());
        let mut pairs = self.pairs.lock().unwrap_or_else(|e| e.into_inner());
        if !pairs.insert(key.clone()) {
            return None;
        }

        Some(InFlightPermit {
            registry: Arc::clone(self),
            key,
        })
    }
}

impl Drop for InFlightPermit {
    fn drop(&mut self) {
        let mut pairs = self.registry.pairs.lock().unwrap_or_else(|e| e.into_inner());
        pairs.remove(&self.key);
    }
}
