//! Favorites Module
//!
//! Per-user favorite poems, kept in the relational store. The store is injected
//! as a [`FavoriteStore`] trait object so the service can run against libsql in
//! production and against fakes in tests.
//!
//! # Layers
//!
//! - [`FavoriteStore`]: the four CRUD calls the feature needs
//! - [`Favorites`]: validation, explicit results, and the default-on-error
//!   convenience calls (`is_favorited`, `list_favorites`, ...)
//! - [`FavoriteToggle`]: status state machine for one (user, poem) pair,
//!   updated only after the store confirms
//! - [`InFlight`]: registry that turns away a second toggle for a pair while
//!   the first is still running
//!
//! # Usage
//!
//! ```rust,ignore
//! use shici::favorites::{self, Favorites, LibsqlFavoriteStore};
//!
//! let favorites = Favorites::new(Arc::new(LibsqlFavoriteStore::new(db.clone())));
//! let app = Router::new()
//!     .nest("/api/favorites", favorites::routes())
//!     .with_state(app_state);
//! ```

mod handler;
mod routes;
mod service;
mod store;
mod toggle;

pub use routes::routes;
pub use service::{Favorite, FavoriteStatus, FavoriteTarget, Favorites, NewFavorite};
pub use store::{FavoriteStore, LibsqlFavoriteStore};
pub use toggle::{FavoriteToggle, InFlight, InFlightPermit, ToggleState};

/// Schema for the favorites table, applied at startup.
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[("favorites_001_schema.sql", include_str!("migrations/001_schema.sql"))]
}
