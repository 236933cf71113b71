use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::store::FavoriteStore;
use crate::error::FavoriteError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: String,
    pub user_id: String,
    pub poem_slug: String,
    pub poet_name: String,
    pub poem_title: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFavorite {
    pub user_id: String,
    pub poem_slug: String,
    pub poet_name: String,
    pub poem_title: String,
}

/// The poem a user is favoriting, as sent by the page that shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteTarget {
    pub poem_slug: String,
    pub poet_name: String,
    pub poem_title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteStatus {
    Favorited,
    NotFavorited,
}

#[derive(Clone)]
pub struct Favorites {
    store: Arc<dyn FavoriteStore>,
}

fn require(field: &str, value: &str) -> Result<(), FavoriteError> {
    if value.trim().is_empty() {
        return Err(FavoriteError::Invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

impl Favorites {
    pub fn new(store: Arc<dyn FavoriteStore>) -> Self {
        Self { store }
    }

    pub async fn check(&self, user_id: &str, poem_slug: &str) -> Result<FavoriteStatus, FavoriteError> {
        require("user_id", user_id)?;
        require("poem_slug", poem_slug)?;

        match self.store.find(user_id, poem_slug).await? {
            Some(_) => Ok(FavoriteStatus::Favorited),
            None => Ok(FavoriteStatus::NotFavorited),
        }
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Favorite>, FavoriteError> {
        require("user_id", user_id)?;
        Ok(self.store.list(user_id).await?)
    }

    pub async fn add(&self, user_id: &str, target: FavoriteTarget) -> Result<Favorite, FavoriteError> {
        require("user_id", user_id)?;
        require("poem_slug", &target.poem_slug)?;

        let favorite = self
            .store
            .insert(NewFavorite {
                user_id: user_id.to_string(),
                poem_slug: target.poem_slug,
                poet_name: target.poet_name,
                poem_title: target.poem_title,
            })
            .await?;

        tracing::info!(user_id, poem_slug = %favorite.poem_slug, "favorite added");
        Ok(favorite)
    }

    /// Succeeds whether or not a row existed.
    pub async fn remove(&self, user_id: &str, poem_slug: &str) -> Result<(), FavoriteError> {
        require("user_id", user_id)?;
        require("poem_slug", poem_slug)?;

        let removed = self.store.delete(user_id, poem_slug).await?;
        tracing::info!(user_id, poem_slug, removed, "favorite removed");
        Ok(())
    }

    /// `false` both when the poem is not favorited and when the store could
    /// not be asked. Use [`Favorites::check`] to tell the two apart.
    pub async fn is_favorited(&self, user_id: &str, poem_slug: &str) -> bool {
        match self.check(user_id, poem_slug).await {
            Ok(status) => status == FavoriteStatus::Favorited,
            Err(e) => {
                tracing::error!(user_id, poem_slug, error = %e, "failed to check favorite");
                false
            }
        }
    }

    pub async fn list_favorites(&self, user_id: &str) -> Vec<Favorite> {
        self.list(user_id).await.unwrap_or_else(|e| {
            tracing::error!(user_id, error = %e, "failed to fetch favorites");
            vec![]
        })
    }

    pub async fn add_favorite(
        &self,
        user_id: &str,
        poem_slug: &str,
        poet_name: &str,
        poem_title: &str,
    ) -> Option<Favorite> {
        let target = FavoriteTarget {
            poem_slug: poem_slug.to_string(),
            poet_name: poet_name.to_string(),
            poem_title: poem_title.to_string(),
        };

        match self.add(user_id, target).await {
            Ok(favorite) => Some(favorite),
            Err(e) => {
                tracing::error!(user_id, poem_slug, error = %e, "failed to add favorite");
                None
            }
        }
    }

    /// Whether the delete call went through, not whether a row existed.
    pub async fn remove_favorite(&self, user_id: &str, poem_slug: &str) -> bool {
        match self.remove(user_id, poem_slug).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(user_id, poem_slug, error = %e, "failed to remove favorite");
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::StoreError;
    use crate::favorites::LibsqlFavoriteStore;
    use async_trait::async_trait;

    /// A store whose transport is always down.
    pub(crate) struct UnreachableStore;

    fn unreachable() -> StoreError {
        StoreError::Database(Box::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "store unreachable",
        )))
    }

    #[async_trait]
    impl FavoriteStore for UnreachableStore {
        async fn find(&self, _: &str, _: &str) -> Result<Option<Favorite>, StoreError> {
            Err(unreachable())
        }

        async fn list(&self, _: &str) -> Result<Vec<Favorite>, StoreError> {
            Err(unreachable())
        }

        async fn insert(&self, _: NewFavorite) -> Result<Favorite, StoreError> {
            Err(unreachable())
        }

        async fn delete(&self, _: &str, _: &str) -> Result<u64, StoreError> {
            Err(unreachable())
        }
    }

    pub(crate) async fn libsql_favorites() -> Favorites {
        let db = Arc::new(Database::in_memory().await.unwrap());
        Favorites::new(Arc::new(LibsqlFavoriteStore::new(db)))
    }

    #[tokio::test]
    async fn add_then_is_favorited() {
        let favorites = libsql_favorites().await;
        assert!(!favorites.is_favorited("u1", "jing-ye-si").await);

        let added = favorites.add_favorite("u1", "jing-ye-si", "李白", "静夜思").await;
        assert!(added.is_some());
        assert!(favorites.is_favorited("u1", "jing-ye-si").await);
        assert!(!favorites.is_favorited("u2", "jing-ye-si").await);
    }

    #[tokio::test]
    async fn remove_then_not_favorited() {
        let favorites = libsql_favorites().await;
        favorites.add_favorite("u1", "jing-ye-si", "李白", "静夜思").await.unwrap();

        assert!(favorites.remove_favorite("u1", "jing-ye-si").await);
        assert!(!favorites.is_favorited("u1", "jing-ye-si").await);
    }

    #[tokio::test]
    async fn removing_missing_favorite_succeeds() {
        let favorites = libsql_favorites().await;
        assert!(favorites.remove_favorite("u1", "never-added").await);
    }

    #[tokio::test]
    async fn list_favorites_is_scoped_to_user() {
        let favorites = libsql_favorites().await;
        favorites.add_favorite("u1", "a", "李白", "甲").await.unwrap();
        favorites.add_favorite("u2", "b", "杜甫", "乙").await.unwrap();
        favorites.add_favorite("u1", "c", "王维", "丙").await.unwrap();

        let listed = favorites.list_favorites("u1").await;
        let slugs: Vec<&str> = listed.iter().map(|f| f.poem_slug.as_str()).collect();
        assert_eq!(slugs, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn repeated_add_keeps_one_row() {
        let favorites = libsql_favorites().await;
        let first = favorites.add_favorite("u1", "a", "李白", "甲").await.unwrap();
        let second = favorites.add_favorite("u1", "a", "李白", "甲").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(favorites.list_favorites("u1").await.len(), 1);
    }

    #[tokio::test]
    async fn store_failures_map_to_safe_defaults() {
        let favorites = Favorites::new(Arc::new(UnreachableStore));

        assert!(!favorites.is_favorited("u1", "a").await);
        assert!(favorites.list_favorites("u1").await.is_empty());
        assert!(favorites.add_favorite("u1", "a", "李白", "甲").await.is_none());
        assert!(!favorites.remove_favorite("u1", "a").await);
    }

    #[tokio::test]
    async fn explicit_results_distinguish_errors_from_absence() {
        let down = Favorites::new(Arc::new(UnreachableStore));
        assert!(matches!(down.check("u1", "a").await, Err(FavoriteError::Store(_))));

        let up = libsql_favorites().await;
        assert_eq!(up.check("u1", "a").await.unwrap(), FavoriteStatus::NotFavorited);
    }

    #[tokio::test]
    async fn empty_identifiers_are_rejected_before_the_store() {
        let favorites = Favorites::new(Arc::new(UnreachableStore));

        assert!(matches!(favorites.check("", "a").await, Err(FavoriteError::Invalid(_))));
        assert!(matches!(favorites.check("u1", "  ").await, Err(FavoriteError::Invalid(_))));
        assert!(matches!(favorites.list("").await, Err(FavoriteError::Invalid(_))));
        assert!(matches!(favorites.remove("u1", "").await, Err(FavoriteError::Invalid(_))));
    }
}
