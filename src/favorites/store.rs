use async_trait::async_trait;
use std::sync::Arc;

use super::service::{Favorite, NewFavorite};
use crate::db::Database;
use crate::error::StoreError;

/// Remote persistence for favorites.
///
/// `insert` is an idempotent upsert on (user_id, poem_slug): a second insert
/// for the same pair returns the row that is already there. `delete` reports
/// how many rows went away; zero is not an error.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn find(&self, user_id: &str, poem_slug: &str) -> Result<Option<Favorite>, StoreError>;

    /// Newest first.
    async fn list(&self, user_id: &str) -> Result<Vec<Favorite>, StoreError>;

    async fn insert(&self, favorite: NewFavorite) -> Result<Favorite, StoreError>;

    async fn delete(&self, user_id: &str, poem_slug: &str) -> Result<u64, StoreError>;
}

pub struct LibsqlFavoriteStore {
    db: Arc<Database>,
}

impl LibsqlFavoriteStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn row_to_favorite(row: &libsql::Row) -> Result<Favorite, StoreError> {
        let column = |idx: i32| -> Result<String, StoreError> {
            row.get::<String>(idx)
                .map_err(|e| StoreError::Decode(format!("favorites column {idx}: {e}")))
        };

        Ok(Favorite {
            id: column(0)?,
            user_id: column(1)?,
            poem_slug: column(2)?,
            poet_name: column(3)?,
            poem_title: column(4)?,
            created_at: column(5)?,
        })
    }
}

#[async_trait]
impl FavoriteStore for LibsqlFavoriteStore {
    async fn find(&self, user_id: &str, poem_slug: &str) -> Result<Option<Favorite>, StoreError> {
        let query = r#"
            SELECT id, user_id, poem_slug, poet_name, poem_title, created_at
            FROM favorites
            WHERE user_id = ? AND poem_slug = ?
            LIMIT 1
        "#;

        let mut rows = self
            .db
            .connection()
            .query(query, libsql::params![user_id, poem_slug])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_favorite(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Favorite>, StoreError> {
        let query = r#"
            SELECT id, user_id, poem_slug, poet_name, poem_title, created_at
            FROM favorites
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
        "#;

        let mut rows = self
            .db
            .connection()
            .query(query, libsql::params![user_id])
            .await?;
        let mut favorites = Vec::new();

        while let Some(row) = rows.next().await? {
            favorites.push(Self::row_to_favorite(&row)?);
        }

        Ok(favorites)
    }

    async fn insert(&self, favorite: NewFavorite) -> Result<Favorite, StoreError> {
        let query = r#"
            INSERT INTO favorites (user_id, poem_slug, poet_name, poem_title)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id, poem_slug) DO NOTHING
            RETURNING id, user_id, poem_slug, poet_name, poem_title, created_at
        "#;

        let inserted = {
            let mut rows = self
                .db
                .connection()
                .query(
                    query,
                    libsql::params![
                        favorite.user_id.as_str(),
                        favorite.poem_slug.as_str(),
                        favorite.poet_name.as_str(),
                        favorite.poem_title.as_str()
                    ],
                )
                .await?;

            match rows.next().await? {
                Some(row) => Some(Self::row_to_favorite(&row)?),
                None => None,
            }
        };

        if let Some(created) = inserted {
            return Ok(created);
        }

        tracing::debug!(
            user_id = %favorite.user_id,
            poem_slug = %favorite.poem_slug,
            "favorite already exists, returning existing row"
        );
        self.find(&favorite.user_id, &favorite.poem_slug)
            .await?
            .ok_or_else(|| {
                StoreError::Missing(format!(
                    "favorite {}/{} neither inserted nor found",
                    favorite.user_id, favorite.poem_slug
                ))
            })
    }

    async fn delete(&self, user_id: &str, poem_slug: &str) -> Result<u64, StoreError> {
        let removed = self
            .db
            .connection()
            .execute(
                "DELETE FROM favorites WHERE user_id = ? AND poem_slug = ?",
                libsql::params![user_id, poem_slug],
            )
            .await?;
        Ok(removed)
    }
}
