use crate::config::Config;
use anyhow::Result;
use libsql::{Builder, Connection, Database as LibsqlDatabase};
use std::path::Path;
use std::time::Duration;

const SYSTEM_MIGRATIONS: &[(&str, &str)] =
    &[("system/000_migrations_table.sql", include_str!("migrations/system/000_migrations_table.sql"))];

pub struct Database {
    db: LibsqlDatabase,
    conn: Connection,
    turso_url: Option<String>,
    turso_auth_token: Option<String>,
}

impl Database {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn is_replica(turso_url: &Option<String>, turso_auth_token: &Option<String>) -> bool {
        turso_url.is_some() && turso_auth_token.is_some()
    }

    pub fn syncs_remotely(&self) -> bool {
        Self::is_replica(&self.turso_url, &self.turso_auth_token)
    }

    pub async fn sync(&self) -> Result<()> {
        if self.syncs_remotely() {
            self.db
                .sync()
                .await
                .map_err(|e| anyhow::anyhow!("sync failed: {}", e))?;
        }
        Ok(())
    }

    async fn is_migration_applied(conn: &Connection, name: &str) -> Result<bool> {
        let query = "SELECT 1 FROM _migrations WHERE name = ?";
        match conn.query(query, libsql::params![name]).await {
            Ok(mut rows) => Ok(rows.next().await?.is_some()),
            Err(e) => {
                if e.to_string().contains("no such table") {
                    Ok(false)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn record_migration(conn: &Connection, name: &str) -> Result<()> {
        let query = r#"
            INSERT INTO _migrations (name, applied_at)
            VALUES (?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        "#;
        conn.execute(query, libsql::params![name]).await?;
        Ok(())
    }

    async fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
        if Self::is_migration_applied(conn, name).await? {
            tracing::debug!("migration {} already applied, skipping", name);
            return Ok(());
        }

        tracing::info!("applying migration: {}", name);
        conn.execute_batch(sql)
            .await
            .map_err(|e| anyhow::anyhow!("failed to execute migration {name}: {e}"))?;

        Self::record_migration(conn, name).await?;
        Ok(())
    }

    pub async fn new(cfg: &Config, data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(cfg.app.get_db());
        let turso_url = cfg.app.turso_url.clone();
        let turso_auth_token = cfg.app.turso_auth_token.clone();

        let db = match (&turso_url, &turso_auth_token) {
            (Some(url), Some(token)) => {
                tracing::info!("[db] running in synced database mode (offline writes)");
                let sync_interval = Duration::from_secs(cfg.app.sync_interval_seconds);
                Builder::new_synced_database(&path, url.clone(), token.clone())
                    .sync_interval(sync_interval)
                    .build()
                    .await?
            }
            _ => {
                tracing::info!(path = ?path, "[db] running in local database mode");
                Builder::new_local(&path).build().await?
            }
        };

        Self::setup(db, turso_url, turso_auth_token).await
    }

    /// A throwaway database with the full schema applied.
    pub async fn in_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        Self::setup(db, None, None).await
    }

    async fn setup(
        db: LibsqlDatabase,
        turso_url: Option<String>,
        turso_auth_token: Option<String>,
    ) -> Result<Self> {
        let conn = db.connect()?;
        conn.query("SELECT 1", ()).await?;

        for (filename, sql) in SYSTEM_MIGRATIONS {
            Self::run_migration(&conn, filename, sql).await?;
        }

        for (filename, sql) in crate::favorites::migrations() {
            Self::run_migration(&conn, filename, sql).await?;
        }

        Ok(Database {
            db,
            conn,
            turso_url,
            turso_auth_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_are_recorded_once() {
        let db = Database::in_memory().await.unwrap();
        let conn = db.connection();

        for (filename, sql) in crate::favorites::migrations() {
            Database::run_migration(conn, filename, sql).await.unwrap();
        }

        let mut rows = conn.query("SELECT COUNT(*) FROM _migrations", ()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        let count: i64 = row.get(0).unwrap();
        assert_eq!(count, 1 + crate::favorites::migrations().len() as i64);
        assert!(!db.syncs_remotely());
    }
}
