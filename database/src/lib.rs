use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;
use zenith_core::{CoreError, DatabaseError, Monitor, MonitorDraft};


/// Persisted collection of monitors keyed by an opaque id.
#[async_trait]
pub trait MonitorStore: Send + Sync {
    /// All monitors in creation order.
    async fn list(&self) -> Result<Vec<Monitor>, CoreError>;

    async fn create(&self, draft: &MonitorDraft) -> Result<Monitor, CoreError>;

    /// Fails with [`CoreError::NotFound`] when no monitor has this id.
    async fn get(&self, id: &str) -> Result<Monitor, CoreError>;

    /// Overwrites subreddit and keywords in place. Fails with [`CoreError::NotFound`]
    /// without touching anything when the id is unknown.
    async fn update(&self, id: &str, draft: &MonitorDraft) -> Result<Monitor, CoreError>;

    /// Returns whether a monitor existed and was removed.
    async fn delete(&self, id: &str) -> Result<bool, CoreError>;
}

#[derive(Debug, FromRow)]
struct MonitorRow {
    id: String,
    subreddit: String,
    keywords: String,
}

impl From<MonitorRow> for Monitor {
    fn from(row: MonitorRow) -> Self {
        Self {
            id: row.id,
            subreddit: row.subreddit,
            keywords: row.keywords,
        }
    }
}

fn monitor_not_found() -> CoreError {
    CoreError::NotFound {
        resource: "Monitor".to_string(),
    }
}

pub struct Database {
    connection_string: String,
    pool: Option<SqlitePool>,
}

impl Database {
    pub fn new(connection_string: String) -> Self {
        Self {
            connection_string,
            pool: None,
        }
    }

    pub async fn connect(&mut self) -> Result<(), CoreError> {
        let options = SqliteConnectOptions::from_str(&self.connection_string)
            .map_err(|e| DatabaseError::ConnectionFailed {
                reason: e.to_string(),
            })?
            .create_if_missing(true);

        // Every connection to `:memory:` opens its own empty database, so keep exactly one
        // alive for the lifetime of the pool.
        let pool_options = if self.connection_string.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed {
                reason: e.to_string(),
            })?;

        info!("Connected to monitor database");
        self.pool = Some(pool);
        Ok(())
    }

    pub async fn run_migrations(&self) -> Result<(), CoreError> {
        sqlx::migrate!("./migrations")
            .run(self.pool()?)
            .await
            .map_err(|e| DatabaseError::MigrationFailed {
                migration: e.to_string(),
            })?;

        info!("Database migrations applied");
        Ok(())
    }

    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }

    fn pool(&self) -> Result<&SqlitePool, CoreError> {
        self.pool.as_ref().ok_or_else(|| {
            DatabaseError::ConnectionFailed {
                reason: "database is not connected".to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl MonitorStore for Database {
    async fn list(&self) -> Result<Vec<Monitor>, CoreError> {
        let rows: Vec<MonitorRow> = sqlx::query_as(
            "SELECT id, subreddit, keywords FROM monitors ORDER BY created_at ASC, rowid ASC",
        )
        .fetch_all(self.pool()?)
        .await
        .map_err(DatabaseError::from)?;

        debug!("Listed {} monitors", rows.len());
        Ok(rows.into_iter().map(Monitor::from).collect())
    }

    async fn create(&self, draft: &MonitorDraft) -> Result<Monitor, CoreError> {
        let monitor = Monitor {
            id: Uuid::new_v4().to_string(),
            subreddit: draft.subreddit().to_string(),
            keywords: draft.keywords().to_string(),
        };
        let now: DateTime<Utc> = Utc::now();

        sqlx::query(
            "INSERT INTO monitors (id, subreddit, keywords, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&monitor.id)
        .bind(&monitor.subreddit)
        .bind(&monitor.keywords)
        .bind(now)
        .bind(now)
        .execute(self.pool()?)
        .await
        .map_err(DatabaseError::from)?;

        info!("Created monitor {} for r/{}", monitor.id, monitor.subreddit);
        Ok(monitor)
    }

    async fn get(&self, id: &str) -> Result<Monitor, CoreError> {
        let row: Option<MonitorRow> =
            sqlx::query_as("SELECT id, subreddit, keywords FROM monitors WHERE id = ?")
                .bind(id)
                .fetch_optional(self.pool()?)
                .await
                .map_err(DatabaseError::from)?;

        row.map(Monitor::from).ok_or_else(monitor_not_found)
    }

    async fn update(&self, id: &str, draft: &MonitorDraft) -> Result<Monitor, CoreError> {
        let result = sqlx::query(
            "UPDATE monitors SET subreddit = ?, keywords = ?, updated_at = ? WHERE id = ?",
        )
        .bind(draft.subreddit())
        .bind(draft.keywords())
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool()?)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            debug!("Update skipped, monitor {} does not exist", id);
            return Err(monitor_not_found());
        }

        info!("Updated monitor {}", id);
        Ok(Monitor {
            id: id.to_string(),
            subreddit: draft.subreddit().to_string(),
            keywords: draft.keywords().to_string(),
        })
    }

    async fn delete(&self, id: &str) -> Result<bool, CoreError> {
        let result = sqlx::query("DELETE FROM monitors WHERE id = ?")
            .bind(id)
            .execute(self.pool()?)
            .await
            .map_err(DatabaseError::from)?;

        let removed = result.rows_affected() > 0;
        if removed {
            info!("Deleted monitor {}", id);
        } else {
            debug!("Delete of unknown monitor {} ignored", id);
        }
        Ok(removed)
    }
}
