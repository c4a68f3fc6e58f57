use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Error as SqlxError, FromRow};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::info;

// Global database instance
static DB: OnceCell<Arc<DbStore>> = OnceCell::const_new();

/// Initialize the global database connection
///
/// # Arguments
/// * `database_url` - PostgreSQL connection string
pub async fn init_db(database_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = DbStore::new(database_url).await?;
    db.ensure_schema().await?;
    DB.set(Arc::new(db))
        .map_err(|_| "Database already initialized")?;
    Ok(())
}

/// Get the global database instance, if one was configured
pub fn get_db() -> Option<Arc<DbStore>> {
    DB.get().cloned()
}

/// Persisted room record
#[derive(Debug, Clone, FromRow)]
pub struct RoomRow {
    pub room_id: String,
    pub room_name: String,
    pub language: String,
    pub duration: String,
    pub created_at: DateTime<Utc>,
}

/// Persisted feedback note, one per room
#[derive(Debug, Clone, FromRow)]
pub struct NoteRow {
    pub room_id: String,
    pub feedback: String,
    pub updated_at: DateTime<Utc>,
}

/// Archived interview session
#[derive(Debug, Clone, FromRow)]
pub struct InterviewRow {
    pub id: uuid::Uuid,
    pub participants: Vec<String>,
    pub feedback: String,
    pub duration: i64,
    pub created_at: DateTime<Utc>,
}

/// Database connection pool
pub struct DbStore {
    pool: PgPool,
}

impl DbStore {
    /// Create a new database connection pool
    pub async fn new(database_url: &str) -> Result<Self, SqlxError> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(database_url)
            .await?;

        info!("Database connection pool created successfully");

        Ok(Self { pool })
    }

    /// Create the rooms and notes tables when they do not exist yet
    pub async fn ensure_schema(&self) -> Result<(), SqlxError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS rooms (
                room_id    TEXT PRIMARY KEY,
                room_name  TEXT NOT NULL,
                language   TEXT NOT NULL,
                duration   TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notes (
                room_id    TEXT PRIMARY KEY,
                feedback   TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS interviews (
                id           UUID PRIMARY KEY,
                participants TEXT[] NOT NULL,
                feedback     TEXT NOT NULL,
                duration     BIGINT NOT NULL,
                created_at   TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Persist a new room record
    pub async fn insert_room(
        &self,
        room_id: &str,
        room_name: &str,
        language: &str,
        duration: &str,
    ) -> Result<RoomRow, SqlxError> {
        let row: RoomRow = sqlx::query_as(
            r#"
            INSERT INTO rooms (room_id, room_name, language, duration)
            VALUES ($1, $2, $3, $4)
            RETURNING room_id, room_name, language, duration, created_at
            "#,
        )
        .bind(room_id)
        .bind(room_name)
        .bind(language)
        .bind(duration)
        .fetch_one(&self.pool)
        .await?;

        info!("Room persisted: {}", row.room_id);
        Ok(row)
    }

    /// Find a room record by its id
    pub async fn find_room(&self, room_id: &str) -> Result<Option<RoomRow>, SqlxError> {
        sqlx::query_as(
            r#"
            SELECT room_id, room_name, language, duration, created_at
            FROM rooms
            WHERE room_id = $1
            "#,
        )
        .bind(room_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Insert or replace the feedback note for a room
    pub async fn upsert_note(&self, room_id: &str, feedback: &str) -> Result<NoteRow, SqlxError> {
        sqlx::query_as(
            r#"
            INSERT INTO notes (room_id, feedback)
            VALUES ($1, $2)
            ON CONFLICT (room_id)
            DO UPDATE SET feedback = EXCLUDED.feedback, updated_at = now()
            RETURNING room_id, feedback, updated_at
            "#,
        )
        .bind(room_id)
        .bind(feedback)
        .fetch_one(&self.pool)
        .await
    }

    /// Archive a finished interview session
    pub async fn insert_interview(
        &self,
        participants: &[String],
        feedback: &str,
        duration: i64,
    ) -> Result<InterviewRow, SqlxError> {
        sqlx::query_as(
            r#"
            INSERT INTO interviews (id, participants, feedback, duration)
            VALUES ($1, $2, $3, $4)
            RETURNING id, participants, feedback, duration, created_at
            "#,
        )
        .bind(uuid::Uuid::new_v4())
        .bind(participants)
        .bind(feedback)
        .bind(duration)
        .fetch_one(&self.pool)
        .await
    }

    /// Find the feedback note for a room
    pub async fn find_note(&self, room_id: &str) -> Result<Option<NoteRow>, SqlxError> {
        sqlx::query_as(
            r#"
            SELECT room_id, feedback, updated_at
            FROM notes
            WHERE room_id = $1
            "#,
        )
        .bind(room_id)
        .fetch_optional(&self.pool)
        .await
    }
}
