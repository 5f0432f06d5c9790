use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};

use crate::config::DatabaseConfig;
use crate::core::{Note, NoteDraft, NotesError};
use crate::storage::NoteStore;

/// Opens the process-wide pool. Without a URL the libpq `PG*` variables
/// are used. Production deployments encrypt without verifying the server
/// certificate; everything else connects in plain text unless the URL says
/// otherwise.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, NotesError> {
    let mut options = match &config.url {
        Some(url) => PgConnectOptions::from_str(url)?,
        None => PgConnectOptions::new(),
    };
    if !config.ssl_mode_explicit {
        options = options.ssl_mode(if config.production {
            PgSslMode::Require
        } else {
            PgSslMode::Disable
        });
    }
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

#[derive(Clone)]
pub struct PgNoteStore {
    pool: PgPool,
}

impl PgNoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn list(&self) -> Result<Vec<Note>, NotesError> {
        let notes = sqlx::query_as::<_, Note>(
            "SELECT id, title, content, created_at, updated_at,
                    COALESCE(completed, FALSE) AS completed
             FROM notes
             ORDER BY updated_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(notes)
    }

    async fn find(&self, id: i32) -> Result<Option<Note>, NotesError> {
        let note = sqlx::query_as::<_, Note>(
            "SELECT id, title, content, created_at, updated_at,
                    COALESCE(completed, FALSE) AS completed
             FROM notes
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(note)
    }

    async fn insert(&self, draft: &NoteDraft) -> Result<Note, NotesError> {
        let note = sqlx::query_as::<_, Note>(
            "INSERT INTO notes (title, content, completed)
             VALUES ($1, $2, $3)
             RETURNING id, title, content, created_at, updated_at,
                       COALESCE(completed, FALSE) AS completed",
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(draft.completed)
        .fetch_one(&self.pool)
        .await?;
        Ok(note)
    }

    async fn update(&self, id: i32, draft: &NoteDraft) -> Result<Option<Note>, NotesError> {
        let note = sqlx::query_as::<_, Note>(
            "UPDATE notes
             SET title = $1, content = $2, completed = $3, updated_at = CURRENT_TIMESTAMP
             WHERE id = $4
             RETURNING id, title, content, created_at, updated_at,
                       COALESCE(completed, FALSE) AS completed",
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(draft.completed)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(note)
    }

    async fn delete(&self, id: i32) -> Result<Option<Note>, NotesError> {
        let note = sqlx::query_as::<_, Note>(
            "DELETE FROM notes
             WHERE id = $1
             RETURNING id, title, content, created_at, updated_at,
                       COALESCE(completed, FALSE) AS completed",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(note)
    }
}
