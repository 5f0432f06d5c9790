use sqlx::PgPool;

use crate::core::NotesError;

const CREATE_NOTES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS notes (
        id SERIAL PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        content TEXT,
        created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
        completed BOOLEAN DEFAULT FALSE
    )";

// Deployments created before the completion flag existed lack this column.
const ADD_COMPLETED_COLUMN: &str =
    "ALTER TABLE notes ADD COLUMN IF NOT EXISTS completed BOOLEAN DEFAULT FALSE";

/// Makes sure the `notes` table exists with every column the store reads.
/// Safe to run on every start.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), NotesError> {
    sqlx::query(CREATE_NOTES_TABLE).execute(pool).await?;
    sqlx::query(ADD_COMPLETED_COLUMN).execute(pool).await?;
    tracing::info!("notes table is ready");
    Ok(())
}
