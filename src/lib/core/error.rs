use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotesError {
    #[error("Title is required")]
    TitleRequired,
    #[error("Note not found")]
    NotFound,
    #[error("Invalid note id: {0:?}")]
    InvalidId(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
