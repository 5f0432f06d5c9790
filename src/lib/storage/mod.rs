pub mod memory;
pub mod postgres;
pub mod schema;

use async_trait::async_trait;
use crate::core::{Note, NoteDraft, NotesError};

/// One statement per call. Operations addressing a single id return `None`
/// when no row matches.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Note>, NotesError>;
    async fn find(&self, id: i32) -> Result<Option<Note>, NotesError>;
    async fn insert(&self, draft: &NoteDraft) -> Result<Note, NotesError>;
    async fn update(&self, id: i32, draft: &NoteDraft) -> Result<Option<Note>, NotesError>;
    async fn delete(&self, id: i32) -> Result<Option<Note>, NotesError>;
}
