use std::sync::Arc;

use crate::core::{Note, NoteInput, NotesError, parse_note_id};
use crate::storage::NoteStore;

/// The five note operations. Ids arrive as raw path segments; a body is
/// validated before its id is looked at.
#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn NoteStore>,
}

impl NoteService {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Note>, NotesError> {
        self.store.list().await
    }

    pub async fn get(&self, id: &str) -> Result<Note, NotesError> {
        let id = parse_note_id(id)?;
        self.store.find(id).await?.ok_or(NotesError::NotFound)
    }

    pub async fn create(&self, input: NoteInput) -> Result<Note, NotesError> {
        let draft = input.into_draft()?;
        let note = self.store.insert(&draft).await?;
        tracing::debug!(id = note.id, "note created");
        Ok(note)
    }

    /// Replaces title, content and completed wholesale; omitted fields fall
    /// back to their defaults.
    pub async fn update(&self, id: &str, input: NoteInput) -> Result<Note, NotesError> {
        let draft = input.into_draft()?;
        let id = parse_note_id(id)?;
        let note = self
            .store
            .update(id, &draft)
            .await?
            .ok_or(NotesError::NotFound)?;
        tracing::debug!(id, completed = note.completed, "note updated");
        Ok(note)
    }

    pub async fn delete(&self, id: &str) -> Result<Note, NotesError> {
        let id = parse_note_id(id)?;
        let note = self.store.delete(id).await?.ok_or(NotesError::NotFound)?;
        tracing::debug!(id, "note deleted");
        Ok(note)
    }
}
