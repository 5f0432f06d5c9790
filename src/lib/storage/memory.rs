use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::core::{Note, NoteDraft, NotesError};
use crate::storage::NoteStore;

/// Keeps notes in process memory. Ids start at 1 and are never reused.
#[derive(Default)]
pub struct MemoryNoteStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    last_id: i32,
    notes: BTreeMap<i32, Note>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn list(&self) -> Result<Vec<Note>, NotesError> {
        let inner = self.inner.lock().await;
        let mut notes: Vec<Note> = inner.notes.values().cloned().collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(notes)
    }

    async fn find(&self, id: i32) -> Result<Option<Note>, NotesError> {
        Ok(self.inner.lock().await.notes.get(&id).cloned())
    }

    async fn insert(&self, draft: &NoteDraft) -> Result<Note, NotesError> {
        let mut inner = self.inner.lock().await;
        inner.last_id = inner
            .last_id
            .checked_add(1)
            .ok_or_else(|| NotesError::Unavailable("note id sequence exhausted".into()))?;
        let now = Some(Utc::now());
        let note = Note {
            id: inner.last_id,
            title: draft.title.clone(),
            content: Some(draft.content.clone()),
            created_at: now,
            updated_at: now,
            completed: draft.completed,
        };
        inner.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn update(&self, id: i32, draft: &NoteDraft) -> Result<Option<Note>, NotesError> {
        let mut inner = self.inner.lock().await;
        let Some(note) = inner.notes.get_mut(&id) else {
            return Ok(None);
        };
        note.title = draft.title.clone();
        note.content = Some(draft.content.clone());
        note.completed = draft.completed;
        note.updated_at = Some(Utc::now());
        Ok(Some(note.clone()))
    }

    async fn delete(&self, id: i32) -> Result<Option<Note>, NotesError> {
        Ok(self.inner.lock().await.notes.remove(&id))
    }
}
