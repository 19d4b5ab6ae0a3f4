//! Note use-case service.
//!
//! # Responsibility
//! - Mirror the client's autosave behavior for device-local notes.
//!
//! # Invariants
//! - A note without an id is only created once its title is non-blank.
//! - Every save restamps the display date.

use crate::model::note::{display_date, Note, NoteId};
use crate::repo::manual_repo::RepoError;
use crate::repo::note_repo::NoteRepository;
use chrono::NaiveDate;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::NoteNotFound(_) => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Saves the current editor state.
    ///
    /// Returns `Ok(None)` when nothing was persisted: a new note whose title
    /// is still blank.
    pub fn autosave(
        &self,
        id: Option<NoteId>,
        title: impl Into<String>,
        content: impl Into<String>,
        today: NaiveDate,
    ) -> Result<Option<Note>, NoteServiceError> {
        let title = title.into();
        let content = content.into();

        let note = match id {
            Some(id) => {
                let mut existing = self
                    .repo
                    .get_note(id)?
                    .ok_or(NoteServiceError::NoteNotFound(id))?;
                existing.title = title;
                existing.content = content;
                existing.date = display_date(today);
                existing
            }
            None if title.trim().is_empty() => return Ok(None),
            None => Note::new(title, content, today),
        };

        self.repo.put_note(&note)?;
        info!("event=note_save module=service status=ok id={}", note.id);
        Ok(Some(note))
    }

    /// Gets one note by id.
    pub fn get_note(&self, id: NoteId) -> Result<Note, NoteServiceError> {
        self.repo
            .get_note(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))
    }

    /// Lists notes in creation order.
    pub fn list_notes(&self) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self.repo.list_notes()?)
    }

    /// Deletes one note.
    pub fn delete_note(&self, id: NoteId) -> Result<(), NoteServiceError> {
        match self.repo.delete_note(id) {
            Ok(()) => {
                info!("event=note_delete module=service status=ok id={id}");
                Ok(())
            }
            Err(RepoError::NotFound(_)) => Err(NoteServiceError::NoteNotFound(id)),
            Err(err) => Err(err.into()),
        }
    }
}
