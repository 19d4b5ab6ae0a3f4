//! Device-local note model.
//!
//! # Invariants
//! - `id` is a UUID assigned at creation and never changes.
//! - `date` is a display string refreshed on every save.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type NoteId = Uuid;

/// A personal note kept alongside the manuals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// Short en-US display date, e.g. `Jan 4, 2026`.
    pub date: String,
}

impl Note {
    /// Creates a note with a generated id, stamped with `today`.
    pub fn new(title: impl Into<String>, content: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            date: display_date(today),
        }
    }
}

/// Formats a calendar date the way the client labels notes.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
