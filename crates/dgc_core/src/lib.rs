//! Core domain logic for the DGC bulletin manuals service.
//! This crate is the single source of truth for manual storage, month
//! normalization and the weekly recommendation rotation.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, LogTarget, LoggingError};
pub use model::manual::{MainPoint, Manual, ManualId, ManualPatch, ManualValidationError, NewManual};
pub use model::month::Month;
pub use model::note::{Note, NoteId};
pub use repo::manual_repo::{ManualRepository, RepoError, RepoResult, SqliteManualRepository};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use service::manual_service::{
    GroupedManuals, ManualService, ManualServiceError, ManualServiceResult, MonthListing,
};
pub use service::note_service::{NoteService, NoteServiceError};
pub use service::recommend::{recommend, rotation_for, Recommendation, Rotation};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
