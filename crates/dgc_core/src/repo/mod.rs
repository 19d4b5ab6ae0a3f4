//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for manuals and notes.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Manual writes enforce `Manual::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`) in
//!   addition to DB transport errors.

pub mod manual_repo;
pub mod note_repo;
