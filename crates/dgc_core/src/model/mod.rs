//! Domain model for bulletin manuals and device-local notes.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own the calendar month vocabulary shared by storage and the HTTP surface.
//!
//! # Invariants
//! - Every manual belongs to exactly one of the 12 calendar months.
//! - Deletion is a hard delete; there are no tombstones.

pub mod manual;
pub mod month;
pub mod note;
