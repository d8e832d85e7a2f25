//! Domain model for profile selections and the activity timeline.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep invariants (severity keys, append-only ordering) inside the types.
//!
//! # Invariants
//! - Timeline entries are identified by a stable `EntryId` and never mutated.
//! - Profile fields are only written through methods that uphold invariants.

pub mod activity;
pub mod catalog;
pub mod profile;
pub mod timeline;
pub mod validation;
