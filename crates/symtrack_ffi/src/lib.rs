//! Flutter-facing bindings for the SymTrack core.

pub mod api;
