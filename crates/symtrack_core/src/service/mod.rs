//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate model mutations and repository calls into use-case APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod app_state;
pub mod selection;
pub mod tracking;
