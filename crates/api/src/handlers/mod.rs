//! Request handlers.
//!
//! Each submodule provides async handler functions for one area. Handlers
//! delegate to the repositories in `academy_db` (or the video processor) and
//! map errors via [`crate::error::AppError`].

pub mod course;
pub mod lesson;
pub mod mux_webhook;
pub mod reorder;
pub mod section;
