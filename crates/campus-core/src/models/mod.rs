//! Data models for the portal client
//!
//! This module contains the data structures exchanged with the backend and
//! the client-side filters applied to them, organized by domain.

mod board;
mod course;
mod lecture;
mod page;
mod post;

// Re-export all models for convenient imports
pub use board::*;
pub use course::*;
pub use lecture::*;
pub use page::*;
pub use post::*;
