//! Foundation types for Lumen.
//!
//! This crate contains the types shared by every Lumen crate: the persisted
//! data model (history entries, bookmarks, settings), the shell
//! configuration, and the error type.

pub mod config;
pub mod error;
pub mod models;
