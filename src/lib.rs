//! Notice Drafter - Templated Activity Notices
//!
//! A Rust library for drafting short activity notices, tagging them by
//! district and category, reformatting them through named templates, and
//! searching the stored history.
//!
//! # Features
//!
//! - Keyword classifier for district and category
//! - Template converter with an observable fallback
//! - Append-only SQLite history with date/district/category filters
//! - Editable named templates
//! - Change-aware draft autosave

/// Draft autosave
pub mod autosave;
/// District and category guesses
pub mod classifier;
/// Configuration management
pub mod config;
/// Message store
pub mod db;
/// Error types
pub mod error;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Database schema definitions
pub mod schema;
/// Conversion pipeline
pub mod service;
/// Template converter
pub mod template;
/// Translation seam
pub mod translator;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use classifier::{classify, Classification, Classifier};
pub use db::Database;
pub use error::{NoticeError, Result};
pub use models::{Category, Draft, Language, LogEntry, MessageFilter, MessageTable};
pub use service::NoticeService;
pub use template::{convert, Conversion, NoticeFields};
