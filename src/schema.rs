//! Database schema definitions
//!
//! This module provides constants for table and column names used with rusqlite.
//! The matching DDL lives under `migrations/`.

/// Raw input messages table schema
pub mod input_messages {
    /// Table name
    pub const TABLE: &str = "input_messages";
    /// Primary key column
    pub const ID: &str = "id";
    /// Draft text column
    pub const MESSAGE: &str = "message";
    /// Language column
    pub const LANG: &str = "lang";
    /// District tag column
    pub const DISTRICT: &str = "district";
    /// Category code column
    pub const CATEGORY: &str = "category";
    /// Creation timestamp column
    pub const TIMESTAMP: &str = "timestamp";
}

/// Translated messages table schema
pub mod translated_messages {
    /// Table name
    pub const TABLE: &str = "translated_messages";
}

/// Converted messages table schema
pub mod converted_messages {
    /// Table name
    pub const TABLE: &str = "converted_messages";
}

/// Columns shared by all three message tables
pub mod message_columns {
    pub use super::input_messages::{CATEGORY, DISTRICT, ID, MESSAGE, TIMESTAMP};
}

/// Templates table schema
pub mod templates {
    /// Table name
    pub const TABLE: &str = "templates";
    /// Primary key column
    pub const ID: &str = "id";
    /// Unique template name column
    pub const NAME: &str = "name";
    /// Template text column
    pub const TEXT: &str = "text";
}
