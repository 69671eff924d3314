//! Data models for notices and their storage
//!
//! This module contains the vocabulary shared by the classifier, the template
//! converter and the message store: languages, categories, record types and
//! query filters.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::NoticeError;

/// Timestamp layout used for every stored record.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date layout accepted by the log filter.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// District stored when nothing better is known.
pub const UNKNOWN_DISTRICT: &str = "Unknown";

/// Format a timestamp the way the store writes it.
#[must_use]
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Language a draft was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    /// English
    #[default]
    English,
    /// Urdu
    Urdu,
    /// Sindhi
    Sindhi,
}

impl Language {
    /// All selectable languages, in selector order.
    pub const ALL: [Self; 3] = [Self::English, Self::Urdu, Self::Sindhi];

    /// Name stored in the `lang` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Urdu => "Urdu",
            Self::Sindhi => "Sindhi",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = NoticeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "english" => Ok(Self::English),
            "urdu" => Ok(Self::Urdu),
            "sindhi" => Ok(Self::Sindhi),
            other => Err(NoticeError::validation(format!(
                "Unknown language: {other}. Must be one of: English, Urdu, Sindhi"
            ))),
        }
    }
}

/// Coarse category code attached to every stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    /// Labour activity
    A,
    /// Rallies and protests
    B,
    /// Meetings
    C,
    /// Manually assigned only
    D,
    /// Anything else
    #[default]
    Others,
}

impl Category {
    /// All selectable categories, in selector order.
    pub const ALL: [Self; 5] = [Self::A, Self::B, Self::C, Self::D, Self::Others];

    /// Code stored in the `category` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::Others => "Others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = NoticeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            "C" | "c" => Ok(Self::C),
            "D" | "d" => Ok(Self::D),
            other if other.eq_ignore_ascii_case("others") => Ok(Self::Others),
            other => Err(NoticeError::validation(format!(
                "Unknown category: {other}. Must be one of: A, B, C, D, Others"
            ))),
        }
    }
}

/// The three append-only message logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageTable {
    /// Raw user entries
    Input,
    /// Text after translation
    Translated,
    /// Template output
    Converted,
}

impl MessageTable {
    /// All message tables.
    pub const ALL: [Self; 3] = [Self::Input, Self::Translated, Self::Converted];

    /// SQL table name.
    #[must_use]
    pub const fn table_name(&self) -> &'static str {
        match self {
            Self::Input => crate::schema::input_messages::TABLE,
            Self::Translated => crate::schema::translated_messages::TABLE,
            Self::Converted => crate::schema::converted_messages::TABLE,
        }
    }
}

impl FromStr for MessageTable {
    type Err = NoticeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "input" => Ok(Self::Input),
            "translated" => Ok(Self::Translated),
            "converted" => Ok(Self::Converted),
            other => Err(NoticeError::validation(format!(
                "Unknown table: {other}. Must be one of: input, translated, converted"
            ))),
        }
    }
}

/// Data for a new raw input row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInputMessage {
    /// Draft text as entered
    pub message: String,
    /// Language the draft was written in
    pub lang: Language,
    /// District tag
    pub district: String,
    /// Category tag
    pub category: Category,
}

/// Data for a new translated or converted row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaggedMessage {
    /// Message text
    pub message: String,
    /// District tag
    pub district: String,
    /// Category tag
    pub category: Category,
}

/// A row to append to one of the message logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewRecord {
    /// Goes to the input log
    Input(NewInputMessage),
    /// Goes to the translated log
    Translated(NewTaggedMessage),
    /// Goes to the converted log
    Converted(NewTaggedMessage),
}

impl NewRecord {
    /// Table this record is written to.
    #[must_use]
    pub const fn table(&self) -> MessageTable {
        match self {
            Self::Input(_) => MessageTable::Input,
            Self::Translated(_) => MessageTable::Translated,
            Self::Converted(_) => MessageTable::Converted,
        }
    }
}

/// A stored message row, common to all three message logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredMessage {
    /// Autoincrement id
    pub id: i64,
    /// Message text
    pub message: String,
    /// District tag
    pub district: String,
    /// Category code as stored
    pub category: String,
    /// Creation time, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
}

/// One line of the searchable history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// Message text
    pub message: String,
    /// Creation time, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
}

/// Filter for history queries; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    /// `YYYY-MM-DD` prefix of the timestamp
    pub date: Option<String>,
    /// Exact district
    pub district: Option<String>,
    /// Exact category
    pub category: Option<Category>,
}

impl MessageFilter {
    /// Create an empty filter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one day
    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Restrict to one district
    #[must_use]
    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }

    /// Restrict to one category
    #[must_use]
    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }
}

/// What the user has on screen when they convert or when autosave fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    /// Draft text
    pub text: String,
    /// Selected language
    pub lang: Language,
    /// Selected district, if the user picked one
    pub district: Option<String>,
    /// Selected category, if the user picked one
    pub category: Option<Category>,
    /// Template to convert with
    pub template_name: String,
}

impl Draft {
    /// A draft with no selections, converted with the seeded template
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lang: Language::default(),
            district: None,
            category: None,
            template_name: crate::db::DEFAULT_TEMPLATE_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse_is_case_insensitive() {
        assert_eq!("urdu".parse::<Language>().ok(), Some(Language::Urdu));
        assert_eq!(" SINDHI ".parse::<Language>().ok(), Some(Language::Sindhi));
        assert!("french".parse::<Language>().is_err());
    }

    #[test]
    fn test_category_round_trips_through_code() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().ok(), Some(category));
        }
        assert!("E".parse::<Category>().is_err());
    }

    #[test]
    fn test_record_table() {
        let record = NewRecord::Converted(NewTaggedMessage {
            message: "x".to_string(),
            district: UNKNOWN_DISTRICT.to_string(),
            category: Category::Others,
        });
        assert_eq!(record.table(), MessageTable::Converted);
        assert_eq!(record.table().table_name(), "converted_messages");
    }
}
