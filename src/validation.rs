use chrono::NaiveDate;
use regex::Regex;

use crate::error::{NoticeError, Result};
use crate::models::DATE_FORMAT;
use crate::template::{is_line_break, validate_template};

/// Validation utilities for input sanitization and edge case handling
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate draft text before it is converted
    pub fn validate_message_text(text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(NoticeError::validation("Please enter a message to convert."));
        }

        Ok(())
    }

    /// Validate a `YYYY-MM-DD` log filter
    pub fn validate_date_filter(date: &str) -> Result<()> {
        let shape = Regex::new(r"^\d{4}-\d{2}-\d{2}$")
            .map_err(|e| NoticeError::validation(format!("Failed to compile date regex: {e}")))?;

        if !shape.is_match(date) || NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
            return Err(NoticeError::validation("Date format must be YYYY-MM-DD"));
        }

        Ok(())
    }

    /// Validate template name
    pub fn validate_template_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(NoticeError::validation("Template name cannot be empty."));
        }

        if name.chars().count() > 100 {
            return Err(NoticeError::validation("Template name too long (max 100 characters)"));
        }

        if name.contains('\0') || name.contains('\r') || name.contains('\n') {
            return Err(NoticeError::validation("Template name contains invalid characters"));
        }

        Ok(())
    }

    /// Validate template text before it is saved
    pub fn validate_template_text(text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(NoticeError::validation("Template text cannot be empty."));
        }

        validate_template(text).map_err(|e| NoticeError::validation(format!("Invalid template: {e}")))
    }

    /// Sanitize text input. Tabs and every line break the field extractor
    /// splits on are kept.
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|&c| !c.is_control() || c == '\t' || is_line_break(c))
            .collect::<String>()
            .trim()
            .to_string()
    }
}
