//! Conversion pipeline and history search
//!
//! [`NoticeService`] ties the pieces together: it borrows one store handle
//! for the session, tags the draft, writes the input, translated and
//! converted rows, and answers log queries.

use chrono::Local;
use tracing::{info, warn};

use crate::classifier::{Classification, Classifier};
use crate::db::Database;
use crate::error::Result;
use crate::logging::OperationTimer;
use crate::metrics::MetricsCollector;
use crate::models::{
    Category, Draft, LogEntry, MessageFilter, MessageTable, NewInputMessage, NewRecord, NewTaggedMessage,
};
use crate::template::{convert, Conversion};
use crate::translator::{PassThroughTranslator, Translator};
use crate::validation::InputValidator;

/// Shown when a log query matches nothing
pub const NO_MESSAGES_FOUND: &str = "No messages found for the given filter.";

/// What one conversion wrote and produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    /// Row id in the input log
    pub input_id: i64,
    /// Row id in the translated log
    pub translated_id: i64,
    /// Row id in the converted log
    pub converted_id: i64,
    /// District stored on all three rows
    pub district: String,
    /// Category stored on all three rows
    pub category: Category,
    /// Template outcome
    pub conversion: Conversion,
}

impl ConversionReport {
    /// Text to show the user
    #[must_use]
    pub fn output(&self) -> &str {
        self.conversion.text()
    }
}

/// Pick the tags to store: the user's selection where there is one, the
/// classifier's guess otherwise.
#[must_use]
pub fn resolve_tags(classifier: &Classifier, draft: &Draft, text: &str) -> (String, Category) {
    let district = draft.district.as_deref().map(str::trim).filter(|d| !d.is_empty());

    match (district, draft.category) {
        (Some(district), Some(category)) => (district.to_string(), category),
        (district, category) => {
            let Classification {
                district: guessed_district,
                category: guessed_category,
            } = classifier.classify(text);
            (
                district.map_or(guessed_district, ToString::to_string),
                category.unwrap_or(guessed_category),
            )
        },
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(ToString::to_string)
}

/// Render log entries the way the history pane shows them
#[must_use]
pub fn format_logs(entries: &[LogEntry]) -> String {
    if entries.is_empty() {
        return NO_MESSAGES_FOUND.to_string();
    }

    entries
        .iter()
        .map(|entry| format!("[{}] {}", entry.timestamp, entry.message))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Session-scoped front door to the store, classifier and converter
pub struct NoticeService<'a, T = PassThroughTranslator> {
    db: &'a Database,
    translator: T,
    classifier: Classifier,
    metrics: MetricsCollector,
}

impl<'a> NoticeService<'a, PassThroughTranslator> {
    /// Service with the pass-through translator and built-in gazetteer
    #[must_use]
    pub fn new(db: &'a Database) -> Self {
        Self::with_translator(db, PassThroughTranslator)
    }
}

impl<'a, T: Translator> NoticeService<'a, T> {
    /// Service with a custom translator
    pub fn with_translator(db: &'a Database, translator: T) -> Self {
        Self {
            db,
            translator,
            classifier: Classifier::default(),
            metrics: MetricsCollector::default(),
        }
    }

    /// Replace the classifier
    #[must_use]
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Tallies for this session
    #[must_use]
    pub const fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Classifier guess for `text`, used to pre-fill the selectors
    #[must_use]
    pub fn suggest_tags(&self, text: &str) -> Classification {
        self.classifier.classify(text)
    }

    /// Run the full pipeline for a draft.
    ///
    /// Writes one row to each of the input, translated and converted logs,
    /// all with the same timestamp and tags. Empty text is rejected before
    /// anything is written.
    pub fn convert_message(&mut self, draft: &Draft) -> Result<ConversionReport> {
        let timer = OperationTimer::new("convert_message");

        let text = InputValidator::sanitize_text(&draft.text);
        InputValidator::validate_message_text(&text)?;

        let (district, category) = resolve_tags(&self.classifier, draft, &text);
        let now = Local::now().naive_local();

        let input_id = self.append(
            &NewRecord::Input(NewInputMessage {
                message: text.clone(),
                lang: draft.lang,
                district: district.clone(),
                category,
            }),
            now,
        )?;

        let translated = self.translator.translate(&text, draft.lang).inspect_err(|_| {
            self.metrics.record_error("translation", "convert_message");
        })?;
        let translated_id = self.append(
            &NewRecord::Translated(NewTaggedMessage {
                message: translated.clone(),
                district: district.clone(),
                category,
            }),
            now,
        )?;

        let template = self.db.get_template_text(&draft.template_name)?;
        if template.is_empty() {
            warn!(template = %draft.template_name, "Template not found");
        }

        let conversion = convert(&translated, &template);
        let converted_id = self.append(
            &NewRecord::Converted(NewTaggedMessage {
                message: conversion.text().to_string(),
                district: district.clone(),
                category,
            }),
            now,
        )?;

        self.metrics.record_conversion(conversion.is_fallback(), timer.elapsed());
        info!(
            input_id,
            converted_id,
            %district,
            %category,
            fallback = conversion.is_fallback(),
            "Message converted and saved"
        );
        timer.finish();

        Ok(ConversionReport {
            input_id,
            translated_id,
            converted_id,
            district,
            category,
            conversion,
        })
    }

    fn append(&mut self, record: &NewRecord, timestamp: chrono::NaiveDateTime) -> Result<i64> {
        let result = self.db.append_at(record, timestamp);
        self.metrics.record_store_operation("append", result.is_ok());
        result
    }

    /// Search the converted log
    pub fn filter_logs(&self, filter: &MessageFilter) -> Result<Vec<LogEntry>> {
        self.filter_table(MessageTable::Converted, filter)
    }

    /// Search any message log
    ///
    /// Date and district are trimmed first; blank values match everything.
    pub fn filter_table(&self, table: MessageTable, filter: &MessageFilter) -> Result<Vec<LogEntry>> {
        let normalized = MessageFilter {
            date: trimmed(filter.date.as_deref()),
            district: trimmed(filter.district.as_deref()),
            category: filter.category,
        };

        if let Some(date) = normalized.date.as_deref() {
            InputValidator::validate_date_filter(date)?;
        }

        self.db.query(table, &normalized)
    }

    /// Template names for the selector
    pub fn template_names(&self) -> Result<Vec<String>> {
        self.db.list_template_names()
    }

    /// Template text, empty if the name is unknown
    pub fn template_text(&self, name: &str) -> Result<String> {
        self.db.get_template_text(name)
    }

    /// Create a template after checking its name and placeholders.
    /// Returns `false` if the name is taken.
    pub fn save_template(&self, name: &str, text: &str) -> Result<bool> {
        let name = name.trim();
        let text = text.trim();
        InputValidator::validate_template_name(name)?;
        InputValidator::validate_template_text(text)?;

        self.db.create_template(name, text)
    }

    /// Replace a template's text after checking its placeholders.
    /// Returns `false` if no template has this name.
    pub fn edit_template(&self, name: &str, text: &str) -> Result<bool> {
        let text = text.trim();
        InputValidator::validate_template_text(text)?;

        self.db.update_template(name, text)
    }
}
