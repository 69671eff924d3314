//! Periodic draft persistence
//!
//! Each tick stores the current draft in the input log, but only when the
//! text changed since the last stored version.

use std::future::Future;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::classifier::Classifier;
use crate::db::Database;
use crate::error::Result;
use crate::metrics::MetricsCollector;
use crate::models::{Draft, NewInputMessage, NewRecord};
use crate::service::resolve_tags;
use crate::validation::InputValidator;

/// Remembers the last stored draft so unchanged drafts are not stored twice
#[derive(Debug, Default)]
pub struct Autosaver {
    previous_input: String,
    classifier: Classifier,
    metrics: MetricsCollector,
}

impl Autosaver {
    /// Autosaver that fills missing tags with `classifier`
    #[must_use]
    pub fn new(classifier: Classifier) -> Self {
        Self {
            previous_input: String::new(),
            classifier,
            metrics: MetricsCollector::default(),
        }
    }

    /// Text stored by the last tick that wrote a row
    #[must_use]
    pub fn last_saved(&self) -> &str {
        &self.previous_input
    }

    /// Tallies for this autosaver
    #[must_use]
    pub const fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Store `draft` if it is non-empty and changed. Returns whether a row
    /// was written.
    pub fn tick(&mut self, db: &Database, draft: &Draft) -> Result<bool> {
        let current = InputValidator::sanitize_text(&draft.text);

        if current.is_empty() || current == self.previous_input {
            self.metrics.record_autosave(false);
            return Ok(false);
        }

        let (district, category) = resolve_tags(&self.classifier, draft, &current);
        let id = db.append(&NewRecord::Input(NewInputMessage {
            message: current.clone(),
            lang: draft.lang,
            district,
            category,
        }))?;

        debug!(id, "Autosaved draft");
        self.previous_input = current;
        self.metrics.record_autosave(true);
        Ok(true)
    }
}

/// Autosave the contents of `path` every `period` until `shutdown` resolves.
///
/// `draft` supplies the language and selections; its text is replaced by the
/// file contents on every tick. A missing file counts as an empty draft.
/// Returns the number of rows written.
pub async fn watch_draft_file<F>(
    db: &Database,
    autosaver: &mut Autosaver,
    draft: &Draft,
    path: &Path,
    period: Duration,
    shutdown: F,
) -> Result<u64>
where
    F: Future<Output = ()>,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut saved = 0;
    let mut current = draft.clone();

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = ticker.tick() => {
                current.text = match tokio::fs::read_to_string(path).await {
                    Ok(text) => text,
                    Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
                    Err(e) => return Err(e.into()),
                };

                if autosaver.tick(db, &current)? {
                    saved += 1;
                }
            }
        }
    }

    info!(path = %path.display(), saved, "Stopped watching draft");
    Ok(saved)
}
