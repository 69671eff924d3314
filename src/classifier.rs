//! Keyword classifier for districts and categories
//!
//! Guesses the district a notice is about from an ordered gazetteer and the
//! category from a handful of keywords. Also offers a language hint for
//! drafts where the user did not pick one.

use unicode_normalization::UnicodeNormalization;
use whatlang::{detect, Lang};

use crate::models::{Category, Language, UNKNOWN_DISTRICT};

/// Districts checked in order; the first one found in the text wins
pub const KNOWN_DISTRICTS: [&str; 5] = ["Hyd", "Karachi", "Lahore", "Islamabad", "Multan"];

/// District and category guessed from a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Matching gazetteer entry, or `"Unknown"`
    pub district: String,
    /// Keyword category, or `Others`
    pub category: Category,
}

/// Gazetteer-backed classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    districts: Vec<String>,
    lowered: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(KNOWN_DISTRICTS)
    }
}

impl Classifier {
    /// Build a classifier over `districts`, keeping their order. Blank
    /// entries are dropped since they would match any text.
    pub fn new<I, S>(districts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let districts: Vec<String> = districts
            .into_iter()
            .map(Into::into)
            .filter(|d| !d.trim().is_empty())
            .collect();
        let lowered = districts.iter().map(|d| normalize(d)).collect();
        Self { districts, lowered }
    }

    /// Districts in match order
    #[must_use]
    pub fn districts(&self) -> &[String] {
        &self.districts
    }

    /// Guess district and category for `text`
    #[must_use]
    pub fn classify(&self, text: &str) -> Classification {
        let lowered = normalize(text);

        let district = self
            .lowered
            .iter()
            .position(|d| lowered.contains(d.as_str()))
            .map_or_else(|| UNKNOWN_DISTRICT.to_string(), |i| self.districts[i].clone());

        Classification {
            district,
            category: categorize(&lowered),
        }
    }
}

/// Classify with the built-in gazetteer
#[must_use]
pub fn classify(text: &str) -> Classification {
    Classifier::default().classify(text)
}

/// Category from keywords, first rule wins. Expects lowercase text.
fn categorize(lowered: &str) -> Category {
    if lowered.contains("labour") {
        Category::A
    } else if lowered.contains("rally") || lowered.contains("protest") {
        Category::B
    } else if lowered.contains("meeting") {
        Category::C
    } else {
        Category::Others
    }
}

fn normalize(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}

/// Best guess at the draft's language, if the detector is confident
#[must_use]
pub fn detect_language(text: &str) -> Option<Language> {
    let info = detect(text)?;
    if !info.is_reliable() {
        return None;
    }

    match info.lang() {
        Lang::Eng => Some(Language::English),
        Lang::Urd => Some(Language::Urdu),
        _ => None,
    }
}
