//! Translation seam
//!
//! Drafts are stored in the language they were written in and then
//! translated to English before conversion. The only shipped backend passes
//! text through untouched; a real engine plugs in behind [`Translator`].

use tracing::trace;

use crate::error::Result;
use crate::models::Language;

/// Turns a draft into English text
pub trait Translator {
    /// Translate `text`, written in `lang`, to English
    fn translate(&self, text: &str, lang: Language) -> Result<String>;
}

/// Returns the text unchanged for every language
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughTranslator;

impl Translator for PassThroughTranslator {
    fn translate(&self, text: &str, lang: Language) -> Result<String> {
        trace!(%lang, "Pass-through translation");
        Ok(text.to_string())
    }
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn translate(&self, text: &str, lang: Language) -> Result<String> {
        (**self).translate(text, lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_through_keeps_text() {
        for lang in Language::ALL {
            let translated = PassThroughTranslator.translate("جلسہ\nVenue: Hall", lang).expect("translate");
            assert_eq!(translated, "جلسہ\nVenue: Hall");
        }
    }
}
