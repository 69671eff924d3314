//! Template conversion
//!
//! Pulls the six notice fields out of free text with per-line keyword rules
//! and substitutes them into a template such as
//! `"🛑 *{activity} By {activist}*:-"`. A template that cannot be filled
//! yields the input text unchanged; [`Conversion`] records which of the two
//! happened.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

/// Defaults used for fields the text does not mention
pub const DEFAULT_ACTIVITY: &str = "Activity";
/// Default activist
pub const DEFAULT_ACTIVIST: &str = "Activist";
/// Default agenda
pub const DEFAULT_AGENDA: &str = "Agenda not provided";
/// Default venue
pub const DEFAULT_VENUE: &str = "Venue not specified";
/// Default time
pub const DEFAULT_TIME: &str = "Time not specified";
/// Default strength
pub const DEFAULT_STRENGTH: &str = "0";

/// A placeholder name a template may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// `{activity}`
    Activity,
    /// `{activist}`
    Activist,
    /// `{agenda}`
    Agenda,
    /// `{venue}`
    Venue,
    /// `{time}`
    Time,
    /// `{strength}`
    Strength,
}

impl Field {
    /// Every recognised field
    pub const ALL: [Self; 6] = [
        Self::Activity,
        Self::Activist,
        Self::Agenda,
        Self::Venue,
        Self::Time,
        Self::Strength,
    ];

    /// Placeholder name as written inside the braces
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Activity => "activity",
            Self::Activist => "activist",
            Self::Agenda => "agenda",
            Self::Venue => "venue",
            Self::Time => "time",
            Self::Strength => "strength",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| TemplateError::UnknownPlaceholder(s.to_string()))
    }
}

/// Why a template could not be filled
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// `{name}` where name is not one of the six fields
    #[error("Unknown placeholder: {{{0}}}")]
    UnknownPlaceholder(String),

    /// A `{` or `}` without its partner
    #[error("Unmatched '{brace}' at byte {position}")]
    UnmatchedBrace {
        /// The stray brace
        brace: char,
        /// Byte offset in the template
        position: usize,
    },

    /// Template is empty or whitespace only
    #[error("Template is empty")]
    EmptyTemplate,
}

/// The six values substituted into a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeFields {
    /// What is happening
    pub activity: String,
    /// Who is organising it
    pub activist: String,
    /// Stated agenda
    pub agenda: String,
    /// Where
    pub venue: String,
    /// When
    pub time: String,
    /// Expected turnout
    pub strength: String,
}

impl Default for NoticeFields {
    fn default() -> Self {
        Self {
            activity: DEFAULT_ACTIVITY.to_string(),
            activist: DEFAULT_ACTIVIST.to_string(),
            agenda: DEFAULT_AGENDA.to_string(),
            venue: DEFAULT_VENUE.to_string(),
            time: DEFAULT_TIME.to_string(),
            strength: DEFAULT_STRENGTH.to_string(),
        }
    }
}

impl NoticeFields {
    /// Scan `text` line by line and fill whatever fields it mentions.
    ///
    /// A line may set several fields, and a later line overwrites an earlier
    /// one for the same field.
    #[must_use]
    pub fn extract(text: &str) -> Self {
        let mut fields = Self::default();

        for line in split_lines(text) {
            let lower = line.to_lowercase();

            if lower.contains("labour day rally") || lower.contains("activity") {
                fields.activity = line.trim().to_string();
            }
            if lower.contains("by") && !line.contains('*') {
                fields.activist = line.trim().to_string();
            }
            if lower.contains("agenda") {
                fields.agenda = value_after_colon(line);
            }
            if lower.contains("venue") {
                fields.venue = value_after_colon(line);
            }
            if lower.contains("time") {
                fields.time = value_after_colon(line);
            }
            // "strength" contains "str"
            if lower.contains("str") {
                fields.strength = value_after_colon(line);
            }
        }

        fields
    }

    /// Value for one placeholder
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Activity => &self.activity,
            Field::Activist => &self.activist,
            Field::Agenda => &self.agenda,
            Field::Venue => &self.venue,
            Field::Time => &self.time,
            Field::Strength => &self.strength,
        }
    }
}

/// Result of [`convert`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// Every placeholder was substituted
    Formatted(String),
    /// The template could not be filled; `text` is the input unchanged
    Fallback {
        /// The original input
        text: String,
        /// What went wrong with the template
        reason: TemplateError,
    },
}

impl Conversion {
    /// Text to show the user, whichever way the conversion went
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Formatted(text) | Self::Fallback { text, .. } => text,
        }
    }

    /// Consume into the text to show the user
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Formatted(text) | Self::Fallback { text, .. } => text,
        }
    }

    /// Whether the template was abandoned
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Fill `template` with the fields found in `text`.
///
/// Never fails: when the template is empty or references something other
/// than the six known fields, the result is [`Conversion::Fallback`] holding
/// `text` unchanged.
#[must_use]
pub fn convert(text: &str, template: &str) -> Conversion {
    if template.trim().is_empty() {
        warn!("Template is empty, returning input unchanged");
        return Conversion::Fallback {
            text: text.to_string(),
            reason: TemplateError::EmptyTemplate,
        };
    }

    let fields = NoticeFields::extract(text);
    debug!(?fields, "Extracted notice fields");

    match render(template, &fields) {
        Ok(formatted) => Conversion::Formatted(formatted),
        Err(reason) => {
            warn!(%reason, "Template substitution failed, returning input unchanged");
            Conversion::Fallback {
                text: text.to_string(),
                reason,
            }
        },
    }
}

/// [`convert`] without the outcome details
#[must_use]
pub fn convert_text(text: &str, template: &str) -> String {
    convert(text, template).into_text()
}

/// Check that `template` only uses known placeholders and balanced braces
pub fn validate_template(template: &str) -> Result<(), TemplateError> {
    if template.trim().is_empty() {
        return Err(TemplateError::EmptyTemplate);
    }
    render(template, &NoticeFields::default()).map(|_| ())
}

/// Substitute `fields` into `template`.
///
/// `{name}` is replaced by the field value, `{{` and `}}` produce literal
/// braces. Anything else inside braces is an error, including format specs
/// and conversions such as `{time:>5}` or `{activity!r}`: the whole text
/// between the braces must be one of the six field names.
pub fn render(template: &str, fields: &NoticeFields) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        match c {
            '{' => {
                if chars.next_if(|&(_, next)| next == '{').is_some() {
                    output.push('{');
                    continue;
                }

                let mut name = String::new();
                let mut closed = false;
                for (_, inner) in chars.by_ref() {
                    match inner {
                        '}' => {
                            closed = true;
                            break;
                        },
                        '{' => return Err(TemplateError::UnmatchedBrace { brace: '{', position }),
                        other => name.push(other),
                    }
                }

                if !closed {
                    return Err(TemplateError::UnmatchedBrace { brace: '{', position });
                }

                let field = name.parse::<Field>()?;
                output.push_str(fields.get(field));
            },
            '}' => {
                if chars.next_if(|&(_, next)| next == '}').is_none() {
                    return Err(TemplateError::UnmatchedBrace { brace: '}', position });
                }
                output.push('}');
            },
            other => output.push(other),
        }
    }

    Ok(output)
}

/// Split on every character that ends a line, including `\r` on its own and
/// the Unicode line and paragraph separators.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_line_break)
}

/// Whether `c` ends a line when notice fields are extracted
#[must_use]
pub const fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn value_after_colon(line: &str) -> String {
    line.split_once(':')
        .map_or(line, |(_, value)| value)
        .trim()
        .to_string()
}
