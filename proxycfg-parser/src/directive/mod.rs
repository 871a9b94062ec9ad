//! Directive parsers
//!
//! Every line inside a section is claimed by exactly one directive parser.
//! All parsers follow the [`DirectiveParser`] contract so that scalars, flags
//! and indexed lists can be read and written through the same calls.
//!
//! [`Directive`] is the closed set of parser shapes. The dispatcher only ever
//! looks at the tag; section changes come out of the `Section` arm as a
//! [`Transition`] and never require guessing a concrete type.

mod flag;
mod list;
mod scalar;
mod section;

pub use flag::Flag;
pub use list::{List, ListShape, COMMENTS_NAME, UNPROCESSED_NAME};
pub use scalar::{Scalar, ScalarKind};
pub use section::SectionDecl;

use proxycfg_core::{Entry, Error, Payload, Result, SectionKind};

/// One tokenized line handed to the parsers
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    /// Original text, used in error reports
    pub raw: &'a str,
    /// Whitespace separated words, comment excluded
    pub words: &'a [String],
    /// Words of the previous non-blank line
    pub previous: &'a [String],
    /// Trailing comment without the `#`
    pub comment: Option<&'a str>,
    /// 1-based position in the source
    pub line_no: usize,
}

impl<'a> Line<'a> {
    /// Comment worth keeping on a directive line
    pub fn trailing_comment(&self) -> Option<String> {
        self.comment
            .filter(|comment| !comment.is_empty())
            .map(str::to_string)
    }

    /// Words following `keyword`, or `None` when the line starts differently
    pub fn strip_keyword(&self, keyword: &[&str]) -> Option<&'a [String]> {
        let words = self.words;
        if words.len() < keyword.len() {
            return None;
        }
        let matches = keyword
            .iter()
            .zip(words.iter())
            .all(|(expected, word)| *expected == word.as_str());
        matches.then(|| &words[keyword.len()..])
    }
}

/// Why a parser did not take a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// Not this directive, try the next one
    Mismatch,
    /// This directive, but the arguments do not decode
    Malformed(String),
}

/// Request to switch the active section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub kind: SectionKind,
    /// Declared name; always present for multi-instance kinds
    pub name: Option<String>,
    /// Comment attached to the declaration line
    pub comment: Option<String>,
}

/// A rendered line, without indentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub data: String,
    pub comment: Option<String>,
}

impl OutputLine {
    pub fn new(data: impl Into<String>, comment: Option<String>) -> Self {
        Self {
            data: data.into(),
            comment,
        }
    }
}

/// Capability contract of a directive parser
pub trait DirectiveParser {
    /// Reset to an empty payload
    fn init(&mut self);

    /// Stable attribute key
    fn name(&self) -> &str;

    /// Try to claim a line
    fn parse(&mut self, line: &Line<'_>) -> std::result::Result<Option<Transition>, ParseFailure>;

    /// Whole payload; `create_if_absent` yields the empty payload instead of an error
    fn get(&self, create_if_absent: bool) -> Result<Payload>;

    /// One stored entry
    fn get_one(&self, index: Option<usize>) -> Result<Entry>;

    /// Replace the value, or the entry at `index`
    fn set(&mut self, entry: Entry, index: Option<usize>) -> Result<()>;

    /// Insert before `index`, or append
    fn insert(&mut self, entry: Entry, index: Option<usize>) -> Result<()>;

    /// Clear the value, or remove the entry at `index`
    fn delete(&mut self, index: Option<usize>) -> Result<()>;

    /// Output lines in stored order; empty when nothing is set
    fn render(&self, preserve_comment: bool) -> Vec<OutputLine>;
}

/// Closed set of directive parser shapes
#[derive(Debug, Clone)]
pub enum Directive {
    Scalar(Scalar),
    Flag(Flag),
    List(List),
    Section(SectionDecl),
}

macro_rules! dispatch {
    ($self:expr, $parser:ident => $body:expr) => {
        match $self {
            Directive::Scalar($parser) => $body,
            Directive::Flag($parser) => $body,
            Directive::List($parser) => $body,
            Directive::Section($parser) => $body,
        }
    };
}

impl DirectiveParser for Directive {
    fn init(&mut self) {
        dispatch!(self, p => p.init())
    }

    fn name(&self) -> &str {
        dispatch!(self, p => p.name())
    }

    fn parse(&mut self, line: &Line<'_>) -> std::result::Result<Option<Transition>, ParseFailure> {
        dispatch!(self, p => p.parse(line))
    }

    fn get(&self, create_if_absent: bool) -> Result<Payload> {
        dispatch!(self, p => p.get(create_if_absent))
    }

    fn get_one(&self, index: Option<usize>) -> Result<Entry> {
        dispatch!(self, p => p.get_one(index))
    }

    fn set(&mut self, entry: Entry, index: Option<usize>) -> Result<()> {
        dispatch!(self, p => p.set(entry, index))
    }

    fn insert(&mut self, entry: Entry, index: Option<usize>) -> Result<()> {
        dispatch!(self, p => p.insert(entry, index))
    }

    fn delete(&mut self, index: Option<usize>) -> Result<()> {
        dispatch!(self, p => p.delete(index))
    }

    fn render(&self, preserve_comment: bool) -> Vec<OutputLine> {
        dispatch!(self, p => p.render(preserve_comment))
    }
}

impl Directive {
    /// True for the terminal catch-all
    pub fn is_catch_all(&self) -> bool {
        matches!(self, Directive::List(list) if list.shape() == ListShape::Raw)
    }

    /// True when the parser holds at least one value
    pub fn is_set(&self) -> bool {
        self.get(false).is_ok_and(|payload| !payload.is_empty())
    }
}

impl From<Scalar> for Directive {
    fn from(parser: Scalar) -> Self {
        Directive::Scalar(parser)
    }
}

impl From<Flag> for Directive {
    fn from(parser: Flag) -> Self {
        Directive::Flag(parser)
    }
}

impl From<List> for Directive {
    fn from(parser: List) -> Self {
        Directive::List(parser)
    }
}

impl From<SectionDecl> for Directive {
    fn from(parser: SectionDecl) -> Self {
        Directive::Section(parser)
    }
}

// ============================================================
// Shared value checks
// ============================================================

/// A single word: non-empty, no whitespace, no comment marker
pub(crate) fn check_word(attribute: &str, word: &str) -> Result<()> {
    if word.is_empty() || word.chars().any(|c| c.is_whitespace() || c == '#') {
        return Err(Error::invalid_value(
            attribute,
            format!("a single word without whitespace or '#', got {:?}", word),
        ));
    }
    Ok(())
}

/// Free text on one line without a comment marker
pub(crate) fn check_text(attribute: &str, text: &str) -> Result<()> {
    if text.contains('#') || text.contains('\n') || text.contains('\r') {
        return Err(Error::invalid_value(
            attribute,
            format!("text without '#' or line breaks, got {:?}", text),
        ));
    }
    Ok(())
}

/// Runs of whitespace as the tokenizer would read them back
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Attached comments must stay on their line
pub(crate) fn check_comment(attribute: &str, entry: &Entry) -> Result<()> {
    match &entry.comment {
        Some(comment) if comment.contains('\n') || comment.contains('\r') => Err(
            Error::invalid_value(attribute, "a comment without line breaks"),
        ),
        _ => Ok(()),
    }
}

/// Resolve an index against a list of `len` entries
pub(crate) fn checked_index(attribute: &str, index: Option<usize>, len: usize) -> Result<usize> {
    let index = index.ok_or_else(|| Error::IndexRequired {
        attribute: attribute.to_string(),
    })?;
    if index >= len {
        return Err(Error::IndexOutOfRange {
            attribute: attribute.to_string(),
            index,
            len,
        });
    }
    Ok(index)
}
