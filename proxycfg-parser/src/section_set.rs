//! Section parser set
//!
//! The parsers owned by one section instance, in registration order, with a
//! name index for attribute access.

use crate::directive::{Directive, DirectiveParser, Line, OutputLine, ParseFailure};
use crate::lexer::tokenize_line;
use crate::roster::roster;
use proxycfg_core::{Entry, Error, Payload, Result, SectionKind};
use std::collections::HashMap;

/// Ordered directive parsers of one section instance
#[derive(Debug, Clone)]
pub struct SectionSet {
    kind: SectionKind,
    parsers: Vec<Directive>,
    index: HashMap<String, usize>,
    /// Comment attached to the declaration line
    header_comment: Option<String>,
}

impl SectionSet {
    /// Empty section with the standard roster of `kind`
    pub fn new(kind: SectionKind) -> Self {
        Self::with_parsers(kind, roster(kind))
    }

    /// Section over an explicit parser list.
    ///
    /// # Panics
    ///
    /// Panics when two parsers share a name; rosters are static data, so this is
    /// a programming error rather than an input error.
    pub fn with_parsers(kind: SectionKind, mut parsers: Vec<Directive>) -> Self {
        let mut index = HashMap::with_capacity(parsers.len());
        for (position, parser) in parsers.iter_mut().enumerate() {
            parser.init();
            let previous = index.insert(parser.name().to_string(), position);
            assert!(previous.is_none(), "duplicate directive '{}' in {} roster", parser.name(), kind);
        }
        Self {
            kind,
            parsers,
            index,
            header_comment: None,
        }
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn header_comment(&self) -> Option<&str> {
        self.header_comment.as_deref()
    }

    pub fn set_header_comment(&mut self, comment: Option<String>) {
        self.header_comment = comment;
    }

    pub fn has_parser(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Parsers in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Directive> {
        self.parsers.iter()
    }

    pub(crate) fn parsers_mut(&mut self) -> impl Iterator<Item = &mut Directive> {
        self.parsers.iter_mut()
    }

    fn parser(&self, name: &str) -> Result<&Directive> {
        let position = self.position(name)?;
        Ok(&self.parsers[position])
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.index.get(name).copied().ok_or_else(|| Error::not_found(name))
    }

    fn parser_mut(&mut self, name: &str) -> Result<&mut Directive> {
        let position = self.position(name)?;
        Ok(&mut self.parsers[position])
    }

    /// Check that `entry`, once written out, loads back into the parser at
    /// `position` with the same value.
    ///
    /// The line is rendered by a fresh copy of the target and offered to fresh
    /// copies of every parser in roster order, exactly as a load would.
    /// Returns the entry as the target stores it (whitespace collapsed,
    /// comment trimmed).
    fn read_back(&self, position: usize, mut entry: Entry) -> Result<Entry> {
        entry.comment = entry
            .comment
            .map(|comment| comment.trim().to_string())
            .filter(|comment| !comment.is_empty());

        let target = &self.parsers[position];
        let mut candidate = target.clone();
        candidate.init();
        candidate.set(entry, None)?;
        let stored = candidate.get_one(Some(0))?;

        let rejected = |reason: String| {
            Error::invalid_value(
                target.name(),
                format!("a value that reads back as '{}', but {}", target.name(), reason),
            )
        };

        let [output]: [OutputLine; 1] = candidate.render(true).try_into().map_err(|lines: Vec<OutputLine>| {
            rejected(format!("it renders as {} lines", lines.len()))
        })?;
        let text = match &output.comment {
            Some(comment) => format!("{} # {}", output.data, comment),
            None => output.data,
        };
        let tokens = tokenize_line(&text).map_err(|e| rejected(e.to_string()))?;
        let line = Line {
            raw: &text,
            words: &tokens.words,
            previous: &[],
            comment: tokens.comment.as_deref(),
            line_no: 0,
        };

        for (claimant, parser) in self.parsers.iter().enumerate() {
            let mut fresh = parser.clone();
            fresh.init();
            match fresh.parse(&line) {
                Err(ParseFailure::Mismatch) => continue,
                Err(ParseFailure::Malformed(message)) => {
                    return Err(rejected(format!("'{}' rejects {:?}: {}", parser.name(), text, message)));
                }
                Ok(_) if claimant != position => {
                    return Err(rejected(format!("{:?} would load as '{}'", text, parser.name())));
                }
                Ok(_) => {
                    return match fresh.get_one(Some(0)) {
                        Ok(reread) if reread == stored => Ok(stored),
                        _ => Err(rejected(format!("{:?} loads back differently", text))),
                    };
                }
            }
        }
        Err(rejected(format!("no directive accepts {:?}", text)))
    }

    pub fn get(&self, name: &str, create_if_absent: bool) -> Result<Payload> {
        self.parser(name)?.get(create_if_absent)
    }

    pub fn get_one(&self, name: &str, index: Option<usize>) -> Result<Entry> {
        self.parser(name)?.get_one(index)
    }

    /// Replace a value; rejects values a reload would hand to another directive
    pub fn set(&mut self, name: &str, entry: Entry, index: Option<usize>) -> Result<()> {
        let position = self.position(name)?;
        let entry = self.read_back(position, entry)?;
        self.parsers[position].set(entry, index)
    }

    /// Insert a value; same read-back check as [`SectionSet::set`]
    pub fn insert(&mut self, name: &str, entry: Entry, index: Option<usize>) -> Result<()> {
        let position = self.position(name)?;
        let entry = self.read_back(position, entry)?;
        self.parsers[position].insert(entry, index)
    }

    pub fn delete(&mut self, name: &str, index: Option<usize>) -> Result<()> {
        self.parser_mut(name)?.delete(index)
    }

    /// True when no parser holds a value
    pub fn is_empty(&self) -> bool {
        self.parsers.iter().all(|parser| !parser.is_set())
    }
}
