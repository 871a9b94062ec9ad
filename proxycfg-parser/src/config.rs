//! Thread-safe configuration handle
//!
//! [`ConfigParser`] wraps the registry in a single exclusive lock. Every public
//! method takes the lock exactly once and works on the registry through
//! lock-free helpers; file reads and writes happen outside the lock.

use crate::directive::{DirectiveParser, Line, ParseFailure};
use crate::lexer::tokenize_line;
use crate::registry::Registry;
use crate::render::render;
use crate::section_set::SectionSet;
use parking_lot::Mutex;
use proxycfg_core::{Entry, Error, ParserOptions, Payload, Result, SectionKind};
use std::fmt;
use std::path::Path;

/// Loaded configuration, addressable by section and attribute
pub struct ConfigParser {
    registry: Mutex<Registry>,
    options: ParserOptions,
}

impl ConfigParser {
    /// Empty configuration with default options
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default())
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            registry: Mutex::new(Registry::new(options.strict)),
            options,
        }
    }

    /// Parse text into a new handle
    pub fn from_text(text: &str, options: ParserOptions) -> Result<Self> {
        let parser = Self::with_options(options);
        parser.load_str(text)?;
        Ok(parser)
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    // ========================================
    // Load / Save
    // ========================================

    /// Replace the current model with `text`.
    ///
    /// The text is parsed into a fresh registry first; on error the current
    /// model is left untouched.
    pub fn load_str(&self, text: &str) -> Result<()> {
        let mut fresh = Registry::new(self.options.strict);
        fresh.parse_text(text)?;
        *self.registry.lock() = fresh;
        tracing::debug!("configuration loaded ({} bytes)", text.len());
        Ok(())
    }

    /// Load a configuration file
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!("loading configuration from {}", path.display());
        self.load_str(&text)
    }

    /// Current model as configuration text
    pub fn render(&self) -> String {
        render(&self.registry.lock(), self.options.preserve_comments)
    }

    /// Write the rendered configuration to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = self.render();
        std::fs::write(path.as_ref(), text)?;
        tracing::debug!("configuration saved to {}", path.as_ref().display());
        Ok(())
    }

    // ========================================
    // Attributes
    // ========================================

    /// Whole payload of an attribute
    pub fn get(&self, kind: SectionKind, name: &str, attribute: &str, create_if_absent: bool) -> Result<Payload> {
        self.registry.lock().get(kind, name, attribute, create_if_absent)
    }

    /// One entry of an attribute; `index` is required for multi-valued ones
    pub fn get_one(&self, kind: SectionKind, name: &str, attribute: &str, index: Option<usize>) -> Result<Entry> {
        self.registry.lock().get_one(kind, name, attribute, index)
    }

    /// Replace a value; without `index` a multi-valued attribute gets a new entry
    pub fn set(
        &self,
        kind: SectionKind,
        name: &str,
        attribute: &str,
        value: impl Into<Entry>,
        index: Option<usize>,
    ) -> Result<()> {
        self.registry.lock().set(kind, name, attribute, value.into(), index)
    }

    /// Insert before `index`, or append
    pub fn insert(
        &self,
        kind: SectionKind,
        name: &str,
        attribute: &str,
        value: impl Into<Entry>,
        index: Option<usize>,
    ) -> Result<()> {
        self.registry.lock().insert(kind, name, attribute, value.into(), index)
    }

    /// Remove a value, or the entry at `index`
    pub fn delete(&self, kind: SectionKind, name: &str, attribute: &str, index: Option<usize>) -> Result<()> {
        self.registry.lock().delete(kind, name, attribute, index)
    }

    /// Whether sections of `kind` know `attribute`
    pub fn has_attribute(&self, kind: SectionKind, attribute: &str) -> bool {
        self.registry.lock().has_parser(kind, attribute)
    }

    // ========================================
    // Sections
    // ========================================

    /// Names of all sections of `kind`, in no particular order
    pub fn sections(&self, kind: SectionKind) -> Result<Vec<String>> {
        self.registry.lock().sections(kind)
    }

    pub fn create_section(&self, kind: SectionKind, name: &str) -> Result<()> {
        self.registry.lock().create_section(kind, name)
    }

    pub fn delete_section(&self, kind: SectionKind, name: &str) -> Result<()> {
        self.registry.lock().delete_section(kind, name)
    }

    // ========================================
    // Decoding
    // ========================================

    /// Decode a complete directive line (`"server web1 10.0.0.1:80 check"`)
    /// into the entry `attribute` would store for it.
    ///
    /// Uses a throwaway section, so the loaded model is not touched.
    pub fn parse_directive(&self, kind: SectionKind, attribute: &str, text: &str) -> Result<Entry> {
        decode_directive(kind, attribute, text)
    }
}

fn decode_directive(kind: SectionKind, attribute: &str, text: &str) -> Result<Entry> {
    let parse_error = |message: String| Error::Parse {
        parser: attribute.to_string(),
        line_no: 0,
        line: text.to_string(),
        message,
    };

    let tokens = tokenize_line(text).map_err(|e| parse_error(e.to_string()))?;
    let line = Line {
        raw: text,
        words: &tokens.words,
        previous: &[],
        comment: tokens.comment.as_deref(),
        line_no: 0,
    };

    let mut section = SectionSet::new(kind);
    if !section.has_parser(attribute) {
        return Err(Error::not_found(attribute));
    }
    for parser in section.parsers_mut() {
        match parser.parse(&line) {
            Ok(_) if parser.name() == attribute => {
                return match parser.get(false)? {
                    Payload::Single(entry) => Ok(entry),
                    Payload::List(mut entries) => entries
                        .pop()
                        .ok_or_else(|| Error::not_found(attribute)),
                };
            }
            Ok(_) => {
                return Err(parse_error(format!("line is a '{}' directive", parser.name())));
            }
            Err(ParseFailure::Mismatch) => continue,
            Err(ParseFailure::Malformed(message)) => return Err(parse_error(message)),
        }
    }
    Err(parse_error("no directive accepts this line".to_string()))
}

impl Default for ConfigParser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConfigParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Debug for ConfigParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigParser")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
