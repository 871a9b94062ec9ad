//! Section registry and line dispatcher
//!
//! The registry owns every section instance, keyed by kind and name. Loading
//! drives it through [`Registry::process_line`]: each line goes to the active
//! section's parsers in registration order, the first one that accepts it
//! wins, and a section declaration switches the active section.
//!
//! Nothing here locks. [`crate::ConfigParser`] holds the only lock and calls
//! into the registry once it has it, so internal calls such as
//! `create_section -> process_line` never try to lock twice.

use crate::directive::{check_word, DirectiveParser, Line, ParseFailure, Transition};
use crate::lexer::{split_lines, tokenize_line};
use crate::section_set::SectionSet;
use proxycfg_core::{Entry, Error, Payload, Result, SectionKind, SINGLETON_NAME};
use std::collections::HashMap;

/// Where the dispatcher currently sends lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseState {
    pub kind: SectionKind,
    pub name: String,
}

impl ParseState {
    /// Before the first declaration everything lands in the comments section
    pub fn start() -> Self {
        Self::singleton(SectionKind::Comments)
    }

    fn singleton(kind: SectionKind) -> Self {
        Self {
            kind,
            name: SINGLETON_NAME.to_string(),
        }
    }
}

/// All section instances of one loaded configuration
#[derive(Debug, Clone)]
pub struct Registry {
    sections: HashMap<SectionKind, HashMap<String, SectionSet>>,
    strict: bool,
}

impl Registry {
    /// Registry with every kind present and the singletons created
    pub fn new(strict: bool) -> Self {
        let sections = SectionKind::ALL
            .into_iter()
            .map(|kind| {
                let mut instances = HashMap::new();
                if kind.is_singleton() {
                    instances.insert(SINGLETON_NAME.to_string(), SectionSet::new(kind));
                }
                (kind, instances)
            })
            .collect();
        Self { sections, strict }
    }

    // ========================================
    // Loading
    // ========================================

    /// Feed configuration text line by line; stops at the first bad line
    pub fn parse_text(&mut self, text: &str) -> Result<()> {
        let mut state = ParseState::start();
        let mut previous: Vec<String> = Vec::new();

        for (position, raw) in split_lines(text).enumerate() {
            let line_no = position + 1;
            let tokens = tokenize_line(raw).map_err(|e| Error::Parse {
                parser: "tokenizer".to_string(),
                line_no,
                line: raw.trim().to_string(),
                message: e.to_string(),
            })?;
            if tokens.is_blank() {
                continue;
            }

            let line = Line {
                raw: raw.trim(),
                words: &tokens.words,
                previous: &previous,
                comment: tokens.comment.as_deref(),
                line_no,
            };
            state = self.process_line(&line, state)?;
            previous = tokens.words;
        }

        Ok(())
    }

    /// Dispatch one line to the active section and follow section changes
    pub fn process_line(&mut self, line: &Line<'_>, state: ParseState) -> Result<ParseState> {
        let strict = self.strict;
        let active = self.section_mut(state.kind, &state.name)?;

        let mut transition = None;
        let mut claimed = false;
        for parser in active.parsers_mut() {
            if strict && parser.is_catch_all() {
                return Err(Error::Parse {
                    parser: parser.name().to_string(),
                    line_no: line.line_no,
                    line: line.raw.to_string(),
                    message: format!("unknown directive in {} section", state.kind),
                });
            }
            match parser.parse(line) {
                Ok(result) => {
                    tracing::trace!(line = line.line_no, parser = parser.name(), "line claimed");
                    transition = result;
                    claimed = true;
                    break;
                }
                Err(ParseFailure::Mismatch) => continue,
                Err(ParseFailure::Malformed(message)) => {
                    return Err(Error::Parse {
                        parser: parser.name().to_string(),
                        line_no: line.line_no,
                        line: line.raw.to_string(),
                        message,
                    });
                }
            }
        }

        if !claimed {
            tracing::warn!(line = line.line_no, "no directive accepted line, dropped: {}", line.raw);
        }

        match transition {
            Some(transition) => self.enter(transition, line),
            None => Ok(state),
        }
    }

    fn enter(&mut self, transition: Transition, line: &Line<'_>) -> Result<ParseState> {
        let Transition { kind, name, comment } = transition;

        if kind.is_singleton() {
            tracing::debug!("entering {} section", kind);
            // A bare re-declaration keeps the comment of an earlier one.
            if comment.is_some() {
                self.section_mut(kind, SINGLETON_NAME)?.set_header_comment(comment);
            }
            return Ok(ParseState::singleton(kind));
        }

        let name = name.ok_or_else(|| Error::Parse {
            parser: kind.keyword().to_string(),
            line_no: line.line_no,
            line: line.raw.to_string(),
            message: "section name missing".to_string(),
        })?;
        let instances = self.instances_mut(kind)?;
        if instances.contains_key(&name) {
            return Err(Error::SectionAlreadyExists { kind, name });
        }

        let mut section = SectionSet::new(kind);
        section.set_header_comment(comment);
        instances.insert(name.clone(), section);
        tracing::debug!("created {} section '{}'", kind, name);

        Ok(ParseState { kind, name })
    }

    // ========================================
    // Lookup
    // ========================================

    fn instances(&self, kind: SectionKind) -> Result<&HashMap<String, SectionSet>> {
        self.sections.get(&kind).ok_or_else(|| Error::SectionMissing {
            kind,
            name: String::new(),
        })
    }

    fn instances_mut(&mut self, kind: SectionKind) -> Result<&mut HashMap<String, SectionSet>> {
        self.sections.get_mut(&kind).ok_or_else(|| Error::SectionMissing {
            kind,
            name: String::new(),
        })
    }

    pub fn section(&self, kind: SectionKind, name: &str) -> Result<&SectionSet> {
        self.instances(kind)?
            .get(name)
            .ok_or_else(|| Error::SectionMissing {
                kind,
                name: name.to_string(),
            })
    }

    pub fn section_mut(&mut self, kind: SectionKind, name: &str) -> Result<&mut SectionSet> {
        self.instances_mut(kind)?
            .get_mut(name)
            .ok_or_else(|| Error::SectionMissing {
                kind,
                name: name.to_string(),
            })
    }

    // ========================================
    // Attribute access
    // ========================================

    pub fn get(&self, kind: SectionKind, name: &str, attribute: &str, create_if_absent: bool) -> Result<Payload> {
        self.section(kind, name)?.get(attribute, create_if_absent)
    }

    pub fn get_one(&self, kind: SectionKind, name: &str, attribute: &str, index: Option<usize>) -> Result<Entry> {
        self.section(kind, name)?.get_one(attribute, index)
    }

    pub fn set(&mut self, kind: SectionKind, name: &str, attribute: &str, entry: Entry, index: Option<usize>) -> Result<()> {
        self.section_mut(kind, name)?.set(attribute, entry, index)
    }

    pub fn insert(&mut self, kind: SectionKind, name: &str, attribute: &str, entry: Entry, index: Option<usize>) -> Result<()> {
        self.section_mut(kind, name)?.insert(attribute, entry, index)
    }

    pub fn delete(&mut self, kind: SectionKind, name: &str, attribute: &str, index: Option<usize>) -> Result<()> {
        self.section_mut(kind, name)?.delete(attribute, index)
    }

    /// Whether sections of `kind` recognize `attribute`
    pub fn has_parser(&self, kind: SectionKind, attribute: &str) -> bool {
        match self.instances(kind) {
            Ok(instances) => match instances.values().next() {
                Some(section) => section.has_parser(attribute),
                None => SectionSet::new(kind).has_parser(attribute),
            },
            Err(_) => false,
        }
    }

    // ========================================
    // Sections
    // ========================================

    /// Names of all instances of `kind`, unordered
    pub fn sections(&self, kind: SectionKind) -> Result<Vec<String>> {
        Ok(self.instances(kind)?.keys().cloned().collect())
    }

    /// Instances of `kind` sorted by name
    pub fn sorted_sections(&self, kind: SectionKind) -> Vec<(&str, &SectionSet)> {
        let mut sections: Vec<_> = self
            .instances(kind)
            .map(|instances| {
                instances
                    .iter()
                    .map(|(name, section)| (name.as_str(), section))
                    .collect()
            })
            .unwrap_or_default();
        sections.sort_by(|a, b| a.0.cmp(b.0));
        sections
    }

    /// Create an empty section by running its declaration line through the dispatcher
    pub fn create_section(&mut self, kind: SectionKind, name: &str) -> Result<()> {
        if kind.is_singleton() {
            return Err(if name == SINGLETON_NAME {
                Error::SectionAlreadyExists {
                    kind,
                    name: name.to_string(),
                }
            } else {
                Error::SingletonSection { kind }
            });
        }
        check_word("section name", name)?;
        if self.instances(kind)?.contains_key(name) {
            return Err(Error::SectionAlreadyExists {
                kind,
                name: name.to_string(),
            });
        }

        let raw = format!("{} {}", kind.keyword(), name);
        let words = vec![kind.keyword().to_string(), name.to_string()];
        let line = Line {
            raw: &raw,
            words: &words,
            previous: &[],
            comment: None,
            line_no: 0,
        };
        let state = self.process_line(&line, ParseState::start())?;
        debug_assert_eq!(state, ParseState { kind, name: name.to_string() });
        Ok(())
    }

    /// Remove a section; removing an absent name is a no-op
    pub fn delete_section(&mut self, kind: SectionKind, name: &str) -> Result<()> {
        if kind.is_singleton() {
            return Err(Error::SingletonSection { kind });
        }
        if self.instances_mut(kind)?.remove(name).is_some() {
            tracing::debug!("deleted {} section '{}'", kind, name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::{Flag, List, SectionDecl};
    use proxycfg_core::Value;

    #[test]
    fn test_singletons_exist() {
        let registry = Registry::new(false);
        for kind in [SectionKind::Comments, SectionKind::Defaults, SectionKind::Global] {
            assert_eq!(registry.sections(kind).unwrap(), vec![SINGLETON_NAME.to_string()]);
        }
        assert!(registry.sections(SectionKind::Backend).unwrap().is_empty());
    }

    #[test]
    fn test_dispatch_follows_declarations() {
        let mut registry = Registry::new(false);
        registry
            .parse_text("# head\nglobal\n  maxconn 10\nbackend app\n  server s1 1.1.1.1:80\n")
            .unwrap();

        assert_eq!(
            registry.get_one(SectionKind::Global, SINGLETON_NAME, "maxconn", None).unwrap().value,
            Value::Int(10)
        );
        assert_eq!(
            registry.get_one(SectionKind::Comments, SINGLETON_NAME, "comments", Some(0)).unwrap().value,
            Value::Comment("head".into())
        );
        assert!(registry.get_one(SectionKind::Backend, "app", "server", Some(0)).is_ok());
    }

    #[test]
    fn test_singleton_reentry() {
        let mut registry = Registry::new(false);
        registry
            .parse_text("global\n  maxconn 1\nfrontend f\n  mode http\nglobal\n  daemon\n")
            .unwrap();
        let global = registry.section(SectionKind::Global, SINGLETON_NAME).unwrap();
        assert!(global.get_one("maxconn", None).is_ok());
        assert!(global.get_one("daemon", None).is_ok());
    }

    #[test]
    fn test_singleton_reentry_keeps_header_comment() {
        let mut registry = Registry::new(false);
        registry
            .parse_text("global # primary\n  daemon\nfrontend f\n  mode http\nglobal\n  maxconn 1\n")
            .unwrap();
        let global = registry.section(SectionKind::Global, SINGLETON_NAME).unwrap();
        assert_eq!(global.header_comment(), Some("primary"));

        registry.parse_text("defaults # old\ndefaults # new\n  mode http\n").unwrap();
        let defaults = registry.section(SectionKind::Defaults, SINGLETON_NAME).unwrap();
        assert_eq!(defaults.header_comment(), Some("new"));
    }

    #[test]
    fn test_declarations_hold_no_value() {
        let mut registry = Registry::new(false);
        registry.create_section(SectionKind::Backend, "b1").unwrap();
        registry.parse_text("# top\nbackend b2\n  mode http\nbackend b3\n").unwrap();

        for (kind, name) in [
            (SectionKind::Comments, SINGLETON_NAME),
            (SectionKind::Backend, "b2"),
        ] {
            assert!(registry.get(kind, name, "backend", false).unwrap_err().is_not_found());
            assert!(registry.get_one(kind, name, "backend", None).unwrap_err().is_not_found());
        }
    }

    #[test]
    fn test_duplicate_section_in_text() {
        let mut registry = Registry::new(false);
        let err = registry
            .parse_text("backend app\n  mode http\nbackend app\n")
            .unwrap_err();
        assert!(matches!(err, Error::SectionAlreadyExists { kind: SectionKind::Backend, .. }));
    }

    #[test]
    fn test_malformed_line_reports_context() {
        let mut registry = Registry::new(false);
        let err = registry.parse_text("global\n  maxconn many\n").unwrap_err();
        match err {
            Error::Parse { parser, line_no, line, .. } => {
                assert_eq!(parser, "maxconn");
                assert_eq!(line_no, 2);
                assert_eq!(line, "maxconn many");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_strict_rejects_unknown() {
        let mut registry = Registry::new(true);
        let err = registry.parse_text("global\n  frobnicate yes\n").unwrap_err();
        assert!(matches!(err, Error::Parse { ref parser, .. } if parser == "unprocessed"));

        let mut lenient = Registry::new(false);
        lenient.parse_text("global\n  frobnicate yes\n").unwrap();
        assert_eq!(
            lenient.get_one(SectionKind::Global, SINGLETON_NAME, "unprocessed", Some(0)).unwrap().value,
            Value::Raw("frobnicate yes".into())
        );
    }

    #[test]
    fn test_first_match_wins() {
        let mut registry = Registry::new(false);
        let custom = crate::section_set::SectionSet::with_parsers(
            SectionKind::Backend,
            vec![
                SectionDecl::new(SectionKind::Backend).into(),
                Flag::new("option redispatch").into(),
                List::args("option").into(),
                List::unprocessed().into(),
            ],
        );
        registry.instances_mut(SectionKind::Backend).unwrap().insert("custom".into(), custom);

        let words = vec!["option".to_string(), "redispatch".to_string()];
        let line = Line {
            raw: "option redispatch",
            words: &words,
            previous: &[],
            comment: None,
            line_no: 1,
        };
        let state = ParseState {
            kind: SectionKind::Backend,
            name: "custom".into(),
        };
        registry.process_line(&line, state).unwrap();

        let section = registry.section(SectionKind::Backend, "custom").unwrap();
        assert!(section.get_one("option redispatch", None).is_ok());
        assert!(section.get("option", false).unwrap_err().is_not_found());
    }

    #[test]
    fn test_create_and_delete_section() {
        let mut registry = Registry::new(false);
        registry.create_section(SectionKind::Backend, "b1").unwrap();
        assert!(matches!(
            registry.create_section(SectionKind::Backend, "b1"),
            Err(Error::SectionAlreadyExists { .. })
        ));
        assert!(matches!(
            registry.create_section(SectionKind::Backend, "two words"),
            Err(Error::InvalidValue { .. })
        ));
        assert!(registry.section(SectionKind::Backend, "b1").unwrap().is_empty());

        registry.delete_section(SectionKind::Backend, "b1").unwrap();
        registry.delete_section(SectionKind::Backend, "b1").unwrap();
        assert!(registry.sections(SectionKind::Backend).unwrap().is_empty());
        assert!(matches!(
            registry.delete_section(SectionKind::Global, SINGLETON_NAME),
            Err(Error::SingletonSection { .. })
        ));
    }

    #[test]
    fn test_has_parser_without_instances() {
        let registry = Registry::new(false);
        assert!(registry.has_parser(SectionKind::Backend, "server"));
        assert!(!registry.has_parser(SectionKind::Frontend, "server"));
    }
}
