//! Proxycfg Parser
//!
//! Reads a section-structured proxy configuration into an attribute
//! addressable model and writes it back, keeping directive order and
//! attached comments.
//!
//! # Example
//!
//! ```rust
//! use proxycfg_parser::{ConfigParser, SectionKind, Value};
//!
//! let parser = ConfigParser::new();
//! parser.load_str("global\n  maxconn 2000\n").unwrap();
//!
//! let entry = parser.get_one(SectionKind::Global, "data", "maxconn", None).unwrap();
//! assert_eq!(entry.value, Value::Int(2000));
//!
//! parser.set(SectionKind::Global, "data", "maxconn", Value::Int(4096), None).unwrap();
//! assert!(parser.render().contains("  maxconn 4096\n"));
//! ```

pub mod config;
pub mod directive;
pub mod lexer;
pub mod registry;
pub mod render;
pub mod roster;
pub mod section_set;

pub use config::ConfigParser;
pub use directive::{Directive, DirectiveParser, Line, OutputLine, ParseFailure, Transition};
pub use lexer::{tokenize_line, LexError, LineTokens};
pub use registry::{ParseState, Registry};
pub use section_set::SectionSet;

pub use proxycfg_core::{
    Bind, Entry, Error, ParserOptions, Payload, Result, SectionKind, Server, Value, SINGLETON_NAME,
};
