//! Proxycfg Core Library
//!
//! Shared vocabulary for the proxycfg workspace: the closed set of section
//! kinds, the value model directive parsers store, parser options and the
//! error type every operation reports.

pub mod error;
pub mod options;
pub mod section;
pub mod value;

pub use error::{Error, Result};
pub use options::ParserOptions;
pub use section::{SectionKind, SINGLETON_NAME};
pub use value::{Bind, Entry, Payload, Server, Value};
