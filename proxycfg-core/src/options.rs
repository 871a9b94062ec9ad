//! Parser options
//!
//! Options can be given in code or loaded from a small TOML file:
//!
//! ```toml
//! strict = true
//! preserve_comments = false
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Knobs that change how text is read and written
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserOptions {
    /// Fail on lines no directive recognizes instead of keeping them verbatim
    pub strict: bool,

    /// Write trailing and comment-only lines back out
    pub preserve_comments: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            strict: false,
            preserve_comments: true,
        }
    }
}

impl ParserOptions {
    /// Parse options from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Options(format!("Invalid TOML: {}", e)))
    }

    /// Load options from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Options(format!("Failed to read options file: {}", e)))?;
        Self::from_toml(&content)
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn preserve_comments(mut self, preserve: bool) -> Self {
        self.preserve_comments = preserve;
        self
    }
}
