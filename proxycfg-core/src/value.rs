//! Value model stored by directive parsers
//!
//! Directive parsers decode a line into a [`Value`], keep it together with the
//! line's trailing comment as an [`Entry`] and hand it out as a [`Payload`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// One decoded directive value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Integer argument (`maxconn 2000`)
    Int(i64),

    /// Word or free words (`mode http`, `balance url_param userid`)
    Text(String),

    /// Flag; `false` is the explicit `no <keyword>` form
    Enabled(bool),

    /// Arguments of a repeatable directive (`acl is_api path_beg /api`)
    Args(Vec<String>),

    /// `server <name> <address> [params...]`
    Server(Server),

    /// `bind <address> [params...]`
    Bind(Bind),

    /// Comment-only line
    Comment(String),

    /// Line no directive recognized, kept verbatim
    Raw(String),
}

impl Value {
    /// Short name of the variant, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Text(_) => "text",
            Value::Enabled(_) => "enabled",
            Value::Args(_) => "args",
            Value::Server(_) => "server",
            Value::Bind(_) => "bind",
            Value::Comment(_) => "comment",
            Value::Raw(_) => "raw",
        }
    }
}

/// Backend server line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub params: Vec<String>,
}

impl Server {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.address)?;
        for param in &self.params {
            write!(f, " {}", param)?;
        }
        Ok(())
    }
}

/// Listening address line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bind {
    pub address: String,
    #[serde(default)]
    pub params: Vec<String>,
}

impl Bind {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }
}

impl fmt::Display for Bind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)?;
        for param in &self.params {
            write!(f, " {}", param)?;
        }
        Ok(())
    }
}

/// A value plus the comment attached to its line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Entry {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

impl From<Value> for Entry {
    fn from(value: Value) -> Self {
        Entry::new(value)
    }
}

/// Everything a directive currently holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Single(Entry),
    List(Vec<Entry>),
}

impl Payload {
    /// Entries in stored order
    pub fn entries(&self) -> &[Entry] {
        match self {
            Payload::Single(entry) => std::slice::from_ref(entry),
            Payload::List(entries) => entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
