//! Section kinds
//!
//! The configuration format knows a fixed set of section kinds. Three of
//! them (`Comments`, `Defaults`, `Global`) are singletons that always exist
//! under [`SINGLETON_NAME`]; every other kind holds zero or more named
//! instances created by declaration lines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Synthetic name under which every singleton section is stored
pub const SINGLETON_NAME: &str = "data";

/// Kind of a configuration section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// Free text before the first section declaration
    Comments,
    Defaults,
    Global,
    Resolvers,
    #[serde(rename = "userlist")]
    UserList,
    Peers,
    Mailers,
    Frontend,
    Backend,
    Listen,
    Cache,
    Program,
}

impl SectionKind {
    /// Every kind, in declaration order
    pub const ALL: [SectionKind; 12] = [
        SectionKind::Comments,
        SectionKind::Defaults,
        SectionKind::Global,
        SectionKind::Resolvers,
        SectionKind::UserList,
        SectionKind::Peers,
        SectionKind::Mailers,
        SectionKind::Frontend,
        SectionKind::Backend,
        SectionKind::Listen,
        SectionKind::Cache,
        SectionKind::Program,
    ];

    /// Order in which multi-instance kinds are written out
    pub const RENDER_ORDER: [SectionKind; 9] = [
        SectionKind::UserList,
        SectionKind::Peers,
        SectionKind::Mailers,
        SectionKind::Resolvers,
        SectionKind::Cache,
        SectionKind::Frontend,
        SectionKind::Backend,
        SectionKind::Listen,
        SectionKind::Program,
    ];

    /// Keyword used on section declaration lines
    pub fn keyword(self) -> &'static str {
        match self {
            SectionKind::Comments => "comments",
            SectionKind::Defaults => "defaults",
            SectionKind::Global => "global",
            SectionKind::Resolvers => "resolvers",
            SectionKind::UserList => "userlist",
            SectionKind::Peers => "peers",
            SectionKind::Mailers => "mailers",
            SectionKind::Frontend => "frontend",
            SectionKind::Backend => "backend",
            SectionKind::Listen => "listen",
            SectionKind::Cache => "cache",
            SectionKind::Program => "program",
        }
    }

    /// Singleton kinds have exactly one unnamed instance
    pub fn is_singleton(self) -> bool {
        matches!(
            self,
            SectionKind::Comments | SectionKind::Defaults | SectionKind::Global
        )
    }

    /// Kinds that may appear as a declaration line in the text
    pub fn is_declarable(self) -> bool {
        self != SectionKind::Comments
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Unknown section keyword
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown section kind: {0}")]
pub struct UnknownSectionKind(pub String);

impl FromStr for SectionKind {
    type Err = UnknownSectionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "comments" | "#" => SectionKind::Comments,
            "defaults" => SectionKind::Defaults,
            "global" => SectionKind::Global,
            "resolvers" => SectionKind::Resolvers,
            "userlist" | "userlists" => SectionKind::UserList,
            "peers" => SectionKind::Peers,
            "mailers" => SectionKind::Mailers,
            "frontend" | "frontends" => SectionKind::Frontend,
            "backend" | "backends" => SectionKind::Backend,
            "listen" => SectionKind::Listen,
            "cache" | "caches" => SectionKind::Cache,
            "program" | "programs" => SectionKind::Program,
            other => return Err(UnknownSectionKind(other.to_string())),
        };
        Ok(kind)
    }
}
