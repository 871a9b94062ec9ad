//! Configuration writer
//!
//! Output layout:
//! - the comments section first, unindented and without a header
//! - `defaults`, then `global`
//! - named sections grouped by kind in [`SectionKind::RENDER_ORDER`],
//!   alphabetically within a kind, each preceded by a blank line
//! - a section with no directive values and no header comment writes nothing
//! - body lines indented by two spaces, trailing comments as ` # text`

use crate::directive::DirectiveParser;
use crate::registry::Registry;
use crate::section_set::SectionSet;
use proxycfg_core::{SectionKind, SINGLETON_NAME};
use std::fmt::Write;

const INDENT: &str = "  ";

/// Render the whole registry as configuration text
pub fn render(registry: &Registry, preserve_comments: bool) -> String {
    let mut out = String::new();

    if let Ok(comments) = registry.section(SectionKind::Comments, SINGLETON_NAME) {
        write_body(&mut out, comments, "", preserve_comments);
    }

    for kind in [SectionKind::Defaults, SectionKind::Global] {
        if let Ok(section) = registry.section(kind, SINGLETON_NAME) {
            write_section(&mut out, kind.keyword(), section, preserve_comments);
        }
    }

    for kind in SectionKind::RENDER_ORDER {
        for (name, section) in registry.sorted_sections(kind) {
            let header = format!("{} {}", kind.keyword(), name);
            write_section(&mut out, &header, section, preserve_comments);
        }
    }

    out
}

fn write_section(out: &mut String, header: &str, section: &SectionSet, preserve_comments: bool) {
    let has_header_comment = preserve_comments && section.header_comment().is_some();
    if section.is_empty() && !has_header_comment {
        return;
    }
    write_header(out, header, section, preserve_comments);
    write_body(out, section, INDENT, preserve_comments);
}

fn write_header(out: &mut String, header: &str, section: &SectionSet, preserve_comments: bool) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(header);
    if let Some(comment) = section.header_comment().filter(|_| preserve_comments) {
        let _ = write!(out, " # {}", comment);
    }
    out.push('\n');
}

fn write_body(out: &mut String, section: &SectionSet, indent: &str, preserve_comments: bool) {
    for parser in section.iter() {
        for line in parser.render(preserve_comments) {
            out.push_str(indent);
            out.push_str(&line.data);
            if let Some(comment) = &line.comment {
                let _ = write!(out, " # {}", comment);
            }
            out.push('\n');
        }
    }
}
