//! Section declaration lines: `frontend www`, `backend app`, `global`

use super::{DirectiveParser, Line, OutputLine, ParseFailure, Transition};
use proxycfg_core::{Entry, Error, Payload, Result, SectionKind};

/// Recognizes the declaration of one section kind and requests the switch.
///
/// Holds no payload: the declared name keys the new section and the header
/// comment is stored on it, so attribute reads always report not found.
#[derive(Debug, Clone)]
pub struct SectionDecl {
    kind: SectionKind,
}

impl SectionDecl {
    pub fn new(kind: SectionKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    fn decode(&self, line: &Line<'_>) -> std::result::Result<Option<String>, ParseFailure> {
        let args = line
            .strip_keyword(&[self.kind.keyword()])
            .ok_or(ParseFailure::Mismatch)?;

        if self.kind.is_singleton() {
            // An optional name is accepted and dropped.
            return match args {
                [] | [_] => Ok(None),
                _ => Err(ParseFailure::Malformed(format!(
                    "'{}' takes at most one name",
                    self.kind
                ))),
            };
        }

        match args {
            [name] => Ok(Some(name.clone())),
            [] => Err(ParseFailure::Malformed(format!(
                "'{}' requires a section name",
                self.kind
            ))),
            _ => Err(ParseFailure::Malformed(format!(
                "'{}' takes a single section name",
                self.kind
            ))),
        }
    }

    fn read_only(&self, operation: &'static str) -> Error {
        Error::Unsupported {
            attribute: self.kind.keyword().to_string(),
            operation,
        }
    }
}

impl DirectiveParser for SectionDecl {
    fn init(&mut self) {}

    fn name(&self) -> &str {
        self.kind.keyword()
    }

    fn parse(&mut self, line: &Line<'_>) -> std::result::Result<Option<Transition>, ParseFailure> {
        let name = self.decode(line)?;
        Ok(Some(Transition {
            kind: self.kind,
            name,
            comment: line.trailing_comment(),
        }))
    }

    fn get(&self, _create_if_absent: bool) -> Result<Payload> {
        Err(Error::not_found(self.kind.keyword()))
    }

    fn get_one(&self, _index: Option<usize>) -> Result<Entry> {
        Err(Error::not_found(self.kind.keyword()))
    }

    fn set(&mut self, _entry: Entry, _index: Option<usize>) -> Result<()> {
        Err(self.read_only("set"))
    }

    fn insert(&mut self, _entry: Entry, _index: Option<usize>) -> Result<()> {
        Err(self.read_only("insert"))
    }

    fn delete(&mut self, _index: Option<usize>) -> Result<()> {
        Err(self.read_only("delete"))
    }

    /// Headers are written by the serializer, never by the declaration parser.
    fn render(&self, _preserve_comment: bool) -> Vec<OutputLine> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxycfg_core::Value;

    fn feed(parser: &mut SectionDecl, text: &str) -> std::result::Result<Option<Transition>, ParseFailure> {
        let words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        parser.parse(&Line {
            raw: text,
            words: &words,
            previous: &[],
            comment: Some("edge"),
            line_no: 3,
        })
    }

    #[test]
    fn test_named_section() {
        let mut decl = SectionDecl::new(SectionKind::Frontend);
        let transition = feed(&mut decl, "frontend www").unwrap().unwrap();
        assert_eq!(transition.kind, SectionKind::Frontend);
        assert_eq!(transition.name.as_deref(), Some("www"));
        assert_eq!(transition.comment.as_deref(), Some("edge"));
        assert!(decl.get_one(None).unwrap_err().is_not_found());
        assert!(decl.get(true).unwrap_err().is_not_found());
        assert!(decl.render(true).is_empty());
    }

    #[test]
    fn test_name_required() {
        let mut decl = SectionDecl::new(SectionKind::Backend);
        assert!(matches!(feed(&mut decl, "backend"), Err(ParseFailure::Malformed(_))));
        assert!(matches!(feed(&mut decl, "backend a b"), Err(ParseFailure::Malformed(_))));
        assert_eq!(feed(&mut decl, "frontend a"), Err(ParseFailure::Mismatch));
    }

    #[test]
    fn test_singleton_name_optional() {
        let mut decl = SectionDecl::new(SectionKind::Defaults);
        let transition = feed(&mut decl, "defaults").unwrap().unwrap();
        assert_eq!(transition.name, None);
        let transition = feed(&mut decl, "defaults web").unwrap().unwrap();
        assert_eq!(transition.name, None);
    }

    #[test]
    fn test_read_only() {
        let mut decl = SectionDecl::new(SectionKind::Listen);
        assert!(matches!(
            decl.set(Value::Text("x".into()).into(), None),
            Err(Error::Unsupported { operation: "set", .. })
        ));
    }
}
