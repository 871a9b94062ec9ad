//! Single-valued directives: `maxconn 2000`, `mode http`, `timeout client 30s`

use super::{check_comment, check_text, check_word, collapse_whitespace, DirectiveParser, Line, OutputLine, ParseFailure, Transition};
use proxycfg_core::{Entry, Error, Payload, Result, Value};

/// Argument shape of a scalar directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// Exactly one integer
    Number,
    /// Exactly one word
    Word,
    /// Zero or more words, stored joined by single spaces
    Words,
}

/// Directive holding at most one value
#[derive(Debug, Clone)]
pub struct Scalar {
    name: String,
    keyword: Vec<&'static str>,
    kind: ScalarKind,
    data: Option<Entry>,
}

impl Scalar {
    /// `keyword` may span several words (`"timeout client"`); it doubles as the attribute name
    pub fn new(keyword: &'static str, kind: ScalarKind) -> Self {
        Self {
            name: keyword.to_string(),
            keyword: keyword.split_whitespace().collect(),
            kind,
            data: None,
        }
    }

    pub fn number(keyword: &'static str) -> Self {
        Self::new(keyword, ScalarKind::Number)
    }

    pub fn word(keyword: &'static str) -> Self {
        Self::new(keyword, ScalarKind::Word)
    }

    pub fn words(keyword: &'static str) -> Self {
        Self::new(keyword, ScalarKind::Words)
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    fn decode(&self, args: &[String]) -> std::result::Result<Value, ParseFailure> {
        match self.kind {
            ScalarKind::Number => match args {
                [arg] => arg
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|e| ParseFailure::Malformed(format!("invalid number {:?}: {}", arg, e))),
                [] => Err(ParseFailure::Malformed("missing value".to_string())),
                _ => Err(ParseFailure::Malformed("expected a single number".to_string())),
            },
            ScalarKind::Word => match args {
                [arg] => Ok(Value::Text(arg.clone())),
                [] => Err(ParseFailure::Malformed("missing value".to_string())),
                _ => Err(ParseFailure::Malformed("expected a single value".to_string())),
            },
            ScalarKind::Words => Ok(Value::Text(args.join(" "))),
        }
    }

    fn check(&self, entry: &Entry) -> Result<()> {
        check_comment(&self.name, entry)?;
        match (self.kind, &entry.value) {
            (ScalarKind::Number, Value::Int(_)) => Ok(()),
            (ScalarKind::Word, Value::Text(text)) => check_word(&self.name, text),
            (ScalarKind::Words, Value::Text(text)) => check_text(&self.name, text),
            (ScalarKind::Number, other) => Err(Error::invalid_value(
                &self.name,
                format!("int, got {}", other.type_name()),
            )),
            (_, other) => Err(Error::invalid_value(
                &self.name,
                format!("text, got {}", other.type_name()),
            )),
        }
    }

    fn empty_value(&self) -> Value {
        match self.kind {
            ScalarKind::Number => Value::Int(0),
            ScalarKind::Word | ScalarKind::Words => Value::Text(String::new()),
        }
    }

    fn format(&self, value: &Value) -> String {
        let keyword = self.keyword.join(" ");
        let arg = match value {
            Value::Int(n) => n.to_string(),
            Value::Text(text) => text.clone(),
            _ => String::new(),
        };
        if arg.is_empty() {
            keyword
        } else {
            format!("{} {}", keyword, arg)
        }
    }
}

impl DirectiveParser for Scalar {
    fn init(&mut self) {
        self.data = None;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&mut self, line: &Line<'_>) -> std::result::Result<Option<Transition>, ParseFailure> {
        let args = line.strip_keyword(&self.keyword).ok_or(ParseFailure::Mismatch)?;
        let value = self.decode(args)?;
        self.data = Some(Entry {
            value,
            comment: line.trailing_comment(),
        });
        Ok(None)
    }

    fn get(&self, create_if_absent: bool) -> Result<Payload> {
        match &self.data {
            Some(entry) => Ok(Payload::Single(entry.clone())),
            None if create_if_absent => Ok(Payload::Single(Entry::new(self.empty_value()))),
            None => Err(Error::not_found(&self.name)),
        }
    }

    fn get_one(&self, _index: Option<usize>) -> Result<Entry> {
        self.data.clone().ok_or_else(|| Error::not_found(&self.name))
    }

    fn set(&mut self, mut entry: Entry, _index: Option<usize>) -> Result<()> {
        if let (ScalarKind::Words, Value::Text(text)) = (self.kind, &mut entry.value) {
            *text = collapse_whitespace(text);
        }
        self.check(&entry)?;
        self.data = Some(entry);
        Ok(())
    }

    fn insert(&mut self, entry: Entry, index: Option<usize>) -> Result<()> {
        self.set(entry, index)
    }

    fn delete(&mut self, _index: Option<usize>) -> Result<()> {
        self.data = None;
        Ok(())
    }

    fn render(&self, preserve_comment: bool) -> Vec<OutputLine> {
        self.data
            .iter()
            .map(|entry| {
                let comment = entry.comment.clone().filter(|_| preserve_comment);
                OutputLine::new(self.format(&entry.value), comment)
            })
            .collect()
    }
}
