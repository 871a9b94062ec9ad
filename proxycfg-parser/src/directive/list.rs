//! Repeatable directives kept as an indexed sequence
//!
//! Besides keyword based lists (`server`, `bind`, `acl`, ...) two special
//! shapes live here: `Comments` collects comment-only lines, and `Raw` is the
//! terminal catch-all every section ends with. It takes any line no other
//! parser wanted so nothing is lost between load and save.

use super::{
    check_comment, check_text, check_word, checked_index, collapse_whitespace, DirectiveParser,
    Line, OutputLine, ParseFailure, Transition,
};
use proxycfg_core::{Bind, Entry, Error, Payload, Result, Server, Value};

/// Attribute name of the comment collector
pub const COMMENTS_NAME: &str = "comments";

/// Attribute name of the catch-all
pub const UNPROCESSED_NAME: &str = "unprocessed";

/// Element shape of a list directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    /// Keyword plus one or more arguments
    Args,
    /// `server <name> <address> [params...]`
    Server,
    /// `bind <address> [params...]`
    Bind,
    /// Comment-only lines
    Comments,
    /// Any line, verbatim
    Raw,
}

/// Directive that may appear any number of times
#[derive(Debug, Clone)]
pub struct List {
    name: String,
    keyword: Vec<&'static str>,
    shape: ListShape,
    data: Vec<Entry>,
}

impl List {
    pub fn new(keyword: &'static str, shape: ListShape) -> Self {
        Self {
            name: keyword.to_string(),
            keyword: keyword.split_whitespace().collect(),
            shape,
            data: Vec::new(),
        }
    }

    pub fn args(keyword: &'static str) -> Self {
        Self::new(keyword, ListShape::Args)
    }

    pub fn servers() -> Self {
        Self::new("server", ListShape::Server)
    }

    pub fn binds() -> Self {
        Self::new("bind", ListShape::Bind)
    }

    pub fn comments() -> Self {
        Self {
            name: COMMENTS_NAME.to_string(),
            keyword: Vec::new(),
            shape: ListShape::Comments,
            data: Vec::new(),
        }
    }

    pub fn unprocessed() -> Self {
        Self {
            name: UNPROCESSED_NAME.to_string(),
            keyword: Vec::new(),
            shape: ListShape::Raw,
            data: Vec::new(),
        }
    }

    pub fn shape(&self) -> ListShape {
        self.shape
    }

    fn decode(&self, line: &Line<'_>) -> std::result::Result<Value, ParseFailure> {
        match self.shape {
            ListShape::Comments => match line.comment {
                Some(text) if line.words.is_empty() => Ok(Value::Comment(text.to_string())),
                _ => Err(ParseFailure::Mismatch),
            },
            ListShape::Raw if line.words.is_empty() => Err(ParseFailure::Mismatch),
            ListShape::Raw => Ok(Value::Raw(line.words.join(" "))),
            ListShape::Args | ListShape::Server | ListShape::Bind => {
                let args = line.strip_keyword(&self.keyword).ok_or(ParseFailure::Mismatch)?;
                self.decode_args(args)
            }
        }
    }

    fn decode_args(&self, args: &[String]) -> std::result::Result<Value, ParseFailure> {
        match (self.shape, args) {
            (ListShape::Server, [name, address, params @ ..]) => Ok(Value::Server(
                Server::new(name.clone(), address.clone()).with_params(params.to_vec()),
            )),
            (ListShape::Server, _) => Err(ParseFailure::Malformed(
                "expected server name and address".to_string(),
            )),
            (ListShape::Bind, [address, params @ ..]) => Ok(Value::Bind(
                Bind::new(address.clone()).with_params(params.to_vec()),
            )),
            (ListShape::Bind, []) => Err(ParseFailure::Malformed("missing bind address".to_string())),
            (_, []) => Err(ParseFailure::Malformed("missing arguments".to_string())),
            (_, args) => Ok(Value::Args(args.to_vec())),
        }
    }

    fn check(&self, entry: &Entry) -> Result<()> {
        check_comment(&self.name, entry)?;
        match (self.shape, &entry.value) {
            (ListShape::Args, Value::Args(args)) if !args.is_empty() => {
                args.iter().try_for_each(|arg| check_word(&self.name, arg))
            }
            (ListShape::Server, Value::Server(server)) => {
                check_word(&self.name, &server.name)?;
                check_word(&self.name, &server.address)?;
                server.params.iter().try_for_each(|p| check_word(&self.name, p))
            }
            (ListShape::Bind, Value::Bind(bind)) => {
                check_word(&self.name, &bind.address)?;
                bind.params.iter().try_for_each(|p| check_word(&self.name, p))
            }
            (ListShape::Comments, Value::Comment(text)) => check_text_line(&self.name, text),
            (ListShape::Raw, Value::Raw(text)) if !text.trim().is_empty() => check_text(&self.name, text),
            (shape, other) => Err(Error::invalid_value(
                &self.name,
                format!("{}, got {}", expected_type(shape), other.type_name()),
            )),
        }
    }

    /// Free text the way it reads back: raw lines collapse whitespace, comments are trimmed
    fn normalize(&self, mut entry: Entry) -> Entry {
        match (self.shape, &mut entry.value) {
            (ListShape::Raw, Value::Raw(text)) => *text = collapse_whitespace(text),
            (ListShape::Comments, Value::Comment(text)) => *text = text.trim().to_string(),
            _ => {}
        }
        entry
    }

    fn format(&self, value: &Value) -> String {
        let keyword = self.keyword.join(" ");
        match value {
            Value::Args(args) => format!("{} {}", keyword, args.join(" ")),
            Value::Server(server) => format!("{} {}", keyword, server),
            Value::Bind(bind) => format!("{} {}", keyword, bind),
            Value::Comment(text) if text.is_empty() => "#".to_string(),
            Value::Comment(text) => format!("# {}", text),
            Value::Raw(text) => text.clone(),
            other => format!("{} {:?}", keyword, other),
        }
    }
}

fn expected_type(shape: ListShape) -> &'static str {
    match shape {
        ListShape::Args => "non-empty args",
        ListShape::Server => "server",
        ListShape::Bind => "bind",
        ListShape::Comments => "comment",
        ListShape::Raw => "non-empty raw",
    }
}

fn check_text_line(attribute: &str, text: &str) -> Result<()> {
    if text.contains('\n') || text.contains('\r') {
        return Err(Error::invalid_value(attribute, "a comment without line breaks"));
    }
    Ok(())
}

impl DirectiveParser for List {
    fn init(&mut self) {
        self.data.clear();
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&mut self, line: &Line<'_>) -> std::result::Result<Option<Transition>, ParseFailure> {
        let value = self.decode(line)?;
        let comment = match self.shape {
            ListShape::Comments => None,
            _ => line.trailing_comment(),
        };
        self.data.push(Entry { value, comment });
        Ok(None)
    }

    fn get(&self, create_if_absent: bool) -> Result<Payload> {
        if self.data.is_empty() && !create_if_absent {
            return Err(Error::not_found(&self.name));
        }
        Ok(Payload::List(self.data.clone()))
    }

    fn get_one(&self, index: Option<usize>) -> Result<Entry> {
        if self.data.is_empty() {
            return Err(Error::not_found(&self.name));
        }
        let index = checked_index(&self.name, index, self.data.len())?;
        Ok(self.data[index].clone())
    }

    fn set(&mut self, entry: Entry, index: Option<usize>) -> Result<()> {
        let entry = self.normalize(entry);
        self.check(&entry)?;
        match index {
            None => self.data.push(entry),
            Some(_) => {
                let index = checked_index(&self.name, index, self.data.len())?;
                self.data[index] = entry;
            }
        }
        Ok(())
    }

    fn insert(&mut self, entry: Entry, index: Option<usize>) -> Result<()> {
        let entry = self.normalize(entry);
        self.check(&entry)?;
        match index {
            None => self.data.push(entry),
            Some(index) if index <= self.data.len() => self.data.insert(index, entry),
            Some(index) => {
                return Err(Error::IndexOutOfRange {
                    attribute: self.name.clone(),
                    index,
                    len: self.data.len(),
                });
            }
        }
        Ok(())
    }

    fn delete(&mut self, index: Option<usize>) -> Result<()> {
        let index = checked_index(&self.name, index, self.data.len())?;
        self.data.remove(index);
        Ok(())
    }

    fn render(&self, preserve_comment: bool) -> Vec<OutputLine> {
        if self.shape == ListShape::Comments && !preserve_comment {
            return Vec::new();
        }
        self.data
            .iter()
            .map(|entry| {
                let comment = entry.comment.clone().filter(|_| preserve_comment);
                OutputLine::new(self.format(&entry.value), comment)
            })
            .collect()
    }
}
