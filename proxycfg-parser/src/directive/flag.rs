//! Flag directives: `daemon`, `option httplog`, `no option redispatch`

use super::{check_comment, DirectiveParser, Line, OutputLine, ParseFailure, Transition};
use proxycfg_core::{Entry, Error, Payload, Result, Value};

/// Keyword without arguments, optionally negatable with a leading `no`
#[derive(Debug, Clone)]
pub struct Flag {
    name: String,
    keyword: Vec<&'static str>,
    negatable: bool,
    data: Option<Entry>,
}

impl Flag {
    pub fn new(keyword: &'static str) -> Self {
        Self {
            name: keyword.to_string(),
            keyword: keyword.split_whitespace().collect(),
            negatable: false,
            data: None,
        }
    }

    /// Flag that also accepts `no <keyword>`
    pub fn negatable(keyword: &'static str) -> Self {
        Self {
            negatable: true,
            ..Self::new(keyword)
        }
    }

    fn decode(&self, line: &Line<'_>) -> Option<bool> {
        // Trailing arguments belong to a more general directive.
        match line.strip_keyword(&self.keyword) {
            Some([]) => return Some(true),
            Some(_) => return None,
            None => {}
        }
        if !self.negatable || line.words.first().map(String::as_str) != Some("no") {
            return None;
        }
        let rest = &line.words[1..];
        (rest.len() == self.keyword.len()
            && rest.iter().zip(&self.keyword).all(|(word, kw)| word.as_str() == *kw))
        .then_some(false)
    }
}

impl DirectiveParser for Flag {
    fn init(&mut self) {
        self.data = None;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&mut self, line: &Line<'_>) -> std::result::Result<Option<Transition>, ParseFailure> {
        let enabled = self.decode(line).ok_or(ParseFailure::Mismatch)?;
        self.data = Some(Entry {
            value: Value::Enabled(enabled),
            comment: line.trailing_comment(),
        });
        Ok(None)
    }

    fn get(&self, create_if_absent: bool) -> Result<Payload> {
        match &self.data {
            Some(entry) => Ok(Payload::Single(entry.clone())),
            None if create_if_absent => Ok(Payload::Single(Entry::new(Value::Enabled(true)))),
            None => Err(Error::not_found(&self.name)),
        }
    }

    fn get_one(&self, _index: Option<usize>) -> Result<Entry> {
        self.data.clone().ok_or_else(|| Error::not_found(&self.name))
    }

    fn set(&mut self, entry: Entry, _index: Option<usize>) -> Result<()> {
        check_comment(&self.name, &entry)?;
        match entry.value {
            Value::Enabled(true) => {}
            Value::Enabled(false) if self.negatable => {}
            Value::Enabled(false) => {
                return Err(Error::invalid_value(&self.name, "enabled(true), flag is not negatable"));
            }
            ref other => {
                return Err(Error::invalid_value(
                    &self.name,
                    format!("enabled, got {}", other.type_name()),
                ));
            }
        }
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
        let Some(entry) = &self.data else {
            return Vec::new();
        };
        let keyword = self.keyword.join(" ");
        let data = match entry.value {
            Value::Enabled(false) => format!("no {}", keyword),
            _ => keyword,
        };
        let comment = entry.comment.clone().filter(|_| preserve_comment);
        vec![OutputLine::new(data, comment)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(parser: &mut Flag, text: &str) -> std::result::Result<Option<Transition>, ParseFailure> {
        let words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        parser.parse(&Line {
            raw: text,
            words: &words,
            previous: &[],
            comment: None,
            line_no: 1,
        })
    }

    #[test]
    fn test_plain_flag() {
        let mut daemon = Flag::new("daemon");
        assert_eq!(parse(&mut daemon, "daemon"), Ok(None));
        assert_eq!(daemon.get_one(None).unwrap().value, Value::Enabled(true));
        assert_eq!(parse(&mut daemon, "no daemon"), Err(ParseFailure::Mismatch));
        assert_eq!(daemon.render(true), vec![OutputLine::new("daemon", None)]);
    }

    #[test]
    fn test_negated_option() {
        let mut redispatch = Flag::negatable("option redispatch");
        parse(&mut redispatch, "no option redispatch").unwrap();
        assert_eq!(redispatch.get_one(None).unwrap().value, Value::Enabled(false));
        assert_eq!(redispatch.render(false)[0].data, "no option redispatch");
    }

    #[test]
    fn test_arguments_fall_through() {
        let mut httplog = Flag::negatable("option httplog");
        assert_eq!(parse(&mut httplog, "option httplog clf"), Err(ParseFailure::Mismatch));
        assert_eq!(parse(&mut httplog, "no option httplog clf"), Err(ParseFailure::Mismatch));
        assert!(httplog.get(false).is_err());
    }

    #[test]
    fn test_set_rejects_negation_on_plain_flag() {
        let mut daemon = Flag::new("daemon");
        assert!(daemon.set(Value::Enabled(false).into(), None).is_err());
        assert!(daemon.set(Value::Int(1).into(), None).is_err());
        daemon.set(Value::Enabled(true).into(), None).unwrap();
        assert_eq!(daemon.render(false).len(), 1);
    }
}
