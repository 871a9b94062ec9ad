//! Line tokenizer
//!
//! Splits one configuration line into whitespace separated words plus an
//! optional trailing comment.
//!
//! - spaces, tabs, form feeds and carriage returns separate words
//! - the first `#` starts a comment that runs to the end of the line
//! - the comment text is trimmed and stored without the `#`

use logos::Logos;
use std::fmt;

/// Token types of a single line
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    #[regex(r"[ \t\f\r]+", logos::skip)]
    Whitespace,

    /// `# ...` up to end of line
    #[regex(r"#[^\n]*", |lex| lex.slice()[1..].trim().to_string())]
    Comment(String),

    /// Anything that is not whitespace or a comment start
    #[regex(r"[^ \t\r\n\f#]+", |lex| lex.slice().to_string())]
    Word(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Comment(s) => write!(f, "# {}", s),
            Token::Word(s) => write!(f, "{}", s),
            _ => write!(f, "{:?}", self),
        }
    }
}

/// Words and trailing comment of one line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineTokens {
    pub words: Vec<String>,
    pub comment: Option<String>,
}

impl LineTokens {
    /// Nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.words.is_empty() && self.comment.is_none()
    }
}

/// Lexer error
#[derive(Debug, Clone, thiserror::Error)]
pub enum LexError {
    #[error("Unexpected character at position {position}")]
    UnexpectedChar { position: usize },
}

/// Tokenize a single line (without its line terminator)
pub fn tokenize_line(line: &str) -> Result<LineTokens, LexError> {
    let mut tokens = LineTokens::default();

    for (result, span) in Token::lexer(line).spanned() {
        match result {
            Ok(Token::Word(word)) => tokens.words.push(word),
            Ok(Token::Comment(comment)) => tokens.comment = Some(comment),
            Ok(Token::Whitespace) => continue,
            Err(_) => return Err(LexError::UnexpectedChar { position: span.start }),
        }
    }

    Ok(tokens)
}

/// Split configuration text into lines, dropping `\r\n` terminators
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_directive() {
        let tokens = tokenize_line("  maxconn\t2000").unwrap();
        assert_eq!(tokens.words, vec!["maxconn", "2000"]);
        assert_eq!(tokens.comment, None);
    }

    #[test]
    fn test_trailing_comment() {
        let tokens = tokenize_line("server web1 10.0.0.1:80 check # primary node").unwrap();
        assert_eq!(tokens.words, vec!["server", "web1", "10.0.0.1:80", "check"]);
        assert_eq!(tokens.comment.as_deref(), Some("primary node"));
    }

    #[test]
    fn test_comment_only() {
        let tokens = tokenize_line("# managed by ops").unwrap();
        assert!(tokens.words.is_empty());
        assert_eq!(tokens.comment.as_deref(), Some("managed by ops"));
        assert!(!tokens.is_blank());
    }

    #[test]
    fn test_hash_splits_word() {
        let tokens = tokenize_line("acl a path_beg /x#frag").unwrap();
        assert_eq!(tokens.words, vec!["acl", "a", "path_beg", "/x"]);
        assert_eq!(tokens.comment.as_deref(), Some("frag"));
    }

    #[test]
    fn test_blank() {
        assert!(tokenize_line(" \t ").unwrap().is_blank());
        assert!(tokenize_line("").unwrap().is_blank());
    }

    #[test]
    fn test_split_lines_crlf() {
        let lines: Vec<_> = split_lines("global\r\n  daemon\n").collect();
        assert_eq!(lines, vec!["global", "  daemon", ""]);
    }
}
