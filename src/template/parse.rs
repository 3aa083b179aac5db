//! Template text -> token tree.
//!
//! Grammar:
//!   template := line+
//!   line     := KEY group
//!   group    := '{' (WORD | group)* '}'
//!
//! Between top-level lines, `#` at the start of a token comments out the rest
//! of the line. Inside a group `#` is an ordinary character. Quoted strings
//! are single words, kept verbatim with their quotes.

use crate::template::TemplateError;
use crate::value::Value;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::vec::IntoIter;

/// Flat `[key1, group1, key2, group2, ...]`; groups hold atoms and nested groups.
pub type TokenTree = Vec<Value>;

// Alternation order matters: a comment or quote wins over a bare word starting
// at the same position.
const QUOTED_RE: &str = r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#;
const WORD_RE: &str = r"[{}]|[^\s{}]+";
const COMMENT_RE: &str = r"#[^\n]*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lexeme<'a> {
    Open,
    Close,
    Word(&'a str),
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    lexeme: Lexeme<'a>,
    line: usize,
}

pub fn parse_file(path: &Path) -> Result<TokenTree, TemplateError> {
    let text = fs::read_to_string(path).map_err(|source| TemplateError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}

pub fn parse(text: &str) -> Result<TokenTree, TemplateError> {
    let mut tokens = Lexer::new()?.lex(text).into_iter();
    let mut out = TokenTree::new();

    while let Some(tok) = tokens.next() {
        let key = match tok.lexeme {
            Lexeme::Word(w) => w,
            Lexeme::Open => {
                return Err(TemplateError::ExpectedKey {
                    line: tok.line,
                    found: "{".to_string(),
                });
            }
            Lexeme::Close => return Err(TemplateError::UnmatchedClose { line: tok.line }),
        };

        match tokens.next() {
            Some(Token {
                lexeme: Lexeme::Open,
                line,
            }) => {
                let group = parse_group(&mut tokens, line)?;
                out.push(Value::from(key));
                out.push(Value::Seq(group));
            }
            other => {
                return Err(TemplateError::MissingValue {
                    key: key.to_string(),
                    line: other.map_or(tok.line, |t| t.line),
                });
            }
        }
    }

    if out.is_empty() {
        return Err(TemplateError::Empty);
    }
    Ok(out)
}

/// Consume tokens up to the `}` matching an already consumed `{`.
fn parse_group(tokens: &mut IntoIter<Token<'_>>, open_line: usize) -> Result<Vec<Value>, TemplateError> {
    let mut items = Vec::new();
    loop {
        match tokens.next() {
            Some(Token {
                lexeme: Lexeme::Word(w),
                ..
            }) => items.push(Value::from(w)),
            Some(Token {
                lexeme: Lexeme::Open,
                line,
            }) => items.push(Value::Seq(parse_group(tokens, line)?)),
            Some(Token {
                lexeme: Lexeme::Close,
                ..
            }) => return Ok(items),
            None => return Err(TemplateError::UnclosedBrace { line: open_line }),
        }
    }
}

/// Token patterns for top-level text and for text inside groups.
pub(crate) struct Lexer {
    top: Regex,
    group: Regex,
    quoted: Regex,
}

impl Lexer {
    pub(crate) fn new() -> Result<Self, TemplateError> {
        Ok(Self {
            top: Regex::new(&format!("{COMMENT_RE}|{QUOTED_RE}|{WORD_RE}"))?,
            group: Regex::new(&format!("{QUOTED_RE}|{WORD_RE}"))?,
            quoted: Regex::new(&format!(r"\A(?:{QUOTED_RE})"))?,
        })
    }

    fn lex<'a>(&self, text: &'a str) -> Vec<Token<'a>> {
        let mut out = Vec::new();
        let mut line = 1;
        let mut last = 0;
        let mut pos = 0;
        let mut depth = 0usize;
        loop {
            let re = if depth == 0 { &self.top } else { &self.group };
            let Some(m) = re.find_at(text, pos) else {
                break;
            };
            pos = m.end();
            line += text[last..m.start()].matches('\n').count();
            last = m.start();

            let lexeme = match m.as_str() {
                s if depth == 0 && s.starts_with('#') => continue,
                "{" => {
                    depth += 1;
                    Lexeme::Open
                }
                "}" => {
                    depth = depth.saturating_sub(1);
                    Lexeme::Close
                }
                s => Lexeme::Word(s),
            };
            out.push(Token { lexeme, line });
        }
        out
    }

    /// Number of words `text` splits into when it sits inside a group, or
    /// `None` if a quote in it would run past its end.
    pub(crate) fn word_count(&self, text: &str) -> Option<usize> {
        let mut count = 0;
        for m in self.group.find_iter(text) {
            if m.as_str().starts_with(['"', '\'']) && !self.quoted.is_match(&text[m.start()..]) {
                return None;
            }
            count += 1;
        }
        Some(count)
    }
}
