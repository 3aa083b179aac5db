//! Config mapping -> template text.
//!
//! One line per top-level key, `<key> <value>`, where values render as:
//! - mapping: `{k1 v1 k2 v2 ...}`
//! - list:    `{item1 item2 ...}`
//! - atom:    as is; braced if it reads back as several words, `{}` if empty
//!
//! Top-level values are always braced. Text the grammar cannot carry (braces
//! or an unterminated quote inside an atom, keys that are not one word) is
//! refused rather than written in a form `parse` would reject.

use crate::template::TemplateError;
use crate::template::parse::Lexer;
use crate::value::{Mapping, Value};
use std::fs;
use std::path::Path;

pub const DEFAULT_COMMENT: &str = "Huygens template file written by huygens-batch";

/// Serialize with the default header comment.
pub fn serialize(config: &Mapping) -> Result<String, TemplateError> {
    serialize_with_comment(config, DEFAULT_COMMENT)
}

/// Each line of `comment` becomes a `# ` header line.
pub fn serialize_with_comment(config: &Mapping, comment: &str) -> Result<String, TemplateError> {
    let lexer = Lexer::new()?;
    let mut out = String::new();
    for line in comment.lines() {
        out.push_str("# ");
        out.push_str(line);
        out.push('\n');
    }
    for (key, value) in config.iter() {
        check_key(&lexer, key)?;
        // At the top level `#` would open a line comment.
        if key.starts_with('#') {
            return Err(TemplateError::InvalidKey {
                key: key.to_string(),
            });
        }
        out.push_str(key);
        out.push(' ');
        write_top_level(&lexer, value, &mut out).map_err(|e| nested(key, e))?;
        out.push('\n');
    }
    Ok(out)
}

pub fn write_template(path: &Path, config: &Mapping, comment: &str) -> Result<(), TemplateError> {
    let text = serialize_with_comment(config, comment)?;
    fs::write(path, text).map_err(|source| TemplateError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Render a single value in template syntax.
pub fn to_tcl(value: &Value) -> Result<String, TemplateError> {
    let mut out = String::new();
    write_value(&Lexer::new()?, value, &mut out)?;
    Ok(out)
}

/// A line needs a braced value, so a bare atom is wrapped once.
fn write_top_level(lexer: &Lexer, value: &Value, out: &mut String) -> Result<(), TemplateError> {
    match value {
        Value::Atom(s) => {
            check_atom(lexer, s)?;
            out.push('{');
            out.push_str(s);
            out.push('}');
            Ok(())
        }
        _ => write_value(lexer, value, out),
    }
}

fn write_value(lexer: &Lexer, value: &Value, out: &mut String) -> Result<(), TemplateError> {
    match value {
        Value::Atom(s) if s.is_empty() => out.push_str("{}"),
        Value::Atom(s) => {
            if check_atom(lexer, s)? == 1 {
                out.push_str(s);
            } else {
                out.push('{');
                out.push_str(s);
                out.push('}');
            }
        }
        Value::Seq(items) => {
            out.push('{');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_value(lexer, item, out)?;
            }
            out.push('}');
        }
        Value::Map(m) => {
            out.push('{');
            for (i, (k, v)) in m.iter().enumerate() {
                check_key(lexer, k)?;
                if i > 0 {
                    out.push(' ');
                }
                out.push_str(k);
                out.push(' ');
                write_value(lexer, v, out).map_err(|e| nested(k, e))?;
            }
            out.push('}');
        }
    }
    Ok(())
}

/// Words the atom reads back as.
fn check_atom(lexer: &Lexer, s: &str) -> Result<usize, TemplateError> {
    match lexer.word_count(s) {
        Some(n) if !s.contains(['{', '}']) => Ok(n),
        _ => Err(TemplateError::Unrepresentable {
            atom: s.to_string(),
        }),
    }
}

fn check_key(lexer: &Lexer, key: &str) -> Result<(), TemplateError> {
    if key.contains(['{', '}']) || lexer.word_count(key) != Some(1) {
        return Err(TemplateError::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(())
}

fn nested(key: &str, source: TemplateError) -> TemplateError {
    TemplateError::Nested {
        key: key.to_string(),
        source: Box::new(source),
    }
}
