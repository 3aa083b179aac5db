use std::io;
use std::path::PathBuf;

/// Failures of the template codec. Line numbers are 1-based.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template contains no key/value lines")]
    Empty,

    #[error("line {line}: expected a key, found `{found}`")]
    ExpectedKey { line: usize, found: String },

    #[error("line {line}: key `{key}` is not followed by a braced value")]
    MissingValue { key: String, line: usize },

    #[error("line {line}: unmatched `}}`")]
    UnmatchedClose { line: usize },

    #[error("line {line}: `{{` is never closed")]
    UnclosedBrace { line: usize },

    #[error("key `{key}` has no value (odd number of elements)")]
    UnpairedElement { key: String },

    #[error("element {position} is in key position but is a nested list")]
    NonAtomKey { position: usize },

    #[error("atom `{atom}` cannot be written as template text")]
    Unrepresentable { atom: String },

    #[error("`{key}` cannot be written as a template key")]
    InvalidKey { key: String },

    #[error("in `{key}`")]
    Nested {
        key: String,
        #[source]
        source: Box<TemplateError>,
    },

    #[error("read template {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("write template {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Pattern(#[from] regex::Error),
}
