//! Template codec for batch template files (`.hgsb`).
//!
//! Text -> token tree (`parse`) -> config mapping (`to_config`), and config
//! mapping -> text (`serialize`). The trip through text keeps structure but
//! not types: every scalar comes back as a string, and only known or
//! taskList-referenced keys come back as mappings.

pub mod error;
pub mod parse;
pub mod promote;
pub mod write;

pub use error::TemplateError;
pub use parse::{TokenTree, parse, parse_file};
pub use promote::{PromotionRules, promote, promote_known_keys, to_config, to_config_with};
pub use write::{DEFAULT_COMMENT, serialize, serialize_with_comment, write_template};

use crate::value::Mapping;
use std::path::Path;

/// Parse a template file straight into a config mapping.
pub fn read_config(path: &Path, rules: &PromotionRules) -> Result<Mapping, TemplateError> {
    to_config_with(parse_file(path)?, rules)
}
