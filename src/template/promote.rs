//! Token tree -> config mapping.
//!
//! The text format cannot tell a list from a dictionary, so promotion is
//! driven by key names only: a list becomes a mapping when its key is a known
//! structural key, or when the enclosing mapping's `taskList` names it.
//! Everything else stays a list.

use crate::template::{TemplateError, TokenTree};
use crate::value::{Mapping, TASK_LIST_KEY, Value};
use tracing::{debug, trace};

/// Which keys hold dictionaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionRules {
    /// Always promoted, at any depth.
    pub known_keys: Vec<String>,
    /// Sibling keys named in this list are promoted.
    pub task_list_key: String,
}

impl Default for PromotionRules {
    fn default() -> Self {
        Self {
            known_keys: vec!["info".to_string(), "exportFormat".to_string()],
            task_list_key: TASK_LIST_KEY.to_string(),
        }
    }
}

impl PromotionRules {
    fn is_known(&self, key: &str) -> bool {
        self.known_keys.iter().any(|k| k == key)
    }
}

/// Pair adjacent elements: even positions are keys, odd positions values.
///
/// A repeated key keeps its first position and takes the last value. An odd
/// element count is an error rather than a silent drop of the last key.
pub fn promote(items: Vec<Value>) -> Result<Mapping, TemplateError> {
    let mut m = Mapping::new();
    let mut iter = items.into_iter().enumerate();
    while let Some((position, key)) = iter.next() {
        let Value::Atom(key) = key else {
            return Err(TemplateError::NonAtomKey { position });
        };
        let Some((_, value)) = iter.next() else {
            return Err(TemplateError::UnpairedElement { key });
        };
        m.insert(key, value);
    }
    Ok(m)
}

/// Recursively promote known and taskList-referenced keys of `m` in place.
///
/// Values that are already mappings are descended into without re-pairing,
/// so running this twice is harmless. Atoms under matching keys are left
/// as they are.
pub fn promote_known_keys(m: &mut Mapping, rules: &PromotionRules) -> Result<(), TemplateError> {
    let steps: Vec<String> = m
        .step_names(&rules.task_list_key)
        .unwrap_or_default()
        .into_iter()
        .map(str::to_string)
        .collect();

    for (key, value) in m.iter_mut() {
        if !rules.is_known(key) && !steps.iter().any(|s| s == key) {
            continue;
        }

        let nested = |source: TemplateError| TemplateError::Nested {
            key: key.to_string(),
            source: Box::new(source),
        };

        if let Value::Seq(items) = value {
            let items = std::mem::take(items);
            *value = Value::Map(promote(items).map_err(nested)?);
            trace!(key, "promoted list to mapping");
        }
        if let Value::Map(inner) = value {
            promote_known_keys(inner, rules).map_err(nested)?;
        }
    }
    Ok(())
}

/// Parse result -> config mapping with the default rules.
pub fn to_config(tokens: TokenTree) -> Result<Mapping, TemplateError> {
    to_config_with(tokens, &PromotionRules::default())
}

pub fn to_config_with(tokens: TokenTree, rules: &PromotionRules) -> Result<Mapping, TemplateError> {
    let mut config = promote(tokens)?;
    promote_known_keys(&mut config, rules)?;
    debug!(
        entries = config.len(),
        keys = ?config.keys().collect::<Vec<_>>(),
        "promoted template"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::parse;
    use crate::value::mapping;
    use pretty_assertions::assert_eq;

    fn config(text: &str) -> Mapping {
        to_config(parse(text).unwrap()).unwrap()
    }

    #[test]
    fn promote_pairs_in_first_seen_order() {
        let m = promote(vec![
            Value::from("b"),
            Value::from("1"),
            Value::from("a"),
            Value::Seq(vec![]),
            Value::from("b"),
            Value::from("2"),
        ])
        .unwrap();
        assert_eq!(
            m,
            mapping! { "b" => "2", "a" => Value::Seq(vec![]) }
        );
    }

    #[test]
    fn promote_rejects_odd_length() {
        let err = promote(vec![Value::from("a"), Value::from("1"), Value::from("dangling")]).unwrap_err();
        assert!(matches!(&err, TemplateError::UnpairedElement { key } if key == "dangling"));
    }

    #[test]
    fn promote_rejects_list_in_key_position() {
        let err = promote(vec![Value::from("a"), Value::from("1"), Value::Seq(vec![]), Value::from("2")])
            .unwrap_err();
        assert!(matches!(err, TemplateError::NonAtomKey { position: 2 }));
    }

    #[test]
    fn known_keys_promoted_at_any_depth() {
        let m = config("setEnv {resultDir /out exportFormat {type ics multidir 0}}\ninfo {version 2.6}");
        // setEnv is not referenced by a taskList, so only the top-level info is promoted.
        assert_eq!(
            m.get("setEnv"),
            Some(&Value::from(vec![
                Value::from("resultDir"),
                Value::from("/out"),
                Value::from("exportFormat"),
                Value::from(vec!["type", "ics", "multidir", "0"]),
            ]))
        );
        assert_eq!(m.get("info"), Some(&Value::Map(mapping! { "version" => "2.6" })));

        let m = config("taskList {setEnv}\nsetEnv {exportFormat {type ics}}");
        assert_eq!(
            m.get("setEnv"),
            Some(&Value::Map(mapping! {
                "exportFormat" => mapping! { "type" => "ics" },
            }))
        );
    }

    #[test]
    fn task_list_promotes_only_referenced_siblings() {
        let m = config(
            "taskList {setEnv workflowID:0}\n\
             setEnv {resultDir /out}\n\
             workflowID:0 {taskList {imgOpen cmle:0} imgOpen {path {/a b.tif}} cmle:0 {} tag {a b}}\n\
             other {x y}",
        );
        assert_eq!(m.get("other"), Some(&Value::from(vec!["x", "y"])));

        let wf = m.get("workflowID:0").and_then(Value::as_map).unwrap();
        assert_eq!(wf.get("cmle:0"), Some(&Value::Map(Mapping::new())));
        assert_eq!(wf.get("tag"), Some(&Value::from(vec!["a", "b"])));
        assert_eq!(
            wf.get("imgOpen"),
            Some(&Value::Map(mapping! { "path" => vec!["/a", "b.tif"] }))
        );
        assert_eq!(wf.step_names("taskList"), Some(vec!["imgOpen", "cmle:0"]));
    }

    #[test]
    fn promotion_is_idempotent() {
        let mut m = config("taskList {a}\na {info {k v}}");
        let once = m.clone();
        promote_known_keys(&mut m, &PromotionRules::default()).unwrap();
        assert_eq!(m, once);
    }

    #[test]
    fn custom_rules() {
        let rules = PromotionRules {
            known_keys: vec!["tag".to_string()],
            task_list_key: "steps".to_string(),
        };
        let tokens = parse("steps {a}\na {tag {x 1}}\ninfo {k v}").unwrap();
        let m = to_config_with(tokens, &rules).unwrap();
        assert_eq!(
            m.get("a"),
            Some(&Value::Map(mapping! { "tag" => mapping! { "x" => "1" } }))
        );
        assert_eq!(m.get("info"), Some(&Value::from(vec!["k", "v"])));
    }

    #[test]
    fn nested_error_names_the_path() {
        let err = to_config(parse("taskList {w}\nw {info {state}}").unwrap()).unwrap_err();
        let chain = anyhow::Error::from(err);
        assert_eq!(
            format!("{chain:#}"),
            "in `w`: in `info`: key `state` has no value (odd number of elements)"
        );
    }

    #[test]
    fn atom_under_known_key_is_left_alone() {
        let mut m = mapping! { "info" => "plain" };
        promote_known_keys(&mut m, &PromotionRules::default()).unwrap();
        assert_eq!(m.get("info"), Some(&Value::from("plain")));
    }
}
