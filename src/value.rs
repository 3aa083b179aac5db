//! Nested value model shared by the job builder and the template codec.
//!
//! The template format only knows words and braced groups, so every scalar is
//! stored as its text form at construction time:
//! - `Atom`: a single word (numbers are already stringified)
//! - `Seq`: a braced list of values
//! - `Map`: a braced list read as alternating keys and values
//!
//! `Mapping` keeps insertion order; the tool reads keys positionally.

use serde::Serialize;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use std::fmt::Display;

/// Key holding the ordered step names of a job or workflow.
pub const TASK_LIST_KEY: &str = "taskList";

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Atom(String),
    Seq(Vec<Value>),
    Map(Mapping),
}

impl Value {
    /// Stringify any displayable scalar.
    pub fn atom(v: impl Display) -> Self {
        Value::Atom(v.to_string())
    }

    /// Repeat `v` once per channel.
    pub fn broadcast(v: impl Into<Value>, n: usize) -> Self {
        let v = v.into();
        Value::Seq(vec![v; n])
    }

    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Value::Atom(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Atom(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Atom(s)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::atom(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::atom(v)
    }
}

/// Unset scalars become empty atoms.
impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(v) => Value::atom(v),
            None => Value::Atom(String::new()),
        }
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Value::Map(m)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Atom(s) => serializer.serialize_str(s),
            Value::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(m) => m.serialize(serializer),
        }
    }
}

/// Insertion-ordered string-keyed mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, Value)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Step names listed under `key` (atoms only). None if the key is absent
    /// or not list-shaped.
    pub fn step_names(&self, key: &str) -> Option<Vec<&str>> {
        let items = self.get(key)?.as_seq()?;
        Some(items.iter().filter_map(Value::as_atom).collect())
    }

    /// Walk entries in `taskList` order rather than insertion order.
    ///
    /// Steps named in the list but missing from the mapping are yielded with
    /// `None` so callers can report them.
    pub fn tasks(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.step_names(TASK_LIST_KEY)
            .unwrap_or_default()
            .into_iter()
            .map(move |name| (name, self.get(name)))
    }

    /// Append `name` to the `taskList` entry, creating it if needed.
    pub fn push_task(&mut self, name: &str) {
        match self.get_mut(TASK_LIST_KEY) {
            Some(Value::Seq(items)) => items.push(Value::from(name)),
            _ => {
                self.insert(TASK_LIST_KEY, vec![name]);
            }
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Build a `Mapping` from `key => value` pairs, converting values with `Into<Value>`.
macro_rules! mapping {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut m = $crate::value::Mapping::new();
        $( m.insert($key, $crate::value::Value::from($value)); )*
        m
    }};
}

pub(crate) use mapping;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_replaces_in_place() {
        let mut m = mapping! { "a" => "1", "b" => "2" };
        let old = m.insert("a", "3");
        assert_eq!(old, Some(Value::from("1")));
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(m.get("a"), Some(&Value::from("3")));
    }

    #[test]
    fn tasks_follow_task_list_order() {
        let m = mapping! {
            "second" => mapping! {},
            "taskList" => vec!["first", "second", "missing"],
            "first" => mapping! {},
        };
        let names: Vec<(&str, bool)> = m.tasks().map(|(n, v)| (n, v.is_some())).collect();
        assert_eq!(
            names,
            vec![("first", true), ("second", true), ("missing", false)]
        );
    }

    #[test]
    fn push_task_creates_list() {
        let mut m = Mapping::new();
        m.push_task("setEnv");
        m.push_task("workflowID:0");
        assert_eq!(m.step_names("taskList"), Some(vec!["setEnv", "workflowID:0"]));
    }

    #[test]
    fn json_keeps_key_order() {
        let m = mapping! {
            "z" => "1",
            "a" => vec!["x", "y"],
            "m" => mapping! { "k" => None::<f64> },
        };
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"z":"1","a":["x","y"],"m":{"k":""}}"#);
    }

    #[test]
    fn broadcast_repeats_value() {
        assert_eq!(
            Value::broadcast(1.4, 3),
            Value::Seq(vec![Value::from("1.4"); 3])
        );
    }
}
