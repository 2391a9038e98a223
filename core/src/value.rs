//! Parameter values produced by a parse.
//!
//! A successful parse yields a [`ParamMap`] keyed by argument and option
//! names. Values serialize untagged, so a map renders as plain JSON or YAML.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Key under which skipped (unknown) option tokens are collected when a
/// grammar allows skipping options.
pub const SKIPPED_OPTIONS_KEY: &str = "skipped_options";

/// Mapping from argument/option name to parsed value.
pub type ParamMap = BTreeMap<String, Value>;

/// A single parsed value.
///
/// # Examples
///
/// ```
/// use command_grammar_core::Value;
///
/// let list = Value::List(vec!["a".into(), "b".into()]);
/// assert_eq!(list.to_tokens(), vec!["a", "b"]);
/// assert_eq!(Value::Integer(3).to_string(), "3");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Presence marker for flags and options given without a value.
    Bool(bool),
    /// Integer value (coerced option argument or repeat counter).
    Integer(i64),
    /// Floating point value (coerced option argument).
    Float(f64),
    /// Raw string token.
    String(String),
    /// Accumulated values (multi-value positional or list option).
    List(Vec<Value>),
}

impl Value {
    /// Returns the string payload, if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Flattens the value into command-line tokens.
    ///
    /// Lists flatten one level; scalars render through [`Display`](fmt::Display).
    pub fn to_tokens(&self) -> Vec<String> {
        match self {
            Value::List(items) => items.iter().map(ToString::to_string).collect(),
            other => vec![other.to_string()],
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(" "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// Result of a successful parse: the grammar that matched and its parameters.
///
/// # Examples
///
/// ```
/// use command_grammar_core::{ParamMap, ParsedCommand, Value};
///
/// let mut params = ParamMap::new();
/// params.insert("message".into(), Value::from("hi"));
/// params.insert("verbose".into(), Value::Bool(true));
///
/// let cmd = ParsedCommand::new("display", params);
/// assert_eq!(cmd.get_str("message"), Some("hi"));
/// assert!(cmd.flag("verbose"));
/// assert!(!cmd.flag("quiet"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCommand {
    /// Name of the grammar that produced this result.
    pub command: String,
    /// Merged option and argument values.
    pub params: ParamMap,
}

impl ParsedCommand {
    pub fn new(command: &str, params: ParamMap) -> Self {
        Self {
            command: command.to_string(),
            params,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// True when the key holds `true` (flag given).
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Value::Bool(true)))
    }

    /// Repeat counter of a list flag, `0` when absent.
    pub fn count(&self, key: &str) -> i64 {
        self.get(key).and_then(Value::as_integer).unwrap_or(0)
    }

    /// String items of a list value; non-string items are skipped.
    pub fn list(&self, key: &str) -> Vec<&str> {
        self.get(key)
            .and_then(Value::as_list)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Tokens collected by a grammar that skips unknown options.
    pub fn skipped_options(&self) -> Vec<&str> {
        self.list(SKIPPED_OPTIONS_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_serializes_untagged() {
        let mut params = ParamMap::new();
        params.insert("count".into(), Value::Integer(3));
        params.insert("echo".into(), Value::List(vec!["a".into(), "b".into()]));
        params.insert("verbose".into(), Value::Bool(true));

        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"count":3,"echo":["a","b"],"verbose":true}"#);
    }

    #[test]
    fn test_to_tokens_flattens_lists() {
        let value = Value::List(vec!["x".into(), Value::Integer(2)]);
        assert_eq!(value.to_tokens(), vec!["x", "2"]);
        assert_eq!(Value::from("solo").to_tokens(), vec!["solo"]);
    }

    #[test]
    fn test_parsed_command_accessors() {
        let mut params = ParamMap::new();
        params.insert("line".into(), Value::Integer(3));
        params.insert(
            SKIPPED_OPTIONS_KEY.into(),
            Value::List(vec!["--ignore".into(), "value".into()]),
        );
        let cmd = ParsedCommand::new("list", params);

        assert_eq!(cmd.count("line"), 3);
        assert_eq!(cmd.count("missing"), 0);
        assert_eq!(cmd.skipped_options(), vec!["--ignore", "value"]);
    }
}
