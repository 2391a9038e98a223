//! Named options and flags.
//!
//! An [`OptionSpec`] describes one option: its spellings, whether it takes a
//! value, how the value is coerced and what happens when the option is
//! triggered. The same type covers plain options (last value wins) and list
//! options (values accumulate, flags count repetitions).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{GrammarError, ParseError};
use crate::grammar::CommandGrammar;
use crate::value::{ParamMap, Value};

/// Type an option value is coerced to before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Keep the raw token (the default).
    #[default]
    String,
    /// Parse as `i64`.
    Integer,
    /// Parse as `f64`.
    Float,
}

/// State visible to trigger callbacks while a command line is parsed.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    grammar: &'a CommandGrammar,
    depth: usize,
}

impl<'a> ParseContext<'a> {
    pub fn new(grammar: &'a CommandGrammar, depth: usize) -> Self {
        Self { grammar, depth }
    }

    /// Grammar currently being parsed.
    pub fn grammar(&self) -> &'a CommandGrammar {
        self.grammar
    }

    /// Number of redispatch levels above the current parse.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Callback run instead of the default store when an option is triggered.
///
/// Receives the parse context, the option output map and the (already
/// coerced) value. Returning an error records it like any other parse error.
pub type TriggerFn =
    Arc<dyn Fn(&ParseContext<'_>, &mut ParamMap, &Value) -> Result<(), ParseError> + Send + Sync>;

/// What triggering an option does to the output map.
#[derive(Clone)]
pub enum OptionAction {
    /// `out[name] = value`.
    WriteValue,
    /// Append the value to a list, or count flag repetitions.
    Accumulate,
    /// Run a callback.
    Custom(TriggerFn),
}

impl fmt::Debug for OptionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionAction::WriteValue => f.write_str("WriteValue"),
            OptionAction::Accumulate => f.write_str("Accumulate"),
            OptionAction::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Declaration of a single option.
///
/// Spellings default from the name: `-` plus the first letter lowercased and
/// `--` plus the dasherized name. The value label defaults to the uppercased
/// name.
///
/// # Examples
///
/// ```
/// use command_grammar_core::OptionSpec;
///
/// let opt = OptionSpec::new("add_stuff", "Add stuff");
/// assert_eq!(opt.short(), Some("-a"));
/// assert_eq!(opt.long(), Some("--add-stuff"));
/// assert_eq!(opt.argument(), Some("ADD_STUFF"));
///
/// let verbose = OptionSpec::flag("verbose", "Verbose output").no_short();
/// assert!(verbose.is_flag());
/// assert_eq!(verbose.short(), None);
/// ```
#[derive(Debug, Clone)]
pub struct OptionSpec {
    name: String,
    description: String,
    short: Option<String>,
    long: Option<String>,
    argument: Option<String>,
    argument_optional: bool,
    value_type: Option<ValueType>,
    default: Option<Value>,
    action: OptionAction,
}

impl OptionSpec {
    /// Creates an option that takes a value.
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            short: default_short(name),
            long: Some(default_long(name)),
            argument: Some(name.to_uppercase()),
            argument_optional: false,
            value_type: None,
            default: None,
            action: OptionAction::WriteValue,
        }
    }

    /// Creates a flag (no value).
    pub fn flag(name: &str, description: &str) -> Self {
        Self::new(name, description).no_argument()
    }

    /// Creates an option whose values accumulate into a list.
    pub fn list(name: &str, description: &str) -> Self {
        Self {
            action: OptionAction::Accumulate,
            ..Self::new(name, description)
        }
    }

    /// Creates a flag that counts how many times it was given.
    pub fn list_flag(name: &str, description: &str) -> Self {
        Self::list(name, description).no_argument()
    }

    /// Builds an option from a usage line such as
    /// `-e --eko=message Echo the message`.
    ///
    /// Leading words starting with `-` are spellings. A `=arg` or `=<arg>`
    /// suffix declares a required value, `=[arg]` an optional one; without
    /// a suffix the option is a flag. Remaining words form the description.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::InvalidOptionUsage`] when the line declares no
    /// spelling or an unclosed value label.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_grammar_core::OptionSpec;
    ///
    /// let opt = OptionSpec::from_usage("echo", "-e --eko=[message] Echo the message").unwrap();
    /// assert_eq!(opt.short(), Some("-e"));
    /// assert_eq!(opt.long(), Some("--eko"));
    /// assert_eq!(opt.argument(), Some("message"));
    /// assert!(opt.is_argument_optional());
    /// assert_eq!(opt.description(), "Echo the message");
    /// ```
    pub fn from_usage(name: &str, usage: &str) -> Result<Self, GrammarError> {
        let invalid = |reason: &str| GrammarError::InvalidOptionUsage {
            usage: usage.to_string(),
            reason: reason.to_string(),
        };

        let mut short = None;
        let mut long = None;
        let mut argument = None;
        let mut optional = false;
        let mut words = usage.split_whitespace().peekable();

        while let Some(word) = words.next_if(|w| w.starts_with('-')) {
            let (spelling, label) = match word.split_once('=') {
                Some((spelling, label)) => (spelling, Some(label)),
                None => (word, None),
            };
            if spelling.starts_with("--") {
                long = Some(spelling.to_string());
            } else {
                short = Some(spelling.to_string());
            }
            if let Some(label) = label {
                let (label, is_optional) =
                    unwrap_label(label).ok_or_else(|| invalid("unclosed value label"))?;
                argument = Some(label.to_string());
                optional = is_optional;
            }
        }

        if short.is_none() && long.is_none() {
            return Err(invalid("no option spelling"));
        }

        let description = words.collect::<Vec<_>>().join(" ");
        let mut spec = Self::new(name, &description);
        spec.short = short;
        spec.long = long;
        spec.argument = argument;
        spec.argument_optional = optional;
        Ok(spec)
    }

    pub fn short_name(mut self, short: &str) -> Self {
        self.short = Some(short.to_string());
        self
    }

    pub fn no_short(mut self) -> Self {
        self.short = None;
        self
    }

    pub fn long_name(mut self, long: &str) -> Self {
        self.long = Some(long.to_string());
        self
    }

    pub fn no_long(mut self) -> Self {
        self.long = None;
        self
    }

    /// Sets the value label shown in help.
    pub fn argument_label(mut self, label: &str) -> Self {
        self.argument = Some(label.to_string());
        self
    }

    /// Turns the option into a flag.
    pub fn no_argument(mut self) -> Self {
        self.argument = None;
        self
    }

    /// Allows the value to be omitted; the option then stores `true`.
    pub fn argument_optional(mut self) -> Self {
        self.argument_optional = true;
        self
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    /// Value stored before parsing starts; absent options keep it.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Replaces the default store with a callback.
    pub fn on_trigger<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ParseContext<'_>, &mut ParamMap, &Value) -> Result<(), ParseError>
            + Send
            + Sync
            + 'static,
    {
        self.action = OptionAction::Custom(Arc::new(callback));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn short(&self) -> Option<&str> {
        self.short.as_deref()
    }

    pub fn long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    /// Value label, `None` for flags.
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    pub fn is_flag(&self) -> bool {
        self.argument.is_none()
    }

    pub fn is_argument_optional(&self) -> bool {
        self.argument_optional
    }

    pub fn action(&self) -> &OptionAction {
        &self.action
    }

    /// Spelling used in error messages: long form preferred.
    pub fn label(&self) -> &str {
        self.long
            .as_deref()
            .or(self.short.as_deref())
            .unwrap_or(&self.name)
    }

    /// Long spelling with its value label, e.g. `--require [LIBRARY]`.
    pub fn long_argument(&self) -> Option<String> {
        let long = self.long.as_deref()?;
        Some(match &self.argument {
            Some(arg) if self.argument_optional => format!("{long} [{arg}]"),
            Some(arg) => format!("{long} {arg}"),
            None => long.to_string(),
        })
    }

    /// Seeds `out` with a fresh copy of the default value.
    ///
    /// List options without an explicit default start from an empty list,
    /// counting flags from zero.
    pub fn load_default(&self, out: &mut ParamMap) {
        let seed = match (&self.default, &self.action) {
            (Some(default), _) => Some(default.clone()),
            (None, OptionAction::Accumulate) if self.is_flag() => Some(Value::Integer(0)),
            (None, OptionAction::Accumulate) => Some(Value::List(Vec::new())),
            (None, _) => None,
        };
        if let Some(seed) = seed {
            out.insert(self.name.clone(), seed);
        }
    }

    /// Coerces a raw value to the declared type. Presence markers
    /// (`true`) pass through untouched.
    pub fn cast(&self, value: Value) -> Result<Value, ParseError> {
        let raw = match (self.value_type, value) {
            (None | Some(ValueType::String), value) => return Ok(value),
            (_, Value::String(raw)) => raw,
            (_, other) => return Ok(other),
        };
        let result = match self.value_type {
            Some(ValueType::Float) => raw.parse::<f64>().map(Value::Float).map_err(|e| e.to_string()),
            _ => raw.parse::<i64>().map(Value::Integer).map_err(|e| e.to_string()),
        };
        result.map_err(|reason| ParseError::InvalidOptionValue {
            option: self.label().to_string(),
            value: raw,
            reason,
        })
    }

    /// Applies the option to the output map.
    pub fn trigger(
        &self,
        ctx: &ParseContext<'_>,
        out: &mut ParamMap,
        value: Value,
    ) -> Result<(), ParseError> {
        let value = self.cast(value)?;
        match &self.action {
            OptionAction::WriteValue => {
                out.insert(self.name.clone(), value);
            }
            OptionAction::Accumulate if self.is_flag() => {
                let count = out.get(&self.name).and_then(Value::as_integer).unwrap_or(0);
                out.insert(self.name.clone(), Value::Integer(count + 1));
            }
            OptionAction::Accumulate => match out.get_mut(&self.name) {
                Some(Value::List(items)) => items.push(value),
                _ => {
                    out.insert(self.name.clone(), Value::List(vec![value]));
                }
            },
            OptionAction::Custom(callback) => callback(ctx, out, &value)?,
        }
        Ok(())
    }
}

fn default_short(name: &str) -> Option<String> {
    name.chars()
        .next()
        .map(|c| format!("-{}", c.to_lowercase()))
}

fn default_long(name: &str) -> String {
    format!("--{}", name.to_lowercase().replace('_', "-"))
}

/// Strips `<..>` or `[..]` from a value label; the flag is true for `[..]`.
fn unwrap_label(label: &str) -> Option<(&str, bool)> {
    if let Some(inner) = label.strip_prefix('[') {
        let inner = inner.strip_suffix(']')?;
        let inner = inner
            .strip_prefix('<')
            .and_then(|i| i.strip_suffix('>'))
            .unwrap_or(inner);
        return Some((inner, true));
    }
    if let Some(inner) = label.strip_prefix('<') {
        return inner.strip_suffix('>').map(|i| (i, false));
    }
    Some((label, false))
}
