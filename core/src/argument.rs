//! Positional argument patterns.
//!
//! A pattern is declared as text:
//!
//! - `name`: fixed keyword; the token must equal `name`.
//! - `<name>`: variable; captures whatever token is present.
//! - `[...]`: optional wrapper around either form.
//! - `...` suffix: consumes every remaining token.
//!
//! Modifiers combine, e.g. `[<files>...]`.

use crate::error::{GrammarError, ParseError};
use crate::value::Value;

/// One declared positional slot of a command.
///
/// # Examples
///
/// ```
/// use command_grammar_core::{Argument, Value};
///
/// let arg = Argument::parse("[<files>...]").unwrap();
/// assert!(arg.optional && arg.multiple && arg.variable);
/// assert_eq!(arg.name, "files");
///
/// let tokens = vec!["a.txt".to_string(), "b.txt".to_string()];
/// let (value, rest) = arg.consume(&tokens).unwrap();
/// assert_eq!(value, Some(Value::List(vec!["a.txt".into(), "b.txt".into()])));
/// assert!(rest.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// Pattern text as declared.
    pub original: String,
    /// Wrapped in `[...]`.
    pub optional: bool,
    /// Suffixed with `...`.
    pub multiple: bool,
    /// Wrapped in `<...>`; otherwise a fixed keyword.
    pub variable: bool,
    /// Output key, stripped of brackets and ellipsis.
    pub name: String,
}

impl Argument {
    /// Parses a declared pattern.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::InvalidArgumentPattern`] when a bracket is
    /// not matched or the name is empty.
    pub fn parse(pattern: &str) -> Result<Self, GrammarError> {
        let mut rest = pattern;

        let optional = strip_between(pattern, rest, '[', ']')?;
        if optional {
            rest = &rest[1..rest.len() - 1];
        }

        let multiple = rest.ends_with("...");
        if multiple {
            rest = &rest[..rest.len() - 3];
        }

        let variable = strip_between(pattern, rest, '<', '>')?;
        if variable {
            rest = &rest[1..rest.len() - 1];
        }

        if rest.is_empty() {
            return Err(GrammarError::InvalidArgumentPattern {
                pattern: pattern.to_string(),
                reason: "name cannot be empty".to_string(),
            });
        }
        if let Some(stray) = rest.chars().find(|c| matches!(c, '[' | ']' | '<' | '>')) {
            return Err(GrammarError::InvalidArgumentPattern {
                pattern: pattern.to_string(),
                reason: format!("unmatched `{stray}`"),
            });
        }

        Ok(Self {
            original: pattern.to_string(),
            optional,
            multiple,
            variable,
            name: rest.to_string(),
        })
    }

    /// Matches this argument against the front of `tokens`.
    ///
    /// Returns the matched value (`None` only for an absent optional
    /// argument) and the tokens left for the following arguments.
    pub fn consume<'a>(
        &self,
        tokens: &'a [String],
    ) -> Result<(Option<Value>, &'a [String]), ParseError> {
        if tokens.is_empty() {
            return self.handle_empty();
        }

        if self.multiple {
            if !self.variable {
                for token in tokens {
                    self.ensure_fixed(token)?;
                }
            }
            let values = tokens.iter().map(|t| Value::String(t.clone())).collect();
            return Ok((Some(Value::List(values)), &[]));
        }

        let (first, rest) = (&tokens[0], &tokens[1..]);
        if !self.variable {
            self.ensure_fixed(first)?;
        }
        Ok((Some(Value::String(first.clone())), rest))
    }

    fn handle_empty<'a>(&self) -> Result<(Option<Value>, &'a [String]), ParseError> {
        if self.optional {
            return Ok((None, &[]));
        }
        if self.variable {
            Err(ParseError::MissingArgument(self.name.clone()))
        } else {
            Err(ParseError::fixed(&self.name, None))
        }
    }

    fn ensure_fixed(&self, token: &str) -> Result<(), ParseError> {
        if token == self.name {
            Ok(())
        } else {
            Err(ParseError::fixed(&self.name, Some(token)))
        }
    }
}

/// Splits a whitespace-separated list of patterns.
pub fn parse_arguments(patterns: &str) -> Result<Vec<Argument>, GrammarError> {
    patterns.split_whitespace().map(Argument::parse).collect()
}

fn strip_between(pattern: &str, part: &str, open: char, close: char) -> Result<bool, GrammarError> {
    if !part.starts_with(open) {
        return Ok(false);
    }
    if part.len() < 2 || !part.ends_with(close) {
        return Err(GrammarError::InvalidArgumentPattern {
            pattern: pattern.to_string(),
            reason: format!("starts with `{open}` but does not end with `{close}`"),
        });
    }
    Ok(true)
}
