//! Error types for grammar construction and command-line parsing.
//!
//! [`GrammarError`] covers mistakes in how a grammar is declared and is
//! raised once, when the grammar is built. [`ParseError`] covers mistakes in
//! user input; parse errors are accumulated during a parse pass and ranked by
//! [`ParseError::severity`] when a single one has to be reported.

use thiserror::Error;

/// Errors found while declaring a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// Positional pattern with mismatched brackets or an empty name.
    #[error("invalid argument pattern `{pattern}`: {reason}")]
    InvalidArgumentPattern { pattern: String, reason: String },
    /// Two positional arguments share the same name.
    #[error("duplicate argument in command: {0}")]
    DuplicateArgument(String),
    /// A greedy `...` argument is followed by other arguments.
    #[error("multi-value argument `{0}` must be the last argument")]
    MultipleNotLast(String),
    /// A positional argument and an option write to the same key.
    #[error("argument `{0}` collides with an option of the same name")]
    ArgumentShadowsOption(String),
    /// Two options of the same command share a spelling.
    #[error("duplicate option in command: {0}")]
    DuplicateOption(String),
    /// Short spelling is not a single dash followed by one character.
    #[error("invalid short option format: {0}")]
    InvalidShortOption(String),
    /// Long spelling does not start with `--` or has no name.
    #[error("invalid long option format: {0}")]
    InvalidLongOption(String),
    /// Option has both spellings disabled and can never be triggered.
    #[error("option `{0}` must define a short or long form")]
    MissingOptionName(String),
    /// Auto-option usage line could not be understood.
    #[error("invalid option usage `{usage}`: {reason}")]
    InvalidOptionUsage { usage: String, reason: String },
    /// Argument or option named after a key the parser writes itself.
    #[error("`{0}` is reserved for skipped options")]
    ReservedKey(String),
    /// Redispatch names a key that no argument or option produces.
    #[error("dispatch source `{0}` is not an argument or option of the command")]
    UnknownDispatchKey(String),
    /// Redispatch without explicit commands and without subcommands.
    #[error("command `{0}` dispatches but has no candidate commands")]
    EmptyDispatch(String),
}

/// Errors caused by the parsed command line.
///
/// # Examples
///
/// ```
/// use command_grammar_core::{ParseError, most_severe};
///
/// let errors = vec![
///     ParseError::UnknownOption("--other".into()),
///     ParseError::MissingArgument("message".into()),
/// ];
/// assert_eq!(most_severe(errors), Some(ParseError::MissingArgument("message".into())));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Token looks like an option but the command does not declare it.
    #[error("Unknown option {0}")]
    UnknownOption(String),
    /// A flag received a value through `--flag=value`.
    #[error("Unexpected argument '{value}' for option {option}")]
    OptionUnexpectedArgument { option: String, value: String },
    /// Generic option misuse, e.g. combining short options that take values.
    #[error("{message}")]
    Option { option: String, message: String },
    /// A value option was given without a value.
    #[error("Missing argument for option {0}")]
    MissingOptionArgument(String),
    /// Option value could not be coerced to the declared type.
    #[error("Invalid value '{value}' for option {option}: {reason}")]
    InvalidOptionValue {
        option: String,
        value: String,
        reason: String,
    },
    /// Positional tokens left after every argument matched.
    #[error("Too many arguments: {}", .0.join(" "))]
    TooManyArguments(Vec<String>),
    /// A required variable argument had no token left.
    #[error("Missing argument {0}")]
    MissingArgument(String),
    /// Help text to show instead of a result.
    #[error("{0}")]
    Help(String),
    /// A fixed keyword argument did not match.
    #[error("{}", fixed_message(expected, got.as_deref()))]
    FixedArgument {
        expected: String,
        got: Option<String>,
    },
    /// Redispatch nested deeper than the configured limit.
    #[error("command dispatch nested deeper than {0} levels")]
    DispatchDepthExceeded(usize),
}

fn fixed_message(expected: &str, got: Option<&str>) -> String {
    match got {
        Some(got) => format!("Expected argument '{expected}' but got '{got}'"),
        None => format!("Missing argument '{expected}'"),
    }
}

impl ParseError {
    /// Static rank of the error kind; higher is more specific.
    pub fn severity(&self) -> u32 {
        match self {
            ParseError::UnknownOption(_) => 10,
            ParseError::OptionUnexpectedArgument { .. } => 20,
            ParseError::Option { .. } => 25,
            ParseError::MissingOptionArgument(_) => 30,
            ParseError::InvalidOptionValue { .. } => 40,
            ParseError::TooManyArguments(_) => 50,
            ParseError::MissingArgument(_) => 60,
            ParseError::Help(_) => 90,
            ParseError::FixedArgument { .. } => 100,
            ParseError::DispatchDepthExceeded(_) => 0,
        }
    }

    /// True for the keyword mismatch a dispatcher uses to move on to the
    /// next candidate grammar.
    pub fn rules_out_command(&self) -> bool {
        matches!(self, ParseError::FixedArgument { .. })
    }

    pub fn is_help(&self) -> bool {
        matches!(self, ParseError::Help(_))
    }

    pub fn fixed(expected: &str, got: Option<&str>) -> Self {
        ParseError::FixedArgument {
            expected: expected.to_string(),
            got: got.map(String::from),
        }
    }
}

/// Picks the error with the highest severity; among equals, the one
/// encountered last wins.
pub fn most_severe(errors: impl IntoIterator<Item = ParseError>) -> Option<ParseError> {
    errors.into_iter().fold(None, |best, err| match best {
        Some(best) if best.severity() > err.severity() => Some(best),
        _ => Some(err),
    })
}
