//! Declarative command grammars.
//!
//! This crate defines the static side of command-line parsing:
//!
//! - [`Argument`]: a positional pattern (`name`, `<name>`, `[<name>]`,
//!   `<name>...`) and how it consumes tokens.
//! - [`OptionSpec`]: an option or flag with its spellings, value type and
//!   trigger behaviour.
//! - [`OptionBundle`]: a reusable, nestable group of options such as the
//!   built-in [`help_options`].
//! - [`CommandGrammar`]: the full shape of one command, built through
//!   [`GrammarBuilder`], including sub-command dispatch ([`Redispatch`]).
//! - [`ParseError`]: the severity-ranked error model shared with the parser.
//!
//! Grammars can also be loaded from YAML or JSON ([`GrammarDef`]).
//! Validation runs on [`GrammarBuilder::build`] and rejects grammars that
//! could never parse consistently.
//!
//! # Example
//!
//! ```
//! use command_grammar_core::*;
//!
//! let grammar = CommandGrammar::builder("display")
//!     .arguments("display <message>")
//!     .option(OptionSpec::list("echo", "Echo the message"))
//!     .option(OptionSpec::flag("verbose", "Verbose output"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(grammar.usage(), "command display <message> [Options]");
//! assert!(grammar.find_option_by_short("-e").is_some());
//! assert!(grammar.help().contains("-h, --help"));
//! ```

mod argument;
mod bundle;
mod definition;
mod error;
mod grammar;
mod help;
mod option;
mod validate;
mod value;

pub use argument::{Argument, parse_arguments};
pub use bundle::{ExecuteFn, HELP_BUNDLE, OptionBundle, help_options};
pub use definition::{
    BundleDef, DefinitionError, DispatchDef, FieldOptionDef, GrammarDef, OptionDef, OptionKind,
    SpellingDef, UsageOptionDef, load_grammars, parse_definitions,
};
pub use error::{GrammarError, ParseError, most_severe};
pub use grammar::{
    CommandGrammar, DEFAULT_EXE_NAME, EXE_NAME_ENV, GrammarBuilder, ROOT_PRIORITY, Redispatch,
    default_exe_name, sort_by_priority,
};
pub use option::{OptionAction, OptionSpec, ParseContext, TriggerFn, ValueType};
pub use validate::validate_grammar;
pub use value::{ParamMap, ParsedCommand, SKIPPED_OPTIONS_KEY, Value};
