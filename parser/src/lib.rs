//! Command-line parsing against declarative command grammars.
//!
//! Parsing happens in three layers:
//!
//! - [`OptionParser`]: one left-to-right pass that separates options from
//!   positional tokens, triggering options as it goes and collecting every
//!   problem instead of stopping at the first.
//! - [`CommandParser`]: runs the option pass for one grammar, matches the
//!   positional arguments, merges the results and either returns a
//!   [`ParsedCommand`], forwards to sub-commands, or fails.
//! - [`CommandDispatcher`]: tries several grammars in priority order and
//!   returns the first that parses.
//!
//! Behaviour on failure and the dispatch depth limit come from
//! [`ParserConfig`].
//!
//! # Example
//!
//! ```
//! use command_grammar_core::{CommandGrammar, OptionSpec, ParseError, Redispatch};
//! use command_grammar_parser::parse;
//!
//! let base = CommandGrammar::builder("you")
//!     .arguments("you <args>...")
//!     .skip_options(true)
//!     .dispatch(Redispatch::new(["args"]).prefix("you"));
//! let display = base
//!     .derive("display")
//!     .arguments("you display <message>")
//!     .option(OptionSpec::flag("loud", "Shout"))
//!     .build()
//!     .unwrap();
//! let grammar = base.subcommand(display).build().unwrap();
//!
//! let parsed = parse(&grammar, &["you", "display", "My Message", "--loud"]).unwrap();
//! assert_eq!(parsed.command, "display");
//! assert_eq!(parsed.get_str("message"), Some("My Message"));
//! assert!(parsed.flag("loud"));
//!
//! assert!(matches!(parse(&grammar, &["you", "-h"]), Err(ParseError::Help(_))));
//! ```
//!
//! [`ParsedCommand`]: command_grammar_core::ParsedCommand

pub mod command_parser;
pub mod config;
pub mod dispatcher;
pub mod option_parser;

pub use command_parser::{CommandParser, CommandScan};
pub use config::{ConfigError, ParserConfig};
pub use dispatcher::CommandDispatcher;
pub use option_parser::{OptionParser, OptionScan};

use command_grammar_core::{CommandGrammar, ParseError, ParsedCommand};

/// Parses `argv` against `grammar` with the default configuration.
pub fn parse<S: AsRef<str>>(
    grammar: &CommandGrammar,
    argv: &[S],
) -> Result<ParsedCommand, ParseError> {
    CommandParser::new(grammar).parse(argv)
}

/// Parses `argv` against several grammars, highest priority first.
pub fn dispatch<'g, S: AsRef<str>>(
    grammars: impl IntoIterator<Item = &'g CommandGrammar>,
    argv: &[S],
    config: ParserConfig,
) -> Result<ParsedCommand, ParseError> {
    CommandDispatcher::new(grammars).with_config(config).parse(argv)
}
