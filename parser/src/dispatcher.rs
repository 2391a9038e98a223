//! Multi-grammar resolution.

use command_grammar_core::{CommandGrammar, ParseError, ParsedCommand, sort_by_priority};
use tracing::debug;

use crate::command_parser::CommandParser;
use crate::config::ParserConfig;

/// Tries candidate grammars in priority order until one parses.
///
/// Candidates are sorted by descending effective priority; equal
/// priorities keep their declaration order. Each attempt runs without help
/// fallback so that a [`ParseError::FixedArgument`] can rule a candidate out.
/// Any other error ends the search: it is returned as is, or as the usage
/// listing when the configuration asks for help fallback.
///
/// # Examples
///
/// ```
/// use command_grammar_core::{CommandGrammar, ParseError};
/// use command_grammar_parser::CommandDispatcher;
///
/// let display = CommandGrammar::builder("display").arguments("display <message>").build().unwrap();
/// let print = CommandGrammar::builder("print").arguments("print <message>").build().unwrap();
///
/// let dispatcher = CommandDispatcher::new([&display, &print]);
/// let parsed = dispatcher.parse(&["print", "hello"]).unwrap();
/// assert_eq!(parsed.command, "print");
///
/// let err = dispatcher.parse(&["remove", "x"]).unwrap_err();
/// assert_eq!(
///     err,
///     ParseError::Help(
///         "Usage:\n\tcommand display <message> [Options]\n\tcommand print <message> [Options]\n".into()
///     )
/// );
/// ```
#[derive(Debug, Clone)]
pub struct CommandDispatcher<'g> {
    commands: Vec<&'g CommandGrammar>,
    config: ParserConfig,
    depth: usize,
}

impl<'g> CommandDispatcher<'g> {
    pub fn new(commands: impl IntoIterator<Item = &'g CommandGrammar>) -> Self {
        let mut commands: Vec<&'g CommandGrammar> = commands.into_iter().collect();
        sort_by_priority(&mut commands);
        Self {
            commands,
            config: ParserConfig::default(),
            depth: 0,
        }
    }

    /// Uses `config` for the dispatch depth limit and for what a failing
    /// candidate reports. Candidates themselves always run without help
    /// fallback.
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub(crate) fn at_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Candidates in the order they are tried.
    pub fn commands(&self) -> &[&'g CommandGrammar] {
        &self.commands
    }

    /// Returns the first successful parse.
    ///
    /// # Errors
    ///
    /// The first error that does not rule its candidate out (replaced by
    /// the usage listing under help fallback), or a [`ParseError::Help`]
    /// listing every candidate's usage when all of them were ruled out.
    pub fn parse<S: AsRef<str>>(&self, argv: &[S]) -> Result<ParsedCommand, ParseError> {
        if self.depth > self.config.max_dispatch_depth {
            return Err(ParseError::DispatchDepthExceeded(self.config.max_dispatch_depth));
        }

        let config = self.config.fallback_help(false);
        for command in &self.commands {
            debug!(
                command = command.name(),
                priority = command.priority(),
                depth = self.depth,
                "trying dispatch candidate"
            );
            let parser = CommandParser::new(*command)
                .with_config(config)
                .at_depth(self.depth);
            match parser.parse(argv) {
                Ok(parsed) => return Ok(parsed),
                Err(err) if err.rules_out_command() => {
                    debug!(command = command.name(), reason = %err, "candidate ruled out");
                }
                Err(err) => return Err(self.fallback(err)),
            }
        }

        Err(ParseError::Help(self.help_message()))
    }

    /// Replaces a candidate's failure with the usage listing when the
    /// caller asked for help fallback. Help text and depth errors pass.
    fn fallback(&self, err: ParseError) -> ParseError {
        match err {
            ParseError::Help(_) | ParseError::DispatchDepthExceeded(_) => err,
            _ if self.config.fallback_help => ParseError::Help(self.help_message()),
            _ => err,
        }
    }

    /// `Usage:` followed by one tab-indented usage line per candidate.
    pub fn help_message(&self) -> String {
        let mut message = String::from("Usage:\n");
        for command in &self.commands {
            message.push_str(&format!("\t{}\n", command.usage()));
        }
        message
    }
}
