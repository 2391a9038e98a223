//! Per-command parse orchestration.

use command_grammar_core::{
    CommandGrammar, ParamMap, ParseContext, ParseError, ParsedCommand, Redispatch,
    SKIPPED_OPTIONS_KEY, Value, most_severe,
};
use tracing::debug;

use crate::config::ParserConfig;
use crate::dispatcher::CommandDispatcher;
use crate::option_parser::OptionParser;

/// Merged parameters and collected errors of one parse pass, before any
/// decision about success is made.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandScan {
    pub params: ParamMap,
    pub errors: Vec<ParseError>,
}

/// Parses a token list against a single grammar.
///
/// A pass seeds option defaults, runs the [`OptionParser`], matches the
/// positional tokens against the declared arguments and merges the results
/// (argument values win over option values). Redispatching grammars then
/// forward their values to a [`CommandDispatcher`]; other grammars return a
/// [`ParsedCommand`] or fail.
///
/// # Examples
///
/// ```
/// use command_grammar_core::{CommandGrammar, OptionSpec};
/// use command_grammar_parser::CommandParser;
///
/// let grammar = CommandGrammar::builder("display")
///     .arguments("display <message>")
///     .option(OptionSpec::new("echo", "Echo the message"))
///     .build()
///     .unwrap();
///
/// let parsed = CommandParser::new(&grammar)
///     .parse(&["display", "Some", "-e", "Even More"])
///     .unwrap();
/// assert_eq!(parsed.get_str("message"), Some("Some"));
/// assert_eq!(parsed.get_str("echo"), Some("Even More"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CommandParser<'g> {
    grammar: &'g CommandGrammar,
    config: ParserConfig,
    depth: usize,
}

impl<'g> CommandParser<'g> {
    pub fn new(grammar: &'g CommandGrammar) -> Self {
        Self {
            grammar,
            config: ParserConfig::default(),
            depth: 0,
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Report failures as help text (`true`) or as the most severe error.
    pub fn fallback_help(mut self, enabled: bool) -> Self {
        self.config.fallback_help = enabled;
        self
    }

    pub(crate) fn at_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn grammar(&self) -> &'g CommandGrammar {
        self.grammar
    }

    /// Parses `argv` to a command result.
    ///
    /// # Errors
    ///
    /// With `fallback_help` enabled every failure is a [`ParseError::Help`]
    /// carrying this grammar's help; otherwise the most severe collected
    /// error is returned. [`ParseError::DispatchDepthExceeded`] is returned
    /// as is.
    pub fn parse<S: AsRef<str>>(&self, argv: &[S]) -> Result<ParsedCommand, ParseError> {
        if self.depth > self.config.max_dispatch_depth {
            return Err(ParseError::DispatchDepthExceeded(self.config.max_dispatch_depth));
        }

        let scan = self.scan(argv);
        if let Some(redispatch) = self.grammar.redispatch() {
            if can_redispatch(&scan.errors) {
                return self.redispatch(redispatch, &scan.params);
            }
            debug!(command = self.grammar.name(), errors = ?scan.errors, "redispatch skipped");
        }
        self.finish(scan)
    }

    /// Runs one pass without deciding the outcome.
    pub fn scan<S: AsRef<str>>(&self, argv: &[S]) -> CommandScan {
        let tokens: Vec<String> = argv.iter().map(|t| t.as_ref().to_string()).collect();
        let ctx = ParseContext::new(self.grammar, self.depth);
        let options = OptionParser::new(ctx, &tokens, self.grammar.option_defaults()).parse();

        let mut errors = options.errors;
        let (arguments, argument_error) = self.parse_arguments(&options.arguments);
        errors.extend(argument_error);

        let mut params = options.options;
        params.extend(arguments);
        if self.grammar.skip_options() {
            let skipped = options.skipped_options.into_iter().map(Value::String).collect();
            params.insert(SKIPPED_OPTIONS_KEY.to_string(), Value::List(skipped));
        }

        CommandScan { params, errors }
    }

    /// Matches positional tokens front to back, stopping at the first
    /// failing argument. Leftover tokens are an error.
    fn parse_arguments(&self, tokens: &[String]) -> (ParamMap, Option<ParseError>) {
        let mut out = ParamMap::new();
        let mut rest = tokens;

        for argument in self.grammar.arguments() {
            match argument.consume(rest) {
                Ok((value, left)) => {
                    if let Some(value) = value {
                        out.insert(argument.name.clone(), value);
                    }
                    rest = left;
                }
                Err(err) => return (out, Some(err)),
            }
        }

        if rest.is_empty() {
            (out, None)
        } else {
            (out, Some(ParseError::TooManyArguments(rest.to_vec())))
        }
    }

    /// Forwards the configured values to the candidate commands.
    ///
    /// Help from below is re-raised as this grammar's help, and so is any
    /// other failure when `fallback_help` is set.
    fn redispatch(
        &self,
        redispatch: &Redispatch,
        params: &ParamMap,
    ) -> Result<ParsedCommand, ParseError> {
        let tokens = redispatch_arguments(self.grammar, redispatch, params);
        debug!(
            command = self.grammar.name(),
            tokens = ?tokens,
            depth = self.depth,
            "redispatching"
        );

        let dispatcher = CommandDispatcher::new(self.grammar.dispatch_candidates())
            .with_config(self.config)
            .at_depth(self.depth + 1);
        match dispatcher.parse(&tokens) {
            Ok(parsed) => Ok(parsed),
            Err(err @ ParseError::DispatchDepthExceeded(_)) => Err(err),
            Err(err) if err.is_help() || self.config.fallback_help => {
                debug!(command = self.grammar.name(), reason = %err, "dispatch failed, showing help");
                Err(ParseError::Help(self.grammar.help()))
            }
            Err(err) => Err(err),
        }
    }

    fn finish(&self, scan: CommandScan) -> Result<ParsedCommand, ParseError> {
        if scan.errors.is_empty() {
            self.grammar.execute_general_options(&scan.params)?;
            return Ok(ParsedCommand::new(self.grammar.name(), scan.params));
        }

        if self.config.fallback_help {
            return Err(ParseError::Help(self.grammar.help()));
        }
        match most_severe(scan.errors) {
            Some(err) => Err(err),
            None => Err(ParseError::Help(self.grammar.help())),
        }
    }
}

/// A redispatch only runs when the pass did not rule the grammar out and
/// nothing but absent positionals went wrong.
fn can_redispatch(errors: &[ParseError]) -> bool {
    errors
        .iter()
        .all(|err| matches!(err, ParseError::MissingArgument(_)))
}

/// Token list handed to the dispatcher: prefix words, the flattened source
/// values, then skipped options when the grammar collects them.
fn redispatch_arguments(
    grammar: &CommandGrammar,
    redispatch: &Redispatch,
    params: &ParamMap,
) -> Vec<String> {
    let mut tokens: Vec<String> = redispatch
        .prefix_tokens()
        .into_iter()
        .map(String::from)
        .collect();
    for key in redispatch.source_keys() {
        if let Some(value) = params.get(key) {
            tokens.extend(value.to_tokens());
        }
    }
    if grammar.skip_options() {
        if let Some(skipped) = params.get(SKIPPED_OPTIONS_KEY) {
            tokens.extend(skipped.to_tokens());
        }
    }
    tokens
}
