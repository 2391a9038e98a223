//! Command grammars and their builder.
//!
//! A [`CommandGrammar`] is the static shape one parse attempt is checked
//! against: ordered positional arguments, options, attached bundles and the
//! dispatch configuration. Grammars are immutable values built through
//! [`GrammarBuilder`]; child grammars are derived by cloning the parent's
//! option lists, never by sharing them.

use crate::argument::{Argument, parse_arguments};
use crate::bundle::{OptionBundle, help_options, upsert_bundle};
use crate::error::{GrammarError, ParseError};
use crate::option::OptionSpec;
use crate::validate::validate_grammar;
use crate::value::ParamMap;

/// Executable name used in usage lines when none is configured.
pub const DEFAULT_EXE_NAME: &str = "command";

/// Environment variable overriding [`DEFAULT_EXE_NAME`].
pub const EXE_NAME_ENV: &str = "COMMAND_GRAMMAR_EXE_NAME";

/// Default priority of a root grammar; each derived level halves it.
pub const ROOT_PRIORITY: f64 = 1000.0;

/// Global executable name: [`EXE_NAME_ENV`] if set, else [`DEFAULT_EXE_NAME`].
pub fn default_exe_name() -> String {
    std::env::var(EXE_NAME_ENV)
        .ok()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EXE_NAME.to_string())
}

/// Marks a grammar as a pass-through dispatcher.
///
/// The values of `source_keys` are flattened into a new token list,
/// optionally prefixed, and parsed against the candidate commands.
///
/// # Examples
///
/// ```
/// use command_grammar_core::Redispatch;
///
/// let redispatch = Redispatch::new(["args"]).prefix("remote");
/// assert_eq!(redispatch.source_keys(), ["args"]);
/// assert_eq!(redispatch.prefix_tokens(), vec!["remote"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Redispatch {
    source_keys: Vec<String>,
    prefix: Option<String>,
    commands: Option<Vec<CommandGrammar>>,
}

impl Redispatch {
    pub fn new<I, S>(source_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source_keys: source_keys.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Literal tokens (split on whitespace) put before the forwarded values.
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    /// Explicit candidates; without them the grammar's subcommands are used.
    pub fn commands(mut self, commands: Vec<CommandGrammar>) -> Self {
        self.commands = Some(commands);
        self
    }

    pub fn source_keys(&self) -> &[String] {
        &self.source_keys
    }

    pub fn prefix_tokens(&self) -> Vec<&str> {
        self.prefix
            .as_deref()
            .map(|p| p.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn explicit_commands(&self) -> Option<&[CommandGrammar]> {
        self.commands.as_deref()
    }
}

/// Declared shape of one command.
#[derive(Debug, Clone)]
pub struct CommandGrammar {
    name: String,
    description: Option<String>,
    exe_name: String,
    arguments: Vec<Argument>,
    options: Vec<OptionSpec>,
    general_options: Vec<OptionBundle>,
    skip_options: bool,
    redispatch: Option<Redispatch>,
    default_priority: f64,
    priority_boost: f64,
    is_abstract: bool,
    subcommands: Vec<CommandGrammar>,
}

impl CommandGrammar {
    /// Starts a root grammar. The [`help_options`] bundle is attached.
    pub fn builder(name: &str) -> GrammarBuilder {
        GrammarBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn exe_name(&self) -> &str {
        &self.exe_name
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Options declared directly on this grammar.
    pub fn own_options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub fn general_options(&self) -> &[OptionBundle] {
        &self.general_options
    }

    /// Every option in lookup order: own options first, then bundles.
    pub fn all_options(&self) -> Vec<&OptionSpec> {
        let mut out: Vec<&OptionSpec> = self.options.iter().collect();
        for bundle in &self.general_options {
            out.extend(bundle.flatten());
        }
        out
    }

    /// Finds an option by its exact short spelling (`-v`).
    pub fn find_option_by_short(&self, short: &str) -> Option<&OptionSpec> {
        self.all_options()
            .into_iter()
            .find(|o| o.short() == Some(short))
    }

    /// Finds an option by its exact long spelling (`--verbose`).
    pub fn find_option_by_long(&self, long: &str) -> Option<&OptionSpec> {
        self.all_options()
            .into_iter()
            .find(|o| o.long() == Some(long))
    }

    /// Fresh map holding every option default.
    pub fn option_defaults(&self) -> ParamMap {
        let mut out = ParamMap::new();
        for option in self.all_options() {
            option.load_default(&mut out);
        }
        out
    }

    pub fn skip_options(&self) -> bool {
        self.skip_options
    }

    pub fn redispatch(&self) -> Option<&Redispatch> {
        self.redispatch.as_ref()
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn default_priority(&self) -> f64 {
        self.default_priority
    }

    /// Effective priority: inherited default plus the explicit boost.
    pub fn priority(&self) -> f64 {
        self.default_priority + self.priority_boost
    }

    /// Registered subcommands, including abstract ones.
    pub fn subcommands(&self) -> &[CommandGrammar] {
        &self.subcommands
    }

    /// Candidates a redispatch of this grammar tries: the explicit
    /// commands, else the non-abstract subcommands, by descending priority.
    pub fn dispatch_candidates(&self) -> Vec<&CommandGrammar> {
        let mut candidates: Vec<&CommandGrammar> = match self
            .redispatch
            .as_ref()
            .and_then(Redispatch::explicit_commands)
        {
            Some(commands) => commands.iter().collect(),
            None => self.subcommands.iter().filter(|c| !c.is_abstract).collect(),
        };
        sort_by_priority(&mut candidates);
        candidates
    }

    /// Runs the execute hooks of every attached bundle.
    pub fn execute_general_options(&self, params: &ParamMap) -> Result<(), ParseError> {
        for bundle in &self.general_options {
            bundle.execute(params)?;
        }
        Ok(())
    }
}

/// Stable sort by descending priority; equal priorities keep their order.
pub fn sort_by_priority(commands: &mut [&CommandGrammar]) {
    commands.sort_by(|a, b| b.priority().total_cmp(&a.priority()));
}

/// Builder for [`CommandGrammar`].
///
/// Argument patterns are kept as text until [`build`](GrammarBuilder::build),
/// which parses and validates everything at once.
///
/// # Examples
///
/// ```
/// use command_grammar_core::{CommandGrammar, OptionSpec};
///
/// let display = CommandGrammar::builder("display")
///     .arguments("display <message>")
///     .option(OptionSpec::new("echo", "Echo the message"))
///     .description("Display the given message")
///     .build()
///     .unwrap();
///
/// assert_eq!(display.usage(), "command display <message> [Options]");
/// assert!(display.find_option_by_short("-e").is_some());
/// assert!(display.find_option_by_long("--help").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    name: String,
    description: Option<String>,
    exe_name: Option<String>,
    argument_patterns: Vec<String>,
    options: Vec<OptionSpec>,
    general_options: Vec<OptionBundle>,
    skip_options: bool,
    redispatch: Option<Redispatch>,
    default_priority: f64,
    priority_boost: f64,
    is_abstract: bool,
    subcommands: Vec<CommandGrammar>,
}

impl GrammarBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            exe_name: None,
            argument_patterns: Vec::new(),
            options: Vec::new(),
            general_options: vec![help_options()],
            skip_options: false,
            redispatch: None,
            default_priority: ROOT_PRIORITY,
            priority_boost: 0.0,
            is_abstract: false,
            subcommands: Vec::new(),
        }
    }

    /// Starts a child grammar.
    ///
    /// Options, bundles and the executable name are copied; the default
    /// priority is halved. Arguments, description, the abstract and skip
    /// flags, dispatch configuration, boost and subcommands start empty.
    pub fn derive(&self, name: &str) -> GrammarBuilder {
        GrammarBuilder {
            name: name.to_string(),
            description: None,
            exe_name: self.exe_name.clone(),
            argument_patterns: Vec::new(),
            options: self.options.clone(),
            general_options: self.general_options.clone(),
            skip_options: false,
            redispatch: None,
            default_priority: self.default_priority / 2.0,
            priority_boost: 0.0,
            is_abstract: false,
            subcommands: Vec::new(),
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn exe_name(mut self, exe_name: &str) -> Self {
        self.exe_name = Some(exe_name.to_string());
        self
    }

    /// Replaces the positional arguments with a whitespace-separated list
    /// of patterns.
    pub fn arguments(mut self, patterns: &str) -> Self {
        self.argument_patterns = patterns.split_whitespace().map(String::from).collect();
        self
    }

    /// Appends one positional pattern.
    pub fn argument(mut self, pattern: &str) -> Self {
        self.argument_patterns.push(pattern.to_string());
        self
    }

    pub fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Attaches a bundle; a bundle with the same name is replaced.
    pub fn general_options(mut self, bundle: OptionBundle) -> Self {
        upsert_bundle(&mut self.general_options, bundle);
        self
    }

    /// Detaches a bundle by name, e.g. one inherited from the parent.
    pub fn remove_general_options(mut self, name: &str) -> Self {
        self.general_options.retain(|b| b.name() != name);
        self
    }

    /// Collects unknown options instead of rejecting them.
    pub fn skip_options(mut self, skip: bool) -> Self {
        self.skip_options = skip;
        self
    }

    pub fn dispatch(mut self, redispatch: Redispatch) -> Self {
        self.redispatch = Some(redispatch);
        self
    }

    /// Adds `boost` to the inherited default priority.
    pub fn prioritize(mut self, boost: f64) -> Self {
        self.priority_boost = boost;
        self
    }

    /// Abstract grammars are not dispatch candidates of their parent.
    pub fn abstract_grammar(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn subcommand(mut self, child: CommandGrammar) -> Self {
        self.subcommands.push(child);
        self
    }

    /// Parses argument patterns and validates the grammar.
    ///
    /// # Errors
    ///
    /// Returns the first [`GrammarError`] found.
    pub fn build(self) -> Result<CommandGrammar, GrammarError> {
        let arguments = parse_arguments(&self.argument_patterns.join(" "))?;
        let grammar = CommandGrammar {
            name: self.name,
            description: self.description,
            exe_name: self.exe_name.unwrap_or_else(default_exe_name),
            arguments,
            options: self.options,
            general_options: self.general_options,
            skip_options: self.skip_options,
            redispatch: self.redispatch,
            default_priority: self.default_priority,
            priority_boost: self.priority_boost,
            is_abstract: self.is_abstract,
            subcommands: self.subcommands,
        };

        match validate_grammar(&grammar).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(grammar),
        }
    }
}
