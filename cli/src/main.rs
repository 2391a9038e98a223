use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use command_grammar_core::{CommandGrammar, ParseError, ParsedCommand, load_grammars};
use command_grammar_parser::{CommandParser, ParserConfig, dispatch};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Exit status when the parse produced help text instead of a result.
const HELP_EXIT_CODE: u8 = 2;

/// Serialization used for the parsed command.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "grammar-parse", version)]
#[command(about = "Parse command-line tokens against a grammar definition file")]
struct Cli {
    /// Grammar definition file (YAML or JSON). A list of grammars is dispatched.
    #[arg(long)]
    grammar: PathBuf,
    /// Parser configuration file (YAML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output format for the parsed command.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
    /// Report the most severe error instead of falling back to help text.
    #[arg(long)]
    no_fallback_help: bool,
    /// Log parser decisions to stderr.
    #[arg(long, short)]
    verbose: bool,
    /// Tokens to parse, given after `--`.
    #[arg(last = true)]
    tokens: Vec<String>,
}

/// Why a run did not print a parsed command.
#[derive(Debug)]
enum Failure {
    /// Help text requested or used as fallback.
    Help(String),
    /// Anything else, reported as `error: ..`.
    Error(String),
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Failure::Error(message)
    }
}

impl From<ParseError> for Failure {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Help(text) => Failure::Help(text),
            other => Failure::Error(other.to_string()),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure::Help(text)) => {
            print!("{text}");
            ExitCode::from(HELP_EXIT_CODE)
        }
        Err(Failure::Error(message)) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run(cli: Cli) -> Result<(), Failure> {
    let config = load_config(cli.config.as_deref(), cli.no_fallback_help)?;
    let grammars = load_grammars(&cli.grammar)
        .map_err(|err| format!("Failed to load '{}': {err}", cli.grammar.display()))?;
    info!(
        grammars = grammars.len(),
        tokens = cli.tokens.len(),
        "loaded grammar definitions"
    );

    let parsed = parse_tokens(&grammars, &cli.tokens, config, &cli.grammar)?;
    print_parsed(&parsed, cli.format)?;
    Ok(())
}

fn load_config(path: Option<&Path>, no_fallback_help: bool) -> Result<ParserConfig, String> {
    let config = match path {
        Some(path) => ParserConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => ParserConfig::default(),
    };
    let mut config = config
        .with_env_overrides()
        .map_err(|err| format!("Invalid environment configuration: {err}"))?;
    if no_fallback_help {
        config.fallback_help = false;
    }
    debug!(?config, "parser configuration");
    Ok(config)
}

fn parse_tokens(
    grammars: &[CommandGrammar],
    tokens: &[String],
    config: ParserConfig,
    source: &Path,
) -> Result<ParsedCommand, Failure> {
    let parsed = match grammars {
        [] => {
            return Err(Failure::Error(format!(
                "No grammar defined in '{}'",
                source.display()
            )));
        }
        [grammar] => CommandParser::new(grammar).with_config(config).parse(tokens)?,
        many => dispatch(many, tokens, config)?,
    };
    Ok(parsed)
}

fn print_parsed(parsed: &ParsedCommand, format: OutputFormat) -> Result<(), String> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(parsed)
                .map_err(|e| format!("Failed to serialize output: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(parsed)
                .map_err(|e| format!("Failed to serialize output: {e}"))?;
            print!("{yaml}");
        }
    }
    Ok(())
}
