//! Grammar definitions loaded from YAML or JSON.
//!
//! A definition file holds either one grammar or a list of grammars. Child
//! grammars listed under `subcommands` are derived from their parent, so
//! they inherit its options and bundles.
//!
//! # Example YAML
//!
//! ```yaml
//! name: you
//! arguments: "you <args>..."
//! description: YOU print the given message
//! dispatch:
//!   args: [args]
//!   prefix: you
//! subcommands:
//!   - name: display
//!     arguments: "you display <message>"
//!     options:
//!       - name: echo
//!         description: Echo the message
//!       - name: loud
//!         usage: "-l --loud Shout it"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bundle::{HELP_BUNDLE, OptionBundle};
use crate::error::GrammarError;
use crate::grammar::{CommandGrammar, GrammarBuilder, Redispatch};
use crate::option::{OptionSpec, ValueType};
use crate::value::Value;

/// Errors raised while loading definition files.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON syntax or shape error.
    #[error("JSON definition error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML syntax or shape error.
    #[error("YAML definition error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The definition describes an invalid grammar.
    #[error("invalid grammar: {0}")]
    Grammar(#[from] GrammarError),
}

/// Kind of a declared option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    #[default]
    Value,
    Flag,
    List,
    ListFlag,
}

/// A spelling given as a string, or `false` to disable it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpellingDef {
    Enabled(bool),
    Name(String),
}

/// Option declared through a usage line (`-e --eko=message Echo`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsageOptionDef {
    pub name: String,
    pub usage: String,
}

/// Option declared field by field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldOptionDef {
    pub name: String,
    pub description: String,
    pub kind: OptionKind,
    pub short: Option<SpellingDef>,
    pub long: Option<SpellingDef>,
    pub argument: Option<String>,
    pub argument_optional: bool,
    #[serde(rename = "type")]
    pub value_type: Option<ValueType>,
    pub default: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionDef {
    Usage(UsageOptionDef),
    Fields(FieldOptionDef),
}

impl OptionDef {
    pub fn to_spec(&self) -> Result<OptionSpec, GrammarError> {
        let def = match self {
            OptionDef::Usage(def) => return OptionSpec::from_usage(&def.name, &def.usage),
            OptionDef::Fields(def) => def,
        };

        let mut spec = match def.kind {
            OptionKind::Value => OptionSpec::new(&def.name, &def.description),
            OptionKind::Flag => OptionSpec::flag(&def.name, &def.description),
            OptionKind::List => OptionSpec::list(&def.name, &def.description),
            OptionKind::ListFlag => OptionSpec::list_flag(&def.name, &def.description),
        };
        spec = match &def.short {
            Some(SpellingDef::Enabled(false)) => spec.no_short(),
            Some(SpellingDef::Name(short)) => spec.short_name(short),
            _ => spec,
        };
        spec = match &def.long {
            Some(SpellingDef::Enabled(false)) => spec.no_long(),
            Some(SpellingDef::Name(long)) => spec.long_name(long),
            _ => spec,
        };
        if let (Some(label), false) = (&def.argument, spec.is_flag()) {
            spec = spec.argument_label(label);
        }
        if def.argument_optional {
            spec = spec.argument_optional();
        }
        if let Some(value_type) = def.value_type {
            spec = spec.value_type(value_type);
        }
        if let Some(default) = &def.default {
            spec = spec.default_value(default.clone());
        }
        Ok(spec)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundleDef {
    pub name: String,
    pub options: Vec<OptionDef>,
    pub bundles: Vec<BundleDef>,
}

impl BundleDef {
    pub fn to_bundle(&self) -> Result<OptionBundle, GrammarError> {
        let mut bundle = OptionBundle::new(&self.name);
        for option in &self.options {
            bundle = bundle.option(option.to_spec()?);
        }
        for nested in &self.bundles {
            bundle = bundle.bundle(nested.to_bundle()?);
        }
        Ok(bundle)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchDef {
    pub args: Vec<String>,
    pub prefix: Option<String>,
}

/// Serializable description of a grammar tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrammarDef {
    pub name: String,
    pub description: Option<String>,
    pub exe_name: Option<String>,
    pub arguments: String,
    pub options: Vec<OptionDef>,
    pub bundles: Vec<BundleDef>,
    /// Attach the `-h, --help` bundle (root grammars only; children inherit).
    pub help: bool,
    pub skip_options: bool,
    pub priority: f64,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    pub dispatch: Option<DispatchDef>,
    pub subcommands: Vec<GrammarDef>,
}

impl Default for GrammarDef {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            exe_name: None,
            arguments: String::new(),
            options: Vec::new(),
            bundles: Vec::new(),
            help: true,
            skip_options: false,
            priority: 0.0,
            is_abstract: false,
            dispatch: None,
            subcommands: Vec::new(),
        }
    }
}

impl GrammarDef {
    /// Builds the grammar and its subcommands.
    pub fn build(&self) -> Result<CommandGrammar, GrammarError> {
        self.build_from(None)
    }

    fn build_from(&self, parent: Option<&GrammarBuilder>) -> Result<CommandGrammar, GrammarError> {
        let mut builder = match parent {
            Some(parent) => parent.derive(&self.name),
            None if self.help => GrammarBuilder::new(&self.name),
            None => GrammarBuilder::new(&self.name).remove_general_options(HELP_BUNDLE),
        };

        if let Some(description) = &self.description {
            builder = builder.description(description);
        }
        if let Some(exe_name) = &self.exe_name {
            builder = builder.exe_name(exe_name);
        }
        builder = builder
            .arguments(&self.arguments)
            .skip_options(self.skip_options)
            .prioritize(self.priority)
            .abstract_grammar(self.is_abstract);
        for option in &self.options {
            builder = builder.option(option.to_spec()?);
        }
        for bundle in &self.bundles {
            builder = builder.general_options(bundle.to_bundle()?);
        }
        if let Some(dispatch) = &self.dispatch {
            let mut redispatch = Redispatch::new(dispatch.args.iter().cloned());
            if let Some(prefix) = &dispatch.prefix {
                redispatch = redispatch.prefix(prefix);
            }
            builder = builder.dispatch(redispatch);
        }

        let mut children = Vec::with_capacity(self.subcommands.len());
        for child in &self.subcommands {
            children.push(child.build_from(Some(&builder))?);
        }
        for child in children {
            builder = builder.subcommand(child);
        }
        builder.build()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DefinitionFile {
    Many(Vec<GrammarDef>),
    One(Box<GrammarDef>),
}

/// Parses definition text: JSON when it starts with `{` or `[`, YAML otherwise.
pub fn parse_definitions(text: &str) -> Result<Vec<GrammarDef>, DefinitionError> {
    let trimmed = text.trim_start();
    let file: DefinitionFile = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(trimmed)?
    } else {
        serde_yaml::from_str(text)?
    };
    Ok(match file {
        DefinitionFile::Many(defs) => defs,
        DefinitionFile::One(def) => vec![*def],
    })
}

/// Reads a definition file and builds every grammar in it.
pub fn load_grammars(path: impl AsRef<Path>) -> Result<Vec<CommandGrammar>, DefinitionError> {
    let text = std::fs::read_to_string(path)?;
    let grammars = parse_definitions(&text)?
        .iter()
        .map(GrammarDef::build)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(grammars)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str = r#"
name: you
arguments: "you <args>..."
dispatch:
  args: [args]
  prefix: you
options:
  - name: verbose
    kind: flag
subcommands:
  - name: display
    arguments: "you display <message>"
    options:
      - name: echo
        usage: "-e --eko=message Echo the message"
  - name: print
    arguments: "you print <message>"
    priority: 1
"#;

    #[test]
    fn test_builds_nested_definition() {
        let defs = parse_definitions(NESTED).unwrap();
        assert_eq!(defs.len(), 1);
        let grammar = defs[0].build().unwrap();

        let names: Vec<&str> = grammar.dispatch_candidates().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["print", "display"]);

        let display = &grammar.subcommands()[0];
        assert!(display.find_option_by_long("--verbose").is_some());
        assert!(display.find_option_by_long("--eko").is_some());
        assert!(display.find_option_by_long("--help").is_some());
        assert_eq!(display.priority(), 500.0);
    }

    #[test]
    fn test_parses_json_list() {
        let json = r#"[
            {"name": "display", "arguments": "display <message>", "help": false},
            {"name": "print", "arguments": "print <message>",
             "options": [{"name": "times", "type": "integer", "short": false, "default": 1}]}
        ]"#;
        let defs = parse_definitions(json).unwrap();
        assert_eq!(defs.len(), 2);

        let display = defs[0].build().unwrap();
        assert!(display.find_option_by_long("--help").is_none());

        let print = defs[1].build().unwrap();
        let times = print.find_option_by_long("--times").unwrap();
        assert_eq!(times.short(), None);
        assert_eq!(print.option_defaults().get("times"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(matches!(
            parse_definitions("name: x\nargumnets: oops\n"),
            Err(DefinitionError::Yaml(_))
        ));
        assert!(matches!(
            parse_definitions(r#"{"name": "x", "argumnets": "oops"}"#),
            Err(DefinitionError::Json(_))
        ));
    }

    #[test]
    fn test_invalid_grammar_surfaces_error() {
        let defs = parse_definitions("name: bad\narguments: \"[<x>\"\n").unwrap();
        assert!(matches!(
            defs[0].build(),
            Err(GrammarError::InvalidArgumentPattern { .. })
        ));
    }
}
