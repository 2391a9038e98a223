//! Grammar validation.
//!
//! Structural checks run once when a grammar is built. A grammar that
//! fails them is never handed to the parser.
//!
//! # Examples
//!
//! ```
//! use command_grammar_core::*;
//!
//! let ok = CommandGrammar::builder("copy").arguments("copy <from> <to>").build();
//! assert!(ok.is_ok());
//!
//! let bad = CommandGrammar::builder("copy").arguments("copy <files>... <to>").build();
//! assert_eq!(bad.unwrap_err(), GrammarError::MultipleNotLast("files".into()));
//! ```

use std::collections::HashSet;

use crate::error::GrammarError;
use crate::grammar::CommandGrammar;
use crate::option::OptionSpec;
use crate::value::SKIPPED_OPTIONS_KEY;

/// Validates a built grammar, returning every problem found.
pub fn validate_grammar(grammar: &CommandGrammar) -> Vec<GrammarError> {
    let mut errors = Vec::new();

    if grammar.name().trim().is_empty() {
        errors.push(GrammarError::EmptyCommandName);
        return errors;
    }

    errors.extend(validate_arguments(grammar));
    errors.extend(validate_options(grammar.own_options()));
    for bundle in grammar.general_options() {
        errors.extend(validate_options(bundle.flatten()));
    }

    let option_names: HashSet<&str> = grammar.all_options().iter().map(|o| o.name()).collect();
    // Fixed keywords only ever store their own name.
    for argument in grammar.arguments().iter().filter(|a| a.variable) {
        if option_names.contains(argument.name.as_str()) {
            errors.push(GrammarError::ArgumentShadowsOption(argument.name.clone()));
        }
    }

    if grammar.skip_options() {
        let reserved = grammar
            .arguments()
            .iter()
            .any(|a| a.name == SKIPPED_OPTIONS_KEY)
            || option_names.contains(SKIPPED_OPTIONS_KEY);
        if reserved {
            errors.push(GrammarError::ReservedKey(SKIPPED_OPTIONS_KEY.to_string()));
        }
    }

    if let Some(redispatch) = grammar.redispatch() {
        for key in redispatch.source_keys() {
            let known = grammar.arguments().iter().any(|a| &a.name == key)
                || option_names.contains(key.as_str());
            if !known {
                errors.push(GrammarError::UnknownDispatchKey(key.clone()));
            }
        }
        if grammar.dispatch_candidates().is_empty() {
            errors.push(GrammarError::EmptyDispatch(grammar.name().to_string()));
        }
    }

    errors
}

fn validate_arguments(grammar: &CommandGrammar) -> Vec<GrammarError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let arguments = grammar.arguments();

    for (index, argument) in arguments.iter().enumerate() {
        if !seen.insert(argument.name.as_str()) {
            errors.push(GrammarError::DuplicateArgument(argument.name.clone()));
        }
        if argument.multiple && index + 1 < arguments.len() {
            errors.push(GrammarError::MultipleNotLast(argument.name.clone()));
        }
    }

    errors
}

fn validate_options<'a>(options: impl IntoIterator<Item = &'a OptionSpec>) -> Vec<GrammarError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for option in options {
        if option.short().is_none() && option.long().is_none() {
            errors.push(GrammarError::MissingOptionName(option.name().to_string()));
            continue;
        }

        if let Some(short) = option.short() {
            let mut chars = short.chars();
            let valid = chars.next() == Some('-')
                && chars.next().is_some_and(|c| c != '-')
                && chars.next().is_none();
            if !valid {
                errors.push(GrammarError::InvalidShortOption(short.to_string()));
            } else if !seen.insert(short) {
                errors.push(GrammarError::DuplicateOption(short.to_string()));
            }
        }

        if let Some(long) = option.long() {
            if !long.starts_with("--") || long.len() < 3 || long.contains('=') {
                errors.push(GrammarError::InvalidLongOption(long.to_string()));
            } else if !seen.insert(long) {
                errors.push(GrammarError::DuplicateOption(long.to_string()));
            }
        }
    }

    errors
}
