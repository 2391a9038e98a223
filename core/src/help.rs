//! Usage and help text rendering.

use crate::grammar::CommandGrammar;
use crate::option::OptionSpec;

const SUMMARY_INDENT: &str = "    ";
const SUMMARY_WIDTH: usize = 32;

impl CommandGrammar {
    /// One-line usage: executable, argument patterns and `[Options]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_grammar_core::CommandGrammar;
    ///
    /// let grammar = CommandGrammar::builder("remote")
    ///     .exe_name("git")
    ///     .arguments("remote <command> <args>...")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(grammar.usage(), "git remote <command> <args>... [Options]");
    /// assert_eq!(grammar.banner(), "Usage: git remote <command> <args>... [Options]");
    /// ```
    pub fn usage(&self) -> String {
        let arguments = self
            .arguments()
            .iter()
            .map(|a| a.original.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        [self.exe_name(), arguments.as_str(), "[Options]"]
            .iter()
            .filter(|part| !part.trim().is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn banner(&self) -> String {
        format!("Usage: {}", self.usage())
    }

    /// Full help: banner, option table, dispatch examples and description.
    pub fn help(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.banner());
        out.push_str("\n\nOptions:\n");
        for option in self.all_options() {
            out.push_str(&option_summary(option));
            out.push('\n');
        }

        if self.redispatch().is_some() {
            out.push_str("Examples: \n");
            for candidate in self.dispatch_candidates() {
                out.push_str(&format!("\t{}\n", candidate.usage()));
            }
        }

        if let Some(description) = self.description().filter(|d| !d.trim().is_empty()) {
            out.push_str("\nDescription:\n");
            out.push_str(description);
            out.push('\n');
        }
        out.push('\n');
        out
    }
}

/// Renders one option line, e.g.
/// `    -e, --echo ECHO                  Echo the message`.
fn option_summary(option: &OptionSpec) -> String {
    let spelling = match (option.short(), option.long_argument()) {
        (Some(short), Some(long)) => format!("{short}, {long}"),
        (None, Some(long)) => format!("    {long}"),
        (Some(short), None) => match option.argument() {
            Some(arg) if option.is_argument_optional() => format!("{short} [{arg}]"),
            Some(arg) => format!("{short} {arg}"),
            None => short.to_string(),
        },
        (None, None) => option.name().to_string(),
    };

    if spelling.len() > SUMMARY_WIDTH {
        return format!(
            "{SUMMARY_INDENT}{spelling}\n{SUMMARY_INDENT}{:SUMMARY_WIDTH$} {}",
            "",
            option.description()
        );
    }
    format!(
        "{SUMMARY_INDENT}{spelling:<SUMMARY_WIDTH$} {}",
        option.description()
    )
}
