//! Reusable option bundles ("general options").
//!
//! A bundle groups options that several commands share, such as the
//! built-in help option. Bundles nest; a grammar sees them flattened
//! depth-first with each bundle's own options before its nested bundles.

use std::fmt;
use std::sync::Arc;

use crate::error::ParseError;
use crate::option::OptionSpec;
use crate::value::{ParamMap, Value};

/// Name of the bundle returned by [`help_options`].
pub const HELP_BUNDLE: &str = "help";

/// Hook run with the final parameters once a command parsed successfully.
pub type ExecuteFn = Arc<dyn Fn(&ParamMap) -> Result<(), ParseError> + Send + Sync>;

/// Named, reusable set of options.
///
/// # Examples
///
/// ```
/// use command_grammar_core::{OptionBundle, OptionSpec};
///
/// let source = OptionBundle::new("source").option(OptionSpec::new("source", "Set the source"));
/// let common = OptionBundle::new("common")
///     .option(OptionSpec::flag("verbose", "Verbose"))
///     .bundle(source);
///
/// let names: Vec<&str> = common.flatten().iter().map(|o| o.name()).collect();
/// assert_eq!(names, vec!["verbose", "source"]);
/// ```
#[derive(Clone)]
pub struct OptionBundle {
    name: String,
    options: Vec<OptionSpec>,
    bundles: Vec<OptionBundle>,
    execute: Option<ExecuteFn>,
}

impl OptionBundle {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            options: Vec::new(),
            bundles: Vec::new(),
            execute: None,
        }
    }

    pub fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Nests another bundle; a bundle with the same name is replaced.
    pub fn bundle(mut self, bundle: OptionBundle) -> Self {
        upsert_bundle(&mut self.bundles, bundle);
        self
    }

    /// Registers a hook run after a successful parse.
    pub fn on_execute<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ParamMap) -> Result<(), ParseError> + Send + Sync + 'static,
    {
        self.execute = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub fn bundles(&self) -> &[OptionBundle] {
        &self.bundles
    }

    /// All options reachable through this bundle, in lookup order.
    pub fn flatten(&self) -> Vec<&OptionSpec> {
        let mut out: Vec<&OptionSpec> = self.options.iter().collect();
        for nested in &self.bundles {
            out.extend(nested.flatten());
        }
        out
    }

    /// Runs this bundle's hook, then the hooks of nested bundles.
    pub fn execute(&self, params: &ParamMap) -> Result<(), ParseError> {
        if let Some(hook) = &self.execute {
            hook(params)?;
        }
        for nested in &self.bundles {
            nested.execute(params)?;
        }
        Ok(())
    }
}

impl fmt::Debug for OptionBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionBundle")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("bundles", &self.bundles)
            .field("execute", &self.execute.is_some())
            .finish()
    }
}

/// Inserts `bundle`, replacing any bundle that has the same name in place.
pub(crate) fn upsert_bundle(bundles: &mut Vec<OptionBundle>, bundle: OptionBundle) {
    match bundles.iter_mut().find(|b| b.name == bundle.name) {
        Some(existing) => *existing = bundle,
        None => bundles.push(bundle),
    }
}

/// The `-h, --help` bundle attached to every grammar by default.
///
/// Triggering it records `help: true` and reports a [`ParseError::Help`]
/// carrying the help text of the grammar being parsed.
pub fn help_options() -> OptionBundle {
    let help = OptionSpec::flag("help", "Show the help.").on_trigger(|ctx, out, _| {
        out.insert("help".to_string(), Value::Bool(true));
        Err(ParseError::Help(ctx.grammar().help()))
    });
    OptionBundle::new(HELP_BUNDLE).option(help)
}
