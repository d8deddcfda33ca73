//! Aggregate and scalar function templates.

use std::sync::LazyLock;

use compact_str::{CompactString, ToCompactString};
use hashbrown::HashMap;

use crate::error::{JoinError, Result};
use crate::metadata::check_identifier;

/// Argument marker inside a function template.
pub const ARG: &str = "%s";

/// A SQL function kind usable in a projection.
///
/// Kinds that return a template from [`SqlFunction::template`] need no
/// registration; others are looked up by name in a [`FunctionRegistry`].
pub trait SqlFunction {
    fn name(&self) -> &str;

    fn template(&self) -> Option<&str> {
        None
    }
}

/// Built-in functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultFunc {
    Sum,
    Count,
    Max,
    Min,
    Avg,
    Len,
}

impl DefaultFunc {
    pub const ALL: [DefaultFunc; 6] = [
        DefaultFunc::Sum,
        DefaultFunc::Count,
        DefaultFunc::Max,
        DefaultFunc::Min,
        DefaultFunc::Avg,
        DefaultFunc::Len,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            DefaultFunc::Sum => "SUM",
            DefaultFunc::Count => "COUNT",
            DefaultFunc::Max => "MAX",
            DefaultFunc::Min => "MIN",
            DefaultFunc::Avg => "AVG",
            DefaultFunc::Len => "LEN",
        }
    }

    pub const fn sql_template(&self) -> &'static str {
        match self {
            DefaultFunc::Sum => "SUM(%s)",
            DefaultFunc::Count => "COUNT(%s)",
            DefaultFunc::Max => "MAX(%s)",
            DefaultFunc::Min => "MIN(%s)",
            DefaultFunc::Avg => "AVG(%s)",
            DefaultFunc::Len => "LEN(%s)",
        }
    }
}

impl SqlFunction for DefaultFunc {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn template(&self) -> Option<&str> {
        Some(self.sql_template())
    }
}

/// A function known only by name; its template must be registered.
impl SqlFunction for &str {
    fn name(&self) -> &str {
        self
    }
}

/// Function templates keyed by upper-cased name.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    templates: HashMap<CompactString, CompactString>,
}

static GLOBAL_FUNCTIONS: LazyLock<FunctionRegistry> = LazyLock::new(FunctionRegistry::with_defaults);

impl FunctionRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every [`DefaultFunc`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for func in DefaultFunc::ALL {
            registry
                .templates
                .insert(func.as_str().into(), func.sql_template().into());
        }
        registry
    }

    /// The process-wide registry of built-in functions.
    pub fn global() -> &'static FunctionRegistry {
        &GLOBAL_FUNCTIONS
    }

    /// Registers `template` under `name`, replacing any earlier template.
    ///
    /// The template must contain exactly one `%s`.
    pub fn register(&mut self, name: &str, template: &str) -> Result<&mut Self> {
        check_identifier(name)?;
        check_template(template)?;
        self.templates
            .insert(name.to_ascii_uppercase().into(), template.into());
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name.to_ascii_uppercase().as_str())
    }

    /// The template for `kind`: its own template first, then the registry.
    pub fn template(&self, kind: &dyn SqlFunction) -> Result<CompactString> {
        if let Some(own) = kind.template() {
            check_template(own)?;
            return Ok(own.to_compact_string());
        }
        self.templates
            .get(kind.name().to_ascii_uppercase().as_str())
            .cloned()
            .ok_or_else(|| JoinError::UnsupportedFunction(kind.name().into()))
    }

    /// Renders `NAME(arg) AS alias`.
    pub fn render(&self, kind: &dyn SqlFunction, arg_sql: &str, alias: &str) -> Result<String> {
        check_identifier(alias)?;
        let template = self.template(kind)?;
        let mut out = apply_template(&template, arg_sql);
        out.push_str(" AS ");
        out.push_str(alias);
        Ok(out)
    }
}

pub(crate) fn check_template(template: &str) -> Result<()> {
    match template.matches(ARG).count() {
        1 => Ok(()),
        n => Err(JoinError::Template(format!(
            "function template `{template}` must contain exactly one {ARG}, found {n}"
        ))),
    }
}

pub(crate) fn apply_template(template: &str, arg_sql: &str) -> String {
    template.replacen(ARG, arg_sql, 1)
}
