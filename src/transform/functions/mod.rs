//! Function library: editors that mutate records and value functions
//! usable in `where` clauses.
//!
//! Each function declares its parameters up front. The statement compiler
//! checks arity and argument kinds against those declarations and hands the
//! function an [`ArgumentList`] of already-compiled arguments, so nothing is
//! re-validated per record.

mod convert;
mod editors;
mod predicates;

use super::context::{Outcome, TransformContext};
use super::expression::Expression;
use super::path::{ExecutionUnit, Path};
use crate::core::{Result, TransformError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;

pub use convert::{ConvertSummaryCountValToSum, ConvertSummarySumValToSum};
pub use editors::{DeleteKey, DeleteMatchingKeys, KeepKeys, ReplaceAllPatterns, ReplacePattern, Set};
pub use predicates::IsMatch;

/// Registry holding the default function set
pub static DEFAULT_FUNCTIONS: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::default);

/// Kind of argument accepted at a parameter position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// Any recognised path
    Path,
    /// Path that `set` can write
    WritablePath,
    /// Whole attribute map (`attributes`, `resource.attributes`)
    MapPath,
    /// String literal
    String,
    /// String literal holding a valid regular expression
    Regex,
    /// `true` or `false`
    Bool,
    /// Literal, path or value function call
    Any,
}

impl ParameterKind {
    /// Phrase used in argument errors
    pub fn describe(self) -> &'static str {
        match self {
            ParameterKind::Path => "a path",
            ParameterKind::WritablePath => "a writable path",
            ParameterKind::MapPath => "an attribute map path",
            ParameterKind::String => "a string literal",
            ParameterKind::Regex => "a regex string literal",
            ParameterKind::Bool => "a bool literal",
            ParameterKind::Any => "a value",
        }
    }
}

/// Declared parameter of a function
#[derive(Debug, Clone, Copy)]
pub struct Parameter {
    /// Name the function retrieves the argument by
    pub keyword: &'static str,
    /// Accepted argument kind
    pub kind: ParameterKind,
    /// Whether the argument must be supplied
    pub required: bool,
    /// Only valid on the last parameter; absorbs all remaining arguments
    pub variadic: bool,
}

/// Argument after compile-time checking
#[derive(Debug)]
pub enum Argument {
    /// Resolved path
    Path(Path),
    /// String literal
    String(String),
    /// Compiled pattern
    Regex(Regex),
    /// Bool literal
    Bool(bool),
    /// Literal, path or value call evaluated per record
    Expression(Box<dyn Expression>),
}

impl Argument {
    fn describe(&self) -> &'static str {
        match self {
            Argument::Path(_) => "path",
            Argument::String(_) => "string",
            Argument::Regex(_) => "regex",
            Argument::Bool(_) => "bool",
            Argument::Expression(_) => "expression",
        }
    }
}

/// Compiled arguments, keyed by parameter keyword
#[derive(Debug)]
pub struct ArgumentList {
    function: &'static str,
    arguments: Vec<(&'static str, Argument)>,
}

impl ArgumentList {
    /// Empty list for `function`
    pub fn new(function: &'static str) -> Self {
        Self {
            function,
            arguments: Vec::new(),
        }
    }

    /// Bind an argument to a parameter keyword
    pub fn push(&mut self, keyword: &'static str, argument: Argument) {
        self.arguments.push((keyword, argument));
    }

    /// Arguments not yet taken
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    /// True once every argument has been taken
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    fn take(&mut self, keyword: &'static str) -> Result<Argument> {
        let index = self
            .arguments
            .iter()
            .position(|(k, _)| *k == keyword)
            .ok_or_else(|| {
                TransformError::invalid_argument(self.function, format!("missing '{}'", keyword))
            })?;
        Ok(self.arguments.remove(index).1)
    }

    fn mismatch(&self, keyword: &'static str, expected: &'static str, found: &Argument) -> TransformError {
        TransformError::ArgumentKind {
            function: self.function.to_string(),
            parameter: keyword,
            expected,
            found: found.describe().to_string(),
        }
    }

    /// Take a path argument
    pub fn required_path(&mut self, keyword: &'static str) -> Result<Path> {
        match self.take(keyword)? {
            Argument::Path(path) => Ok(path),
            other => Err(self.mismatch(keyword, "a path", &other)),
        }
    }

    /// Take a string literal
    pub fn required_string(&mut self, keyword: &'static str) -> Result<String> {
        match self.take(keyword)? {
            Argument::String(s) => Ok(s),
            other => Err(self.mismatch(keyword, "a string literal", &other)),
        }
    }

    /// Take a compiled pattern
    pub fn required_regex(&mut self, keyword: &'static str) -> Result<Regex> {
        match self.take(keyword)? {
            Argument::Regex(regex) => Ok(regex),
            other => Err(self.mismatch(keyword, "a regex", &other)),
        }
    }

    /// Take a bool literal
    pub fn required_bool(&mut self, keyword: &'static str) -> Result<bool> {
        match self.take(keyword)? {
            Argument::Bool(b) => Ok(b),
            other => Err(self.mismatch(keyword, "a bool literal", &other)),
        }
    }

    /// Take a per-record expression
    pub fn required_expression(&mut self, keyword: &'static str) -> Result<Box<dyn Expression>> {
        match self.take(keyword)? {
            Argument::Expression(expr) => Ok(expr),
            other => Err(self.mismatch(keyword, "a value", &other)),
        }
    }

    /// All string arguments bound to a variadic parameter, in order
    pub fn variadic_strings(&mut self, keyword: &'static str) -> Result<Vec<String>> {
        let mut values = Vec::new();
        while self.arguments.iter().any(|(k, _)| *k == keyword) {
            values.push(self.required_string(keyword)?);
        }
        Ok(values)
    }
}

/// Mutating half of a statement
pub trait Editor: Send + Sync + fmt::Debug {
    /// Granularity the engine drives this editor at
    fn unit(&self) -> ExecutionUnit {
        ExecutionUnit::Point
    }

    /// Edit the record under the cursor
    fn apply(&self, ctx: &mut TransformContext<'_>) -> Outcome;
}

/// What a function compiles into
#[derive(Debug)]
pub enum Compiled {
    /// Usable as a statement
    Editor(Box<dyn Editor>),
    /// Usable as a value or condition
    Expression(Box<dyn Expression>),
}

/// A named function available to statements
pub trait Function: Send + Sync {
    /// Name used in statements
    fn identifier(&self) -> &'static str;

    /// Declared parameters, in call order
    fn parameters(&self) -> &'static [Parameter];

    /// Build the compiled form from checked arguments
    fn compile(&self, arguments: ArgumentList) -> Result<Compiled>;
}

/// Get the default function set
pub fn all() -> Vec<Box<dyn Function>> {
    vec![
        // Editors
        Box::new(Set),
        Box::new(KeepKeys),
        Box::new(DeleteKey),
        Box::new(DeleteMatchingKeys),
        Box::new(ReplacePattern),
        Box::new(ReplaceAllPatterns),
        Box::new(ConvertSummaryCountValToSum),
        Box::new(ConvertSummarySumValToSum),
        // Value functions
        Box::new(IsMatch),
    ]
}

/// Functions available to the statement compiler, by identifier
pub struct FunctionRegistry {
    functions: HashMap<&'static str, Box<dyn Function>>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for function in all() {
            registry.register(function);
        }
        registry
    }
}

impl FunctionRegistry {
    /// Registry with no functions
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Add or replace a function
    pub fn register(&mut self, function: Box<dyn Function>) -> &mut Self {
        self.functions.insert(function.identifier(), function);
        self
    }

    /// Look up a function by name
    pub fn get(&self, identifier: &str) -> Option<&dyn Function> {
        self.functions.get(identifier).map(|f| f.as_ref())
    }

    /// Whether `identifier` is registered
    pub fn contains(&self, identifier: &str) -> bool {
        self.functions.contains_key(identifier)
    }

    /// Registered identifiers, sorted
    pub fn identifiers(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.identifiers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = FunctionRegistry::default();
        assert_eq!(
            registry.identifiers(),
            vec![
                "IsMatch",
                "convert_summary_count_val_to_sum",
                "convert_summary_sum_val_to_sum",
                "delete_key",
                "delete_matching_keys",
                "keep_keys",
                "replace_all_patterns",
                "replace_pattern",
                "set",
            ]
        );
        assert!(DEFAULT_FUNCTIONS.contains("set"));
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_argument_list_access() {
        let mut args = ArgumentList::new("test");
        args.push("keys", Argument::String("a".to_string()));
        args.push("keys", Argument::String("b".to_string()));
        args.push("flag", Argument::Bool(true));

        assert!(args.required_string("flag").is_err());
        assert_eq!(args.variadic_strings("keys").unwrap(), vec!["a", "b"]);
        assert!(args.is_empty());
    }
}
