//! Value functions for `where` clauses.

use super::{ArgumentList, Compiled, Function, Parameter, ParameterKind};
use crate::core::{Result, TransformError};
use crate::transform::context::TransformContext;
use crate::transform::expression::Expression;
use crate::transform::value::Value;
use regex::Regex;

// --- IsMatch ---
/// `IsMatch(value, pattern)`: true when the value's string form matches the
/// whole pattern
#[derive(Clone, Copy, Debug)]
pub struct IsMatch;

impl Function for IsMatch {
    fn identifier(&self) -> &'static str {
        "IsMatch"
    }

    fn parameters(&self) -> &'static [Parameter] {
        &[
            Parameter {
                keyword: "target",
                kind: ParameterKind::Any,
                required: true,
                variadic: false,
            },
            Parameter {
                keyword: "pattern",
                kind: ParameterKind::Regex,
                required: true,
                variadic: false,
            },
        ]
    }

    fn compile(&self, mut arguments: ArgumentList) -> Result<Compiled> {
        let target = arguments.required_expression("target")?;
        let pattern = arguments.required_regex("pattern")?;
        let anchored = format!("^(?:{})$", pattern.as_str());
        let pattern = Regex::new(&anchored).map_err(|source| TransformError::InvalidRegex {
            pattern: pattern.as_str().to_string(),
            source,
        })?;
        Ok(Compiled::Expression(Box::new(IsMatchFn { target, pattern })))
    }
}

#[derive(Debug)]
struct IsMatchFn {
    target: Box<dyn Expression>,
    pattern: Regex,
}

impl Expression for IsMatchFn {
    fn resolve(&self, ctx: &TransformContext<'_>) -> Value {
        let matched = self
            .target
            .resolve(ctx)
            .to_match_string()
            .is_some_and(|text| self.pattern.is_match(&text));
        Value::Bool(matched)
    }
}
