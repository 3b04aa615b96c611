//! Editors that mutate existing records in place.

use super::{ArgumentList, Compiled, Editor, Function, Parameter, ParameterKind};
use crate::core::Result;
use crate::model::AttributeValue;
use crate::transform::context::{Outcome, TransformContext};
use crate::transform::expression::Expression;
use crate::transform::path::{ExecutionUnit, Path};
use crate::transform::value::Value;
use regex::{NoExpand, Regex};
use std::borrow::Cow;

// --- set ---
/// `set(target, value)`: write a value into a field
#[derive(Clone, Copy, Debug)]
pub struct Set;

impl Function for Set {
    fn identifier(&self) -> &'static str {
        "set"
    }

    fn parameters(&self) -> &'static [Parameter] {
        &[
            Parameter {
                keyword: "target",
                kind: ParameterKind::WritablePath,
                required: true,
                variadic: false,
            },
            Parameter {
                keyword: "value",
                kind: ParameterKind::Any,
                required: true,
                variadic: false,
            },
        ]
    }

    fn compile(&self, mut arguments: ArgumentList) -> Result<Compiled> {
        let target = arguments.required_path("target")?;
        let value = arguments.required_expression("value")?;
        Ok(Compiled::Editor(Box::new(SetFn { target, value })))
    }
}

#[derive(Debug)]
struct SetFn {
    target: Path,
    value: Box<dyn Expression>,
}

impl Editor for SetFn {
    fn unit(&self) -> ExecutionUnit {
        self.target.unit()
    }

    fn apply(&self, ctx: &mut TransformContext<'_>) -> Outcome {
        let value = self.value.resolve(ctx);
        ctx.set(&self.target, value)
    }
}

// --- keep_keys ---
/// `keep_keys(map, key...)`: drop every key not listed
#[derive(Clone, Copy, Debug)]
pub struct KeepKeys;

impl Function for KeepKeys {
    fn identifier(&self) -> &'static str {
        "keep_keys"
    }

    fn parameters(&self) -> &'static [Parameter] {
        &[
            Parameter {
                keyword: "target",
                kind: ParameterKind::MapPath,
                required: true,
                variadic: false,
            },
            Parameter {
                keyword: "keys",
                kind: ParameterKind::String,
                required: false,
                variadic: true,
            },
        ]
    }

    fn compile(&self, mut arguments: ArgumentList) -> Result<Compiled> {
        let target = arguments.required_path("target")?;
        let keys = arguments.variadic_strings("keys")?;
        Ok(Compiled::Editor(Box::new(KeepKeysFn { target, keys })))
    }
}

#[derive(Debug)]
struct KeepKeysFn {
    target: Path,
    keys: Vec<String>,
}

impl Editor for KeepKeysFn {
    fn unit(&self) -> ExecutionUnit {
        self.target.unit()
    }

    fn apply(&self, ctx: &mut TransformContext<'_>) -> Outcome {
        match ctx.attributes_mut(self.target.accessor()) {
            Some(attributes) => {
                attributes.retain(|kv| self.keys.iter().any(|key| *key == kv.key));
                Outcome::Applied
            },
            None => Outcome::Skipped("no data point"),
        }
    }
}

// --- delete_key ---
/// `delete_key(map, key)`: remove one key if present
#[derive(Clone, Copy, Debug)]
pub struct DeleteKey;

impl Function for DeleteKey {
    fn identifier(&self) -> &'static str {
        "delete_key"
    }

    fn parameters(&self) -> &'static [Parameter] {
        &[
            Parameter {
                keyword: "target",
                kind: ParameterKind::MapPath,
                required: true,
                variadic: false,
            },
            Parameter {
                keyword: "key",
                kind: ParameterKind::String,
                required: true,
                variadic: false,
            },
        ]
    }

    fn compile(&self, mut arguments: ArgumentList) -> Result<Compiled> {
        let target = arguments.required_path("target")?;
        let key = arguments.required_string("key")?;
        Ok(Compiled::Editor(Box::new(DeleteKeyFn { target, key })))
    }
}

#[derive(Debug)]
struct DeleteKeyFn {
    target: Path,
    key: String,
}

impl Editor for DeleteKeyFn {
    fn unit(&self) -> ExecutionUnit {
        self.target.unit()
    }

    fn apply(&self, ctx: &mut TransformContext<'_>) -> Outcome {
        match ctx.attributes_mut(self.target.accessor()) {
            Some(attributes) => {
                attributes.remove(&self.key);
                Outcome::Applied
            },
            None => Outcome::Skipped("no data point"),
        }
    }
}

// --- delete_matching_keys ---
/// `delete_matching_keys(map, pattern)`: remove keys the pattern finds a match in
#[derive(Clone, Copy, Debug)]
pub struct DeleteMatchingKeys;

impl Function for DeleteMatchingKeys {
    fn identifier(&self) -> &'static str {
        "delete_matching_keys"
    }

    fn parameters(&self) -> &'static [Parameter] {
        &[
            Parameter {
                keyword: "target",
                kind: ParameterKind::MapPath,
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
        let target = arguments.required_path("target")?;
        let pattern = arguments.required_regex("pattern")?;
        Ok(Compiled::Editor(Box::new(DeleteMatchingKeysFn { target, pattern })))
    }
}

#[derive(Debug)]
struct DeleteMatchingKeysFn {
    target: Path,
    pattern: Regex,
}

impl Editor for DeleteMatchingKeysFn {
    fn unit(&self) -> ExecutionUnit {
        self.target.unit()
    }

    fn apply(&self, ctx: &mut TransformContext<'_>) -> Outcome {
        match ctx.attributes_mut(self.target.accessor()) {
            Some(attributes) => {
                attributes.retain(|kv| !self.pattern.is_match(&kv.key));
                Outcome::Applied
            },
            None => Outcome::Skipped("no data point"),
        }
    }
}

/// Replace every match with the literal replacement; `None` when nothing matched
fn replace_literal(pattern: &Regex, text: &str, replacement: &str) -> Option<String> {
    match pattern.replace_all(text, NoExpand(replacement)) {
        Cow::Borrowed(_) => None,
        Cow::Owned(replaced) => Some(replaced),
    }
}

// --- replace_pattern ---
/// `replace_pattern(target, pattern, replacement)`: rewrite a string field
#[derive(Clone, Copy, Debug)]
pub struct ReplacePattern;

impl Function for ReplacePattern {
    fn identifier(&self) -> &'static str {
        "replace_pattern"
    }

    fn parameters(&self) -> &'static [Parameter] {
        &[
            Parameter {
                keyword: "target",
                kind: ParameterKind::WritablePath,
                required: true,
                variadic: false,
            },
            Parameter {
                keyword: "pattern",
                kind: ParameterKind::Regex,
                required: true,
                variadic: false,
            },
            Parameter {
                keyword: "replacement",
                kind: ParameterKind::String,
                required: true,
                variadic: false,
            },
        ]
    }

    fn compile(&self, mut arguments: ArgumentList) -> Result<Compiled> {
        let target = arguments.required_path("target")?;
        let pattern = arguments.required_regex("pattern")?;
        let replacement = arguments.required_string("replacement")?;
        Ok(Compiled::Editor(Box::new(ReplacePatternFn {
            target,
            pattern,
            replacement,
        })))
    }
}

#[derive(Debug)]
struct ReplacePatternFn {
    target: Path,
    pattern: Regex,
    replacement: String,
}

impl Editor for ReplacePatternFn {
    fn unit(&self) -> ExecutionUnit {
        self.target.unit()
    }

    fn apply(&self, ctx: &mut TransformContext<'_>) -> Outcome {
        let current = ctx.get(&self.target);
        let Some(text) = current.as_str() else {
            return Outcome::Skipped("type mismatch");
        };
        match replace_literal(&self.pattern, text, &self.replacement) {
            Some(replaced) => ctx.set(&self.target, Value::String(replaced)),
            None => Outcome::Applied,
        }
    }
}

// --- replace_all_patterns ---
/// `replace_all_patterns(map, pattern, replacement)`: rewrite every string value of a map
#[derive(Clone, Copy, Debug)]
pub struct ReplaceAllPatterns;

impl Function for ReplaceAllPatterns {
    fn identifier(&self) -> &'static str {
        "replace_all_patterns"
    }

    fn parameters(&self) -> &'static [Parameter] {
        &[
            Parameter {
                keyword: "target",
                kind: ParameterKind::MapPath,
                required: true,
                variadic: false,
            },
            Parameter {
                keyword: "pattern",
                kind: ParameterKind::Regex,
                required: true,
                variadic: false,
            },
            Parameter {
                keyword: "replacement",
                kind: ParameterKind::String,
                required: true,
                variadic: false,
            },
        ]
    }

    fn compile(&self, mut arguments: ArgumentList) -> Result<Compiled> {
        let target = arguments.required_path("target")?;
        let pattern = arguments.required_regex("pattern")?;
        let replacement = arguments.required_string("replacement")?;
        Ok(Compiled::Editor(Box::new(ReplaceAllPatternsFn {
            target,
            pattern,
            replacement,
        })))
    }
}

#[derive(Debug)]
struct ReplaceAllPatternsFn {
    target: Path,
    pattern: Regex,
    replacement: String,
}

impl Editor for ReplaceAllPatternsFn {
    fn unit(&self) -> ExecutionUnit {
        self.target.unit()
    }

    fn apply(&self, ctx: &mut TransformContext<'_>) -> Outcome {
        let Some(attributes) = ctx.attributes_mut(self.target.accessor()) else {
            return Outcome::Skipped("no data point");
        };
        for kv in attributes.iter_mut() {
            if let AttributeValue::String(text) = &kv.value {
                if let Some(replaced) = replace_literal(&self.pattern, text, &self.replacement) {
                    kv.value = AttributeValue::String(replaced);
                }
            }
        }
        Outcome::Applied
    }
}
