//! Statement compiler: turns parsed statements into executable form,
//! rejecting unknown functions, bad arity, wrong argument kinds, unknown
//! paths and invalid regexes before any batch is processed.

use super::ast::{Condition, Expr, Invocation, Statement};
use super::context::TransformContext;
use super::expression::{Expression, Literal, PathExpression, Predicate};
use super::functions::{Argument, ArgumentList, Compiled, Editor, FunctionRegistry, Parameter, ParameterKind};
use super::parser::parse_statement;
use super::path::{ExecutionUnit, Path};
use super::value::Value;
use crate::core::{Result, TransformError};
use regex::Regex;
use std::fmt;

/// Executable statement; immutable once compiled
pub struct CompiledStatement {
    source: String,
    editor: Box<dyn Editor>,
    condition: Option<Predicate>,
}

impl CompiledStatement {
    /// Statement text as written
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Mutating half of the statement
    pub fn editor(&self) -> &dyn Editor {
        self.editor.as_ref()
    }

    /// Execution unit of the editor
    pub fn unit(&self) -> ExecutionUnit {
        self.editor.unit()
    }

    /// Whether a `where` clause was given
    pub fn has_condition(&self) -> bool {
        self.condition.is_some()
    }

    /// Evaluate the `where` clause; statements without one always match
    pub fn matches(&self, ctx: &TransformContext<'_>) -> bool {
        self.condition
            .as_ref()
            .map_or(true, |predicate| predicate.evaluate(ctx))
    }
}

impl fmt::Debug for CompiledStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledStatement")
            .field("source", &self.source)
            .field("unit", &self.unit())
            .field("has_condition", &self.has_condition())
            .finish()
    }
}

/// Compile every statement, failing on the first bad one
pub fn compile_statements<S: AsRef<str>>(
    statements: &[S],
    registry: &FunctionRegistry,
) -> Result<Vec<CompiledStatement>> {
    statements
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let text = text.as_ref();
            compile_statement(text, registry).map_err(|e| e.in_statement(index, text))
        })
        .collect()
}

/// Parse and compile one statement
pub fn compile_statement(text: &str, registry: &FunctionRegistry) -> Result<CompiledStatement> {
    let Statement {
        invocation,
        condition,
    } = parse_statement(text)?;

    let editor = match compile_invocation(&invocation, registry)? {
        Compiled::Editor(editor) => editor,
        Compiled::Expression(_) => {
            return Err(TransformError::invalid_argument(
                invocation.function,
                "value functions cannot be used as statements",
            ))
        },
    };
    let condition = condition
        .map(|condition| compile_condition(condition, registry))
        .transpose()?;

    Ok(CompiledStatement {
        source: text.trim().to_string(),
        editor,
        condition,
    })
}

fn compile_condition(condition: Condition, registry: &FunctionRegistry) -> Result<Predicate> {
    match condition {
        Condition::Comparison { left, op, right } => Ok(Predicate::Compare {
            left: compile_expression(&left, registry)?,
            op,
            right: compile_expression(&right, registry)?,
        }),
        Condition::Invocation(call) => Ok(Predicate::Call(compile_value_call(&call, registry)?)),
    }
}

/// Compile an operand into an expression
fn compile_expression(expr: &Expr, registry: &FunctionRegistry) -> Result<Box<dyn Expression>> {
    Ok(match expr {
        Expr::String(s) => Box::new(Literal(Value::String(s.clone()))),
        Expr::Int(i) => Box::new(Literal(Value::Int(*i))),
        Expr::Float(f) => Box::new(Literal(Value::Double(*f))),
        Expr::Bool(b) => Box::new(Literal(Value::Bool(*b))),
        Expr::Path(path) => Box::new(PathExpression(Path::compile(path)?)),
        Expr::Invocation(call) => compile_value_call(call, registry)?,
    })
}

fn compile_value_call(call: &Invocation, registry: &FunctionRegistry) -> Result<Box<dyn Expression>> {
    match compile_invocation(call, registry)? {
        Compiled::Expression(expr) => Ok(expr),
        Compiled::Editor(_) => Err(TransformError::invalid_argument(
            call.function.as_str(),
            "editor functions do not produce a value",
        )),
    }
}

fn compile_invocation(call: &Invocation, registry: &FunctionRegistry) -> Result<Compiled> {
    let function = registry
        .get(&call.function)
        .ok_or_else(|| TransformError::UnknownFunction(call.function.clone()))?;
    let parameters = function.parameters();
    check_arity(function.identifier(), parameters, call.arguments.len())?;

    let mut arguments = ArgumentList::new(function.identifier());
    for (position, expr) in call.arguments.iter().enumerate() {
        let parameter = parameters[position.min(parameters.len() - 1)];
        let argument = compile_argument(function.identifier(), &parameter, expr, registry)?;
        arguments.push(parameter.keyword, argument);
    }

    function.compile(arguments)
}

fn check_arity(function: &str, parameters: &[Parameter], found: usize) -> Result<()> {
    let min = parameters.iter().filter(|p| p.required).count();
    let variadic = parameters.last().is_some_and(|p| p.variadic);
    let max = parameters.len();

    let ok = found >= min && (variadic || found <= max);
    if ok {
        return Ok(());
    }

    let expected = if variadic {
        format!("at least {}", min)
    } else if min == max {
        min.to_string()
    } else {
        format!("{} to {}", min, max)
    };
    Err(TransformError::Arity {
        function: function.to_string(),
        expected,
        found,
    })
}

fn compile_argument(
    function: &str,
    parameter: &Parameter,
    expr: &Expr,
    registry: &FunctionRegistry,
) -> Result<Argument> {
    let mismatch = || TransformError::ArgumentKind {
        function: function.to_string(),
        parameter: parameter.keyword,
        expected: parameter.kind.describe(),
        found: expr.describe(),
    };

    match (parameter.kind, expr) {
        (ParameterKind::Path, Expr::Path(path)) => Ok(Argument::Path(Path::compile(path)?)),
        (ParameterKind::WritablePath, Expr::Path(path)) => {
            let path = Path::compile(path)?;
            if !path.is_writable() {
                return Err(TransformError::PathNotWritable(path.to_string()));
            }
            Ok(Argument::Path(path))
        },
        (ParameterKind::MapPath, Expr::Path(path)) => {
            let path = Path::compile(path)?;
            if !path.is_map() {
                return Err(mismatch());
            }
            Ok(Argument::Path(path))
        },
        (ParameterKind::String, Expr::String(s)) => Ok(Argument::String(s.clone())),
        (ParameterKind::Regex, Expr::String(pattern)) => Regex::new(pattern)
            .map(Argument::Regex)
            .map_err(|source| TransformError::InvalidRegex {
                pattern: pattern.clone(),
                source,
            }),
        (ParameterKind::Bool, Expr::Bool(b)) => Ok(Argument::Bool(*b)),
        (ParameterKind::Any, expr) => Ok(Argument::Expression(compile_expression(expr, registry)?)),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::functions::DEFAULT_FUNCTIONS;

    fn compile(text: &str) -> Result<CompiledStatement> {
        compile_statement(text, &DEFAULT_FUNCTIONS)
    }

    #[test]
    fn test_compile_units() {
        assert_eq!(compile(r#"set(attributes["a"], "b")"#).unwrap().unit(), ExecutionUnit::Point);
        assert_eq!(compile(r#"set(metric.unit, "s")"#).unwrap().unit(), ExecutionUnit::Instrument);
        assert_eq!(
            compile(r#"delete_key(resource.attributes, "host.name")"#).unwrap().unit(),
            ExecutionUnit::Resource
        );
        assert_eq!(
            compile(r#"convert_summary_sum_val_to_sum("delta", true)"#).unwrap().unit(),
            ExecutionUnit::Point
        );
    }

    #[test]
    fn test_compile_keeps_source_and_condition() {
        let stmt = compile(r#"  set(metric.unit, "s") where metric.name == "a"  "#).unwrap();
        assert_eq!(stmt.source(), r#"set(metric.unit, "s") where metric.name == "a""#);
        assert!(stmt.has_condition());
    }

    #[test]
    fn test_unknown_function() {
        assert!(matches!(compile(r#"explode(attributes)"#), Err(TransformError::UnknownFunction(_))));
    }

    #[test]
    fn test_arity() {
        assert!(matches!(compile(r#"set(metric.unit)"#), Err(TransformError::Arity { .. })));
        assert!(matches!(
            compile(r#"delete_key(attributes, "a", "b")"#),
            Err(TransformError::Arity { .. })
        ));
        assert!(compile(r#"keep_keys(attributes)"#).is_ok());
        assert!(compile(r#"keep_keys(attributes, "a", "b", "c")"#).is_ok());
        assert!(matches!(compile(r#"keep_keys()"#), Err(TransformError::Arity { .. })));
    }

    #[test]
    fn test_argument_kinds() {
        assert!(matches!(
            compile(r#"keep_keys(attributes["a"], "b")"#),
            Err(TransformError::ArgumentKind { .. })
        ));
        assert!(matches!(
            compile(r#"delete_key(attributes, 1)"#),
            Err(TransformError::ArgumentKind { .. })
        ));
        assert!(matches!(
            compile(r#"convert_summary_sum_val_to_sum("delta", "true")"#),
            Err(TransformError::ArgumentKind { .. })
        ));
        assert!(matches!(
            compile(r#"set(metric.type, "Sum")"#),
            Err(TransformError::PathNotWritable(_))
        ));
        assert!(matches!(compile(r#"set(attributes, "x")"#), Err(TransformError::PathNotWritable(_))));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            compile(r#"delete_matching_keys(attributes, "[")"#),
            Err(TransformError::InvalidRegex { .. })
        ));
        assert!(matches!(
            compile(r#"set(attributes["a"], "b") where metric.nope == 1"#),
            Err(TransformError::UnknownPath(_))
        ));
        assert!(matches!(
            compile(r#"convert_summary_count_val_to_sum("sideways", true)"#),
            Err(TransformError::InvalidArgument { .. })
        ));
        assert!(matches!(
            compile(r#"IsMatch(metric.name, "a")"#),
            Err(TransformError::InvalidArgument { .. })
        ));
        assert!(matches!(
            compile(r#"set(attributes["a"], "b") where set(metric.unit, "x") == true"#),
            Err(TransformError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_list_fails_fast_with_position() {
        let statements = [r#"set(metric.unit, "s")"#, r#"nope()"#, r#"also_bad("#];
        match compile_statements(&statements, &DEFAULT_FUNCTIONS) {
            Err(TransformError::Statement { index, source, .. }) => {
                assert_eq!(index, 1);
                assert!(matches!(*source, TransformError::UnknownFunction(_)));
            },
            other => panic!("Expected statement error, got {:?}", other),
        }
    }
}
