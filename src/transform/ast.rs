//! Abstract Syntax Tree for transform statements.

use std::fmt;

/// One parsed statement: `function(args...) [where condition]`
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Editor call
    pub invocation: Invocation,
    /// `where` clause, if any
    pub condition: Option<Condition>,
}

/// Function call with positional arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Function name as written
    pub function: String,
    /// Arguments in call order
    pub arguments: Vec<Expr>,
}

/// Argument or operand expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Double-quoted string literal
    String(String),
    /// Integer literal (no decimal point)
    Int(i64),
    /// Floating point literal
    Float(f64),
    /// `true` / `false`
    Bool(bool),
    /// Field reference such as `resource.attributes["host.name"]`
    Path(PathExpr),
    /// Nested function call
    Invocation(Invocation),
}

/// Dotted field list with an optional trailing map key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    /// Dot-separated segments, e.g. `["metric", "name"]`
    pub fields: Vec<String>,
    /// Contents of `["..."]`
    pub key: Option<String>,
}

/// `where` clause
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `left op right`
    #[allow(missing_docs)]
    Comparison {
        left: Expr,
        op: CompareOp,
        right: Expr,
    },
    /// Bare boolean function call
    Invocation(Invocation),
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equals
    Eq,
    /// Not equals
    NotEq,
}

impl Expr {
    /// Short description used in argument errors
    pub fn describe(&self) -> String {
        match self {
            Expr::String(_) => "string literal".to_string(),
            Expr::Int(_) => "int literal".to_string(),
            Expr::Float(_) => "float literal".to_string(),
            Expr::Bool(_) => "bool literal".to_string(),
            Expr::Path(path) => format!("path {}", path),
            Expr::Invocation(call) => format!("call to {}", call.function),
        }
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fields.join("."))?;
        if let Some(key) = &self.key {
            write!(f, "[{:?}]", key)?;
        }
        Ok(())
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::NotEq => write!(f, "!="),
        }
    }
}
