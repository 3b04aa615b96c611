//! Compiled operands and `where` predicates.

use super::ast::CompareOp;
use super::context::TransformContext;
use super::path::Path;
use super::value::Value;
use std::fmt;

/// Anything that yields a value for a record: literals, paths, and
/// value-returning function calls such as `IsMatch`.
///
/// Resolution has no side effects and may run any number of times.
pub trait Expression: Send + Sync + fmt::Debug {
    /// Value for the record under the cursor
    fn resolve(&self, ctx: &TransformContext<'_>) -> Value;
}

/// Constant value from the statement text
#[derive(Debug, Clone)]
pub struct Literal(pub Value);

impl Expression for Literal {
    fn resolve(&self, _ctx: &TransformContext<'_>) -> Value {
        self.0.clone()
    }
}

/// Read of a record field
#[derive(Debug, Clone)]
pub struct PathExpression(pub Path);

impl Expression for PathExpression {
    fn resolve(&self, ctx: &TransformContext<'_>) -> Value {
        ctx.get(&self.0)
    }
}

/// Compiled `where` clause
#[derive(Debug)]
pub enum Predicate {
    /// `left == right` or `left != right`
    Compare {
        /// Left operand
        left: Box<dyn Expression>,
        /// Operator
        op: CompareOp,
        /// Right operand
        right: Box<dyn Expression>,
    },
    /// Bare call; true only when it yields `true`
    Call(Box<dyn Expression>),
}

impl Predicate {
    /// Whether the record satisfies the clause
    pub fn evaluate(&self, ctx: &TransformContext<'_>) -> bool {
        match self {
            Predicate::Compare { left, op, right } => {
                let equal = left.resolve(ctx).loose_eq(&right.resolve(ctx));
                match op {
                    CompareOp::Eq => equal,
                    CompareOp::NotEq => !equal,
                }
            },
            Predicate::Call(call) => call.resolve(ctx).is_true(),
        }
    }
}
