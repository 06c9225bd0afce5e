//! The compiled node tree.
//!
//! Nodes that take a body are created empty by their tag constructor and
//! filled in when the matching end tag is reached, see
//! [`exit_scope`][crate::compile::tags::exit_scope].

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::filters::FilterFn;
use crate::Value;

/// Identifies a node across all compiled programs. Used as the key for
/// per-render node state and for block identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn next() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug)]
pub enum Node {
    /// A plain sequence of nodes, e.g. the root of a template.
    Branch(Vec<Node>),
    Text(String),
    Print(Print),
    For(Box<ForLoop>),
    /// Separates the body of a for-loop from its fallback.
    Empty,
    If(Box<IfElse>),
    /// Starts a new branch inside an if-statement.
    Elif(Box<Test>),
    Else,
    Cycle(Cycle),
    Include(Include),
    Extends(Arc<Node>),
    Block(Arc<Block>),
    Spaceless(Vec<Node>),
    Trim(Vec<Node>),
    With(Box<With>),
}

#[derive(Debug)]
pub struct Print {
    pub escape: bool,
    pub expr: PrintExpr,
}

#[derive(Debug)]
pub enum PrintExpr {
    /// `a or b || c`, evaluates to the first truthy value or the last one.
    Chain(Vec<Expr>),
    /// `test ?? a :: b`
    Ternary {
        test: Box<Test>,
        if_true: Expr,
        if_false: Expr,
    },
}

#[derive(Debug)]
pub struct ForLoop {
    pub vars: Vec<String>,
    pub iterable: Expr,
    /// The full tag content, used in error messages.
    pub tag: String,
    pub body: Vec<Node>,
    pub empty: Vec<Node>,
}

#[derive(Debug)]
pub struct IfElse {
    pub test: Test,
    pub then_branch: Vec<Node>,
    /// Contains a single nested [`Node::If`] when the statement has an elif.
    pub else_branch: Vec<Node>,
}

/// A disjunction of conjunctions of conditions.
#[derive(Debug)]
pub struct Test {
    pub groups: Vec<Vec<Condition>>,
}

#[derive(Debug)]
pub struct Condition {
    pub raw: String,
    pub negated: bool,
    pub lhs: Expr,
    pub rhs: Option<(Op, Expr)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    In,
    NotIn,
}

#[derive(Debug)]
pub struct Cycle {
    pub id: NodeId,
    pub expr: Expr,
}

#[derive(Debug)]
pub enum Include {
    /// The included template was known at compile time.
    Static(Arc<Node>),
    /// The name is evaluated and the template loaded while rendering.
    Dynamic(Expr),
}

#[derive(Debug)]
pub struct Block {
    pub id: NodeId,
    pub title: String,
    pub body: Vec<Node>,
}

#[derive(Debug)]
pub struct With {
    pub alias: String,
    pub expr: Expr,
    pub body: Vec<Node>,
}

#[derive(Debug)]
pub enum Expr {
    /// A literal, with any filters already applied.
    Literal(Value),
    Var(Var),
}

#[derive(Debug)]
pub struct Var {
    /// The full expression text, used in error messages.
    pub raw: String,
    pub path: String,
    /// Arguments passed if the path resolves to a callable.
    pub args: Vec<Value>,
    pub filters: Vec<FilterCall>,
}

pub struct FilterCall {
    pub name: String,
    pub func: Arc<FilterFn>,
    pub args: Vec<Value>,
}

impl fmt::Debug for FilterCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterCall")
            .field("name", &self.name)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

impl Op {
    pub fn apply(self, lhs: &Value, rhs: &Value) -> Result<bool, String> {
        use std::cmp::Ordering::*;
        match self {
            Op::Eq => Ok(lhs == rhs),
            Op::Ne => Ok(lhs != rhs),
            Op::Lt => Ok(lhs.compare(rhs)? == Less),
            Op::Gt => Ok(lhs.compare(rhs)? == Greater),
            Op::Le => Ok(lhs.compare(rhs)? != Greater),
            Op::Ge => Ok(lhs.compare(rhs)? != Less),
            Op::In => rhs.contains(lhs),
            Op::NotIn => rhs.contains(lhs).map(|b| !b),
        }
    }
}
