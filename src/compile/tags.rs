//! The syntax tag registry.
//!
//! Each tag name maps to an optional end tag and a constructor that turns the
//! tag token into a node. Tags with an end tag open a scope; their children
//! are handed to [`exit_scope`] once the end tag is reached.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::compile::lex::Token;
use crate::compile::parse::Compiler;
use crate::types::node::{Block, Cycle, Expr, ForLoop, IfElse, Include, Node, NodeId, With};
use crate::{ErrorKind, Result, Value};

pub type CompileFn = fn(&Compiler<'_>, &Token<'_>) -> Result<Node>;

pub struct TagDef {
    pub end_tag: Option<&'static str>,
    pub compile: CompileFn,
}

#[derive(Default)]
pub struct TagRegistry {
    tags: BTreeMap<&'static str, TagDef>,
    end_tags: BTreeSet<&'static str>,
}

impl TagRegistry {
    fn register(&mut self, tag: &'static str, end_tag: Option<&'static str>, compile: CompileFn) {
        if let Some(end) = end_tag {
            self.end_tags.insert(end);
        }
        self.tags.insert(tag, TagDef { end_tag, compile });
    }

    pub fn get(&self, tag: &str) -> Option<&TagDef> {
        self.tags.get(tag)
    }

    pub fn is_end_tag(&self, tag: &str) -> bool {
        self.end_tags.contains(tag)
    }
}

pub static TAGS: Lazy<TagRegistry> = Lazy::new(|| {
    let mut tags = TagRegistry::default();
    tags.register("for", Some("endfor"), for_loop);
    tags.register("empty", None, |_, _| Ok(Node::Empty));
    tags.register("if", Some("endif"), if_else);
    tags.register("elif", None, elif);
    tags.register("else", None, |_, _| Ok(Node::Else));
    tags.register("cycle", None, cycle);
    tags.register("include", None, include);
    tags.register("extends", None, extends);
    tags.register("block", Some("endblock"), block);
    tags.register("spaceless", Some("endspaceless"), |_, _| {
        Ok(Node::Spaceless(Vec::new()))
    });
    tags.register("trim", Some("endtrim"), |_, _| Ok(Node::Trim(Vec::new())));
    tags.register("with", Some("endwith"), with);
    tags
});

static FOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^for\s+(\w+(?:\s*,\s*\w+)*)\s+in\s+(.+)$").unwrap());

static WITH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^(\w+)\s*=\s*(.+)$").unwrap());

/// Seals a scoped node once its end tag is reached.
pub fn exit_scope(node: Node, children: Vec<Node>) -> Node {
    match node {
        Node::For(mut for_loop) => {
            let (body, _, empty) = split_at(children, |n| matches!(n, Node::Empty));
            for_loop.body = body;
            for_loop.empty = empty;
            Node::For(for_loop)
        }
        Node::If(mut if_else) => {
            match split_at(children, |n| matches!(n, Node::Elif(_) | Node::Else)) {
                (then_branch, Some(Node::Elif(test)), rest) => {
                    let nested = Node::If(Box::new(IfElse {
                        test: *test,
                        then_branch: Vec::new(),
                        else_branch: Vec::new(),
                    }));
                    if_else.then_branch = then_branch;
                    if_else.else_branch = vec![exit_scope(nested, rest)];
                }
                (then_branch, _, rest) => {
                    if_else.then_branch = then_branch;
                    if_else.else_branch = rest;
                }
            }
            Node::If(if_else)
        }
        Node::Block(block) => Node::Block(Arc::new(Block {
            id: block.id,
            title: block.title.clone(),
            body: children,
        })),
        Node::Spaceless(_) => Node::Spaceless(children),
        Node::Trim(_) => Node::Trim(children),
        Node::With(mut with) => {
            with.body = children;
            Node::With(with)
        }
        node => node,
    }
}

/// Splits the nodes at the first one matching the predicate.
fn split_at<F>(mut nodes: Vec<Node>, pred: F) -> (Vec<Node>, Option<Node>, Vec<Node>)
where
    F: Fn(&Node) -> bool,
{
    match nodes.iter().position(pred) {
        Some(i) => {
            let rest = nodes.split_off(i + 1);
            let delim = nodes.pop();
            (nodes, delim, rest)
        }
        None => (nodes, None, Vec::new()),
    }
}

/// Returns the tag content after the tag name.
fn argument<'t>(c: &Compiler<'_>, token: &Token<'t>) -> Result<&'t str> {
    let arg = token
        .content
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim())
        .unwrap_or_default();
    if arg.is_empty() {
        return Err(malformed(c, token));
    }
    Ok(arg)
}

fn malformed(c: &Compiler<'_>, token: &Token<'_>) -> crate::Error {
    c.err(
        ErrorKind::Syntax,
        format!(
            "malformed [{}] tag: [{}]",
            token.tag.unwrap_or_default(),
            token.content
        ),
        token.span,
    )
}

fn for_loop(c: &Compiler<'_>, token: &Token<'_>) -> Result<Node> {
    let caps = FOR
        .captures(token.content)
        .ok_or_else(|| malformed(c, token))?;
    let vars = caps
        .get(1)
        .map_or("", |m| m.as_str())
        .split(',')
        .map(|v| v.trim().to_owned())
        .collect();
    let iterable = c
        .exprs(token.span)
        .parse_expr(caps.get(2).map_or("", |m| m.as_str()))?;
    Ok(Node::For(Box::new(ForLoop {
        vars,
        iterable,
        tag: token.content.to_owned(),
        body: Vec::new(),
        empty: Vec::new(),
    })))
}

fn if_else(c: &Compiler<'_>, token: &Token<'_>) -> Result<Node> {
    let test = c.exprs(token.span).parse_test(argument(c, token)?)?;
    Ok(Node::If(Box::new(IfElse {
        test,
        then_branch: Vec::new(),
        else_branch: Vec::new(),
    })))
}

fn elif(c: &Compiler<'_>, token: &Token<'_>) -> Result<Node> {
    let test = c.exprs(token.span).parse_test(argument(c, token)?)?;
    Ok(Node::Elif(Box::new(test)))
}

fn cycle(c: &Compiler<'_>, token: &Token<'_>) -> Result<Node> {
    let expr = c.exprs(token.span).parse_expr(argument(c, token)?)?;
    Ok(Node::Cycle(Cycle {
        id: NodeId::next(),
        expr,
    }))
}

fn include(c: &Compiler<'_>, token: &Token<'_>) -> Result<Node> {
    match c.exprs(token.span).parse_expr(argument(c, token)?)? {
        Expr::Literal(value) => {
            let names = template_names(c, token, &value)?;
            let program = c.load(&names, token.span)?;
            Ok(Node::Include(Include::Static(program.root.clone())))
        }
        expr => Ok(Node::Include(Include::Dynamic(expr))),
    }
}

fn extends(c: &Compiler<'_>, token: &Token<'_>) -> Result<Node> {
    match c.exprs(token.span).parse_expr(argument(c, token)?)? {
        Expr::Literal(value) => {
            let names = template_names(c, token, &value)?;
            let program = c.load(&names, token.span)?;
            Ok(Node::Extends(program.root.clone()))
        }
        Expr::Var(_) => Err(malformed(c, token)),
    }
}

/// A template name is a string or a list of candidate strings.
fn template_names<'v>(c: &Compiler<'_>, token: &Token<'_>, value: &'v Value) -> Result<Vec<&'v str>> {
    let names = match value {
        Value::String(s) => Some(vec![s.as_str()]),
        Value::List(list) => list.iter().map(Value::as_str).collect(),
        _ => None,
    };
    match names {
        Some(names) if !names.is_empty() => Ok(names),
        _ => Err(malformed(c, token)),
    }
}

fn block(c: &Compiler<'_>, token: &Token<'_>) -> Result<Node> {
    let title = argument(c, token)?;
    Ok(Node::Block(Arc::new(Block {
        id: NodeId::next(),
        title: title.to_owned(),
        body: Vec::new(),
    })))
}

fn with(c: &Compiler<'_>, token: &Token<'_>) -> Result<Node> {
    let caps = WITH
        .captures(argument(c, token)?)
        .ok_or_else(|| malformed(c, token))?;
    let expr = c
        .exprs(token.span)
        .parse_expr(caps.get(2).map_or("", |m| m.as_str()))?;
    Ok(Node::With(Box::new(With {
        alias: caps.get(1).map_or("", |m| m.as_str()).to_owned(),
        expr,
        body: Vec::new(),
    })))
}
