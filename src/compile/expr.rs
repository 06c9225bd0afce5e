//! Parsing of expressions, print tag bodies and if-style conditions.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::compile::literal;
use crate::compile::split;
use crate::types::node::{Condition, Expr, FilterCall, Op, PrintExpr, Test, Var};
use crate::types::span::Span;
use crate::value::Value;
use crate::{Engine, Error, ErrorKind, Result};

static PIPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\|").unwrap());
static COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",").unwrap());
static COLON: Lazy<Regex> = Lazy::new(|| Regex::new(r":").unwrap());
static OR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+or\s+|\|\|").unwrap());
static AND: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+and\s+|&&").unwrap());
static TERNARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\?\?|::").unwrap());
static CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^([a-zA-Z_][a-zA-Z0-9_.]*)\((.*)\)$").unwrap());
static COMPARISON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(not\s+)?(.+?)\s+(==|!=|<=|>=|<|>|not\s+in|in)\s+(.+)$").unwrap()
});
static NEGATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^not\s+(.+)$").unwrap());

/// Parses expressions found in a single tag, reporting errors against the
/// span of that tag.
pub struct ExprParser<'a> {
    engine: &'a Engine,
    source: &'a str,
    span: Span,
}

impl<'a> ExprParser<'a> {
    pub fn new(engine: &'a Engine, source: &'a str, span: Span) -> Self {
        Self {
            engine,
            source,
            span,
        }
    }

    /// Parses the body of a print tag: either `test ?? a :: b` or an
    /// or-chain of expressions.
    pub fn parse_print(&self, content: &str) -> Result<PrintExpr> {
        let chunks = split::split_keep(content, &TERNARY);
        if let [test, "??", if_true, "::", if_false] = chunks.as_slice() {
            return Ok(PrintExpr::Ternary {
                test: Box::new(self.parse_test(test)?),
                if_true: self.parse_expr(if_true)?,
                if_false: self.parse_expr(if_false)?,
            });
        }
        let exprs = split::split(content, &OR)
            .into_iter()
            .map(|e| self.parse_expr(e))
            .collect::<Result<_>>()?;
        Ok(PrintExpr::Chain(exprs))
    }

    /// Parses a filtered expression, e.g. `name | upper | join:', '`.
    pub fn parse_expr(&self, raw: &str) -> Result<Expr> {
        let raw = raw.trim();
        let mut parts = split::split(raw, &PIPE).into_iter();
        let head = parts.next().unwrap_or_default();

        let filters = parts
            .map(|f| self.parse_filter(f, raw))
            .collect::<Result<Vec<_>>>()?;

        if let Ok(value) = literal::parse(head) {
            // Filters on a literal are applied once, here.
            return filters
                .iter()
                .try_fold(value, |value, filter| {
                    (filter.func)(value, &filter.args).map_err(|err| {
                        self.err(
                            ErrorKind::Filter,
                            format!(
                                "error applying filter [{}] in [{raw}]: {err}",
                                filter.name
                            ),
                        )
                    })
                })
                .map(Expr::Literal);
        }

        let (path, args) = self.parse_call(head, raw)?;
        self.validate_path(path, raw)?;
        Ok(Expr::Var(Var {
            raw: raw.to_owned(),
            path: path.to_owned(),
            args,
            filters,
        }))
    }

    fn parse_filter(&self, text: &str, raw: &str) -> Result<FilterCall> {
        let (name, args) = self.parse_call(text, raw)?;
        let func = self.engine.filter(name).ok_or_else(|| {
            self.err(
                ErrorKind::InvalidFilter,
                format!("[{name}] is not a recognised filter"),
            )
        })?;
        Ok(FilterCall {
            name: name.to_owned(),
            func,
            args,
        })
    }

    /// Splits a call in either the `name(a, b)` or the `name:a:b` form into
    /// its name and literal arguments.
    fn parse_call<'t>(&self, text: &'t str, raw: &str) -> Result<(&'t str, Vec<Value>)> {
        let text = text.trim();
        let (name, args): (&str, Vec<&str>) = match CALL.captures(text) {
            Some(caps) => {
                let name = caps.get(1).map_or("", |m| m.as_str());
                let inner = caps.get(2).map_or("", |m| m.as_str());
                let args = split::split(inner, &COMMA)
                    .into_iter()
                    .filter(|a| !a.is_empty())
                    .collect();
                (name, args)
            }
            None => {
                let mut chunks = split::split(text, &COLON).into_iter();
                let name = chunks.next().unwrap_or_default();
                (name, chunks.collect())
            }
        };
        let args = args
            .into_iter()
            .map(|arg| {
                literal::parse(arg).map_err(|_| {
                    Error::syntax(
                        format!("unparsable argument: [{arg}] in [{raw}]"),
                        self.source,
                        self.span,
                    )
                })
            })
            .collect::<Result<_>>()?;
        Ok((name, args))
    }

    /// A path is a dot separated list of identifiers or list indices.
    fn validate_path(&self, path: &str, raw: &str) -> Result<()> {
        let valid = path
            .split('.')
            .all(|seg| is_ident(seg) || (!seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit())));
        if valid {
            Ok(())
        } else {
            Err(Error::syntax(
                format!("invalid expression [{raw}]"),
                self.source,
                self.span,
            ))
        }
    }

    /// Parses an if-style test: conditions joined with `or`/`||` at the top
    /// level and with `and`/`&&` within each group.
    pub fn parse_test(&self, text: &str) -> Result<Test> {
        let groups = split::split(text, &OR)
            .into_iter()
            .map(|group| {
                split::split(group, &AND)
                    .into_iter()
                    .map(|c| self.parse_condition(c))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<_>>()?;
        Ok(Test { groups })
    }

    fn parse_condition(&self, text: &str) -> Result<Condition> {
        let raw = text.trim();
        let masked = split::mask(raw);
        if let Some(caps) = COMPARISON.captures(&masked) {
            let slice = |i: usize| caps.get(i).map_or("", |m| &raw[m.start()..m.end()]);
            let op = match masked_op(caps.get(3).map_or("", |m| m.as_str())) {
                Some(op) => op,
                None => return Err(self.err(ErrorKind::Syntax, format!("invalid condition [{raw}]"))),
            };
            return Ok(Condition {
                raw: raw.to_owned(),
                negated: caps.get(1).is_some(),
                lhs: self.parse_expr(slice(2))?,
                rhs: Some((op, self.parse_expr(slice(4))?)),
            });
        }
        let (negated, expr) = match NEGATION.captures(&masked) {
            Some(caps) => (true, caps.get(1).map_or("", |m| &raw[m.start()..m.end()])),
            None => (false, raw),
        };
        Ok(Condition {
            raw: raw.to_owned(),
            negated,
            lhs: self.parse_expr(expr)?,
            rhs: None,
        })
    }

    fn err(&self, kind: ErrorKind, msg: String) -> Error {
        Error::span(kind, msg, self.source, self.span)
    }
}

fn masked_op(op: &str) -> Option<Op> {
    let op = match op {
        "==" => Op::Eq,
        "!=" => Op::Ne,
        "<" => Op::Lt,
        ">" => Op::Gt,
        "<=" => Op::Le,
        ">=" => Op::Ge,
        "in" => Op::In,
        op if op.starts_with("not") => Op::NotIn,
        _ => return None,
    };
    Some(op)
}

#[cfg(feature = "unicode")]
fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || unicode_ident::is_xid_start(c) => {
            chars.all(unicode_ident::is_xid_continue)
        }
        _ => false,
    }
}

#[cfg(not(feature = "unicode"))]
fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}
