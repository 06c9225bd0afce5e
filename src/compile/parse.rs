use std::sync::Arc;

use crate::compile::expr::ExprParser;
use crate::compile::lex::{Token, TokenKind};
use crate::compile::tags::{exit_scope, TAGS};
use crate::types::node::{Node, Print};
use crate::types::program::Program;
use crate::types::span::Span;
use crate::{Engine, Error, ErrorKind, Result};

/// Builds the node tree from the token stream.
///
/// This works using two stacks:
/// - A stack of open nodes, each collecting the children parsed so far.
/// - A stack of the end tags we are expecting, with the span of the tag that
///   opened them.
pub struct Compiler<'a> {
    engine: &'a Engine,
    source: &'a str,
}

impl<'a> Compiler<'a> {
    pub fn new(engine: &'a Engine, source: &'a str) -> Self {
        Self { engine, source }
    }

    /// Returns an expression parser reporting errors at the given span.
    pub fn exprs(&self, span: Span) -> ExprParser<'a> {
        ExprParser::new(self.engine, self.source, span)
    }

    /// Loads a template while compiling, for static includes and extends.
    pub fn load(&self, names: &[&str], span: Span) -> Result<Arc<Program>> {
        self.engine
            .load_program(names)
            .map_err(|err| err.enrich(self.source, span))
    }

    pub fn compile(self) -> Result<Node> {
        let mut root = Vec::new();
        let mut open: Vec<(Node, Vec<Node>)> = Vec::new();
        let mut expecting: Vec<(&'static str, Span)> = Vec::new();

        for token in self.engine.lexer().tokens(self.source) {
            let node = match token.kind {
                TokenKind::Text => Node::Text(token.content.to_owned()),
                TokenKind::Print | TokenKind::EscapedPrint => Node::Print(Print {
                    escape: token.kind == TokenKind::EscapedPrint,
                    expr: self.exprs(token.span).parse_print(token.content)?,
                }),
                TokenKind::Comment => continue,
                TokenKind::Syntax => {
                    let tag = token.tag.unwrap_or_default();
                    if let Some(def) = TAGS.get(tag) {
                        let node = (def.compile)(&self, &token)?;
                        if let Some(end) = def.end_tag {
                            open.push((node, Vec::new()));
                            expecting.push((end, token.span));
                            continue;
                        }
                        node
                    } else if TAGS.is_end_tag(tag) {
                        self.close(tag, &token, &mut expecting)?;
                        // `close` guarantees a matching open node
                        match open.pop() {
                            Some((node, children)) => exit_scope(node, children),
                            None => continue,
                        }
                    } else {
                        return Err(self.err(
                            ErrorKind::InvalidTag,
                            format!("[{tag}] is not a recognised template tag"),
                            token.span,
                        ));
                    }
                }
            };
            match open.last_mut() {
                Some((_, children)) => children.push(node),
                None => root.push(node),
            }
        }

        if let Some((end, span)) = expecting.pop() {
            return Err(self.err(ErrorKind::Nesting, format!("expecting [{end}]"), span));
        }

        tracing::trace!(nodes = root.len(), "compiled node tree");
        Ok(Node::Branch(root))
    }

    fn close(
        &self,
        tag: &str,
        token: &Token<'_>,
        expecting: &mut Vec<(&'static str, Span)>,
    ) -> Result<()> {
        match expecting.pop() {
            Some((end, _)) if end == tag => Ok(()),
            Some((end, _)) => Err(self.err(
                ErrorKind::Nesting,
                format!("expecting [{end}], found [{tag}]"),
                token.span,
            )),
            None => Err(self.err(
                ErrorKind::Nesting,
                format!("not expecting [{tag}]"),
                token.span,
            )),
        }
    }

    pub fn err(&self, kind: ErrorKind, msg: String, span: Span) -> Error {
        Error::span(kind, msg, self.source, span)
    }
}
