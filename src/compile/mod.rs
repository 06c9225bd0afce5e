//! Compile the template into a program that can be executed by the renderer.
//!
//! This process has three stages:
//! - The lexer chunks the template source into tokens.
//! - The compiler builds a node tree from the token stream, parsing the
//!   expressions in each tag as it goes.
//! - The blocks in the finished tree are collected into a registry used for
//!   template inheritance.

mod expr;
mod lex;
mod literal;
mod parse;
mod split;
pub(crate) mod tags;

use std::cell::Cell;
use std::sync::Arc;

pub(crate) use crate::compile::lex::Lexer;
use crate::types::node::{Include, Node};
use crate::types::program::{BlockRegistry, Program};
use crate::{Engine, Error, ErrorKind, Result};

thread_local! {
    static DEPTH: Cell<usize> = Cell::new(0);
}

/// Tracks how deeply compile-time includes and extends are nested on this
/// thread.
struct DepthGuard;

impl DepthGuard {
    fn enter(max: usize) -> Result<Self> {
        let depth = DEPTH.with(|d| {
            let depth = d.get() + 1;
            d.set(depth);
            depth
        });
        // Constructed before the check so that drop always decrements.
        let guard = Self;
        if depth > max {
            return Err(Error::new(
                ErrorKind::Load,
                format!("reached maximum include depth ({max})"),
            ));
        }
        Ok(guard)
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// Compile a template into a program.
pub(crate) fn program(engine: &Engine, source: &str, name: Option<&str>) -> Result<Program> {
    let _guard = DepthGuard::enter(engine.max_include_depth())?;
    let root = parse::Compiler::new(engine, source)
        .compile()
        .map_err(|err| match name {
            Some(name) => err.with_template_name(name),
            None => err,
        })?;
    let mut blocks = BlockRegistry::new();
    register_blocks(&root, &mut blocks);
    tracing::debug!(
        name = name.unwrap_or("<anonymous>"),
        blocks = blocks.len(),
        "compiled template"
    );
    Ok(Program {
        name: name.map(String::from),
        source: source.to_owned(),
        root: Arc::new(root),
        blocks,
    })
}

/// Walks the tree in document order, collecting blocks by title.
fn register_blocks(node: &Node, registry: &mut BlockRegistry) {
    let walk = |nodes: &[Node], registry: &mut BlockRegistry| {
        for node in nodes {
            register_blocks(node, registry);
        }
    };
    match node {
        Node::Block(block) => {
            registry
                .entry(block.title.clone())
                .or_default()
                .push(block.clone());
            walk(&block.body, registry);
        }
        Node::Branch(nodes) | Node::Spaceless(nodes) | Node::Trim(nodes) => walk(nodes, registry),
        Node::For(for_loop) => {
            walk(&for_loop.body, registry);
            walk(&for_loop.empty, registry);
        }
        Node::If(if_else) => {
            walk(&if_else.then_branch, registry);
            walk(&if_else.else_branch, registry);
        }
        Node::With(with) => walk(&with.body, registry),
        Node::Include(Include::Static(root)) | Node::Extends(root) => {
            register_blocks(root, registry)
        }
        Node::Text(_)
        | Node::Print(_)
        | Node::Empty
        | Node::Elif(_)
        | Node::Else
        | Node::Cycle(_)
        | Node::Include(Include::Dynamic(_)) => {}
    }
}
