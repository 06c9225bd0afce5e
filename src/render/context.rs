use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::functions;
use crate::render::value::lookup;
use crate::types::node::{Block, NodeId};
use crate::types::program::BlockRegistry;
use crate::value::Map;
use crate::{Engine, Error, ErrorKind, Result, Value};

/// The variable scopes and per-render state of a single render.
///
/// Names are resolved against a stack of scopes, most recent first. The
/// bottom three scopes are fixed: the core builtins (`defined`), the engine
/// builtins and the render data. Loops, blocks and `with` push further
/// scopes.
///
/// A context is created fresh for every render and is never shared between
/// threads. It is exposed to [`Callable::with_context`][crate::Callable::with_context]
/// functions.
pub struct Context<'render> {
    engine: &'render Engine,
    blocks: &'render BlockRegistry,
    scopes: Vec<Cow<'render, Map<String, Value>>>,
    stash: HashMap<NodeId, Box<dyn Any>>,
    chains: Vec<Vec<Arc<Block>>>,
    include_depth: usize,
}

const BASE_SCOPES: usize = 3;

impl<'render> Context<'render> {
    pub(crate) fn new(
        engine: &'render Engine,
        blocks: &'render BlockRegistry,
        data: Cow<'render, Map<String, Value>>,
    ) -> Self {
        Self {
            engine,
            blocks,
            scopes: vec![
                Cow::Borrowed(&*functions::CORE),
                Cow::Borrowed(engine.builtins()),
                data,
            ],
            stash: HashMap::new(),
            chains: Vec::new(),
            include_depth: 0,
        }
    }

    pub(crate) fn engine(&self) -> &'render Engine {
        self.engine
    }

    pub(crate) fn blocks(&self) -> &'render BlockRegistry {
        self.blocks
    }

    /// Returns the value bound to `name` in the innermost scope that has it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Whether any scope binds `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Resolves a dotted path, e.g. `user.name` or `items.0`.
    ///
    /// The first segment is looked up in the scopes, each further segment
    /// indexes into the previous value. If any segment fails to resolve the
    /// result is [`Value::Undefined`]. The name `context` refers to the
    /// context itself unless something shadows it.
    pub fn resolve(&self, path: &str) -> Value {
        let (first, rest) = match path.split_once('.') {
            Some((first, rest)) => (first, Some(rest)),
            None => (path, None),
        };
        let mut current = match self.get(first) {
            Some(value) => Cow::Borrowed(value),
            None if first == "context" => {
                return match rest {
                    Some(rest) => self.resolve(rest),
                    None => Value::Map(self.snapshot()),
                };
            }
            None => return Value::Undefined,
        };
        for segment in rest.into_iter().flat_map(|r| r.split('.')) {
            current = match lookup(current, segment) {
                Some(value) => value,
                None => return Value::Undefined,
            };
        }
        current.into_owned()
    }

    /// Whether the path resolves to something other than
    /// [`Value::Undefined`].
    pub fn defined(&self, path: &str) -> bool {
        !self.resolve(path).is_undefined()
    }

    /// All bindings visible from the current scope.
    fn snapshot(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for scope in &self.scopes {
            for (k, v) in scope.iter() {
                map.insert(k.clone(), v.clone());
            }
        }
        map
    }

    pub(crate) fn push(&mut self) {
        self.scopes.push(Cow::Owned(Map::new()));
    }

    pub(crate) fn pop(&mut self) {
        if self.scopes.len() > BASE_SCOPES {
            self.scopes.pop();
        }
    }

    /// Binds `name` in the innermost scope.
    pub(crate) fn set(&mut self, name: impl Into<String>, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.to_mut().insert(name.into(), value);
        }
    }

    pub(crate) fn stash<T: Any>(&mut self, id: NodeId) -> Option<&mut T> {
        self.stash.get_mut(&id).and_then(|s| s.downcast_mut())
    }

    pub(crate) fn set_stash<T: Any>(&mut self, id: NodeId, state: T) {
        self.stash.insert(id, Box::new(state));
    }

    /// Starts rendering a block with the given override chain.
    pub(crate) fn push_chain(&mut self, chain: Vec<Arc<Block>>) {
        self.chains.push(chain);
    }

    pub(crate) fn pop_chain(&mut self) {
        self.chains.pop();
    }

    /// Takes the most derived block left in the current chain.
    pub(crate) fn next_in_chain(&mut self) -> Option<Arc<Block>> {
        self.chains.last_mut().and_then(Vec::pop)
    }

    pub(crate) fn enter_include(&mut self) -> Result<()> {
        let max = self.engine.max_include_depth();
        if self.include_depth >= max {
            return Err(Error::new(
                ErrorKind::Render,
                format!("reached maximum include depth ({max})"),
            ));
        }
        self.include_depth += 1;
        Ok(())
    }

    pub(crate) fn exit_include(&mut self) {
        self.include_depth = self.include_depth.saturating_sub(1);
    }
}
