use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::types::node::{Block, Node};

/// Blocks by title, in the order they were encountered while compiling. The
/// first entry is the one that renders and the rest form its `super` chain.
pub(crate) type BlockRegistry = BTreeMap<String, Vec<Arc<Block>>>;

/// A compiled template.
///
/// Programs are immutable, cheap to clone via [`Arc`] and can be rendered
/// concurrently from any number of threads. Use
/// [`Engine::template`][crate::Engine::template] to render one.
pub struct Program {
    pub(crate) name: Option<String>,
    pub(crate) source: String,
    pub(crate) root: Arc<Node>,
    pub(crate) blocks: BlockRegistry,
}

impl Program {
    /// The name the template was registered or loaded under, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The template source.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("name", &self.name)
            .field("blocks", &self.blocks.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
