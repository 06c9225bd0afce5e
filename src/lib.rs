//! A template engine with block inheritance, filters and pluggable loaders.
//!
//! # Features
//!
//! ### Syntax
//!
//! - Expressions: `{{ user.name }}`, `{{ a or b or 'default' }}`
//! - Escaped expressions: `{{{ user.bio }}}`
//! - Ternaries: `{{ user.admin ?? 'yes' :: 'no' }}`
//! - Conditionals: `{% if user.age >= 18 and not user.banned %} ... {% endif %}`
//! - Loops: `{% for key, value in map|items %} ... {% empty %} ... {% endfor %}`
//! - Inheritance: `{% extends 'base' %}`, `{% block title %}{{ super }}{% endblock %}`
//! - Nested templates: `{% include 'nav' %}`, `{% include name %}`
//! - Filters with arguments: `{{ user.name|truncatechars:10 }}`
//! - Configurable delimiters
//!
//! ### Engine
//!
//! - Render using any [`serde`] serializable values or a [`Value`] built with
//!   the [`data!`] macro
//! - Render to a [`String`] or any [`std::io::Write`] implementor
//! - Load templates from memory or the file system with a [`Loader`]
//! - Custom filters, builtin values and callable functions
//! - Compiled templates are shareable across threads
//!
//! # Getting started
//!
//! Your entry point is the [`Engine`] struct. The engine stores the delimiter
//! config, filters, builtins, the loader and compiled templates. Generally,
//! you only need to construct one engine during the lifetime of a program.
//!
//! ```
//! let engine = stencil::Engine::new();
//! ```
//!
//! Next, [`.add_template`][Engine::add_template] is used to compile and store
//! a template in the engine.
//!
//! ```
//! # let mut engine = stencil::Engine::new();
//! engine.add_template("hello", "Hello {{ user.name }}!")?;
//! # Ok::<(), stencil::Error>(())
//! ```
//!
//! Finally, the template is rendered by fetching it using
//! [`.get_template`][Engine::get_template] and calling
//! [`.render`][Template::render].
//!
//! ```
//! # let mut engine = stencil::Engine::new();
//! # engine.add_template("hello", "Hello {{ user.name }}!")?;
//! let template = engine.get_template("hello")?;
//! let result = template.render_from(&stencil::data! { user: { name: "John Smith" } })?;
//! assert_eq!(result, "Hello John Smith!");
//! # Ok::<(), stencil::Error>(())
//! ```
//!
//! If you don't need to store the compiled template then you can also use the
//! [`.compile`][Engine::compile] function to return the template directly.
//!
//! ```
//! # let engine = stencil::Engine::new();
//! let template = engine.compile("Hello {{ user.name }}!")?;
//! let result = template.render_from(&stencil::data! { user: { name: "John Smith" } })?;
//! assert_eq!(result, "Hello John Smith!");
//! # Ok::<(), stencil::Error>(())
//! ```
//!
//! # Examples
//!
//! ### Render using structured data
//!
//! ```
//! #[derive(serde::Serialize)]
//! struct Context { user: User }
//!
//! #[derive(serde::Serialize)]
//! struct User { name: String }
//!
//! let ctx = Context { user: User { name: "John Smith".into() } };
//!
//! let result = stencil::Engine::new()
//!     .compile("Hello {{ user.name }}")?
//!     .render(&ctx)?;
//!
//! assert_eq!(result, "Hello John Smith");
//! # Ok::<(), stencil::Error>(())
//! ```
//!
//! ### Transform data using filters
//!
//! ```
//! let mut engine = stencil::Engine::new();
//! engine.add_filter("shout", |s: String| format!("{}!", s.to_uppercase()));
//!
//! let result = engine
//!     .compile("Hello {{ value|shout }}")?
//!     .render_from(&stencil::data! { value: "world" })?;
//!
//! assert_eq!(result, "Hello WORLD!");
//! # Ok::<(), stencil::Error>(())
//! ```
//!
//! See the [`Filter`] trait documentation for more information on filters.
//!
//! ### Template inheritance
//!
//! ```
//! let mut engine = stencil::Engine::new();
//! engine.add_template("base", "<title>{% block title %}Site{% endblock %}</title>")?;
//! engine.add_template(
//!     "page",
//!     "{% extends 'base' %}{% block title %}Page | {{ super() }}{% endblock %}",
//! )?;
//!
//! let result = engine.get_template("page")?.render_from(&stencil::data! {})?;
//! assert_eq!(result, "<title>Page | Site</title>");
//! # Ok::<(), stencil::Error>(())
//! ```
//!
//! ### Render a template using custom delimiters
//!
//! ```
//! let delimiters = stencil::Delimiters::builder()
//!     .print("<?", "?>")
//!     .syntax("<%", "%>")
//!     .build();
//!
//! let result = stencil::Engine::with_delimiters(delimiters)
//!     .compile("<% if user %>Hello <? user.name ?><% endif %>")?
//!     .render_from(&stencil::data! { user: { name: "John Smith" } })?;
//!
//! assert_eq!(result, "Hello John Smith");
//! # Ok::<(), stencil::Error>(())
//! ```

mod compile;
mod error;
mod filters;
mod functions;
mod loader;
mod macros;
mod render;
mod types {
    pub mod delimiters;
    pub mod node;
    pub mod program;
    pub mod span;
}
mod value;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::sync::Arc;

pub use crate::error::{Error, ErrorKind};
pub use crate::filters::Filter;
pub use crate::functions::Callable;
pub use crate::loader::{DictLoader, FileLoader, FileReloader, Loader};
pub use crate::render::Context;
pub use crate::types::delimiters::{Delimiters, DelimitersBuilder};
pub use crate::types::program::Program;
#[cfg(feature = "serde")]
pub use crate::value::to_value;
pub use crate::value::{Object, Value};

use crate::compile::Lexer;
use crate::filters::{FilterArgs, FilterFn, FilterReturn};
use crate::value::Map;

/// A type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

const DEFAULT_MAX_INCLUDE_DEPTH: usize = 64;

/// The compilation and rendering engine.
pub struct Engine {
    delimiters: Delimiters,
    lexer: Lexer,
    filters: BTreeMap<String, Arc<FilterFn>>,
    builtins: Map<String, Value>,
    templates: BTreeMap<String, Arc<Program>>,
    loader: Option<Box<dyn Loader>>,
    max_include_depth: usize,
}

/// A compiled template bound to the engine that renders it.
#[derive(Clone)]
pub struct Template<'engine> {
    engine: &'engine Engine,
    program: Arc<Program>,
}

impl Default for Engine {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Construct a new engine with the default delimiters.
    #[inline]
    pub fn new() -> Self {
        Self::with_delimiters(Delimiters::default())
    }

    /// Construct a new engine with custom delimiters.
    ///
    /// # Examples
    ///
    /// ```
    /// use stencil::{Delimiters, Engine};
    ///
    /// let delimiters = Delimiters::builder().print("<{", "}>").syntax("<[", "]>").build();
    /// let engine = Engine::with_delimiters(delimiters);
    /// ```
    pub fn with_delimiters(delimiters: Delimiters) -> Self {
        let filters = filters::defaults()
            .into_iter()
            .map(|(name, f)| (name.to_owned(), f))
            .collect();
        Self {
            lexer: Lexer::new(&delimiters),
            builtins: functions::defaults(&delimiters),
            delimiters,
            filters,
            templates: BTreeMap::new(),
            loader: None,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }

    /// Add a new filter to the engine, replacing any filter with the same
    /// name.
    ///
    /// Filters are resolved when a template is compiled, so they must be
    /// added before any template that uses them.
    #[inline]
    pub fn add_filter<F, R, A>(&mut self, name: impl Into<String>, f: F)
    where
        F: Filter<R, A> + Send + Sync + 'static,
        R: FilterReturn,
        A: FilterArgs,
    {
        self.filters.insert(name.into(), filters::new(f));
    }

    /// Add a value that is visible to every template rendered by this
    /// engine.
    ///
    /// Render data shadows builtins with the same name.
    #[inline]
    pub fn add_builtin(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.builtins.insert(name.into(), value.into());
    }

    /// Add a function that is callable from every template rendered by this
    /// engine.
    ///
    /// # Examples
    ///
    /// ```
    /// use stencil::{Engine, Value};
    ///
    /// let mut engine = Engine::new();
    /// engine.add_function("add", |args: &[Value]| match args {
    ///     [Value::Integer(a), Value::Integer(b)] => Ok(Value::from(a + b)),
    ///     _ => Err(String::from("expected two integers")),
    /// });
    ///
    /// let result = engine.compile("{{ add(1, 2) }}")?.render_from(&stencil::data! {})?;
    /// assert_eq!(result, "3");
    /// # Ok::<(), stencil::Error>(())
    /// ```
    #[inline]
    pub fn add_function<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        self.add_builtin(name, Value::Fn(Callable::new(f)));
    }

    /// Set the loader used to resolve template names.
    ///
    /// Without a loader, names resolve against the templates added with
    /// [`.add_template`][Engine::add_template].
    #[inline]
    pub fn set_loader<L>(&mut self, loader: L)
    where
        L: Loader + 'static,
    {
        self.loader = Some(Box::new(loader));
    }

    /// Set the maximum nesting depth of includes and extends.
    ///
    /// Defaults to 64.
    #[inline]
    pub fn set_max_include_depth(&mut self, depth: usize) {
        self.max_include_depth = depth;
    }

    /// Add a template to the engine.
    ///
    /// The template will be compiled and stored under the given name. Static
    /// includes and extends are resolved during compilation, so any template
    /// this one depends on must be added first.
    pub fn add_template(&mut self, name: impl Into<String>, source: &str) -> Result<()> {
        let name = name.into();
        let program = compile::program(self, source, Some(&name))?;
        self.templates.insert(name, Arc::new(program));
        Ok(())
    }

    /// Lookup a template by name.
    ///
    /// Uses the loader if one is set, otherwise the templates added with
    /// [`.add_template`][Engine::add_template].
    pub fn get_template(&self, name: &str) -> Result<Template<'_>> {
        self.load(&[name])
    }

    /// Lookup the first template that exists out of several candidate names.
    pub fn load(&self, names: &[&str]) -> Result<Template<'_>> {
        let program = self.load_program(names)?;
        Ok(self.template(program))
    }

    /// Compile a template.
    ///
    /// The template will not be stored in the engine.
    pub fn compile(&self, source: &str) -> Result<Template<'_>> {
        let program = self.program(source)?;
        Ok(self.template(program))
    }

    /// Compile a template into a program that can be stored independently
    /// of the engine, for example by a custom [`Loader`].
    pub fn program(&self, source: &str) -> Result<Arc<Program>> {
        compile::program(self, source, None).map(Arc::new)
    }

    /// Compile a named template into a program, the name is used in error
    /// messages.
    pub fn named_program(&self, name: &str, source: &str) -> Result<Arc<Program>> {
        compile::program(self, source, Some(name)).map(Arc::new)
    }

    /// Bind a compiled program to this engine for rendering.
    #[inline]
    pub fn template(&self, program: Arc<Program>) -> Template<'_> {
        Template {
            engine: self,
            program,
        }
    }

    /// Returns the delimiters this engine was constructed with.
    #[inline]
    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    pub(crate) fn filter(&self, name: &str) -> Option<Arc<FilterFn>> {
        self.filters.get(name).cloned()
    }

    pub(crate) fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    pub(crate) fn builtins(&self) -> &Map<String, Value> {
        &self.builtins
    }

    pub(crate) fn max_include_depth(&self) -> usize {
        self.max_include_depth
    }

    pub(crate) fn load_program(&self, names: &[&str]) -> Result<Arc<Program>> {
        tracing::debug!(?names, "resolving template");
        match &self.loader {
            Some(loader) => loader.load(self, names),
            None => names
                .iter()
                .find_map(|name| self.templates.get(*name))
                .cloned()
                .ok_or_else(|| Error::not_found(names)),
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("delimiters", &self.delimiters)
            .field("filters", &self.filters.keys())
            .field("builtins", &self.builtins.keys())
            .field("templates", &self.templates.keys())
            .field("loader", &self.loader.is_some())
            .field("max_include_depth", &self.max_include_depth)
            .finish()
    }
}

impl<'engine> Template<'engine> {
    /// Render the template to a string using the provided value.
    ///
    /// The value must serialize to a map, its entries become the template
    /// variables.
    #[cfg(feature = "serde")]
    #[inline]
    pub fn render<S>(&self, ctx: S) -> Result<String>
    where
        S: serde::Serialize,
    {
        render::to_string(self.engine, &self.program, Cow::Owned(to_value(ctx)?))
    }

    /// Render the template to a string using the provided [`Value`].
    #[inline]
    pub fn render_from(&self, ctx: &Value) -> Result<String> {
        render::to_string(self.engine, &self.program, Cow::Borrowed(ctx))
    }

    /// Render the template to a writer using the provided value.
    #[cfg(feature = "serde")]
    #[inline]
    pub fn render_to_writer<W, S>(&self, writer: W, ctx: S) -> Result<()>
    where
        W: io::Write,
        S: serde::Serialize,
    {
        render::to_writer(self.engine, &self.program, Cow::Owned(to_value(ctx)?), writer)
    }

    /// Render the template to a writer using the provided [`Value`].
    #[inline]
    pub fn render_from_to_writer<W>(&self, writer: W, ctx: &Value) -> Result<()>
    where
        W: io::Write,
    {
        render::to_writer(self.engine, &self.program, Cow::Borrowed(ctx), writer)
    }

    /// Returns the original template source.
    #[inline]
    pub fn source(&self) -> &str {
        self.program.source()
    }

    /// Returns the compiled program.
    #[inline]
    pub fn program(&self) -> &Arc<Program> {
        &self.program
    }
}

impl fmt::Debug for Template<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.program.name())
            .finish_non_exhaustive()
    }
}
