//! Template loaders.
//!
//! A loader resolves template names used by `{% include %}`, `{% extends %}`
//! and [`Engine::get_template`][crate::Engine::get_template] into compiled
//! programs. Each request carries a list of candidate names and the first one
//! that exists wins.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use crate::types::program::Program;
use crate::{compile, Engine, Error, ErrorKind, Result};

/// Resolves candidate template names into compiled programs.
///
/// Implemented for closures with the same signature as [`Loader::load`].
///
/// Loaders may be called from several threads at once and while another
/// template is still being compiled, so they must not hold a lock across
/// compilation.
pub trait Loader: Send + Sync {
    /// Returns the program for the first candidate name that exists.
    ///
    /// Fails with [`ErrorKind::TemplateNotFound`] if none of them exist and
    /// with [`ErrorKind::Load`] if one exists but cannot be read.
    fn load(&self, engine: &Engine, names: &[&str]) -> Result<Arc<Program>>;
}

impl<F> Loader for F
where
    F: Fn(&Engine, &[&str]) -> Result<Arc<Program>> + Send + Sync,
{
    fn load(&self, engine: &Engine, names: &[&str]) -> Result<Arc<Program>> {
        self(engine, names)
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Loads templates from an in-memory map of names to sources.
///
/// Sources are compiled on first use and cached.
///
/// # Examples
///
/// ```
/// use stencil::{DictLoader, Engine};
///
/// let mut engine = Engine::new();
/// engine.set_loader(DictLoader::new([
///     ("base", "<h1>{% block title %}{% endblock %}</h1>"),
///     ("page", "{% extends 'base' %}{% block title %}Hi{% endblock %}"),
/// ]));
///
/// let result = engine.get_template("page")?.render_from(&stencil::data! {})?;
/// assert_eq!(result, "<h1>Hi</h1>");
/// # Ok::<(), stencil::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct DictLoader {
    sources: BTreeMap<String, String>,
    cache: Mutex<BTreeMap<String, Arc<Program>>>,
}

impl DictLoader {
    pub fn new<I, K, V>(sources: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            sources: sources
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            cache: Mutex::default(),
        }
    }
}

impl Loader for DictLoader {
    fn load(&self, engine: &Engine, names: &[&str]) -> Result<Arc<Program>> {
        for &name in names {
            if let Some(program) = lock(&self.cache).get(name) {
                return Ok(program.clone());
            }
            if let Some(source) = self.sources.get(name) {
                tracing::debug!(name, "compiling template from map");
                let program = Arc::new(compile::program(engine, source, Some(name))?);
                let cached = lock(&self.cache)
                    .entry(name.to_owned())
                    .or_insert(program)
                    .clone();
                return Ok(cached);
            }
        }
        Err(Error::not_found(names))
    }
}

/// Loads templates from files under a root directory.
///
/// Each file is read and compiled once and then cached for the lifetime of
/// the loader. Use [`FileReloader`] to pick up changes.
#[derive(Debug)]
pub struct FileLoader {
    root: PathBuf,
    cache: Mutex<HashMap<String, Arc<Program>>>,
}

impl FileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::default(),
        }
    }
}

impl Loader for FileLoader {
    fn load(&self, engine: &Engine, names: &[&str]) -> Result<Arc<Program>> {
        for &name in names {
            if let Some(program) = lock(&self.cache).get(name) {
                return Ok(program.clone());
            }
            let path = self.root.join(name);
            if path.is_file() {
                let program = Arc::new(compile_file(engine, &path, name)?);
                let cached = lock(&self.cache)
                    .entry(name.to_owned())
                    .or_insert(program)
                    .clone();
                return Ok(cached);
            }
        }
        Err(Error::not_found(names))
    }
}

/// Loads templates from files under a root directory, recompiling a file
/// whenever its modification time changes.
#[derive(Debug)]
pub struct FileReloader {
    root: PathBuf,
    cache: Mutex<HashMap<String, (SystemTime, Arc<Program>)>>,
}

impl FileReloader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::default(),
        }
    }
}

impl Loader for FileReloader {
    fn load(&self, engine: &Engine, names: &[&str]) -> Result<Arc<Program>> {
        for &name in names {
            let path = self.root.join(name);
            if !path.is_file() {
                continue;
            }
            let mtime = fs::metadata(&path)
                .and_then(|m| m.modified())
                .map_err(|err| load_error(&path, err))?;
            if let Some((cached, program)) = lock(&self.cache).get(name) {
                if *cached == mtime {
                    return Ok(program.clone());
                }
            }
            let program = Arc::new(compile_file(engine, &path, name)?);
            lock(&self.cache).insert(name.to_owned(), (mtime, program.clone()));
            return Ok(program);
        }
        Err(Error::not_found(names))
    }
}

fn compile_file(engine: &Engine, path: &Path, name: &str) -> Result<Program> {
    tracing::debug!(path = %path.display(), "loading template file");
    let source = fs::read_to_string(path).map_err(|err| load_error(path, err))?;
    compile::program(engine, &source, Some(name))
}

fn load_error(path: &Path, err: std::io::Error) -> Error {
    Error::new(
        ErrorKind::Load,
        format!("error loading template file [{}]: {err}", path.display()),
    )
}
