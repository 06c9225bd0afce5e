mod context;
mod core;
mod value;

use std::borrow::Cow;
use std::io;

pub use crate::render::context::Context;
pub(crate) use crate::render::core::render_super;
use crate::types::program::Program;
use crate::value::Map;
use crate::{Engine, Error, ErrorKind, Result, Value};

/// Render a compiled program with the given data to a string.
pub(crate) fn to_string(engine: &Engine, program: &Program, data: Cow<'_, Value>) -> Result<String> {
    let data = into_scope(data)?;
    let mut ctx = Context::new(engine, &program.blocks, data);
    let mut out = String::with_capacity(program.source.len());
    core::render_node(&program.root, &mut ctx, &mut out).map_err(|err| match &program.name {
        Some(name) => err.with_template_name(name.as_str()),
        None => err,
    })?;
    tracing::trace!(bytes = out.len(), "rendered template");
    Ok(out)
}

/// Render a compiled program with the given data to a writer.
pub(crate) fn to_writer<W>(
    engine: &Engine,
    program: &Program,
    data: Cow<'_, Value>,
    mut writer: W,
) -> Result<()>
where
    W: io::Write,
{
    let out = to_string(engine, program, data)?;
    writer.write_all(out.as_bytes())?;
    Ok(())
}

/// The render data becomes the scope directly above the builtins, so it must
/// be a map. No data at all is an empty scope.
fn into_scope(data: Cow<'_, Value>) -> Result<Cow<'_, Map<String, Value>>> {
    match data {
        Cow::Borrowed(Value::Map(map)) => Ok(Cow::Borrowed(map)),
        Cow::Owned(Value::Map(map)) => Ok(Cow::Owned(map)),
        Cow::Borrowed(Value::None | Value::Undefined) | Cow::Owned(Value::None | Value::Undefined) => {
            Ok(Cow::Owned(Map::new()))
        }
        data => Err(Error::new(
            ErrorKind::Data,
            format!("render data must be a map, found {}", data.human()),
        )),
    }
}
