//! Callable values and the builtin functions every template can see.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::render::{render_super, Context};
use crate::types::delimiters::Delimiters;
use crate::value::Map;
use crate::Value;

type CallFn =
    dyn Fn(&mut Context<'_>, &[Value]) -> Result<Value, String> + Send + Sync + 'static;

/// A function that can be stored in the template data and called from a
/// template, e.g. `{{ greet("World") }}` or `{{ greet:"World" }}`.
///
/// A callable that resolves without arguments is still invoked, so
/// `{{ now }}` and `{{ now() }}` are equivalent.
///
/// # Examples
///
/// ```
/// use stencil::{Callable, Value};
///
/// let greet = Callable::new(|args: &[Value]| match args {
///     [name] => Ok(Value::from(format!("Hello {name}!"))),
///     _ => Err(String::from("expected one argument")),
/// });
///
/// let result = stencil::Engine::new()
///     .compile("{{ greet('World') }}")?
///     .render_from(&stencil::data! { greet: greet })?;
/// assert_eq!(result, "Hello World!");
/// # Ok::<(), stencil::Error>(())
/// ```
#[derive(Clone)]
pub struct Callable(Arc<CallFn>);

impl Callable {
    /// Wraps a function of the call arguments.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self::with_context(move |_, args| f(args))
    }

    /// Wraps a function that also receives the render [`Context`].
    pub fn with_context<F>(f: F) -> Self
    where
        F: Fn(&mut Context<'_>, &[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub(crate) fn call(&self, ctx: &mut Context<'_>, args: &[Value]) -> Result<Value, String> {
        (self.0)(ctx, args)
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable")
    }
}

/// The bottom scope of every render context.
pub(crate) static CORE: Lazy<Map<String, Value>> = Lazy::new(|| {
    let mut map = Map::new();
    map.insert("defined".into(), Value::Fn(Callable::with_context(defined)));
    map
});

/// Bound to `super` while a block body renders.
pub(crate) static SUPER: Lazy<Callable> = Lazy::new(|| {
    Callable::with_context(|ctx, _| render_super(ctx).map(Value::String).map_err(|e| e.to_string()))
});

/// Returns the engine-level builtins for the given delimiters.
pub(crate) fn defaults(delimiters: &Delimiters) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("delimiters".into(), Value::Map(delimiters.to_map()));
    #[cfg(feature = "builtins")]
    {
        map.insert("now".into(), Value::Fn(Callable::new(now)));
        map.insert("range".into(), Value::Fn(Callable::new(range)));
    }
    map
}

fn defined(ctx: &mut Context<'_>, args: &[Value]) -> Result<Value, String> {
    match args {
        [Value::String(path)] => Ok(Value::Bool(ctx.defined(path))),
        _ => Err(String::from("expected a single string argument")),
    }
}

#[cfg(feature = "builtins")]
pub(crate) use self::clock::now;

#[cfg(feature = "builtins")]
mod clock {
    use std::fmt;

    use chrono::format::{Item, StrftimeItems};
    use chrono::{Datelike, Local, Timelike};

    use crate::{Object, Value};

    /// A local timestamp exposed to templates as a record.
    #[derive(Debug)]
    pub(crate) struct DateTime(chrono::DateTime<Local>);

    impl fmt::Display for DateTime {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
        }
    }

    impl Object for DateTime {
        fn attr(&self, name: &str) -> Option<Value> {
            let dt = &self.0;
            let v = match name {
                "year" => Value::from(dt.year()),
                "month" => Value::from(dt.month()),
                "day" => Value::from(dt.day()),
                "hour" => Value::from(dt.hour()),
                "minute" => Value::from(dt.minute()),
                "second" => Value::from(dt.second()),
                "weekday" => Value::from(dt.format("%A").to_string()),
                "date" => Value::from(dt.format("%Y-%m-%d").to_string()),
                "time" => Value::from(dt.format("%H:%M:%S").to_string()),
                "timestamp" => Value::from(dt.timestamp()),
                _ => return None,
            };
            Some(v)
        }
    }

    /// `now()` returns the current local time, `now(fmt)` formats it with
    /// strftime-style specifiers.
    pub(crate) fn now(args: &[Value]) -> Result<Value, String> {
        let dt = Local::now();
        match args {
            [] => Ok(Value::object(DateTime(dt))),
            [Value::String(fmt)] => {
                let items: Vec<_> = StrftimeItems::new(fmt).collect();
                if items.iter().any(|i| matches!(i, Item::Error)) {
                    return Err(format!("invalid format string '{fmt}'"));
                }
                Ok(Value::from(dt.format_with_items(items.into_iter()).to_string()))
            }
            _ => Err(String::from("expected an optional format string")),
        }
    }
}

#[cfg(feature = "builtins")]
const MAX_RANGE: i64 = 1_000_000;

/// `range(stop)`, `range(start, stop)` or `range(start, stop, step)`.
#[cfg(feature = "builtins")]
fn range(args: &[Value]) -> Result<Value, String> {
    let ints = args
        .iter()
        .map(|a| match a {
            Value::Integer(i) => Ok(*i),
            v => Err(format!("expected integer argument, found {}", v.human())),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let (start, stop, step) = match ints[..] {
        [stop] => (0, stop, 1),
        [start, stop] => (start, stop, 1),
        [start, stop, step] => (start, stop, step),
        _ => return Err(format!("expected 1 to 3 arguments, found {}", ints.len())),
    };
    if step == 0 {
        return Err(String::from("step must not be zero"));
    }
    let (a, b, s) = (i128::from(start), i128::from(stop), i128::from(step));
    let len = if s > 0 {
        ((b - a).max(0) + s - 1) / s
    } else {
        ((a - b).max(0) - s - 1) / -s
    };
    if len > i128::from(MAX_RANGE) {
        return Err(format!("range of {len} items is too large"));
    }
    Ok((0..len as i64).map(|i| start + i * step).collect())
}

#[cfg(all(test, feature = "builtins"))]
mod tests {
    use super::*;

    fn ints(v: Value) -> Vec<i64> {
        match v {
            Value::List(l) => l
                .into_iter()
                .map(|v| match v {
                    Value::Integer(i) => i,
                    v => panic!("unexpected {v:?}"),
                })
                .collect(),
            v => panic!("unexpected {v:?}"),
        }
    }

    #[test]
    fn range_forms() {
        assert_eq!(ints(range(&[Value::from(3)]).unwrap()), [0, 1, 2]);
        assert_eq!(ints(range(&[Value::from(2), Value::from(5)]).unwrap()), [2, 3, 4]);
        assert_eq!(
            ints(range(&[Value::from(10), Value::from(0), Value::from(-3)]).unwrap()),
            [10, 7, 4, 1]
        );
        assert!(ints(range(&[Value::from(-2)]).unwrap()).is_empty());
    }

    #[test]
    fn range_errors() {
        assert!(range(&[]).is_err());
        assert!(range(&[Value::from(0), Value::from(1), Value::from(0)]).is_err());
        assert!(range(&[Value::from("a")]).is_err());
    }

    #[test]
    fn now_formats() {
        let year = now(&[Value::from("%Y")]).unwrap();
        assert_eq!(year.as_str().map(str::len), Some(4));
        assert!(now(&[Value::from("%Q")]).is_err());
    }
}
