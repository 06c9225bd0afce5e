//! Defines the [`Value`] enum, representing any valid renderable data.

mod from;
#[cfg(feature = "serde")]
mod ser;

pub use std::collections::BTreeMap as Map;
use std::fmt;
use std::sync::Arc;
pub use std::vec::Vec as List;

#[cfg(feature = "serde")]
pub use crate::value::ser::to_value;
use crate::functions::Callable;

/// Data to be rendered represented as a recursive enum.
///
/// Maps and lists are the *mapping-like* values that path segments index
/// into; [`Object`] is the *record-like* capability whose attributes are
/// looked up by name; [`Value::Fn`] is invoked when an expression resolves to
/// it.
#[derive(Clone)]
pub enum Value {
    /// The result of a failed variable lookup.
    ///
    /// Renders as an empty string, is falsy, has zero length, contains
    /// nothing, iterates to nothing and is not equal to anything, including
    /// itself.
    Undefined,
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(List<Value>),
    Map(Map<String, Value>),
    Object(Arc<dyn Object>),
    Fn(Callable),
}

/// A record-like value whose fields are resolved by attribute name.
///
/// Template paths such as `{{ today.year }}` first try a mapping-style lookup
/// and fall back to [`Object::attr`].
///
/// # Examples
///
/// ```
/// use std::fmt;
/// use std::sync::Arc;
/// use stencil::{Object, Value};
///
/// #[derive(Debug)]
/// struct Point { x: i64, y: i64 }
///
/// impl fmt::Display for Point {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "({}, {})", self.x, self.y)
///     }
/// }
///
/// impl Object for Point {
///     fn attr(&self, name: &str) -> Option<Value> {
///         match name {
///             "x" => Some(Value::from(self.x)),
///             "y" => Some(Value::from(self.y)),
///             _ => None,
///         }
///     }
/// }
///
/// let result = stencil::Engine::new()
///     .compile("{{ p.x }}/{{ p.y }} {{ p }}")?
///     .render_from(&stencil::data! { p: Value::object(Point { x: 1, y: 2 }) })?;
/// assert_eq!(result, "1/2 (1, 2)");
/// # Ok::<(), stencil::Error>(())
/// ```
pub trait Object: fmt::Debug + fmt::Display + Send + Sync {
    /// Returns the attribute with the given name.
    fn attr(&self, name: &str) -> Option<Value>;

    /// Whether the object is truthy in a condition.
    fn is_truthy(&self) -> bool {
        true
    }
}

impl Value {
    /// Wraps a record-like object.
    pub fn object<T>(obj: T) -> Self
    where
        T: Object + 'static,
    {
        Self::Object(Arc::new(obj))
    }

    /// Returns `true` if this is the [`Value::Undefined`] sentinel.
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns the string if this is a [`Value::String`].
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::None
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, _) | (_, Self::Undefined) => false,
            (Self::None, Self::None) => true,
            (Self::Bool(s), Self::Bool(o)) => s == o,
            (Self::Integer(s), Self::Integer(o)) => s == o,
            (Self::Float(s), Self::Float(o)) => s == o,
            (Self::Integer(s), Self::Float(o)) | (Self::Float(o), Self::Integer(s)) => {
                (*s as f64) == *o
            }
            (Self::String(s), Self::String(o)) => s == o,
            (Self::List(s), Self::List(o)) => s == o,
            (Self::Map(s), Self::Map(o)) => s == o,
            (Self::Object(s), Self::Object(o)) => Arc::ptr_eq(s, o),
            (Self::Fn(s), Self::Fn(o)) => s.ptr_eq(o),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("Undefined"),
            Self::None => f.write_str("None"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Integer(i) => f.debug_tuple("Integer").field(i).finish(),
            Self::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::List(l) => f.debug_tuple("List").field(l).finish(),
            Self::Map(m) => f.debug_tuple("Map").field(m).finish(),
            Self::Object(o) => f.debug_tuple("Object").field(o).finish(),
            Self::Fn(_) => f.write_str("Fn(..)"),
        }
    }
}

/// Formats the value the way it is printed by `{{ ... }}`.
///
/// - [`Value::Undefined`] and [`Value::None`]: empty string
/// - [`Value::Bool`]: `true` or `false`
/// - [`Value::Integer`] and [`Value::Float`]: using [`Display`][fmt::Display]
/// - [`Value::String`]: the string, unescaped
/// - [`Value::List`] and [`Value::Map`]: a literal-like representation, e.g.
///   `[1, 'two']`
/// - [`Value::Object`]: using the object's [`Display`][fmt::Display]
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined | Self::None => Ok(()),
            Self::String(s) => f.write_str(s),
            Self::Object(o) => write!(f, "{o}"),
            v => v.fmt_repr(f),
        }
    }
}

impl Value {
    fn fmt_repr(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => Ok(()),
            Self::None => f.write_str("None"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Self::List(list) => {
                f.write_str("[")?;
                for (i, v) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    v.fmt_repr(f)?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{k}': ")?;
                    v.fmt_repr(f)?;
                }
                f.write_str("}")
            }
            Self::Object(o) => write!(f, "{o}"),
            Self::Fn(_) => f.write_str("<callable>"),
        }
    }

    /// Returns a literal-like representation used in error messages.
    pub(crate) fn repr(&self) -> String {
        struct Repr<'a>(&'a Value);
        impl fmt::Display for Repr<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt_repr(f)
            }
        }
        Repr(self).to_string()
    }
}
