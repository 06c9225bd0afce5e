mod args;
#[cfg(feature = "builtins")]
mod builtins;
mod html;

use std::fmt::Display;
use std::sync::Arc;

pub(crate) use crate::filters::html::{escape, spaceless};
use crate::Value;

pub type FilterFn =
    dyn Fn(Value, &[Value]) -> std::result::Result<Value, String> + Send + Sync + 'static;

pub fn new<F, R, A>(f: F) -> Arc<FilterFn>
where
    F: Filter<R, A> + Send + Sync + 'static,
    R: FilterReturn,
    A: FilterArgs,
{
    Arc::new(move |value: Value, args: &[Value]| {
        let args = A::from_args(value, args)?;
        Filter::filter(&f, args).to_value()
    })
}

/// Returns the filters every engine starts with.
pub(crate) fn defaults() -> Vec<(&'static str, Arc<FilterFn>)> {
    #[allow(unused_mut)]
    let mut filters = vec![
        ("escape", new(|s: Value| escape(&s.to_string()))),
        ("spaceless", new(|s: Value| spaceless(&s.to_string()))),
    ];
    #[cfg(feature = "builtins")]
    filters.extend(builtins::all());
    filters
}

/// Represents any filter function.
///
/// This trait is used by the [`Engine::add_filter`][crate::Engine::add_filter]
/// method to abstract over a variety of function and closure types. This
/// includes filters with variable argument types, return types and arity. The
/// first argument to a filter function will always receive the piped value or
/// expression. It can then have up to four more arguments. Arguments are
/// literals written after the filter name, e.g. `truncate(10, '...')` or
/// `truncate:10:'...'`, and are checked against the function signature when
/// the filter is applied. Trailing arguments of type [`Option`] may be
/// omitted.
///
/// [`Filter`] is implemented for functions that return any of the following
/// types.
///
/// - `R` where `R` implements `Into<Value>`
/// - `Option<R>` where `R` implements `Into<Value>`
/// - `Result<R, E>` where `R` implements `Into<Value>` and `E` implements
///   [`Display`]
///
/// [`Filter`] is implemented for functions that take any of the following
/// types as arguments.
/// - [`bool`]
/// - [`i64`] and the other integer types
/// - [`f64`]
/// - [`String`]
/// - [`Vec<Value>`]
/// - [`BTreeMap<String, Value>`][std::collections::BTreeMap]
/// - [`Value`]
/// - [`Option<T>`] where `T` is one of the above
///
/// ## Examples
///
/// Consider the following template.
///
/// ```text
/// {{ user.name | split:" " | last }}
/// ```
///
/// We could implement the `split` filter like this:
///
/// ```rust
/// use stencil::{Engine, Value};
///
/// let mut engine = Engine::new();
/// engine.add_filter("split", split);
///
/// fn split(s: String, sep: String) -> Vec<String> {
///     s.split(sep.as_str()).map(String::from).collect()
/// }
/// ```
pub trait Filter<R, A>
where
    A: FilterArgs,
{
    #[doc(hidden)]
    fn filter(&self, args: A) -> R;
}

pub trait FilterArgs: Sized {
    fn from_args(value: Value, args: &[Value]) -> std::result::Result<Self, String>;
}

pub trait FilterArg: Sized {
    fn from_value(v: Value) -> args::Result<Self>;

    /// The value used when the argument is omitted, if it may be.
    fn missing() -> Option<Self> {
        None
    }
}

pub trait FilterReturn {
    fn to_value(self) -> std::result::Result<Value, String>;
}

////////////////////////////////////////////////////////////////////////////////
// Filter and FilterArgs
////////////////////////////////////////////////////////////////////////////////

macro_rules! impl_filter {
    ($n:literal; $($arg:ident $val:ident)*) => {
        impl<Func, R, V, $($arg,)*> Filter<R, (V, $($arg,)*)> for Func
        where
            Func: Fn(V, $($arg,)*) -> R,
            R: FilterReturn,
            V: FilterArg,
            $($arg: FilterArg,)*
        {
            #[doc(hidden)]
            fn filter(&self, (v, $($val,)*): (V, $($arg,)*)) -> R {
                self(v, $($val,)*)
            }
        }

        impl<V, $($arg,)*> FilterArgs for (V, $($arg,)*)
        where
            V: FilterArg,
            $($arg: FilterArg,)*
        {
            #[allow(unused_mut, unused_variables)]
            fn from_args(value: Value, args: &[Value]) -> std::result::Result<Self, String> {
                if args.len() > $n {
                    return Err(expected_args($n, args.len()));
                }
                let v = V::from_value(value).map_err(|e| e.describe("value"))?;
                let mut iter = args.iter().cloned();
                $(
                    let $val = match iter.next() {
                        Some(arg) => $arg::from_value(arg).map_err(|e| e.describe("argument"))?,
                        None => $arg::missing().ok_or_else(|| expected_args($n, args.len()))?,
                    };
                )*
                Ok((v, $($val,)*))
            }
        }
    };
}

impl_filter! { 0; }
impl_filter! { 1; A a }
impl_filter! { 2; A a B b }
impl_filter! { 3; A a B b C c }
impl_filter! { 4; A a B b C c D d }

fn expected_args(exp: usize, got: usize) -> String {
    format!("filter expected {exp} arguments, found {got}")
}

////////////////////////////////////////////////////////////////////////////////
// FilterReturn
////////////////////////////////////////////////////////////////////////////////

impl<T> FilterReturn for T
where
    T: Into<Value>,
{
    fn to_value(self) -> std::result::Result<Value, String> {
        Ok(self.into())
    }
}

impl<T, E> FilterReturn for std::result::Result<T, E>
where
    T: Into<Value>,
    E: Display,
{
    fn to_value(self) -> std::result::Result<Value, String> {
        self.map(Into::into).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_is_checked() {
        let f = new(|s: String, n: i64| s.repeat(n as usize));
        assert_eq!(f(Value::from("ab"), &[Value::from(2)]), Ok(Value::from("abab")));
        assert_eq!(
            f(Value::from("ab"), &[]),
            Err(String::from("filter expected 1 arguments, found 0"))
        );
        assert!(f(Value::from("ab"), &[Value::from(1), Value::from(2)]).is_err());
    }

    #[test]
    fn optional_trailing_argument() {
        let f = new(|s: String, sep: Option<String>| format!("{s}{}", sep.unwrap_or_default()));
        assert_eq!(f(Value::from("a"), &[]), Ok(Value::from("a")));
        assert_eq!(f(Value::from("a"), &[Value::from("!")]), Ok(Value::from("a!")));
    }

    #[test]
    fn type_mismatch() {
        let f = new(|n: i64| n + 1);
        assert_eq!(
            f(Value::from("x"), &[]),
            Err(String::from("filter expected integer value, found string"))
        );
    }
}
