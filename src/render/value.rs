use std::borrow::Cow;
use std::cmp::Ordering;

use crate::Value;

impl Value {
    pub(crate) fn human(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
            Value::Fn(_) => "callable",
        }
    }

    /// Whether the value counts as true in a condition or an or-chain.
    pub(crate) fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::None => false,
            Value::Bool(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Map(m) => !m.is_empty(),
            Value::Object(o) => o.is_truthy(),
            Value::Fn(_) => true,
        }
    }

    /// Returns the items this value iterates over, or `None` if it is not
    /// iterable. Maps iterate over their keys and strings over their
    /// characters.
    pub(crate) fn iterate(&self) -> Option<Vec<Value>> {
        match self {
            Value::Undefined => Some(Vec::new()),
            Value::String(s) => Some(s.chars().map(Value::from).collect()),
            Value::List(l) => Some(l.clone()),
            Value::Map(m) => Some(m.keys().map(|k| Value::from(k.as_str())).collect()),
            _ => None,
        }
    }

    /// The number of items, `None` for values without a length.
    pub(crate) fn length(&self) -> Option<usize> {
        match self {
            Value::Undefined => Some(0),
            Value::String(s) => Some(s.chars().count()),
            Value::List(l) => Some(l.len()),
            Value::Map(m) => Some(m.len()),
            _ => None,
        }
    }

    /// Orders two values of compatible types.
    pub(crate) fn compare(&self, other: &Value) -> Result<Ordering, String> {
        let ord = match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b) {
                    match x.compare(y)? {
                        Ordering::Equal => continue,
                        ord => return Ok(ord),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            _ => None,
        };
        ord.ok_or_else(|| format!("cannot compare {} with {}", self.human(), other.human()))
    }

    /// Membership test backing the `in` and `not in` operators.
    pub(crate) fn contains(&self, item: &Value) -> Result<bool, String> {
        match (self, item) {
            (Value::Undefined, _) => Ok(false),
            (Value::String(s), Value::String(sub)) => Ok(s.contains(sub.as_str())),
            (Value::String(_), item) => Err(format!(
                "cannot search for {} in a string",
                item.human()
            )),
            (Value::List(l), item) => Ok(l.iter().any(|v| v == item)),
            (Value::Map(m), Value::String(k)) => Ok(m.contains_key(k)),
            (Value::Map(_), _) => Ok(false),
            (v, _) => Err(format!("argument of type {} is not iterable", v.human())),
        }
    }
}

/// Looks up one segment of a dotted path.
///
/// A mapping-style lookup (map key or list index) is tried first, then the
/// attribute of an [`Object`][crate::Object]. Borrowed values stay borrowed as
/// long as possible so only the final value is cloned.
pub(crate) fn lookup<'a>(value: Cow<'a, Value>, key: &str) -> Option<Cow<'a, Value>> {
    match value {
        Cow::Borrowed(v) => index(v, key)
            .map(Cow::Borrowed)
            .or_else(|| attr(v, key).map(Cow::Owned)),
        Cow::Owned(v) => index(&v, key)
            .cloned()
            .or_else(|| attr(&v, key))
            .map(Cow::Owned),
    }
}

fn index<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Map(map) => map.get(key),
        Value::List(list) => key.parse::<usize>().ok().and_then(|i| list.get(i)),
        _ => None,
    }
}

fn attr(value: &Value, key: &str) -> Option<Value> {
    match value {
        Value::Object(obj) => obj.attr(key),
        _ => None,
    }
}
