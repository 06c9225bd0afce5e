//! Builtin filters.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use chrono::{Local, TimeZone};
use rand::seq::SliceRandom;

use crate::filters::{new, FilterFn};
use crate::Value;

pub(crate) fn all() -> Vec<(&'static str, Arc<FilterFn>)> {
    vec![
        ("default", new(default)),
        ("random", new(random)),
        ("first", new(first)),
        ("last", new(last)),
        ("len", new(len)),
        ("lower", new(lower)),
        ("upper", new(upper)),
        ("title", new(title)),
        ("join", new(join)),
        ("reversed", new(reversed)),
        ("items", new(items)),
        ("pluralize", new(pluralize)),
        ("truncatechars", new(truncatechars)),
        ("truncatewords", new(truncatewords)),
        ("startswith", new(startswith)),
        ("endswith", new(endswith)),
        ("even", new(even)),
        ("odd", new(odd)),
        ("wrap", new(wrap)),
        ("dtformat", new(dtformat)),
    ]
}

/// Returns the value if it is truthy, otherwise the fallback.
fn default(value: Value, fallback: Value) -> Value {
    if value.is_truthy() {
        value
    } else {
        fallback
    }
}

/// Returns a random item from a list or a random character from a string.
fn random(value: Value) -> Result<Value, String> {
    let items = value
        .iterate()
        .ok_or_else(|| format!("cannot choose from {}", value.human()))?;
    items
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or_else(|| String::from("cannot choose from an empty sequence"))
}

fn first(value: Value) -> Result<Option<Value>, String> {
    let items = value
        .iterate()
        .ok_or_else(|| format!("unsupported value `{}`", value.human()))?;
    Ok(items.into_iter().next())
}

fn last(value: Value) -> Result<Option<Value>, String> {
    let items = value
        .iterate()
        .ok_or_else(|| format!("unsupported value `{}`", value.human()))?;
    Ok(items.into_iter().last())
}

/// Returns the number of characters, items or entries.
fn len(value: Value) -> Result<usize, String> {
    value
        .length()
        .ok_or_else(|| format!("value of type {} has no length", value.human()))
}

fn lower(s: String) -> String {
    s.to_lowercase()
}

fn upper(s: String) -> String {
    s.to_uppercase()
}

/// Capitalizes the first letter of every word.
fn title(s: String) -> String {
    let mut out = String::with_capacity(s.len());
    let mut start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            start = false;
        } else {
            out.push(c);
            start = true;
        }
    }
    out
}

/// Joins the items of a list, separated by `sep` which defaults to nothing.
fn join(list: Vec<Value>, sep: Option<String>) -> String {
    list.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(sep.as_deref().unwrap_or_default())
}

/// Reverses a list or string.
fn reversed(value: Value) -> Result<Value, String> {
    match value {
        Value::String(string) => Ok(Value::String(string.chars().rev().collect())),
        Value::List(list) => Ok(Value::List(list.into_iter().rev().collect())),
        value => Err(format!("unsupported value `{}`", value.human())),
    }
}

/// Returns the `[key, value]` pairs of a map, for `{% for k, v in map|items %}`.
fn items(map: BTreeMap<String, Value>) -> Vec<Value> {
    map.into_iter()
        .map(|(k, v)| Value::List(vec![Value::String(k), v]))
        .collect()
}

/// Returns `plural` unless the count (or the length of the list) is one, in
/// which case `singular` is returned.
fn pluralize(value: Value, plural: Option<String>, singular: Option<String>) -> Result<String, String> {
    let count = match &value {
        Value::Integer(i) => *i,
        Value::Float(f) => *f as i64,
        value => value
            .length()
            .map(|n| n as i64)
            .ok_or_else(|| format!("cannot count {}", value.human()))?,
    };
    if count == 1 {
        Ok(singular.unwrap_or_default())
    } else {
        Ok(plural.unwrap_or_else(|| String::from("s")))
    }
}

/// Truncates to `n` characters including the ellipsis.
fn truncatechars(s: String, n: usize, ellipsis: Option<String>) -> String {
    let ellipsis = ellipsis.unwrap_or_else(|| String::from("..."));
    if s.chars().count() <= n {
        return s;
    }
    let keep = n.saturating_sub(ellipsis.chars().count());
    let mut out: String = s.chars().take(keep).collect();
    out.push_str(&ellipsis);
    out
}

/// Truncates to `n` words, appending the ellipsis if anything was dropped.
fn truncatewords(s: String, n: usize, ellipsis: Option<String>) -> String {
    let words: Vec<&str> = s.split_whitespace().collect();
    if words.len() <= n {
        return s;
    }
    let mut out = words[..n].join(" ");
    out.push_str(ellipsis.as_deref().unwrap_or(" ..."));
    out
}

fn startswith(s: String, prefix: String) -> bool {
    s.starts_with(prefix.as_str())
}

fn endswith(s: String, suffix: String) -> bool {
    s.ends_with(suffix.as_str())
}

fn even(i: i64) -> bool {
    i % 2 == 0
}

fn odd(i: i64) -> bool {
    i % 2 != 0
}

/// Wraps the string in an HTML tag, e.g. `{{ name|wrap:'b' }}`.
fn wrap(s: Value, tag: String) -> String {
    format!("<{tag}>{s}</{tag}>")
}

/// Formats a timestamp or the result of `now()` with strftime-style
/// specifiers.
fn dtformat(value: Value, fmt: Option<String>) -> Result<String, String> {
    let timestamp = match &value {
        Value::Integer(ts) => *ts,
        Value::Object(obj) => match obj.attr("timestamp") {
            Some(Value::Integer(ts)) => ts,
            _ => return Err(String::from("object has no timestamp")),
        },
        value => return Err(format!("cannot format {} as a date", value.human())),
    };
    let dt = Local
        .timestamp_opt(timestamp, 0)
        .single()
        .ok_or_else(|| format!("invalid timestamp {timestamp}"))?;
    let fmt = fmt.as_deref().unwrap_or("%Y-%m-%d %H:%M:%S");
    let items: Vec<_> = StrftimeItems::new(fmt).collect();
    if items.iter().any(|i| matches!(i, Item::Error)) {
        return Err(format!("invalid format string '{fmt}'"));
    }
    Ok(dt.format_with_items(items.into_iter()).to_string())
}
