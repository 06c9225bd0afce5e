//! Parsing of literal values: numbers, strings, booleans, none, lists,
//! tuples and dicts.

use crate::value::Map;
use crate::Value;

/// Returned when the text is not a complete literal. The caller falls back to
/// treating it as a variable or a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotALiteral;

type Result<T> = std::result::Result<T, NotALiteral>;

/// The deepest a list, tuple or dict literal may nest.
const MAX_NESTING: usize = 128;

/// Parses `s` as a literal.
///
/// The whole string must be consumed. A top-level comma sequence such as
/// `1, 2` is a tuple and becomes a list.
pub fn parse(s: &str) -> Result<Value> {
    let mut p = Parser {
        src: s,
        pos: 0,
        depth: 0,
    };
    let value = p.parse_sequence(None)?;
    p.skip_ws();
    if p.pos != s.len() {
        return Err(NotALiteral);
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// Parses `item (',' item)* [',']`, stopping at `close` or the end of the
    /// input. Returns a single item unwrapped unless a comma was seen.
    fn parse_sequence(&mut self, close: Option<char>) -> Result<Value> {
        let mut items = Vec::new();
        let mut comma = false;
        loop {
            self.skip_ws();
            if self.peek().is_none() || self.peek() == close {
                break;
            }
            items.push(self.parse_item()?);
            if self.eat(',') {
                comma = true;
            } else {
                break;
            }
        }
        if !comma && items.len() == 1 {
            return Ok(items.remove(0));
        }
        if items.is_empty() && close.is_none() {
            return Err(NotALiteral);
        }
        Ok(Value::List(items))
    }

    fn parse_item(&mut self) -> Result<Value> {
        self.skip_ws();
        match self.peek().ok_or(NotALiteral)? {
            '\'' | '"' => self.parse_string(),
            open @ ('[' | '(' | '{') => {
                if self.depth == MAX_NESTING {
                    return Err(NotALiteral);
                }
                self.bump();
                self.depth += 1;
                let value = self.parse_nested(open)?;
                self.depth -= 1;
                Ok(value)
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.parse_number(),
            _ => self.parse_constant(),
        }
    }

    fn parse_nested(&mut self, open: char) -> Result<Value> {
        match open {
            '[' => Ok(Value::List(self.parse_list_items(']')?)),
            '(' => {
                let value = self.parse_sequence(Some(')'))?;
                if !self.eat(')') {
                    return Err(NotALiteral);
                }
                Ok(value)
            }
            _ => self.parse_dict(),
        }
    }

    fn parse_list_items(&mut self, close: char) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.parse_item()?);
            if !self.eat(',') {
                return if self.eat(close) {
                    Ok(items)
                } else {
                    Err(NotALiteral)
                };
            }
        }
    }

    fn parse_dict(&mut self) -> Result<Value> {
        let mut map = Map::new();
        loop {
            if self.eat('}') {
                return Ok(Value::Map(map));
            }
            let key = match self.parse_item()? {
                Value::String(s) => s,
                Value::Integer(i) => i.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err(NotALiteral),
            };
            if !self.eat(':') {
                return Err(NotALiteral);
            }
            let value = self.parse_item()?;
            map.insert(key, value);
            if !self.eat(',') {
                return if self.eat('}') {
                    Ok(Value::Map(map))
                } else {
                    Err(NotALiteral)
                };
            }
        }
    }

    fn parse_string(&mut self) -> Result<Value> {
        let quote = self.bump().ok_or(NotALiteral)?;
        let mut string = String::new();
        loop {
            match self.bump().ok_or(NotALiteral)? {
                c if c == quote => return Ok(Value::String(string)),
                '\\' => {
                    let c = match self.bump().ok_or(NotALiteral)? {
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        '0' => '\0',
                        '\\' => '\\',
                        '\'' => '\'',
                        '"' => '"',
                        c => {
                            string.push('\\');
                            c
                        }
                    };
                    string.push(c);
                }
                c => string.push(c),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;
        let negative = match self.peek() {
            Some('-') => {
                self.bump();
                true
            }
            Some('+') => {
                self.bump();
                false
            }
            _ => false,
        };
        let digits_start = self.pos;
        while let Some(c) = self.peek() {
            let exponent_sign = (c == '-' || c == '+')
                && matches!(self.src[..self.pos].chars().last(), Some('e' | 'E'))
                && !self.src[digits_start..self.pos].starts_with("0x");
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign {
                self.bump();
            } else {
                break;
            }
        }
        let raw = &self.src[digits_start..self.pos];
        if raw.is_empty() {
            self.pos = start;
            return Err(NotALiteral);
        }
        parse_integer(raw, negative)
            .or_else(|| parse_float(raw, negative))
            .ok_or(NotALiteral)
    }

    fn parse_constant(&mut self) -> Result<Value> {
        let word: &str = self
            .rest()
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .next()
            .unwrap_or_default();
        let value = match word {
            "True" | "true" => Value::Bool(true),
            "False" | "false" => Value::Bool(false),
            "None" | "none" | "null" => Value::None,
            _ => return Err(NotALiteral),
        };
        self.pos += word.len();
        Ok(value)
    }
}

fn parse_integer(raw: &str, negative: bool) -> Option<Value> {
    let digits = raw.as_bytes();
    let (i, radix) = match digits {
        [b'0', b'b' | b'B', ..] => (2, 2),
        [b'0', b'o' | b'O', ..] => (2, 8),
        [b'0', b'x' | b'X', ..] => (2, 16),
        _ => (0, 10),
    };
    if digits.len() == i || digits.ends_with(b"_") {
        return None;
    }
    let int = digits[i..]
        .iter()
        .filter(|&&d| d != b'_')
        .try_fold(0i64, |acc, &d| {
            let x = (d as char).to_digit(radix)?;
            let value = acc.checked_mul(radix.into())?;
            if negative {
                value.checked_sub(x.into())
            } else {
                value.checked_add(x.into())
            }
        })?;
    Some(Value::Integer(int))
}

fn parse_float(raw: &str, negative: bool) -> Option<Value> {
    if !raw.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let float: f64 = raw.replace('_', "").parse().ok()?;
    if !float.is_finite() {
        return None;
    }
    Some(Value::Float(if negative { -float } else { float }))
}
