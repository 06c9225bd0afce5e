//! Splitting of tag content on separators that are not inside a quoted
//! string or a bracketed group.

use regex::Regex;

/// Returns a copy of `s` where the content of every quoted string and
/// bracketed group is replaced with underscores.
///
/// The result has the same byte length as `s` so that offsets found in the
/// masked string can be used to slice the original.
pub fn mask(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut depth = 0usize;

    for c in s.chars() {
        let hidden = match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                    true
                } else if c == '\\' {
                    escaped = true;
                    true
                } else if c == q {
                    quote = None;
                    depth > 0
                } else {
                    true
                }
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    depth > 0
                }
                '(' | '[' | '{' => {
                    depth += 1;
                    depth > 1
                }
                ')' | ']' | '}' if depth > 0 => {
                    depth -= 1;
                    depth > 0
                }
                _ => depth > 0,
            },
        };
        if hidden {
            out.extend(std::iter::repeat('_').take(c.len_utf8()));
        } else {
            out.push(c);
        }
    }
    out
}

/// Splits `s` on every match of `sep` outside quotes and brackets. Chunks are
/// trimmed.
pub fn split<'a>(s: &'a str, sep: &Regex) -> Vec<&'a str> {
    let masked = mask(s);
    let mut chunks = Vec::new();
    let mut start = 0;
    for m in sep.find_iter(&masked) {
        chunks.push(s[start..m.start()].trim());
        start = m.end();
    }
    chunks.push(s[start..].trim());
    chunks
}

/// Like [`split`] but also returns the separators as chunks of their own.
pub fn split_keep<'a>(s: &'a str, sep: &Regex) -> Vec<&'a str> {
    let masked = mask(s);
    let mut chunks = Vec::new();
    let mut start = 0;
    for m in sep.find_iter(&masked) {
        chunks.push(s[start..m.start()].trim());
        chunks.push(&s[m.start()..m.end()]);
        start = m.end();
    }
    chunks.push(s[start..].trim());
    chunks
}
