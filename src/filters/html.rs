use once_cell::sync::Lazy;
use regex::Regex;

static BETWEEN_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r">\s+<").unwrap());

/// Escapes the characters that are significant in HTML.
pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// Removes whitespace between HTML tags.
pub(crate) fn spaceless(s: &str) -> String {
    BETWEEN_TAGS.replace_all(s, "><").into_owned()
}
