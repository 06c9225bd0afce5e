use std::cmp::max;
use std::fmt;
use std::io;

use crate::types::span::Span;

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A loader located a template but could not read it.
    Load,
    /// A loader exhausted all candidate names.
    TemplateNotFound,
    /// An unmatched, mismatched or unterminated block tag.
    Nesting,
    /// A syntax tag that is not a registered opening or closing tag.
    InvalidTag,
    /// A filter name that is not registered on the engine.
    InvalidFilter,
    /// A malformed tag body or an unparsable argument.
    Syntax,
    /// A callable value failed when invoked.
    Call,
    /// A filter function failed when applied.
    Filter,
    /// A for-loop could not destructure an item into its loop variables.
    Unpacking,
    /// A failure while rendering that is not covered by another kind, for
    /// example exceeding the maximum include depth or an IO error.
    Render,
    /// The render data could not be converted into a [`Value`][crate::Value].
    Data,
}

/// An error that can occur during template compilation or rendering.
#[derive(Clone)]
pub struct Error {
    kind: ErrorKind,
    msg: String,
    span: Option<(String, Span)>,
    name: Option<String>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
            span: None,
            name: None,
        }
    }

    /// Constructs an error that points at a region of the template source.
    pub(crate) fn span(
        kind: ErrorKind,
        msg: impl Into<String>,
        source: &str,
        span: impl Into<Span>,
    ) -> Self {
        assert!(!source.is_empty(), "source must be populated");
        Self {
            kind,
            msg: msg.into(),
            span: Some((source.to_owned(), span.into())),
            name: None,
        }
    }

    pub(crate) fn syntax(msg: impl Into<String>, source: &str, span: impl Into<Span>) -> Self {
        Self::span(ErrorKind::Syntax, msg, source, span)
    }

    pub(crate) fn not_found(names: &[&str]) -> Self {
        Self::new(
            ErrorKind::TemplateNotFound,
            format!("template not found: [{}]", names.join(", ")),
        )
    }

    /// Attaches the source location if the error does not have one yet.
    pub(crate) fn enrich(mut self, source: &str, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some((source.to_owned(), span));
        }
        self
    }

    /// Attaches the name of the template the error occurred in.
    pub(crate) fn with_template_name(mut self, name: impl Into<String>) -> Self {
        if self.name.is_none() {
            self.name = Some(name.into());
        }
        self
    }

    /// Returns the category of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message without any source location.
    #[inline]
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the name of the template the error occurred in, if known.
    #[inline]
    pub fn template_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: fmt::Display,
    {
        Self::new(ErrorKind::Data, msg.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::new(ErrorKind::Render, format!("io error: {err}"))
    }
}

impl std::error::Error for Error {}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) => fmt_pretty(&self.msg, self.name.as_deref(), source, *span, f),
            None => write!(f, "{:?}: {}", self.kind, self.msg),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) => {
                if f.alternate() {
                    fmt_pretty(&self.msg, self.name.as_deref(), source, *span, f)
                } else {
                    write!(f, "{} between bytes {} and {}", self.msg, span.m, span.n)
                }
            }
            None => write!(f, "{}", self.msg),
        }
    }
}

fn fmt_pretty(
    msg: &str,
    name: Option<&str>,
    source: &str,
    span: Span,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let lines: Vec<_> = source.split_terminator('\n').collect();
    let (line, col) = to_line_col(&lines, span.m);
    let width = max(1, str_width(&source[span]));
    let code = lines
        .get(line)
        .or_else(|| lines.last())
        .copied()
        .unwrap_or_default();

    let num = (line + 1).to_string();
    let pad = str_width(&num);
    let pipe = "|";
    let underline = "^".repeat(width);

    if let Some(name) = name {
        write!(f, "\n {0:pad$}--> {name}:{num}:{col}", "", col = col + 1)?;
    }

    write!(
        f,
        "\n \
        {0:pad$} {pipe}\n \
        {num:>} {pipe} {code}\n \
        {0:pad$} {pipe} {underline:>width$} {msg}\n",
        "",
        pad = pad,
        pipe = pipe,
        num = num,
        code = code,
        underline = underline,
        width = col + width,
        msg = msg
    )
}

fn to_line_col(lines: &[&str], offset: usize) -> (usize, usize) {
    let mut n = 0;
    for (i, line) in lines.iter().enumerate() {
        let len = line.len() + 1;
        if n + len > offset {
            return (i, str_width(&line[..offset - n]));
        }
        n += len;
    }
    (
        lines.len().saturating_sub(1),
        lines.last().map(|l| str_width(l)).unwrap_or(0),
    )
}

#[cfg(feature = "unicode")]
fn str_width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(not(feature = "unicode"))]
fn str_width(s: &str) -> usize {
    s.chars().count()
}
