use crate::value::Map;
use crate::Value;

/// The template delimiter configuration.
///
/// Use [`Delimiters::default()`] to get the default configuration and
/// [`Delimiters::builder()`] to create a custom one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub(crate) print: (String, String),
    pub(crate) eprint: (String, String),
    pub(crate) syntax: (String, String),
    pub(crate) comment: (String, String),
}

/// A builder for the delimiter configuration.
///
/// This struct is typically created using [`Delimiters::builder()`]. Any pair
/// that is not set keeps its default value.
#[derive(Debug, Clone)]
pub struct DelimitersBuilder {
    inner: Delimiters,
}

impl Default for Delimiters {
    /// Returns the default delimiter configuration.
    ///
    /// This is equivalent to the following.
    /// ```
    /// use stencil::Delimiters;
    ///
    /// let delimiters = Delimiters::builder()
    ///     .print("{{", "}}")
    ///     .escaped_print("{{{", "}}}")
    ///     .syntax("{%", "%}")
    ///     .comment("{#", "#}")
    ///     .build();
    /// assert_eq!(delimiters, Delimiters::default());
    /// ```
    #[inline]
    fn default() -> Self {
        Self {
            print: pair("{{", "}}"),
            eprint: pair("{{{", "}}}"),
            syntax: pair("{%", "%}"),
            comment: pair("{#", "#}"),
        }
    }
}

fn pair(start: &str, end: &str) -> (String, String) {
    (start.to_owned(), end.to_owned())
}

impl Delimiters {
    /// Create a new delimiter builder.
    ///
    /// # Examples
    ///
    /// ```
    /// let delimiters = stencil::Delimiters::builder()
    ///     .print("<<", ">>")
    ///     .syntax("<%", "%>")
    ///     .build();
    /// ```
    #[inline]
    pub fn builder() -> DelimitersBuilder {
        DelimitersBuilder::new()
    }

    /// The start and end of a print tag, e.g. `{{ name }}`.
    pub fn print(&self) -> (&str, &str) {
        (&self.print.0, &self.print.1)
    }

    /// The start and end of an escaped print tag, e.g. `{{{ name }}}`.
    pub fn escaped_print(&self) -> (&str, &str) {
        (&self.eprint.0, &self.eprint.1)
    }

    /// The start and end of a syntax tag, e.g. `{% if cond %}`.
    pub fn syntax(&self) -> (&str, &str) {
        (&self.syntax.0, &self.syntax.1)
    }

    /// The start and end of a comment, e.g. `{# note #}`.
    pub fn comment(&self) -> (&str, &str) {
        (&self.comment.0, &self.comment.1)
    }

    /// Returns the eight delimiter strings keyed by name, as exposed to
    /// templates through the `delimiters` builtin.
    pub(crate) fn to_map(&self) -> Map<String, Value> {
        [
            ("print_start", &self.print.0),
            ("print_end", &self.print.1),
            ("eprint_start", &self.eprint.0),
            ("eprint_end", &self.eprint.1),
            ("syntax_start", &self.syntax.0),
            ("syntax_end", &self.syntax.1),
            ("comment_start", &self.comment.0),
            ("comment_end", &self.comment.1),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), Value::from(v.as_str())))
        .collect()
    }
}

impl DelimitersBuilder {
    /// Creates a new builder starting from the default delimiters.
    #[inline]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            inner: Delimiters::default(),
        }
    }

    /// Set the print delimiters.
    ///
    /// # Panics
    ///
    /// If either of the strings are empty.
    #[inline]
    pub fn print(&mut self, start: &str, end: &str) -> &mut Self {
        assert!(!start.is_empty() && !end.is_empty());
        self.inner.print = pair(start, end);
        self
    }

    /// Set the escaped print delimiters.
    ///
    /// # Panics
    ///
    /// If either of the strings are empty.
    #[inline]
    pub fn escaped_print(&mut self, start: &str, end: &str) -> &mut Self {
        assert!(!start.is_empty() && !end.is_empty());
        self.inner.eprint = pair(start, end);
        self
    }

    /// Set the syntax tag delimiters.
    ///
    /// # Panics
    ///
    /// If either of the strings are empty.
    #[inline]
    pub fn syntax(&mut self, start: &str, end: &str) -> &mut Self {
        assert!(!start.is_empty() && !end.is_empty());
        self.inner.syntax = pair(start, end);
        self
    }

    /// Set the comment delimiters.
    ///
    /// # Panics
    ///
    /// If either of the strings are empty.
    #[inline]
    pub fn comment(&mut self, start: &str, end: &str) -> &mut Self {
        assert!(!start.is_empty() && !end.is_empty());
        self.inner.comment = pair(start, end);
        self
    }

    /// Builds the delimiter configuration.
    pub fn build(&self) -> Delimiters {
        self.inner.clone()
    }
}
