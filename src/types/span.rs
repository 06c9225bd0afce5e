//! Defines a [`Span`] which is used to represent a region in the template
//! source code.

use std::ops::{Index, Range};

/// A byte range in a template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub m: usize,
    pub n: usize,
}

impl Span {
    pub const fn new(m: usize, n: usize) -> Self {
        Self { m, n }
    }
}

impl Index<Span> for str {
    type Output = str;

    fn index(&self, span: Span) -> &Self::Output {
        &self[span.m..span.n]
    }
}

impl From<Range<usize>> for Span {
    fn from(r: Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.m..span.n
    }
}
