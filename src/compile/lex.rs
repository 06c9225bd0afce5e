use regex::{CaptureMatches, Regex};

use crate::types::delimiters::Delimiters;
use crate::types::span::Span;

/// Splits template source into text and tag tokens.
///
/// The lexer is built once per [`Engine`][crate::Engine] from its delimiters
/// as a single alternation, ordered so that the escaped print delimiters win
/// over the print delimiters when one is a prefix of the other.
#[derive(Debug, Clone)]
pub struct Lexer {
    re: Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Text,
    Print,
    EscapedPrint,
    Syntax,
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'source> {
    pub kind: TokenKind,
    /// The first word of a syntax tag.
    pub tag: Option<&'source str>,
    /// The trimmed text between the delimiters, or the raw text.
    pub content: &'source str,
    /// The span of the whole token including delimiters.
    pub span: Span,
}

impl Lexer {
    pub fn new(delimiters: &Delimiters) -> Self {
        let group = |name: &str, (start, end): (&str, &str)| {
            format!(
                "{}(?P<{name}>.*?){}",
                regex::escape(start),
                regex::escape(end)
            )
        };
        let mut groups = [
            (delimiters.escaped_print(), "eprint"),
            (delimiters.print(), "print"),
            (delimiters.syntax(), "syntax"),
            (delimiters.comment(), "comment"),
        ];
        // Longer start delimiters are tried first.
        groups.sort_by_key(|((start, _), _)| std::cmp::Reverse(start.len()));
        let pattern = groups
            .iter()
            .map(|(pair, name)| group(*name, *pair))
            .collect::<Vec<_>>()
            .join("|");
        let re = Regex::new(&format!("(?s){pattern}"))
            .expect("escaped delimiters always form a valid pattern");
        Self { re }
    }

    pub fn tokens<'s>(&self, source: &'s str) -> Tokens<'_, 's> {
        Tokens {
            source,
            matches: self.re.captures_iter(source),
            cursor: 0,
            pending: None,
        }
    }
}

/// An iterator over the tokens of a template. Comments and tokens with empty
/// content are skipped.
pub struct Tokens<'r, 's> {
    source: &'s str,
    matches: CaptureMatches<'r, 's>,
    cursor: usize,
    pending: Option<Token<'s>>,
}

impl<'s> Iterator for Tokens<'_, 's> {
    type Item = Token<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.take() {
                if token.kind != TokenKind::Comment && !token.content.is_empty() {
                    return Some(token);
                }
                continue;
            }

            let Some(caps) = self.matches.next() else {
                if self.cursor < self.source.len() {
                    let span = Span::new(self.cursor, self.source.len());
                    self.cursor = self.source.len();
                    return Some(text(self.source, span));
                }
                return None;
            };

            let whole = caps.get(0)?;
            let (kind, inner) = [
                ("eprint", TokenKind::EscapedPrint),
                ("print", TokenKind::Print),
                ("syntax", TokenKind::Syntax),
                ("comment", TokenKind::Comment),
            ]
            .into_iter()
            .find_map(|(name, kind)| caps.name(name).map(|m| (kind, m.as_str())))?;

            let content = inner.trim();
            let tag = match kind {
                TokenKind::Syntax => content.split_whitespace().next(),
                _ => None,
            };
            let before = Span::new(self.cursor, whole.start());
            self.cursor = whole.end();
            self.pending = Some(Token {
                kind,
                tag,
                content,
                span: Span::new(whole.start(), whole.end()),
            });
            if before.m < before.n {
                return Some(text(self.source, before));
            }
        }
    }
}

fn text(source: &str, span: Span) -> Token<'_> {
    Token {
        kind: TokenKind::Text,
        tag: None,
        content: &source[span],
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, &str)> {
        let lexer = Lexer::new(&Delimiters::default());
        lexer.tokens(source).map(|t| (t.kind, t.content)).collect()
    }

    #[test]
    fn lex_mixed() {
        assert_eq!(
            kinds("a {{ x }} b {% if y %}{{{ z }}}{# no #}{% endif %}"),
            [
                (TokenKind::Text, "a "),
                (TokenKind::Print, "x"),
                (TokenKind::Text, " b "),
                (TokenKind::Syntax, "if y"),
                (TokenKind::EscapedPrint, "z"),
                (TokenKind::Syntax, "endif"),
            ]
        );
    }

    #[test]
    fn lex_drops_empty_tags() {
        assert_eq!(kinds("{{ }}x{%%}"), [(TokenKind::Text, "x")]);
    }

    #[test]
    fn lex_tag_word() {
        let lexer = Lexer::new(&Delimiters::default());
        let token = lexer.tokens("{%  for x in y %}").next().unwrap();
        assert_eq!(token.tag, Some("for"));
        assert_eq!(token.span, Span::new(0, 17));
    }

    #[test]
    fn lex_unterminated_is_text() {
        for source in ["a {{ b", "x {% if y", "{# nope"] {
            assert_eq!(kinds(source), [(TokenKind::Text, source)], "{source:?}");
        }
        assert_eq!(
            kinds("{{ a }} {{ b"),
            [(TokenKind::Print, "a"), (TokenKind::Text, " {{ b")]
        );
    }

    #[test]
    fn lex_multiline_tag() {
        assert_eq!(kinds("{{\n  x\n}}"), [(TokenKind::Print, "x")]);
    }

    #[test]
    fn lex_custom_delimiters() {
        let delimiters = Delimiters::builder().print("<<", ">>").syntax("<%", "%>").build();
        let lexer = Lexer::new(&delimiters);
        let tokens: Vec<_> = lexer.tokens("<< a >>{{ b }}").map(|t| t.kind).collect();
        assert_eq!(tokens, [TokenKind::Print, TokenKind::Text]);
    }
}
