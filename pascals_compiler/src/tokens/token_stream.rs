//! Cursor over a fully materialised token sequence

use crate::tokens::token::{Token, TokenKind};
use crate::utils::Span;

/// Read-only token sequence with a movable cursor and bounded lookahead
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    position: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn current(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Token `n` places after the cursor (`peek_ahead(0)` is the current one)
    pub fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    /// Move past the current token and return it
    pub fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Non-consuming kind test with optional case-insensitive value
    pub fn check(&self, kind: TokenKind, value: Option<&str>) -> bool {
        self.current().is_some_and(|t| t.matches(kind, value))
    }

    /// Non-consuming lexeme test, whatever the kind
    pub fn check_word(&self, word: &str) -> bool {
        self.current().is_some_and(|t| t.is_word(word))
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Span of the current token, or of the last one once input is exhausted
    pub fn current_span(&self) -> Span {
        self.current()
            .or_else(|| self.tokens.last())
            .map(|t| t.span)
            .unwrap_or_else(Span::dummy)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    fn stream(items: &[(TokenKind, &str)]) -> TokenStream {
        let mut pos = Position::start();
        let tokens = items
            .iter()
            .map(|(kind, lexeme)| {
                let token = Token::new(*kind, *lexeme, pos);
                pos = token.span.end.advance(' ');
                token
            })
            .collect();
        TokenStream::new(tokens)
    }

    #[test]
    fn test_lookahead_does_not_consume() {
        let s = stream(&[
            (TokenKind::Identifier, "foo"),
            (TokenKind::AssignOperator, ":="),
            (TokenKind::Number, "1"),
        ]);

        assert!(s.check(TokenKind::Identifier, None));
        assert_eq!(s.peek_ahead(1).map(|t| t.kind), Some(TokenKind::AssignOperator));
        assert_eq!(s.position(), 0);
    }

    #[test]
    fn test_advance_to_end() {
        let mut s = stream(&[(TokenKind::Keyword, "mulai"), (TokenKind::Dot, ".")]);
        assert_eq!(s.advance().map(|t| t.lexeme), Some("mulai".to_string()));
        assert!(s.check_word("."));
        s.advance();
        assert!(s.is_at_end());
        assert!(s.advance().is_none());
        assert_eq!(s.current_span().start.column, 7);
    }
}
