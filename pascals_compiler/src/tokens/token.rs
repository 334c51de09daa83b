//! Token kinds and the immutable token record produced by the scanner

use crate::utils::{Position, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every kind of token the scanner can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Keyword,
    Identifier,
    Number,
    StringLiteral,
    CharLiteral,
    AssignOperator,
    ArithmeticOperator,
    RelationalOperator,
    LogicalOperator,
    Dot,
    Semicolon,
    Colon,
    Comma,
    LParenthesis,
    RParenthesis,
    LBracket,
    RBracket,
    RangeOperator,
    LexicalError,
}

impl TokenKind {
    pub const ALL: [TokenKind; 19] = [
        TokenKind::Keyword,
        TokenKind::Identifier,
        TokenKind::Number,
        TokenKind::StringLiteral,
        TokenKind::CharLiteral,
        TokenKind::AssignOperator,
        TokenKind::ArithmeticOperator,
        TokenKind::RelationalOperator,
        TokenKind::LogicalOperator,
        TokenKind::Dot,
        TokenKind::Semicolon,
        TokenKind::Colon,
        TokenKind::Comma,
        TokenKind::LParenthesis,
        TokenKind::RParenthesis,
        TokenKind::LBracket,
        TokenKind::RBracket,
        TokenKind::RangeOperator,
        TokenKind::LexicalError,
    ];

    /// Name used in token dumps, parse tree leaves and DFA rule files
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Number => "NUMBER",
            TokenKind::StringLiteral => "STRING_LITERAL",
            TokenKind::CharLiteral => "CHAR_LITERAL",
            TokenKind::AssignOperator => "ASSIGN_OPERATOR",
            TokenKind::ArithmeticOperator => "ARITHMETIC_OPERATOR",
            TokenKind::RelationalOperator => "RELATIONAL_OPERATOR",
            TokenKind::LogicalOperator => "LOGICAL_OPERATOR",
            TokenKind::Dot => "DOT",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Colon => "COLON",
            TokenKind::Comma => "COMMA",
            TokenKind::LParenthesis => "LPARENTHESIS",
            TokenKind::RParenthesis => "RPARENTHESIS",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::RangeOperator => "RANGE_OPERATOR",
            TokenKind::LexicalError => "LEXICAL_ERROR",
        }
    }

    pub fn from_name(name: &str) -> Option<TokenKind> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scanned token; the lexeme keeps the original spelling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, start: Position) -> Self {
        let lexeme = lexeme.into();
        let span = Span::covering(start, &lexeme);
        Self { kind, lexeme, span }
    }

    pub fn line(&self) -> usize {
        self.span.start.line
    }

    pub fn column(&self) -> usize {
        self.span.start.column
    }

    /// Kind match plus an optional case-insensitive lexeme match
    pub fn matches(&self, kind: TokenKind, value: Option<&str>) -> bool {
        self.kind == kind && value.map_or(true, |v| self.lexeme.eq_ignore_ascii_case(v))
    }

    /// Case-insensitive lexeme test, ignoring kind
    pub fn is_word(&self, word: &str) -> bool {
        self.lexeme.eq_ignore_ascii_case(word)
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.matches(TokenKind::Keyword, Some(word))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.lexeme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let token = Token::new(TokenKind::Keyword, "mulai", Position::start());
        assert_eq!(token.to_string(), "KEYWORD(mulai)");

        let token = Token::new(TokenKind::AssignOperator, ":=", Position::start());
        assert_eq!(token.to_string(), "ASSIGN_OPERATOR(:=)");
    }

    #[test]
    fn test_kind_names_round_trip_through_lookup() {
        for kind in TokenKind::ALL {
            assert_eq!(TokenKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(TokenKind::from_name("IDENTIFIER_CANDIDATE"), None);
    }

    #[test]
    fn test_case_insensitive_matching() {
        let token = Token::new(TokenKind::Keyword, "MULAI", Position::new(4, 2, 1));
        assert!(token.is_keyword("mulai"));
        assert!(token.matches(TokenKind::Keyword, None));
        assert!(!token.matches(TokenKind::Identifier, Some("mulai")));
        assert_eq!((token.line(), token.column()), (2, 1));
        assert_eq!(token.span.end.column, 6);
    }
}
