//! DFA-driven scanner
//!
//! `scan` never fails: characters with no transition from the start state
//! become `LEXICAL_ERROR` tokens and scanning resumes at the next character.
//! `tokenize` wraps `scan` with the compile-time limits and rejects the
//! stream if any error token was produced.

use crate::config::constants::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::lexical::dfa::{DfaDefinition, DfaError, FinalClass};
use crate::lexical::keywords::KeywordSet;
use crate::logging::codes;
use crate::tokens::{Token, TokenKind, TokenStream};
use crate::utils::{Position, Span};
use crate::{log_debug, log_error, log_success, log_warning};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum LexerError {
    #[error(transparent)]
    Rules(#[from] DfaError),

    #[error("{count} unrecognized character(s), first '{first}' at line {line}, column {column}")]
    UnrecognizedCharacters {
        count: usize,
        first: String,
        line: usize,
        column: usize,
    },

    #[error("Lexeme too long: {length} characters at line {line} (max {MAX_LEXEME_LENGTH})")]
    LexemeTooLong { length: usize, line: usize },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::Rules(e) => e.error_code(),
            LexerError::UnrecognizedCharacters { .. } => codes::lexical::UNKNOWN_CHARACTER,
            LexerError::LexemeTooLong { .. } => codes::lexical::LEXEME_TOO_LONG,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }
}

/// Counters gathered during one scan
#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub keyword_tokens: usize,
    pub identifier_tokens: usize,
    pub operator_tokens: usize,
    pub invalid_chars: usize,
    pub comment_count: usize,
    pub max_lexeme_length: usize,
    pub tokens_by_kind: HashMap<TokenKind, usize>,
}

impl LexicalMetrics {
    fn record_token(&mut self, token: &Token, detailed: bool) {
        self.total_tokens += 1;
        match token.kind {
            TokenKind::Keyword => self.keyword_tokens += 1,
            TokenKind::Identifier => self.identifier_tokens += 1,
            TokenKind::AssignOperator
            | TokenKind::ArithmeticOperator
            | TokenKind::RelationalOperator
            | TokenKind::LogicalOperator
            | TokenKind::RangeOperator => self.operator_tokens += 1,
            TokenKind::LexicalError => self.invalid_chars += 1,
            _ => {}
        }
        self.max_lexeme_length = self.max_lexeme_length.max(token.lexeme.chars().count());

        if detailed {
            *self.tokens_by_kind.entry(token.kind).or_insert(0) += 1;
        }
    }
}

pub struct Lexer {
    dfa: Arc<DfaDefinition>,
    keywords: KeywordSet,
    collect_detailed_metrics: bool,
    metrics: LexicalMetrics,
}

impl Lexer {
    /// The DFA is shared read-only; several lexers may hold the same table
    pub fn new(dfa: Arc<DfaDefinition>, keywords: KeywordSet) -> Self {
        Self {
            dfa,
            keywords,
            collect_detailed_metrics: false,
            metrics: LexicalMetrics::default(),
        }
    }

    /// Embedded rules and default keywords
    pub fn with_defaults() -> Result<Self, LexerError> {
        Ok(Self::new(
            Arc::new(DfaDefinition::embedded()?),
            KeywordSet::default(),
        ))
    }

    pub fn from_preferences(preferences: &LexicalPreferences) -> Result<Self, LexerError> {
        let dfa = match &preferences.dfa_rules_path {
            Some(path) => DfaDefinition::load_from_file(path)?,
            None => DfaDefinition::embedded()?,
        };

        log_success!(codes::success::DFA_RULES_LOADED, "DFA rules loaded",
            "source" => preferences.dfa_rules_path.as_deref().unwrap_or("<embedded>"),
            "states" => dfa.state_count()
        );

        let mut lexer = Self::new(
            Arc::new(dfa),
            KeywordSet::with_extras(&preferences.extra_keywords),
        );
        lexer.collect_detailed_metrics = preferences.collect_detailed_metrics;
        Ok(lexer)
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Scan the whole source into tokens
    pub fn scan(&mut self, source: &str) -> Vec<Token> {
        self.metrics = LexicalMetrics::default();

        let chars: Vec<char> = source.chars().collect();
        let mut tokens = Vec::new();
        let mut i = 0;
        let mut pos = Position::start();

        while i < chars.len() {
            let ch = chars[i];

            if ch.is_whitespace() {
                pos = pos.advance(ch);
                i += 1;
                continue;
            }

            if let Some(close) = comment_close(&chars, i) {
                let (next, next_pos) = self.skip_comment(&chars, i, pos, close);
                i = next;
                pos = next_pos;
                continue;
            }

            match self.longest_match(&chars, i) {
                Some((end, class)) => {
                    let lexeme: String = chars[i..end].iter().collect();
                    let kind = match class {
                        FinalClass::IdentifierCandidate if self.keywords.contains(&lexeme) => {
                            TokenKind::Keyword
                        }
                        FinalClass::IdentifierCandidate => TokenKind::Identifier,
                        FinalClass::Token(kind) => kind,
                    };
                    let token = Token::new(kind, lexeme, pos);
                    pos = token.span.end();
                    i = end;
                    self.metrics
                        .record_token(&token, self.collect_detailed_metrics);
                    tokens.push(token);
                }
                None => {
                    let token = Token::new(TokenKind::LexicalError, ch.to_string(), pos);
                    log_error!(codes::lexical::UNKNOWN_CHARACTER,
                        &format!("Unrecognized character '{}'", ch),
                        span = token.span,
                        "line" => pos.line,
                        "column" => pos.column
                    );
                    pos = pos.advance(ch);
                    i += 1;
                    self.metrics
                        .record_token(&token, self.collect_detailed_metrics);
                    tokens.push(token);
                }
            }
        }

        tokens
    }

    /// Scan under the token and lexeme limits; error tokens fail the stream
    pub fn tokenize(&mut self, source: &str) -> Result<TokenStream, LexerError> {
        log_debug!("Starting lexical analysis",
            "char_count" => source.chars().count(),
            "max_tokens_allowed" => MAX_TOKEN_COUNT
        );

        let tokens = self.scan(source);

        if tokens.len() > MAX_TOKEN_COUNT {
            let error = LexerError::TooManyTokens {
                count: tokens.len(),
            };
            log_error!(error.error_code(), "Token limit exceeded",
                "token_count" => tokens.len(),
                "limit" => MAX_TOKEN_COUNT
            );
            return Err(error);
        }

        if let Some(token) = tokens
            .iter()
            .find(|t| t.lexeme.chars().count() > MAX_LEXEME_LENGTH)
        {
            let error = LexerError::LexemeTooLong {
                length: token.lexeme.chars().count(),
                line: token.line(),
            };
            log_error!(error.error_code(), "Lexeme exceeds length limit",
                span = token.span,
                "limit" => MAX_LEXEME_LENGTH
            );
            return Err(error);
        }

        if let Some(first) = tokens.iter().find(|t| t.kind == TokenKind::LexicalError) {
            return Err(LexerError::UnrecognizedCharacters {
                count: self.metrics.invalid_chars,
                first: first.lexeme.clone(),
                line: first.line(),
                column: first.column(),
            });
        }

        log_success!(codes::success::TOKENIZATION_COMPLETE,
            "Lexical analysis completed successfully",
            "token_count" => tokens.len(),
            "keywords" => self.metrics.keyword_tokens,
            "identifiers" => self.metrics.identifier_tokens,
            "operators" => self.metrics.operator_tokens,
            "comments" => self.metrics.comment_count,
            "max_lexeme_length" => self.metrics.max_lexeme_length
        );

        Ok(TokenStream::new(tokens))
    }

    /// End index and class of the longest accepted prefix starting at `start`
    fn longest_match(&self, chars: &[char], start: usize) -> Option<(usize, FinalClass)> {
        let mut state = self.dfa.start_state();
        let mut best = None;
        let mut i = start;

        while i < chars.len() {
            match self.dfa.step(state, chars[i]) {
                Some(next) => {
                    state = next;
                    i += 1;
                    if let Some(class) = self.dfa.final_class(state) {
                        best = Some((i, class));
                    }
                }
                None => break,
            }
        }

        best
    }

    fn skip_comment(
        &mut self,
        chars: &[char],
        start: usize,
        start_pos: Position,
        close: &[char],
    ) -> (usize, Position) {
        let open_len = if chars[start] == '{' { 1 } else { 2 };
        let mut pos = start_pos;
        for &c in &chars[start..start + open_len] {
            pos = pos.advance(c);
        }
        let mut i = start + open_len;
        self.metrics.comment_count += 1;

        while i < chars.len() {
            if chars[i..].starts_with(close) {
                for &c in close {
                    pos = pos.advance(c);
                }
                return (i + close.len(), pos);
            }
            pos = pos.advance(chars[i]);
            i += 1;
        }

        log_warning!(code = codes::lexical::UNTERMINATED_COMMENT,
            "Comment runs to end of input",
            span = Span::new(start_pos, pos),
            "line" => start_pos.line,
            "column" => start_pos.column
        );
        (i, pos)
    }
}

const BRACE_CLOSE: &[char] = &['}'];
const STAR_CLOSE: &[char] = &['*', ')'];

/// Closing delimiter when a comment opens at `i`
fn comment_close(chars: &[char], i: usize) -> Option<&'static [char]> {
    match chars[i] {
        '{' => Some(BRACE_CLOSE),
        '(' if chars.get(i + 1) == Some(&'*') => Some(STAR_CLOSE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn lexer() -> Lexer {
        Lexer::with_defaults().unwrap()
    }

    fn kinds_and_lexemes(source: &str) -> Vec<(TokenKind, String)> {
        lexer()
            .scan(source)
            .into_iter()
            .map(|t| (t.kind, t.lexeme))
            .collect()
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let tokens = lexer().scan("MULAI Mulai mulai");
        assert_eq!(tokens.len(), 3);
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Keyword));
        assert_eq!(tokens[0].lexeme, "MULAI");
        assert_eq!(tokens[1].to_string(), "KEYWORD(Mulai)");
    }

    #[test]
    fn test_longest_match_prefers_whole_word() {
        let tokens = lexer().scan("divisor div");
        assert_eq!(tokens[0].to_string(), "IDENTIFIER(divisor)");
        assert_eq!(tokens[1].to_string(), "KEYWORD(div)");
    }

    #[test]
    fn test_assignment_and_colon() {
        let toks = kinds_and_lexemes("x := 1; y : integer");
        assert_eq!(toks[1], (TokenKind::AssignOperator, ":=".to_string()));
        assert_eq!(toks[5], (TokenKind::Colon, ":".to_string()));
    }

    #[test]
    fn test_range_backs_off_from_real() {
        let toks = kinds_and_lexemes("1..10 3.14");
        assert_eq!(
            toks,
            vec![
                (TokenKind::Number, "1".to_string()),
                (TokenKind::RangeOperator, "..".to_string()),
                (TokenKind::Number, "10".to_string()),
                (TokenKind::Number, "3.14".to_string()),
            ]
        );
    }

    #[test]
    fn test_string_and_char_literals() {
        let toks = kinds_and_lexemes("'a' 'halo dunia' ''");
        assert_eq!(toks[0].0, TokenKind::CharLiteral);
        assert_eq!(toks[1], (TokenKind::StringLiteral, "'halo dunia'".to_string()));
        assert_eq!(toks[2].0, TokenKind::StringLiteral);
    }

    #[test]
    fn test_relational_operators() {
        let toks = kinds_and_lexemes("< <= <> > >= =");
        assert!(toks.iter().all(|(k, _)| *k == TokenKind::RelationalOperator));
        let lexemes: Vec<_> = toks.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(lexemes, vec!["<", "<=", "<>", ">", ">=", "="]);
    }

    #[test]
    fn test_comments_track_lines() {
        let tokens = lexer().scan("{ satu\ndua }(* tiga\n*){x} y");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].lexeme, "y");
        assert_eq!(tokens[0].line(), 3);
        assert_eq!(tokens[0].column(), 7);
    }

    #[test]
    fn test_unterminated_comment_consumes_rest() {
        let mut lx = lexer();
        let tokens = lx.scan("x { never closed\n y");
        assert_eq!(tokens.len(), 1);
        assert_eq!(lx.metrics().comment_count, 1);
    }

    #[test]
    fn test_unknown_character_is_recovered() {
        let tokens = lexer().scan("a ? b");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].kind, TokenKind::LexicalError);
        assert_eq!(tokens[1].lexeme, "?");
        assert_eq!(tokens[2].column(), 5);
    }

    #[test]
    fn test_tokenize_rejects_error_tokens() {
        let err = lexer().tokenize("a ? b ?").unwrap_err();
        assert_matches!(err, LexerError::UnrecognizedCharacters { count: 2, line: 1, column: 3, .. });
        assert_eq!(err.error_code(), codes::lexical::UNKNOWN_CHARACTER);
    }

    #[test]
    fn test_tokenize_clean_source() {
        let mut lx = lexer();
        let stream = lx.tokenize("program p; mulai selesai.").unwrap();
        assert_eq!(stream.len(), 6);
        assert_eq!(lx.metrics().keyword_tokens, 3);
        assert_eq!(lx.metrics().identifier_tokens, 1);
    }

    #[test]
    fn test_positions_are_one_based() {
        let tokens = lexer().scan("a\n  bc");
        assert_eq!((tokens[0].line(), tokens[0].column()), (1, 1));
        assert_eq!((tokens[1].line(), tokens[1].column()), (2, 3));
    }

    #[test]
    fn test_extra_keywords() {
        let prefs = LexicalPreferences {
            dfa_rules_path: None,
            extra_keywords: vec!["ulangi".to_string()],
            collect_detailed_metrics: true,
        };
        let mut lx = Lexer::from_preferences(&prefs).unwrap();
        let tokens = lx.scan("Ulangi");
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(lx.metrics().tokens_by_kind.get(&TokenKind::Keyword), Some(&1));
    }
}
