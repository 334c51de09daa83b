//! Syntax error types with error code mapping and span-accurate reporting

use crate::logging::{codes, Code};
use crate::utils::Span;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Parse failures; none of them are recovered inside the parser
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyntaxError {
    #[error("Expected {expected} but found {found} at token {index} ({span})")]
    UnexpectedToken {
        expected: String,
        found: String,
        index: usize,
        span: Span,
        context: String,
    },

    #[error("Unexpected end of input at token {index}: expected {expected}")]
    UnexpectedEndOfInput {
        expected: String,
        index: usize,
        context: String,
    },

    #[error("Empty token stream - no tokens to parse")]
    EmptyTokenStream,

    #[error("Unexpected {found} after end of program at token {index} ({span})")]
    TrailingTokens {
        found: String,
        index: usize,
        span: Span,
    },

    #[error("Grammar violation: {message} at {span}")]
    GrammarViolation { message: String, span: Span },

    #[error("Maximum recursion depth {depth} exceeded at {span}")]
    MaxRecursionDepth { depth: usize, span: Span },
}

impl SyntaxError {
    pub fn unexpected_token(
        expected: &str,
        found: &str,
        index: usize,
        span: Span,
        context: String,
    ) -> Self {
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            index,
            span,
            context,
        }
    }

    pub fn unexpected_end_of_input(expected: &str, index: usize, context: String) -> Self {
        Self::UnexpectedEndOfInput {
            expected: expected.to_string(),
            index,
            context,
        }
    }

    pub fn grammar_violation(message: &str, span: Span) -> Self {
        Self::GrammarViolation {
            message: message.to_string(),
            span,
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnexpectedEndOfInput { .. } => codes::syntax::UNEXPECTED_END_OF_INPUT,
            Self::EmptyTokenStream => codes::syntax::EMPTY_TOKEN_STREAM,
            Self::TrailingTokens { .. } => codes::syntax::TRAILING_TOKENS,
            Self::GrammarViolation { .. } => codes::syntax::GRAMMAR_VIOLATION,
            Self::MaxRecursionDepth { .. } => codes::syntax::MAX_RECURSION_DEPTH,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::TrailingTokens { span, .. }
            | Self::GrammarViolation { span, .. }
            | Self::MaxRecursionDepth { span, .. } => Some(*span),
            Self::UnexpectedEndOfInput { .. } | Self::EmptyTokenStream => None,
        }
    }

    /// Grammar rule trail active when the error was raised, if tracked
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::UnexpectedToken { context, .. } | Self::UnexpectedEndOfInput { context, .. }
                if !context.is_empty() =>
            {
                Some(context)
            }
            _ => None,
        }
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }

    /// Message with the rule trail and the recommended action appended
    pub fn enhanced_message(&self) -> String {
        match self.context() {
            Some(context) => format!(
                "{}\nContext: {}\nHelp: {}",
                self,
                context,
                self.recommended_action()
            ),
            None => format!("{}\nHelp: {}", self, self.recommended_action()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    #[test]
    fn test_error_code_mapping() {
        let span = Span::dummy();

        let unexpected =
            SyntaxError::unexpected_token("SEMICOLON(;)", "DOT(.)", 4, span, String::new());
        assert_eq!(unexpected.error_code().as_str(), "E040");

        let eof = SyntaxError::unexpected_end_of_input("KEYWORD(selesai)", 9, String::new());
        assert_eq!(eof.error_code().as_str(), "E042");

        let depth = SyntaxError::MaxRecursionDepth { depth: 3, span };
        assert_eq!(depth.error_code(), codes::syntax::MAX_RECURSION_DEPTH);
    }

    #[test]
    fn test_message_names_expected_found_and_index() {
        let span = Span::new(Position::new(10, 2, 5), Position::new(11, 2, 6));
        let error = SyntaxError::unexpected_token("IDENTIFIER", "KEYWORD(mulai)", 7, span, String::new());
        let text = error.to_string();
        assert!(text.contains("Expected IDENTIFIER"));
        assert!(text.contains("found KEYWORD(mulai)"));
        assert!(text.contains("token 7"));
        assert_eq!(error.span().map(|s| s.start.line), Some(2));
    }

    #[test]
    fn test_enhanced_message_includes_context() {
        let error = SyntaxError::unexpected_end_of_input(
            "DOT",
            3,
            "program -> compound-statement".to_string(),
        );
        let message = error.enhanced_message();
        assert!(message.contains("Context: program -> compound-statement"));
        assert!(message.contains("Help:"));

        let bare = SyntaxError::EmptyTokenStream;
        assert!(bare.context().is_none());
    }
}
