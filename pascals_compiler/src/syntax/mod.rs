//! Syntax analysis: token stream to labeled parse tree
//!
//! The parser never recovers from a mismatch. The first error propagates
//! out of `parse_tokens` and no partial tree is returned.

mod error;
mod parse_tree;
mod parser;

pub use error::{SyntaxError, SyntaxResult};
pub use parse_tree::ParseNode;
pub use parser::PascalParser;

use crate::config::runtime::SyntaxPreferences;
use crate::logging::codes;
use crate::tokens::TokenStream;
use crate::{log_debug, log_error, log_success};

pub const VERSION: &str = "1.0.0";

/// Parse a token stream with default preferences
pub fn parse_tokens(tokens: TokenStream) -> SyntaxResult<ParseNode> {
    parse_tokens_with_preferences(tokens, &SyntaxPreferences::default())
}

pub fn parse_tokens_with_preferences(
    tokens: TokenStream,
    preferences: &SyntaxPreferences,
) -> SyntaxResult<ParseNode> {
    log_debug!("Starting syntax analysis", "tokens" => tokens.len());

    let mut parser = PascalParser::with_preferences(tokens, preferences);
    let result = parser.parse();

    match &result {
        Ok(tree) => {
            log_success!(codes::success::PARSE_TREE_COMPLETE,
                "Syntax analysis completed successfully",
                "nodes" => tree.node_count(),
                "max_rule_depth" => parser.max_depth_reached()
            );
        }
        Err(error) => match error.span() {
            Some(span) => {
                log_error!(error.error_code(), "Syntax analysis failed",
                    span = span,
                    "error" => error.to_string(),
                    "context" => error.context().unwrap_or("-")
                );
            }
            None => {
                log_error!(error.error_code(), "Syntax analysis failed",
                    "error" => error.to_string()
                );
            }
        },
    }

    result
}

/// Initialize syntax module logging validation
pub fn init_syntax_logging() -> Result<(), String> {
    let required_codes = [
        codes::syntax::UNEXPECTED_TOKEN,
        codes::syntax::EMPTY_TOKEN_STREAM,
        codes::syntax::UNEXPECTED_END_OF_INPUT,
        codes::syntax::GRAMMAR_VIOLATION,
        codes::syntax::TRAILING_TOKENS,
        codes::syntax::MAX_RECURSION_DEPTH,
    ];

    for code in &required_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Syntax error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_debug!("Syntax module logging validation completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize_source;

    #[test]
    fn test_init_syntax_logging() {
        assert!(init_syntax_logging().is_ok());
    }

    #[test]
    fn test_parse_tokens_renders_tree() {
        let tokens = tokenize_source("program halo; mulai writeln('hai') selesai.").unwrap();
        let tree = parse_tokens(tokens).unwrap();
        let rendered = tree.render();
        assert!(rendered.starts_with("<program>\n├── <program-header>\n"));
        assert!(rendered.contains("STRING_LITERAL('hai')"));
        assert!(rendered.ends_with("└── DOT(.)\n"));
    }

    #[test]
    fn test_context_tracking_can_be_disabled() {
        let tokens = tokenize_source("program p; mulai x := selesai.").unwrap();
        let prefs = SyntaxPreferences {
            track_context: false,
        };
        let err = parse_tokens_with_preferences(tokens, &prefs).unwrap_err();
        assert!(err.context().is_none());
    }
}
