//! Lexical analysis: DFA rule loading, keyword resolution and scanning
//!
//! The scanner is table driven. Rules come from the JSON file named in
//! `LexicalPreferences::dfa_rules_path` or, when unset, from the rule set
//! embedded at build time.

pub mod analyzer;
pub mod dfa;
pub mod keywords;

use crate::config::constants::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::TokenStream;

pub use analyzer::{Lexer, LexerError, LexicalMetrics};
pub use dfa::{DfaDefinition, DfaError, FinalClass};
pub use keywords::KeywordSet;

pub const VERSION: &str = "1.0.0";

/// Tokenize with the embedded rules and default keywords
pub fn tokenize_source(source: &str) -> Result<TokenStream, LexerError> {
    Lexer::with_defaults()?.tokenize(source)
}

/// Tokenize with custom runtime preferences (limits remain compile-time)
pub fn tokenize_source_with_preferences(
    source: &str,
    preferences: &LexicalPreferences,
) -> Result<TokenStream, LexerError> {
    Lexer::from_preferences(preferences)?.tokenize(source)
}

/// Validate lexical error codes and limits at startup
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    let required_codes = [
        codes::lexical::UNKNOWN_CHARACTER,
        codes::lexical::DFA_RULES_UNREADABLE,
        codes::lexical::DFA_RULES_MALFORMED,
        codes::lexical::DFA_RULES_INCOMPLETE,
        codes::lexical::DFA_INVALID_STATE,
        codes::lexical::UNMAPPED_FINAL_STATE,
        codes::lexical::LEXEME_TOO_LONG,
        codes::lexical::TOO_MANY_TOKENS,
        codes::lexical::UNTERMINATED_COMMENT,
    ];

    for code in &required_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    if MAX_TOKEN_COUNT == 0 || MAX_LEXEME_LENGTH == 0 || MAX_DFA_STATES == 0 {
        return Err("Lexical limits cannot be zero".to_string());
    }

    crate::log_debug!("Lexical limits initialized",
        "max_token_count" => MAX_TOKEN_COUNT,
        "max_lexeme_length" => MAX_LEXEME_LENGTH,
        "max_dfa_states" => MAX_DFA_STATES
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_validates_codes() {
        assert!(init_lexical_analysis_logging().is_ok());
    }

    #[test]
    fn test_tokenize_source_uses_embedded_rules() {
        let stream = tokenize_source("program contoh;").unwrap();
        let rendered: Vec<String> = stream.tokens().iter().map(|t| t.to_string()).collect();
        assert_eq!(
            rendered,
            vec!["KEYWORD(program)", "IDENTIFIER(contoh)", "SEMICOLON(;)"]
        );
    }

    #[test]
    fn test_custom_rules_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(
            &path,
            r#"{"start_state": "S",
                "final_states": {"W": "IDENTIFIER_CANDIDATE", "N": "NUMBER"},
                "transitions": {"S": {"letter": "W", "digit": "N"},
                                "W": {"letter": "W"}, "N": {"digit": "N"}}}"#,
        )
        .unwrap();

        let prefs = LexicalPreferences {
            dfa_rules_path: Some(path.display().to_string()),
            extra_keywords: Vec::new(),
            collect_detailed_metrics: false,
        };
        let stream = tokenize_source_with_preferences("abc 42 mulai", &prefs).unwrap();
        let rendered: Vec<String> = stream.tokens().iter().map(|t| t.to_string()).collect();
        assert_eq!(rendered, vec!["IDENTIFIER(abc)", "NUMBER(42)", "KEYWORD(mulai)"]);
    }
}
