//! Semantic analysis: scope resolution, type checking and AST decoration
//!
//! The analyzer owns the symbol table for the duration of one run and hands
//! it back together with the decorated tree. Analysis stops at the first
//! fatal error.

pub mod analyzer;
pub mod const_eval;
pub mod printer;
pub mod types;

pub use analyzer::{SemanticAnalyzer, SemanticOutput};
pub use printer::format_decorated_ast;
pub use types::{SemanticError, SemanticResult, TypeCode};

use crate::ast::AstNode;
use crate::config::runtime::SemanticPreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};

/// Module version
pub const VERSION: &str = "1.0.0";

pub fn analyze_ast_with_preferences(
    ast: AstNode,
    preferences: &SemanticPreferences,
) -> SemanticResult<SemanticOutput> {
    let start_time = std::time::Instant::now();
    let result = SemanticAnalyzer::with_preferences(preferences).analyze(ast);

    match &result {
        Ok(output) => {
            log_success!(codes::success::SEMANTIC_ANALYSIS_COMPLETE,
                "Semantic analysis completed successfully",
                "identifiers" => output.table.tab().len() - 1,
                "blocks" => output.table.btab().len(),
                "arrays" => output.table.atab().len(),
                "warnings" => output.warnings,
                "duration_ms" => format!("{:.2}", start_time.elapsed().as_secs_f64() * 1000.0)
            );
        }
        Err(error) => match error.span() {
            Some(span) => {
                log_error!(error.error_code(), "Semantic analysis failed",
                    span = span,
                    "error" => error.to_string(),
                    "severity" => error.severity()
                );
            }
            None => {
                log_error!(error.error_code(), "Semantic analysis failed",
                    "error" => error.to_string(),
                    "severity" => error.severity()
                );
            }
        },
    }

    result
}

pub fn init_semantic_analysis_logging() -> Result<(), String> {
    let required_codes = [
        codes::semantic::UNDECLARED_IDENTIFIER,
        codes::semantic::TYPE_MISMATCH,
        codes::semantic::INVALID_CONDITION,
        codes::semantic::INVALID_OPERAND,
        codes::semantic::UNKNOWN_PROCEDURE,
        codes::semantic::WRONG_OBJECT_KIND,
        codes::semantic::INVALID_LOOP_VARIABLE,
        codes::semantic::REDECLARATION,
        codes::semantic::NON_CONSTANT_EXPRESSION,
        codes::semantic::UNKNOWN_TYPE,
        codes::semantic::ARGUMENT_COUNT_MISMATCH,
        codes::warnings::REDECLARATION_ALLOWED,
    ];

    for code in &required_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Semantic error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_debug!("Semantic analysis logging validation completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build_ast;
    use crate::lexical::tokenize_source;
    use crate::syntax::parse_tokens;

    #[test]
    fn test_analyze_ast_returns_table() {
        let tree = parse_tokens(tokenize_source("program p; variabel a: char; mulai a := 'q' selesai.").unwrap()).unwrap();
        let ast = build_ast(&tree).unwrap().unwrap();
        let output = analyze_ast_with_preferences(ast, &SemanticPreferences::default()).unwrap();
        assert_eq!(output.table.tab().len(), 7);
        assert_eq!(output.ast.resolved_type, Some(TypeCode::NoType));
    }

    #[test]
    fn test_init_semantic_analysis_logging() {
        assert!(init_semantic_analysis_logging().is_ok());
    }
}
