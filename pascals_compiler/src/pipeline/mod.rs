//! Front-end pipeline: file -> tokens -> parse tree -> AST -> decorated AST + tables
//!
//! Each entry point stops at a different stage so the CLI can dump tokens or
//! the parse tree without running the later stages.

mod error;
pub mod output;
mod result;
mod validation;

pub use error::PipelineError;
pub use output::{default_output_path, write_output};
pub use result::{ParseResult, PipelineResult, ScanResult};
pub use validation::validate_pipeline;

use crate::config::runtime::RuntimeConfig;
use crate::file_processor::{FileProcessingResult, FileProcessor};
use crate::lexical::Lexer;
use crate::logging;
use std::path::PathBuf;
use std::time::Instant;

/// Scan only. Unknown characters come back as LEXICAL_ERROR tokens instead of failing.
pub fn scan_file(file_path: &str, config: &RuntimeConfig) -> Result<ScanResult, PipelineError> {
    logging::with_file_context(PathBuf::from(file_path), 0, || {
        let file_result = read_source(file_path, config)?;
        let mut result = scan_source(&file_result.source, config)?;
        result.file_metadata = Some(file_result.metadata);
        Ok(result)
    })
}

pub fn scan_source(source: &str, config: &RuntimeConfig) -> Result<ScanResult, PipelineError> {
    let mut lexer = Lexer::from_preferences(&config.lexical)?;
    let tokens = lexer.scan(source);
    Ok(ScanResult {
        file_metadata: None,
        tokens,
        metrics: lexer.metrics().clone(),
    })
}

/// Scan and parse, stopping at the parse tree
pub fn parse_file(file_path: &str, config: &RuntimeConfig) -> Result<ParseResult, PipelineError> {
    logging::with_file_context(PathBuf::from(file_path), 0, || {
        let file_result = read_source(file_path, config)?;
        let mut result = parse_source(&file_result.source, config)?;
        result.file_metadata = Some(file_result.metadata);
        Ok(result)
    })
}

pub fn parse_source(source: &str, config: &RuntimeConfig) -> Result<ParseResult, PipelineError> {
    let tokens = crate::lexical::tokenize_source_with_preferences(source, &config.lexical)?;
    let token_count = tokens.len();
    let tree = crate::syntax::parse_tokens_with_preferences(tokens, &config.syntax)?;
    Ok(ParseResult {
        file_metadata: None,
        token_count,
        tree,
    })
}

/// Run every stage on one source file
pub fn compile_file(
    file_path: &str,
    config: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    logging::with_file_context(PathBuf::from(file_path), 0, || {
        crate::log_info!("Starting Pascal-S front end", "file" => file_path);
        let start_time = Instant::now();

        let file_result = read_source(file_path, config)?;
        let mut result = run_stages(&file_result.source, config)?;
        result.file_metadata = Some(file_result.metadata);
        result.processing_duration = start_time.elapsed();

        result.log_success(file_path);
        Ok(result)
    })
}

/// Run every stage on in-memory source text
pub fn compile_source(
    source: &str,
    config: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    let result = run_stages(source, config)?;
    result.log_success("<memory>");
    Ok(result)
}

fn read_source(
    file_path: &str,
    config: &RuntimeConfig,
) -> Result<FileProcessingResult, PipelineError> {
    let processor = FileProcessor::from_preferences(&config.file_processor);
    let file_result = processor.process_file(file_path)?;
    if file_result.is_effectively_empty() {
        crate::log_warning!("Source file contains only whitespace", "file" => file_path);
    }
    Ok(file_result)
}

fn run_stages(source: &str, config: &RuntimeConfig) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    let parsed = parse_source(source, config)?;
    let ast = crate::ast::build_ast(&parsed.tree)?;
    let analysis = match ast {
        Some(ast) => Some(crate::semantic_analysis::analyze_ast_with_preferences(
            ast,
            &config.semantic,
        )?),
        None => None,
    };

    Ok(PipelineResult {
        file_metadata: None,
        token_count: parsed.token_count,
        parse_node_count: parsed.tree.node_count(),
        analysis,
        processing_duration: start_time.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::RedeclarationPolicy;
    use crate::semantic_analysis::SemanticError;
    use crate::syntax::SyntaxError;
    use assert_matches::assert_matches;

    const PROGRAM: &str = "program hitung;\n\
        variabel x, y: integer;\n\
        mulai\n\
          x := 1;\n\
          y := x + 2\n\
        selesai.\n";

    #[test]
    fn test_validate_pipeline() {
        assert!(validate_pipeline().is_ok());
    }

    #[test]
    fn test_pipeline_error_creation() {
        let error = PipelineError::pipeline_error("Test error");
        assert_matches!(&error, PipelineError::Pipeline { message } if message == "Test error");
        assert_eq!(error.error_code().as_str(), "ERR001");
        assert_eq!(error.stage(), "pipeline");
    }

    #[test]
    fn compile_source_runs_every_stage() {
        let result = compile_source(PROGRAM, &RuntimeConfig::default()).unwrap();
        assert!(result.token_count > 10);
        assert!(result.parse_node_count > result.token_count);
        let analysis = result.analysis.as_ref().unwrap();
        assert!(analysis.table.lookup("y").is_some());

        let rendered = result.render();
        assert!(rendered.starts_with("ProgramNode(name: 'hitung')"));
        assert!(rendered.contains("=== SYMBOL TABLE (TAB) ==="));
        assert!(rendered.contains("=== ARRAY TABLE (ATAB) ==="));
    }

    #[test]
    fn scan_keeps_error_tokens() {
        let result = scan_source("x := 1 ? 2", &RuntimeConfig::default()).unwrap();
        assert!(result.has_lexical_errors());
        assert_eq!(result.metrics.invalid_chars, 1);
        assert!(result.render().contains("LEXICAL_ERROR(?)"));
    }

    #[test]
    fn parse_stops_at_tree() {
        let result = parse_source(PROGRAM, &RuntimeConfig::default()).unwrap();
        assert_eq!(result.tree.label, "<program>");
        assert!(result.render().starts_with("<program>"));
    }

    #[test]
    fn stage_errors_are_wrapped() {
        let config = RuntimeConfig::default();

        assert_matches!(
            compile_source("program p; mulai x := selesai.", &config),
            Err(PipelineError::SyntaxAnalysis(_))
        );
        assert_matches!(
            compile_source("", &config),
            Err(PipelineError::SyntaxAnalysis(SyntaxError::EmptyTokenStream))
        );
        assert_matches!(
            compile_source("program p; mulai y := 1 selesai.", &config),
            Err(PipelineError::SemanticAnalysis(SemanticError::UndeclaredIdentifier { .. }))
        );
        assert_matches!(
            compile_source("program p; mulai x := 1 # selesai.", &config),
            Err(PipelineError::LexicalAnalysis(_))
        );
    }

    #[test]
    fn failures_carry_position_and_detail() {
        let config = RuntimeConfig::default();
        let error = compile_source("program p;\nmulai\n  x := 1\nselesai.", &config).unwrap_err();
        let span = error.span().unwrap();
        assert_eq!(span.start.line, 3);
        assert_eq!(error.stage(), "semantic analysis");

        let error = compile_source("program p mulai selesai.", &config).unwrap_err();
        assert!(error.detailed_message().contains("Help:"));
        assert!(error.span().is_some());
    }

    #[test]
    fn semantic_preferences_flow_through() {
        let source = "program p; variabel x: integer; x: real; mulai selesai.";
        let mut config = RuntimeConfig::default();
        config.semantic.redeclaration_policy = RedeclarationPolicy::Strict;
        assert_matches!(
            compile_source(source, &config),
            Err(PipelineError::SemanticAnalysis(SemanticError::Redeclaration { .. }))
        );

        config.semantic.redeclaration_policy = RedeclarationPolicy::Lenient;
        let result = compile_source(source, &config).unwrap();
        assert_eq!(result.warning_count(), 1);
    }
}
