use crate::file_processor::FileMetadata;
use crate::lexical::LexicalMetrics;
use crate::semantic_analysis::{format_decorated_ast, SemanticOutput};
use crate::symbols::format_tables;
use crate::syntax::ParseNode;
use crate::tokens::{Token, TokenKind};
use std::time::Duration;

/// Output of `--tokens`: every scanned token, error tokens included
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub file_metadata: Option<FileMetadata>,
    pub tokens: Vec<Token>,
    pub metrics: LexicalMetrics,
}

impl ScanResult {
    pub fn has_lexical_errors(&self) -> bool {
        self.tokens.iter().any(|t| t.kind == TokenKind::LexicalError)
    }

    /// One `KIND(lexeme)` per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            out.push_str(&token.to_string());
            out.push('\n');
        }
        out
    }
}

/// Output of `--parse-tree`
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub file_metadata: Option<FileMetadata>,
    pub token_count: usize,
    pub tree: ParseNode,
}

impl ParseResult {
    pub fn render(&self) -> String {
        self.tree.render()
    }
}

/// Complete front-end result: decorated AST plus the final tables
#[derive(Debug)]
pub struct PipelineResult {
    pub file_metadata: Option<FileMetadata>,
    pub token_count: usize,
    pub parse_node_count: usize,
    /// `None` when the parse tree lowered to no AST at all
    pub analysis: Option<SemanticOutput>,
    pub processing_duration: Duration,
}

impl PipelineResult {
    /// Decorated AST followed by the TAB/BTAB/ATAB dumps
    pub fn render(&self) -> String {
        match &self.analysis {
            Some(output) => {
                let mut out = format_decorated_ast(&output.ast, &output.table);
                out.push('\n');
                out.push_str(&format_tables(&output.table));
                out
            }
            None => "(Kosong)\n".to_string(),
        }
    }

    pub fn warning_count(&self) -> usize {
        self.analysis.as_ref().map_or(0, |output| output.warnings)
    }

    pub fn log_success(&self, origin: &str) {
        let identifiers = self
            .analysis
            .as_ref()
            .map_or(0, |output| output.table.tab().len() - 1);
        crate::log_success!(
            crate::logging::codes::success::PIPELINE_COMPLETE,
            "Pascal-S front end completed",
            "source" => origin,
            "tokens" => self.token_count,
            "parse_nodes" => self.parse_node_count,
            "identifiers" => identifiers,
            "warnings" => self.warning_count(),
            "duration_ms" => format!("{:.2}", self.processing_duration.as_secs_f64() * 1000.0)
        );
    }
}
