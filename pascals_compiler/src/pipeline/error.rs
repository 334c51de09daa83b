use crate::ast::AstError;
use crate::config::runtime::ConfigError;
use crate::file_processor::FileProcessorError;
use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::semantic_analysis::SemanticError;
use crate::syntax::SyntaxError;
use crate::utils::Span;

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Configuration failed: {0}")]
    Configuration(#[from] ConfigError),

    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("Syntax analysis failed: {0}")]
    SyntaxAnalysis(#[from] SyntaxError),

    #[error("AST construction failed: {0}")]
    AstConstruction(#[from] AstError),

    #[error("Semantic analysis failed: {0}")]
    SemanticAnalysis(#[from] SemanticError),

    #[error("Failed to write output file '{path}': {source}")]
    OutputWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    /// Code of the stage error this wraps
    pub fn error_code(&self) -> Code {
        match self {
            Self::Configuration(e) => e.error_code(),
            Self::FileProcessing(e) => e.error_code(),
            Self::LexicalAnalysis(e) => e.error_code(),
            Self::SyntaxAnalysis(e) => e.error_code(),
            Self::AstConstruction(e) => e.error_code(),
            Self::SemanticAnalysis(e) => e.error_code(),
            Self::OutputWrite { .. } => codes::file_processing::IO_ERROR,
            Self::Pipeline { .. } => codes::system::INTERNAL_ERROR,
        }
    }

    /// Source position of the failure, for stages that track one
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::SyntaxAnalysis(e) => e.span(),
            Self::AstConstruction(e) => e.span(),
            Self::SemanticAnalysis(e) => e.span(),
            _ => None,
        }
    }

    /// Message with the parser's rule trail and hint when available
    pub fn detailed_message(&self) -> String {
        match self {
            Self::SyntaxAnalysis(e) => e.enhanced_message(),
            other => other.to_string(),
        }
    }

    /// Human-readable name of the failing stage
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::FileProcessing(_) => "file processing",
            Self::LexicalAnalysis(_) => "lexical analysis",
            Self::SyntaxAnalysis(_) => "syntax analysis",
            Self::AstConstruction(_) => "AST construction",
            Self::SemanticAnalysis(_) => "semantic analysis",
            Self::OutputWrite { .. } => "output",
            Self::Pipeline { .. } => "pipeline",
        }
    }
}
