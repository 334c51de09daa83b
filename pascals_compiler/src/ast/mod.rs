//! AST construction from the parse tree

pub mod builder;
pub mod nodes;

pub use builder::{AstBuilder, AstError, AstResult};
pub use nodes::{AstNode, ForDirection, Identifier, NodeKind, TypeSpec};

use crate::logging::codes;
use crate::syntax::ParseNode;
use crate::{log_debug, log_error, log_success};

pub const VERSION: &str = "1.0.0";

/// Lower a parse tree, logging the outcome
pub fn build_ast(tree: &ParseNode) -> AstResult<Option<AstNode>> {
    let mut builder = AstBuilder::new();
    let result = builder.build(tree);

    match &result {
        Ok(Some(ast)) => {
            log_success!(codes::success::AST_CONSTRUCTION_COMPLETE,
                "AST construction completed",
                "nodes" => ast.node_count(),
                "parse_nodes" => tree.node_count()
            );
        }
        Ok(None) => log_debug!("Empty parse tree, no AST produced"),
        Err(error) => match error.span() {
            Some(span) => {
                log_error!(error.error_code(), "AST construction failed",
                    span = span,
                    "error" => error.to_string()
                );
            }
            None => {
                log_error!(error.error_code(), "AST construction failed",
                    "error" => error.to_string()
                );
            }
        },
    }

    result
}

pub fn init_ast_logging() -> Result<(), String> {
    for code in [
        codes::ast::MALFORMED_PARSE_TREE,
        codes::ast::UNSUPPORTED_CONSTRUCT,
    ] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "AST error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }
    log_debug!("AST module logging validation completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize_source;
    use crate::syntax::parse_tokens;

    #[test]
    fn test_build_ast_counts_nodes() {
        let tokens = tokenize_source("program p; variabel x: integer; mulai x := 1 selesai.").unwrap();
        let tree = parse_tokens(tokens).unwrap();
        let ast = build_ast(&tree).unwrap().unwrap();
        // Program, Block, VarDecl, Var, Type, Compound, Assign, Var, Num
        assert_eq!(ast.node_count(), 9);
    }

    #[test]
    fn test_init_ast_logging() {
        assert!(init_ast_logging().is_ok());
    }
}
