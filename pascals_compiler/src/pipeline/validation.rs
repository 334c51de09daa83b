/// Check that every stage's codes and limits are registered before a run
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating pipeline configuration");

    crate::file_processor::init_file_processor_logging()?;
    crate::lexical::init_lexical_analysis_logging()?;
    crate::syntax::init_syntax_logging()?;
    crate::ast::init_ast_logging()?;
    crate::symbols::init_symbols_logging()?;
    crate::semantic_analysis::init_semantic_analysis_logging()?;

    crate::log_success!(
        crate::logging::codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Pipeline validation succeeded",
        "stages_validated" => 6
    );

    Ok(())
}
