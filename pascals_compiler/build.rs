// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    file_processing: FileProcessingLimits,
    lexical: LexicalLimits,
    syntax: SyntaxLimits,
    symbols: SymbolLimits,
    semantic: SemanticLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
    large_file_threshold: u64,
    max_line_count: usize,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_token_count: usize,
    max_lexeme_length: usize,
    max_dfa_states: usize,
    max_dfa_rules_size: u64,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    max_parse_depth: usize,
    max_context_stack_depth: usize,
}

#[derive(serde::Deserialize)]
struct SymbolLimits {
    max_identifier_entries: usize,
    max_block_entries: usize,
    max_array_entries: usize,
    max_nesting_level: usize,
    max_array_elements: i64,
}

#[derive(serde::Deserialize)]
struct SemanticLimits {
    max_error_message_length: usize,
    max_call_arguments: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_file: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=PASCALS_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=PASCALS_CONFIG_DIR");

    let profile = env::var("PASCALS_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("PASCALS_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the pascals_compiler directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_FILE_SIZE: u64 = 100_000_000;
    const ABSOLUTE_MAX_PARSE_DEPTH: usize = 10_000;
    const ABSOLUTE_MAX_NESTING_LEVEL: usize = 1_000;

    if config.file_processing.max_file_size > ABSOLUTE_MAX_FILE_SIZE {
        panic!("LIMIT: max_file_size exceeds absolute maximum");
    }

    if config.syntax.max_parse_depth > ABSOLUTE_MAX_PARSE_DEPTH {
        panic!("LIMIT: max_parse_depth exceeds absolute maximum");
    }

    if config.symbols.max_nesting_level > ABSOLUTE_MAX_NESTING_LEVEL {
        panic!("LIMIT: max_nesting_level exceeds absolute maximum");
    }

    if config.symbols.max_array_elements <= 0 {
        panic!("LIMIT: max_array_elements must be positive");
    }

    if config.logging.max_log_events_per_file > config.logging.log_buffer_size {
        panic!("LIMIT: max_log_events_per_file exceeds log_buffer_size");
    }

    if profile == "production" && config.file_processing.max_file_size > 10_000_000 {
        panic!("PRODUCTION: max_file_size too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod file_processing {{
        pub const MAX_FILE_SIZE: u64 = {};
        pub const LARGE_FILE_THRESHOLD: u64 = {};
        pub const MAX_LINE_COUNT: usize = {};
    }}

    pub mod lexical {{
        pub const MAX_TOKEN_COUNT: usize = {};
        pub const MAX_LEXEME_LENGTH: usize = {};
        pub const MAX_DFA_STATES: usize = {};
        pub const MAX_DFA_RULES_SIZE: u64 = {};
    }}

    pub mod syntax {{
        pub const MAX_PARSE_DEPTH: usize = {};
        pub const MAX_CONTEXT_STACK_DEPTH: usize = {};
    }}

    pub mod symbols {{
        pub const MAX_IDENTIFIER_ENTRIES: usize = {};
        pub const MAX_BLOCK_ENTRIES: usize = {};
        pub const MAX_ARRAY_ENTRIES: usize = {};
        pub const MAX_NESTING_LEVEL: usize = {};
        pub const MAX_ARRAY_ELEMENTS: i64 = {};
    }}

    pub mod semantic {{
        pub const MAX_ERROR_MESSAGE_LENGTH: usize = {};
        pub const MAX_CALL_ARGUMENTS: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_FILE: usize = {};
    }}
}}
"#,
        profile,
        config.file_processing.max_file_size,
        config.file_processing.large_file_threshold,
        config.file_processing.max_line_count,
        config.lexical.max_token_count,
        config.lexical.max_lexeme_length,
        config.lexical.max_dfa_states,
        config.lexical.max_dfa_rules_size,
        config.syntax.max_parse_depth,
        config.syntax.max_context_stack_depth,
        config.symbols.max_identifier_entries,
        config.symbols.max_block_entries,
        config.symbols.max_array_entries,
        config.symbols.max_nesting_level,
        config.symbols.max_array_elements,
        config.semantic.max_error_message_length,
        config.semantic.max_call_arguments,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.max_log_events_per_file,
    );

    fs::write(output_path, constants_code).unwrap();
}
