// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Errors raised while loading a runtime configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in '{path}': {message}")]
    Parse { path: String, message: String },
}

impl ConfigError {
    pub fn error_code(&self) -> crate::logging::Code {
        crate::logging::codes::system::CONFIGURATION_ERROR
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Whether to reject files without a .pas extension
    pub require_pas_extension: bool,

    /// Whether to log read duration and size after each file
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_pas_extension: env_flag(env_vars::REQUIRE_PAS_EXTENSION, false),
            enable_performance_logging: env_flag(env_vars::ENABLE_PERFORMANCE_LOGGING, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// DFA rule file to load instead of the rules embedded in the binary
    pub dfa_rules_path: Option<String>,

    /// Reserved words added on top of the default keyword list
    pub extra_keywords: Vec<String>,

    /// Whether to collect per-kind token counts
    pub collect_detailed_metrics: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            dfa_rules_path: env::var(env_vars::LEXICAL_DFA_RULES).ok(),
            extra_keywords: env::var(env_vars::LEXICAL_EXTRA_KEYWORDS)
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_lowercase())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            collect_detailed_metrics: env_flag(env_vars::LEXICAL_DETAILED_METRICS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntaxPreferences {
    /// Whether the parser keeps a trail of grammar rules for error messages
    pub track_context: bool,
}

impl Default for SyntaxPreferences {
    fn default() -> Self {
        Self {
            track_context: env_flag(env_vars::SYNTAX_TRACK_CONTEXT, true),
        }
    }
}

/// How a second declaration of a name in the same scope is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedeclarationPolicy {
    /// Abort analysis with a semantic error
    Strict,
    /// Log a warning and register the new entry anyway
    Lenient,
}

impl RedeclarationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedeclarationPolicy::Strict => "strict",
            RedeclarationPolicy::Lenient => "lenient",
        }
    }
}

fn parse_redeclaration_policy(value: &str) -> Option<RedeclarationPolicy> {
    match value.to_lowercase().as_str() {
        "strict" | "error" => Some(RedeclarationPolicy::Strict),
        "lenient" | "warn" | "warning" => Some(RedeclarationPolicy::Lenient),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticPreferences {
    /// Redeclaration handling within a single scope
    pub redeclaration_policy: RedeclarationPolicy,

    /// Whether scope entry and exit are logged at debug level
    pub log_scope_transitions: bool,
}

impl Default for SemanticPreferences {
    fn default() -> Self {
        Self {
            redeclaration_policy: env::var(env_vars::SEMANTIC_REDECLARATION_POLICY)
                .ok()
                .and_then(|v| parse_redeclaration_policy(&v))
                .unwrap_or(RedeclarationPolicy::Strict),
            log_scope_transitions: env_flag(env_vars::SEMANTIC_LOG_SCOPES, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches the configured sinks
    pub min_log_level: LogLevel,

    /// Whether to print the cargo-style summary at the end of a run
    pub enable_cargo_style_output: bool,

    /// Whether to include file context in log messages
    pub include_file_context: bool,

    /// Append every event to this file as well
    pub log_file_path: Option<String>,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_flag(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            enable_cargo_style_output: env_flag(env_vars::LOGGING_CARGO_STYLE, true),
            include_file_context: env_flag(env_vars::LOGGING_INCLUDE_FILE_CONTEXT, true),
            log_file_path: env::var(env_vars::LOGGING_FILE).ok(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub syntax: SyntaxPreferences,
    pub semantic: SemanticPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse a TOML document; missing sections fall back to their defaults
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Load preferences from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_PAS_EXTENSION: &str = "PASCALS_REQUIRE_PAS_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "PASCALS_ENABLE_PERFORMANCE_LOGGING";

    // Lexical
    pub const LEXICAL_DFA_RULES: &str = "PASCALS_LEXICAL_DFA_RULES";
    pub const LEXICAL_EXTRA_KEYWORDS: &str = "PASCALS_LEXICAL_EXTRA_KEYWORDS";
    pub const LEXICAL_DETAILED_METRICS: &str = "PASCALS_LEXICAL_DETAILED_METRICS";

    // Syntax
    pub const SYNTAX_TRACK_CONTEXT: &str = "PASCALS_SYNTAX_TRACK_CONTEXT";

    // Semantic
    pub const SEMANTIC_REDECLARATION_POLICY: &str = "PASCALS_SEMANTIC_REDECLARATION_POLICY";
    pub const SEMANTIC_LOG_SCOPES: &str = "PASCALS_SEMANTIC_LOG_SCOPES";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "PASCALS_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "PASCALS_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "PASCALS_LOGGING_MIN_LEVEL";
    pub const LOGGING_CARGO_STYLE: &str = "PASCALS_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "PASCALS_LOGGING_INCLUDE_FILE_CONTEXT";
    pub const LOGGING_FILE: &str = "PASCALS_LOGGING_FILE";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("WARN"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("2"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_redeclaration_policy_parsing() {
        assert_eq!(
            parse_redeclaration_policy("Strict"),
            Some(RedeclarationPolicy::Strict)
        );
        assert_eq!(
            parse_redeclaration_policy("warn"),
            Some(RedeclarationPolicy::Lenient)
        );
        assert_eq!(parse_redeclaration_policy("maybe"), None);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = RuntimeConfig::from_toml_str(
            "[semantic]\nredeclaration_policy = \"lenient\"\n",
            "inline",
        )
        .unwrap();
        assert_eq!(
            config.semantic.redeclaration_policy,
            RedeclarationPolicy::Lenient
        );
    }

    #[test]
    fn test_invalid_toml_reports_origin() {
        let err = RuntimeConfig::from_toml_str("[semantic\n", "broken.toml").unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[lexical]\nextra_keywords = [\"ulangi\"]").unwrap();

        let config = RuntimeConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.lexical.extra_keywords, vec!["ulangi".to_string()]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = RuntimeConfig::load_from_file("/definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
