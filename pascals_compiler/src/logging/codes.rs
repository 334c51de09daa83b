//! Consolidated error codes and classification system
//!
//! Single source of truth for every code the compiler emits, together with its
//! behavioural metadata (severity, recoverability, halt requirement).

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR003");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const UNKNOWN_CHARACTER: Code = Code::new("E020");
    pub const DFA_RULES_UNREADABLE: Code = Code::new("E021");
    pub const DFA_RULES_MALFORMED: Code = Code::new("E022");
    pub const DFA_RULES_INCOMPLETE: Code = Code::new("E023");
    pub const DFA_INVALID_STATE: Code = Code::new("E024");
    pub const UNMAPPED_FINAL_STATE: Code = Code::new("E025");
    pub const LEXEME_TOO_LONG: Code = Code::new("E026");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
    pub const UNTERMINATED_COMMENT: Code = Code::new("E028");
}

/// Syntax analysis error codes
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E040");
    pub const EMPTY_TOKEN_STREAM: Code = Code::new("E041");
    pub const UNEXPECTED_END_OF_INPUT: Code = Code::new("E042");
    pub const GRAMMAR_VIOLATION: Code = Code::new("E043");
    pub const TRAILING_TOKENS: Code = Code::new("E044");
    pub const MAX_RECURSION_DEPTH: Code = Code::new("E047");
}

/// AST construction error codes
pub mod ast {
    use super::Code;

    pub const MALFORMED_PARSE_TREE: Code = Code::new("E060");
    pub const UNSUPPORTED_CONSTRUCT: Code = Code::new("E061");
}

/// Symbol table error codes
pub mod symbols {
    use super::Code;

    pub const SCOPE_UNDERFLOW: Code = Code::new("E091");
    pub const NESTING_TOO_DEEP: Code = Code::new("E092");
    pub const TABLE_CAPACITY_EXCEEDED: Code = Code::new("E093");
    pub const INVALID_ARRAY_BOUNDS: Code = Code::new("E094");
}

/// Semantic analysis error codes
pub mod semantic {
    use super::Code;

    pub const UNDECLARED_IDENTIFIER: Code = Code::new("E180");
    pub const TYPE_MISMATCH: Code = Code::new("E181");
    pub const INVALID_CONDITION: Code = Code::new("E182");
    pub const INVALID_OPERAND: Code = Code::new("E183");
    pub const UNKNOWN_PROCEDURE: Code = Code::new("E184");
    pub const WRONG_OBJECT_KIND: Code = Code::new("E185");
    pub const INVALID_LOOP_VARIABLE: Code = Code::new("E186");
    pub const REDECLARATION: Code = Code::new("E187");
    pub const NON_CONSTANT_EXPRESSION: Code = Code::new("E188");
    pub const UNKNOWN_TYPE: Code = Code::new("E189");
    pub const ARGUMENT_COUNT_MISMATCH: Code = Code::new("E190");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const DFA_RULES_LOADED: Code = Code::new("I010");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const PARSE_TREE_COMPLETE: Code = Code::new("I040");
    pub const AST_CONSTRUCTION_COMPLETE: Code = Code::new("I060");
    pub const SEMANTIC_ANALYSIS_COMPLETE: Code = Code::new("I180");
    pub const PIPELINE_COMPLETE: Code = Code::new("I200");
}

/// Warning codes
pub mod warnings {
    use super::Code;

    pub const GENERIC_WARNING: Code = Code::new("W000");
    pub const REDECLARATION_ALLOWED: Code = Code::new("W187");
    pub const LARGE_FILE: Code = Code::new("W007");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

type Entry = (
    &'static str,
    &'static str,
    Severity,
    bool,
    bool,
    &'static str,
    &'static str,
);

// (code, category, severity, recoverable, requires_halt, description, action)
const REGISTRY_ENTRIES: &[Entry] = &[
    ("ERR001", "System", Severity::Critical, false, true,
        "Internal compiler error",
        "Report the failing input together with the log output"),
    ("ERR002", "System", Severity::Critical, false, true,
        "Logging or pipeline initialisation failed",
        "Check configuration files and environment variables"),
    ("ERR003", "System", Severity::High, false, true,
        "Runtime configuration could not be loaded",
        "Fix the TOML file passed with --config"),
    ("E005", "FileProcessing", Severity::High, false, true,
        "Source file not found",
        "Check the path passed on the command line"),
    ("E006", "FileProcessing", Severity::Medium, false, true,
        "Source file does not have the .pas extension",
        "Rename the file or disable extension checking"),
    ("E007", "FileProcessing", Severity::High, false, true,
        "Source file exceeds the compile-time size limit",
        "Split the program or raise max_file_size in the build profile"),
    ("E008", "FileProcessing", Severity::Medium, false, true,
        "Source file is empty",
        "Provide a program with at least a header and a body"),
    ("E009", "FileProcessing", Severity::High, false, true,
        "Permission denied while reading the source file",
        "Check file permissions"),
    ("E010", "FileProcessing", Severity::High, false, true,
        "Source file is not valid UTF-8",
        "Re-encode the file as UTF-8"),
    ("E011", "FileProcessing", Severity::High, false, true,
        "I/O error while reading or writing a file",
        "Check disk state and retry"),
    ("E012", "FileProcessing", Severity::Medium, false, true,
        "Path does not name a regular file",
        "Pass a file, not a directory"),
    ("E020", "Lexical", Severity::Medium, true, false,
        "Character matches no DFA transition",
        "Remove or replace the character"),
    ("E021", "Lexical", Severity::Critical, false, true,
        "DFA rule file could not be read",
        "Check the rule file path and permissions"),
    ("E022", "Lexical", Severity::Critical, false, true,
        "DFA rule file is not valid JSON for a DFA definition",
        "Validate the rule file against the expected schema"),
    ("E023", "Lexical", Severity::Critical, false, true,
        "DFA rule file is missing start_state, final_states or transitions",
        "Add the missing top-level field"),
    ("E024", "Lexical", Severity::Critical, false, true,
        "DFA transition references an undefined state",
        "Declare every target state in the transition table"),
    ("E025", "Lexical", Severity::Medium, true, false,
        "Final state has no token kind mapping",
        "Map the final state to a token kind in the rule file"),
    ("E026", "Lexical", Severity::High, false, true,
        "Lexeme exceeds the maximum length",
        "Shorten the identifier or literal"),
    ("E027", "Lexical", Severity::High, false, true,
        "Token count exceeds the compile-time limit",
        "Split the program into smaller units"),
    ("E028", "Lexical", Severity::Low, true, false,
        "Comment runs to end of file without a terminator",
        "Close the comment with } or *)"),
    ("E040", "Syntax", Severity::High, false, true,
        "Token does not match the grammar at this position",
        "Check the statement near the reported token"),
    ("E041", "Syntax", Severity::High, false, true,
        "Parser received no tokens",
        "Provide a non-empty program"),
    ("E042", "Syntax", Severity::High, false, true,
        "Input ended before the program was complete",
        "Check for a missing 'selesai' or final '.'"),
    ("E043", "Syntax", Severity::High, false, true,
        "Construct violates the Pascal-S grammar",
        "Consult the grammar for the reported rule"),
    ("E044", "Syntax", Severity::Medium, false, true,
        "Tokens remain after the final '.'",
        "Remove text after the end of the program"),
    ("E047", "Syntax", Severity::High, false, true,
        "Nesting exceeds the maximum parse depth",
        "Reduce expression or statement nesting"),
    ("E060", "Ast", Severity::Critical, false, true,
        "Parse tree does not have the shape expected for its label",
        "Report the failing input"),
    ("E061", "Ast", Severity::High, false, true,
        "Construct is parsed but not lowered to the AST",
        "Rewrite using supported constructs"),
    ("E091", "Symbols", Severity::Critical, false, true,
        "Attempted to close the global scope",
        "Report the failing input"),
    ("E092", "Symbols", Severity::High, false, true,
        "Subprogram nesting exceeds the maximum level",
        "Flatten nested procedures"),
    ("E093", "Symbols", Severity::High, false, true,
        "Symbol table capacity exceeded",
        "Reduce the number of declarations"),
    ("E094", "Symbols", Severity::High, false, true,
        "Array bounds are inverted or too large",
        "Make the lower bound not greater than the upper bound"),
    ("E180", "Semantic", Severity::High, false, true,
        "Identifier used but never declared",
        "Declare the identifier in an enclosing scope"),
    ("E181", "Semantic", Severity::High, false, true,
        "Assigned value type is not compatible with the target",
        "Only identical types or integer to real are allowed"),
    ("E182", "Semantic", Severity::High, false, true,
        "Condition is not boolean",
        "Use a relational or logical expression"),
    ("E183", "Semantic", Severity::High, false, true,
        "Operator applied to operands of the wrong type",
        "Check the operand types of the reported operator"),
    ("E184", "Semantic", Severity::High, false, true,
        "Call to an unknown procedure",
        "Declare the procedure or use a built-in"),
    ("E185", "Semantic", Severity::High, false, true,
        "Identifier is used as the wrong kind of object",
        "Check whether the name is a variable, type or subprogram"),
    ("E186", "Semantic", Severity::High, false, true,
        "For-loop variable is undeclared or not integer",
        "Declare the loop counter as integer"),
    ("E187", "Semantic", Severity::High, false, true,
        "Identifier redeclared in the same scope",
        "Rename or remove the duplicate declaration"),
    ("E188", "Semantic", Severity::High, false, true,
        "Expression cannot be evaluated at compile time",
        "Use literals and constants in array bounds"),
    ("E189", "Semantic", Severity::High, false, true,
        "Type name does not denote a type",
        "Declare the type with 'tipe' before use"),
    ("E190", "Semantic", Severity::High, false, true,
        "Wrong number of arguments in a call",
        "Match the subprogram's parameter list"),
    ("W000", "General", Severity::Low, true, false,
        "Generic warning",
        "No specific action available"),
    ("W007", "FileProcessing", Severity::Low, true, false,
        "Source file is larger than the large-file threshold",
        "No action required"),
    ("W187", "Semantic", Severity::Low, true, false,
        "Redeclaration accepted under the lenient policy",
        "Switch to the strict policy to reject redeclarations"),
    ("I001", "System", Severity::Low, true, false,
        "Logging system initialised", "Continue"),
    ("I006", "FileProcessing", Severity::Low, true, false,
        "Source file read", "Continue to lexical analysis"),
    ("I010", "Lexical", Severity::Low, true, false,
        "DFA rules loaded", "Continue to scanning"),
    ("I020", "Lexical", Severity::Low, true, false,
        "Scanning completed", "Continue to parsing"),
    ("I040", "Syntax", Severity::Low, true, false,
        "Parse tree built", "Continue to AST construction"),
    ("I060", "Ast", Severity::Low, true, false,
        "AST built", "Continue to semantic analysis"),
    ("I180", "Semantic", Severity::Low, true, false,
        "Semantic analysis completed", "Print decorated output"),
    ("I200", "Pipeline", Severity::Low, true, false,
        "All pipeline stages completed", "Continue"),
];

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    static REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        REGISTRY_ENTRIES
            .iter()
            .map(
                |&(code, category, severity, recoverable, requires_halt, description, action)| {
                    (
                        code,
                        ErrorMetadata {
                            code,
                            category,
                            severity,
                            recoverable,
                            requires_halt,
                            description,
                            recommended_action: action,
                        },
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_no_duplicate_codes() {
        assert_eq!(get_error_registry().len(), REGISTRY_ENTRIES.len());
    }

    #[test]
    fn test_lexical_errors_are_recoverable() {
        let unknown = get_error_metadata(lexical::UNKNOWN_CHARACTER.as_str()).unwrap();
        assert!(unknown.recoverable);
        assert!(!requires_halt(lexical::UNKNOWN_CHARACTER.as_str()));
        assert!(requires_halt(lexical::DFA_RULES_INCOMPLETE.as_str()));
    }

    #[test]
    fn test_syntax_and_semantic_errors_halt() {
        assert!(requires_halt(syntax::UNEXPECTED_TOKEN.as_str()));
        assert!(requires_halt(semantic::TYPE_MISMATCH.as_str()));
        assert_eq!(get_category(semantic::UNDECLARED_IDENTIFIER.as_str()), "Semantic");
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("Z999"), "Unknown error");
        assert_eq!(get_category("Z999"), "Unknown");
        assert_eq!(get_severity("Z999"), Severity::Medium);
    }

    #[test]
    fn test_every_success_code_registered() {
        for code in [
            success::SYSTEM_INITIALIZATION_COMPLETED,
            success::TOKENIZATION_COMPLETE,
            success::PARSE_TREE_COMPLETE,
            success::AST_CONSTRUCTION_COMPLETE,
            success::SEMANTIC_ANALYSIS_COMPLETE,
            success::PIPELINE_COMPLETE,
        ] {
            assert!(get_error_metadata(code.as_str()).is_some(), "{}", code);
        }
    }
}
