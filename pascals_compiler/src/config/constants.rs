//! Fixed language constants
//!
//! Unlike `compile_time`, these values describe the language itself and are
//! not tunable per build profile.

/// Generated per-profile limits, reachable next to the language constants
pub use super::compile_time;

pub mod language {
    /// Source file extension accepted when extension checking is enabled
    pub const SOURCE_EXTENSION: &str = "pas";

    /// Extension of the decorated output written next to the input
    pub const OUTPUT_EXTENSION: &str = "out";

    /// Default location of the DFA rule file, relative to the working directory
    pub const DEFAULT_DFA_RULES_PATH: &str = "pascals_compiler/rules/dfa_rules.json";

    /// Reserved words recognised when the DFA reports an identifier candidate.
    /// Matching is case-insensitive.
    pub const DEFAULT_KEYWORDS: &[&str] = &[
        "program",
        "variabel",
        "mulai",
        "selesai",
        "jika",
        "maka",
        "selain_itu",
        "selama",
        "lakukan",
        "untuk",
        "ke",
        "turun_ke",
        "integer",
        "real",
        "boolean",
        "char",
        "larik",
        "dari",
        "prosedur",
        "fungsi",
        "konstanta",
        "tipe",
        "div",
        "mod",
        "and",
        "or",
        "not",
        "bagi",
        "dan",
        "atau",
        "tidak",
        "true",
        "false",
    ];

    /// Procedures callable without a declaration
    pub const BUILTIN_PROCEDURES: &[&str] = &["writeln", "write", "readln", "read"];
}

#[cfg(test)]
mod tests {
    use super::language::*;

    #[test]
    fn test_keywords_are_lowercase_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for kw in DEFAULT_KEYWORDS {
            assert_eq!(*kw, kw.to_lowercase());
            assert!(seen.insert(*kw), "duplicate keyword {}", kw);
        }
    }

    #[test]
    fn test_builtins_are_not_keywords() {
        for name in BUILTIN_PROCEDURES {
            assert!(!DEFAULT_KEYWORDS.contains(name));
        }
    }
}
