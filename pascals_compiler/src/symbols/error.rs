//! Symbol table errors

use crate::config::constants::compile_time::symbols::*;
use crate::logging::{codes, Code};

pub type SymbolResult<T> = Result<T, SymbolError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SymbolError {
    #[error("Cannot exit the global scope")]
    ScopeUnderflow,

    #[error("Nesting level {level} exceeds the maximum of {MAX_NESTING_LEVEL}")]
    NestingTooDeep { level: usize },

    #[error("{table} is full ({limit} entries)")]
    CapacityExceeded { table: &'static str, limit: usize },

    #[error("Invalid array bounds [{low}..{high}]")]
    InvalidArrayBounds { low: i64, high: i64 },

    #[error("Array of {count} elements exceeds the maximum of {MAX_ARRAY_ELEMENTS}")]
    ArrayTooLarge { count: i64 },

    #[error("Variable storage of block {block} exceeds the addressable range")]
    StorageOverflow { block: usize },
}

impl SymbolError {
    pub fn capacity_exceeded(table: &'static str, limit: usize) -> Self {
        Self::CapacityExceeded { table, limit }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::ScopeUnderflow => codes::symbols::SCOPE_UNDERFLOW,
            Self::NestingTooDeep { .. } => codes::symbols::NESTING_TOO_DEEP,
            Self::CapacityExceeded { .. } | Self::StorageOverflow { .. } => {
                codes::symbols::TABLE_CAPACITY_EXCEEDED
            }
            Self::InvalidArrayBounds { .. } | Self::ArrayTooLarge { .. } => {
                codes::symbols::INVALID_ARRAY_BOUNDS
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SymbolError::ScopeUnderflow.error_code().as_str(), "E091");
        assert_eq!(
            SymbolError::InvalidArrayBounds { low: 5, high: 1 }.error_code(),
            codes::symbols::INVALID_ARRAY_BOUNDS
        );
        assert_eq!(
            SymbolError::capacity_exceeded("tab", 10).to_string(),
            "tab is full (10 entries)"
        );
    }
}
