//! Symbol table module
//!
//! Flat `tab`/`btab`/`atab` tables with a display of open blocks. The
//! semantic analyzer is the only writer; the printers render the final
//! state for the output file.

use crate::logging::codes;
use crate::log_debug;

pub mod error;
pub mod printer;
pub mod table;

pub use error::{SymbolError, SymbolResult};
pub use printer::{format_atab, format_btab, format_tab, format_tables};
pub use table::{ArrayEntry, BlockEntry, ObjectKind, SymbolTable, TabEntry};

/// Module constants
pub const VERSION: &str = "1.0.0";

pub fn init_symbols_logging() -> Result<(), String> {
    let required_codes = [
        codes::symbols::SCOPE_UNDERFLOW,
        codes::symbols::NESTING_TOO_DEEP,
        codes::symbols::TABLE_CAPACITY_EXCEEDED,
        codes::symbols::INVALID_ARRAY_BOUNDS,
    ];

    for code in &required_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Symbol error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    let table = SymbolTable::new();
    if table.lookup("integer").is_none() {
        return Err("Base types were not preloaded".to_string());
    }

    log_debug!("Symbol table logging validation completed",
        "base_types" => table.tab().len() - 1
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_symbols_logging() {
        assert!(init_symbols_logging().is_ok());
    }
}
