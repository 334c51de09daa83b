//! Plain-text dumps of `tab`, `btab` and `atab`

use crate::symbols::table::SymbolTable;
use std::fmt::Write;

pub fn format_tab(table: &SymbolTable) -> String {
    let mut out = String::from("=== SYMBOL TABLE (TAB) ===\n");
    let header = format!(
        "{:<4} | {:<15} | {:<4} | {:<10} | {:<4} | {:<4} | {:<4} | {:<4} | {:<4}",
        "Idx", "ID", "Link", "Obj", "Type", "Ref", "Nrm", "Lev", "Adr"
    );
    let _ = writeln!(out, "{}", header);
    let _ = writeln!(out, "{}", "-".repeat(header.len()));

    // Row 0 is the chain terminator
    for (idx, entry) in table.tab().iter().enumerate().skip(1) {
        let _ = writeln!(
            out,
            "{:<4} | {:<15} | {:<4} | {:<10} | {:<4} | {:<4} | {:<4} | {:<4} | {:<4}",
            idx,
            entry.id,
            entry.link,
            entry.obj.as_str(),
            entry.typ.code(),
            entry.reference,
            entry.nrm,
            entry.lev,
            entry.adr
        );
    }
    out
}

pub fn format_btab(table: &SymbolTable) -> String {
    let mut out = String::from("\n=== BLOCK TABLE (BTAB) ===\n");
    let header = format!(
        "{:<4} | {:<4} | {:<4} | {:<4} | {:<4}",
        "Idx", "Last", "Lpar", "Psze", "Vsze"
    );
    let _ = writeln!(out, "{}", header);
    let _ = writeln!(out, "{}", "-".repeat(header.len()));

    for (idx, block) in table.btab().iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<4} | {:<4} | {:<4} | {:<4} | {:<4}",
            idx, block.last, block.lpar, block.psze, block.vsze
        );
    }
    out
}

pub fn format_atab(table: &SymbolTable) -> String {
    let mut out = String::from("\n=== ARRAY TABLE (ATAB) ===\n");
    if table.atab().is_empty() {
        out.push_str("(Kosong)\n");
        return out;
    }

    let header = format!(
        "{:<4} | {:<4} | {:<4} | {:<4} | {:<6} | {:<6} | {:<4} | {:<6}",
        "Idx", "Xtyp", "Etyp", "Eref", "Low", "High", "Elsz", "Size"
    );
    let _ = writeln!(out, "{}", header);
    let _ = writeln!(out, "{}", "-".repeat(header.len()));

    for (idx, array) in table.atab().iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<4} | {:<4} | {:<4} | {:<4} | {:<6} | {:<6} | {:<4} | {:<6}",
            idx,
            array.xtyp.code(),
            array.etyp.code(),
            array.eref,
            array.low,
            array.high,
            array.elsz,
            array.size
        );
    }
    out
}

/// All three tables, in the order they are written to the output file
pub fn format_tables(table: &SymbolTable) -> String {
    let mut out = format_tab(table);
    out.push_str(&format_btab(table));
    out.push_str(&format_atab(table));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic_analysis::types::TypeCode;

    #[test]
    fn test_tab_skips_sentinel() {
        let mut table = SymbolTable::new();
        table.add_variable("total", TypeCode::Real, 0, 1).unwrap();
        let text = format_tab(&table);

        assert!(text.starts_with("=== SYMBOL TABLE (TAB) ===\n"));
        assert!(text.contains("Idx  | ID              | Link"));
        assert!(!text.lines().any(|l| l.starts_with("0    |")));
        let row = text.lines().find(|l| l.contains("total")).unwrap();
        assert!(row.starts_with("5    | total"));
        assert!(row.contains("| variable   | 2    |"));
    }

    #[test]
    fn test_empty_atab_marker() {
        let table = SymbolTable::new();
        assert!(format_atab(&table).contains("(Kosong)"));
    }

    #[test]
    fn test_atab_rows() {
        let mut table = SymbolTable::new();
        table
            .add_array(TypeCode::Integer, TypeCode::Char, 0, 1, 10, 1)
            .unwrap();
        let text = format_atab(&table);
        assert!(!text.contains("(Kosong)"));
        assert!(text.lines().any(|l| l.starts_with("0    | 1    | 4    | 0    | 1      | 10")));
    }

    #[test]
    fn test_tables_in_order() {
        let text = format_tables(&SymbolTable::new());
        let tab = text.find("(TAB)").unwrap();
        let btab = text.find("(BTAB)").unwrap();
        let atab = text.find("(ATAB)").unwrap();
        assert!(tab < btab && btab < atab);
    }
}
