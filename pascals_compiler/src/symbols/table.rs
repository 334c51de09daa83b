//! Block-structured symbol table
//!
//! `tab` holds every identifier ever declared. Entries of one block form a
//! singly linked chain through `link`, anchored at that block's `last` in
//! `btab`; index 0 is a sentinel that terminates every chain. The base types
//! occupy indices 1..=4 outside any chain and are found by the lookup
//! fallback. `display[level]` names the block open at each nesting level.
//! Closing a scope pops the display only, so entries survive for the dumps.

use crate::config::constants::compile_time::symbols::*;
use crate::semantic_analysis::types::TypeCode;
use crate::symbols::error::{SymbolError, SymbolResult};
use serde::Serialize;
use std::fmt;

/// Kind of object an identifier names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Constant,
    Variable,
    Type,
    Procedure,
    Function,
    Program,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Constant => "constant",
            ObjectKind::Variable => "variable",
            ObjectKind::Type => "type",
            ObjectKind::Procedure => "procedure",
            ObjectKind::Function => "function",
            ObjectKind::Program => "program",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `tab` row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabEntry {
    pub id: String,
    /// Previous entry of the same block, 0 at the end of the chain
    pub link: usize,
    pub obj: ObjectKind,
    pub typ: TypeCode,
    /// `atab` index for arrays, `btab` index for subprograms
    pub reference: usize,
    /// 1 for plain variables and value parameters
    pub nrm: u8,
    pub lev: usize,
    /// Storage offset for variables, value for integer constants
    pub adr: i64,
}

/// One `btab` row
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlockEntry {
    pub last: usize,
    pub lpar: usize,
    pub psze: i64,
    pub vsze: i64,
}

/// One `atab` row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayEntry {
    pub xtyp: TypeCode,
    pub etyp: TypeCode,
    pub eref: usize,
    pub low: i64,
    pub high: i64,
    pub elsz: i64,
    pub size: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolTable {
    tab: Vec<TabEntry>,
    btab: Vec<BlockEntry>,
    atab: Vec<ArrayEntry>,
    display: Vec<usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut tab = Vec::with_capacity(16);
        tab.push(TabEntry {
            id: String::new(),
            link: 0,
            obj: ObjectKind::Constant,
            typ: TypeCode::NoType,
            reference: 0,
            nrm: 0,
            lev: 0,
            adr: 0,
        });
        for typ in TypeCode::BASE_TYPES {
            tab.push(TabEntry {
                id: typ.name().to_string(),
                link: 0,
                obj: ObjectKind::Type,
                typ,
                reference: 0,
                nrm: 0,
                lev: 0,
                adr: 1,
            });
        }

        Self {
            tab,
            btab: vec![BlockEntry::default()],
            atab: Vec::new(),
            display: vec![0],
        }
    }

    /// Current nesting level, 0 for the program scope
    pub fn level(&self) -> usize {
        self.display.len() - 1
    }

    pub fn current_block(&self) -> usize {
        self.display[self.level()]
    }

    /// Open a nested block and return its `btab` index
    pub fn enter_scope(&mut self) -> SymbolResult<usize> {
        if self.level() + 1 > MAX_NESTING_LEVEL {
            return Err(SymbolError::NestingTooDeep {
                level: self.level() + 1,
            });
        }
        if self.btab.len() >= MAX_BLOCK_ENTRIES {
            return Err(SymbolError::capacity_exceeded("btab", MAX_BLOCK_ENTRIES));
        }

        self.btab.push(BlockEntry::default());
        let block = self.btab.len() - 1;
        self.display.push(block);
        Ok(block)
    }

    pub fn exit_scope(&mut self) -> SymbolResult<()> {
        if self.display.len() <= 1 {
            return Err(SymbolError::ScopeUnderflow);
        }
        self.display.pop();
        Ok(())
    }

    fn push_entry(
        &mut self,
        id: &str,
        obj: ObjectKind,
        typ: TypeCode,
        reference: usize,
        adr: i64,
    ) -> SymbolResult<usize> {
        if self.tab.len() >= MAX_IDENTIFIER_ENTRIES {
            return Err(SymbolError::capacity_exceeded("tab", MAX_IDENTIFIER_ENTRIES));
        }

        let block = self.current_block();
        let lev = self.level();
        self.tab.push(TabEntry {
            id: id.to_string(),
            link: self.btab[block].last,
            obj,
            typ,
            reference,
            nrm: u8::from(obj == ObjectKind::Variable),
            lev,
            adr,
        });
        let index = self.tab.len() - 1;
        self.btab[block].last = index;
        Ok(index)
    }

    /// Variable at the next free offset; `size` is 1 for scalars
    pub fn add_variable(
        &mut self,
        id: &str,
        typ: TypeCode,
        reference: usize,
        size: i64,
    ) -> SymbolResult<usize> {
        let block = self.current_block();
        let adr = self.btab[block].vsze;
        let vsze = adr
            .checked_add(size)
            .ok_or(SymbolError::StorageOverflow { block })?;
        let index = self.push_entry(id, ObjectKind::Variable, typ, reference, adr)?;
        self.btab[block].vsze = vsze;
        Ok(index)
    }

    /// Parameter of the current block; also counted in the variable area
    pub fn add_parameter(
        &mut self,
        id: &str,
        typ: TypeCode,
        reference: usize,
        size: i64,
    ) -> SymbolResult<usize> {
        let block = self.current_block();
        let psze = self.btab[block]
            .psze
            .checked_add(size)
            .ok_or(SymbolError::StorageOverflow { block })?;
        let index = self.add_variable(id, typ, reference, size)?;
        self.btab[block].psze = psze;
        self.btab[block].lpar = index;
        Ok(index)
    }

    pub fn add_constant(&mut self, id: &str, typ: TypeCode, value: i64) -> SymbolResult<usize> {
        self.push_entry(id, ObjectKind::Constant, typ, 0, value)
    }

    pub fn add_type(&mut self, id: &str, typ: TypeCode, reference: usize) -> SymbolResult<usize> {
        self.push_entry(id, ObjectKind::Type, typ, reference, 0)
    }

    pub fn add_program(&mut self, id: &str) -> SymbolResult<usize> {
        self.push_entry(id, ObjectKind::Program, TypeCode::NoType, 0, 0)
    }

    /// Procedure or function name in the current (enclosing) scope
    pub fn add_subprogram(
        &mut self,
        id: &str,
        obj: ObjectKind,
        return_type: TypeCode,
    ) -> SymbolResult<usize> {
        self.push_entry(id, obj, return_type, 0, 0)
    }

    /// Point a subprogram entry at its block once the block exists
    pub fn set_reference(&mut self, index: usize, reference: usize) {
        if let Some(entry) = self.tab.get_mut(index) {
            entry.reference = reference;
        }
    }

    /// Register an array type and return its `atab` index
    pub fn add_array(
        &mut self,
        xtyp: TypeCode,
        etyp: TypeCode,
        eref: usize,
        low: i64,
        high: i64,
        elsz: i64,
    ) -> SymbolResult<usize> {
        if low > high {
            return Err(SymbolError::InvalidArrayBounds { low, high });
        }
        let count = high
            .checked_sub(low)
            .and_then(|d| d.checked_add(1))
            .filter(|c| *c <= MAX_ARRAY_ELEMENTS)
            .ok_or(SymbolError::ArrayTooLarge {
                count: high.saturating_sub(low).saturating_add(1),
            })?;
        // Nested arrays multiply out; the whole array obeys the element limit
        let size = count
            .checked_mul(elsz)
            .filter(|s| *s <= MAX_ARRAY_ELEMENTS)
            .ok_or(SymbolError::ArrayTooLarge {
                count: count.saturating_mul(elsz),
            })?;
        if self.atab.len() >= MAX_ARRAY_ENTRIES {
            return Err(SymbolError::capacity_exceeded("atab", MAX_ARRAY_ENTRIES));
        }

        self.atab.push(ArrayEntry {
            xtyp,
            etyp,
            eref,
            low,
            high,
            elsz,
            size,
        });
        Ok(self.atab.len() - 1)
    }

    /// Nearest visible declaration, innermost level first, then base types
    pub fn lookup(&self, name: &str) -> Option<usize> {
        (0..=self.level())
            .rev()
            .find_map(|lev| self.find_in_block(self.display[lev], name))
            .or_else(|| self.lookup_base_type(name))
    }

    /// Declaration in the innermost open block only
    pub fn lookup_in_current_scope(&self, name: &str) -> Option<usize> {
        self.find_in_block(self.current_block(), name)
    }

    fn find_in_block(&self, block: usize, name: &str) -> Option<usize> {
        let mut index = self.btab[block].last;
        while index != 0 {
            let entry = &self.tab[index];
            if entry.id.eq_ignore_ascii_case(name) {
                return Some(index);
            }
            index = entry.link;
        }
        None
    }

    fn lookup_base_type(&self, name: &str) -> Option<usize> {
        (1..=TypeCode::BASE_TYPES.len()).find(|&i| self.tab[i].id.eq_ignore_ascii_case(name))
    }

    /// Parameters of a block in declaration order
    pub fn parameters(&self, block: usize) -> Vec<usize> {
        let mut params = Vec::new();
        let mut index = self.btab.get(block).map_or(0, |b| b.lpar);
        while index != 0 {
            params.push(index);
            index = self.tab[index].link;
        }
        params.reverse();
        params
    }

    /// Storage units taken by a value of this type
    pub fn type_size(&self, typ: TypeCode, reference: usize) -> i64 {
        match typ {
            TypeCode::Array => self.atab.get(reference).map_or(1, |a| a.size),
            _ => 1,
        }
    }

    pub fn entry(&self, index: usize) -> Option<&TabEntry> {
        self.tab.get(index)
    }

    pub fn array(&self, index: usize) -> Option<&ArrayEntry> {
        self.atab.get(index)
    }

    pub fn tab(&self) -> &[TabEntry] {
        &self.tab
    }

    pub fn btab(&self) -> &[BlockEntry] {
        &self.btab
    }

    pub fn atab(&self) -> &[ArrayEntry] {
        &self.atab
    }

    pub fn display(&self) -> &[usize] {
        &self.display
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_base_types_preloaded() {
        let table = SymbolTable::new();
        assert_eq!(table.tab().len(), 5);
        assert_eq!(table.lookup("integer"), Some(1));
        assert_eq!(table.lookup("CHAR"), Some(4));
        assert_eq!(table.btab()[0].last, 0);
        assert_eq!(table.level(), 0);
    }

    #[test]
    fn test_variables_chain_and_offsets() {
        let mut table = SymbolTable::new();
        let a = table.add_variable("a", TypeCode::Integer, 0, 1).unwrap();
        let b = table.add_variable("b", TypeCode::Real, 0, 1).unwrap();

        assert_eq!(a, 5);
        assert_eq!(table.entry(a).unwrap().link, 0);
        assert_eq!(table.entry(b).unwrap().link, a);
        assert_eq!(table.entry(b).unwrap().adr, 1);
        assert_eq!(table.btab()[0].last, b);
        assert_eq!(table.btab()[0].vsze, 2);
    }

    #[test]
    fn test_shadowing_does_not_leak_after_exit() {
        let mut table = SymbolTable::new();
        let outer = table.add_variable("x", TypeCode::Integer, 0, 1).unwrap();
        let block = table.enter_scope().unwrap();
        assert_eq!(block, 1);
        let inner = table.add_variable("x", TypeCode::Real, 0, 1).unwrap();

        assert_eq!(table.lookup("x"), Some(inner));
        assert_eq!(table.entry(inner).unwrap().lev, 1);
        assert_eq!(table.entry(inner).unwrap().adr, 0);

        table.exit_scope().unwrap();
        assert_eq!(table.lookup("x"), Some(outer));
        // Entries of the closed block are kept
        assert_eq!(table.btab()[1].last, inner);
    }

    #[test]
    fn test_current_scope_lookup_ignores_outer() {
        let mut table = SymbolTable::new();
        table.add_variable("x", TypeCode::Integer, 0, 1).unwrap();
        table.enter_scope().unwrap();
        assert_eq!(table.lookup_in_current_scope("x"), None);
        assert!(table.lookup("x").is_some());
    }

    #[test]
    fn test_parameters_in_order() {
        let mut table = SymbolTable::new();
        table.add_subprogram("p", ObjectKind::Procedure, TypeCode::NoType).unwrap();
        let block = table.enter_scope().unwrap();
        let a = table.add_parameter("a", TypeCode::Integer, 0, 1).unwrap();
        let b = table.add_parameter("b", TypeCode::Real, 0, 1).unwrap();
        table.add_variable("local", TypeCode::Char, 0, 1).unwrap();

        assert_eq!(table.parameters(block), vec![a, b]);
        assert_eq!(table.btab()[block].psze, 2);
        assert_eq!(table.btab()[block].vsze, 3);
        assert_eq!(table.btab()[block].lpar, b);
    }

    #[test]
    fn test_array_sizing() {
        let mut table = SymbolTable::new();
        let inner = table
            .add_array(TypeCode::Integer, TypeCode::Real, 0, 1, 3, 1)
            .unwrap();
        let outer = table
            .add_array(TypeCode::Integer, TypeCode::Array, inner, 0, 1, 3)
            .unwrap();
        assert_eq!(table.array(inner).unwrap().size, 3);
        assert_eq!(table.array(outer).unwrap().size, 6);
        assert_eq!(table.type_size(TypeCode::Array, outer), 6);

        let v = table.add_variable("m", TypeCode::Array, outer, 6).unwrap();
        let w = table.add_variable("n", TypeCode::Integer, 0, 1).unwrap();
        assert_eq!(table.entry(v).unwrap().adr, 0);
        assert_eq!(table.entry(w).unwrap().adr, 6);
    }

    #[test]
    fn test_nested_array_total_is_limited() {
        let mut table = SymbolTable::new();
        let inner = table
            .add_array(TypeCode::Integer, TypeCode::Integer, 0, 1, MAX_ARRAY_ELEMENTS, 1)
            .unwrap();
        let elsz = table.type_size(TypeCode::Array, inner);
        assert_matches!(
            table.add_array(TypeCode::Integer, TypeCode::Array, inner, 1, 2, elsz),
            Err(SymbolError::ArrayTooLarge { count }) if count == 2 * MAX_ARRAY_ELEMENTS
        );
    }

    #[test]
    fn test_storage_overflow_is_an_error() {
        let mut table = SymbolTable::new();
        table.add_variable("a", TypeCode::Integer, 0, i64::MAX).unwrap();
        assert_matches!(
            table.add_variable("b", TypeCode::Integer, 0, 1),
            Err(SymbolError::StorageOverflow { block: 0 })
        );
        assert_eq!(table.lookup("b"), None);
        assert_eq!(table.btab()[0].vsze, i64::MAX);

        table.enter_scope().unwrap();
        table.add_parameter("p", TypeCode::Integer, 0, i64::MAX).unwrap();
        assert_matches!(
            table.add_parameter("q", TypeCode::Integer, 0, 1),
            Err(SymbolError::StorageOverflow { block: 1 })
        );
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let mut table = SymbolTable::new();
        assert_matches!(
            table.add_array(TypeCode::Integer, TypeCode::Integer, 0, 5, 1, 1),
            Err(SymbolError::InvalidArrayBounds { low: 5, high: 1 })
        );
        assert_matches!(
            table.add_array(TypeCode::Integer, TypeCode::Integer, 0, 0, MAX_ARRAY_ELEMENTS, 1),
            Err(SymbolError::ArrayTooLarge { .. })
        );
    }

    #[test]
    fn test_exit_global_scope_fails() {
        let mut table = SymbolTable::new();
        assert_matches!(table.exit_scope(), Err(SymbolError::ScopeUnderflow));
    }
}
