//! Decorated AST rendering
//!
//! Labels carry the analysis results: `tab_index` is the identifier table
//! row, `type` the resolved type name, `lev` the declaration level. A
//! `Block` shows its declarations under a `Declarations` heading and its
//! statements directly, without the enclosing compound node.

use crate::ast::{AstNode, NodeKind, TypeSpec};
use crate::semantic_analysis::types::TypeCode;
use crate::symbols::SymbolTable;

enum Item<'a> {
    Node(&'a AstNode),
    Group(&'static str, Vec<&'a AstNode>),
}

pub fn format_decorated_ast(root: &AstNode, table: &SymbolTable) -> String {
    let mut out = String::new();
    out.push_str(&label(root, table));
    out.push('\n');
    render_children(&mut out, &children(root), "", table);
    out
}

fn render_children(out: &mut String, items: &[Item<'_>], prefix: &str, table: &SymbolTable) {
    let count = items.len();
    for (i, item) in items.iter().enumerate() {
        let last = i + 1 == count;
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });

        let nested = match item {
            Item::Node(node) => {
                out.push_str(&label(node, table));
                children(node)
            }
            Item::Group(title, nodes) => {
                out.push_str(title);
                nodes.iter().map(|n| Item::Node(n)).collect()
            }
        };
        out.push('\n');

        let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
        render_children(out, &nested, &child_prefix, table);
    }
}

/// Visual children; declarations show their details in the label instead
fn children(node: &AstNode) -> Vec<Item<'_>> {
    match &node.kind {
        NodeKind::Block { declarations, body } => {
            let mut items = Vec::new();
            if !declarations.is_empty() {
                items.push(Item::Group("Declarations", declarations.iter().collect()));
            }
            match &body.kind {
                NodeKind::Compound { statements } => items.extend(statements.iter().map(Item::Node)),
                _ => items.push(Item::Node(body)),
            }
            items
        }
        NodeKind::VarDecl { .. } | NodeKind::TypeDecl { .. } | NodeKind::Type { .. } => Vec::new(),
        NodeKind::FunctionDecl { params, block, .. } => params
            .iter()
            .chain(std::iter::once(&**block))
            .map(Item::Node)
            .collect(),
        _ => node.children().into_iter().map(Item::Node).collect(),
    }
}

fn label(node: &AstNode, table: &SymbolTable) -> String {
    let typ = node
        .resolved_type
        .filter(|t| *t != TypeCode::NoType)
        .map(|t| t.name());

    match &node.kind {
        NodeKind::Program { name, .. } => format!("ProgramNode(name: '{}')", name),
        NodeKind::Block { .. } => "Block".to_string(),
        NodeKind::VarDecl { .. } => decorated(
            format!("VarDecl('{}')", node.name().unwrap_or_default()),
            node,
            table,
            true,
        ),
        NodeKind::ConstDecl { name, .. } => {
            decorated(format!("ConstDecl('{}')", name), node, table, true)
        }
        NodeKind::TypeDecl { name, .. } => {
            decorated(format!("TypeDecl('{}')", name), node, table, true)
        }
        NodeKind::ProcedureDecl { name, .. } => {
            decorated(format!("ProcedureDecl('{}')", name), node, table, true)
        }
        NodeKind::FunctionDecl { name, .. } => {
            decorated(format!("FunctionDecl('{}')", name), node, table, true)
        }
        NodeKind::Compound { .. } => "Compound".to_string(),
        NodeKind::Assign { target, .. } => with_type(
            format!("Assign('{}' := ...)", target.name().unwrap_or_default()),
            typ,
        ),
        NodeKind::If { .. } => "If".to_string(),
        NodeKind::While { .. } => "While".to_string(),
        NodeKind::For {
            variable,
            direction,
            ..
        } => format!(
            "For('{}', {})",
            variable.name().unwrap_or_default(),
            direction.as_str()
        ),
        NodeKind::ProcedureCall { name, .. } => {
            decorated(format!("ProcedureCall(name: '{}')", name), node, table, false)
        }
        NodeKind::FunctionCall { name, .. } => {
            decorated(format!("FunctionCall(name: '{}')", name), node, table, false)
        }
        NodeKind::BinOp { op, .. } => with_type(format!("BinOp '{}'", op), typ),
        NodeKind::UnaryOp { op, .. } => with_type(format!("UnaryOp '{}'", op), typ),
        NodeKind::Num { value } => with_type(value.clone(), typ),
        NodeKind::StringLiteral { value } => with_type(format!("StringLiteral {}", value), typ),
        NodeKind::BoolLiteral { value } => with_type(value.to_string(), typ),
        NodeKind::Var { name, .. } => {
            decorated(format!("target '{}'", name), node, table, false)
        }
        NodeKind::Type { spec } => match spec {
            TypeSpec::Named(name) => format!("Type '{}'", name),
            TypeSpec::Array { .. } => "Type 'larik'".to_string(),
            TypeSpec::Subrange { .. } => "Type 'subrange'".to_string(),
        },
        NodeKind::NoOp => "NoOp".to_string(),
    }
}

fn with_type(base: String, typ: Option<&str>) -> String {
    match typ {
        Some(name) => format!("{} -> type:{}", base, name),
        None => base,
    }
}

/// Append `tab_index`, `type` and optionally `lev` from the linked entry
fn decorated(base: String, node: &AstNode, table: &SymbolTable, show_level: bool) -> String {
    let mut parts = Vec::new();
    let entry = node.symbol_ref.and_then(|idx| table.entry(idx).map(|e| (idx, e)));

    if let Some((idx, _)) = entry {
        parts.push(format!("tab_index:{}", idx));
    }
    if let Some(typ) = node.resolved_type.filter(|t| *t != TypeCode::NoType) {
        parts.push(format!("type:{}", typ.name()));
    }
    if let (true, Some((_, e))) = (show_level, entry) {
        parts.push(format!("lev:{}", e.lev));
    }

    if parts.is_empty() {
        base
    } else {
        format!("{} -> {}", base, parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstBuilder;
    use crate::lexical::tokenize_source;
    use crate::semantic_analysis::SemanticAnalyzer;
    use crate::syntax::parse_tokens;

    fn render(source: &str) -> String {
        let tree = parse_tokens(tokenize_source(source).unwrap()).unwrap();
        let ast = AstBuilder::new().build(&tree).unwrap().unwrap();
        let out = SemanticAnalyzer::new().analyze(ast).unwrap();
        format_decorated_ast(&out.ast, &out.table)
    }

    #[test]
    fn test_simple_program_layout() {
        let text = render("program Hello; variabel x: integer; mulai x := 10; writeln(x) selesai.");
        let expected = "\
ProgramNode(name: 'Hello')
└── Block
    ├── Declarations
    │   └── VarDecl('x') -> tab_index:6, type:integer, lev:0
    ├── Assign('x' := ...) -> type:integer
    │   ├── target 'x' -> tab_index:6, type:integer
    │   └── 10 -> type:integer
    └── ProcedureCall(name: 'writeln')
        └── target 'x' -> tab_index:6, type:integer
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_expression_labels() {
        let text = render("program p; variabel b: boolean; r: real; mulai r := -1 / 2; b := tidak (r > 1) selesai.");
        assert!(text.contains("BinOp '/' -> type:real"));
        // The sign applies to the whole first term
        assert!(text.contains("UnaryOp '-' -> type:real"));
        assert!(text.contains("UnaryOp 'tidak' -> type:boolean"));
        assert!(text.contains("BinOp '>' -> type:boolean"));
    }

    #[test]
    fn test_subprogram_labels() {
        let text = render(
            "program p; fungsi f(a: integer): char; mulai f := 'z' selesai; \
             mulai writeln(f(1)) selesai.",
        );
        assert!(text.contains("FunctionDecl('f') -> tab_index:6, type:char, lev:0"));
        assert!(text.contains("VarDecl('a') -> tab_index:7, type:integer, lev:1"));
        assert!(text.contains("StringLiteral 'z' -> type:char"));
        assert!(text.contains("FunctionCall(name: 'f') -> tab_index:6, type:char"));
    }

    #[test]
    fn test_empty_statement_and_loops() {
        let text = render("program p; variabel i: integer; mulai untuk i := 1 ke 3 lakukan ; selesai.");
        assert!(text.contains("For('i', ke)"));
        assert!(text.contains("NoOp"));
    }
}
