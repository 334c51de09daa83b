//! Typed AST for Pascal-S programs
//!
//! Every node carries the same decoration slots, filled in by the semantic
//! analyzer:
//! - `resolved_type`: type code of the value or declaration
//! - `scope_level`: nesting level the node was analyzed at
//! - `symbol_ref`: index into the identifier table, never ownership
//!
//! The builder leaves all three empty.

use crate::semantic_analysis::types::TypeCode;
use crate::utils::Span;
use serde::Serialize;
use std::fmt;

/// Generic identifier type; original spelling is preserved
pub type Identifier = String;

/// Direction of a counted loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ForDirection {
    To,
    DownTo,
}

impl ForDirection {
    /// Keyword spelling used in source and printed trees
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::To => "ke",
            Self::DownTo => "turun_ke",
        }
    }
}

/// Shape of a type expression, bounds kept unevaluated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeSpec {
    /// Base type keyword or a previously declared alias
    Named(Identifier),
    Array {
        low: Box<AstNode>,
        high: Box<AstNode>,
        element: Box<AstNode>,
    },
    Subrange {
        low: Box<AstNode>,
        high: Box<AstNode>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeKind {
    Program {
        name: Identifier,
        block: Box<AstNode>,
    },
    Block {
        declarations: Vec<AstNode>,
        body: Box<AstNode>,
    },
    VarDecl {
        var: Box<AstNode>,
        type_node: Box<AstNode>,
    },
    ConstDecl {
        name: Identifier,
        value: Box<AstNode>,
    },
    TypeDecl {
        name: Identifier,
        type_node: Box<AstNode>,
    },
    ProcedureDecl {
        name: Identifier,
        params: Vec<AstNode>,
        block: Box<AstNode>,
    },
    FunctionDecl {
        name: Identifier,
        params: Vec<AstNode>,
        return_type: Box<AstNode>,
        block: Box<AstNode>,
    },
    Compound {
        statements: Vec<AstNode>,
    },
    Assign {
        target: Box<AstNode>,
        value: Box<AstNode>,
    },
    If {
        condition: Box<AstNode>,
        then_branch: Box<AstNode>,
        else_branch: Option<Box<AstNode>>,
    },
    While {
        condition: Box<AstNode>,
        body: Box<AstNode>,
    },
    For {
        variable: Box<AstNode>,
        start: Box<AstNode>,
        direction: ForDirection,
        end: Box<AstNode>,
        body: Box<AstNode>,
    },
    ProcedureCall {
        name: Identifier,
        args: Vec<AstNode>,
    },
    FunctionCall {
        name: Identifier,
        args: Vec<AstNode>,
    },
    /// `op` is the lowercased operator lexeme, aliases not folded
    BinOp {
        op: String,
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
    UnaryOp {
        op: String,
        operand: Box<AstNode>,
    },
    /// Literal text as scanned, e.g. `10` or `3.14`
    Num {
        value: String,
    },
    /// Literal text including the quotes
    StringLiteral {
        value: String,
    },
    BoolLiteral {
        value: bool,
    },
    Var {
        name: Identifier,
        index: Option<Box<AstNode>>,
    },
    Type {
        spec: TypeSpec,
    },
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AstNode {
    pub kind: NodeKind,
    #[serde(skip)]
    pub span: Option<Span>,
    pub resolved_type: Option<TypeCode>,
    pub scope_level: Option<usize>,
    pub symbol_ref: Option<usize>,
}

impl AstNode {
    pub fn new(kind: NodeKind, span: Option<Span>) -> Self {
        Self {
            kind,
            span,
            resolved_type: None,
            scope_level: None,
            symbol_ref: None,
        }
    }

    pub fn var(name: &str, span: Option<Span>) -> Self {
        Self::new(
            NodeKind::Var {
                name: name.to_string(),
                index: None,
            },
            span,
        )
    }

    pub fn named_type(name: &str, span: Option<Span>) -> Self {
        Self::new(
            NodeKind::Type {
                spec: TypeSpec::Named(name.to_string()),
            },
            span,
        )
    }

    pub fn no_op() -> Self {
        Self::new(NodeKind::NoOp, None)
    }

    /// Variant name, as used in diagnostics
    pub fn variant_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Program { .. } => "Program",
            NodeKind::Block { .. } => "Block",
            NodeKind::VarDecl { .. } => "VarDecl",
            NodeKind::ConstDecl { .. } => "ConstDecl",
            NodeKind::TypeDecl { .. } => "TypeDecl",
            NodeKind::ProcedureDecl { .. } => "ProcedureDecl",
            NodeKind::FunctionDecl { .. } => "FunctionDecl",
            NodeKind::Compound { .. } => "Compound",
            NodeKind::Assign { .. } => "Assign",
            NodeKind::If { .. } => "If",
            NodeKind::While { .. } => "While",
            NodeKind::For { .. } => "For",
            NodeKind::ProcedureCall { .. } => "ProcedureCall",
            NodeKind::FunctionCall { .. } => "FunctionCall",
            NodeKind::BinOp { .. } => "BinOp",
            NodeKind::UnaryOp { .. } => "UnaryOp",
            NodeKind::Num { .. } => "Num",
            NodeKind::StringLiteral { .. } => "StringLiteral",
            NodeKind::BoolLiteral { .. } => "BoolLiteral",
            NodeKind::Var { .. } => "Var",
            NodeKind::Type { .. } => "Type",
            NodeKind::NoOp => "NoOp",
        }
    }

    /// Direct AST children in source order
    pub fn children(&self) -> Vec<&AstNode> {
        match &self.kind {
            NodeKind::Program { block, .. } => vec![&**block],
            NodeKind::Block { declarations, body } => {
                declarations.iter().chain(std::iter::once(&**body)).collect()
            }
            NodeKind::VarDecl { var, type_node } => vec![&**var, &**type_node],
            NodeKind::ConstDecl { value, .. } => vec![&**value],
            NodeKind::TypeDecl { type_node, .. } => vec![&**type_node],
            NodeKind::ProcedureDecl { params, block, .. } => {
                params.iter().chain(std::iter::once(&**block)).collect()
            }
            NodeKind::FunctionDecl {
                params,
                return_type,
                block,
                ..
            } => params
                .iter()
                .chain([&**return_type, &**block])
                .collect(),
            NodeKind::Compound { statements } => statements.iter().collect(),
            NodeKind::Assign { target, value } => vec![&**target, &**value],
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut children = vec![&**condition, &**then_branch];
                children.extend(else_branch.as_deref());
                children
            }
            NodeKind::While { condition, body } => vec![&**condition, &**body],
            NodeKind::For {
                variable,
                start,
                end,
                body,
                ..
            } => vec![&**variable, &**start, &**end, &**body],
            NodeKind::ProcedureCall { args, .. } | NodeKind::FunctionCall { args, .. } => {
                args.iter().collect()
            }
            NodeKind::BinOp { left, right, .. } => vec![&**left, &**right],
            NodeKind::UnaryOp { operand, .. } => vec![&**operand],
            NodeKind::Var { index, .. } => index.as_deref().into_iter().collect(),
            NodeKind::Type { spec } => match spec {
                TypeSpec::Named(_) => Vec::new(),
                TypeSpec::Array { low, high, element } => vec![&**low, &**high, &**element],
                TypeSpec::Subrange { low, high } => vec![&**low, &**high],
            },
            NodeKind::Num { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::BoolLiteral { .. }
            | NodeKind::NoOp => Vec::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(AstNode::node_count)
            .sum::<usize>()
    }

    /// Name carried by identifier-bearing variants
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Program { name, .. }
            | NodeKind::ConstDecl { name, .. }
            | NodeKind::TypeDecl { name, .. }
            | NodeKind::ProcedureDecl { name, .. }
            | NodeKind::FunctionDecl { name, .. }
            | NodeKind::ProcedureCall { name, .. }
            | NodeKind::FunctionCall { name, .. }
            | NodeKind::Var { name, .. } => Some(name.as_str()),
            NodeKind::VarDecl { var, .. } => var.name(),
            _ => None,
        }
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}('{}')", self.variant_name(), name),
            None => f.write_str(self.variant_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: &str) -> AstNode {
        AstNode::new(NodeKind::Num { value: v.into() }, None)
    }

    #[test]
    fn test_new_node_is_undecorated() {
        let node = AstNode::var("x", None);
        assert!(node.resolved_type.is_none());
        assert!(node.scope_level.is_none());
        assert!(node.symbol_ref.is_none());
        assert_eq!(node.to_string(), "Var('x')");
    }

    #[test]
    fn test_children_in_source_order() {
        let node = AstNode::new(
            NodeKind::If {
                condition: Box::new(AstNode::new(NodeKind::BoolLiteral { value: true }, None)),
                then_branch: Box::new(AstNode::no_op()),
                else_branch: Some(Box::new(num("1"))),
            },
            None,
        );
        let names: Vec<_> = node.children().iter().map(|c| c.variant_name()).collect();
        assert_eq!(names, vec!["BoolLiteral", "NoOp", "Num"]);
        assert_eq!(node.node_count(), 4);
    }

    #[test]
    fn test_var_decl_name_comes_from_var() {
        let decl = AstNode::new(
            NodeKind::VarDecl {
                var: Box::new(AstNode::var("total", None)),
                type_node: Box::new(AstNode::named_type("integer", None)),
            },
            None,
        );
        assert_eq!(decl.name(), Some("total"));
        assert_eq!(decl.to_string(), "VarDecl('total')");
    }

    #[test]
    fn test_array_type_children() {
        let array = AstNode::new(
            NodeKind::Type {
                spec: TypeSpec::Array {
                    low: Box::new(num("1")),
                    high: Box::new(num("10")),
                    element: Box::new(AstNode::named_type("char", None)),
                },
            },
            None,
        );
        assert_eq!(array.children().len(), 3);
        assert_eq!(ForDirection::DownTo.as_str(), "turun_ke");
    }
}
