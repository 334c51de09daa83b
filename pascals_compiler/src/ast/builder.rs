//! Parse tree to AST lowering
//!
//! Each nonterminal label has one lowering routine. Child positions follow
//! the parser's node layouts; a node that does not have the expected shape is
//! reported as `MalformedParseTree` rather than skipped. Punctuation leaves are
//! consumed by their parent and never lowered on their own.

use crate::ast::nodes::{AstNode, ForDirection, NodeKind, TypeSpec};
use crate::logging::{codes, Code};
use crate::syntax::ParseNode;
use crate::utils::Span;
use crate::log_debug;
use thiserror::Error;

pub type AstResult<T> = Result<T, AstError>;

#[derive(Debug, Clone, Error)]
pub enum AstError {
    #[error("Malformed parse tree at {label}: {message}")]
    MalformedParseTree {
        label: String,
        message: String,
        span: Option<Span>,
    },

    #[error("Unsupported construct in {label}: {message}")]
    UnsupportedConstruct {
        label: String,
        message: String,
        span: Option<Span>,
    },
}

impl AstError {
    fn malformed(node: &ParseNode, message: impl Into<String>) -> Self {
        Self::MalformedParseTree {
            label: node.label.clone(),
            message: message.into(),
            span: node.first_span(),
        }
    }

    fn unsupported(node: &ParseNode, message: impl Into<String>) -> Self {
        Self::UnsupportedConstruct {
            label: node.label.clone(),
            message: message.into(),
            span: node.first_span(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::MalformedParseTree { .. } => codes::ast::MALFORMED_PARSE_TREE,
            Self::UnsupportedConstruct { .. } => codes::ast::UNSUPPORTED_CONSTRUCT,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::MalformedParseTree { span, .. } | Self::UnsupportedConstruct { span, .. } => {
                *span
            }
        }
    }
}

/// Stateless apart from a count of nodes produced
#[derive(Debug, Default)]
pub struct AstBuilder {
    nodes_built: usize,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes_built(&self) -> usize {
        self.nodes_built
    }

    /// Lower a `<program>` tree; a childless root yields `None`
    pub fn build(&mut self, root: &ParseNode) -> AstResult<Option<AstNode>> {
        if root.children.is_empty() {
            return Ok(None);
        }
        if root.label != "<program>" {
            return Err(AstError::malformed(root, "expected <program> at the root"));
        }

        let program = self.program(root)?;
        log_debug!("AST lowering finished", "nodes" => self.nodes_built);
        Ok(Some(program))
    }

    fn make(&mut self, kind: NodeKind, span: Option<Span>) -> AstNode {
        self.nodes_built += 1;
        AstNode::new(kind, span)
    }

    // === PROGRAM STRUCTURE ===

    fn program(&mut self, node: &ParseNode) -> AstResult<AstNode> {
        let header = require_child(node, "<program-header>")?;
        let name = identifier_at(header, 1)?;
        let block = self.block(node)?;
        Ok(self.make(
            NodeKind::Program {
                name,
                block: Box::new(block),
            },
            node.first_span(),
        ))
    }

    /// Declarations and body of a program or subprogram node
    fn block(&mut self, owner: &ParseNode) -> AstResult<AstNode> {
        let declarations = match owner.find("<declaration-part>") {
            Some(part) => self.declarations(part)?,
            None => Vec::new(),
        };
        let compound = require_child(owner, "<compound-statement>")?;
        let body = self.compound(compound)?;
        Ok(self.make(
            NodeKind::Block {
                declarations,
                body: Box::new(body),
            },
            compound.first_span(),
        ))
    }

    fn declarations(&mut self, part: &ParseNode) -> AstResult<Vec<AstNode>> {
        let mut out = Vec::new();
        for child in &part.children {
            match child.label.as_str() {
                "<var-declaration>" => out.extend(self.var_declaration(child)?),
                "<const-declaration>" => out.extend(self.const_declaration(child)?),
                "<type-declaration>" => out.extend(self.type_declaration(child)?),
                "<subprogram-declaration>" => out.push(self.subprogram(child)?),
                _ => return Err(AstError::malformed(child, "unexpected declaration")),
            }
        }
        Ok(out)
    }

    // === DECLARATIONS ===

    /// One `VarDecl` per identifier, each with its own copy of the type
    fn var_declaration(&mut self, node: &ParseNode) -> AstResult<Vec<AstNode>> {
        let mut out = Vec::new();
        for group in groups_of_four(node)? {
            let type_node = self.type_node(&group[2])?;
            out.extend(self.declare_identifiers(&group[0], &type_node)?);
        }
        Ok(out)
    }

    fn declare_identifiers(
        &mut self,
        list: &ParseNode,
        type_node: &AstNode,
    ) -> AstResult<Vec<AstNode>> {
        if list.label != "<identifier-list>" {
            return Err(AstError::malformed(list, "expected an identifier list"));
        }

        let mut out = Vec::new();
        for id in list.children.iter().filter(|c| c.is_token("IDENTIFIER")) {
            let name = id.text().unwrap_or_default();
            let var = self.make(
                NodeKind::Var {
                    name: name.to_string(),
                    index: None,
                },
                id.span,
            );
            let decl = self.make(
                NodeKind::VarDecl {
                    var: Box::new(var),
                    type_node: Box::new(type_node.clone()),
                },
                id.span,
            );
            out.push(decl);
        }
        Ok(out)
    }

    fn const_declaration(&mut self, node: &ParseNode) -> AstResult<Vec<AstNode>> {
        let mut out = Vec::new();
        for group in groups_of_four(node)? {
            let name = leaf_text(&group[0], "IDENTIFIER")?;
            let value = self.expression(&group[2])?;
            out.push(self.make(
                NodeKind::ConstDecl {
                    name,
                    value: Box::new(value),
                },
                group[0].span,
            ));
        }
        Ok(out)
    }

    fn type_declaration(&mut self, node: &ParseNode) -> AstResult<Vec<AstNode>> {
        let mut out = Vec::new();
        for group in groups_of_four(node)? {
            let name = leaf_text(&group[0], "IDENTIFIER")?;
            let type_node = self.type_node(&group[2])?;
            out.push(self.make(
                NodeKind::TypeDecl {
                    name,
                    type_node: Box::new(type_node),
                },
                group[0].span,
            ));
        }
        Ok(out)
    }

    fn subprogram(&mut self, node: &ParseNode) -> AstResult<AstNode> {
        let inner = node
            .child(0)
            .ok_or_else(|| AstError::malformed(node, "empty subprogram declaration"))?;
        let name = identifier_at(inner, 1)?;
        let params = match inner.find("<formal-parameter-list>") {
            Some(list) => self.formal_parameters(list)?,
            None => Vec::new(),
        };
        let block = Box::new(self.block(inner)?);

        let kind = match inner.label.as_str() {
            "<procedure-declaration>" => NodeKind::ProcedureDecl {
                name,
                params,
                block,
            },
            "<function-declaration>" => {
                let return_type = self.type_node(require_child(inner, "<type>")?)?;
                NodeKind::FunctionDecl {
                    name,
                    params,
                    return_type: Box::new(return_type),
                    block,
                }
            }
            _ => return Err(AstError::malformed(inner, "expected procedure or function")),
        };
        Ok(self.make(kind, inner.first_span()))
    }

    fn formal_parameters(&mut self, list: &ParseNode) -> AstResult<Vec<AstNode>> {
        let mut out = Vec::new();
        for group in list.children.iter().filter(|c| c.label == "<parameter-group>") {
            let ids = group
                .child(0)
                .ok_or_else(|| AstError::malformed(group, "missing identifier list"))?;
            let type_node = self.type_node(require_child(group, "<type>")?)?;
            out.extend(self.declare_identifiers(ids, &type_node)?);
        }
        Ok(out)
    }

    /// Base keyword, array, subrange, or a named alias
    fn type_node(&mut self, node: &ParseNode) -> AstResult<AstNode> {
        let first = node
            .child(0)
            .ok_or_else(|| AstError::malformed(node, "empty type"))?;
        let span = node.first_span();

        let spec = if first.is_token("KEYWORD") {
            TypeSpec::Named(first.text().unwrap_or_default().to_lowercase())
        } else if first.label == "<array-type>" {
            let low = self.expression(child_at(first, 2)?)?;
            let high = self.expression(child_at(first, 4)?)?;
            let element = self.type_node(child_at(first, 7)?)?;
            TypeSpec::Array {
                low: Box::new(low),
                high: Box::new(high),
                element: Box::new(element),
            }
        } else if node.children.len() == 3 {
            let low = self.expression(first)?;
            let high = self.expression(child_at(node, 2)?)?;
            TypeSpec::Subrange {
                low: Box::new(low),
                high: Box::new(high),
            }
        } else {
            match self.expression(first)?.kind {
                NodeKind::Var { name, index: None } => TypeSpec::Named(name),
                _ => {
                    return Err(AstError::unsupported(
                        node,
                        "type must be a base type, array, subrange or type name",
                    ))
                }
            }
        };

        Ok(self.make(NodeKind::Type { spec }, span))
    }

    // === STATEMENTS ===

    fn compound(&mut self, node: &ParseNode) -> AstResult<AstNode> {
        let list = require_child(node, "<statement-list>")?;
        let mut statements = Vec::new();
        for child in list.children.iter().filter(|c| !c.is_token("SEMICOLON")) {
            statements.push(self.statement(child)?);
        }
        Ok(self.make(NodeKind::Compound { statements }, node.first_span()))
    }

    fn statement(&mut self, node: &ParseNode) -> AstResult<AstNode> {
        match node.label.as_str() {
            "<compound-statement>" => self.compound(node),
            "<assignment-statement>" => self.assignment(node),
            "<if-statement>" => self.if_statement(node),
            "<while-statement>" => self.while_statement(node),
            "<for-statement>" => self.for_statement(node),
            "<procedure-call>" => self.call(node, false),
            "<empty-statement>" => Ok(self.make(NodeKind::NoOp, None)),
            _ => Err(AstError::malformed(node, "expected a statement")),
        }
    }

    /// `x := e` or `x[i] := e`
    fn assignment(&mut self, node: &ParseNode) -> AstResult<AstNode> {
        let target_leaf = child_at(node, 0)?;
        let name = leaf_text(target_leaf, "IDENTIFIER")?;
        let index = match node.child(1) {
            Some(bracket) if bracket.is_token("LBRACKET") => {
                Some(Box::new(self.expression(child_at(node, 2)?)?))
            }
            _ => None,
        };
        let value_node = node
            .children
            .last()
            .ok_or_else(|| AstError::malformed(node, "missing value"))?;
        let value = self.expression(value_node)?;

        let target = self.make(NodeKind::Var { name, index }, target_leaf.span);
        Ok(self.make(
            NodeKind::Assign {
                target: Box::new(target),
                value: Box::new(value),
            },
            node.first_span(),
        ))
    }

    fn if_statement(&mut self, node: &ParseNode) -> AstResult<AstNode> {
        let condition = self.expression(child_at(node, 1)?)?;
        let then_branch = self.statement(child_at(node, 3)?)?;
        let else_branch = match node.child(5) {
            Some(stmt) => Some(Box::new(self.statement(stmt)?)),
            None => None,
        };
        Ok(self.make(
            NodeKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch,
            },
            node.first_span(),
        ))
    }

    fn while_statement(&mut self, node: &ParseNode) -> AstResult<AstNode> {
        let condition = self.expression(child_at(node, 1)?)?;
        let body = self.statement(child_at(node, 3)?)?;
        Ok(self.make(
            NodeKind::While {
                condition: Box::new(condition),
                body: Box::new(body),
            },
            node.first_span(),
        ))
    }

    fn for_statement(&mut self, node: &ParseNode) -> AstResult<AstNode> {
        let var_leaf = child_at(node, 1)?;
        let name = leaf_text(var_leaf, "IDENTIFIER")?;
        let variable = self.make(NodeKind::Var { name, index: None }, var_leaf.span);
        let start = self.expression(child_at(node, 3)?)?;
        let direction = if child_at(node, 4)?.has_value("turun_ke") {
            ForDirection::DownTo
        } else {
            ForDirection::To
        };
        let end = self.expression(child_at(node, 5)?)?;
        let body = self.statement(child_at(node, 7)?)?;

        Ok(self.make(
            NodeKind::For {
                variable: Box::new(variable),
                start: Box::new(start),
                direction,
                end: Box::new(end),
                body: Box::new(body),
            },
            node.first_span(),
        ))
    }

    /// `<procedure-call>` or `<function-call>`
    fn call(&mut self, node: &ParseNode, is_function: bool) -> AstResult<AstNode> {
        let name = identifier_at(node, 0)?;
        let mut args = Vec::new();
        if let Some(list) = node.find("<parameter-list>") {
            for expr in list.children.iter().filter(|c| c.label == "<expression>") {
                args.push(self.expression(expr)?);
            }
        }

        let kind = if is_function {
            NodeKind::FunctionCall { name, args }
        } else {
            NodeKind::ProcedureCall { name, args }
        };
        Ok(self.make(kind, node.first_span()))
    }

    // === EXPRESSIONS ===

    fn expression(&mut self, node: &ParseNode) -> AstResult<AstNode> {
        if node.label != "<expression>" {
            return Err(AstError::malformed(node, "expected an expression"));
        }

        let left = self.simple_expression(child_at(node, 0)?)?;
        match (node.child(1), node.child(2)) {
            (Some(op), Some(rhs)) => {
                let right = self.simple_expression(rhs)?;
                Ok(self.binary(op, left, right))
            }
            _ => Ok(left),
        }
    }

    /// Optional sign, then a left-leaning chain of additive operators
    fn simple_expression(&mut self, node: &ParseNode) -> AstResult<AstNode> {
        let mut rest = node.children.iter();
        let mut first = rest
            .next()
            .ok_or_else(|| AstError::malformed(node, "empty simple expression"))?;

        let sign = if first.is_leaf() {
            let sign = first;
            first = rest
                .next()
                .ok_or_else(|| AstError::malformed(node, "sign without operand"))?;
            Some(sign)
        } else {
            None
        };

        let mut acc = self.term(first)?;
        if let Some(sign) = sign {
            let op = sign.text().unwrap_or_default().to_string();
            acc = self.make(
                NodeKind::UnaryOp {
                    op,
                    operand: Box::new(acc),
                },
                sign.span,
            );
        }

        while let (Some(op), Some(operand)) = (rest.next(), rest.next()) {
            let right = self.term(operand)?;
            acc = self.binary(op, acc, right);
        }
        Ok(acc)
    }

    fn term(&mut self, node: &ParseNode) -> AstResult<AstNode> {
        let mut rest = node.children.iter();
        let first = rest
            .next()
            .ok_or_else(|| AstError::malformed(node, "empty term"))?;
        let mut acc = self.factor(first)?;

        while let (Some(op), Some(operand)) = (rest.next(), rest.next()) {
            let right = self.factor(operand)?;
            acc = self.binary(op, acc, right);
        }
        Ok(acc)
    }

    fn factor(&mut self, node: &ParseNode) -> AstResult<AstNode> {
        let first = child_at(node, 0)?;
        let span = first.first_span();

        if first.label == "<function-call>" {
            return self.call(first, true);
        }
        if first.label == "<expression>" {
            return self.expression(first);
        }

        let text = first.text().unwrap_or_default();
        let kind = match first.label.as_str() {
            "IDENTIFIER" => {
                let index = match node.child(2) {
                    Some(expr) if expr.label == "<expression>" => {
                        Some(Box::new(self.expression(expr)?))
                    }
                    _ => None,
                };
                NodeKind::Var {
                    name: text.to_string(),
                    index,
                }
            }
            "NUMBER" => NodeKind::Num {
                value: text.to_string(),
            },
            "STRING_LITERAL" | "CHAR_LITERAL" => NodeKind::StringLiteral {
                value: text.to_string(),
            },
            "KEYWORD" if first.has_value("true") || first.has_value("false") => {
                NodeKind::BoolLiteral {
                    value: first.has_value("true"),
                }
            }
            "KEYWORD" | "LOGICAL_OPERATOR" if first.has_value("not") || first.has_value("tidak") => {
                let operand = self.factor(child_at(node, 1)?)?;
                NodeKind::UnaryOp {
                    op: text.to_lowercase(),
                    operand: Box::new(operand),
                }
            }
            "LPARENTHESIS" => return self.expression(child_at(node, 1)?),
            _ => return Err(AstError::malformed(node, format!("unexpected {}", first))),
        };
        Ok(self.make(kind, span))
    }

    fn binary(&mut self, op: &ParseNode, left: AstNode, right: AstNode) -> AstNode {
        let span = match (left.span, right.span) {
            (Some(l), Some(r)) => Some(l.merge(r)),
            (l, r) => l.or(op.span).or(r),
        };
        self.make(
            NodeKind::BinOp {
                op: op.text().unwrap_or_default().to_lowercase(),
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }
}

// === PARSE TREE ACCESS ===

fn child_at(node: &ParseNode, index: usize) -> AstResult<&ParseNode> {
    node.child(index)
        .ok_or_else(|| AstError::malformed(node, format!("missing child {}", index)))
}

fn require_child<'a>(node: &'a ParseNode, label: &str) -> AstResult<&'a ParseNode> {
    node.find(label)
        .ok_or_else(|| AstError::malformed(node, format!("missing {}", label)))
}

fn leaf_text(node: &ParseNode, kind: &str) -> AstResult<String> {
    match node.text() {
        Some(text) if node.is_token(kind) => Ok(text.to_string()),
        _ => Err(AstError::malformed(node, format!("expected {}", kind))),
    }
}

fn identifier_at(node: &ParseNode, index: usize) -> AstResult<String> {
    leaf_text(child_at(node, index)?, "IDENTIFIER")
}

/// Declaration bodies repeat `name sep value ;` after the leading keyword
fn groups_of_four(node: &ParseNode) -> AstResult<std::slice::Chunks<'_, ParseNode>> {
    let body = node.children.get(1..).unwrap_or_default();
    if body.is_empty() || body.len() % 4 != 0 {
        return Err(AstError::malformed(node, "declaration groups are incomplete"));
    }
    Ok(body.chunks(4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::Lexer;
    use crate::syntax::parse_tokens;
    use assert_matches::assert_matches;

    fn lower(source: &str) -> AstNode {
        let tokens = Lexer::with_defaults().unwrap().tokenize(source).unwrap();
        let tree = parse_tokens(tokens).unwrap();
        AstBuilder::new().build(&tree).unwrap().unwrap()
    }

    fn block_of(program: &AstNode) -> (&Vec<AstNode>, &Vec<AstNode>) {
        let NodeKind::Program { block, .. } = &program.kind else {
            panic!("not a program");
        };
        let NodeKind::Block { declarations, body } = &block.kind else {
            panic!("not a block");
        };
        let NodeKind::Compound { statements } = &body.kind else {
            panic!("not a compound");
        };
        (declarations, statements)
    }

    fn value_of(statement: &AstNode) -> &AstNode {
        match &statement.kind {
            NodeKind::Assign { value, .. } => value,
            _ => panic!("not an assignment"),
        }
    }

    #[test]
    fn test_program_name_and_empty_body() {
        let ast = lower("program Hello; mulai selesai.");
        assert_matches!(&ast.kind, NodeKind::Program { name, .. } if name == "Hello");
        let (decls, stmts) = block_of(&ast);
        assert!(decls.is_empty());
        assert_eq!(stmts.len(), 1);
        assert_matches!(stmts[0].kind, NodeKind::NoOp);
    }

    #[test]
    fn test_var_declaration_expands_per_identifier() {
        let ast = lower("program p; variabel a, b: larik[1..3] dari integer; c: real; mulai selesai.");
        let (decls, _) = block_of(&ast);
        let names: Vec<_> = decls.iter().filter_map(|d| d.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        let (NodeKind::VarDecl { type_node: ta, .. }, NodeKind::VarDecl { type_node: tb, .. }) =
            (&decls[0].kind, &decls[1].kind)
        else {
            panic!("expected var declarations");
        };
        assert_eq!(ta, tb);
        assert!(!std::ptr::eq(&**ta, &**tb));
        assert_matches!(&ta.kind, NodeKind::Type { spec: TypeSpec::Array { .. } });
    }

    #[test]
    fn test_left_associative_chain() {
        let ast = lower("program p; mulai x := a + b - c selesai.");
        let (_, stmts) = block_of(&ast);
        let NodeKind::BinOp { op, left, .. } = &value_of(&stmts[0]).kind else {
            panic!("expected binop");
        };
        assert_eq!(op, "-");
        assert_matches!(&left.kind, NodeKind::BinOp { op, .. } if op == "+");
    }

    #[test]
    fn test_precedence_from_grammar() {
        let ast = lower("program p; mulai x := 1 + 2 * 3 selesai.");
        let (_, stmts) = block_of(&ast);
        let NodeKind::BinOp { op, right, .. } = &value_of(&stmts[0]).kind else {
            panic!("expected binop");
        };
        assert_eq!(op, "+");
        assert_matches!(&right.kind, NodeKind::BinOp { op, .. } if op == "*");
    }

    #[test]
    fn test_sign_and_not() {
        let ast = lower("program p; mulai x := -a; y := tidak true selesai.");
        let (_, stmts) = block_of(&ast);
        assert_matches!(&value_of(&stmts[0]).kind, NodeKind::UnaryOp { op, .. } if op == "-");
        assert_matches!(&value_of(&stmts[1]).kind, NodeKind::UnaryOp { op, operand }
            if op == "tidak" && matches!(operand.kind, NodeKind::BoolLiteral { value: true }));
    }

    #[test]
    fn test_statements_lower() {
        let source = "program p; mulai \
            jika a > 1 maka b := 2 selain_itu b := 3; \
            selama a < 10 lakukan a := a + 1; \
            untuk i := 10 turun_ke 1 lakukan writeln(i, 'x'); \
            t[2] := f(1) \
            selesai.";
        let ast = lower(source);
        let (_, stmts) = block_of(&ast);
        assert_eq!(stmts.len(), 4);
        assert_matches!(&stmts[0].kind, NodeKind::If { else_branch: Some(_), .. });
        assert_matches!(&stmts[1].kind, NodeKind::While { .. });
        let NodeKind::For { direction, body, .. } = &stmts[2].kind else {
            panic!("expected for");
        };
        assert_eq!(*direction, ForDirection::DownTo);
        assert_matches!(&body.kind, NodeKind::ProcedureCall { args, .. } if args.len() == 2);
        let NodeKind::Assign { target, value } = &stmts[3].kind else {
            panic!("expected assignment");
        };
        assert_matches!(&target.kind, NodeKind::Var { index: Some(_), .. });
        assert_matches!(&value.kind, NodeKind::FunctionCall { name, args } if name == "f" && args.len() == 1);
    }

    #[test]
    fn test_subprograms_and_types() {
        let source = "program p; \
            konstanta n = 10; \
            tipe idx = 1..n; vec = larik[1..n] dari real; \
            fungsi f(a, b: integer; c: real): boolean; mulai f := true selesai; \
            prosedur q; mulai selesai; \
            mulai selesai.";
        let ast = lower(source);
        let (decls, _) = block_of(&ast);
        assert_eq!(decls.len(), 5);
        assert_matches!(&decls[0].kind, NodeKind::ConstDecl { name, .. } if name == "n");
        assert_matches!(&decls[1].kind, NodeKind::TypeDecl { type_node, .. }
            if matches!(type_node.kind, NodeKind::Type { spec: TypeSpec::Subrange { .. } }));
        assert_matches!(&decls[3].kind, NodeKind::FunctionDecl { params, return_type, .. }
            if params.len() == 3
                && matches!(&return_type.kind, NodeKind::Type { spec: TypeSpec::Named(n) } if n == "boolean"));
        assert_matches!(&decls[4].kind, NodeKind::ProcedureDecl { params, .. } if params.is_empty());
    }

    #[test]
    fn test_alias_type_lowers_to_named() {
        let ast = lower("program p; tipe t = integer; variabel v: t; mulai selesai.");
        let (decls, _) = block_of(&ast);
        assert_matches!(&decls[1].kind, NodeKind::VarDecl { type_node, .. }
            if matches!(&type_node.kind, NodeKind::Type { spec: TypeSpec::Named(n) } if n == "t"));
    }

    #[test]
    fn test_expression_type_is_unsupported() {
        let tokens = Lexer::with_defaults()
            .unwrap()
            .tokenize("program p; variabel v: 1 + 2; mulai selesai.")
            .unwrap();
        let tree = parse_tokens(tokens).unwrap();
        let err = AstBuilder::new().build(&tree).unwrap_err();
        assert_matches!(err, AstError::UnsupportedConstruct { .. });
        assert_eq!(err.error_code().as_str(), "E061");
        assert_eq!(err.span().map(|s| s.start.line), Some(1));
    }

    #[test]
    fn test_empty_root_yields_none() {
        let root = ParseNode::internal("<program>");
        assert!(AstBuilder::new().build(&root).unwrap().is_none());
    }

    #[test]
    fn test_wrong_root_is_malformed() {
        let mut root = ParseNode::internal("<statement-list>");
        root.push(ParseNode::internal("<empty-statement>"));
        assert_matches!(
            AstBuilder::new().build(&root),
            Err(AstError::MalformedParseTree { .. })
        );
    }
}
