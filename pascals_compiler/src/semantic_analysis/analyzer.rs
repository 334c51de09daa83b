//! Scope and type resolution over the AST
//!
//! One exhaustive match per node variant. Declarations populate the symbol
//! table as they are met, so every name must be declared before use. The
//! first error aborts the walk.

use crate::ast::{AstNode, NodeKind, TypeSpec};
use crate::config::constants::compile_time::semantic::MAX_CALL_ARGUMENTS;
use crate::config::constants::language::BUILTIN_PROCEDURES;
use crate::config::runtime::{RedeclarationPolicy, SemanticPreferences};
use crate::logging::codes;
use crate::semantic_analysis::const_eval::eval_integer;
use crate::semantic_analysis::types::{truncate_name, SemanticError, SemanticResult, TypeCode};
use crate::symbols::{ObjectKind, SymbolError, SymbolTable};
use crate::utils::Span;
use crate::{log_debug, log_warning};

/// Decorated tree plus the table it points into
#[derive(Debug)]
pub struct SemanticOutput {
    pub ast: AstNode,
    pub table: SymbolTable,
    /// Non-fatal findings, e.g. redeclarations under the lenient policy
    pub warnings: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Access {
    Read,
    Write,
}

pub struct SemanticAnalyzer {
    table: SymbolTable,
    policy: RedeclarationPolicy,
    log_scopes: bool,
    warnings: usize,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self::with_preferences(&SemanticPreferences::default())
    }

    pub fn with_preferences(preferences: &SemanticPreferences) -> Self {
        Self {
            table: SymbolTable::new(),
            policy: preferences.redeclaration_policy,
            log_scopes: preferences.log_scope_transitions,
            warnings: 0,
        }
    }

    pub fn analyze(mut self, mut root: AstNode) -> SemanticResult<SemanticOutput> {
        log_debug!("Starting semantic analysis",
            "root" => root.to_string(),
            "policy" => self.policy.as_str()
        );

        self.visit(&mut root)?;

        Ok(SemanticOutput {
            ast: root,
            table: self.table,
            warnings: self.warnings,
        })
    }

    fn visit(&mut self, node: &mut AstNode) -> SemanticResult<TypeCode> {
        self.visit_node(node, false)
    }

    /// Decorate one node; `as_parameter` only affects `VarDecl`
    fn visit_node(&mut self, node: &mut AstNode, as_parameter: bool) -> SemanticResult<TypeCode> {
        if matches!(node.kind, NodeKind::Type { .. }) {
            return self.resolve_type(node).map(|(typ, _, _)| typ);
        }

        node.scope_level = Some(self.table.level());
        let span = node.span;

        let (typ, symbol) = match &mut node.kind {
            NodeKind::Program { name, block } => {
                let idx = self.table.add_program(name)?;
                self.visit(block)?;
                (TypeCode::NoType, Some(idx))
            }
            NodeKind::Block { declarations, body } => {
                for decl in declarations.iter_mut() {
                    self.visit(decl)?;
                }
                self.visit(body)?;
                (TypeCode::NoType, None)
            }
            NodeKind::VarDecl { var, type_node } => {
                self.var_declaration(var, type_node, as_parameter)?
            }
            NodeKind::ConstDecl { name, value } => self.const_declaration(name, value, span)?,
            NodeKind::TypeDecl { name, type_node } => {
                self.check_redeclaration(name, span)?;
                let (typ, reference, _) = self.resolve_type(type_node)?;
                let idx = self.table.add_type(name, typ, reference)?;
                (typ, Some(idx))
            }
            NodeKind::ProcedureDecl {
                name,
                params,
                block,
            } => self.subprogram(name, ObjectKind::Procedure, TypeCode::NoType, params, block, span)?,
            NodeKind::FunctionDecl {
                name,
                params,
                return_type,
                block,
            } => {
                let (ret, _, _) = self.resolve_type(return_type)?;
                self.subprogram(name, ObjectKind::Function, ret, params, block, span)?
            }
            NodeKind::Compound { statements } => {
                for statement in statements.iter_mut() {
                    self.visit(statement)?;
                }
                (TypeCode::NoType, None)
            }
            NodeKind::Assign { target, value } => {
                let target_type = self.visit_target(target)?;
                let value_type = self.visit(value)?;
                if !target_type.accepts(value_type) {
                    return Err(SemanticError::TypeMismatch {
                        name: truncate_name(target.name().unwrap_or("?")),
                        expected: target_type,
                        found: value_type,
                        span,
                    });
                }
                (target_type, None)
            }
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.condition("jika", condition)?;
                self.visit(then_branch)?;
                if let Some(branch) = else_branch {
                    self.visit(branch)?;
                }
                (TypeCode::NoType, None)
            }
            NodeKind::While { condition, body } => {
                self.condition("selama", condition)?;
                self.visit(body)?;
                (TypeCode::NoType, None)
            }
            NodeKind::For {
                variable,
                start,
                end,
                body,
                ..
            } => {
                self.loop_variable(variable)?;
                let name = variable.name().unwrap_or("?").to_string();
                for bound in [start, end] {
                    let found = self.visit(bound)?;
                    if found != TypeCode::Integer {
                        return Err(SemanticError::TypeMismatch {
                            name: truncate_name(&name),
                            expected: TypeCode::Integer,
                            found,
                            span: bound.span,
                        });
                    }
                }
                self.visit(body)?;
                (TypeCode::NoType, None)
            }
            NodeKind::ProcedureCall { name, args } => self.procedure_call(name, args, span)?,
            NodeKind::FunctionCall { name, args } => self.function_call(name, args, span)?,
            NodeKind::BinOp { op, left, right } => {
                let lhs = self.visit(left)?;
                let rhs = self.visit(right)?;
                let typ = binary_result(op, lhs, rhs)
                    .ok_or_else(|| SemanticError::invalid_operand(op, &[lhs, rhs], span))?;
                (typ, None)
            }
            NodeKind::UnaryOp { op, operand } => {
                let inner = self.visit(operand)?;
                let typ = unary_result(op, inner)
                    .ok_or_else(|| SemanticError::invalid_operand(op, &[inner], span))?;
                (typ, None)
            }
            NodeKind::Var { name, index } => self.variable(name, index, span, Access::Read)?,
            NodeKind::Num { value } => {
                let typ = if value.contains('.') {
                    TypeCode::Real
                } else {
                    TypeCode::Integer
                };
                (typ, None)
            }
            NodeKind::StringLiteral { value } => (literal_type(value), None),
            NodeKind::BoolLiteral { .. } => (TypeCode::Boolean, None),
            NodeKind::NoOp => (TypeCode::NoType, None),
            NodeKind::Type { .. } => (TypeCode::NoType, None),
        };

        node.resolved_type = Some(typ);
        node.symbol_ref = symbol;
        Ok(typ)
    }

    // === DECLARATIONS ===

    fn check_redeclaration(&mut self, name: &str, span: Option<Span>) -> SemanticResult<()> {
        let Some(existing) = self.table.lookup_in_current_scope(name) else {
            return Ok(());
        };
        // The program name may be reused inside the program
        if self
            .table
            .entry(existing)
            .is_some_and(|e| e.obj == ObjectKind::Program)
        {
            return Ok(());
        }

        match self.policy {
            RedeclarationPolicy::Strict => Err(SemanticError::Redeclaration {
                name: truncate_name(name),
                level: self.table.level(),
                span,
            }),
            RedeclarationPolicy::Lenient => {
                self.warnings += 1;
                log_warning!(code = codes::warnings::REDECLARATION_ALLOWED,
                    "Identifier redeclared in the same scope",
                    span = span.unwrap_or_else(Span::dummy),
                    "name" => name,
                    "previous_index" => existing,
                    "level" => self.table.level()
                );
                Ok(())
            }
        }
    }

    fn var_declaration(
        &mut self,
        var: &mut AstNode,
        type_node: &mut AstNode,
        as_parameter: bool,
    ) -> SemanticResult<(TypeCode, Option<usize>)> {
        let (typ, reference, size) = self.resolve_type(type_node)?;
        let name = var.name().unwrap_or_default().to_string();
        self.check_redeclaration(&name, var.span)?;

        let idx = if as_parameter {
            self.table.add_parameter(&name, typ, reference, size)?
        } else {
            self.table.add_variable(&name, typ, reference, size)?
        };

        var.scope_level = Some(self.table.level());
        var.resolved_type = Some(typ);
        var.symbol_ref = Some(idx);
        Ok((typ, Some(idx)))
    }

    fn const_declaration(
        &mut self,
        name: &str,
        value: &mut AstNode,
        span: Option<Span>,
    ) -> SemanticResult<(TypeCode, Option<usize>)> {
        let typ = self.visit(value)?;
        self.check_redeclaration(name, span)?;

        let adr = match typ {
            TypeCode::Integer => eval_integer(value, &self.table)?,
            _ => self.literal_value(value).ok_or_else(|| {
                SemanticError::non_constant(
                    &format!("'{}' must be a literal or a constant", name),
                    value.span,
                )
            })?,
        };

        let idx = self.table.add_constant(name, typ, adr)?;
        Ok((typ, Some(idx)))
    }

    /// Storage value of a non-integer constant
    fn literal_value(&self, node: &AstNode) -> Option<i64> {
        match &node.kind {
            NodeKind::BoolLiteral { value } => Some(i64::from(*value)),
            NodeKind::StringLiteral { value } => {
                let inner = unquote(value);
                let mut chars = inner.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(i64::from(u32::from(c))),
                    _ => Some(0),
                }
            }
            NodeKind::Num { .. } => Some(0),
            NodeKind::UnaryOp { operand, .. } if matches!(operand.kind, NodeKind::Num { .. }) => {
                Some(0)
            }
            NodeKind::Var { index: None, .. } => node
                .symbol_ref
                .and_then(|idx| self.table.entry(idx))
                .filter(|e| e.obj == ObjectKind::Constant)
                .map(|e| e.adr),
            _ => None,
        }
    }

    fn subprogram(
        &mut self,
        name: &str,
        kind: ObjectKind,
        return_type: TypeCode,
        params: &mut [AstNode],
        block: &mut AstNode,
        span: Option<Span>,
    ) -> SemanticResult<(TypeCode, Option<usize>)> {
        self.check_redeclaration(name, span)?;
        let idx = self.table.add_subprogram(name, kind, return_type)?;
        let block_index = self.table.enter_scope()?;
        self.table.set_reference(idx, block_index);

        if self.log_scopes {
            log_debug!("Entered scope",
                "name" => name,
                "level" => self.table.level(),
                "block" => block_index
            );
        }

        if params.len() > MAX_CALL_ARGUMENTS {
            return Err(SemanticError::ArgumentCountMismatch {
                name: truncate_name(name),
                expected: MAX_CALL_ARGUMENTS,
                found: params.len(),
                span,
            });
        }
        for param in params.iter_mut() {
            self.visit_node(param, true)?;
        }
        self.visit(block)?;
        self.table.exit_scope()?;

        if self.log_scopes {
            log_debug!("Left scope", "name" => name, "level" => self.table.level());
        }
        Ok((return_type, Some(idx)))
    }

    /// Resolve a `Type` node to (type code, table reference, storage size)
    fn resolve_type(&mut self, node: &mut AstNode) -> SemanticResult<(TypeCode, usize, i64)> {
        node.scope_level = Some(self.table.level());
        let span = node.span;

        let NodeKind::Type { spec } = &mut node.kind else {
            return Err(SemanticError::UnknownType {
                name: node.to_string(),
                span,
            });
        };

        let (typ, reference, size, symbol) = match spec {
            TypeSpec::Named(name) => {
                let idx = self.table.lookup(name).ok_or_else(|| SemanticError::UnknownType {
                    name: truncate_name(name),
                    span,
                })?;
                let (obj, typ, reference) = self.entry_info(idx);
                if obj != ObjectKind::Type {
                    return Err(SemanticError::WrongObjectKind {
                        name: truncate_name(name),
                        expected: "type",
                        found: obj,
                        span,
                    });
                }
                (typ, reference, self.table.type_size(typ, reference), Some(idx))
            }
            TypeSpec::Array { low, high, element } => {
                let (lo, hi) = self.bounds(low, high)?;
                let (etyp, eref, esize) = self.resolve_type(element)?;
                let array = self
                    .table
                    .add_array(TypeCode::Integer, etyp, eref, lo, hi, esize)?;
                let size = self.table.type_size(TypeCode::Array, array);
                (TypeCode::Array, array, size, None)
            }
            TypeSpec::Subrange { low, high } => {
                let (lo, hi) = self.bounds(low, high)?;
                if lo > hi {
                    return Err(SymbolError::InvalidArrayBounds { low: lo, high: hi }.into());
                }
                (TypeCode::Integer, 0, 1, None)
            }
        };

        node.resolved_type = Some(typ);
        node.symbol_ref = symbol;
        Ok((typ, reference, size))
    }

    fn bounds(&mut self, low: &mut AstNode, high: &mut AstNode) -> SemanticResult<(i64, i64)> {
        self.visit(low)?;
        self.visit(high)?;
        Ok((eval_integer(low, &self.table)?, eval_integer(high, &self.table)?))
    }

    // === STATEMENTS ===

    fn condition(&mut self, construct: &'static str, node: &mut AstNode) -> SemanticResult<()> {
        let found = self.visit(node)?;
        if found != TypeCode::Boolean {
            return Err(SemanticError::InvalidCondition {
                construct,
                found,
                span: node.span,
            });
        }
        Ok(())
    }

    /// Assignment target: a variable, or a function name inside its body
    fn visit_target(&mut self, target: &mut AstNode) -> SemanticResult<TypeCode> {
        target.scope_level = Some(self.table.level());
        let span = target.span;
        let (typ, symbol) = match &mut target.kind {
            NodeKind::Var { name, index } => self.variable(name, index, span, Access::Write)?,
            _ => return self.visit(target),
        };
        target.resolved_type = Some(typ);
        target.symbol_ref = symbol;
        Ok(typ)
    }

    fn loop_variable(&mut self, variable: &mut AstNode) -> SemanticResult<()> {
        let found = self.visit(variable)?;
        let name = variable.name().unwrap_or("?");
        let obj = variable
            .symbol_ref
            .map(|idx| self.entry_info(idx).0)
            .unwrap_or(ObjectKind::Variable);

        if obj != ObjectKind::Variable {
            return Err(SemanticError::WrongObjectKind {
                name: truncate_name(name),
                expected: "variable",
                found: obj,
                span: variable.span,
            });
        }
        if found != TypeCode::Integer {
            return Err(SemanticError::InvalidLoopVariable {
                name: truncate_name(name),
                found,
                span: variable.span,
            });
        }
        Ok(())
    }

    fn procedure_call(
        &mut self,
        name: &str,
        args: &mut [AstNode],
        span: Option<Span>,
    ) -> SemanticResult<(TypeCode, Option<usize>)> {
        let found = self.visit_arguments(name, args, span)?;

        let Some(idx) = self.table.lookup(name) else {
            if is_builtin(name) {
                return Ok((TypeCode::NoType, None));
            }
            return Err(SemanticError::UnknownProcedure {
                name: truncate_name(name),
                span,
            });
        };

        let (obj, _, block) = self.entry_info(idx);
        if obj != ObjectKind::Procedure {
            return Err(SemanticError::WrongObjectKind {
                name: truncate_name(name),
                expected: "procedure",
                found: obj,
                span,
            });
        }
        self.check_arguments(name, block, &found, span)?;
        Ok((TypeCode::NoType, Some(idx)))
    }

    // === EXPRESSIONS ===

    fn function_call(
        &mut self,
        name: &str,
        args: &mut [AstNode],
        span: Option<Span>,
    ) -> SemanticResult<(TypeCode, Option<usize>)> {
        let found = self.visit_arguments(name, args, span)?;
        let idx = self
            .table
            .lookup(name)
            .ok_or_else(|| SemanticError::undeclared(name, span))?;

        let (obj, typ, block) = self.entry_info(idx);
        if obj != ObjectKind::Function {
            return Err(SemanticError::WrongObjectKind {
                name: truncate_name(name),
                expected: "function",
                found: obj,
                span,
            });
        }
        self.check_arguments(name, block, &found, span)?;
        Ok((typ, Some(idx)))
    }

    fn visit_arguments(
        &mut self,
        name: &str,
        args: &mut [AstNode],
        span: Option<Span>,
    ) -> SemanticResult<Vec<TypeCode>> {
        if args.len() > MAX_CALL_ARGUMENTS {
            return Err(SemanticError::ArgumentCountMismatch {
                name: truncate_name(name),
                expected: MAX_CALL_ARGUMENTS,
                found: args.len(),
                span,
            });
        }
        args.iter_mut().map(|arg| self.visit(arg)).collect()
    }

    /// Arity and per-position assignability against the callee's parameters
    fn check_arguments(
        &self,
        name: &str,
        block: usize,
        found: &[TypeCode],
        span: Option<Span>,
    ) -> SemanticResult<()> {
        let params = self.table.parameters(block);
        if params.len() != found.len() {
            return Err(SemanticError::ArgumentCountMismatch {
                name: truncate_name(name),
                expected: params.len(),
                found: found.len(),
                span,
            });
        }

        for (param, arg) in params.iter().zip(found) {
            let Some(entry) = self.table.entry(*param) else {
                continue;
            };
            if !entry.typ.accepts(*arg) {
                return Err(SemanticError::TypeMismatch {
                    name: truncate_name(&entry.id),
                    expected: entry.typ,
                    found: *arg,
                    span,
                });
            }
        }
        Ok(())
    }

    fn variable(
        &mut self,
        name: &str,
        index: &mut Option<Box<AstNode>>,
        span: Option<Span>,
        access: Access,
    ) -> SemanticResult<(TypeCode, Option<usize>)> {
        let idx = self
            .table
            .lookup(name)
            .ok_or_else(|| SemanticError::undeclared(name, span))?;
        let (obj, typ, reference) = self.entry_info(idx);

        let allowed = match (obj, access) {
            (ObjectKind::Variable, _) => true,
            // Only the function whose body is open may set its result
            (ObjectKind::Function, Access::Write) => {
                reference != 0 && self.table.display().contains(&reference)
            }
            (ObjectKind::Constant, Access::Read) => true,
            // Bare function name in an expression is a call without arguments
            (ObjectKind::Function, Access::Read) => {
                self.check_arguments(name, reference, &[], span)?;
                true
            }
            _ => false,
        };
        if !allowed {
            return Err(SemanticError::WrongObjectKind {
                name: truncate_name(name),
                expected: "variable",
                found: obj,
                span,
            });
        }

        let Some(index) = index else {
            return Ok((typ, Some(idx)));
        };

        let index_type = self.visit(index)?;
        let array = match (typ, self.table.array(reference)) {
            (TypeCode::Array, Some(array)) if obj == ObjectKind::Variable => array,
            _ => return Err(SemanticError::invalid_operand("[]", &[typ], span)),
        };
        if !array.xtyp.accepts(index_type) {
            return Err(SemanticError::invalid_operand("[]", &[typ, index_type], index.span));
        }
        Ok((array.etyp, Some(idx)))
    }

    fn entry_info(&self, idx: usize) -> (ObjectKind, TypeCode, usize) {
        self.table
            .entry(idx)
            .map(|e| (e.obj, e.typ, e.reference))
            .unwrap_or((ObjectKind::Variable, TypeCode::NoType, 0))
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_builtin(name: &str) -> bool {
    BUILTIN_PROCEDURES
        .iter()
        .any(|b| b.eq_ignore_ascii_case(name))
}

/// Fold Indonesian operator aliases onto their Pascal spelling
fn canonical_operator(op: &str) -> &str {
    match op {
        "bagi" => "div",
        "dan" => "and",
        "atau" => "or",
        "tidak" => "not",
        other => other,
    }
}

fn binary_result(op: &str, lhs: TypeCode, rhs: TypeCode) -> Option<TypeCode> {
    let numeric = lhs.is_numeric() && rhs.is_numeric();
    match canonical_operator(op) {
        "+" | "-" | "*" if numeric => {
            if lhs == TypeCode::Integer && rhs == TypeCode::Integer {
                Some(TypeCode::Integer)
            } else {
                Some(TypeCode::Real)
            }
        }
        "/" if numeric => Some(TypeCode::Real),
        "div" | "mod" if lhs == TypeCode::Integer && rhs == TypeCode::Integer => {
            Some(TypeCode::Integer)
        }
        "=" | "<>" | "<" | "<=" | ">" | ">=" if numeric || lhs == rhs => Some(TypeCode::Boolean),
        "and" | "or" if lhs == TypeCode::Boolean && rhs == TypeCode::Boolean => {
            Some(TypeCode::Boolean)
        }
        _ => None,
    }
}

fn unary_result(op: &str, operand: TypeCode) -> Option<TypeCode> {
    match canonical_operator(op) {
        "+" | "-" if operand.is_numeric() => Some(operand),
        "not" if operand == TypeCode::Boolean => Some(TypeCode::Boolean),
        _ => None,
    }
}

fn unquote(literal: &str) -> String {
    let inner = literal
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(literal);
    inner.replace("''", "'")
}

/// Quoted single character is a char, anything else a string
fn literal_type(literal: &str) -> TypeCode {
    if unquote(literal).chars().count() == 1 {
        TypeCode::Char
    } else {
        TypeCode::String
    }
}
