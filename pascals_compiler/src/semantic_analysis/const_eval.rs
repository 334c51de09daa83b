//! Integer constant folding for array bounds and subranges

use crate::ast::{AstNode, NodeKind};
use crate::semantic_analysis::types::{SemanticError, SemanticResult, TypeCode};
use crate::symbols::{ObjectKind, SymbolTable};

/// Fold an expression made of integer literals, integer constants and
/// `+ - * div bagi mod`. Anything else is not a constant.
pub fn eval_integer(node: &AstNode, table: &SymbolTable) -> SemanticResult<i64> {
    let span = node.span;
    match &node.kind {
        NodeKind::Num { value } => {
            if value.contains('.') {
                return Err(SemanticError::non_constant(
                    &format!("'{}' is a real literal", value),
                    span,
                ));
            }
            value.parse::<i64>().map_err(|_| {
                SemanticError::non_constant(&format!("'{}' is out of range", value), span)
            })
        }
        NodeKind::Var { name, index: None } => {
            let entry = table
                .lookup(name)
                .and_then(|idx| table.entry(idx))
                .ok_or_else(|| SemanticError::undeclared(name, span))?;
            if entry.obj == ObjectKind::Constant && entry.typ == TypeCode::Integer {
                Ok(entry.adr)
            } else {
                Err(SemanticError::non_constant(
                    &format!("'{}' is not an integer constant", name),
                    span,
                ))
            }
        }
        NodeKind::UnaryOp { op, operand } => {
            let value = eval_integer(operand, table)?;
            match op.as_str() {
                "+" => Ok(value),
                "-" => value
                    .checked_neg()
                    .ok_or_else(|| SemanticError::non_constant("integer overflow", span)),
                other => Err(SemanticError::non_constant(
                    &format!("operator '{}' is not allowed here", other),
                    span,
                )),
            }
        }
        NodeKind::BinOp { op, left, right } => {
            let lhs = eval_integer(left, table)?;
            let rhs = eval_integer(right, table)?;
            let result = match op.as_str() {
                "+" => lhs.checked_add(rhs),
                "-" => lhs.checked_sub(rhs),
                "*" => lhs.checked_mul(rhs),
                "div" | "bagi" | "mod" if rhs == 0 => {
                    return Err(SemanticError::non_constant("division by zero", span))
                }
                "div" | "bagi" => lhs.checked_div(rhs),
                "mod" => lhs.checked_rem(rhs),
                "/" => {
                    return Err(SemanticError::non_constant("'/' yields a real value", span))
                }
                other => {
                    return Err(SemanticError::non_constant(
                        &format!("operator '{}' is not allowed here", other),
                        span,
                    ))
                }
            };
            result.ok_or_else(|| SemanticError::non_constant("integer overflow", span))
        }
        _ => Err(SemanticError::non_constant(
            &format!("{} is not a constant expression", node.variant_name()),
            span,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn num(v: &str) -> AstNode {
        AstNode::new(NodeKind::Num { value: v.into() }, None)
    }

    fn bin(op: &str, l: AstNode, r: AstNode) -> AstNode {
        AstNode::new(
            NodeKind::BinOp {
                op: op.into(),
                left: Box::new(l),
                right: Box::new(r),
            },
            None,
        )
    }

    #[test]
    fn test_literal_arithmetic() {
        let table = SymbolTable::new();
        let expr = bin("-", bin("*", num("4"), num("5")), bin("div", num("7"), num("2")));
        assert_eq!(eval_integer(&expr, &table).unwrap(), 17);
        assert_eq!(eval_integer(&bin("mod", num("7"), num("3")), &table).unwrap(), 1);
    }

    #[test]
    fn test_named_constant() {
        let mut table = SymbolTable::new();
        table.add_constant("n", TypeCode::Integer, 10).unwrap();
        let expr = bin("+", AstNode::var("N", None), num("1"));
        assert_eq!(eval_integer(&expr, &table).unwrap(), 11);
    }

    #[test]
    fn test_negation() {
        let table = SymbolTable::new();
        let expr = AstNode::new(
            NodeKind::UnaryOp {
                op: "-".into(),
                operand: Box::new(num("3")),
            },
            None,
        );
        assert_eq!(eval_integer(&expr, &table).unwrap(), -3);
    }

    #[test]
    fn test_non_constants_rejected() {
        let mut table = SymbolTable::new();
        table.add_variable("v", TypeCode::Integer, 0, 1).unwrap();

        assert_matches!(
            eval_integer(&num("1.5"), &table),
            Err(SemanticError::NonConstantExpression { .. })
        );
        assert_matches!(
            eval_integer(&AstNode::var("v", None), &table),
            Err(SemanticError::NonConstantExpression { .. })
        );
        assert_matches!(
            eval_integer(&AstNode::var("missing", None), &table),
            Err(SemanticError::UndeclaredIdentifier { .. })
        );
        assert_matches!(
            eval_integer(&bin("/", num("4"), num("2")), &table),
            Err(SemanticError::NonConstantExpression { .. })
        );
        assert_matches!(
            eval_integer(&bin("div", num("4"), num("0")), &table),
            Err(SemanticError::NonConstantExpression { reason, .. }) if reason == "division by zero"
        );
    }
}
