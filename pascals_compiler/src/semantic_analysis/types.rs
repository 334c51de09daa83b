//! Shared semantic analysis types: type codes and the semantic error enum

use crate::config::constants::compile_time::semantic::*;
use crate::logging::codes;
use crate::symbols::{ObjectKind, SymbolError};
use crate::utils::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type SemanticResult<T> = Result<T, SemanticError>;

/// Numeric type codes stored in the identifier table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeCode {
    NoType = 0,
    Integer = 1,
    Real = 2,
    Boolean = 3,
    Char = 4,
    Array = 5,
    String = 6,
}

impl TypeCode {
    pub const BASE_TYPES: [TypeCode; 4] = [
        TypeCode::Integer,
        TypeCode::Real,
        TypeCode::Boolean,
        TypeCode::Char,
    ];

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            TypeCode::NoType => "none",
            TypeCode::Integer => "integer",
            TypeCode::Real => "real",
            TypeCode::Boolean => "boolean",
            TypeCode::Char => "char",
            TypeCode::Array => "array",
            TypeCode::String => "string",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeCode::Integer | TypeCode::Real)
    }

    /// Exact match, or integer widening into real
    pub fn accepts(&self, value: TypeCode) -> bool {
        *self == value || (*self == TypeCode::Real && value == TypeCode::Integer)
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn at(span: &Option<Span>) -> String {
    match span {
        Some(span) => format!(" at line {}, column {}", span.start.line, span.start.column),
        None => String::new(),
    }
}

/// Fatal analysis failures; the first one aborts the run
#[derive(Debug, Clone, Error)]
pub enum SemanticError {
    #[error("Undeclared identifier '{name}'{}", at(.span))]
    UndeclaredIdentifier { name: String, span: Option<Span> },

    #[error("Type mismatch: cannot assign {found} to '{name}' of type {expected}{}", at(.span))]
    TypeMismatch {
        name: String,
        expected: TypeCode,
        found: TypeCode,
        span: Option<Span>,
    },

    #[error("Condition of '{construct}' must be boolean, found {found}{}", at(.span))]
    InvalidCondition {
        construct: &'static str,
        found: TypeCode,
        span: Option<Span>,
    },

    #[error("Operator '{op}' cannot be applied to {operands}{}", at(.span))]
    InvalidOperand {
        op: String,
        operands: String,
        span: Option<Span>,
    },

    #[error("Unknown procedure '{name}'{}", at(.span))]
    UnknownProcedure { name: String, span: Option<Span> },

    #[error("'{name}' is a {found}, expected a {expected}{}", at(.span))]
    WrongObjectKind {
        name: String,
        expected: &'static str,
        found: ObjectKind,
        span: Option<Span>,
    },

    #[error("Loop variable '{name}' must be an integer variable, found {found}{}", at(.span))]
    InvalidLoopVariable {
        name: String,
        found: TypeCode,
        span: Option<Span>,
    },

    #[error("'{name}' is already declared at level {level}{}", at(.span))]
    Redeclaration {
        name: String,
        level: usize,
        span: Option<Span>,
    },

    #[error("Not a constant integer expression: {reason}{}", at(.span))]
    NonConstantExpression { reason: String, span: Option<Span> },

    #[error("Unknown type '{name}'{}", at(.span))]
    UnknownType { name: String, span: Option<Span> },

    #[error("'{name}' expects {expected} argument(s), found {found}{}", at(.span))]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Option<Span>,
    },

    #[error(transparent)]
    Symbol(#[from] SymbolError),
}

impl SemanticError {
    pub fn error_code(&self) -> codes::Code {
        match self {
            Self::UndeclaredIdentifier { .. } => codes::semantic::UNDECLARED_IDENTIFIER,
            Self::TypeMismatch { .. } => codes::semantic::TYPE_MISMATCH,
            Self::InvalidCondition { .. } => codes::semantic::INVALID_CONDITION,
            Self::InvalidOperand { .. } => codes::semantic::INVALID_OPERAND,
            Self::UnknownProcedure { .. } => codes::semantic::UNKNOWN_PROCEDURE,
            Self::WrongObjectKind { .. } => codes::semantic::WRONG_OBJECT_KIND,
            Self::InvalidLoopVariable { .. } => codes::semantic::INVALID_LOOP_VARIABLE,
            Self::Redeclaration { .. } => codes::semantic::REDECLARATION,
            Self::NonConstantExpression { .. } => codes::semantic::NON_CONSTANT_EXPRESSION,
            Self::UnknownType { .. } => codes::semantic::UNKNOWN_TYPE,
            Self::ArgumentCountMismatch { .. } => codes::semantic::ARGUMENT_COUNT_MISMATCH,
            Self::Symbol(e) => e.error_code(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UndeclaredIdentifier { span, .. }
            | Self::TypeMismatch { span, .. }
            | Self::InvalidCondition { span, .. }
            | Self::InvalidOperand { span, .. }
            | Self::UnknownProcedure { span, .. }
            | Self::WrongObjectKind { span, .. }
            | Self::InvalidLoopVariable { span, .. }
            | Self::Redeclaration { span, .. }
            | Self::NonConstantExpression { span, .. }
            | Self::UnknownType { span, .. }
            | Self::ArgumentCountMismatch { span, .. } => *span,
            Self::Symbol(_) => None,
        }
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn undeclared(name: &str, span: Option<Span>) -> Self {
        Self::UndeclaredIdentifier {
            name: truncate_name(name),
            span,
        }
    }

    pub fn invalid_operand(op: &str, operands: &[TypeCode], span: Option<Span>) -> Self {
        let operands = operands
            .iter()
            .map(TypeCode::name)
            .collect::<Vec<_>>()
            .join(" and ");
        Self::InvalidOperand {
            op: op.to_string(),
            operands,
            span,
        }
    }

    pub fn non_constant(reason: &str, span: Option<Span>) -> Self {
        Self::NonConstantExpression {
            reason: truncate_message(reason),
            span,
        }
    }
}

/// Keep identifier names in messages bounded
pub(crate) fn truncate_name(name: &str) -> String {
    truncate_message(name)
}

fn truncate_message(message: &str) -> String {
    if message.chars().count() > MAX_ERROR_MESSAGE_LENGTH {
        let kept: String = message.chars().take(MAX_ERROR_MESSAGE_LENGTH).collect();
        format!("{}...", kept)
    } else {
        message.to_string()
    }
}
