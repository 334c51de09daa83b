//! Shared primitives used by every compiler stage
//!
//! Source positions and spans live here so that tokens, parse tree nodes and
//! log events can all point back into the program text.

pub mod span;

pub use span::{Position, SourceMap, Span};
