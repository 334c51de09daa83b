//! Tokens produced by the scanner and the stream the parser reads them from

pub mod token;
pub mod token_stream;

pub use token::{Token, TokenKind};
pub use token_stream::TokenStream;

/// Module version
pub const VERSION: &str = "1.0.0";
