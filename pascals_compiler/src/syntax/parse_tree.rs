//! Generic labeled parse tree
//!
//! Internal nodes carry a nonterminal label such as `<program>`; leaves carry
//! the token kind name as label and the lexeme as value.

use crate::tokens::Token;
use crate::utils::Span;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseNode {
    pub label: String,
    pub value: Option<String>,
    pub children: Vec<ParseNode>,
    #[serde(skip)]
    pub span: Option<Span>,
}

impl ParseNode {
    pub fn internal(label: &str) -> Self {
        Self {
            label: label.to_string(),
            value: None,
            children: Vec::new(),
            span: None,
        }
    }

    pub fn leaf(token: &Token) -> Self {
        Self {
            label: token.kind.as_str().to_string(),
            value: Some(token.lexeme.clone()),
            children: Vec::new(),
            span: Some(token.span),
        }
    }

    pub fn push(&mut self, child: ParseNode) {
        self.children.push(child);
    }

    pub fn is_leaf(&self) -> bool {
        self.value.is_some()
    }

    /// Leaf whose kind label matches
    pub fn is_token(&self, kind: &str) -> bool {
        self.is_leaf() && self.label == kind
    }

    /// Lexeme of a leaf, case preserved
    pub fn text(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Case-insensitive lexeme test
    pub fn has_value(&self, word: &str) -> bool {
        self.value
            .as_deref()
            .map_or(false, |v| v.eq_ignore_ascii_case(word))
    }

    pub fn child(&self, index: usize) -> Option<&ParseNode> {
        self.children.get(index)
    }

    /// First child with the given label
    pub fn find(&self, label: &str) -> Option<&ParseNode> {
        self.children.iter().find(|c| c.label == label)
    }

    /// Span of the first leaf in this subtree
    pub fn first_span(&self) -> Option<Span> {
        self.span
            .or_else(|| self.children.iter().find_map(ParseNode::first_span))
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ParseNode::node_count).sum::<usize>()
    }

    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(ParseNode::depth).max().unwrap_or(0)
    }

    /// Box-drawing rendering of the whole tree
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.to_string());
        out.push('\n');
        let count = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            child.render_into(&mut out, "", i + 1 == count);
        }
        out
    }

    fn render_into(&self, out: &mut String, prefix: &str, last: bool) {
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&self.to_string());
        out.push('\n');

        let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
        let count = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            child.render_into(out, &child_prefix, i + 1 == count);
        }
    }
}

impl fmt::Display for ParseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}({})", self.label, value),
            None => f.write_str(&self.label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;
    use crate::utils::Position;

    fn leaf(kind: TokenKind, lexeme: &str) -> ParseNode {
        ParseNode::leaf(&Token::new(kind, lexeme, Position::start()))
    }

    #[test]
    fn test_leaf_display() {
        let node = leaf(TokenKind::Identifier, "x");
        assert_eq!(node.to_string(), "IDENTIFIER(x)");
        assert!(node.is_token("IDENTIFIER"));
        assert!(node.has_value("X"));
    }

    #[test]
    fn test_render_connectors() {
        let mut header = ParseNode::internal("<program-header>");
        header.push(leaf(TokenKind::Keyword, "program"));
        header.push(leaf(TokenKind::Identifier, "p"));
        let mut root = ParseNode::internal("<program>");
        root.push(header);
        root.push(leaf(TokenKind::Dot, "."));

        let expected = "<program>\n\
                        ├── <program-header>\n\
                        │   ├── KEYWORD(program)\n\
                        │   └── IDENTIFIER(p)\n\
                        └── DOT(.)\n";
        assert_eq!(root.render(), expected);
        assert_eq!(root.node_count(), 5);
        assert_eq!(root.depth(), 3);
    }

    #[test]
    fn test_first_span_finds_leaf() {
        let mut inner = ParseNode::internal("<factor>");
        inner.push(ParseNode::leaf(&Token::new(
            TokenKind::Number,
            "5",
            Position::new(4, 2, 3),
        )));
        let mut outer = ParseNode::internal("<term>");
        outer.push(inner);
        assert_eq!(outer.first_span().map(|s| s.start.column), Some(3));
    }
}
