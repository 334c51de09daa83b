//! Recursive-descent parser producing a labeled parse tree
//!
//! One method per nonterminal. Alternatives are chosen with one token of
//! lookahead, two for identifier-led statements. Operators are matched by
//! lexeme so that `div`/`bagi`, `and`/`dan`, `or`/`atau` and `not`/`tidak`
//! are interchangeable.

use crate::config::constants::compile_time::syntax::*;
use crate::config::runtime::SyntaxPreferences;
use crate::syntax::error::{SyntaxError, SyntaxResult};
use crate::syntax::parse_tree::ParseNode;
use crate::tokens::{TokenKind, TokenStream};
use crate::log_debug;

const BASE_TYPES: [&str; 4] = ["integer", "real", "boolean", "char"];
const ADDITIVE_OPERATORS: [&str; 4] = ["+", "-", "or", "atau"];
const MULTIPLICATIVE_OPERATORS: [&str; 7] = ["*", "/", "div", "bagi", "mod", "and", "dan"];

pub struct PascalParser {
    tokens: TokenStream,
    context_stack: Vec<&'static str>,
    track_context: bool,
    depth: usize,
    max_depth_reached: usize,
}

impl PascalParser {
    pub fn new(tokens: TokenStream) -> Self {
        Self::with_preferences(tokens, &SyntaxPreferences::default())
    }

    pub fn with_preferences(tokens: TokenStream, preferences: &SyntaxPreferences) -> Self {
        log_debug!("Creating parser", "tokens" => tokens.len());
        Self {
            tokens,
            context_stack: Vec::new(),
            track_context: preferences.track_context,
            depth: 0,
            max_depth_reached: 0,
        }
    }

    /// Parse a whole program; tokens left after the final `.` are an error
    pub fn parse(&mut self) -> SyntaxResult<ParseNode> {
        if self.tokens.is_empty() {
            return Err(SyntaxError::EmptyTokenStream);
        }

        let root = self.program()?;

        if let Some(extra) = self.tokens.current() {
            return Err(SyntaxError::TrailingTokens {
                found: extra.to_string(),
                index: self.tokens.position(),
                span: extra.span,
            });
        }

        Ok(root)
    }

    /// Deepest rule nesting seen so far
    pub fn max_depth_reached(&self) -> usize {
        self.max_depth_reached
    }

    pub fn current_context(&self) -> String {
        self.context_stack.join(" -> ")
    }

    // === TOKEN PRIMITIVES ===

    /// Non-consuming kind test with optional case-insensitive value
    pub fn peek(&self, kind: TokenKind, value: Option<&str>) -> bool {
        self.tokens.check(kind, value)
    }

    fn peek_keyword(&self, word: &str) -> bool {
        self.peek(TokenKind::Keyword, Some(word))
    }

    fn peek_any_word(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.tokens.check_word(w))
    }

    fn peek_next(&self, kind: TokenKind) -> bool {
        self.tokens
            .peek_ahead(1)
            .is_some_and(|t| t.kind == kind)
    }

    /// Consume a matching token and return it as a leaf
    pub fn expect(&mut self, kind: TokenKind, value: Option<&str>) -> SyntaxResult<ParseNode> {
        if self.peek(kind, value) {
            return self.take();
        }

        let expected = match value {
            Some(v) => format!("{}({})", kind, v),
            None => kind.to_string(),
        };
        Err(self.mismatch(&expected))
    }

    fn expect_keyword(&mut self, word: &str) -> SyntaxResult<ParseNode> {
        self.expect(TokenKind::Keyword, Some(word))
    }

    /// Consume the current token whatever its kind
    fn take(&mut self) -> SyntaxResult<ParseNode> {
        match self.tokens.advance() {
            Some(token) => Ok(ParseNode::leaf(&token)),
            None => Err(SyntaxError::unexpected_end_of_input(
                "token",
                self.tokens.position(),
                self.current_context(),
            )),
        }
    }

    fn mismatch(&self, expected: &str) -> SyntaxError {
        let index = self.tokens.position();
        match self.tokens.current() {
            Some(found) => SyntaxError::unexpected_token(
                expected,
                &found.to_string(),
                index,
                found.span,
                self.current_context(),
            ),
            None => SyntaxError::unexpected_end_of_input(expected, index, self.current_context()),
        }
    }

    /// Run a grammar rule under the recursion guard and context trail
    fn rule<F>(&mut self, name: &'static str, body: F) -> SyntaxResult<ParseNode>
    where
        F: FnOnce(&mut Self, &mut ParseNode) -> SyntaxResult<()>,
    {
        if self.depth >= MAX_PARSE_DEPTH {
            return Err(SyntaxError::MaxRecursionDepth {
                depth: self.depth,
                span: self.tokens.current_span(),
            });
        }

        self.depth += 1;
        self.max_depth_reached = self.max_depth_reached.max(self.depth);
        let tracked = self.track_context && self.context_stack.len() < MAX_CONTEXT_STACK_DEPTH;
        if tracked {
            self.context_stack.push(name);
        }

        let mut node = ParseNode::internal(&format!("<{}>", name));
        let result = body(self, &mut node);

        // Keep the trail of a failing rule for the error report
        if result.is_ok() && tracked {
            self.context_stack.pop();
        }
        self.depth -= 1;

        result.map(|()| node)
    }

    // === PROGRAM STRUCTURE ===

    fn program(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("program", |p, node| {
            node.push(p.program_header()?);
            node.push(p.declaration_part()?);
            node.push(p.compound_statement()?);
            node.push(p.expect(TokenKind::Dot, Some("."))?);
            Ok(())
        })
    }

    fn program_header(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("program-header", |p, node| {
            node.push(p.expect_keyword("program")?);
            node.push(p.expect(TokenKind::Identifier, None)?);
            node.push(p.expect(TokenKind::Semicolon, Some(";"))?);
            Ok(())
        })
    }

    fn declaration_part(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("declaration-part", |p, node| {
            loop {
                if p.peek_keyword("variabel") {
                    node.push(p.var_declaration()?);
                } else if p.peek_keyword("konstanta") {
                    node.push(p.const_declaration()?);
                } else if p.peek_keyword("tipe") {
                    node.push(p.type_declaration()?);
                } else if p.peek_keyword("prosedur") || p.peek_keyword("fungsi") {
                    node.push(p.subprogram_declaration()?);
                } else {
                    return Ok(());
                }
            }
        })
    }

    // === DECLARATIONS ===

    /// `variabel` followed by groups of identifier-list, `:`, type, `;`
    fn var_declaration(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("var-declaration", |p, node| {
            node.push(p.expect_keyword("variabel")?);
            loop {
                node.push(p.identifier_list()?);
                node.push(p.expect(TokenKind::Colon, Some(":"))?);
                node.push(p.type_spec()?);
                node.push(p.expect(TokenKind::Semicolon, Some(";"))?);
                if !p.peek(TokenKind::Identifier, None) {
                    return Ok(());
                }
            }
        })
    }

    fn const_declaration(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("const-declaration", |p, node| {
            node.push(p.expect_keyword("konstanta")?);
            loop {
                node.push(p.expect(TokenKind::Identifier, None)?);
                node.push(p.expect(TokenKind::RelationalOperator, Some("="))?);
                node.push(p.expression()?);
                node.push(p.expect(TokenKind::Semicolon, Some(";"))?);
                if !p.peek(TokenKind::Identifier, None) {
                    return Ok(());
                }
            }
        })
    }

    fn type_declaration(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("type-declaration", |p, node| {
            node.push(p.expect_keyword("tipe")?);
            loop {
                node.push(p.expect(TokenKind::Identifier, None)?);
                node.push(p.expect(TokenKind::RelationalOperator, Some("="))?);
                node.push(p.type_spec()?);
                node.push(p.expect(TokenKind::Semicolon, Some(";"))?);
                if !p.peek(TokenKind::Identifier, None) {
                    return Ok(());
                }
            }
        })
    }

    fn identifier_list(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("identifier-list", |p, node| {
            node.push(p.expect(TokenKind::Identifier, None)?);
            while p.peek(TokenKind::Comma, None) {
                node.push(p.take()?);
                node.push(p.expect(TokenKind::Identifier, None)?);
            }
            Ok(())
        })
    }

    /// Base type keyword, `larik[..] dari T`, or an expression (alias or subrange)
    fn type_spec(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("type", |p, node| {
            if BASE_TYPES.iter().any(|t| p.peek_keyword(t)) {
                node.push(p.take()?);
            } else if p.peek_keyword("larik") {
                node.push(p.array_type()?);
            } else {
                node.push(p.expression()?);
                if p.peek(TokenKind::RangeOperator, None) {
                    node.push(p.take()?);
                    node.push(p.expression()?);
                }
            }
            Ok(())
        })
    }

    fn array_type(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("array-type", |p, node| {
            node.push(p.expect_keyword("larik")?);
            node.push(p.expect(TokenKind::LBracket, Some("["))?);
            node.push(p.expression()?);
            node.push(p.expect(TokenKind::RangeOperator, Some(".."))?);
            node.push(p.expression()?);
            node.push(p.expect(TokenKind::RBracket, Some("]"))?);
            node.push(p.expect_keyword("dari")?);
            node.push(p.type_spec()?);
            Ok(())
        })
    }

    fn subprogram_declaration(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("subprogram-declaration", |p, node| {
            if p.peek_keyword("fungsi") {
                node.push(p.function_declaration()?);
            } else {
                node.push(p.procedure_declaration()?);
            }
            Ok(())
        })
    }

    fn procedure_declaration(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("procedure-declaration", |p, node| {
            node.push(p.expect_keyword("prosedur")?);
            node.push(p.expect(TokenKind::Identifier, None)?);
            if p.peek(TokenKind::LParenthesis, None) {
                node.push(p.formal_parameter_list()?);
            }
            node.push(p.expect(TokenKind::Semicolon, Some(";"))?);
            node.push(p.declaration_part()?);
            node.push(p.compound_statement()?);
            node.push(p.expect(TokenKind::Semicolon, Some(";"))?);
            Ok(())
        })
    }

    fn function_declaration(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("function-declaration", |p, node| {
            node.push(p.expect_keyword("fungsi")?);
            node.push(p.expect(TokenKind::Identifier, None)?);
            if p.peek(TokenKind::LParenthesis, None) {
                node.push(p.formal_parameter_list()?);
            }
            node.push(p.expect(TokenKind::Colon, Some(":"))?);
            node.push(p.type_spec()?);
            node.push(p.expect(TokenKind::Semicolon, Some(";"))?);
            node.push(p.declaration_part()?);
            node.push(p.compound_statement()?);
            node.push(p.expect(TokenKind::Semicolon, Some(";"))?);
            Ok(())
        })
    }

    fn formal_parameter_list(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("formal-parameter-list", |p, node| {
            node.push(p.expect(TokenKind::LParenthesis, Some("("))?);
            node.push(p.parameter_group()?);
            while p.peek(TokenKind::Semicolon, None) {
                node.push(p.take()?);
                node.push(p.parameter_group()?);
            }
            node.push(p.expect(TokenKind::RParenthesis, Some(")"))?);
            Ok(())
        })
    }

    fn parameter_group(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("parameter-group", |p, node| {
            node.push(p.identifier_list()?);
            node.push(p.expect(TokenKind::Colon, Some(":"))?);
            node.push(p.type_spec()?);
            Ok(())
        })
    }

    // === STATEMENTS ===

    fn compound_statement(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("compound-statement", |p, node| {
            node.push(p.expect_keyword("mulai")?);
            node.push(p.statement_list()?);
            node.push(p.expect_keyword("selesai")?);
            Ok(())
        })
    }

    fn statement_list(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("statement-list", |p, node| {
            node.push(p.statement()?);
            while p.peek(TokenKind::Semicolon, None) {
                node.push(p.take()?);
                if p.peek_keyword("selesai") {
                    break;
                }
                node.push(p.statement()?);
            }
            Ok(())
        })
    }

    fn statement(&mut self) -> SyntaxResult<ParseNode> {
        if self.peek_keyword("mulai") {
            self.compound_statement()
        } else if self.peek_keyword("jika") {
            self.if_statement()
        } else if self.peek_keyword("selama") {
            self.while_statement()
        } else if self.peek_keyword("untuk") {
            self.for_statement()
        } else if self.peek(TokenKind::Identifier, None) {
            if self.peek_next(TokenKind::AssignOperator) || self.peek_next(TokenKind::LBracket) {
                self.assignment_statement()
            } else if let Some(eq) = self
                .tokens
                .peek_ahead(1)
                .filter(|t| t.kind == TokenKind::RelationalOperator && t.lexeme == "=")
            {
                Err(SyntaxError::grammar_violation(
                    "'=' compares values; assignment uses ':='",
                    eq.span,
                ))
            } else {
                self.procedure_call()
            }
        } else if self.peek(TokenKind::Semicolon, None) || self.peek_keyword("selesai") {
            // Nothing is consumed; the list loop owns the separator
            self.rule("empty-statement", |_, _| Ok(()))
        } else {
            Err(self.mismatch("statement"))
        }
    }

    fn assignment_statement(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("assignment-statement", |p, node| {
            node.push(p.expect(TokenKind::Identifier, None)?);
            if p.peek(TokenKind::LBracket, None) {
                node.push(p.take()?);
                node.push(p.expression()?);
                node.push(p.expect(TokenKind::RBracket, Some("]"))?);
            }
            node.push(p.expect(TokenKind::AssignOperator, Some(":="))?);
            node.push(p.expression()?);
            Ok(())
        })
    }

    fn if_statement(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("if-statement", |p, node| {
            node.push(p.expect_keyword("jika")?);
            node.push(p.expression()?);
            node.push(p.expect_keyword("maka")?);
            node.push(p.statement()?);
            if p.peek_keyword("selain_itu") {
                node.push(p.take()?);
                node.push(p.statement()?);
            }
            Ok(())
        })
    }

    fn while_statement(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("while-statement", |p, node| {
            node.push(p.expect_keyword("selama")?);
            node.push(p.expression()?);
            node.push(p.expect_keyword("lakukan")?);
            node.push(p.statement()?);
            Ok(())
        })
    }

    fn for_statement(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("for-statement", |p, node| {
            node.push(p.expect_keyword("untuk")?);
            node.push(p.expect(TokenKind::Identifier, None)?);
            node.push(p.expect(TokenKind::AssignOperator, Some(":="))?);
            node.push(p.expression()?);
            if p.peek_keyword("ke") || p.peek_keyword("turun_ke") {
                node.push(p.take()?);
            } else {
                return Err(p.mismatch("KEYWORD(ke) or KEYWORD(turun_ke)"));
            }
            node.push(p.expression()?);
            node.push(p.expect_keyword("lakukan")?);
            node.push(p.statement()?);
            Ok(())
        })
    }

    fn procedure_call(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("procedure-call", |p, node| {
            node.push(p.expect(TokenKind::Identifier, None)?);
            if p.peek(TokenKind::LParenthesis, None) {
                p.call_arguments(node)?;
            }
            Ok(())
        })
    }

    /// `(` [parameter-list] `)` appended to a call node
    fn call_arguments(&mut self, node: &mut ParseNode) -> SyntaxResult<()> {
        node.push(self.expect(TokenKind::LParenthesis, Some("("))?);
        if !self.peek(TokenKind::RParenthesis, None) {
            node.push(self.parameter_list()?);
        }
        node.push(self.expect(TokenKind::RParenthesis, Some(")"))?);
        Ok(())
    }

    fn parameter_list(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("parameter-list", |p, node| {
            node.push(p.expression()?);
            while p.peek(TokenKind::Comma, None) {
                node.push(p.take()?);
                node.push(p.expression()?);
            }
            Ok(())
        })
    }

    // === EXPRESSIONS ===

    fn expression(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("expression", |p, node| {
            node.push(p.simple_expression()?);
            if p.peek(TokenKind::RelationalOperator, None) {
                node.push(p.take()?);
                node.push(p.simple_expression()?);
            }
            Ok(())
        })
    }

    fn simple_expression(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("simple-expression", |p, node| {
            if p.peek_any_word(&["+", "-"]) {
                node.push(p.take()?);
            }
            node.push(p.term()?);
            while p.peek_any_word(&ADDITIVE_OPERATORS) {
                node.push(p.take()?);
                node.push(p.term()?);
            }
            Ok(())
        })
    }

    fn term(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("term", |p, node| {
            node.push(p.factor()?);
            while p.peek_any_word(&MULTIPLICATIVE_OPERATORS) {
                node.push(p.take()?);
                node.push(p.factor()?);
            }
            Ok(())
        })
    }

    fn factor(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("factor", |p, node| {
            if p.peek(TokenKind::Identifier, None) {
                if p.peek_next(TokenKind::LParenthesis) {
                    node.push(p.function_call()?);
                } else {
                    node.push(p.take()?);
                    if p.peek(TokenKind::LBracket, None) {
                        node.push(p.take()?);
                        node.push(p.expression()?);
                        node.push(p.expect(TokenKind::RBracket, Some("]"))?);
                    }
                }
            } else if p.peek(TokenKind::Number, None)
                || p.peek(TokenKind::StringLiteral, None)
                || p.peek(TokenKind::CharLiteral, None)
                || p.peek_keyword("true")
                || p.peek_keyword("false")
            {
                node.push(p.take()?);
            } else if p.peek_any_word(&["not", "tidak"]) {
                node.push(p.take()?);
                node.push(p.factor()?);
            } else if p.peek(TokenKind::LParenthesis, None) {
                node.push(p.take()?);
                node.push(p.expression()?);
                node.push(p.expect(TokenKind::RParenthesis, Some(")"))?);
            } else {
                return Err(p.mismatch("factor"));
            }
            Ok(())
        })
    }

    fn function_call(&mut self) -> SyntaxResult<ParseNode> {
        self.rule("function-call", |p, node| {
            node.push(p.expect(TokenKind::Identifier, None)?);
            p.call_arguments(node)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::Lexer;
    use assert_matches::assert_matches;

    fn parse_source(source: &str) -> SyntaxResult<ParseNode> {
        let tokens = Lexer::with_defaults().unwrap().tokenize(source).unwrap();
        PascalParser::new(tokens).parse()
    }

    fn labels(node: &ParseNode) -> Vec<String> {
        node.children.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_program_root_has_four_children() {
        let tree = parse_source("program p; mulai selesai.").unwrap();
        assert_eq!(tree.label, "<program>");
        assert_eq!(
            labels(&tree),
            vec![
                "<program-header>",
                "<declaration-part>",
                "<compound-statement>",
                "DOT(.)"
            ]
        );
    }

    fn count_label(node: &ParseNode, label: &str) -> usize {
        let own = usize::from(node.label == label);
        own + node
            .children
            .iter()
            .map(|c| count_label(c, label))
            .sum::<usize>()
    }

    #[test]
    fn test_nested_compound_keeps_root_shape() {
        let tree = parse_source("program T; mulai mulai selesai selesai.").unwrap();
        assert_eq!(tree.children.len(), 4);
        assert_eq!(tree.children[2].label, "<compound-statement>");
        assert_eq!(count_label(&tree, "<compound-statement>"), 2);
        assert_eq!(tree.children[3].to_string(), "DOT(.)");
    }

    #[test]
    fn test_var_declaration_groups_are_flat() {
        let tree = parse_source("program p; variabel a, b: integer; c: real; mulai selesai.").unwrap();
        let decl = &tree.children[1].children[0];
        assert_eq!(decl.label, "<var-declaration>");
        assert_eq!(
            labels(decl),
            vec![
                "KEYWORD(variabel)",
                "<identifier-list>",
                "COLON(:)",
                "<type>",
                "SEMICOLON(;)",
                "<identifier-list>",
                "COLON(:)",
                "<type>",
                "SEMICOLON(;)"
            ]
        );
    }

    #[test]
    fn test_assignment_versus_procedure_call() {
        let tree = parse_source("program p; mulai foo := 1; foo(1, 2); bar selesai.").unwrap();
        let list = &tree.children[2].children[1];
        assert_eq!(list.children[0].label, "<assignment-statement>");
        assert_eq!(list.children[2].label, "<procedure-call>");
        assert_eq!(
            labels(&list.children[2]),
            vec!["IDENTIFIER(foo)", "LPARENTHESIS(()", "<parameter-list>", "RPARENTHESIS())"]
        );
        assert_eq!(labels(&list.children[4]), vec!["IDENTIFIER(bar)"]);
    }

    #[test]
    fn test_empty_statements_are_tolerated() {
        let tree = parse_source("program p; mulai ; x := 1;; selesai.").unwrap();
        let list = &tree.children[2].children[1];
        let kinds: Vec<_> = list.children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            kinds,
            vec![
                "<empty-statement>",
                "SEMICOLON",
                "<assignment-statement>",
                "SEMICOLON",
                "<empty-statement>",
                "SEMICOLON"
            ]
        );
    }

    #[test]
    fn test_if_else_layout() {
        let tree =
            parse_source("program p; mulai jika a > 1 maka b := 1 selain_itu b := 2 selesai.")
                .unwrap();
        let stmt = &tree.children[2].children[1].children[0];
        assert_eq!(stmt.label, "<if-statement>");
        assert_eq!(stmt.children.len(), 6);
        assert!(stmt.children[4].has_value("selain_itu"));
    }

    #[test]
    fn test_for_downto() {
        let tree =
            parse_source("program p; mulai untuk i := 10 turun_ke 1 lakukan writeln(i) selesai.")
                .unwrap();
        let stmt = &tree.children[2].children[1].children[0];
        assert_eq!(stmt.label, "<for-statement>");
        assert!(stmt.children[4].has_value("turun_ke"));
    }

    #[test]
    fn test_operator_aliases_parse() {
        let tree = parse_source(
            "program p; mulai x := a bagi b; y := tidak c dan d atau e selesai.",
        )
        .unwrap();
        let list = &tree.children[2].children[1];
        assert_eq!(list.children[0].label, "<assignment-statement>");
        assert_eq!(list.children[2].label, "<assignment-statement>");
    }

    #[test]
    fn test_array_type_and_subprograms() {
        let source = "program p;
            konstanta n = 10;
            tipe vektor = larik[1..n] dari integer;
            variabel a: larik[0..2] dari larik[1..3] dari real;
            prosedur cetak(x: integer; y, z: real);
            mulai writeln(x) selesai;
            fungsi dua: integer;
            mulai dua := 2 selesai;
            mulai a[1] := dua() selesai.";
        let tree = parse_source(source).unwrap();
        let decls = labels(&tree.children[1]);
        assert_eq!(
            decls,
            vec![
                "<const-declaration>",
                "<type-declaration>",
                "<var-declaration>",
                "<subprogram-declaration>",
                "<subprogram-declaration>"
            ]
        );
        let proc_decl = &tree.children[1].children[3].children[0];
        assert_eq!(proc_decl.children[2].label, "<formal-parameter-list>");
    }

    #[test]
    fn test_missing_semicolon_reports_expected_and_found() {
        let err = parse_source("program p mulai selesai.").unwrap_err();
        assert_matches!(
            err,
            SyntaxError::UnexpectedToken { ref expected, ref found, index: 2, .. }
                if expected == "SEMICOLON(;)" && found == "KEYWORD(mulai)"
        );
        assert_eq!(err.context(), Some("program -> program-header"));
    }

    #[test]
    fn test_missing_dot_is_end_of_input() {
        let err = parse_source("program p; mulai selesai").unwrap_err();
        assert_matches!(err, SyntaxError::UnexpectedEndOfInput { ref expected, index: 5, .. } if expected == "DOT(.)");
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = parse_source("program p; mulai selesai. x").unwrap_err();
        assert_matches!(err, SyntaxError::TrailingTokens { index: 6, .. });
    }

    #[test]
    fn test_equals_in_statement_position() {
        let err = parse_source("program p; mulai x = 1 selesai.").unwrap_err();
        assert_matches!(err, SyntaxError::GrammarViolation { ref message, .. } if message.contains(":="));
        assert_eq!(err.error_code().as_str(), "E043");
    }

    #[test]
    fn test_empty_stream() {
        let err = PascalParser::new(TokenStream::new(Vec::new())).parse().unwrap_err();
        assert_matches!(err, SyntaxError::EmptyTokenStream);
    }

    #[test]
    fn test_recursion_guard() {
        let depth = MAX_PARSE_DEPTH;
        let source = format!(
            "program p; mulai x := {}1{} selesai.",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let err = parse_source(&source).unwrap_err();
        assert_matches!(err, SyntaxError::MaxRecursionDepth { .. });
    }
}
