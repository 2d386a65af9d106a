//! Recursive descent parser implementation

use vcl_ast::*;
use vcl_lexer::{Token, TokenKind};

use crate::ParseError;

/// Binding power of infix and prefix operators, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Or,
    And,
    Compare,
    Sum,
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    file: Option<String>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            file: None,
        }
    }

    /// Attach a file name to every position produced by this parser
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    // === Utilities ===

    fn current(&self) -> Token {
        match self.tokens.get(self.pos).or_else(|| self.tokens.last()) {
            Some(token) => *token,
            None => Token {
                kind: TokenKind::Eof,
                span: Span::dummy(),
                line: 1,
                column: 1,
            },
        }
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn peek_ahead(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek())
    }

    fn consume(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(
                kind.describe(),
                self.peek(),
                self.current().span,
            ))
        }
    }

    fn text(&self, token: &Token) -> &'a str {
        token.text(self.source)
    }

    fn span(&self) -> Span {
        self.current().span
    }

    fn meta_of(&self, token: &Token) -> Meta {
        let position = Position::new(token.line, token.column);
        match &self.file {
            Some(file) => Meta::at(position.with_file(file.clone())),
            None => Meta::at(position),
        }
    }

    fn meta(&self) -> Meta {
        self.meta_of(&self.current())
    }

    fn consume_ident(&mut self) -> Result<String, ParseError> {
        let token = self.consume(TokenKind::Ident)?;
        Ok(self.text(&token).to_string())
    }

    fn consume_string(&mut self) -> Result<String, ParseError> {
        let token = self.consume(TokenKind::String)?;
        Ok(unquote(self.text(&token)))
    }

    // === Program ===

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut declarations = Vec::new();

        while !self.at(TokenKind::Eof) {
            declarations.push(self.parse_declaration()?);
        }

        Ok(Program { declarations })
    }

    // === Declarations ===

    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let meta = self.meta();

        let kind = match self.peek() {
            TokenKind::Sub => DeclarationKind::Subroutine(self.parse_subroutine_decl()?),
            TokenKind::Backend => DeclarationKind::Backend(self.parse_backend_decl()?),
            TokenKind::Table => DeclarationKind::Table(self.parse_table_decl()?),
            TokenKind::Import => {
                self.advance();
                let name = self.consume_ident()?;
                self.consume(TokenKind::Semicolon)?;
                DeclarationKind::Import(name)
            }
            TokenKind::Invalid => {
                return Err(ParseError::InvalidCharacter { span: self.span() });
            }
            _ => {
                return Err(ParseError::ExpectedDeclaration { span: self.span() });
            }
        };

        Ok(Declaration { kind, meta })
    }

    fn parse_subroutine_decl(&mut self) -> Result<SubroutineDecl, ParseError> {
        self.consume(TokenKind::Sub)?;
        let name = self.consume_ident()?;
        let body = self.parse_block()?;
        Ok(SubroutineDecl { name, body })
    }

    fn parse_backend_decl(&mut self) -> Result<BackendDecl, ParseError> {
        self.consume(TokenKind::Backend)?;
        let name = self.consume_ident()?;
        self.consume(TokenKind::LBrace)?;

        let mut properties = Vec::new();
        while self.at(TokenKind::Dot) {
            let meta = self.meta();
            self.advance();
            let prop_name = self.consume_ident()?;
            self.consume(TokenKind::Assign)?;
            let value = self.parse_expression(Precedence::Lowest)?;
            self.consume(TokenKind::Semicolon)?;
            properties.push(BackendProperty {
                name: prop_name,
                value,
                meta,
            });
        }

        self.consume(TokenKind::RBrace)?;
        Ok(BackendDecl { name, properties })
    }

    fn parse_table_decl(&mut self) -> Result<TableDecl, ParseError> {
        self.consume(TokenKind::Table)?;
        let name = self.consume_ident()?;

        let value_type = if self.at(TokenKind::Ident) {
            let span = self.span();
            let word = self.consume_ident()?;
            match ValueTypeName::from_keyword(&word) {
                Some(ty) => Some(ty),
                None => return Err(ParseError::UnknownType { name: word, span }),
            }
        } else {
            None
        };

        self.consume(TokenKind::LBrace)?;
        let mut entries = Vec::new();
        while self.at(TokenKind::String) {
            let meta = self.meta();
            let key = self.consume_string()?;
            self.consume(TokenKind::Colon)?;
            let value = self.parse_expression(Precedence::Lowest)?;
            entries.push(TableEntry { key, value, meta });
            if !self.at(TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        self.consume(TokenKind::RBrace)?;

        Ok(TableDecl {
            name,
            value_type,
            entries,
        })
    }

    // === Statements ===

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let meta = self.meta();
        self.consume(TokenKind::LBrace)?;

        let mut statements = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }

        self.consume(TokenKind::RBrace)?;
        Ok(Block { statements, meta })
    }

    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let meta = self.meta();

        let kind = match self.peek() {
            TokenKind::LBrace => StatementKind::Block(self.parse_block()?),
            TokenKind::If => StatementKind::If(self.parse_if_statement()?),
            TokenKind::Switch => StatementKind::Switch(self.parse_switch_statement()?),
            TokenKind::Set => {
                self.advance();
                let target = self.consume_ident()?;
                let op = match self.peek() {
                    TokenKind::Assign => AssignOp::Assign,
                    TokenKind::PlusAssign => AssignOp::AddAssign,
                    TokenKind::MinusAssign => AssignOp::SubAssign,
                    other => {
                        return Err(ParseError::unexpected(
                            "assignment operator",
                            other,
                            self.span(),
                        ))
                    }
                };
                self.advance();
                let value = self.parse_expression(Precedence::Lowest)?;
                self.consume(TokenKind::Semicolon)?;
                StatementKind::Set { target, op, value }
            }
            TokenKind::Add => {
                self.advance();
                let target = self.consume_ident()?;
                self.consume(TokenKind::Assign)?;
                let value = self.parse_expression(Precedence::Lowest)?;
                self.consume(TokenKind::Semicolon)?;
                StatementKind::Add { target, value }
            }
            TokenKind::Unset => {
                self.advance();
                let name = self.consume_ident()?;
                self.consume(TokenKind::Semicolon)?;
                StatementKind::Unset(name)
            }
            TokenKind::Remove => {
                self.advance();
                let name = self.consume_ident()?;
                self.consume(TokenKind::Semicolon)?;
                StatementKind::Remove(name)
            }
            TokenKind::Declare => self.parse_declare_statement()?,
            TokenKind::Log => {
                self.advance();
                StatementKind::Log(self.parse_terminated_expression()?)
            }
            TokenKind::Synthetic => {
                self.advance();
                StatementKind::Synthetic(self.parse_terminated_expression()?)
            }
            TokenKind::SyntheticBase64 => {
                self.advance();
                StatementKind::SyntheticBase64(self.parse_terminated_expression()?)
            }
            TokenKind::Error => self.parse_error_statement()?,
            TokenKind::Return => self.parse_return_statement()?,
            TokenKind::Restart => self.parse_bare_keyword(StatementKind::Restart)?,
            TokenKind::Esi => self.parse_bare_keyword(StatementKind::Esi)?,
            TokenKind::Break => self.parse_bare_keyword(StatementKind::Break)?,
            TokenKind::Fallthrough => self.parse_bare_keyword(StatementKind::Fallthrough)?,
            TokenKind::Call => {
                self.advance();
                let name = self.consume_ident()?;
                self.consume(TokenKind::Semicolon)?;
                StatementKind::Call(name)
            }
            TokenKind::Goto => {
                self.advance();
                let label = self.consume_ident()?;
                self.consume(TokenKind::Semicolon)?;
                StatementKind::Goto(label)
            }
            TokenKind::Ident if self.peek_ahead(1) == TokenKind::Colon => {
                let label = self.consume_ident()?;
                self.consume(TokenKind::Colon)?;
                StatementKind::GotoDestination(label)
            }
            TokenKind::Ident if self.peek_ahead(1) == TokenKind::LParen => {
                let call = self.parse_function_call()?;
                self.consume(TokenKind::Semicolon)?;
                StatementKind::FunctionCall(call)
            }
            TokenKind::Eof => return Err(ParseError::UnexpectedEof { span: self.span() }),
            TokenKind::Invalid => {
                return Err(ParseError::InvalidCharacter { span: self.span() })
            }
            _ => return Err(ParseError::ExpectedStatement { span: self.span() }),
        };

        Ok(Statement { kind, meta })
    }

    fn parse_bare_keyword(&mut self, kind: StatementKind) -> Result<StatementKind, ParseError> {
        self.advance();
        self.consume(TokenKind::Semicolon)?;
        Ok(kind)
    }

    fn parse_terminated_expression(&mut self) -> Result<Expr, ParseError> {
        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume(TokenKind::Semicolon)?;
        Ok(value)
    }

    fn parse_declare_statement(&mut self) -> Result<StatementKind, ParseError> {
        self.consume(TokenKind::Declare)?;

        let span = self.span();
        let scope = self.consume_ident()?;
        if scope != "local" {
            return Err(ParseError::UnexpectedToken {
                expected: "'local'".into(),
                found: scope,
                span,
            });
        }

        let name = self.consume_ident()?;
        let span = self.span();
        let type_name = self.consume_ident()?;
        let ty = ValueTypeName::from_keyword(&type_name).ok_or(ParseError::UnknownType {
            name: type_name,
            span,
        })?;
        self.consume(TokenKind::Semicolon)?;

        Ok(StatementKind::Declare { name, ty })
    }

    fn parse_error_statement(&mut self) -> Result<StatementKind, ParseError> {
        self.consume(TokenKind::Error)?;

        let code = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression(Precedence::Lowest)?)
        };
        let argument = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression(Precedence::Lowest)?)
        };
        self.consume(TokenKind::Semicolon)?;

        Ok(StatementKind::Error { code, argument })
    }

    fn parse_return_statement(&mut self) -> Result<StatementKind, ParseError> {
        self.consume(TokenKind::Return)?;

        if self.at(TokenKind::Semicolon) {
            self.advance();
            return Ok(StatementKind::Return(None));
        }

        // State names may collide with keywords: `return(restart);`, `return(error);`
        let value = if self.at(TokenKind::LParen)
            && self.peek_ahead(1).is_keyword()
            && self.peek_ahead(2) == TokenKind::RParen
        {
            let meta = self.meta();
            self.advance();
            let state = self.advance();
            let inner = Expr::new(
                ExprKind::Ident(self.text(&state).to_string()),
                self.meta_of(&state),
            );
            self.consume(TokenKind::RParen)?;
            Expr::new(ExprKind::Grouped(Box::new(inner)), meta)
        } else {
            self.parse_expression(Precedence::Lowest)?
        };
        self.consume(TokenKind::Semicolon)?;

        Ok(StatementKind::Return(Some(value)))
    }

    fn parse_if_statement(&mut self) -> Result<IfStatement, ParseError> {
        self.consume(TokenKind::If)?;
        let condition = self.parse_condition()?;
        let consequence = self.parse_block()?;

        let mut another = Vec::new();
        let mut alternative = None;

        loop {
            let meta = self.meta();
            let keyword = match (self.peek(), self.peek_ahead(1)) {
                (TokenKind::Else, TokenKind::If) => {
                    self.advance();
                    self.advance();
                    IfKeyword::ElseIf
                }
                (TokenKind::Elseif, _) => {
                    self.advance();
                    IfKeyword::Elseif
                }
                (TokenKind::Elsif, _) => {
                    self.advance();
                    IfKeyword::Elsif
                }
                (TokenKind::Else, _) => {
                    self.advance();
                    let consequence = self.parse_block()?;
                    alternative = Some(ElseClause { consequence, meta });
                    break;
                }
                _ => break,
            };

            let condition = self.parse_condition()?;
            let consequence = self.parse_block()?;
            another.push(ElseIfClause {
                keyword,
                condition,
                consequence,
                meta,
            });
        }

        Ok(IfStatement {
            keyword: IfKeyword::If,
            condition,
            consequence,
            another,
            alternative,
        })
    }

    /// `( expression )` of an if clause; the parentheses are not kept
    fn parse_condition(&mut self) -> Result<Expr, ParseError> {
        self.consume(TokenKind::LParen)?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.consume(TokenKind::RParen)?;
        Ok(condition)
    }

    fn parse_switch_statement(&mut self) -> Result<SwitchStatement, ParseError> {
        self.consume(TokenKind::Switch)?;
        let control = self.parse_condition()?;
        self.consume(TokenKind::LBrace)?;

        let mut cases = Vec::new();
        while self.at_any(&[TokenKind::Case, TokenKind::Default]) {
            let meta = self.meta();
            let test = if self.at(TokenKind::Default) {
                self.advance();
                None
            } else {
                self.advance();
                if self.at(TokenKind::Tilde) {
                    self.advance();
                    Some(CaseTest::Regex(self.consume_string()?))
                } else {
                    Some(CaseTest::Exact(self.consume_string()?))
                }
            };
            self.consume(TokenKind::Colon)?;

            let mut statements = Vec::new();
            while !self.at_any(&[
                TokenKind::Case,
                TokenKind::Default,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]) {
                statements.push(self.parse_statement()?);
            }

            cases.push(CaseClause {
                test,
                statements,
                meta,
            });
        }

        self.consume(TokenKind::RBrace)?;
        Ok(SwitchStatement { control, cases })
    }

    // === Expressions ===

    pub fn parse_expression_root(&mut self) -> Result<Expr, ParseError> {
        self.parse_expression(Precedence::Lowest)
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some((op, op_precedence)) = infix_operator(self.peek()) {
            if op_precedence <= precedence {
                break;
            }
            self.advance();
            let right = self.parse_expression(op_precedence)?;
            let meta = left.meta.clone();
            left = Expr::new(
                ExprKind::Infix {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                meta,
            );
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let meta = self.meta();
        let op = match self.peek() {
            TokenKind::Bang => PrefixOp::Not,
            TokenKind::Minus => PrefixOp::Minus,
            _ => return self.parse_postfix(),
        };
        self.advance();
        let right = self.parse_unary()?;
        Ok(Expr::new(
            ExprKind::Prefix {
                op,
                right: Box::new(right),
            },
            meta,
        ))
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        while self.at(TokenKind::Percent) {
            self.advance();
            let meta = expr.meta.clone();
            expr = Expr::new(
                ExprKind::Postfix {
                    op: PostfixOp::Percent,
                    left: Box::new(expr),
                },
                meta,
            );
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current();
        let meta = self.meta_of(&token);

        let kind = match token.kind {
            TokenKind::String => ExprKind::String(self.consume_string()?),
            TokenKind::Int => {
                self.advance();
                let text = self.text(&token);
                let value = text.parse::<i64>().map_err(|_| ParseError::InvalidNumber {
                    text: text.to_string(),
                    span: token.span,
                })?;
                ExprKind::Integer(value)
            }
            TokenKind::Float => {
                self.advance();
                let text = self.text(&token);
                let value = text.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                    text: text.to_string(),
                    span: token.span,
                })?;
                ExprKind::Float(value)
            }
            TokenKind::True => {
                self.advance();
                ExprKind::Bool(true)
            }
            TokenKind::False => {
                self.advance();
                ExprKind::Bool(false)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression(Precedence::Lowest)?;
                self.consume(TokenKind::RParen)?;
                ExprKind::Grouped(Box::new(inner))
            }
            TokenKind::If => {
                self.advance();
                self.consume(TokenKind::LParen)?;
                let condition = self.parse_expression(Precedence::Lowest)?;
                self.consume(TokenKind::Comma)?;
                let consequence = self.parse_expression(Precedence::Lowest)?;
                self.consume(TokenKind::Comma)?;
                let alternative = self.parse_expression(Precedence::Lowest)?;
                self.consume(TokenKind::RParen)?;
                ExprKind::If {
                    condition: Box::new(condition),
                    consequence: Box::new(consequence),
                    alternative: Box::new(alternative),
                }
            }
            TokenKind::Ident if self.peek_ahead(1) == TokenKind::LParen => {
                ExprKind::Call(self.parse_function_call()?)
            }
            TokenKind::Ident => {
                self.advance();
                ExprKind::Ident(self.text(&token).to_string())
            }
            TokenKind::Eof => return Err(ParseError::UnexpectedEof { span: token.span }),
            TokenKind::Invalid => return Err(ParseError::InvalidCharacter { span: token.span }),
            _ => return Err(ParseError::InvalidExpression { span: token.span }),
        };

        Ok(Expr::new(kind, meta))
    }

    fn parse_function_call(&mut self) -> Result<FunctionCall, ParseError> {
        let name = self.consume_ident()?;
        self.consume(TokenKind::LParen)?;

        let mut arguments = Vec::new();
        while !self.at(TokenKind::RParen) {
            arguments.push(self.parse_expression(Precedence::Lowest)?);
            if !self.at(TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        self.consume(TokenKind::RParen)?;

        Ok(FunctionCall { name, arguments })
    }
}

fn infix_operator(kind: TokenKind) -> Option<(InfixOp, Precedence)> {
    let op = match kind {
        TokenKind::OrOr => (InfixOp::Or, Precedence::Or),
        TokenKind::AndAnd => (InfixOp::And, Precedence::And),
        TokenKind::EqEq => (InfixOp::Eq, Precedence::Compare),
        TokenKind::Ne => (InfixOp::Ne, Precedence::Compare),
        TokenKind::Tilde => (InfixOp::Match, Precedence::Compare),
        TokenKind::NotTilde => (InfixOp::NotMatch, Precedence::Compare),
        TokenKind::Lt => (InfixOp::Lt, Precedence::Compare),
        TokenKind::Le => (InfixOp::Le, Precedence::Compare),
        TokenKind::Gt => (InfixOp::Gt, Precedence::Compare),
        TokenKind::Ge => (InfixOp::Ge, Precedence::Compare),
        TokenKind::Plus => (InfixOp::Plus, Precedence::Sum),
        TokenKind::Minus => (InfixOp::Minus, Precedence::Sum),
        _ => return None,
    };
    Some(op)
}

/// Strip the surrounding quotes of a string token and resolve escapes
fn unquote(text: &str) -> String {
    let inner = &text[1..text.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }
    result
}
