//! Token definitions for VCL

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]  // Skip whitespace
#[logos(skip r"#[^\n]*")]       // Skip hash comments
#[logos(skip r"//[^\n]*")]      // Skip line comments
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")] // Skip block comments
pub enum TokenKind {
    // === Declarations ===
    #[token("sub")]
    Sub,
    #[token("backend")]
    Backend,
    #[token("table")]
    Table,
    #[token("import")]
    Import,

    // === Control flow ===
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("elseif")]
    Elseif,
    #[token("elsif")]
    Elsif,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("break")]
    Break,
    #[token("fallthrough")]
    Fallthrough,
    #[token("goto")]
    Goto,
    #[token("call")]
    Call,
    #[token("return")]
    Return,
    #[token("restart")]
    Restart,
    #[token("error")]
    Error,

    // === Statements ===
    #[token("set")]
    Set,
    #[token("add")]
    Add,
    #[token("unset")]
    Unset,
    #[token("remove")]
    Remove,
    #[token("declare")]
    Declare,
    #[token("log")]
    Log,
    #[token("synthetic")]
    Synthetic,
    #[token("synthetic.base64")]
    SyntheticBase64,
    #[token("esi")]
    Esi,

    // Literals
    #[token("true")]
    True,
    #[token("false")]
    False,

    // === Operators ===
    #[token("=")]
    Assign,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("==")]
    EqEq,
    #[token("!=")]
    Ne,
    #[token("~")]
    Tilde,
    #[token("!~")]
    NotTilde,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("%")]
    Percent,

    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // === Punctuation ===
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,

    // === Literals ===
    #[regex(r"[0-9]+", priority = 2)]
    Int,

    #[regex(r"[0-9]+\.[0-9]+")]
    Float,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    // === Identifiers ===
    // Dotted and dashed names are single identifiers: `req.http.X-Forwarded-For`
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_.\-]*")]
    Ident,

    // === Special ===
    Invalid,
    Eof,
}

impl TokenKind {
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Sub
                | TokenKind::Backend
                | TokenKind::Table
                | TokenKind::Import
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::Elseif
                | TokenKind::Elsif
                | TokenKind::Switch
                | TokenKind::Case
                | TokenKind::Default
                | TokenKind::Break
                | TokenKind::Fallthrough
                | TokenKind::Goto
                | TokenKind::Call
                | TokenKind::Return
                | TokenKind::Restart
                | TokenKind::Error
                | TokenKind::Set
                | TokenKind::Add
                | TokenKind::Unset
                | TokenKind::Remove
                | TokenKind::Declare
                | TokenKind::Log
                | TokenKind::Synthetic
                | TokenKind::SyntheticBase64
                | TokenKind::Esi
                | TokenKind::True
                | TokenKind::False
        )
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Sub => "'sub'",
            TokenKind::Backend => "'backend'",
            TokenKind::Table => "'table'",
            TokenKind::Import => "'import'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::Elseif => "'elseif'",
            TokenKind::Elsif => "'elsif'",
            TokenKind::Switch => "'switch'",
            TokenKind::Case => "'case'",
            TokenKind::Default => "'default'",
            TokenKind::Break => "'break'",
            TokenKind::Fallthrough => "'fallthrough'",
            TokenKind::Goto => "'goto'",
            TokenKind::Call => "'call'",
            TokenKind::Return => "'return'",
            TokenKind::Restart => "'restart'",
            TokenKind::Error => "'error'",
            TokenKind::Set => "'set'",
            TokenKind::Add => "'add'",
            TokenKind::Unset => "'unset'",
            TokenKind::Remove => "'remove'",
            TokenKind::Declare => "'declare'",
            TokenKind::Log => "'log'",
            TokenKind::Synthetic => "'synthetic'",
            TokenKind::SyntheticBase64 => "'synthetic.base64'",
            TokenKind::Esi => "'esi'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Assign => "'='",
            TokenKind::PlusAssign => "'+='",
            TokenKind::MinusAssign => "'-='",
            TokenKind::EqEq => "'=='",
            TokenKind::Ne => "'!='",
            TokenKind::Tilde => "'~'",
            TokenKind::NotTilde => "'!~'",
            TokenKind::Lt => "'<'",
            TokenKind::Le => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::Ge => "'>='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Percent => "'%'",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Dot => "'.'",
            TokenKind::Int => "integer",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::Ident => "identifier",
            TokenKind::Invalid => "invalid character",
            TokenKind::Eof => "end of file",
        }
    }
}
