//! Parser error types

use vcl_ast::Span;
use vcl_lexer::TokenKind;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("unexpected end of file")]
    UnexpectedEof { span: Span },

    #[error("invalid character")]
    InvalidCharacter { span: Span },

    #[error("invalid expression")]
    InvalidExpression { span: Span },

    #[error("invalid number literal: {text}")]
    InvalidNumber { text: String, span: Span },

    #[error("unknown type: {name}")]
    UnknownType { name: String, span: Span },

    #[error("expected declaration")]
    ExpectedDeclaration { span: Span },

    #[error("expected statement")]
    ExpectedStatement { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::UnexpectedEof { span } => *span,
            ParseError::InvalidCharacter { span } => *span,
            ParseError::InvalidExpression { span } => *span,
            ParseError::InvalidNumber { span, .. } => *span,
            ParseError::UnknownType { span, .. } => *span,
            ParseError::ExpectedDeclaration { span } => *span,
            ParseError::ExpectedStatement { span } => *span,
        }
    }

    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        match found {
            TokenKind::Eof => ParseError::UnexpectedEof { span },
            TokenKind::Invalid => ParseError::InvalidCharacter { span },
            _ => ParseError::UnexpectedToken {
                expected: expected.into(),
                found: found.describe().to_string(),
                span,
            },
        }
    }
}
