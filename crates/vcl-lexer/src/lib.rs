//! VCL Lexer - Tokenization using logos
//!
//! Every token carries both its byte span (for diagnostics) and its 1-based
//! line/column. Coverage marker identifiers are built from the latter, so the
//! column is counted in characters, not bytes.

mod token;

pub use token::*;

use logos::Logos;
use vcl_ast::Span;

/// Tokenize a source string into a vector of tokens
pub fn tokenize(source: &str) -> Vec<Token> {
    let index = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        let kind = match result {
            Ok(kind) => kind,
            Err(_) => TokenKind::Invalid,
        };
        let (line, column) = index.line_col(source, span.start);
        tokens.push(Token {
            kind,
            span,
            line,
            column,
        });
    }

    // Add EOF token
    let end = source.len();
    let (line, column) = index.line_col(source, end);
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(end, end),
        line,
        column,
    });

    tokens
}

/// A token with its span and line/column
#[derive(Debug, Clone, Copy)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }
}

/// Byte offsets of line starts, used to turn offsets into line/column pairs
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .char_indices()
                .filter(|(_, c)| *c == '\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    /// 1-based line and column of a byte offset
    pub fn line_col(&self, source: &str, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = self.line_starts[line];
        let column = source[start..offset].chars().count() + 1;
        (line + 1, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_basic_tokens() {
        let tokens = tokenize("set req.http.X = \"a\";");
        assert_eq!(tokens[0].kind, TokenKind::Set);
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(tokens[2].kind, TokenKind::Assign);
        assert_eq!(tokens[3].kind, TokenKind::String);
        assert_eq!(tokens[4].kind, TokenKind::Semicolon);
        assert_eq!(tokens[5].kind, TokenKind::Eof);
    }

    #[test]
    fn test_dotted_and_dashed_identifiers() {
        let source = "req.http.X-Forwarded-For std.strlen";
        let tokens = tokenize(source);
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].text(source), "req.http.X-Forwarded-For");
        assert_eq!(tokens[1].text(source), "std.strlen");
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        // `table.lookup` is a function name, not the `table` keyword
        assert_eq!(kinds("table.lookup"), vec![TokenKind::Ident, TokenKind::Eof]);
        assert_eq!(
            kinds("synthetic.base64 synthetic"),
            vec![TokenKind::SyntheticBase64, TokenKind::Synthetic, TokenKind::Eof]
        );
    }

    #[test]
    fn test_comparison_operators() {
        assert_eq!(
            kinds("== != ~ !~ <= >= && || !"),
            vec![
                TokenKind::EqEq,
                TokenKind::Ne,
                TokenKind::Tilde,
                TokenKind::NotTilde,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Bang,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "# hash\n// line\n/* block\n comment */ esi;";
        assert_eq!(
            kinds(source),
            vec![TokenKind::Esi, TokenKind::Semicolon, TokenKind::Eof]
        );
    }

    #[test]
    fn test_line_and_column() {
        let source = "sub vcl_recv {\n  esi;\n}";
        let tokens = tokenize(source);
        let esi = tokens.iter().find(|t| t.kind == TokenKind::Esi).unwrap();
        assert_eq!((esi.line, esi.column), (2, 3));
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
    }

    #[test]
    fn test_column_counts_characters() {
        let source = "\"é\" esi";
        let tokens = tokenize(source);
        assert_eq!(tokens[1].kind, TokenKind::Esi);
        assert_eq!(tokens[1].column, 5);
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(kinds("@"), vec![TokenKind::Invalid, TokenKind::Eof]);
    }
}
