//! XPIDL tokenizer.
//!
//! Comments and `%{ ... %}` verbatim blocks are skipped; everything else is
//! turned into [`Token`]s carrying their byte span so the parser can report
//! positions and slice raw text (native declarations, `uuid(...)`).

use crate::error::ParseError;
use logos::Logos;
use std::fmt;
use std::ops::Range;

/// XPIDL token.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"([ \t\r\n\f]+|//[^\n]*|/\*([^*]|\*+[^*/])*\*+/|%\{([^%]|%+[^%}])*%+\})")]
pub enum Token<'s> {
    #[token("#include")]
    Include,
    #[token("interface")]
    Interface,
    #[token("dictionary")]
    Dictionary,
    #[token("typedef")]
    Typedef,
    #[token("native")]
    Native,
    #[token("attribute")]
    Attribute,
    #[token("readonly")]
    Readonly,
    #[token("const")]
    Const,
    #[token("raises")]
    Raises,

    #[regex("[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice())]
    Ident(&'s str),
    #[regex(r#""[^"\n]*""#, |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    Str(&'s str),
    #[regex(r"0[xX][0-9a-fA-F]+|[0-9]+(\.[0-9]+([eE][+-]?[0-9]+)?)?", |lex| lex.slice())]
    Number(&'s str),

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semi,
    #[token("::")]
    ColonColon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
    #[token("?")]
    Question,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("*")]
    Star,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token(".")]
    Dot,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include => f.write_str("'#include'"),
            Self::Interface => f.write_str("'interface'"),
            Self::Dictionary => f.write_str("'dictionary'"),
            Self::Typedef => f.write_str("'typedef'"),
            Self::Native => f.write_str("'native'"),
            Self::Attribute => f.write_str("'attribute'"),
            Self::Readonly => f.write_str("'readonly'"),
            Self::Const => f.write_str("'const'"),
            Self::Raises => f.write_str("'raises'"),
            Self::Ident(s) => write!(f, "identifier '{s}'"),
            Self::Str(s) => write!(f, "string \"{s}\""),
            Self::Number(s) => write!(f, "number {s}"),
            Self::LBrace => f.write_str("'{'"),
            Self::RBrace => f.write_str("'}'"),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
            Self::LBracket => f.write_str("'['"),
            Self::RBracket => f.write_str("']'"),
            Self::Semi => f.write_str("';'"),
            Self::ColonColon => f.write_str("'::'"),
            Self::Colon => f.write_str("':'"),
            Self::Comma => f.write_str("','"),
            Self::Eq => f.write_str("'='"),
            Self::Question => f.write_str("'?'"),
            Self::Shl => f.write_str("'<<'"),
            Self::Shr => f.write_str("'>>'"),
            Self::Lt => f.write_str("'<'"),
            Self::Gt => f.write_str("'>'"),
            Self::Star => f.write_str("'*'"),
            Self::Amp => f.write_str("'&'"),
            Self::Pipe => f.write_str("'|'"),
            Self::Plus => f.write_str("'+'"),
            Self::Minus => f.write_str("'-'"),
            Self::Dot => f.write_str("'.'"),
        }
    }
}

/// A token with its byte range in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<'s> {
    /// The token.
    pub token: Token<'s>,
    /// Byte range in the source text.
    pub span: Range<usize>,
}

/// Tokenizes XPIDL source.
///
/// # Arguments
/// * `source` - File contents
/// * `file` - File name used in error messages
///
/// # Errors
/// Returns `ParseError::InvalidToken` at the first unrecognized input.
pub fn tokenize<'s>(source: &'s str, file: &str) -> Result<Vec<Spanned<'s>>, ParseError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => tokens.push(Spanned { token, span }),
            Err(()) => {
                let (line, column) = line_column(source, span.start);
                return Err(ParseError::InvalidToken {
                    file: file.to_string(),
                    line,
                    column,
                    text: lexer.slice().to_string(),
                });
            }
        }
    }

    Ok(tokens)
}

/// Converts a byte offset into a 1-based line and column.
#[must_use]
pub fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(newline) => before[newline + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}
