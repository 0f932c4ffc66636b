//! XPIDL parser.
//!
//! A recursive-descent reader over the token stream from [`crate::lexer`]
//! producing the declarations in [`crate::types`]. Only the subset of XPIDL
//! used by event interfaces is understood.

use crate::error::ParseError;
use crate::lexer::{Spanned, Token, line_column, tokenize};
use crate::types::{
    AttributeDecl, BinaryOp, ConstDecl, ConstExpr, DefaultValue, DictionaryDecl, IdlAttr,
    IdlFile, InterfaceDecl, MemberDecl, MethodDecl, NativeDecl, ParamDecl, ParamDirection,
    ProductionDecl, TypedefDecl,
};

/// Parses an XPIDL file from a string.
///
/// # Arguments
/// * `source` - File contents
/// * `file` - File name, recorded in the result and used in error messages
///
/// # Returns
/// Parsed file or parse error.
///
/// # Errors
/// Returns `ParseError` if the input cannot be tokenized or does not match
/// the grammar.
pub fn parse_idl(source: &str, file: &str) -> Result<IdlFile, ParseError> {
    let tokens = tokenize(source, file)?;
    let mut parser = Parser {
        source,
        file,
        tokens,
        pos: 0,
    };
    parser.parse_file()
}

struct Parser<'s> {
    source: &'s str,
    file: &'s str,
    tokens: Vec<Spanned<'s>>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn parse_file(&mut self) -> Result<IdlFile, ParseError> {
        let mut idl = IdlFile::new(self.file);

        while let Some(token) = self.peek() {
            let production = match token {
                Token::Include => {
                    self.advance();
                    ProductionDecl::Include(self.expect_str("include file name")?)
                }
                Token::LBracket => {
                    let attrs = self.parse_attrs()?;
                    match self.peek() {
                        Some(Token::Interface) => self.parse_interface(attrs)?,
                        Some(Token::Native) => self.parse_native(attrs)?,
                        _ => return Err(self.unexpected("'interface' or 'native'")),
                    }
                }
                Token::Interface => self.parse_interface(Vec::new())?,
                Token::Native => self.parse_native(Vec::new())?,
                Token::Typedef => self.parse_typedef()?,
                Token::Dictionary => self.parse_dictionary()?,
                _ => return Err(self.unexpected("declaration")),
            };
            idl.productions.push(production);
        }

        Ok(idl)
    }

    /// Parses `[name, name(value), ...]`.
    fn parse_attrs(&mut self) -> Result<Vec<IdlAttr>, ParseError> {
        self.expect(Token::LBracket)?;
        let mut attrs = Vec::new();

        loop {
            let name = self.expect_word("annotation")?;
            let value = if self.check(Token::LParen) {
                Some(self.raw_parenthesized()?)
            } else {
                None
            };
            attrs.push(IdlAttr { name, value });

            if self.eat(Token::Comma) {
                continue;
            }
            self.expect(Token::RBracket)?;
            break;
        }

        Ok(attrs)
    }

    /// Consumes `( ... )` and returns the source text between the parentheses.
    fn raw_parenthesized(&mut self) -> Result<String, ParseError> {
        let open = self.expect_spanned(Token::LParen)?;
        let mut depth = 1usize;

        loop {
            let Some(spanned) = self.tokens.get(self.pos).cloned() else {
                return Err(self.eof("')'"));
            };
            self.pos += 1;
            match spanned.token {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(self.source[open.end..spanned.span.start].trim().to_string());
                    }
                }
                _ => {}
            }
        }
    }

    fn parse_interface(&mut self, attrs: Vec<IdlAttr>) -> Result<ProductionDecl, ParseError> {
        self.expect(Token::Interface)?;
        let name = self.expect_ident("interface name")?;

        if self.eat(Token::Semi) {
            return Ok(ProductionDecl::Forward(name));
        }

        let base = if self.eat(Token::Colon) {
            Some(self.expect_ident("base interface name")?)
        } else {
            None
        };

        self.expect(Token::LBrace)?;
        let mut members = Vec::new();
        while !self.eat(Token::RBrace) {
            members.push(self.parse_member()?);
        }
        self.expect(Token::Semi)?;

        Ok(ProductionDecl::Interface(InterfaceDecl {
            name,
            base,
            attrs,
            members,
        }))
    }

    fn parse_member(&mut self) -> Result<MemberDecl, ParseError> {
        if self.eat(Token::Const) {
            let type_name = self.parse_type()?;
            let name = self.expect_word("constant name")?;
            self.expect(Token::Eq)?;
            let value = self.parse_const_expr()?;
            self.expect(Token::Semi)?;
            return Ok(MemberDecl::Const(ConstDecl {
                name,
                type_name,
                value,
            }));
        }

        let attrs = if self.check(Token::LBracket) {
            self.parse_attrs()?
        } else {
            Vec::new()
        };

        let readonly = self.eat(Token::Readonly);
        if readonly || self.check(Token::Attribute) {
            self.expect(Token::Attribute)?;
            let type_name = self.parse_type()?;
            let nullable = self.eat(Token::Question);
            let name = self.expect_word("attribute name")?;
            self.expect(Token::Semi)?;
            return Ok(MemberDecl::Attribute(AttributeDecl {
                name,
                type_name,
                readonly,
                nullable,
                default: None,
                attrs,
            }));
        }

        let return_type = self.parse_type()?;
        let name = self.expect_word("method name")?;
        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        if !self.eat(Token::RParen) {
            loop {
                params.push(self.parse_param()?);
                if self.eat(Token::Comma) {
                    continue;
                }
                self.expect(Token::RParen)?;
                break;
            }
        }

        let mut raises = Vec::new();
        if self.eat(Token::Raises) {
            self.expect(Token::LParen)?;
            loop {
                raises.push(self.expect_ident("exception name")?);
                if !self.eat(Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RParen)?;
        }
        self.expect(Token::Semi)?;

        Ok(MemberDecl::Method(MethodDecl {
            name,
            return_type,
            params,
            attrs,
            raises,
        }))
    }

    fn parse_param(&mut self) -> Result<ParamDecl, ParseError> {
        let attrs = if self.check(Token::LBracket) {
            self.parse_attrs()?
        } else {
            Vec::new()
        };

        let direction = match self.peek() {
            Some(Token::Ident("in")) => ParamDirection::In,
            Some(Token::Ident("out")) => ParamDirection::Out,
            Some(Token::Ident("inout")) => ParamDirection::InOut,
            _ => return Err(self.unexpected("'in', 'out' or 'inout'")),
        };
        self.advance();

        let type_name = self.parse_type()?;
        let name = self.expect_word("parameter name")?;

        Ok(ParamDecl {
            name,
            type_name,
            direction,
            attrs,
        })
    }

    fn parse_dictionary(&mut self) -> Result<ProductionDecl, ParseError> {
        self.expect(Token::Dictionary)?;
        let name = self.expect_ident("dictionary name")?;
        let base = if self.eat(Token::Colon) {
            Some(self.expect_ident("base dictionary name")?)
        } else {
            None
        };

        self.expect(Token::LBrace)?;
        let mut members = Vec::new();
        while !self.eat(Token::RBrace) {
            let attrs = if self.check(Token::LBracket) {
                self.parse_attrs()?
            } else {
                Vec::new()
            };
            let type_name = self.parse_type()?;
            let nullable = self.eat(Token::Question);
            let member_name = self.expect_word("dictionary member name")?;
            let default = if self.eat(Token::Eq) {
                Some(self.parse_default()?)
            } else {
                None
            };
            self.expect(Token::Semi)?;
            members.push(AttributeDecl {
                name: member_name,
                type_name,
                readonly: false,
                nullable,
                default,
                attrs,
            });
        }
        self.expect(Token::Semi)?;

        Ok(ProductionDecl::Dictionary(DictionaryDecl {
            name,
            base,
            members,
        }))
    }

    fn parse_default(&mut self) -> Result<DefaultValue, ParseError> {
        let negative = self.eat(Token::Minus);
        let value = match self.peek() {
            Some(Token::Str(s)) if !negative => DefaultValue::Str(s.to_string()),
            Some(Token::Number(n)) | Some(Token::Ident(n)) => {
                let text = if negative {
                    format!("-{n}")
                } else {
                    n.to_string()
                };
                DefaultValue::Literal(text)
            }
            _ => return Err(self.unexpected("default value")),
        };
        self.advance();
        Ok(value)
    }

    fn parse_typedef(&mut self) -> Result<ProductionDecl, ParseError> {
        self.expect(Token::Typedef)?;
        let target = self.parse_type()?;
        let name = self.expect_ident("typedef name")?;
        self.expect(Token::Semi)?;
        Ok(ProductionDecl::Typedef(TypedefDecl { name, target }))
    }

    fn parse_native(&mut self, attrs: Vec<IdlAttr>) -> Result<ProductionDecl, ParseError> {
        self.expect(Token::Native)?;
        let name = self.expect_ident("native name")?;
        let native = self.raw_parenthesized()?;
        self.expect(Token::Semi)?;
        Ok(ProductionDecl::Native(NativeDecl {
            name,
            native,
            attrs,
        }))
    }

    /// Parses a type token, joining the multi-word integer builtins.
    fn parse_type(&mut self) -> Result<String, ParseError> {
        let first = self.expect_ident("type name")?;
        let type_name = match first.as_str() {
            "unsigned" => {
                let second = self.expect_ident("'short' or 'long'")?;
                if second == "long" && self.eat_ident("long") {
                    "unsigned long long".to_string()
                } else {
                    format!("unsigned {second}")
                }
            }
            "long" if self.eat_ident("long") => "long long".to_string(),
            _ => first,
        };
        Ok(type_name)
    }

    fn parse_const_expr(&mut self) -> Result<ConstExpr, ParseError> {
        self.parse_binary(0)
    }

    /// Precedence climbing, loosest level first.
    fn parse_binary(&mut self, level: usize) -> Result<ConstExpr, ParseError> {
        const LEVELS: &[&[(Token<'static>, BinaryOp)]] = &[
            &[(Token::Pipe, BinaryOp::Or)],
            &[(Token::Amp, BinaryOp::And)],
            &[(Token::Shl, BinaryOp::Shl), (Token::Shr, BinaryOp::Shr)],
            &[(Token::Plus, BinaryOp::Add), (Token::Minus, BinaryOp::Sub)],
            &[(Token::Star, BinaryOp::Mul)],
        ];

        if level == LEVELS.len() {
            return self.parse_unary();
        }

        let mut lhs = self.parse_binary(level + 1)?;
        'outer: loop {
            for (token, op) in LEVELS[level] {
                if self.eat(*token) {
                    let rhs = self.parse_binary(level + 1)?;
                    lhs = ConstExpr::Binary(Box::new(lhs), *op, Box::new(rhs));
                    continue 'outer;
                }
            }
            break;
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<ConstExpr, ParseError> {
        if self.eat(Token::Minus) {
            return Ok(ConstExpr::Neg(Box::new(self.parse_unary()?)));
        }
        if self.eat(Token::LParen) {
            let inner = self.parse_const_expr()?;
            self.expect(Token::RParen)?;
            return Ok(inner);
        }
        match self.peek() {
            Some(Token::Number(text)) => {
                let value = parse_integer(text).ok_or_else(|| self.unexpected("integer"))?;
                self.advance();
                Ok(ConstExpr::Int(value))
            }
            Some(Token::Ident(name)) => {
                self.advance();
                Ok(ConstExpr::Name(name.to_string()))
            }
            _ => Err(self.unexpected("constant expression")),
        }
    }

    fn peek(&self) -> Option<Token<'s>> {
        self.tokens.get(self.pos).map(|s| s.token)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn check(&self, token: Token<'_>) -> bool {
        self.peek().is_some_and(|t| same_kind(t, token))
    }

    fn eat(&mut self, token: Token<'_>) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        if self.peek() == Some(Token::Ident(word)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token<'_>) -> Result<(), ParseError> {
        self.expect_spanned(token).map(|_| ())
    }

    fn expect_spanned(&mut self, token: Token<'_>) -> Result<std::ops::Range<usize>, ParseError> {
        if self.check(token) {
            let span = self.tokens[self.pos].span.clone();
            self.advance();
            Ok(span)
        } else {
            Err(self.unexpected(&token.to_string()))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                self.advance();
                Ok(name.to_string())
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// Like `expect_ident`, but keywords are accepted as plain names.
    fn expect_word(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                self.advance();
                Ok(name.to_string())
            }
            Some(
                Token::Interface
                | Token::Dictionary
                | Token::Typedef
                | Token::Native
                | Token::Attribute
                | Token::Readonly
                | Token::Const
                | Token::Raises,
            ) => {
                let span = self.tokens[self.pos].span.clone();
                self.advance();
                Ok(self.source[span].to_string())
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn expect_str(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Str(s)) => {
                self.advance();
                Ok(s.to_string())
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(spanned) => {
                let (line, column) = line_column(self.source, spanned.span.start);
                ParseError::Unexpected {
                    file: self.file.to_string(),
                    line,
                    column,
                    expected: expected.to_string(),
                    found: spanned.token.to_string(),
                }
            }
            None => self.eof(expected),
        }
    }

    fn eof(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedEof {
            file: self.file.to_string(),
            expected: expected.to_string(),
        }
    }
}

/// Compares token kinds, ignoring payloads.
fn same_kind(a: Token<'_>, b: Token<'_>) -> bool {
    std::mem::discriminant(&a) == std::mem::discriminant(&b)
}

/// Parses a decimal or `0x` hexadecimal integer literal.
fn parse_integer(text: &str) -> Option<u64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}
