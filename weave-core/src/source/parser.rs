//! 声明解析器
//!
//! 递归下降解析 token 序列，产出 [`SourceFile`]。

use super::ast::{FieldDecl, FuncDecl, Import, Param, SourceFile, StructDecl, TypeExpr};
use super::error::{Coordinate, ErrorLocation, ParseError, ParseErrorKind, ParseResult};
use super::lexer::tokenize;
use super::token::{Token, TokenKind};
use std::path::Path;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// 解析整个文件
    pub fn parse(&mut self) -> ParseResult<SourceFile> {
        self.skip_semicolons();
        if !self.check_word("package") {
            return Err(self.error_here(ParseErrorKind::MissingPackageClause));
        }
        self.consume();
        let package = self.expect_identifier()?;
        self.expect_end_of_decl()?;

        let mut file = SourceFile {
            package,
            ..Default::default()
        };

        loop {
            self.skip_semicolons();
            let Some(token) = self.current() else {
                break;
            };
            if token.kind != TokenKind::Identifier {
                return Err(self.unexpected(&["import", "func", "type", "var", "const"]));
            }
            let keyword = token.text.clone();
            match keyword.as_str() {
                "import" => self.parse_import_decl(&mut file.imports)?,
                "func" => file.funcs.push(self.parse_func_decl()?),
                "type" => self.parse_type_decl(&mut file.structs)?,
                "var" | "const" => self.skip_value_decl()?,
                _ => return Err(self.unexpected(&["import", "func", "type", "var", "const"])),
            }
            self.expect_end_of_decl()?;
        }

        Ok(file)
    }

    // ==================== token 操作 ====================

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| t.kind)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind(0) == Some(kind)
    }

    fn check_word(&self, word: &str) -> bool {
        self.current().is_some_and(|t| t.is_word(word))
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.consume();
            true
        } else {
            false
        }
    }

    fn current_text(&self) -> String {
        match self.current() {
            Some(token) if token.kind == TokenKind::Semicolon => "newline or ';'".to_string(),
            Some(token) => token.text.clone(),
            None => "EOF".to_string(),
        }
    }

    fn error_here(&self, kind: ParseErrorKind) -> ParseError {
        match self.current() {
            Some(token) => ParseError::here(kind, token.coordinate),
            None => ParseError {
                kind,
                location: ErrorLocation::Eof,
                file: None,
            },
        }
    }

    fn unexpected(&self, expected: &[&str]) -> ParseError {
        if self.current().is_none() {
            return ParseError::at_eof(ParseErrorKind::UnexpectedEndOfInput);
        }
        self.error_here(ParseErrorKind::UnexpectedToken {
            found: self.current_text(),
            expected: expected.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
        if self.check(kind) {
            self.consume()
                .ok_or_else(|| ParseError::at_eof(ParseErrorKind::UnexpectedEndOfInput))
        } else {
            Err(self.unexpected(&[expected]))
        }
    }

    fn expect_identifier(&mut self) -> ParseResult<String> {
        match self.current() {
            Some(token) if token.kind == TokenKind::Identifier => {
                let name = token.text.clone();
                self.consume();
                Ok(name)
            }
            Some(_) => Err(self.error_here(ParseErrorKind::ExpectedIdentifier {
                found: self.current_text(),
            })),
            None => Err(ParseError::at_eof(ParseErrorKind::UnexpectedEndOfInput)),
        }
    }

    fn skip_semicolons(&mut self) {
        while self.match_token(TokenKind::Semicolon) {}
    }

    /// 声明之间需要分号；右括号前或文件末尾可以省略
    fn expect_end_of_decl(&mut self) -> ParseResult<()> {
        match self.peek_kind(0) {
            Some(TokenKind::Semicolon) => {
                self.consume();
                Ok(())
            }
            None | Some(TokenKind::RightParen) | Some(TokenKind::RightCurly) => Ok(()),
            Some(_) => Err(self.unexpected(&["newline or ';'"])),
        }
    }

    /// 跳过一组平衡的括号（当前 token 必须是左括号）
    fn skip_balanced(&mut self, open: TokenKind, close: TokenKind) -> ParseResult<()> {
        let start = self
            .current()
            .map(|t| (t.coordinate, t.text.chars().next().unwrap_or('(')));
        let mut depth = 0usize;
        loop {
            let Some(token) = self.consume() else {
                let (coordinate, delimiter) = start.unwrap_or((
                    Coordinate { line: 0, column: 0 },
                    '(',
                ));
                return Err(ParseError::here(
                    ParseErrorKind::UnbalancedDelimiter(delimiter),
                    coordinate,
                ));
            };
            if token.kind == open {
                depth += 1;
            } else if token.kind == close {
                depth = depth.saturating_sub(1);
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }

    // ==================== 声明 ====================

    fn parse_import_decl(&mut self, imports: &mut Vec<Import>) -> ParseResult<()> {
        self.consume();
        if self.match_token(TokenKind::LeftParen) {
            loop {
                self.skip_semicolons();
                if self.match_token(TokenKind::RightParen) {
                    break;
                }
                if self.current().is_none() {
                    return Err(ParseError::at_eof(ParseErrorKind::UnexpectedEndOfInput));
                }
                imports.push(self.parse_import_spec()?);
                self.expect_end_of_decl()?;
            }
        } else {
            imports.push(self.parse_import_spec()?);
        }
        Ok(())
    }

    fn parse_import_spec(&mut self) -> ParseResult<Import> {
        let alias = match self.peek_kind(0) {
            Some(TokenKind::Identifier) => self.consume().map(|t| t.text),
            Some(TokenKind::Dot) => {
                self.consume();
                Some(".".to_string())
            }
            _ => None,
        };
        let path = self.expect(TokenKind::String, "import path")?;
        Ok(Import {
            alias,
            path: unquote(&path.text),
        })
    }

    fn parse_func_decl(&mut self) -> ParseResult<FuncDecl> {
        self.consume();
        let receiver = if self.check(TokenKind::LeftParen) {
            self.parse_params()?.into_iter().next().map(|p| p.ty)
        } else {
            None
        };
        let name = self.expect_identifier()?;
        if self.check(TokenKind::LeftBracket) {
            self.skip_balanced(TokenKind::LeftBracket, TokenKind::RightBracket)?;
        }
        let params = self.parse_params()?;
        let results = self.parse_results()?;
        if self.check(TokenKind::LeftCurly) {
            self.skip_balanced(TokenKind::LeftCurly, TokenKind::RightCurly)?;
        }
        Ok(FuncDecl {
            name,
            receiver,
            params,
            results,
        })
    }

    fn parse_type_decl(&mut self, structs: &mut Vec<StructDecl>) -> ParseResult<()> {
        self.consume();
        if self.match_token(TokenKind::LeftParen) {
            loop {
                self.skip_semicolons();
                if self.match_token(TokenKind::RightParen) {
                    break;
                }
                if self.current().is_none() {
                    return Err(ParseError::at_eof(ParseErrorKind::UnexpectedEndOfInput));
                }
                self.parse_type_spec(structs)?;
                self.expect_end_of_decl()?;
            }
            Ok(())
        } else {
            self.parse_type_spec(structs)
        }
    }

    fn parse_type_spec(&mut self, structs: &mut Vec<StructDecl>) -> ParseResult<()> {
        let name = self.expect_identifier()?;

        // 类型参数 `[T any]`，与数组长度 `[N]` 区分
        if self.check(TokenKind::LeftBracket)
            && self.peek_kind(1) == Some(TokenKind::Identifier)
            && self.peek_kind(2) != Some(TokenKind::RightBracket)
        {
            self.skip_balanced(TokenKind::LeftBracket, TokenKind::RightBracket)?;
        }

        if self
            .current()
            .is_some_and(|t| t.kind == TokenKind::Operator && t.text == "=")
        {
            self.consume();
        }

        if self.check_word("struct") && self.peek_kind(1) == Some(TokenKind::LeftCurly) {
            self.consume();
            let fields = self.parse_struct_body()?;
            structs.push(StructDecl { name, fields });
        } else {
            self.parse_type()?;
        }
        Ok(())
    }

    fn parse_struct_body(&mut self) -> ParseResult<Vec<FieldDecl>> {
        self.expect(TokenKind::LeftCurly, "{")?;
        let mut fields = Vec::new();
        loop {
            self.skip_semicolons();
            if self.match_token(TokenKind::RightCurly) {
                break;
            }
            if self.current().is_none() {
                return Err(ParseError::at_eof(ParseErrorKind::UnexpectedEndOfInput));
            }
            self.parse_field_decl(&mut fields)?;
            // 字段标签
            self.match_token(TokenKind::String);
            if !self.match_token(TokenKind::Semicolon) && !self.check(TokenKind::RightCurly) {
                return Err(self.unexpected(&["newline or ';'", "}"]));
            }
        }
        Ok(fields)
    }

    fn parse_field_decl(&mut self, fields: &mut Vec<FieldDecl>) -> ParseResult<()> {
        let embedded = match self.peek_kind(0) {
            Some(TokenKind::Star) => true,
            Some(TokenKind::Identifier) => matches!(
                self.peek_kind(1),
                None | Some(TokenKind::Dot)
                    | Some(TokenKind::Semicolon)
                    | Some(TokenKind::RightCurly)
                    | Some(TokenKind::String)
            ),
            _ => return Err(self.unexpected(&["field name", "embedded type"])),
        };

        if embedded {
            let ty = self.parse_type()?;
            let name = ty
                .base_name()
                .map(str::to_string)
                .ok_or_else(|| self.unexpected(&["embedded type"]))?;
            fields.push(FieldDecl {
                name,
                ty,
                embedded: true,
            });
            return Ok(());
        }

        let mut names = vec![self.expect_identifier()?];
        while self.match_token(TokenKind::Comma) {
            names.push(self.expect_identifier()?);
        }
        let ty = self.parse_type()?;
        for name in names {
            fields.push(FieldDecl {
                name,
                ty: ty.clone(),
                embedded: false,
            });
        }
        Ok(())
    }

    /// var / const 声明只需要跳过
    fn skip_value_decl(&mut self) -> ParseResult<()> {
        self.consume();
        if self.check(TokenKind::LeftParen) {
            return self.skip_balanced(TokenKind::LeftParen, TokenKind::RightParen);
        }
        let mut depth = 0usize;
        while let Some(kind) = self.peek_kind(0) {
            match kind {
                TokenKind::Semicolon if depth == 0 => break,
                TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftCurly => depth += 1,
                TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightCurly => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.consume();
        }
        Ok(())
    }

    // ==================== 签名与类型 ====================

    /// 解析参数列表，展开 `a, b *T` 这种分组写法
    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        self.expect(TokenKind::LeftParen, "(")?;
        let mut entries: Vec<(Coordinate, TypeExpr, Option<TypeExpr>)> = Vec::new();
        loop {
            if self.match_token(TokenKind::RightParen) {
                break;
            }
            let at = self
                .current()
                .map(|t| t.coordinate)
                .ok_or_else(|| ParseError::at_eof(ParseErrorKind::UnexpectedEndOfInput))?;
            let first = self.parse_type()?;
            let second = if self.check(TokenKind::Comma) || self.check(TokenKind::RightParen) {
                None
            } else {
                Some(self.parse_type()?)
            };
            entries.push((at, first, second));
            if !self.match_token(TokenKind::Comma) {
                self.expect(TokenKind::RightParen, ")")?;
                break;
            }
        }

        if entries.iter().all(|(_, _, second)| second.is_none()) {
            return Ok(entries
                .into_iter()
                .map(|(_, ty, _)| Param { name: None, ty })
                .collect());
        }

        let mut params = Vec::new();
        let mut pending = Vec::new();
        for (at, first, second) in entries {
            match first {
                TypeExpr::Named {
                    qualifier: None,
                    name,
                } => pending.push(name),
                other => {
                    return Err(ParseError::here(
                        ParseErrorKind::ExpectedIdentifier {
                            found: other.to_string(),
                        },
                        at,
                    ))
                }
            }
            if let Some(ty) = second {
                for name in pending.drain(..) {
                    params.push(Param {
                        name: Some(name),
                        ty: ty.clone(),
                    });
                }
            }
        }
        if !pending.is_empty() {
            return Err(self.unexpected(&["parameter type"]));
        }
        Ok(params)
    }

    fn parse_results(&mut self) -> ParseResult<Vec<Param>> {
        if self.check(TokenKind::LeftParen) {
            return self.parse_params();
        }
        let starts_type = matches!(
            self.peek_kind(0),
            Some(TokenKind::Identifier)
                | Some(TokenKind::Star)
                | Some(TokenKind::LeftBracket)
                | Some(TokenKind::Arrow)
        );
        if starts_type {
            Ok(vec![Param {
                name: None,
                ty: self.parse_type()?,
            }])
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_type(&mut self) -> ParseResult<TypeExpr> {
        let Some(token) = self.current().cloned() else {
            return Err(ParseError::at_eof(ParseErrorKind::UnexpectedEndOfInput));
        };
        match token.kind {
            TokenKind::Star => {
                self.consume();
                Ok(TypeExpr::pointer(self.parse_type()?))
            }
            TokenKind::LeftParen => {
                self.consume();
                let ty = self.parse_type()?;
                self.expect(TokenKind::RightParen, ")")?;
                Ok(ty)
            }
            TokenKind::LeftBracket => {
                self.consume();
                if self.match_token(TokenKind::RightBracket) {
                    return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
                }
                let mut length = String::new();
                let mut depth = 0usize;
                loop {
                    match self.consume() {
                        None => {
                            return Err(ParseError::here(
                                ParseErrorKind::UnbalancedDelimiter('['),
                                token.coordinate,
                            ))
                        }
                        Some(t) if t.kind == TokenKind::RightBracket && depth == 0 => break,
                        Some(t) => {
                            match t.kind {
                                TokenKind::LeftBracket => depth += 1,
                                TokenKind::RightBracket => depth -= 1,
                                _ => {}
                            }
                            length.push_str(&t.text);
                        }
                    }
                }
                Ok(TypeExpr::Array(length, Box::new(self.parse_type()?)))
            }
            TokenKind::Arrow => {
                self.consume();
                if !self.check_word("chan") {
                    return Err(self.unexpected(&["chan"]));
                }
                self.consume();
                Ok(TypeExpr::Chan(Box::new(self.parse_type()?)))
            }
            TokenKind::Ellipsis => {
                self.consume();
                Ok(TypeExpr::Variadic(Box::new(self.parse_type()?)))
            }
            TokenKind::Identifier => match token.text.as_str() {
                "map" => {
                    self.consume();
                    self.expect(TokenKind::LeftBracket, "[")?;
                    let key = self.parse_type()?;
                    self.expect(TokenKind::RightBracket, "]")?;
                    let value = self.parse_type()?;
                    Ok(TypeExpr::Map(Box::new(key), Box::new(value)))
                }
                "chan" => {
                    self.consume();
                    self.match_token(TokenKind::Arrow);
                    Ok(TypeExpr::Chan(Box::new(self.parse_type()?)))
                }
                "func" => {
                    self.consume();
                    self.parse_params()?;
                    self.parse_results()?;
                    Ok(TypeExpr::Func)
                }
                "interface" => {
                    self.consume();
                    self.skip_balanced(TokenKind::LeftCurly, TokenKind::RightCurly)?;
                    Ok(TypeExpr::Interface)
                }
                "struct" => {
                    self.consume();
                    self.skip_balanced(TokenKind::LeftCurly, TokenKind::RightCurly)?;
                    Ok(TypeExpr::Struct)
                }
                _ => {
                    self.consume();
                    if self.check(TokenKind::Dot) && self.peek_kind(1) == Some(TokenKind::Identifier)
                    {
                        self.consume();
                        let name = self.expect_identifier()?;
                        Ok(TypeExpr::qualified(token.text, name))
                    } else {
                        Ok(TypeExpr::named(token.text))
                    }
                }
            },
            _ => Err(self.unexpected(&["type"])),
        }
    }
}

/// 去掉字符串字面量两侧的引号
fn unquote(literal: &str) -> String {
    let mut chars = literal.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

/// 解析单个源文件
pub fn parse_source(path: &Path, source: &str) -> ParseResult<SourceFile> {
    let tokens = tokenize(source).map_err(|e| e.in_file(path))?;
    let mut file = Parser::new(tokens)
        .parse()
        .map_err(|e| e.in_file(path))?;
    file.path = path.to_path_buf();
    Ok(file)
}
