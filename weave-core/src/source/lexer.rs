//! 词法分析器
//!
//! 逐字符扫描，换行处按规则自动插入分号：上一个 token 是标识符、字面量或右括号时，
//! 换行等价于 `;`。

use super::error::{Coordinate, ParseError, ParseErrorKind, ParseResult};
use super::token::{Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// 扫描全部输入
    pub fn tokenize(mut self) -> ParseResult<Vec<Token>> {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '\n' => {
                    self.insert_semicolon();
                    self.bump();
                }
                '/' if self.peek_at(1) == Some('/') => self.skip_line_comment(),
                '/' if self.peek_at(1) == Some('*') => self.skip_block_comment()?,
                '"' => self.scan_string()?,
                '`' => self.scan_raw_string()?,
                '\'' => self.scan_char()?,
                c if c.is_alphabetic() || c == '_' => self.scan_identifier(),
                c if c.is_ascii_digit() => self.scan_number(),
                '.' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => self.scan_number(),
                _ => self.scan_punctuation(c)?,
            }
        }
        self.insert_semicolon();
        Ok(self.tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn coordinate(&self) -> Coordinate {
        Coordinate {
            line: self.line,
            column: self.column,
        }
    }

    fn push(&mut self, kind: TokenKind, text: String, at: Coordinate) {
        self.tokens.push(Token::new(kind, text, at));
    }

    fn insert_semicolon(&mut self) {
        let needed = self
            .tokens
            .last()
            .is_some_and(|token| token.kind.ends_statement());
        if needed {
            let at = self.coordinate();
            self.push(TokenKind::Semicolon, "\n".to_string(), at);
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) -> ParseResult<()> {
        let start = self.coordinate();
        self.bump();
        self.bump();
        let mut saw_newline = false;
        loop {
            match self.peek() {
                None => {
                    return Err(ParseError::here(
                        ParseErrorKind::UnterminatedComment,
                        start,
                    ))
                }
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.bump();
                    self.bump();
                    break;
                }
                Some(c) => {
                    saw_newline |= c == '\n';
                    self.bump();
                }
            }
        }
        // 跨行的块注释等价于一次换行
        if saw_newline {
            self.insert_semicolon();
        }
        Ok(())
    }

    fn scan_identifier(&mut self) {
        let at = self.coordinate();
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        self.push(TokenKind::Identifier, text, at);
    }

    fn scan_number(&mut self) {
        let at = self.coordinate();
        let mut text = String::new();
        while let Some(c) = self.peek() {
            let exponent_sign = (c == '+' || c == '-')
                && text
                    .chars()
                    .last()
                    .is_some_and(|p| matches!(p, 'e' | 'E' | 'p' | 'P'))
                && !text.starts_with("0x")
                && !text.starts_with("0X");
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || exponent_sign {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        self.push(TokenKind::Number, text, at);
    }

    fn scan_string(&mut self) -> ParseResult<()> {
        let at = self.coordinate();
        let mut text = String::from('"');
        self.bump();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(ParseError::here(ParseErrorKind::UnterminatedString, at))
                }
                Some('\\') => {
                    text.push('\\');
                    match self.bump() {
                        Some(escaped) if escaped != '\n' => text.push(escaped),
                        _ => {
                            return Err(ParseError::here(
                                ParseErrorKind::UnterminatedString,
                                at,
                            ))
                        }
                    }
                }
                Some('"') => {
                    text.push('"');
                    break;
                }
                Some(c) => text.push(c),
            }
        }
        self.push(TokenKind::String, text, at);
        Ok(())
    }

    fn scan_raw_string(&mut self) -> ParseResult<()> {
        let at = self.coordinate();
        let mut text = String::from('`');
        self.bump();
        loop {
            match self.bump() {
                None => return Err(ParseError::here(ParseErrorKind::UnterminatedString, at)),
                Some('`') => {
                    text.push('`');
                    break;
                }
                Some(c) => text.push(c),
            }
        }
        self.push(TokenKind::String, text, at);
        Ok(())
    }

    fn scan_char(&mut self) -> ParseResult<()> {
        let at = self.coordinate();
        let mut text = String::from('\'');
        self.bump();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(ParseError::here(ParseErrorKind::UnterminatedString, at))
                }
                Some('\\') => {
                    text.push('\\');
                    if let Some(escaped) = self.bump() {
                        text.push(escaped);
                    }
                }
                Some('\'') => {
                    text.push('\'');
                    break;
                }
                Some(c) => text.push(c),
            }
        }
        self.push(TokenKind::Char, text, at);
        Ok(())
    }

    fn scan_punctuation(&mut self, c: char) -> ParseResult<()> {
        let at = self.coordinate();
        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftCurly,
            '}' => TokenKind::RightCurly,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ',' => TokenKind::Comma,
            '*' => TokenKind::Star,
            ';' => TokenKind::Semicolon,
            '.' if self.peek_at(1) == Some('.') && self.peek_at(2) == Some('.') => {
                self.bump();
                self.bump();
                self.bump();
                self.push(TokenKind::Ellipsis, "...".to_string(), at);
                return Ok(());
            }
            '.' => TokenKind::Dot,
            '<' if self.peek_at(1) == Some('-') => {
                self.bump();
                self.bump();
                self.push(TokenKind::Arrow, "<-".to_string(), at);
                return Ok(());
            }
            '+' | '-' | '/' | '%' | '&' | '|' | '^' | '<' | '>' | '=' | '!' | ':' | '~' => {
                TokenKind::Operator
            }
            other => return Err(ParseError::here(ParseErrorKind::InvalidCharacter(other), at)),
        };
        self.bump();
        self.push(kind, c.to_string(), at);
        Ok(())
    }
}

/// 便捷函数：扫描源码为 token 序列
pub fn tokenize(source: &str) -> ParseResult<Vec<Token>> {
    Lexer::new(source).tokenize()
}
