//! Token 定义

use super::error::Coordinate;

/// Token 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    /// 解释型或原始字符串字面量（保留引号）
    String,
    Char,
    Number,
    LeftParen,
    RightParen,
    LeftCurly,
    RightCurly,
    LeftBracket,
    RightBracket,
    Comma,
    Dot,
    Star,
    Semicolon,
    Ellipsis,
    /// `<-`
    Arrow,
    /// 其他运算符（函数体内才会出现，只用于跳过）
    Operator,
}

impl TokenKind {
    /// 换行后是否自动插入分号
    pub fn ends_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::String
                | TokenKind::Char
                | TokenKind::Number
                | TokenKind::RightParen
                | TokenKind::RightBracket
                | TokenKind::RightCurly
        )
    }
}

/// 词法单元
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub coordinate: Coordinate,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            kind,
            text: text.into(),
            coordinate,
        }
    }

    /// 是否为指定文本的标识符（关键字同样按标识符处理）
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == word
    }
}
