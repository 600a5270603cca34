use std::path::PathBuf;

/// 源码坐标（行列均从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinate {
    pub line: usize,
    pub column: usize,
}

/// 错误位置信息
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorLocation {
    /// 特定位置
    At(Coordinate),
    /// 文件末尾
    Eof,
}

/// 语法错误类型
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// 意外的token
    UnexpectedToken { found: String, expected: Vec<String> },
    /// 期望标识符
    ExpectedIdentifier { found: String },
    /// 缺少 package 子句
    MissingPackageClause,
    /// 字符串未闭合
    UnterminatedString,
    /// 块注释未闭合
    UnterminatedComment,
    /// 括号不匹配
    UnbalancedDelimiter(char),
    /// 非法字符
    InvalidCharacter(char),
    /// 意外的输入结束
    UnexpectedEndOfInput,
}

/// 语法错误，包含位置信息
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// 错误类型
    pub kind: ParseErrorKind,
    /// 错误发生的位置
    pub location: ErrorLocation,
    /// 所在文件（解析整个目录时填充）
    pub file: Option<PathBuf>,
}

pub type ParseResult<T> = Result<T, ParseError>;

impl ParseError {
    /// 在指定坐标创建错误
    pub fn here(kind: ParseErrorKind, coordinate: Coordinate) -> Self {
        Self {
            kind,
            location: ErrorLocation::At(coordinate),
            file: None,
        }
    }

    /// 在文件末尾创建错误
    pub fn at_eof(kind: ParseErrorKind) -> Self {
        Self {
            kind,
            location: ErrorLocation::Eof,
            file: None,
        }
    }

    /// 附加文件路径
    pub fn in_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// 获取行号（如果可用）
    pub fn line(&self) -> Option<usize> {
        match &self.location {
            ErrorLocation::At(coord) => Some(coord.line),
            ErrorLocation::Eof => None,
        }
    }

    /// 获取列号（如果可用）
    pub fn column(&self) -> Option<usize> {
        match &self.location {
            ErrorLocation::At(coord) => Some(coord.column),
            ErrorLocation::Eof => None,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:", file.display())?;
        }
        match &self.location {
            ErrorLocation::At(coord) => write!(f, "{}:{}: ", coord.line, coord.column)?,
            ErrorLocation::Eof => write!(f, "EOF: ")?,
        }

        match &self.kind {
            ParseErrorKind::UnexpectedToken { found, expected } => {
                if expected.is_empty() {
                    write!(f, "Unexpected token '{found}'")
                } else {
                    write!(
                        f,
                        "Unexpected token '{}', expected: {}",
                        found,
                        expected.join(", ")
                    )
                }
            }
            ParseErrorKind::ExpectedIdentifier { found } => {
                write!(f, "Expected identifier, found '{found}'")
            }
            ParseErrorKind::MissingPackageClause => write!(f, "Missing package clause"),
            ParseErrorKind::UnterminatedString => write!(f, "Unterminated string literal"),
            ParseErrorKind::UnterminatedComment => write!(f, "Unterminated block comment"),
            ParseErrorKind::UnbalancedDelimiter(c) => write!(f, "Unbalanced '{c}'"),
            ParseErrorKind::InvalidCharacter(c) => write!(f, "Invalid character '{c}'"),
            ParseErrorKind::UnexpectedEndOfInput => write!(f, "Unexpected end of input"),
        }
    }
}

impl std::error::Error for ParseError {}
