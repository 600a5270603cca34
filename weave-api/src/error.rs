//! API 错误类型
//!
//! 提供统一的错误类型和结构化错误报告。

use serde::Serialize;
use thiserror::Error;
use weave_core::di::DescriptorError;
use weave_core::module::PackageError;
use weave_core::source::{ErrorLocation, ParseError};
use weave_core::{DiError, DiErrorKind, GenerateError};
use weave_vfs::VfsError;

/// Weave 错误类型
#[derive(Error, Debug, Clone)]
pub enum WeaveError {
    /// 依赖图加载错误（查找、解析、成环）
    #[error("{0}")]
    Load(#[from] DiError),

    /// 代码生成错误
    #[error("Generate error: {0}")]
    Generate(#[from] GenerateError),

    /// 类型描述符错误
    #[error("Invalid descriptor: {0}")]
    Descriptor(#[from] DescriptorError),

    /// 配置错误
    #[error("Config error: {0}")]
    Config(String),

    /// 文件读写错误
    #[error("IO error: {0}")]
    Io(#[from] VfsError),
}

impl WeaveError {
    /// 源码解析错误（如果有）
    fn parse_error(&self) -> Option<&ParseError> {
        match self {
            WeaveError::Load(DiError {
                kind: DiErrorKind::ParseFailure(PackageError::Parse(e)),
                ..
            }) => Some(e),
            _ => None,
        }
    }

    /// 获取错误行号（如果有）
    pub fn line(&self) -> Option<usize> {
        self.parse_error().and_then(|e| e.line())
    }

    /// 获取错误列号（如果有）
    pub fn column(&self) -> Option<usize> {
        self.parse_error().and_then(|e| e.column())
    }

    /// 获取错误阶段名称
    pub fn phase(&self) -> &'static str {
        match self {
            WeaveError::Load(e) => match &e.kind {
                DiErrorKind::ParseFailure(_) => "parser",
                DiErrorKind::NotFound { .. } | DiErrorKind::Unresolvable(_) => "finder",
                DiErrorKind::CycleDetected { .. } => "loader",
            },
            WeaveError::Generate(_) => "generator",
            WeaveError::Descriptor(_) | WeaveError::Config(_) => "config",
            WeaveError::Io(_) => "io",
        }
    }

    /// 错误类型名（可用于程序化处理）
    pub fn kind_name(&self) -> &'static str {
        match self {
            WeaveError::Load(e) => match &e.kind {
                DiErrorKind::NotFound { .. } => "NotFound",
                DiErrorKind::Unresolvable(_) => "Unresolvable",
                DiErrorKind::ParseFailure(_) => "ParseFailure",
                DiErrorKind::CycleDetected { .. } => "CycleDetected",
            },
            WeaveError::Generate(_) => "GenerateError",
            WeaveError::Descriptor(_) => "InvalidDescriptor",
            WeaveError::Config(_) => "ConfigError",
            WeaveError::Io(_) => "IoError",
        }
    }

    /// 转换为结构化错误报告
    ///
    /// CLI 可以直接打印，上层应用可以序列化为 JSON。
    pub fn to_report(&self) -> ErrorReport {
        let parse_error = self.parse_error();
        let (message, chain) = match self {
            WeaveError::Load(e) => (e.kind.to_string(), e.chain.clone()),
            WeaveError::Config(message) => (message.clone(), Vec::new()),
            other => (other.to_string(), Vec::new()),
        };
        ErrorReport {
            phase: self.phase(),
            file: parse_error
                .and_then(|e| e.file.as_ref())
                .map(|path| path.display().to_string()),
            line: self.line(),
            column: self.column(),
            at_eof: parse_error.is_some_and(|e| e.location == ErrorLocation::Eof),
            error_kind: self.kind_name().to_string(),
            message,
            chain,
        }
    }
}

/// 结构化错误报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    /// 错误阶段: parser, finder, loader, generator, config, io
    pub phase: &'static str,
    /// 出错的源文件（如果有）
    pub file: Option<String>,
    /// 错误行号（1-based，如果有）
    pub line: Option<usize>,
    /// 错误列号（1-based，如果有）
    pub column: Option<usize>,
    /// 错误发生在文件末尾
    pub at_eof: bool,
    /// 错误类型
    pub error_kind: String,
    /// 人类可读的错误消息
    pub message: String,
    /// 从根开始的依赖链
    pub chain: Vec<String>,
}

impl ErrorReport {
    /// 转换为 JSON 格式
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl std::fmt::Display for ErrorReport {
    /// 默认的 CLI 友好格式
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.phase, self.error_kind, self.message)?;
        // 由近及远
        for (depth, dependency) in self.chain.iter().rev().enumerate() {
            write!(f, "\n{}required by {}", "  ".repeat(depth + 1), dependency)?;
        }
        Ok(())
    }
}
