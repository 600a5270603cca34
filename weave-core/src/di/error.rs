//! 依赖解析与代码生成的错误类型

use super::dependency::Dependency;
use crate::module::{PackageError, ResolveError};
use std::fmt;
use thiserror::Error;

/// 被拒绝的候选声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// 如 `func NewDB` 或 `struct Config`
    pub declaration: String,
    pub reason: String,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.declaration, self.reason)
    }
}

fn format_rejections(rejections: &[Rejection]) -> String {
    rejections
        .iter()
        .map(|r| format!("\n  rejected {r}"))
        .collect()
}

fn format_chain(chain: &[String]) -> String {
    if chain.is_empty() {
        String::new()
    } else {
        format!(" (required by {})", chain.join(" -> "))
    }
}

/// 加载错误类型
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiErrorKind {
    /// 没有声明能提供该依赖
    #[error("unable to find declaration for {dependency}{}", format_rejections(.rejections))]
    NotFound {
        dependency: Dependency,
        rejections: Vec<Rejection>,
    },

    /// 模块目录无法定位
    #[error("{0}")]
    Unresolvable(#[from] ResolveError),

    /// 源码解析失败
    #[error("{0}")]
    ParseFailure(#[from] PackageError),

    /// 依赖成环
    #[error("dependency cycle detected: {}", .chain.join(" -> "))]
    CycleDetected { chain: Vec<String> },
}

/// 加载错误，附带出错时的依赖链
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}{}", format_chain(.chain))]
pub struct DiError {
    pub kind: DiErrorKind,
    /// 从根开始的祖先依赖
    pub chain: Vec<String>,
}

impl DiError {
    pub fn new(kind: DiErrorKind, chain: Vec<String>) -> Self {
        Self { kind, chain }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, DiErrorKind::NotFound { .. })
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self.kind, DiErrorKind::CycleDetected { .. })
    }
}

/// 代码生成错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("node {dependency} is neither external nor backed by a declaration")]
    MissingDeclaration { dependency: String },

    #[error("{subject} expects {expected} values, got {found}")]
    ArityMismatch {
        subject: String,
        expected: usize,
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = DiError::new(
            DiErrorKind::NotFound {
                dependency: Dependency::pointer("example.com/app/db", "DB"),
                rejections: vec![Rejection {
                    declaration: "func NewDB".to_string(),
                    reason: "depends on builtin type 'string'".to_string(),
                }],
            },
            vec!["*example.com/app/web.Web".to_string()],
        );
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "unable to find declaration for *example.com/app/db.DB\n  \
             rejected func NewDB: depends on builtin type 'string' \
             (required by *example.com/app/web.Web)"
        );
    }

    #[test]
    fn test_cycle_display() {
        let err = DiError::new(
            DiErrorKind::CycleDetected {
                chain: vec!["a.A".to_string(), "b.B".to_string(), "a.A".to_string()],
            },
            Vec::new(),
        );
        assert!(err.is_cycle());
        assert_eq!(err.to_string(), "dependency cycle detected: a.A -> b.B -> a.A");
    }
}
