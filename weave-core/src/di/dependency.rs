//! 依赖描述符
//!
//! 一个依赖由 (模块标识符, 类型名) 唯一确定。是否为指针只影响生成代码时
//! 的取址/解引用，不影响节点身份。

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 预声明类型
pub const BUILTIN_TYPES: &[&str] = &[
    "any",
    "bool",
    "byte",
    "comparable",
    "complex128",
    "complex64",
    "error",
    "float32",
    "float64",
    "int",
    "int16",
    "int32",
    "int64",
    "int8",
    "rune",
    "string",
    "uint",
    "uint16",
    "uint32",
    "uint64",
    "uint8",
    "uintptr",
];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_TYPES.contains(&name)
}

/// 描述符解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("empty type descriptor")]
    Empty,

    #[error("invalid type descriptor '{0}': expected [*]module/path.TypeName")]
    Invalid(String),

    #[error("'{0}' is not a builtin type; qualify it with its module")]
    UnknownBuiltin(String),
}

/// 依赖描述符
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Dependency {
    /// 模块标识符，预声明类型为空
    pub module_id: String,
    /// 不带指针的类型名
    pub type_name: String,
    /// 是否为指针形式
    pub reference: bool,
}

impl Dependency {
    pub fn new(module_id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            type_name: type_name.into(),
            reference: false,
        }
    }

    /// 指针形式 `*module.Type`
    pub fn pointer(module_id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(module_id, type_name).with_reference(true)
    }

    pub fn builtin(type_name: impl Into<String>) -> Self {
        Self::new(String::new(), type_name)
    }

    pub fn with_reference(mut self, reference: bool) -> Self {
        self.reference = reference;
        self
    }

    /// 解析 `[*]module/path.TypeName`，预声明类型写裸名
    pub fn parse(descriptor: &str) -> Result<Self, DescriptorError> {
        let descriptor = descriptor.trim();
        let (reference, rest) = match descriptor.strip_prefix('*') {
            Some(rest) => (true, rest),
            None => (false, descriptor),
        };
        if rest.is_empty() {
            return Err(DescriptorError::Empty);
        }

        let Some((module_id, type_name)) = rest.rsplit_once('.') else {
            if !is_builtin(rest) {
                return Err(DescriptorError::UnknownBuiltin(rest.to_string()));
            }
            return Ok(Self::builtin(rest).with_reference(reference));
        };

        if module_id.is_empty() || module_id.ends_with('/') || !is_identifier(type_name) {
            return Err(DescriptorError::Invalid(descriptor.to_string()));
        }
        Ok(Self::new(module_id, type_name).with_reference(reference))
    }

    /// 节点身份：`module.Type`
    pub fn id(&self) -> String {
        if self.module_id.is_empty() {
            self.type_name.clone()
        } else {
            format!("{}.{}", self.module_id, self.type_name)
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.module_id.is_empty()
    }

    pub fn is_error(&self) -> bool {
        self.is_builtin() && self.type_name == "error"
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reference {
            write!(f, "*")?;
        }
        write!(f, "{}", self.id())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}
