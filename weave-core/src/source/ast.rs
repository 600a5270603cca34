//! 声明语法树

use std::fmt;
use std::path::PathBuf;

/// 类型表达式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `Name` 或 `pkg.Name`
    Named {
        qualifier: Option<String>,
        name: String,
    },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Array(String, Box<TypeExpr>),
    Map(Box<TypeExpr>, Box<TypeExpr>),
    Chan(Box<TypeExpr>),
    /// 函数类型（签名不保留）
    Func,
    Interface,
    /// 匿名 struct
    Struct,
    /// 可变参数 `...T`
    Variadic(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named {
            qualifier: None,
            name: name.into(),
        }
    }

    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        TypeExpr::Named {
            qualifier: Some(qualifier.into()),
            name: name.into(),
        }
    }

    pub fn pointer(inner: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(inner))
    }

    /// 去掉一层指针，返回 (内部类型, 是否为指针)
    pub fn strip_pointer(&self) -> (&TypeExpr, bool) {
        match self {
            TypeExpr::Pointer(inner) => (inner, true),
            other => (other, false),
        }
    }

    /// 去掉指针和切片后的类型名（嵌入字段命名用）
    pub fn base_name(&self) -> Option<&str> {
        match self {
            TypeExpr::Named { name, .. } => Some(name),
            TypeExpr::Pointer(inner) | TypeExpr::Slice(inner) => inner.base_name(),
            _ => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named {
                qualifier: Some(q),
                name,
            } => write!(f, "{q}.{name}"),
            TypeExpr::Named {
                qualifier: None,
                name,
            } => write!(f, "{name}"),
            TypeExpr::Pointer(inner) => write!(f, "*{inner}"),
            TypeExpr::Slice(inner) => write!(f, "[]{inner}"),
            TypeExpr::Array(len, inner) => write!(f, "[{len}]{inner}"),
            TypeExpr::Map(key, value) => write!(f, "map[{key}]{value}"),
            TypeExpr::Chan(inner) => write!(f, "chan {inner}"),
            TypeExpr::Func => write!(f, "func(...)"),
            TypeExpr::Interface => write!(f, "interface{{...}}"),
            TypeExpr::Struct => write!(f, "struct{{...}}"),
            TypeExpr::Variadic(inner) => write!(f, "...{inner}"),
        }
    }
}

/// 函数参数或结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

/// 顶层函数或方法声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: String,
    /// 方法接收者类型；普通函数为 None
    pub receiver: Option<TypeExpr>,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
}

/// struct 字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeExpr,
    /// 嵌入字段（名称取自类型名）
    pub embedded: bool,
}

/// `type Name struct { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
}

/// import 声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub alias: Option<String>,
    pub path: String,
}

impl Import {
    /// 文件内引用该包使用的名称
    ///
    /// 未写别名时取路径最后一段；`/v2` 这类主版本后缀取前一段。
    pub fn local_name(&self) -> &str {
        if let Some(alias) = &self.alias {
            return alias;
        }
        let mut segments = self.path.rsplit('/');
        let last = segments.next().unwrap_or(&self.path);
        if is_major_version(last) {
            if let Some(previous) = segments.next() {
                return previous;
            }
        }
        last
    }
}

fn is_major_version(segment: &str) -> bool {
    segment.len() > 1
        && segment.starts_with('v')
        && segment[1..].chars().all(|c| c.is_ascii_digit())
}

/// 单个源文件
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceFile {
    pub path: PathBuf,
    pub package: String,
    pub imports: Vec<Import>,
    pub funcs: Vec<FuncDecl>,
    pub structs: Vec<StructDecl>,
}

impl SourceFile {
    /// 根据限定名查找 import 路径
    pub fn import_path(&self, qualifier: &str) -> Option<&str> {
        self.imports
            .iter()
            .filter(|import| !matches!(import.alias.as_deref(), Some("_") | Some(".")))
            .find(|import| import.local_name() == qualifier)
            .map(|import| import.path.as_str())
    }
}

/// 一个目录下的包
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub dir: PathBuf,
    /// 按文件名排序
    pub files: Vec<SourceFile>,
}

impl Package {
    /// 按文件、声明顺序遍历函数
    pub fn funcs(&self) -> impl Iterator<Item = (&SourceFile, &FuncDecl)> {
        self.files
            .iter()
            .flat_map(|file| file.funcs.iter().map(move |func| (file, func)))
    }

    /// 按文件、声明顺序遍历 struct
    pub fn structs(&self) -> impl Iterator<Item = (&SourceFile, &StructDecl)> {
        self.files
            .iter()
            .flat_map(|file| file.structs.iter().map(move |decl| (file, decl)))
    }
}

/// 是否为导出标识符（首字母大写）
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}
