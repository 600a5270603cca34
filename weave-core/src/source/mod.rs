//! 源码声明解析
//!
//! 只解析依赖注入需要的声明子集：package 子句、import、函数签名和 struct 类型。
//! 函数体、接口体、var/const 声明按括号平衡直接跳过。

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{
    is_exported, FieldDecl, FuncDecl, Import, Package, Param, SourceFile, StructDecl, TypeExpr,
};
pub use error::{Coordinate, ErrorLocation, ParseError, ParseErrorKind, ParseResult};
pub use parser::{parse_source, Parser};
