//! 声明查找
//!
//! 给定依赖描述符，在其模块目录中找到第一个能产出该类型的导出声明：
//! 先函数后 struct，按文件、声明顺序扫描。

use super::declaration::{Declaration, Field, Function, Param, ResultField, Struct};
use super::dependency::{is_builtin, Dependency};
use super::error::{DiErrorKind, Rejection};
use crate::module::{ModuleResolver, PackageError, PackageParser};
use crate::source::{is_exported, FieldDecl, FuncDecl, SourceFile, StructDecl, TypeExpr};
use std::collections::HashSet;
use tracing::{debug, trace};

/// 声明查找器
pub struct Finder<'a> {
    resolver: &'a dyn ModuleResolver,
    parser: &'a dyn PackageParser,
}

impl<'a> Finder<'a> {
    pub fn new(resolver: &'a dyn ModuleResolver, parser: &'a dyn PackageParser) -> Self {
        Self { resolver, parser }
    }

    /// 模块目录中 package 子句声明的包名
    ///
    /// 目录无法定位或没有源文件时返回 `None`，由调用方按路径推断。
    pub fn package_name(&self, module_id: &str) -> Result<Option<String>, DiErrorKind> {
        let Ok(dir) = self.resolver.resolve_directory(module_id) else {
            return Ok(None);
        };
        match self.parser.parse_package(&dir) {
            Ok(package) => Ok(Some(package.name.clone())),
            Err(PackageError::NoSourceFiles { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查找能产出 `wanted` 的声明
    ///
    /// # Arguments
    /// * `wanted` - 要构造的依赖
    /// * `externals` - 调用方提供的依赖 ID，这些预声明类型参数可以接受
    pub fn find(
        &self,
        wanted: &Dependency,
        externals: &HashSet<String>,
    ) -> Result<Declaration, DiErrorKind> {
        if wanted.is_builtin() {
            return Err(DiErrorKind::NotFound {
                dependency: wanted.clone(),
                rejections: Vec::new(),
            });
        }

        let dir = self.resolver.resolve_directory(&wanted.module_id)?;
        let package = self.parser.parse_package(&dir)?;
        let scan = Scan {
            module_id: &wanted.module_id,
            externals,
        };
        let mut rejections = Vec::new();

        for (file, func) in package.funcs() {
            if func.receiver.is_some() || !is_exported(&func.name) {
                continue;
            }
            if !scan.produces(file, func, wanted) {
                continue;
            }
            match scan.function(file, func) {
                Ok(function) => {
                    debug!(target: "weave::finder", dependency = %wanted, declaration = %func.name, "Found constructor function");
                    return Ok(Declaration::Function(function));
                }
                Err(reason) => {
                    trace!(target: "weave::finder", declaration = %func.name, %reason, "Rejected candidate");
                    rejections.push(Rejection {
                        declaration: format!("func {}", func.name),
                        reason,
                    });
                }
            }
        }

        for (file, decl) in package.structs() {
            if decl.name != wanted.type_name || !is_exported(&decl.name) {
                continue;
            }
            match scan.structure(file, decl, wanted.reference) {
                Ok(structure) => {
                    debug!(target: "weave::finder", dependency = %wanted, declaration = %decl.name, "Found struct");
                    return Ok(Declaration::Struct(structure));
                }
                Err(reason) => {
                    trace!(target: "weave::finder", declaration = %decl.name, %reason, "Rejected candidate");
                    rejections.push(Rejection {
                        declaration: format!("struct {}", decl.name),
                        reason,
                    });
                }
            }
        }

        debug!(target: "weave::finder", dependency = %wanted, rejected = rejections.len(), "No declaration found");
        Err(DiErrorKind::NotFound {
            dependency: wanted.clone(),
            rejections,
        })
    }
}

/// 单个包内的匹配上下文
struct Scan<'a> {
    module_id: &'a str,
    externals: &'a HashSet<String>,
}

impl Scan<'_> {
    /// 将源码中的命名类型解析为描述符
    fn resolve_named(
        &self,
        file: &SourceFile,
        qualifier: Option<&str>,
        name: &str,
    ) -> Result<Dependency, String> {
        match qualifier {
            Some(qualifier) => file
                .import_path(qualifier)
                .map(|path| Dependency::new(path, name))
                .ok_or_else(|| format!("unknown package qualifier '{qualifier}'")),
            None if is_builtin(name) => Ok(Dependency::builtin(name)),
            None => Ok(Dependency::new(self.module_id, name)),
        }
    }

    /// 函数的第一个返回值是否为 `wanted`，第二个（若有）是否为 error
    fn produces(&self, file: &SourceFile, func: &FuncDecl, wanted: &Dependency) -> bool {
        let produced = match func.results.as_slice() {
            [first] => first,
            [first, second] if is_error_type(&second.ty) => first,
            _ => return false,
        };
        let (inner, _) = produced.ty.strip_pointer();
        let TypeExpr::Named { qualifier, name } = inner else {
            return false;
        };
        self.resolve_named(file, qualifier.as_deref(), name)
            .is_ok_and(|d| d.id() == wanted.id())
    }

    /// 参数或字段类型 → 依赖
    fn input(&self, file: &SourceFile, ty: &TypeExpr) -> Result<Dependency, String> {
        let (inner, reference) = ty.strip_pointer();
        match inner {
            TypeExpr::Named { qualifier, name } => {
                let dependency = self
                    .resolve_named(file, qualifier.as_deref(), name)?
                    .with_reference(reference);
                if dependency.is_builtin() && !self.externals.contains(&dependency.id()) {
                    return Err(format!("depends on builtin type '{ty}'"));
                }
                Ok(dependency)
            }
            TypeExpr::Pointer(_) => Err(format!("unsupported pointer type '{ty}'")),
            _ => Err(format!("unsupported type '{ty}'")),
        }
    }

    fn function(&self, file: &SourceFile, func: &FuncDecl) -> Result<Function, String> {
        let mut params = Vec::with_capacity(func.params.len());
        for (i, param) in func.params.iter().enumerate() {
            let dependency = self.input(file, &param.ty)?;
            params.push(Param {
                name: param.name.clone().unwrap_or_else(|| format!("p{i}")),
                dependency,
            });
        }

        let mut results = Vec::with_capacity(func.results.len());
        for result in &func.results {
            if is_error_type(&result.ty) {
                results.push(ResultField {
                    dependency: Dependency::builtin("error"),
                    is_error: true,
                });
                continue;
            }
            let (inner, reference) = result.ty.strip_pointer();
            let TypeExpr::Named { qualifier, name } = inner else {
                return Err(format!("unsupported result type '{}'", result.ty));
            };
            let dependency = self
                .resolve_named(file, qualifier.as_deref(), name)?
                .with_reference(reference);
            results.push(ResultField {
                dependency,
                is_error: false,
            });
        }

        Ok(Function {
            module_id: self.module_id.to_string(),
            name: func.name.clone(),
            params,
            results,
        })
    }

    fn structure(
        &self,
        file: &SourceFile,
        decl: &StructDecl,
        reference: bool,
    ) -> Result<Struct, String> {
        let fields = decl
            .fields
            .iter()
            .filter(|field| is_exported(&field.name))
            .map(|field: &FieldDecl| {
                self.input(file, &field.ty)
                    .map(|dependency| Field {
                        name: field.name.clone(),
                        dependency,
                    })
                    .map_err(|reason| format!("field {}: {reason}", field.name))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Struct {
            module_id: self.module_id.to_string(),
            name: decl.name.clone(),
            needs_reference_wrap: reference,
            fields,
        })
    }
}

fn is_error_type(ty: &TypeExpr) -> bool {
    matches!(ty, TypeExpr::Named { qualifier: None, name } if name == "error")
}
