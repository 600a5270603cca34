//! 声明变体
//!
//! 函数与 struct 两种构造方式，各自报告自己的依赖并生成构造语句。

use super::dependency::Dependency;
use super::error::GenerateError;
use super::generator::Scope;
use super::provider::{FieldValue, Statement, Variable};
use super::names::ERROR_VARIABLE;

/// 构造能力
pub trait Construct {
    /// 声明 ID：`module.Name`
    fn id(&self) -> String;

    /// 按声明顺序列出依赖
    fn dependencies(&self) -> Vec<Dependency>;

    /// 用已生成的输入变量生成构造语句，返回输出变量
    fn generate(&self, scope: &mut Scope, inputs: &[Variable]) -> Result<Variable, GenerateError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub dependency: Dependency,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultField {
    pub dependency: Dependency,
    /// 约定的 error 返回值
    pub is_error: bool,
}

/// 构造函数 `func NewX(a *A, b B) (*X, error)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub module_id: String,
    pub name: String,
    pub params: Vec<Param>,
    pub results: Vec<ResultField>,
}

impl Function {
    pub fn is_fallible(&self) -> bool {
        self.results.last().is_some_and(|r| r.is_error)
    }

    fn output(&self) -> Option<&Dependency> {
        self.results
            .iter()
            .find(|r| !r.is_error)
            .map(|r| &r.dependency)
    }
}

impl Construct for Function {
    fn id(&self) -> String {
        format!("{}.{}", self.module_id, self.name)
    }

    fn dependencies(&self) -> Vec<Dependency> {
        self.params.iter().map(|p| p.dependency.clone()).collect()
    }

    fn generate(&self, scope: &mut Scope, inputs: &[Variable]) -> Result<Variable, GenerateError> {
        if inputs.len() != self.params.len() {
            return Err(GenerateError::ArityMismatch {
                subject: format!("func {}", self.name),
                expected: self.params.len(),
                found: inputs.len(),
            });
        }
        let output = self.output().ok_or_else(|| GenerateError::ArityMismatch {
            subject: format!("results of func {}", self.name),
            expected: 1,
            found: 0,
        })?;

        let callee = scope.qualify(&self.module_id, &self.name);
        let variable = scope.variable(output);
        let args = self
            .params
            .iter()
            .zip(inputs)
            .map(|(param, input)| input.expr_for(&param.dependency))
            .collect();

        let mut outputs = vec![variable.name.clone()];
        if self.is_fallible() {
            outputs.push(ERROR_VARIABLE.to_string());
        }
        scope.emit(Statement::Call {
            outputs,
            callee,
            args,
        });
        if self.is_fallible() {
            scope.error_guard();
        }
        Ok(variable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub dependency: Dependency,
}

/// struct 字面量 `&X{A: a, B: b}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Struct {
    pub module_id: String,
    pub name: String,
    /// 请求的是指针形式时需要取址
    pub needs_reference_wrap: bool,
    /// 导出字段，按声明顺序
    pub fields: Vec<Field>,
}

impl Construct for Struct {
    fn id(&self) -> String {
        format!("{}.{}", self.module_id, self.name)
    }

    fn dependencies(&self) -> Vec<Dependency> {
        self.fields.iter().map(|f| f.dependency.clone()).collect()
    }

    fn generate(&self, scope: &mut Scope, inputs: &[Variable]) -> Result<Variable, GenerateError> {
        if inputs.len() != self.fields.len() {
            return Err(GenerateError::ArityMismatch {
                subject: format!("struct {}", self.name),
                expected: self.fields.len(),
                found: inputs.len(),
            });
        }

        let type_expr = scope.qualify(&self.module_id, &self.name);
        let produced = Dependency::new(self.module_id.as_str(), self.name.as_str())
            .with_reference(self.needs_reference_wrap);
        let variable = scope.variable(&produced);
        let fields = self
            .fields
            .iter()
            .zip(inputs)
            .map(|(field, input)| FieldValue {
                name: field.name.clone(),
                value: input.expr_for(&field.dependency),
            })
            .collect();

        scope.emit(Statement::Composite {
            output: variable.name.clone(),
            type_expr,
            reference: self.needs_reference_wrap,
            fields,
        });
        Ok(variable)
    }
}

/// 声明（函数或 struct）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Function(Function),
    Struct(Struct),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Function(f) => &f.name,
            Declaration::Struct(s) => &s.name,
        }
    }

    /// 如 `func NewDB`、`struct Config`
    pub fn describe(&self) -> String {
        match self {
            Declaration::Function(f) => format!("func {}", f.name),
            Declaration::Struct(s) => format!("struct {}", s.name),
        }
    }

    /// 产出的是否为指针
    pub fn produces_reference(&self) -> bool {
        match self {
            Declaration::Function(f) => f.output().is_some_and(|d| d.reference),
            Declaration::Struct(s) => s.needs_reference_wrap,
        }
    }

    pub fn is_fallible(&self) -> bool {
        match self {
            Declaration::Function(f) => f.is_fallible(),
            Declaration::Struct(_) => false,
        }
    }

    fn inner(&self) -> &dyn Construct {
        match self {
            Declaration::Function(f) => f,
            Declaration::Struct(s) => s,
        }
    }
}

impl Construct for Declaration {
    fn id(&self) -> String {
        self.inner().id()
    }

    fn dependencies(&self) -> Vec<Dependency> {
        self.inner().dependencies()
    }

    fn generate(&self, scope: &mut Scope, inputs: &[Variable]) -> Result<Variable, GenerateError> {
        self.inner().generate(scope, inputs)
    }
}
