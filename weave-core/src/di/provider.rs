//! 生成产物
//!
//! [`Provider`] 是生成器的最终输出：函数签名、语句序列与 import 列表。
//! 渲染结果只取决于这些字段，相同输入总是得到相同文本。

use super::dependency::Dependency;
use serde::Serialize;

/// 生成函数体内的一个绑定
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    pub name: String,
    /// 变量的类型；`reference` 表示变量持有指针
    pub dependency: Dependency,
}

impl Variable {
    /// 按期望的形式引用该变量
    ///
    /// 只有类型一致而指针形式不同时才插入 `&` / `*`；别名替换得到的变量原样传递。
    pub fn expr_for(&self, expected: &Dependency) -> String {
        if expected.id() != self.dependency.id() || expected.reference == self.dependency.reference
        {
            self.name.clone()
        } else if expected.reference {
            format!("&{}", self.name)
        } else {
            format!("*{}", self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    /// 文件内使用的别名
    pub name: String,
    pub path: String,
    /// 包自身的 package 子句；未解析的包按路径推断
    pub package: String,
}

/// 由调用方传入的参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct External {
    pub variable: Variable,
    /// 渲染后的参数类型
    pub type_expr: String,
    /// 依赖 ID
    pub key: String,
    /// 是否由提升变换产生
    pub hoisted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValue {
    pub name: String,
    pub value: String,
}

/// 函数体语句
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    /// `a, err := pkg.New(x, y)`
    Call {
        outputs: Vec<String>,
        callee: String,
        args: Vec<String>,
    },
    /// `a := &pkg.T{F: x}`
    Composite {
        output: String,
        type_expr: String,
        reference: bool,
        fields: Vec<FieldValue>,
    },
    /// `if err != nil { return zeros..., err }`
    ErrorGuard { zeros: Vec<String> },
}

impl Statement {
    fn render(&self, out: &mut String) {
        match self {
            Statement::Call {
                outputs,
                callee,
                args,
            } => {
                out.push_str(&format!(
                    "\t{} := {}({})\n",
                    outputs.join(", "),
                    callee,
                    args.join(", ")
                ));
            }
            Statement::Composite {
                output,
                type_expr,
                reference,
                fields,
            } => {
                let amp = if *reference { "&" } else { "" };
                if fields.is_empty() {
                    out.push_str(&format!("\t{output} := {amp}{type_expr}{{}}\n"));
                } else {
                    out.push_str(&format!("\t{output} := {amp}{type_expr}{{\n"));
                    for field in fields {
                        out.push_str(&format!("\t\t{}: {},\n", field.name, field.value));
                    }
                    out.push_str("\t}\n");
                }
            }
            Statement::ErrorGuard { zeros } => {
                let mut values = zeros.clone();
                values.push("err".to_string());
                out.push_str("\tif err != nil {\n");
                out.push_str(&format!("\t\treturn {}\n", values.join(", ")));
                out.push_str("\t}\n");
            }
        }
    }
}

/// 返回值
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultValue {
    pub type_expr: String,
    pub value: String,
}

/// 生成产物
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provider {
    /// 函数名
    pub name: String,
    /// 目标模块标识符
    pub target: String,
    /// 目标包名
    pub package: String,
    /// 按路径排序
    pub imports: Vec<Import>,
    /// 按变量名排序
    pub externals: Vec<External>,
    pub statements: Vec<Statement>,
    pub results: Vec<ResultValue>,
    /// 是否追加 error 返回值
    pub fallible: bool,
}

impl Provider {
    /// 函数签名
    pub fn signature(&self) -> String {
        let params = self
            .externals
            .iter()
            .map(|e| format!("{} {}", e.variable.name, e.type_expr))
            .collect::<Vec<_>>()
            .join(", ");

        let mut results: Vec<&str> = self.results.iter().map(|r| r.type_expr.as_str()).collect();
        if self.fallible {
            results.push("error");
        }
        let results = match results.as_slice() {
            [] => String::new(),
            [single] => format!(" {single}"),
            many => format!(" ({})", many.join(", ")),
        };

        format!("func {}({}){}", self.name, params, results)
    }

    /// 渲染函数定义
    pub fn function(&self) -> String {
        let mut out = format!("{} {{\n", self.signature());
        for statement in &self.statements {
            statement.render(&mut out);
        }
        let mut values: Vec<&str> = self.results.iter().map(|r| r.value.as_str()).collect();
        if self.fallible {
            values.push("nil");
        }
        if !values.is_empty() {
            out.push_str(&format!("\treturn {}\n", values.join(", ")));
        }
        out.push_str("}\n");
        out
    }

    /// 渲染完整源文件
    pub fn file(&self) -> String {
        let mut out = String::from("// Code generated by weave. DO NOT EDIT.\n\n");
        out.push_str(&format!("package {}\n\n", self.package));
        if !self.imports.is_empty() {
            out.push_str("import (\n");
            for import in &self.imports {
                if import.package == import.name {
                    out.push_str(&format!("\t\"{}\"\n", import.path));
                } else {
                    out.push_str(&format!("\t{} \"{}\"\n", import.name, import.path));
                }
            }
            out.push_str(")\n\n");
        }
        out.push_str(&self.function());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> Provider {
        Provider {
            name: "InitializeWeb".to_string(),
            target: "example.com/app/cmd".to_string(),
            package: "cmd".to_string(),
            imports: vec![
                Import {
                    name: "db".to_string(),
                    path: "example.com/app/db".to_string(),
                    package: "db".to_string(),
                },
                Import {
                    name: "redis2".to_string(),
                    path: "github.com/redis/go-redis/v9".to_string(),
                    package: "go-redis".to_string(),
                },
            ],
            externals: vec![External {
                variable: Variable {
                    name: "config".to_string(),
                    dependency: Dependency::pointer("example.com/app/db", "Config"),
                },
                type_expr: "*db.Config".to_string(),
                key: "example.com/app/db.Config".to_string(),
                hoisted: false,
            }],
            statements: vec![
                Statement::Call {
                    outputs: vec!["dB".to_string(), "err".to_string()],
                    callee: "db.Open".to_string(),
                    args: vec!["config".to_string()],
                },
                Statement::ErrorGuard {
                    zeros: vec!["nil".to_string()],
                },
                Statement::Composite {
                    output: "web".to_string(),
                    type_expr: "Web".to_string(),
                    reference: true,
                    fields: vec![FieldValue {
                        name: "DB".to_string(),
                        value: "dB".to_string(),
                    }],
                },
            ],
            results: vec![ResultValue {
                type_expr: "*Web".to_string(),
                value: "web".to_string(),
            }],
            fallible: true,
        }
    }

    #[test]
    fn test_function_rendering() {
        assert_eq!(
            provider().function(),
            "func InitializeWeb(config *db.Config) (*Web, error) {\n\
             \tdB, err := db.Open(config)\n\
             \tif err != nil {\n\
             \t\treturn nil, err\n\
             \t}\n\
             \tweb := &Web{\n\
             \t\tDB: dB,\n\
             \t}\n\
             \treturn web, nil\n\
             }\n"
        );
    }

    #[test]
    fn test_file_rendering() {
        let file = provider().file();
        assert!(file.starts_with("// Code generated by weave. DO NOT EDIT.\n\npackage cmd\n\n"));
        assert!(file.contains("import (\n\t\"example.com/app/db\"\n\tredis2 \"github.com/redis/go-redis/v9\"\n)\n"));
        assert!(file.ends_with("return web, nil\n}\n"));
    }

    #[test]
    fn test_import_named_when_package_differs_from_path() {
        let mut provider = provider();
        provider.imports = vec![
            Import {
                name: "helpers".to_string(),
                path: "example.com/app/util".to_string(),
                package: "helpers".to_string(),
            },
            Import {
                name: "util".to_string(),
                path: "example.com/lib/util".to_string(),
                package: "strutil".to_string(),
            },
        ];
        let file = provider.file();
        assert!(file.contains(
            "import (\n\t\"example.com/app/util\"\n\tutil \"example.com/lib/util\"\n)\n"
        ));
    }

    #[test]
    fn test_single_result_without_error() {
        let mut provider = provider();
        provider.fallible = false;
        provider.externals.clear();
        assert_eq!(provider.signature(), "func InitializeWeb() *Web");
    }

    #[test]
    fn test_reference_adaptation() {
        let value = Variable {
            name: "db".to_string(),
            dependency: Dependency::new("example.com/app/db", "DB"),
        };
        let pointer = Variable {
            name: "db".to_string(),
            dependency: Dependency::pointer("example.com/app/db", "DB"),
        };
        let wants_pointer = Dependency::pointer("example.com/app/db", "DB");
        let wants_value = Dependency::new("example.com/app/db", "DB");
        assert_eq!(value.expr_for(&wants_pointer), "&db");
        assert_eq!(pointer.expr_for(&wants_value), "*db");
        assert_eq!(pointer.expr_for(&wants_pointer), "db");

        let interface = Dependency::new("io", "Writer");
        assert_eq!(pointer.expr_for(&interface), "db");
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(provider()).unwrap();
        assert_eq!(json["statements"][0]["kind"], "call");
        assert_eq!(json["statements"][1]["kind"], "error_guard");
        assert_eq!(json["statements"][2]["fields"][0]["name"], "DB");
        assert_eq!(
            json["externals"][0]["variable"]["dependency"]["type_name"],
            "Config"
        );
        assert_eq!(json["fallible"], true);
    }
}
