//! 生成目标

use super::dependency::Dependency;

/// 一次生成的输入：要构造什么、调用方提供什么、哪些类型需要替换
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// 生成的函数名
    pub name: String,
    /// 生成代码所在的模块
    pub module_id: String,
    /// 调用方提供的参数
    pub params: Vec<Dependency>,
    /// 请求的结果，按顺序返回
    pub results: Vec<Dependency>,
    /// 类型替换 (from, to)，如接口 → 实现
    pub aliases: Vec<(Dependency, Dependency)>,
    pub hoist: bool,
}

impl Target {
    pub fn new(name: impl Into<String>, module_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module_id: module_id.into(),
            params: Vec::new(),
            results: Vec::new(),
            aliases: Vec::new(),
            hoist: false,
        }
    }

    pub fn with_param(mut self, param: Dependency) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_result(mut self, result: Dependency) -> Self {
        self.results.push(result);
        self
    }

    pub fn with_alias(mut self, from: Dependency, to: Dependency) -> Self {
        self.aliases.push((from, to));
        self
    }

    pub fn with_hoist(mut self, hoist: bool) -> Self {
        self.hoist = hoist;
        self
    }
}
