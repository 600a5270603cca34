//! API 类型定义
//!
//! 生成的输出类型。

use serde::Serialize;
use std::path::PathBuf;
use weave_core::Provider;

/// 一个目标的生成结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedFile {
    /// 目标函数名
    pub target: String,
    /// 输出文件路径
    pub path: PathBuf,
    pub provider: Provider,
    /// 渲染后的源文件
    pub source: String,
}
