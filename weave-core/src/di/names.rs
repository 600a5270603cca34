//! 生成代码中的标识符分配

use std::collections::HashSet;

/// 关键字与预声明标识符，永远不能作为变量名或 import 别名
const RESERVED: &[&str] = &[
    // 关键字
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
    // 预声明类型
    "any", "bool", "byte", "comparable", "complex64", "complex128", "error", "float32",
    "float64", "int", "int8", "int16", "int32", "int64", "rune", "string", "uint", "uint8",
    "uint16", "uint32", "uint64", "uintptr",
    // 预声明常量与函数
    "true", "false", "iota", "nil", "append", "cap", "clear", "close", "complex", "copy",
    "delete", "imag", "len", "make", "max", "min", "new", "panic", "print", "println", "real",
    "recover",
];

/// 错误变量的固定名字
pub const ERROR_VARIABLE: &str = "err";

/// 变量与 import 别名共用的名字表
#[derive(Debug, Clone)]
pub struct NameTable {
    taken: HashSet<String>,
}

impl NameTable {
    pub fn new() -> Self {
        let mut taken: HashSet<String> = RESERVED.iter().map(|s| s.to_string()).collect();
        taken.insert(ERROR_VARIABLE.to_string());
        Self { taken }
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// 依次尝试候选名，都被占用时在第一个候选后追加序号
    pub fn claim<I>(&mut self, candidates: I) -> String
    where
        I: IntoIterator<Item = String>,
    {
        let mut first = None;
        for candidate in candidates {
            if candidate.is_empty() {
                continue;
            }
            if !self.is_taken(&candidate) {
                self.taken.insert(candidate.clone());
                return candidate;
            }
            first.get_or_insert(candidate);
        }

        let base = first.unwrap_or_else(|| "v".to_string());
        let mut n = 2usize;
        loop {
            let name = format!("{base}{n}");
            if !self.is_taken(&name) {
                self.taken.insert(name.clone());
                return name;
            }
            n += 1;
        }
    }
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}

/// 类型名转小驼峰：`DB` → `db`，`HTTPClient` → `httpClient`，`Web` → `web`
pub fn lower_camel(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let upper = chars.iter().take_while(|c| c.is_uppercase()).count();
    let lowered = match upper {
        0 => 0,
        n if n == chars.len() => n,
        1 => 1,
        // 复数缩写：URLs、IDsByName
        n if chars[n] == 's' && chars.get(n + 1).map_or(true, |c| c.is_uppercase()) => n,
        // 保留缩写后紧跟单词的首字母
        n => n - 1,
    };
    chars
        .iter()
        .enumerate()
        .flat_map(|(i, c)| {
            if i < lowered {
                c.to_lowercase().collect::<Vec<_>>()
            } else {
                vec![*c]
            }
        })
        .collect()
}

/// import 路径的默认别名：最后一段，`vN` 版本段取前一段
pub fn import_base(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let segment = match segments.as_slice() {
        [.., previous, last] if is_version(last) => *previous,
        [.., last] => *last,
        [] => "pkg",
    };
    let sanitized: String = segment
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_lowercase();
    match sanitized.chars().next() {
        None => "pkg".to_string(),
        Some(c) if c.is_numeric() => format!("pkg{sanitized}"),
        Some(_) => sanitized,
    }
}

fn is_version(segment: &str) -> bool {
    segment.len() > 1
        && segment.starts_with('v')
        && segment[1..].chars().all(|c| c.is_ascii_digit())
}
