//! CLI 格式化输出
//!
//! 提供命令行友好的错误显示和源码上下文打印。

use std::path::Path;
use weave_api::WeaveError;
use weave_vfs::VirtualFileSystem;

/// 打印错误；解析错误附带源码上下文
pub fn print_error(e: &WeaveError, vfs: &dyn VirtualFileSystem, json: bool) {
    let report = e.to_report();
    if json {
        eprintln!("{}", report.to_json());
        return;
    }
    eprintln!("error: {}", report);

    let (Some(file), Some(line), Some(column)) = (&report.file, report.line, report.column) else {
        return;
    };
    eprintln!("  --> {}:{}:{}", file, line, column);
    if let Ok(source) = vfs.read_to_string(Path::new(file)) {
        eprint!("{}", source_context(&source, line, column));
    }
}

/// 源代码上下文（错误行前后几行）
pub fn source_context(source: &str, error_line: usize, error_col: usize) -> String {
    const CONTEXT_LINES: usize = 2;

    let lines: Vec<&str> = source.lines().collect();
    if error_line == 0 || error_line > lines.len() {
        return String::new();
    }

    let start_line = error_line.saturating_sub(CONTEXT_LINES).max(1);
    let end_line = (error_line + CONTEXT_LINES).min(lines.len());
    let width = end_line.to_string().len();

    let mut out = String::new();
    for line_idx in start_line..=end_line {
        out.push_str(&format!(
            "{:>width$} | {}\n",
            line_idx,
            lines[line_idx - 1],
            width = width
        ));
        if line_idx == error_line {
            out.push_str(&format!(
                "{} | {}^\n",
                " ".repeat(width),
                " ".repeat(error_col.saturating_sub(1))
            ));
        }
    }
    out
}
