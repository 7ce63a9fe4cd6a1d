//! # 美化输出工具
//!
//! 提供统一的终端输出样式。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块和 `main.rs` 使用
//! - 使用 `colored`, `tabled` crate

use colored::Colorize;
use tabled::{Table, Tabled};

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}

/// 失败列表行
#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

/// 以表格打印失败文件（最多 `limit` 行）
pub fn print_failures(failures: &[(String, String)], limit: usize) {
    let rows: Vec<FailureRow> = failures
        .iter()
        .take(limit)
        .map(|(file, reason)| FailureRow {
            file: file.clone(),
            reason: reason.lines().next().unwrap_or_default().to_string(),
        })
        .collect();

    println!("{}", Table::new(rows));

    if failures.len() > limit {
        print_warning(&format!("  ... and {} more", failures.len() - limit));
    }
}
