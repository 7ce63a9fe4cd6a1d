//! # asterix-extract - ASTERIX PCAP -> CSV
//!
//! 使用 tshark 解码抓包文件中的 ASTERIX 记录，按配置的字段表输出 `;` 分隔的 CSV。
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     └── batch/     (文件收集、转换任务、并行执行)
//!   │           ├── schema.rs  (字段表解析)
//!   │           ├── decoder.rs (tshark 调用)
//!   │           └── table.rs   (CSV 输出)
//!   ├── config.rs   (配置文件)
//!   ├── utils/      (输出、进度条、日志)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod config;
mod decoder;
mod error;
mod schema;
mod table;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    utils::logger::init(cli.verbose);

    if let Err(e) = commands::run(cli) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
