//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数。
//!
//! ## 参数
//! - `-f/--file` 或 `-d/--directory`：至少给出一个
//! - `-c/--category`：ASTERIX CAT（21, 23, 34, 48, 62）
//! - `--ts/--timestamp`：输出首列加入抓包时间
//! - `-j/--jobs`：并行 worker 数
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 参数传递给 `commands/extract.rs`

use clap::{ArgAction, ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;

/// asterix-extract - ASTERIX PCAP -> CSV (parallel)
#[derive(Parser, Debug)]
#[command(name = "asterix-extract")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Extract ASTERIX records from PCAP captures into CSV using tshark", long_about = None)]
#[command(group(ArgGroup::new("input").required(true).multiple(true).args(["file", "directory"])))]
pub struct Cli {
    /// Single PCAP file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Directory of PCAP files (every entry is processed)
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// ASTERIX category to extract
    #[arg(short, long, value_enum)]
    pub category: Category,

    /// Prepend the absolute capture timestamp column
    #[arg(long = "ts", visible_alias = "timestamp", default_value_t = false)]
    pub timestamp: bool,

    /// Number of parallel workers (0 = half the logical CPUs)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Directory for the CSV files
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Configuration file
    #[arg(long, env = "ASTERIX_EXTRACT_CONFIG", default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// 支持的 ASTERIX CAT
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Category {
    #[value(name = "21")]
    Cat021,
    #[value(name = "23")]
    Cat023,
    #[value(name = "34")]
    Cat034,
    #[value(name = "48")]
    Cat048,
    #[value(name = "62")]
    Cat062,
}

impl Category {
    /// 配置与过滤器中使用的编号
    pub fn id(&self) -> &'static str {
        match self {
            Category::Cat021 => "21",
            Category::Cat023 => "23",
            Category::Cat034 => "34",
            Category::Cat048 => "48",
            Category::Cat062 => "62",
        }
    }
}
