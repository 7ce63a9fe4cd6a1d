//! # 命令执行模块
//!
//! 加载配置并执行提取命令。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `config.rs`, `decoder.rs`
//! - 子模块: extract

pub mod extract;

use crate::cli::Cli;
use crate::config::Config;
use crate::decoder::TsharkDecoder;
use crate::error::Result;

use std::sync::Arc;

/// 执行命令
pub fn run(cli: Cli) -> Result<()> {
    let config = Arc::new(Config::load(&cli.config)?);
    tracing::debug!(config = %cli.config.display(), categories = config.categories.len(), "config loaded");

    let decoder = TsharkDecoder::new(&config.tshark);
    let request = extract::ExtractRequest::from(&cli);

    extract::execute(&request, config, &decoder).map(|_| ())
}
