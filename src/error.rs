//! # 统一错误处理模块
//!
//! 定义 asterix-extract 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// 统一错误类型
#[derive(Error, Debug)]
pub enum ExtractError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 配置错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse config file: {path}\nReason: {reason}")]
    ConfigParse { path: String, reason: String },

    #[error("Table not found for CAT {category}")]
    SchemaNotFound { category: String },

    // ─────────────────────────────────────────────────────────────
    // 外部解码器错误
    // ─────────────────────────────────────────────────────────────
    #[error("Decoder '{command}' could not be started: {reason}")]
    DecoderNotFound { command: String, reason: String },

    #[error("{file}: {stderr}")]
    DecoderInvocationFailed { file: String, stderr: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{file}: output {output} already claimed by {claimed_by}")]
    DuplicateOutput {
        file: String,
        output: String,
        claimed_by: String,
    },

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, ExtractError>;
