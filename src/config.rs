//! # 配置文件
//!
//! 读取 `config.toml`：tshark 路径与参数、帧字段表、各 CAT 的字段表、输出选项。
//!
//! 帧字段（`[[frame]]`）在启用 `--ts` 时排在 CAT 字段之前，
//! 缺省为单个 `TIMESTAMP = frame.time_epoch`。
//!
//! 配置在启动时加载一次，之后只读，由 `Arc<Config>` 在所有任务间共享。
//!
//! ## 依赖关系
//! - 被 `main.rs`, `schema.rs`, `batch/task.rs` 使用
//! - 使用 `serde` + `toml` 反序列化

use crate::decoder::TIMESTAMP_FIELD;
use crate::error::{ExtractError, Result};
use crate::schema::TIMESTAMP_COLUMN;

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 默认配置文件名（位于当前工作目录）
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// 默认输出扩展名
pub const DEFAULT_EXTENSION: &str = "csv";

/// 写入缓冲的默认行数
pub const DEFAULT_BUFFER_ROWS: usize = 10_000;

/// 完整配置
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// 解码器（tshark）配置
    #[serde(default)]
    pub tshark: DecoderConfig,

    /// 帧级字段（与 CAT 无关），启用时间戳时前置
    #[serde(default = "default_frame")]
    pub frame: Vec<FieldSpec>,

    /// CAT 编号 -> 字段表
    #[serde(default)]
    pub categories: HashMap<String, Vec<FieldSpec>>,

    /// 输出选项
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tshark: DecoderConfig::default(),
            frame: default_frame(),
            categories: HashMap::new(),
            output: OutputConfig::default(),
        }
    }
}

/// 解码器配置
#[derive(Debug, Clone, Deserialize)]
pub struct DecoderConfig {
    /// 可执行文件路径
    #[serde(default = "default_decoder_path")]
    pub path: String,

    /// 透传给解码器的参数
    #[serde(default)]
    pub parameters: Vec<String>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            path: default_decoder_path(),
            parameters: Vec::new(),
        }
    }
}

/// 单个字段：输出列名 + 解码器字段表达式
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl FieldSpec {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        FieldSpec {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// 输出选项
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default = "default_buffer_rows")]
    pub buffer_rows: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            extension: default_extension(),
            buffer_rows: default_buffer_rows(),
        }
    }
}

fn default_decoder_path() -> String {
    "tshark".to_string()
}

fn default_frame() -> Vec<FieldSpec> {
    vec![FieldSpec::new(TIMESTAMP_COLUMN, TIMESTAMP_FIELD)]
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_buffer_rows() -> usize {
    DEFAULT_BUFFER_ROWS
}

impl Config {
    /// 从文件加载配置
    pub fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(ExtractError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let text = fs::read_to_string(path).map_err(|e| ExtractError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::parse(&text, &path.display().to_string())
    }

    /// 从 TOML 文本解析配置
    pub fn parse(text: &str, origin: &str) -> Result<Config> {
        let mut config: Config = toml::from_str(text).map_err(|e| ExtractError::ConfigParse {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;

        if config.frame.is_empty() {
            config.frame = default_frame();
        }
        if config.output.buffer_rows == 0 {
            config.output.buffer_rows = 1;
        }
        if config.output.extension.trim().is_empty() {
            config.output.extension = default_extension();
        }

        Ok(config)
    }
}
