//! # 外部解码器调用
//!
//! 构造 tshark 命令行并执行，逐行读取 stdout，stderr 在独立线程中转发到日志。
//!
//! ## 功能
//! - `Decoder` trait：外部进程边界，`invoke(args, on_line) -> DecoderStatus`
//! - `TsharkDecoder`：基于 `std::process::Command` 的真实实现，输出按行流式交付
//! - `build_args`：帧字段在前、CAT 字段在后，按顺序生成 `-e` 参数
//! - `decode`：把退出状态与输出解释为记录 / 空输出 / 错误
//!
//! 不做重试，也不设超时：解码器挂起时所在 worker 会一直等待。
//!
//! ## 依赖关系
//! - 被 `batch/task.rs` 调用
//! - 使用 `config.rs` 的 `DecoderConfig`, `FieldSpec`

use crate::config::{DecoderConfig, FieldSpec};
use crate::error::{ExtractError, Result};

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

/// 按 CAT 过滤的显示过滤器字段
pub const CATEGORY_FILTER_FIELD: &str = "asterix.category";

/// 绝对抓包时间字段
pub const TIMESTAMP_FIELD: &str = "frame.time_epoch";

/// 解码器输出字段分隔符
pub const FIELD_SEPARATOR: char = ';';

/// 逐行回调
pub type LineSink<'a> = dyn FnMut(&str) -> Result<()> + 'a;

/// 解码器退出状态
#[derive(Debug, Clone, Default)]
pub struct DecoderStatus {
    pub success: bool,
    /// 完整的 stderr 文本（失败时用于错误信息）
    pub stderr: String,
}

/// 外部解码器
pub trait Decoder: Send + Sync {
    /// 可执行文件名（用于日志与错误信息）
    fn program(&self) -> &str;

    /// 执行一次解码，stdout 的每一行（不含行尾）交给 `on_line`
    ///
    /// `on_line` 返回错误时应停止解码器并原样返回该错误。
    fn invoke(&self, args: &[String], on_line: &mut LineSink<'_>) -> Result<DecoderStatus>;
}

/// tshark 进程
pub struct TsharkDecoder {
    path: String,
}

impl TsharkDecoder {
    pub fn new(config: &DecoderConfig) -> Self {
        TsharkDecoder {
            path: config.path.clone(),
        }
    }
}

impl Decoder for TsharkDecoder {
    fn program(&self) -> &str {
        &self.path
    }

    fn invoke(&self, args: &[String], on_line: &mut LineSink<'_>) -> Result<DecoderStatus> {
        let mut child = Command::new(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExtractError::DecoderNotFound {
                command: self.path.clone(),
                reason: e.to_string(),
            })?;

        let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => (stdout, stderr),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ExtractError::Other(format!(
                    "{}: output pipes not available",
                    self.path
                )));
            }
        };

        let relay = thread::spawn(move || relay_stderr(stderr));

        // stdout 读完（或回调失败）后才等待退出，stdout 在此之前已被释放
        let streamed = stream_lines(stdout, on_line);
        if streamed.is_err() {
            let _ = child.kill();
        }
        let status = child.wait();
        let stderr = relay.join().unwrap_or_default();

        streamed?;
        let status = status.map_err(|e| ExtractError::Other(format!("{}: {}", self.path, e)))?;

        Ok(DecoderStatus {
            success: status.success(),
            stderr,
        })
    }
}

/// 按行读取，非 UTF-8 字节做有损替换
fn stream_lines<R: Read>(reader: R, on_line: &mut LineSink<'_>) -> Result<()> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| ExtractError::Other(format!("Failed to read decoder output: {}", e)))?;
        if n == 0 {
            return Ok(());
        }

        let line = String::from_utf8_lossy(&buf);
        on_line(line.trim_end_matches(|c| c == '\r' || c == '\n'))?;
    }
}

/// 转发 stderr 到日志，同时保留全文
fn relay_stderr<R: Read>(reader: R) -> String {
    let mut reader = BufReader::new(reader);
    let mut collected = String::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let trimmed = line.trim_end();
                if !trimmed.is_empty() {
                    tracing::info!("[tshark] {}", trimmed);
                }
                collected.push_str(&line);
            }
        }
    }

    collected
}

/// 生成解码器参数
///
/// 顺序：`-r <file>`，透传参数，`-Y <filter>`，帧字段 `-e`，CAT 字段 `-e`。
pub fn build_args(
    config: &DecoderConfig,
    input: &Path,
    category: &str,
    prefix: &[FieldSpec],
    fields: &[FieldSpec],
) -> Vec<String> {
    let mut args = Vec::with_capacity(config.parameters.len() + 2 * (prefix.len() + fields.len()) + 4);

    args.push("-r".to_string());
    args.push(input.to_string_lossy().to_string());
    args.extend(config.parameters.iter().cloned());
    args.push("-Y".to_string());
    args.push(format!("{}=={}", CATEGORY_FILTER_FIELD, category));

    for field in prefix.iter().chain(fields) {
        args.push("-e".to_string());
        args.push(field.value.clone());
    }

    args
}

/// 解码结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// 交付的非空记录行数
    Records(usize),
    /// 成功退出但没有匹配记录
    Empty,
}

/// 执行解码器，把非空行交给 `on_record`，并解释退出状态
///
/// 非零退出返回 `DecoderInvocationFailed`（附带去除首尾空白的 stderr），
/// 即使此前已经交付过记录。
pub fn decode(
    decoder: &dyn Decoder,
    args: &[String],
    file_name: &str,
    on_record: &mut LineSink<'_>,
) -> Result<Decoded> {
    tracing::debug!(program = decoder.program(), ?args, "invoking decoder");

    let mut records = 0usize;
    let status = decoder.invoke(args, &mut |line: &str| {
        if line.trim().is_empty() {
            return Ok(());
        }
        records += 1;
        on_record(line)
    })?;

    if !status.success {
        return Err(ExtractError::DecoderInvocationFailed {
            file: file_name.to_string(),
            stderr: status.stderr.trim().to_string(),
        });
    }

    if records == 0 {
        return Ok(Decoded::Empty);
    }

    Ok(Decoded::Records(records))
}
