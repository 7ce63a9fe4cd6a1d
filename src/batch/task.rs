//! # 单文件转换任务
//!
//! 一个 PCAP 文件 -> 一个 CSV 文件，是分发给 worker 的最小工作单元。
//!
//! ## 流程
//! `Pending -> Resolving -> Decoding -> Writing -> Done`
//!
//! 任何失败都在任务边界转换为 `ConversionResult`，不会影响其他文件。
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs`, `commands/extract.rs` 调用
//! - 使用 `schema.rs`, `decoder.rs`, `table.rs`

use crate::config::Config;
use crate::decoder::{self, Decoded, Decoder};
use crate::error::{ExtractError, Result};
use crate::schema;
use crate::table::{DeferredTable, TableStats};

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 任务阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStage {
    Pending,
    Resolving,
    Decoding,
    Writing,
    Done,
}

impl fmt::Display for TaskStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStage::Pending => write!(f, "pending"),
            TaskStage::Resolving => write!(f, "resolving"),
            TaskStage::Decoding => write!(f, "decoding"),
            TaskStage::Writing => write!(f, "writing"),
            TaskStage::Done => write!(f, "done"),
        }
    }
}

/// 转换作业（由调度器创建，每个输入文件一个）
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub category: String,
    pub timestamp: bool,
    pub output_dir: PathBuf,
    pub config: Arc<Config>,
}

/// 结果类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Warning,
    Error,
}

/// 单文件转换结果
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub outcome: Outcome,
    pub file: String,
    pub message: String,
    pub elapsed: Duration,
    /// 失败发生时所处阶段（成功时为 `Done`）
    pub stage: TaskStage,
}

impl ConversionResult {
    fn new(outcome: Outcome, file: &str, message: String, stage: TaskStage, start: Instant) -> Self {
        ConversionResult {
            outcome,
            file: file.to_string(),
            message,
            elapsed: start.elapsed(),
            stage,
        }
    }
}

impl ConversionJob {
    /// 输入文件名（不含目录）
    pub fn file_name(&self) -> String {
        self.input
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.input.display().to_string())
    }

    /// 输出路径：`<output_dir>/<stem>.<ext>`
    pub fn output_path(&self) -> PathBuf {
        let stem = self
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        self.output_dir
            .join(format!("{}.{}", stem, self.config.output.extension))
    }

    /// 执行任务，总是返回一个结果
    pub fn run(&self, decoder: &dyn Decoder) -> ConversionResult {
        let start = Instant::now();
        let name = self.file_name();
        let mut stage = TaskStage::Pending;

        match self.convert(decoder, &mut stage) {
            Ok(Some((output, stats))) => {
                tracing::info!(file = %name, rows = stats.rows, flushes = stats.flushes, "converted");
                let out_name = output
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let message = format!(
                    "{} -> {} ({:.2}s)",
                    name,
                    out_name,
                    start.elapsed().as_secs_f64()
                );
                ConversionResult::new(Outcome::Success, &name, message, TaskStage::Done, start)
            }
            Ok(None) => ConversionResult::new(
                Outcome::Warning,
                &name,
                format!("{}: empty output", name),
                stage,
                start,
            ),
            Err(e) => {
                let message = match &e {
                    ExtractError::SchemaNotFound { .. }
                    | ExtractError::DecoderInvocationFailed { .. } => e.to_string(),
                    other => format!("{}: {}", name, other),
                };
                tracing::debug!(file = %name, %stage, error = %e, "task failed");
                ConversionResult::new(Outcome::Error, &name, message, stage, start)
            }
        }
    }

    fn convert(
        &self,
        decoder: &dyn Decoder,
        stage: &mut TaskStage,
    ) -> Result<Option<(PathBuf, TableStats)>> {
        *stage = TaskStage::Resolving;
        let fields = schema::resolve(&self.config, &self.category)?;
        let prefix = schema::prefix(&self.config, self.timestamp);

        *stage = TaskStage::Decoding;
        let args = decoder::build_args(
            &self.config.tshark,
            &self.input,
            &self.category,
            prefix,
            fields,
        );
        let output = self.output_path();
        let header = schema::header(prefix, fields);
        let mut table = DeferredTable::new(&output, &header, self.config.output.buffer_rows);

        // 解码与写入交替进行，写入失败时阶段记为 Writing
        let mut write_failed = false;
        let decoded = decoder::decode(decoder, &args, &self.file_name(), &mut |line: &str| {
            table.push_line(line).map_err(|e| {
                write_failed = true;
                e
            })
        });

        match decoded {
            Ok(Decoded::Records(_)) => {}
            Ok(Decoded::Empty) => {
                table.discard();
                return Ok(None);
            }
            Err(e) => {
                if write_failed {
                    *stage = TaskStage::Writing;
                }
                table.discard();
                return Err(e);
            }
        }

        *stage = TaskStage::Writing;
        let stats = table.finish()?.unwrap_or_default();

        *stage = TaskStage::Done;
        Ok(Some((output, stats)))
    }

    /// 不执行即判定失败（例如输出路径冲突）
    pub fn reject(&self, error: ExtractError) -> ConversionResult {
        let name = self.file_name();
        tracing::debug!(file = %name, error = %error, "task rejected");
        ConversionResult::new(
            Outcome::Error,
            &name,
            error.to_string(),
            TaskStage::Pending,
            Instant::now(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldSpec;
    use crate::decoder::testing::ScriptedDecoder;
    use std::fs;
    use std::path::Path;

    fn config() -> Arc<Config> {
        let mut config = Config::default();
        config.categories.insert(
            "48".to_string(),
            vec![
                FieldSpec::new("SAC", "010.SAC"),
                FieldSpec::new("SIC", "010.SIC"),
            ],
        );
        Arc::new(config)
    }

    fn job(dir: &Path, category: &str, timestamp: bool) -> ConversionJob {
        ConversionJob {
            input: dir.join("a.pcap"),
            category: category.to_string(),
            timestamp,
            output_dir: dir.to_path_buf(),
            config: config(),
        }
    }

    #[test]
    fn test_success_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let decoder = ScriptedDecoder::ok("1;2\n3;4\n");
        let result = job(dir.path(), "48", false).run(&decoder);

        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.stage, TaskStage::Done);
        assert!(result.message.starts_with("a.pcap -> a.csv ("));

        let content = fs::read_to_string(dir.path().join("a.csv")).unwrap();
        assert_eq!(content.lines().collect::<Vec<_>>(), ["SAC;SIC", "1;2", "3;4"]);
    }

    #[test]
    fn test_success_with_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let decoder = ScriptedDecoder::ok("100.5;1;2\n");
        let result = job(dir.path(), "48", true).run(&decoder);
        assert_eq!(result.outcome, Outcome::Success);

        let content = fs::read_to_string(dir.path().join("a.csv")).unwrap();
        assert_eq!(
            content.lines().collect::<Vec<_>>(),
            ["TIMESTAMP;SAC;SIC", "100.5;1;2"]
        );

        let calls = decoder.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains(&"frame.time_epoch".to_string()));
    }

    #[test]
    fn test_unknown_category_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let decoder = ScriptedDecoder::ok("1;2\n");
        let result = job(dir.path(), "62", false).run(&decoder);

        assert_eq!(result.outcome, Outcome::Error);
        assert_eq!(result.stage, TaskStage::Resolving);
        assert_eq!(result.message, "Table not found for CAT 62");
        assert!(decoder.calls.lock().unwrap().is_empty());
        assert!(!dir.path().join("a.csv").exists());
    }

    #[test]
    fn test_decoder_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let decoder = ScriptedDecoder::failing("  The file \"a.pcap\" doesn't exist.\n");
        let result = job(dir.path(), "48", false).run(&decoder);

        assert_eq!(result.outcome, Outcome::Error);
        assert_eq!(result.stage, TaskStage::Decoding);
        assert_eq!(result.message, "a.pcap: The file \"a.pcap\" doesn't exist.");
        assert!(!dir.path().join("a.csv").exists());
    }

    #[test]
    fn test_blank_output_is_warning() {
        let dir = tempfile::tempdir().unwrap();
        let decoder = ScriptedDecoder::ok("\n   \n");
        let result = job(dir.path(), "48", false).run(&decoder);

        assert_eq!(result.outcome, Outcome::Warning);
        assert_eq!(result.message, "a.pcap: empty output");
        assert!(!dir.path().join("a.csv").exists());
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let decoder = ScriptedDecoder::ok("1;2\n3;4\n5;6\n");
        let job = job(dir.path(), "48", true);

        job.run(&decoder);
        let first = fs::read(dir.path().join("a.csv")).unwrap();
        job.run(&decoder);
        let second = fs::read(dir.path().join("a.csv")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unwritable_output_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = job(dir.path(), "48", false);
        job.output_dir = dir.path().join("missing").join("nested");

        let result = job.run(&ScriptedDecoder::ok("1;2\n"));
        assert_eq!(result.outcome, Outcome::Error);
        assert_eq!(result.stage, TaskStage::Writing);
        assert!(result.message.starts_with("a.pcap: Failed to write file"));
    }

    #[test]
    fn test_decoder_failure_after_rows_removes_output() {
        let dir = tempfile::tempdir().unwrap();
        let decoder = ScriptedDecoder::with("1;2\n3;4\n", "cut short", false);
        let result = job(dir.path(), "48", false).run(&decoder);

        assert_eq!(result.outcome, Outcome::Error);
        assert_eq!(result.stage, TaskStage::Decoding);
        assert_eq!(result.message, "a.pcap: cut short");
        assert!(!dir.path().join("a.csv").exists());
    }

    #[test]
    fn test_custom_frame_fields_with_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = (*config()).clone();
        config.frame.push(FieldSpec::new("FRAME", "frame.number"));
        let mut job = job(dir.path(), "48", true);
        job.config = Arc::new(config);

        let decoder = ScriptedDecoder::ok("100.5;7;1;2\n");
        assert_eq!(job.run(&decoder).outcome, Outcome::Success);

        let content = fs::read_to_string(dir.path().join("a.csv")).unwrap();
        assert_eq!(
            content.lines().collect::<Vec<_>>(),
            ["TIMESTAMP;FRAME;SAC;SIC", "100.5;7;1;2"]
        );

        let calls = decoder.calls.lock().unwrap();
        let fields: Vec<_> = calls[0]
            .windows(2)
            .filter(|w| w[0] == "-e")
            .map(|w| w[1].as_str())
            .collect();
        assert_eq!(fields, ["frame.time_epoch", "frame.number", "010.SAC", "010.SIC"]);
    }

    #[test]
    fn test_reject_reports_without_running() {
        let dir = tempfile::tempdir().unwrap();
        let result = job(dir.path(), "48", false)
            .reject(ExtractError::Other("a.pcap: skipped".to_string()));
        assert_eq!(result.outcome, Outcome::Error);
        assert_eq!(result.stage, TaskStage::Pending);
        assert_eq!(result.message, "a.pcap: skipped");
    }
}
