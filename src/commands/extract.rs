//! # extract 命令实现
//!
//! 把 PCAP 中指定 CAT 的 ASTERIX 记录提取为 CSV。
//!
//! ## 功能
//! - 单文件模式：同步执行一个任务
//! - 目录模式：每个条目一个任务，并行执行，按完成顺序打印结果
//! - 多个输入映射到同一输出文件时只转换第一个，其余报告为失败
//! - 结束时打印统计与总耗时
//!
//! ## 依赖关系
//! - 使用 `cli/mod.rs` 定义的参数
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `utils/output.rs`

use crate::batch::{BatchResult, BatchRunner, ConversionJob, ConversionResult, FileCollector, Outcome};
use crate::cli::Cli;
use crate::config::Config;
use crate::decoder::Decoder;
use crate::error::{ExtractError, Result};
use crate::utils::output;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// 失败列表最多显示的行数
const MAX_LISTED_FAILURES: usize = 10;

/// 一次提取请求
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub file: Option<PathBuf>,
    pub directory: Option<PathBuf>,
    pub category: String,
    pub timestamp: bool,
    pub jobs: usize,
    pub output_dir: PathBuf,
}

impl From<&Cli> for ExtractRequest {
    fn from(cli: &Cli) -> Self {
        ExtractRequest {
            file: cli.file.clone(),
            directory: cli.directory.clone(),
            category: cli.category.id().to_string(),
            timestamp: cli.timestamp,
            jobs: cli.jobs,
            output_dir: cli.output_dir.clone(),
        }
    }
}

impl ExtractRequest {
    fn job(&self, input: PathBuf, config: &Arc<Config>) -> ConversionJob {
        ConversionJob {
            input,
            category: self.category.clone(),
            timestamp: self.timestamp,
            output_dir: self.output_dir.clone(),
            config: Arc::clone(config),
        }
    }
}

/// 执行提取
pub fn execute(
    request: &ExtractRequest,
    config: Arc<Config>,
    decoder: &dyn Decoder,
) -> Result<BatchResult> {
    output::print_header(&format!("ASTERIX CAT{:0>3} -> CSV", request.category));

    fs::create_dir_all(&request.output_dir).map_err(|e| ExtractError::FileWriteError {
        path: request.output_dir.display().to_string(),
        source: e,
    })?;

    // 同时给出 -f 与 -d 时以单文件为准
    if let Some(file) = &request.file {
        return Ok(execute_single_file(request, file.clone(), &config, decoder));
    }

    match &request.directory {
        Some(dir) => execute_batch(request, dir, &config, decoder),
        None => Err(ExtractError::InvalidArgument(
            "Use -f <file> or -d <directory>".to_string(),
        )),
    }
}

/// 单文件模式
fn execute_single_file(
    request: &ExtractRequest,
    file: PathBuf,
    config: &Arc<Config>,
    decoder: &dyn Decoder,
) -> BatchResult {
    output::print_info(&format!("Single file mode: '{}'", file.display()));

    let start = Instant::now();
    let result = request.job(file, config).run(decoder);
    report(&result);

    let mut batch = BatchResult::default();
    batch.merge(result);
    batch.elapsed = start.elapsed();
    batch
}

/// 目录模式
fn execute_batch(
    request: &ExtractRequest,
    dir: &Path,
    config: &Arc<Config>,
    decoder: &dyn Decoder,
) -> Result<BatchResult> {
    output::print_info(&format!("Batch mode: directory '{}'", dir.display()));

    let files = FileCollector::new(dir.to_path_buf()).collect()?;

    if files.is_empty() {
        output::print_warning(&format!("No PCAP files in {}", dir.display()));
        return Ok(BatchResult::default());
    }

    let runner = BatchRunner::new(request.jobs);
    output::print_info(&format!(
        "Processing {} files with {} workers",
        files.len(),
        runner.jobs()
    ));

    let (jobs, rejected) = claim_outputs(
        files
            .into_iter()
            .map(|file| request.job(file, config))
            .collect(),
    );
    for result in &rejected {
        report(result);
    }

    let mut result = runner.run(jobs, |job| job.run(decoder), report)?;
    for rejected in rejected {
        result.merge(rejected);
    }

    output::print_separator();
    output::print_done(&format!(
        "Batch complete: {} success, {} warnings, {} failed",
        result.success, result.warnings, result.failed
    ));

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        output::print_failures(&result.failures, MAX_LISTED_FAILURES);
    }

    output::print_done(&format!(
        "Finished in {:.2}s",
        result.elapsed.as_secs_f64()
    ));

    Ok(result)
}

/// 每个输出路径只分配给第一个作业（输入已排序），其余直接判定失败
fn claim_outputs(jobs: Vec<ConversionJob>) -> (Vec<ConversionJob>, Vec<ConversionResult>) {
    let mut owners: HashMap<PathBuf, String> = HashMap::new();
    let mut accepted = Vec::with_capacity(jobs.len());
    let mut rejected = Vec::new();

    for job in jobs {
        let output = job.output_path();
        match owners.get(&output) {
            Some(owner) => {
                let error = ExtractError::DuplicateOutput {
                    file: job.file_name(),
                    output: output
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| output.display().to_string()),
                    claimed_by: owner.clone(),
                };
                rejected.push(job.reject(error));
            }
            None => {
                owners.insert(output, job.file_name());
                accepted.push(job);
            }
        }
    }

    (accepted, rejected)
}

/// 打印单个结果
fn report(result: &ConversionResult) {
    match result.outcome {
        Outcome::Success => output::print_success(&result.message),
        Outcome::Warning => output::print_warning(&result.message),
        Outcome::Error => output::print_error(&result.message),
    }
}
