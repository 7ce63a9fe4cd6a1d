//! # 批量执行器
//!
//! 在固定大小的 worker 池上并行执行转换任务。
//! worker 是线程而非进程；每个任务启动并独占自己的 tshark 子进程，
//! 任务之间只共享只读的 `Arc<Config>`。
//!
//! ## 功能
//! - 基于 rayon 的固定大小线程池，每个 worker 同时只执行一个任务
//! - 结果通过 channel 按完成顺序回传，不按提交顺序
//! - 进度条显示
//! - 结果统计与失败汇总
//!
//! ## 依赖关系
//! - 被 `commands/extract.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `batch/task.rs` 的 `ConversionResult`

use crate::batch::task::{ConversionResult, Outcome};
use crate::error::{ExtractError, Result};
use crate::utils::progress;

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    /// 成功数量
    pub success: usize,
    /// 警告数量（空输出）
    pub warnings: usize,
    /// 失败数量
    pub failed: usize,
    /// 失败详情 (文件名, 错误信息)
    pub failures: Vec<(String, String)>,
    /// 整批耗时
    pub elapsed: Duration,
}

impl BatchResult {
    /// 合并处理结果
    pub fn merge(&mut self, result: ConversionResult) {
        match result.outcome {
            Outcome::Success => self.success += 1,
            Outcome::Warning => self.warnings += 1,
            Outcome::Error => {
                self.failed += 1;
                self.failures.push((result.file, result.message));
            }
        }
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.success + self.warnings + self.failed
    }
}

/// 默认并行数：逻辑核数的一半，至少为 1
pub fn default_jobs() -> usize {
    (num_cpus::get() / 2).max(1)
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// 创建新的批量执行器（0 表示默认值）
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { default_jobs() } else { jobs };
        Self { jobs }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// 并行处理，每完成一个任务立即回调 `on_result`
    pub fn run<T, F, R>(&self, items: Vec<T>, processor: F, mut on_result: R) -> Result<BatchResult>
    where
        T: Sync,
        F: Fn(&T) -> ConversionResult + Sync,
        R: FnMut(&ConversionResult),
    {
        let start = Instant::now();
        let pb = progress::create_progress_bar(items.len() as u64, "Extracting");

        // 配置 rayon 线程池
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .thread_name(|i| format!("extract-worker-{}", i))
            .build()
            .map_err(|e| ExtractError::Other(format!("Failed to build worker pool: {}", e)))?;

        let (tx, rx) = mpsc::channel::<ConversionResult>();
        let mut batch_result = BatchResult::default();

        let items = &items;
        let processor = &processor;
        let pool = &pool;

        thread::scope(|scope| {
            scope.spawn(move || {
                pool.scope(|s| {
                    for item in items {
                        let tx = tx.clone();
                        s.spawn(move |_| {
                            let _ = tx.send(processor(item));
                        });
                    }
                });
                drop(tx);
            });

            // 所有发送端释放后循环结束
            for result in rx {
                pb.suspend(|| on_result(&result));
                pb.inc(1);
                batch_result.merge(result);
            }
        });

        pb.finish_and_clear();
        batch_result.elapsed = start.elapsed();

        Ok(batch_result)
    }
}
