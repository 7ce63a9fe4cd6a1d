//! # 批量处理模块
//!
//! 把一个或多个 PCAP 文件分发到 worker 池并汇总结果。
//!
//! ## 功能
//! - 自动检测输入类型（文件/目录）
//! - 收集候选文件列表
//! - 单文件转换任务
//! - 并行处理，按完成顺序报告
//!
//! ## 依赖关系
//! - 被 `commands/extract.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;
pub mod task;

pub use collector::FileCollector;
pub use runner::{BatchResult, BatchRunner};
pub use task::{ConversionJob, ConversionResult, Outcome};
