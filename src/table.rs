//! # 表格输出
//!
//! 把解码器逐行输出写成 `;` 分隔的 CSV 文件。
//!
//! ## 功能
//! - 首行表头（可选 `TIMESTAMP` 列在最前）
//! - 每个非空输入行拆分为一行数据，顺序与输入一致
//! - 行先进入有界缓冲区，满后整体写出，最后写出剩余部分
//! - 最小引用（仅在必要时加引号）
//! - 输出文件在第一行记录到达时才创建，失败时删除
//!
//! ## 依赖关系
//! - 被 `batch/task.rs` 调用
//! - 使用 `csv` 库写入

use crate::decoder::FIELD_SEPARATOR;
use crate::error::{ExtractError, Result};

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// 输出列分隔符
pub const OUTPUT_DELIMITER: u8 = b';';

/// 写出统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    /// 数据行数（不含表头）
    pub rows: usize,
    /// 列数与表头不一致的行数
    pub mismatched: usize,
    /// 缓冲区写出次数
    pub flushes: usize,
}

/// 带行缓冲的表格写入器
pub struct TableWriter<W: Write> {
    writer: csv::Writer<W>,
    label: String,
    buffer: Vec<Vec<String>>,
    capacity: usize,
    width: usize,
    stats: TableStats,
}

impl TableWriter<File> {
    /// 创建输出文件并写入表头
    pub fn create(path: &Path, header: &[String], capacity: usize) -> Result<Self> {
        let file = File::create(path).map_err(|e| ExtractError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::new(file, path.display().to_string(), header, capacity)
    }
}

impl<W: Write> TableWriter<W> {
    pub fn new(inner: W, label: String, header: &[String], capacity: usize) -> Result<Self> {
        let terminator = if cfg!(windows) {
            csv::Terminator::CRLF
        } else {
            csv::Terminator::Any(b'\n')
        };

        // flexible: 字段内若含分隔符，列数会与表头不一致，仍按原样写出
        let mut writer = csv::WriterBuilder::new()
            .delimiter(OUTPUT_DELIMITER)
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(terminator)
            .flexible(true)
            .from_writer(inner);

        writer.write_record(header)?;

        let capacity = capacity.max(1);
        Ok(TableWriter {
            writer,
            label,
            buffer: Vec::with_capacity(capacity.min(1024)),
            capacity,
            width: header.len(),
            stats: TableStats::default(),
        })
    }

    /// 追加一行解码器输出（空行忽略）
    pub fn push_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            return Ok(());
        }

        let record: Vec<String> = line.split(FIELD_SEPARATOR).map(str::to_string).collect();
        if record.len() != self.width {
            self.stats.mismatched += 1;
        }

        self.buffer.push(record);
        self.stats.rows += 1;

        if self.buffer.len() >= self.capacity {
            self.flush_buffer()?;
        }
        Ok(())
    }

    fn flush_buffer(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        for record in self.buffer.drain(..) {
            self.writer.write_record(&record)?;
        }
        self.writer
            .flush()
            .map_err(|e| ExtractError::FileWriteError {
                path: self.label.clone(),
                source: e,
            })?;

        self.stats.flushes += 1;
        Ok(())
    }

    /// 写出剩余缓冲并关闭
    pub fn finish(mut self) -> Result<TableStats> {
        self.flush_buffer()?;
        self.writer
            .flush()
            .map_err(|e| ExtractError::FileWriteError {
                path: self.label.clone(),
                source: e,
            })?;

        if self.stats.mismatched > 0 {
            tracing::warn!(
                output = %self.label,
                rows = self.stats.mismatched,
                expected = self.width,
                "rows with unexpected field count"
            );
        }

        Ok(self.stats)
    }
}

/// 首行到达时才创建的输出文件
///
/// 解码器没有交付任何记录时不产生文件；失败时删除已写出的部分。
pub struct DeferredTable<'a> {
    path: &'a Path,
    header: &'a [String],
    capacity: usize,
    writer: Option<TableWriter<File>>,
}

impl<'a> DeferredTable<'a> {
    pub fn new(path: &'a Path, header: &'a [String], capacity: usize) -> Self {
        DeferredTable {
            path,
            header,
            capacity,
            writer: None,
        }
    }

    /// 追加一行，必要时先创建文件并写入表头
    pub fn push_line(&mut self, line: &str) -> Result<()> {
        if self.writer.is_none() {
            self.writer = Some(TableWriter::create(self.path, self.header, self.capacity)?);
        }
        match self.writer.as_mut() {
            Some(writer) => writer.push_line(line),
            None => Ok(()),
        }
    }

    /// 写出剩余缓冲；从未创建文件时返回 `None`
    pub fn finish(self) -> Result<Option<TableStats>> {
        let path = self.path;
        match self.writer {
            Some(writer) => writer.finish().map(Some).map_err(|e| {
                let _ = fs::remove_file(path);
                e
            }),
            None => Ok(None),
        }
    }

    /// 放弃输出并删除已创建的文件
    pub fn discard(self) {
        if let Some(writer) = self.writer {
            drop(writer);
            let _ = fs::remove_file(self.path);
        }
    }
}
