//! # 文件收集器
//!
//! 根据输入路径收集待处理的 PCAP 文件列表。
//!
//! ## 功能
//! - 单文件输入直接返回
//! - 目录输入列出第一层所有条目（不递归，不按扩展名过滤，跳过隐藏条目）
//! - 无法读取的条目（如悬空符号链接）记录警告后跳过
//!
//! ## 依赖关系
//! - 被 `commands/extract.rs` 调用
//! - 使用 `walkdir` 遍历目录

use crate::error::{ExtractError, Result};

use std::path::PathBuf;
use walkdir::WalkDir;

/// 文件收集器
pub struct FileCollector {
    /// 输入路径
    input: PathBuf,
}

impl FileCollector {
    /// 创建新的文件收集器
    pub fn new(input: PathBuf) -> Self {
        Self { input }
    }

    /// 收集所有候选文件（按名称排序）
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if self.input.is_file() {
            return Ok(vec![self.input.clone()]);
        }

        if !self.input.is_dir() {
            return Err(ExtractError::DirectoryNotFound {
                path: self.input.display().to_string(),
            });
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(directory = %self.input.display(), error = %e, "skipping unreadable entry");
                    None
                }
            })
            .filter(|e| !is_hidden(e.file_name().to_string_lossy().as_ref()))
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        Ok(files)
    }
}

/// `.` 开头的条目视为隐藏
fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(".DS_Store"));
        assert!(!is_hidden("capture.pcap"));
        assert!(!is_hidden("capture.pcapng"));
    }

    #[test]
    fn test_collect_directory_without_filtering() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.pcap"), b"").unwrap();
        fs::write(dir.path().join("a.pcapng"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::write(dir.path().join(".hidden"), b"").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("deep.pcap"), b"").unwrap();

        let files = FileCollector::new(dir.path().to_path_buf()).collect().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["a.pcapng", "b.pcap", "notes.txt", "sub"]);
    }

    #[test]
    fn test_collect_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("one.pcap");
        fs::write(&file, b"").unwrap();

        let collector = FileCollector::new(file.clone());
        assert_eq!(collector.collect().unwrap(), vec![file]);
    }

    #[test]
    fn test_collect_empty_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileCollector::new(dir.path().to_path_buf())
            .collect()
            .unwrap()
            .is_empty());

        let err = FileCollector::new(dir.path().join("missing"))
            .collect()
            .unwrap_err();
        assert!(matches!(err, ExtractError::DirectoryNotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.pcap"), b"").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.pcap"), dir.path().join("b.pcap")).unwrap();

        let files = FileCollector::new(dir.path().to_path_buf()).collect().unwrap();
        assert_eq!(files, vec![dir.path().join("a.pcap")]);
    }
}
