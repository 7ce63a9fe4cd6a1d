//! # 字段表解析
//!
//! 根据 CAT 编号从配置中取出有序字段表。
//! 字段顺序同时决定 tshark `-e` 参数顺序与输出列顺序：
//! 启用时间戳时帧字段在前，随后是 CAT 字段。
//!
//! ## 依赖关系
//! - 被 `batch/task.rs` 调用
//! - 使用 `config.rs` 的 `Config`, `FieldSpec`

use crate::config::{Config, FieldSpec};
use crate::error::{ExtractError, Result};

/// 查找 CAT 对应的字段表（不存在或为空均视为未找到）
pub fn resolve<'a>(config: &'a Config, category: &str) -> Result<&'a [FieldSpec]> {
    match config.categories.get(category) {
        Some(fields) if !fields.is_empty() => Ok(fields.as_slice()),
        _ => Err(ExtractError::SchemaNotFound {
            category: category.to_string(),
        }),
    }
}

/// 前置的帧字段（未启用时间戳时为空）
pub fn prefix(config: &Config, timestamp: bool) -> &[FieldSpec] {
    if timestamp {
        &config.frame
    } else {
        &[]
    }
}

/// 输出表头
pub fn header(prefix: &[FieldSpec], fields: &[FieldSpec]) -> Vec<String> {
    prefix.iter().chain(fields).map(|f| f.key.clone()).collect()
}

/// 时间戳列名
pub const TIMESTAMP_COLUMN: &str = "TIMESTAMP";

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut config = Config::default();
        config.categories.insert(
            "48".to_string(),
            vec![
                FieldSpec::new("SAC", "010.SAC"),
                FieldSpec::new("SIC", "010.SIC"),
                FieldSpec::new("TOD", "140.TOD"),
            ],
        );
        config.categories.insert("21".to_string(), vec![]);
        config
    }

    #[test]
    fn test_resolve_preserves_order() {
        let config = config();
        let fields = resolve(&config, "48").unwrap();
        let keys: Vec<_> = fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["SAC", "SIC", "TOD"]);
    }

    #[test]
    fn test_resolve_absent_and_empty() {
        let config = config();
        assert!(matches!(
            resolve(&config, "62"),
            Err(ExtractError::SchemaNotFound { .. })
        ));
        assert!(matches!(
            resolve(&config, "21"),
            Err(ExtractError::SchemaNotFound { .. })
        ));
    }

    #[test]
    fn test_header_with_and_without_timestamp() {
        let config = config();
        let fields = resolve(&config, "48").unwrap();
        assert_eq!(header(prefix(&config, false), fields), ["SAC", "SIC", "TOD"]);
        assert_eq!(
            header(prefix(&config, true), fields),
            ["TIMESTAMP", "SAC", "SIC", "TOD"]
        );
    }

    #[test]
    fn test_custom_frame_fields_lead_header() {
        let mut config = config();
        config.frame.push(FieldSpec::new("FRAME", "frame.number"));
        let fields = resolve(&config, "48").unwrap();
        assert_eq!(
            header(prefix(&config, true), fields),
            ["TIMESTAMP", "FRAME", "SAC", "SIC", "TOD"]
        );
        assert!(prefix(&config, false).is_empty());
    }
}
