use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::{TraversalError, TraversalResult, DEFAULT_MEMORY_LIMIT};
use crate::query::path_enumeration::{EnumeratorOptions, PathValidatorOptions};

/// 日志配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub dir: String,
    pub file: String,
    pub max_file_size: u64,
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
            file: "graphdb-traversal".to_string(),
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_files: 5,
        }
    }
}

/// 路径枚举配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct TraversalConfig {
    /// 单个查询的内存配额（字节）
    pub memory_limit: usize,
    /// 为组件包装追踪装饰器
    pub tracing: bool,
    pub log: LogConfig,
    pub enumerator: EnumeratorOptions,
    pub validator: PathValidatorOptions,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            memory_limit: DEFAULT_MEMORY_LIMIT,
            tracing: false,
            log: LogConfig::default(),
            enumerator: EnumeratorOptions::default(),
            validator: PathValidatorOptions::default(),
        }
    }
}

impl TraversalConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> TraversalResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| TraversalError::Config(format!("读取配置文件 {} 失败: {}", path.display(), e)))?;
        let config: TraversalConfig = toml::from_str(&content)?;
        config.enumerator.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> TraversalResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TraversalError::Config(format!("序列化配置失败: {}", e)))?;
        fs::write(path.as_ref(), content)
            .map_err(|e| TraversalError::Config(format!("写入配置文件失败: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{TraversalOrder, UniquenessLevel};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = TraversalConfig::default();
        assert_eq!(config.memory_limit, 256 * 1024 * 1024);
        assert!(!config.tracing);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.enumerator.min_depth, 1);
        assert_eq!(config.enumerator.max_depth, 1);
        assert_eq!(config.validator.vertex_uniqueness, UniquenessLevel::None);
        assert_eq!(config.validator.edge_uniqueness, UniquenessLevel::Path);
    }

    #[test]
    fn test_config_load_save() {
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");

        let mut config = TraversalConfig::default();
        config.tracing = true;
        config.enumerator = EnumeratorOptions::new(2, 5).with_order(TraversalOrder::Dfs);
        config.validator = PathValidatorOptions::new(UniquenessLevel::Global, UniquenessLevel::None);
        config.save(temp_file.path()).expect("Failed to save config");

        let loaded = TraversalConfig::load(temp_file.path()).expect("Failed to load config");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_partial_file_uses_defaults() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        temp_file
            .write_all(b"memory_limit = 4096\n\n[enumerator]\nmax_depth = 3\norder = \"weighted\"\n")
            .expect("Failed to write TOML content to temporary file");

        let loaded = TraversalConfig::load(temp_file.path()).expect("Failed to load config");
        assert_eq!(loaded.memory_limit, 4096);
        assert_eq!(loaded.enumerator.min_depth, 1);
        assert_eq!(loaded.enumerator.max_depth, 3);
        assert_eq!(loaded.enumerator.order, TraversalOrder::Weighted);
        assert_eq!(loaded.log, LogConfig::default());
    }

    #[test]
    fn test_config_rejects_invalid_content() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        temp_file
            .write_all(b"[enumerator]\nmin_depth = 4\nmax_depth = 2\n")
            .expect("Failed to write TOML content to temporary file");
        assert!(matches!(
            TraversalConfig::load(temp_file.path()),
            Err(TraversalError::Config(_))
        ));

        let missing = TraversalConfig::load("/nonexistent/graphdb-traversal.toml");
        assert!(matches!(missing, Err(TraversalError::Config(_))));
    }
}
