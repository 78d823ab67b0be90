// 日志工具模块
//
// 封装 flexi_logger 的初始化和关闭操作，确保异步日志正确 flush

use crate::config::TraversalConfig;
use crate::core::{TraversalError, TraversalResult};
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use std::sync::Mutex;

/// 全局日志句柄，用于程序退出时 flush
static LOGGER_HANDLE: Mutex<Option<LoggerHandle>> = Mutex::new(None);

/// 初始化日志系统
///
/// 日志写入 `config.log.dir` 下的文件，按大小轮转，异步写入。
/// 重复初始化返回错误。
///
/// # Examples
/// ```no_run
/// use graphdb_traversal::config::TraversalConfig;
/// use graphdb_traversal::utils::logging;
///
/// let config = TraversalConfig::default();
/// logging::init(&config).expect("日志初始化失败");
/// ```
pub fn init(config: &TraversalConfig) -> TraversalResult<()> {
    let handle = Logger::try_with_str(&config.log.level)
        .map_err(|e| TraversalError::Config(format!("无效的日志级别 {}: {}", config.log.level, e)))?
        .log_to_file(
            FileSpec::default()
                .basename(&config.log.file)
                .directory(&config.log.dir),
        )
        .rotate(
            Criterion::Size(config.log.max_file_size),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.log.max_files),
        )
        .write_mode(WriteMode::Async)
        .append()
        .start()
        .map_err(|e| TraversalError::Internal(format!("启动日志系统失败: {}", e)))?;

    // 保存句柄供后续 flush 使用
    if let Ok(mut guard) = LOGGER_HANDLE.lock() {
        *guard = Some(handle);
    }

    log::info!("日志系统初始化完成: {}/{}", config.log.dir, config.log.file);
    Ok(())
}

/// 刷新并关闭日志系统
///
/// 在程序退出前调用，确保所有异步日志都已写入文件
pub fn shutdown() {
    if let Ok(mut guard) = LOGGER_HANDLE.lock() {
        if let Some(handle) = guard.take() {
            handle.flush();
        }
    }
}

/// 检查日志系统是否已初始化
pub fn is_initialized() -> bool {
    LOGGER_HANDLE
        .lock()
        .map(|guard| guard.is_some())
        .unwrap_or(false)
}
