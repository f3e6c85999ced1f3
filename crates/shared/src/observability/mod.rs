//! 统一可观测性模块
//!
//! 提供 logging 与 metrics 的统一初始化和管理。
//! 所有入口通过单一函数配置可观测性，确保一致的日志格式和指标命名。

pub mod metrics;
pub mod tracing;

use ::tracing::debug;
use anyhow::Result;
use serde::Deserialize;

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// 服务名称，用于标识日志来源
    pub service_name: String,

    /// 日志级别（如 "info", "debug"），RUST_LOG 优先
    pub log_level: String,

    /// 日志输出格式：json（结构化）或 pretty（人类可读）
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown-service".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// 注入服务名
    pub fn with_service_name(mut self, service_name: &str) -> Self {
        self.service_name = service_name.to_string();
        self
    }

    /// 覆盖日志级别（命令行参数优先于配置文件）
    pub fn with_log_level(mut self, log_level: Option<&str>) -> Self {
        if let Some(level) = log_level {
            self.log_level = level.to_string();
        }
        self
    }

    /// 是否输出 JSON 格式日志
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// 统一初始化可观测性
///
/// 初始化顺序：
/// 1. Tracing（日志）
/// 2. Metrics 描述（指标导出由宿主进程安装 recorder）
///
/// # Example
///
/// ```ignore
/// use rule_shared::observability::{init, ObservabilityConfig};
///
/// fn main() -> anyhow::Result<()> {
///     let config = ObservabilityConfig::default().with_service_name("rule-cli");
///     init(&config)?;
///
///     // 应用逻辑...
///
///     Ok(())
/// }
/// ```
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    tracing::init(config)?;
    metrics::describe_metrics();

    debug!(
        service = %config.service_name,
        log_level = %config.log_level,
        log_format = %config.log_format,
        "Observability initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs());
    }

    #[test]
    fn test_overrides() {
        let config = ObservabilityConfig {
            log_format: "JSON".to_string(),
            ..Default::default()
        }
        .with_service_name("rule-cli")
        .with_log_level(Some("debug"))
        .with_log_level(None);

        assert_eq!(config.service_name, "rule-cli");
        assert_eq!(config.log_level, "debug");
        assert!(config.json_logs());
    }
}
