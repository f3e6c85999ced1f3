//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::observability::ObservabilityConfig;

/// 规则引擎配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 是否默认记录评估追踪
    pub trace: bool,
    /// 输出 JSON 是否格式化
    pub pretty_output: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trace: false,
            pretty_output: true,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub engine: EngineConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（RULE_ 前缀，双下划线分隔层级，如 RULE_ENGINE__TRACE -> engine.trace）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("RULE_ENV").unwrap_or_else(|_| "development".to_string());

        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::load_from(service_name, &env, Path::new(&config_dir))
    }

    /// 从指定目录加载配置
    pub fn load_from(service_name: &str, env: &str, config_dir: &Path) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            // 默认配置
            .set_default("service_name", service_name)?
            .set_default("environment", env)?
            // 加载默认配置文件
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // 加载环境特定配置
            .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
            // 加载服务特定配置（如 rule-cli.toml）
            .add_source(
                File::from(config_dir.join(format!("{}.toml", service_name))).required(false),
            )
            // 环境变量覆盖（RULE_OBSERVABILITY__LOG_LEVEL -> observability.log_level）
            .add_source(
                Environment::with_prefix("RULE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}
