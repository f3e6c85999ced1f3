//! 规则命令行工具
//!
//! 编译、校验文本规则并对 JSON 数据求值。

use std::io;
use std::process::ExitCode;

use clap::Parser;
use rule_engine::cli::{Cli, CommandRunner};
use rule_shared::config::AppConfig;
use rule_shared::observability;

const SERVICE_NAME: &str = "rule-cli";

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // 配置文件缺失或格式错误时退回默认值
    let config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    // 命令行日志级别优先于配置
    let obs_config = config
        .observability
        .clone()
        .with_service_name(SERVICE_NAME)
        .with_log_level(cli.log_level.as_deref());
    observability::init(&obs_config)?;

    let runner = CommandRunner::new(&config.engine).compact(cli.compact);
    let code = runner.run(cli.command, &mut io::stdout().lock())?;

    Ok(ExitCode::from(code))
}
