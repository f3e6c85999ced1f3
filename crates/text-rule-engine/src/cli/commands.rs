//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// 文本规则命令行工具
///
/// 使用 `--help` 查看各子命令的详细说明。
#[derive(Parser, Debug)]
#[command(name = "rule-cli")]
#[command(version, about = "文本规则编译与求值工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置文件
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// 输出紧凑 JSON
    #[arg(long)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 编译规则并输出表达式树
    Compile {
        /// 规则文本，词法单元以空格分隔
        rule: String,
    },

    /// 校验规则结构
    ///
    /// 提供数据时同时校验规则引用的属性是否齐全。
    Validate {
        /// 规则文本
        rule: String,

        #[command(flatten)]
        data: DataArgs,
    },

    /// 对数据求值
    ///
    /// 多次传入 `--rule` 时按顺序以 AND 组合。
    Evaluate {
        /// 规则文本（可重复）
        #[arg(short, long = "rule", required = true)]
        rules: Vec<String>,

        #[command(flatten)]
        data: DataArgs,

        /// 输出评估追踪
        #[arg(long)]
        trace: bool,
    },
}

/// 数据来源参数
#[derive(Args, Debug, Default, Clone)]
pub struct DataArgs {
    /// JSON 对象形式的数据
    #[arg(short, long, conflicts_with = "data_file")]
    pub data: Option<String>,

    /// 包含 JSON 对象的文件
    #[arg(long)]
    pub data_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_evaluate_with_repeated_rules() {
        let cli = Cli::try_parse_from([
            "rule-cli",
            "evaluate",
            "-r",
            "age > 30",
            "--rule",
            "department = 'Sales'",
            "--data",
            r#"{"age": 35}"#,
            "--trace",
        ])
        .unwrap();

        match cli.command {
            Commands::Evaluate { rules, data, trace } => {
                assert_eq!(rules, vec!["age > 30", "department = 'Sales'"]);
                assert_eq!(data.data.as_deref(), Some(r#"{"age": 35}"#));
                assert!(trace);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_evaluate_requires_rule() {
        assert!(Cli::try_parse_from(["rule-cli", "evaluate", "--data", "{}"]).is_err());
    }

    #[test]
    fn test_data_sources_conflict() {
        assert!(
            Cli::try_parse_from([
                "rule-cli",
                "validate",
                "age > 1",
                "--data",
                "{}",
                "--data-file",
                "data.json",
            ])
            .is_err()
        );
    }

    #[test]
    fn test_global_flags() {
        let cli =
            Cli::try_parse_from(["rule-cli", "--compact", "-l", "debug", "compile", "a = 1"])
                .unwrap();
        assert!(cli.compact);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }
}
