//! 命令执行器
//!
//! 负责执行各 CLI 子命令的具体逻辑，并把结果或规则错误写成 JSON。

use std::fs;
use std::io::Write;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use rule_shared::config::EngineConfig;

use crate::compiler::{RuleCompiler, compile};
use crate::error::RuleError;
use crate::executor::RuleExecutor;
use crate::models::DataContext;
use crate::store::RuleStore;
use crate::validation::{validate, validate_attributes};

use super::commands::{Commands, DataArgs};

/// 编译期错误的退出码
pub const EXIT_COMPILE_ERROR: u8 = 1;
/// 求值期错误的退出码
pub const EXIT_EVALUATION_ERROR: u8 = 2;
/// 输出表达式树 JSON 的最大深度，与 serde_json 读取时的嵌套上限一致
pub const MAX_JSON_TREE_DEPTH: usize = 128;

/// 命令执行器
///
/// 持有引擎配置，作为 CLI 与规则引擎之间的桥梁。
pub struct CommandRunner {
    pretty: bool,
    trace: bool,
}

impl CommandRunner {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            pretty: config.pretty_output,
            trace: config.trace,
        }
    }

    /// 强制紧凑输出
    pub fn compact(mut self, compact: bool) -> Self {
        if compact {
            self.pretty = false;
        }
        self
    }

    /// 执行命令，返回进程退出码
    ///
    /// 规则错误写成 `{"error", "code"}` 并映射为退出码；其余错误（读文件失败、
    /// 缺少数据参数等）原样返回给调用方。
    pub fn run<W: Write>(&self, command: Commands, out: &mut W) -> Result<u8> {
        let outcome = match command {
            Commands::Compile { rule } => self.run_compile(&rule),
            Commands::Validate { rule, data } => self.run_validate(&rule, &data),
            Commands::Evaluate { rules, data, trace } => self.run_evaluate(&rules, &data, trace),
        };

        match outcome {
            Ok(body) => {
                self.write(out, &body)?;
                Ok(0)
            }
            Err(err) => match err.downcast::<RuleError>() {
                Ok(rule_error) => {
                    warn!(code = rule_error.code(), "规则处理失败: {}", rule_error);
                    let body = json!({
                        "error": rule_error.to_string(),
                        "code": rule_error.code(),
                    });
                    self.write(out, &body)?;
                    Ok(exit_code(&rule_error))
                }
                Err(other) => Err(other),
            },
        }
    }

    /// 执行 compile 命令
    pub fn run_compile(&self, rule: &str) -> Result<serde_json::Value> {
        info!("编译规则");
        let compiled = RuleCompiler::new().compile(rule)?;
        let depth = compiled.root().depth();
        if depth > MAX_JSON_TREE_DEPTH {
            bail!(
                "表达式树深度 {} 超过 JSON 输出上限 {}，可用 validate 或 evaluate 处理",
                depth,
                MAX_JSON_TREE_DEPTH
            );
        }
        Ok(serde_json::to_value(&compiled)?)
    }

    /// 执行 validate 命令
    ///
    /// 提供数据时额外检查规则引用的属性是否都存在。
    pub fn run_validate(&self, rule: &str, data: &DataArgs) -> Result<serde_json::Value> {
        info!("校验规则");
        match load_data(data)? {
            None => validate(rule)?,
            Some(context) => {
                let tree = compile(rule)?;
                validate_attributes(tree.referenced_attributes(), &context)?;
            }
        }
        Ok(json!({ "valid": true }))
    }

    /// 执行 evaluate 命令
    ///
    /// 每条规则登记到临时仓库，多条规则按传入顺序组合后求值。
    pub fn run_evaluate(
        &self,
        rules: &[String],
        data: &DataArgs,
        trace: bool,
    ) -> Result<serde_json::Value> {
        let Some(context) = load_data(data)? else {
            bail!("evaluate 需要 --data 或 --data-file");
        };
        info!(rules = rules.len(), attributes = context.len(), "评估规则");

        let store = RuleStore::new();
        let ids = rules
            .iter()
            .map(|rule| store.create(rule))
            .collect::<crate::error::Result<Vec<_>>>()?;

        let rule_id = match ids.as_slice() {
            [single] => *single,
            _ => store.combine(&ids)?,
        };

        let trace = trace || self.trace;
        let executor = RuleExecutor::new().trace(trace);
        let result = store.evaluate(rule_id, &context, &executor)?;
        debug!(matched = result.matched, "评估完成");

        let mut body = json!({
            "result": result.matched,
            "rule_id": result.rule_id,
            "rule": result.rule_source,
            "evaluation_time_us": result.evaluation_time_us,
        });
        if trace {
            body["trace"] = json!(result.evaluation_trace);
        }
        Ok(body)
    }

    fn write<W: Write, T: Serialize>(&self, out: &mut W, body: &T) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, body)?;
        } else {
            serde_json::to_writer(&mut *out, body)?;
        }
        writeln!(out)?;
        Ok(())
    }
}

/// 规则错误对应的退出码
pub fn exit_code(error: &RuleError) -> u8 {
    if error.is_compile_error() {
        EXIT_COMPILE_ERROR
    } else {
        EXIT_EVALUATION_ERROR
    }
}

/// 按参数读取数据上下文，未提供时返回 None
fn load_data(args: &DataArgs) -> Result<Option<DataContext>> {
    let json = match (&args.data, &args.data_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("读取数据文件失败: {}", path.display()))?,
        (None, None) => return Ok(None),
    };
    Ok(Some(DataContext::from_json(&json)?))
}
