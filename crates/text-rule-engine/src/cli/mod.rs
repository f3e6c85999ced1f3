//! CLI 模块
//!
//! 提供命令行接口，支持以下功能：
//!
//! - `compile` - 编译规则并输出表达式树
//! - `validate` - 校验规则结构，可选校验数据的属性完整性
//! - `evaluate` - 编译、组合多条规则并对数据求值
//!
//! # 使用示例
//!
//! ```bash
//! # 编译规则
//! rule-cli compile "age > 30 AND department = 'Sales'"
//!
//! # 校验规则与数据
//! rule-cli validate "salary > 50000" --data '{"age": 30}'
//!
//! # 组合两条规则并求值
//! rule-cli evaluate -r "age > 30" -r "department = 'Sales'" \
//!     --data '{"age": 35, "department": "Sales"}' --trace
//! ```
//!
//! 结果以 JSON 输出到标准输出；规则错误输出 `{"error", "code"}`，
//! 编译期错误退出码为 1，其余规则错误为 2。

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands};
pub use runner::CommandRunner;
