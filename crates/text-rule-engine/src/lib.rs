//! 文本规则引擎
//!
//! 将 `age > 30 AND department = 'Sales'` 这类规则文本编译为表达式树，支持：
//! - 词法分析与调度场算法（中缀转后缀）
//! - 二叉表达式树构建
//! - 多条规则以 AND 组合
//! - 基于属性记录的求值
//! - 内存规则注册表与命令行入口

pub mod cli;
pub mod combiner;
pub mod compiler;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod models;
pub mod operators;
pub mod postfix;
pub mod store;
pub mod tokenizer;
pub mod validation;


pub use combiner::combine;
pub use compiler::{CompiledRule, RuleCompiler, build_ast, compile};
pub use error::{Result, RuleError};
pub use evaluator::{ExpressionEvaluator, evaluate, matches};
pub use executor::RuleExecutor;
pub use models::{DataContext, EvaluationResult, ExpressionNode, Operand, Value};
pub use operators::Operator;
pub use postfix::to_postfix;
pub use store::{RuleId, RuleStore, RuleStoreStats};
pub use tokenizer::{Token, TokenKind, tokenize};
pub use validation::{validate, validate_attributes};
