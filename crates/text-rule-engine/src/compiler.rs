//! 规则编译器
//!
//! 规则字符串 → 词法单元 → 后缀序列 → 表达式树，并预提取规则引用的属性。

use crate::combiner;
use crate::error::{Result, RuleError};
use crate::models::{ExpressionNode, Operand};
use crate::postfix::to_postfix;
use crate::tokenizer::{Token, TokenKind, tokenize};
use chrono::{DateTime, Utc};
use rule_shared::observability::metrics;
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, instrument};

/// 将规则字符串编译为表达式树
pub fn compile(rule: &str) -> Result<ExpressionNode> {
    let tokens = tokenize(rule)?;
    let postfix = to_postfix(tokens)?;
    build_ast(postfix)
}

/// 由后缀序列构建表达式树
///
/// 操作符依次弹出右、左两个子树；结束时栈中必须恰好剩一个节点。
pub fn build_ast(postfix: Vec<Token>) -> Result<ExpressionNode> {
    let mut stack: Vec<ExpressionNode> = Vec::with_capacity(postfix.len());

    for token in postfix {
        match token.kind() {
            TokenKind::Operator(op) => {
                let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                    return Err(RuleError::MalformedExpression(format!(
                        "操作符 '{}' 缺少操作数",
                        op
                    )));
                };
                stack.push(ExpressionNode::operator(op, left, right));
            }
            TokenKind::LeftParen | TokenKind::RightParen => {
                return Err(RuleError::MalformedExpression(format!(
                    "后缀序列中不应出现括号 '{}'",
                    token
                )));
            }
            _ => stack.push(ExpressionNode::operand(operand_from_token(&token)?)),
        }
    }

    if stack.len() != 1 {
        return Err(RuleError::MalformedExpression(format!(
            "表达式应归约为单个根节点，实际剩余 {} 个",
            stack.len()
        )));
    }

    stack
        .pop()
        .ok_or_else(|| RuleError::MalformedExpression("表达式为空".to_string()))
}

/// 按词法分类转换为带类型的操作数
fn operand_from_token(token: &Token) -> Result<Operand> {
    let text = token.text();
    match token.kind() {
        TokenKind::Integer => text
            .parse::<i64>()
            .map(Operand::Integer)
            .map_err(|_| RuleError::MalformedExpression(format!("'{}' 不是合法的整数", text))),
        TokenKind::Text => Ok(Operand::Text(text.trim_matches('\'').to_string())),
        TokenKind::Identifier => Ok(Operand::Attribute(text.to_string())),
        TokenKind::Operator(_) | TokenKind::LeftParen | TokenKind::RightParen => Err(
            RuleError::MalformedExpression(format!("'{}' 不是操作数", text)),
        ),
    }
}

/// 编译后的规则
#[derive(Debug, Clone, Serialize)]
pub struct CompiledRule {
    /// 规则文本（组合规则为组合后树的文本形式）
    pub source: String,
    /// 表达式树
    pub root: ExpressionNode,
    /// 规则中引用的所有属性（用于求值前的完整性检查）
    pub required_attributes: BTreeSet<String>,
    /// 编译版本号（用于缓存失效）
    pub compile_version: u64,
    pub compiled_at: DateTime<Utc>,
}

impl CompiledRule {
    /// 获取根节点
    pub fn root(&self) -> &ExpressionNode {
        &self.root
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// 规则编译器
pub struct RuleCompiler {
    compile_version: u64,
}

impl RuleCompiler {
    pub fn new() -> Self {
        Self { compile_version: 0 }
    }

    /// 编译规则字符串
    #[instrument(skip(self))]
    pub fn compile(&mut self, rule: &str) -> Result<CompiledRule> {
        let start = Instant::now();
        let root = compile(rule).inspect_err(|e| {
            metrics::record_rule_compilation(e.code(), start.elapsed().as_secs_f64());
        })?;
        metrics::record_rule_compilation("success", start.elapsed().as_secs_f64());

        let compiled = self.wrap(rule.trim().to_string(), root);
        debug!(
            version = compiled.compile_version,
            attributes = compiled.required_attributes.len(),
            "规则已编译"
        );
        Ok(compiled)
    }

    /// 以 AND 组合多条已编译规则
    #[instrument(skip(self, rules), fields(count = rules.len()))]
    pub fn combine(&mut self, rules: Vec<CompiledRule>) -> Result<CompiledRule> {
        let count = rules.len();
        let root = combiner::combine(rules.into_iter().map(|r| r.root)).inspect_err(|e| {
            metrics::record_rule_combination(count, e.code());
        })?;
        metrics::record_rule_combination(count, "success");
        Ok(self.wrap(root.to_string(), root))
    }

    fn wrap(&mut self, source: String, root: ExpressionNode) -> CompiledRule {
        self.compile_version += 1;
        CompiledRule {
            source,
            required_attributes: root.referenced_attributes().into_iter().collect(),
            root,
            compile_version: self.compile_version,
            compiled_at: Utc::now(),
        }
    }
}

impl Default for RuleCompiler {
    fn default() -> Self {
        Self::new()
    }
}
