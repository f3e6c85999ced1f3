//! 规则执行器
//!
//! 对编译后的规则求值，返回匹配结果和可选的评估追踪信息。

use crate::compiler::CompiledRule;
use crate::error::{Result, RuleError};
use crate::evaluator::ExpressionEvaluator;
use crate::models::{DataContext, EvaluationResult, ExpressionNode, Value};
use crate::operators::Operator;
use rule_shared::observability::metrics;
use std::time::Instant;

/// 规则执行器
pub struct RuleExecutor {
    /// 是否记录详细评估追踪
    trace_enabled: bool,
}

impl RuleExecutor {
    pub fn new() -> Self {
        Self {
            trace_enabled: false,
        }
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    /// 按配置开关追踪
    pub fn trace(mut self, enabled: bool) -> Self {
        self.trace_enabled = enabled;
        self
    }

    /// 执行规则评估
    pub fn execute(&self, rule: &CompiledRule, context: &DataContext) -> Result<EvaluationResult> {
        let start = Instant::now();

        let mut result = EvaluationResult::new(rule.source().to_string());

        let matched = self
            .evaluate_tree(rule.root(), context, &mut result.evaluation_trace)
            .and_then(ExpressionEvaluator::expect_bool);

        let elapsed = start.elapsed();
        match &matched {
            Ok(true) => metrics::record_rule_evaluation("matched", elapsed.as_secs_f64()),
            Ok(false) => metrics::record_rule_evaluation("not_matched", elapsed.as_secs_f64()),
            Err(e) => metrics::record_rule_evaluation(e.code(), elapsed.as_secs_f64()),
        }

        result.matched = matched?;
        result.evaluation_time_us = elapsed.as_micros() as i64;

        Ok(result)
    }

    /// 后序评估整棵树，启用追踪时按节点路径记录每个操作符的结果
    fn evaluate_tree(
        &self,
        root: &ExpressionNode,
        context: &DataContext,
        trace: &mut Vec<String>,
    ) -> Result<Value> {
        let mut steps = vec![Step::Visit(root, self.root_path())];
        let mut values: Vec<Value> = Vec::new();

        while let Some(step) = steps.pop() {
            match step {
                Step::Visit(ExpressionNode::Operand { operand }, _) => {
                    values.push(ExpressionEvaluator::resolve(operand, context)?);
                }
                Step::Visit(
                    ExpressionNode::Operator {
                        operator,
                        left,
                        right,
                    },
                    path,
                ) => {
                    let right_path = self.child_path(&path, "right");
                    let left_path = self.child_path(&path, "left");
                    steps.push(Step::Apply(*operator, path));
                    steps.push(Step::Visit(right.as_ref(), right_path));
                    steps.push(Step::Visit(left.as_ref(), left_path));
                }
                Step::Apply(operator, path) => {
                    let (right, left) = ExpressionEvaluator::pop_operands(&mut values, operator)?;
                    let value = ExpressionEvaluator::apply(operator, &left, &right)?;

                    if self.trace_enabled {
                        trace.push(format!(
                            "{}: {} {} {} => {}",
                            path, left, operator, right, value
                        ));
                    }

                    values.push(value);
                }
            }
        }

        values
            .pop()
            .ok_or_else(|| RuleError::MalformedExpression("表达式没有产生结果".to_string()))
    }

    fn root_path(&self) -> String {
        if self.trace_enabled {
            "root".to_string()
        } else {
            String::new()
        }
    }

    /// 未启用追踪时不拼接路径
    fn child_path(&self, parent: &str, side: &str) -> String {
        if self.trace_enabled {
            format!("{}.{}", parent, side)
        } else {
            String::new()
        }
    }
}

/// 评估待办步骤，附带节点路径
enum Step<'a> {
    Visit(&'a ExpressionNode, String),
    Apply(Operator, String),
}

impl Default for RuleExecutor {
    fn default() -> Self {
        Self::new()
    }
}
