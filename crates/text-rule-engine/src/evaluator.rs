//! 表达式求值器
//!
//! 深度优先后序求值（显式栈，不受树深度限制）：先左后右，两侧总会求值（逻辑操作不短路），
//! 比较操作要求两侧类型一致，不做数值/字符串之间的隐式转换。

use crate::error::{Result, RuleError};
use crate::models::{DataContext, ExpressionNode, Operand, Value};
use crate::operators::Operator;
use std::cmp::Ordering;

/// 对表达式树求值
pub fn evaluate(node: &ExpressionNode, context: &DataContext) -> Result<Value> {
    ExpressionEvaluator::evaluate(node, context)
}

/// 对表达式树求值，结果必须为布尔值
pub fn matches(node: &ExpressionNode, context: &DataContext) -> Result<bool> {
    ExpressionEvaluator::matches(node, context)
}

/// 表达式求值器
pub struct ExpressionEvaluator;

/// 后序求值的待办步骤
enum Step<'a> {
    Visit(&'a ExpressionNode),
    Apply(Operator),
}

impl ExpressionEvaluator {
    /// 后序求值
    ///
    /// 左侧先求值，属性缺失时优先报告左侧。
    pub fn evaluate(node: &ExpressionNode, context: &DataContext) -> Result<Value> {
        let mut steps = vec![Step::Visit(node)];
        let mut values: Vec<Value> = Vec::new();

        while let Some(step) = steps.pop() {
            match step {
                Step::Visit(ExpressionNode::Operand { operand }) => {
                    values.push(Self::resolve(operand, context)?);
                }
                Step::Visit(ExpressionNode::Operator {
                    operator,
                    left,
                    right,
                }) => {
                    steps.push(Step::Apply(*operator));
                    steps.push(Step::Visit(right.as_ref()));
                    steps.push(Step::Visit(left.as_ref()));
                }
                Step::Apply(operator) => {
                    let (right, left) = Self::pop_operands(&mut values, operator)?;
                    values.push(Self::apply(operator, &left, &right)?);
                }
            }
        }

        values
            .pop()
            .ok_or_else(|| RuleError::MalformedExpression("表达式没有产生结果".to_string()))
    }

    /// 弹出操作符的两个已求值操作数，返回 (右, 左)
    pub(crate) fn pop_operands(
        values: &mut Vec<Value>,
        operator: Operator,
    ) -> Result<(Value, Value)> {
        match (values.pop(), values.pop()) {
            (Some(right), Some(left)) => Ok((right, left)),
            _ => Err(RuleError::MalformedExpression(format!(
                "操作符 '{}' 缺少操作数",
                operator
            ))),
        }
    }

    /// 求值并要求顶层结果为布尔值
    pub fn matches(node: &ExpressionNode, context: &DataContext) -> Result<bool> {
        Self::expect_bool(Self::evaluate(node, context)?)
    }

    /// 顶层结果必须为布尔值
    pub fn expect_bool(value: Value) -> Result<bool> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(RuleError::TypeMismatch {
                expected: "boolean".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }

    /// 解析操作数：字面量原样返回，属性从上下文查找
    pub fn resolve(operand: &Operand, context: &DataContext) -> Result<Value> {
        match operand {
            Operand::Integer(n) => Ok(Value::Integer(*n)),
            Operand::Text(s) => Ok(Value::Text(s.clone())),
            Operand::Attribute(name) => context
                .get(name)
                .cloned()
                .ok_or_else(|| RuleError::MissingAttribute(name.clone())),
        }
    }

    /// 对两侧已求值的结果应用操作符
    pub fn apply(operator: Operator, left: &Value, right: &Value) -> Result<Value> {
        let result = match operator {
            Operator::And => left.truthy() & right.truthy(),
            Operator::Or => left.truthy() | right.truthy(),
            Operator::Gt => Self::compare(operator, left, right)? == Ordering::Greater,
            Operator::Lt => Self::compare(operator, left, right)? == Ordering::Less,
            Operator::Eq => Self::eq(left, right)?,
        };
        Ok(Value::Bool(result))
    }

    /// 相等比较：同类型才可比较
    fn eq(left: &Value, right: &Value) -> Result<bool> {
        match (left, right) {
            (Value::Integer(a), Value::Integer(b)) => Ok(a == b),
            (Value::Text(a), Value::Text(b)) => Ok(a == b),
            (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
            _ => Err(Self::mismatch(left, right)),
        }
    }

    /// 大小比较：整数按数值，字符串按字典序，布尔不支持
    fn compare(operator: Operator, left: &Value, right: &Value) -> Result<Ordering> {
        match (left, right) {
            (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
            (Value::Bool(_), Value::Bool(_)) => Err(RuleError::TypeMismatch {
                expected: format!("integer or string for '{}'", operator),
                actual: "boolean".to_string(),
            }),
            _ => Err(Self::mismatch(left, right)),
        }
    }

    fn mismatch(left: &Value, right: &Value) -> RuleError {
        RuleError::TypeMismatch {
            expected: left.type_name().to_string(),
            actual: right.type_name().to_string(),
        }
    }
}
