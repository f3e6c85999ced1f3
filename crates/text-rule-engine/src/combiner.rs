//! 规则组合
//!
//! 多棵表达式树按从左到右的顺序以 AND 折叠：`((r1 AND r2) AND r3) ...`

use crate::error::{Result, RuleError};
use crate::models::ExpressionNode;

/// 以 AND 组合多棵表达式树
///
/// 单棵树原样返回，不额外包装；空集合返回 [`RuleError::EmptyRuleSet`]。
/// 只会新建操作符节点包裹原有的根节点，不修改输入。
pub fn combine<I>(trees: I) -> Result<ExpressionNode>
where
    I: IntoIterator<Item = ExpressionNode>,
{
    let mut trees = trees.into_iter();
    let first = trees.next().ok_or(RuleError::EmptyRuleSet)?;
    Ok(trees.fold(first, ExpressionNode::and))
}
