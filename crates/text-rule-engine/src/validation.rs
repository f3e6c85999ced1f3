//! 规则校验
//!
//! 提交规则前可用的两类独立检查：规则文本结构、上下文属性完整性。

use crate::compiler::compile;
use crate::error::{Result, RuleError};
use crate::models::DataContext;

/// 校验规则文本结构，错误类型与编译一致
pub fn validate(rule: &str) -> Result<()> {
    compile(rule).map(|_| ())
}

/// 校验上下文包含所有给定属性
///
/// 按给定顺序检查，返回第一个缺失的属性。
pub fn validate_attributes<I, S>(attributes: I, context: &DataContext) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for attribute in attributes {
        let name = attribute.as_ref();
        if !context.contains(name) {
            return Err(RuleError::MissingAttribute(name.to_string()));
        }
    }
    Ok(())
}
