//! 规则引擎错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    // ==================== 编译期错误 ====================
    #[error("无法识别的词法单元: '{token}' (位置 {position})")]
    MalformedToken { token: String, position: usize },

    #[error("规则表达式为空")]
    EmptyExpression,

    #[error("括号不匹配: {0}")]
    UnbalancedParenthesis(String),

    #[error("规则表达式结构无效: {0}")]
    MalformedExpression(String),

    // ==================== 求值期错误 ====================
    #[error("属性不存在: {0}")]
    MissingAttribute(String),

    #[error("类型不匹配: 期望 {expected}, 实际 {actual}")]
    TypeMismatch { expected: String, actual: String },

    // ==================== 组合/存储错误 ====================
    #[error("待组合的规则集合为空")]
    EmptyRuleSet,

    #[error("规则未找到: {0}")]
    RuleNotFound(u64),

    #[error("JSON 序列化错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl RuleError {
    /// 稳定的错误码，供调用方（CLI、HTTP 层等）转换为自己的错误表示
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedToken { .. } => "MALFORMED_TOKEN",
            Self::EmptyExpression => "EMPTY_EXPRESSION",
            Self::UnbalancedParenthesis(_) => "UNBALANCED_PARENTHESIS",
            Self::MalformedExpression(_) => "MALFORMED_EXPRESSION",
            Self::MissingAttribute(_) => "MISSING_ATTRIBUTE",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::EmptyRuleSet => "EMPTY_RULE_SET",
            Self::RuleNotFound(_) => "RULE_NOT_FOUND",
            Self::JsonError(_) => "INVALID_JSON",
        }
    }

    /// 是否为编译期错误（规则文本本身有问题，重试无意义）
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedToken { .. }
                | Self::EmptyExpression
                | Self::UnbalancedParenthesis(_)
                | Self::MalformedExpression(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;
