//! 规则操作符定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 二元操作符
///
/// 逻辑操作符（AND/OR）优先级为 1，比较操作符（`>`、`<`、`=`）优先级为 2，
/// 同优先级左结合。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    // 逻辑组合
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,

    // 比较
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "=")]
    Eq,
}

impl Operator {
    /// 所有操作符，按关键字匹配顺序排列
    pub const ALL: [Operator; 5] = [Self::And, Self::Or, Self::Gt, Self::Lt, Self::Eq];

    /// 从规则文本中的关键字解析操作符（大小写敏感）
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// 规则文本中的关键字
    pub fn symbol(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Eq => "=",
        }
    }

    /// 中缀转后缀时使用的优先级
    pub fn precedence(self) -> u8 {
        match self {
            Self::And | Self::Or => 1,
            Self::Gt | Self::Lt | Self::Eq => 2,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
