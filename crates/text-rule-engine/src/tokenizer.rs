//! 词法分析器
//!
//! 将规则字符串按空白切分为带分类的词法单元。

use crate::error::{Result, RuleError};
use crate::operators::Operator;
use std::fmt;

/// 词法单元分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// 纯数字整数字面量
    Integer,
    /// 以单引号开头的字符串字面量
    Text,
    /// 属性名（纯字母）
    Identifier,
    Operator(Operator),
    LeftParen,
    RightParen,
}

/// 词法单元：原始文本 + 分类
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 是否为操作数（整数、字符串、属性名）
    pub fn is_operand(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Integer | TokenKind::Text | TokenKind::Identifier
        )
    }

    /// 对单个文本片段分类
    ///
    /// 匹配顺序：操作符关键字与括号优先，其次整数、字符串、属性名。
    fn classify(text: &str) -> Option<TokenKind> {
        if let Some(op) = Operator::from_symbol(text) {
            return Some(TokenKind::Operator(op));
        }

        match text {
            "(" => return Some(TokenKind::LeftParen),
            ")" => return Some(TokenKind::RightParen),
            _ => {}
        }

        if text.chars().all(|c| c.is_ascii_digit()) {
            // 超出 i64 范围的数字视为无效
            return text.parse::<i64>().ok().map(|_| TokenKind::Integer);
        }

        if text.starts_with('\'') {
            return Some(TokenKind::Text);
        }

        if text.chars().all(char::is_alphabetic) {
            return Some(TokenKind::Identifier);
        }

        None
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// 将规则字符串切分为词法单元
///
/// 空白分隔，`split_whitespace` 保证每个片段非空。
pub fn tokenize(rule: &str) -> Result<Vec<Token>> {
    rule.split_whitespace()
        .enumerate()
        .map(|(position, text)| {
            Token::classify(text)
                .map(|kind| Token::new(kind, text))
                .ok_or_else(|| RuleError::MalformedToken {
                    token: text.to_string(),
                    position,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(rule: &str) -> Vec<TokenKind> {
        tokenize(rule).unwrap().iter().map(Token::kind).collect()
    }

    #[test]
    fn test_tokenize_simple_comparison() {
        assert_eq!(
            kinds("age > 30"),
            vec![
                TokenKind::Identifier,
                TokenKind::Operator(Operator::Gt),
                TokenKind::Integer,
            ]
        );
    }

    #[test]
    fn test_tokenize_grouping_and_strings() {
        let tokens = tokenize("( department = 'Sales' ) OR salary < 50000").unwrap();
        assert_eq!(tokens.len(), 9);
        assert_eq!(tokens[0].kind(), TokenKind::LeftParen);
        assert_eq!(tokens[3].kind(), TokenKind::Text);
        assert_eq!(tokens[3].text(), "'Sales'");
        assert_eq!(tokens[4].kind(), TokenKind::RightParen);
        assert_eq!(tokens[5].kind(), TokenKind::Operator(Operator::Or));
    }

    #[test]
    fn test_keywords_are_not_identifiers() {
        assert_eq!(
            kinds("a AND b"),
            vec![
                TokenKind::Identifier,
                TokenKind::Operator(Operator::And),
                TokenKind::Identifier,
            ]
        );
        // 小写 and 只是普通属性名
        assert_eq!(kinds("and"), vec![TokenKind::Identifier]);
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        assert_eq!(tokenize("  age\t>   30 \n").unwrap().len(), 3);
        assert!(tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_token() {
        match tokenize("age >= 30") {
            Err(RuleError::MalformedToken { token, position }) => {
                assert_eq!(token, ">=");
                assert_eq!(position, 1);
            }
            other => panic!("expected MalformedToken, got {:?}", other),
        }
    }

    #[test]
    fn test_attached_parenthesis_is_malformed() {
        assert!(matches!(
            tokenize("(age > 30 )"),
            Err(RuleError::MalformedToken { position: 0, .. })
        ));
    }

    #[test]
    fn test_mixed_alphanumeric_is_malformed() {
        assert!(tokenize("age2 > 3").is_err());
        assert!(tokenize("first_name = 'x'").is_err());
    }

    #[test]
    fn test_integer_overflow_is_malformed() {
        assert!(tokenize("balance > 99999999999999999999").is_err());
        assert!(tokenize("balance > 9223372036854775807").is_ok());
    }
}
