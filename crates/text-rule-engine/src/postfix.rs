//! 中缀转后缀
//!
//! 调度场算法：操作数直接输出，操作符按优先级出栈，括号只做分组。

use crate::error::{Result, RuleError};
use crate::operators::Operator;
use crate::tokenizer::{Token, TokenKind};

/// 操作符栈中的元素
enum StackEntry {
    Operator(Token, Operator),
    LeftParen,
}

/// 将中缀词法单元序列转换为后缀（逆波兰）序列
pub fn to_postfix(tokens: Vec<Token>) -> Result<Vec<Token>> {
    let mut stack: Vec<StackEntry> = Vec::new();
    let mut output: Vec<Token> = Vec::with_capacity(tokens.len());

    for token in tokens {
        match token.kind() {
            TokenKind::Integer | TokenKind::Text | TokenKind::Identifier => output.push(token),
            TokenKind::LeftParen => stack.push(StackEntry::LeftParen),
            TokenKind::RightParen => {
                // 弹出直到遇到左括号；栈空说明右括号多余
                loop {
                    match stack.pop() {
                        Some(StackEntry::Operator(op_token, _)) => output.push(op_token),
                        Some(StackEntry::LeftParen) => break,
                        None => {
                            return Err(RuleError::UnbalancedParenthesis(
                                "右括号 ')' 没有对应的左括号".to_string(),
                            ));
                        }
                    }
                }
            }
            TokenKind::Operator(op) => {
                // 同优先级左结合：栈顶优先级 >= 当前时先出栈
                while let Some(StackEntry::Operator(_, top)) = stack.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    if let Some(StackEntry::Operator(op_token, _)) = stack.pop() {
                        output.push(op_token);
                    }
                }
                stack.push(StackEntry::Operator(token, op));
            }
        }
    }

    while let Some(entry) = stack.pop() {
        match entry {
            StackEntry::Operator(op_token, _) => output.push(op_token),
            StackEntry::LeftParen => {
                return Err(RuleError::UnbalancedParenthesis(
                    "左括号 '(' 没有闭合".to_string(),
                ));
            }
        }
    }

    if output.is_empty() {
        return Err(RuleError::EmptyExpression);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn postfix(rule: &str) -> Result<String> {
        let tokens = to_postfix(tokenize(rule)?)?;
        Ok(tokens
            .iter()
            .map(Token::text)
            .collect::<Vec<_>>()
            .join(" "))
    }

    #[test]
    fn test_comparison_binds_tighter_than_logical() {
        assert_eq!(
            postfix("age > 30 AND department = 'Sales'").unwrap(),
            "age 30 > department 'Sales' = AND"
        );
    }

    #[test]
    fn test_same_precedence_is_left_associative() {
        assert_eq!(postfix("a AND b OR c").unwrap(), "a b AND c OR");
        assert_eq!(postfix("a OR b AND c").unwrap(), "a b OR c AND");
    }

    #[test]
    fn test_parentheses_override_precedence() {
        assert_eq!(postfix("a AND ( b OR c )").unwrap(), "a b c OR AND");
        assert_eq!(postfix("( ( a ) )").unwrap(), "a");
    }

    #[test]
    fn test_unmatched_right_paren() {
        assert!(matches!(
            postfix("age > 30 )"),
            Err(RuleError::UnbalancedParenthesis(_))
        ));
    }

    #[test]
    fn test_unclosed_left_paren() {
        assert!(matches!(
            postfix("( age > 30"),
            Err(RuleError::UnbalancedParenthesis(_))
        ));
    }

    #[test]
    fn test_empty_expression() {
        assert!(matches!(postfix(""), Err(RuleError::EmptyExpression)));
        assert!(matches!(postfix("( )"), Err(RuleError::EmptyExpression)));
    }
}
