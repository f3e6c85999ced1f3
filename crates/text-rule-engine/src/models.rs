//! 规则引擎领域模型

use crate::error::Result;
use crate::operators::Operator;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 操作数字面量
///
/// 类型在构建语法树时一次性确定，求值时不再重新推断。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Operand {
    Integer(i64),
    Text(String),
    /// 属性引用，求值时从上下文中查找
    Attribute(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "'{}'", s),
            Self::Attribute(name) => write!(f, "{}", name),
        }
    }
}

/// 表达式树节点
///
/// 子节点由父节点独占，构建完成后不可变，可在多线程间共享只读访问。
/// 树的深度只受输入长度限制，遍历、克隆、比较与释放都使用显式栈。
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExpressionNode {
    Operand {
        operand: Operand,
    },
    Operator {
        operator: Operator,
        left: Box<ExpressionNode>,
        right: Box<ExpressionNode>,
    },
}

impl ExpressionNode {
    pub fn operand(operand: Operand) -> Self {
        Self::Operand { operand }
    }

    pub fn integer(value: i64) -> Self {
        Self::operand(Operand::Integer(value))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::operand(Operand::Text(value.into()))
    }

    pub fn attribute(name: impl Into<String>) -> Self {
        Self::operand(Operand::Attribute(name.into()))
    }

    pub fn operator(operator: Operator, left: ExpressionNode, right: ExpressionNode) -> Self {
        Self::Operator {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: ExpressionNode, right: ExpressionNode) -> Self {
        Self::operator(Operator::And, left, right)
    }

    pub fn or(left: ExpressionNode, right: ExpressionNode) -> Self {
        Self::operator(Operator::Or, left, right)
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, Self::Operator { .. })
    }

    /// 先序遍历（父节点、左子树、右子树）
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }

    /// 规则引用的属性名，按首次出现（从左到右）排序且去重
    pub fn referenced_attributes(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for node in self.preorder() {
            if let Self::Operand {
                operand: Operand::Attribute(name),
            } = node
            {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    /// 树深度（单个操作数为 1）
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            if let Self::Operator { left, right, .. } = node {
                stack.push((left.as_ref(), level + 1));
                stack.push((right.as_ref(), level + 1));
            }
        }
        deepest
    }

    /// 节点总数
    pub fn node_count(&self) -> usize {
        self.preorder().count()
    }

    /// 不复制子树的占位节点
    fn placeholder() -> Self {
        Self::integer(0)
    }

    /// 把操作符子节点移出，原位置换成占位节点
    fn detach_operator_children(&mut self, pending: &mut Vec<ExpressionNode>) {
        if let Self::Operator { left, right, .. } = self {
            for child in [left, right] {
                if child.is_operator() {
                    pending.push(std::mem::replace(child.as_mut(), Self::placeholder()));
                }
            }
        }
    }

    /// 只复制当前节点，子节点以占位节点填充
    fn shallow_clone(&self) -> Self {
        match self {
            Self::Operand { operand } => Self::operand(operand.clone()),
            Self::Operator { operator, .. } => {
                Self::operator(*operator, Self::placeholder(), Self::placeholder())
            }
        }
    }
}

/// 先序遍历迭代器
pub struct Preorder<'a> {
    stack: Vec<&'a ExpressionNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a ExpressionNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let ExpressionNode::Operator { left, right, .. } = node {
            self.stack.push(right.as_ref());
            self.stack.push(left.as_ref());
        }
        Some(node)
    }
}

impl Clone for ExpressionNode {
    fn clone(&self) -> Self {
        let mut root = self.shallow_clone();
        {
            let mut pending: Vec<(&ExpressionNode, &mut ExpressionNode)> =
                vec![(self, &mut root)];
            while let Some((source, target)) = pending.pop() {
                let Self::Operator {
                    left: source_left,
                    right: source_right,
                    ..
                } = source
                else {
                    continue;
                };
                let Self::Operator {
                    left: target_left,
                    right: target_right,
                    ..
                } = target
                else {
                    continue;
                };
                **target_left = source_left.shallow_clone();
                **target_right = source_right.shallow_clone();
                pending.push((source_right.as_ref(), target_right.as_mut()));
                pending.push((source_left.as_ref(), target_left.as_mut()));
            }
        }
        root
    }
}

impl PartialEq for ExpressionNode {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            match pair {
                (Self::Operand { operand: a }, Self::Operand { operand: b }) => {
                    if a != b {
                        return false;
                    }
                }
                (
                    Self::Operator {
                        operator: op_a,
                        left: left_a,
                        right: right_a,
                    },
                    Self::Operator {
                        operator: op_b,
                        left: left_b,
                        right: right_b,
                    },
                ) => {
                    if op_a != op_b {
                        return false;
                    }
                    pending.push((right_a.as_ref(), right_b.as_ref()));
                    pending.push((left_a.as_ref(), left_b.as_ref()));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Eq for ExpressionNode {}

/// 逐个摘下操作符子树再释放，深树析构不递归
impl Drop for ExpressionNode {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_operator_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.detach_operator_children(&mut pending);
        }
    }
}

enum Piece<'a> {
    Node(&'a ExpressionNode, bool),
    Operator(Operator),
    Close,
}

/// 输出为完全加括号的规则文本，括号两侧带空格，可重新编译得到相同的树
impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pieces = vec![Piece::Node(self, false)];
        while let Some(piece) = pieces.pop() {
            match piece {
                Piece::Node(ExpressionNode::Operand { operand }, _) => write!(f, "{}", operand)?,
                Piece::Node(
                    ExpressionNode::Operator {
                        operator,
                        left,
                        right,
                    },
                    grouped,
                ) => {
                    if grouped {
                        f.write_str("( ")?;
                        pieces.push(Piece::Close);
                    }
                    pieces.push(Piece::Node(right.as_ref(), right.is_operator()));
                    pieces.push(Piece::Operator(*operator));
                    pieces.push(Piece::Node(left.as_ref(), left.is_operator()));
                }
                Piece::Operator(operator) => write!(f, " {} ", operator)?,
                Piece::Close => f.write_str(" )")?,
            }
        }
        Ok(())
    }
}

/// 求值结果或上下文中的属性值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Text(_) => "string",
        }
    }

    /// 逻辑操作时的布尔转换：整数非零、字符串非空为真
    pub fn truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Integer(n) => *n != 0,
            Self::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// 数据上下文 - 调用方提供的属性记录
///
/// 引擎只读访问，从不修改。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataContext {
    data: HashMap<String, Value>,
}

impl DataContext {
    pub fn new(data: HashMap<String, Value>) -> Self {
        Self { data }
    }

    /// 从 JSON 对象创建，值只能是整数、字符串或布尔
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 链式添加属性
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for DataContext
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// 评估结果
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub matched: bool,
    /// 规则在存储中的 ID（直接执行未登记的规则时为空）
    pub rule_id: Option<u64>,
    pub rule_source: String,
    pub evaluation_trace: Vec<String>,
    pub evaluation_time_us: i64,
}

impl EvaluationResult {
    pub fn new(rule_source: String) -> Self {
        Self {
            matched: false,
            rule_id: None,
            rule_source,
            evaluation_trace: Vec::new(),
            evaluation_time_us: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> ExpressionNode {
        ExpressionNode::and(
            ExpressionNode::operator(
                Operator::Gt,
                ExpressionNode::attribute("age"),
                ExpressionNode::integer(30),
            ),
            ExpressionNode::operator(
                Operator::Eq,
                ExpressionNode::attribute("department"),
                ExpressionNode::text("Sales"),
            ),
        )
    }

    #[test]
    fn test_display_is_fully_parenthesized() {
        assert_eq!(
            sample_tree().to_string(),
            "( age > 30 ) AND ( department = 'Sales' )"
        );
        assert_eq!(ExpressionNode::attribute("age").to_string(), "age");
    }

    #[test]
    fn test_referenced_attributes_in_first_occurrence_order() {
        let tree = ExpressionNode::or(
            sample_tree(),
            ExpressionNode::operator(
                Operator::Lt,
                ExpressionNode::attribute("age"),
                ExpressionNode::attribute("limit"),
            ),
        );
        assert_eq!(
            tree.referenced_attributes(),
            vec!["age".to_string(), "department".to_string(), "limit".to_string()]
        );
    }

    #[test]
    fn test_depth_and_node_count() {
        let tree = sample_tree();
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.node_count(), 7);
    }

    #[test]
    fn test_tree_serialization() {
        let json = serde_json::to_value(sample_tree()).unwrap();
        assert_eq!(json["type"], "operator");
        assert_eq!(json["operator"], "AND");
        assert_eq!(json["left"]["right"]["operand"]["kind"], "integer");
        assert_eq!(json["left"]["right"]["operand"]["value"], 30);

        let parsed: ExpressionNode = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, sample_tree());
    }

    #[test]
    fn test_context_from_json() {
        let ctx =
            DataContext::from_json(r#"{"age": 35, "department": "Sales", "active": true}"#)
                .unwrap();
        assert_eq!(ctx.len(), 3);
        assert_eq!(ctx.get("age"), Some(&Value::Integer(35)));
        assert_eq!(ctx.get("department"), Some(&Value::Text("Sales".to_string())));
        assert_eq!(ctx.get("active"), Some(&Value::Bool(true)));
        assert!(ctx.get("salary").is_none());
    }

    #[test]
    fn test_context_rejects_unsupported_values() {
        assert!(DataContext::from_json(r#"{"ratio": 1.5}"#).is_err());
        assert!(DataContext::from_json(r#"{"tags": ["a"]}"#).is_err());
        assert!(DataContext::from_json(r#"[1, 2]"#).is_err());
    }

    #[test]
    fn test_truthy() {
        assert!(Value::Integer(3).truthy());
        assert!(!Value::Integer(0).truthy());
        assert!(!Value::from("").truthy());
        assert!(Value::from("x").truthy());
    }
}
