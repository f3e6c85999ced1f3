//! 规则存储管理
//!
//! 内存中的规则注册表：DashMap 保存编译后的规则，原子计数器分配 ID。
//! ID 从 1 开始单调递增，删除或清空后也不会复用。

use crate::compiler::{CompiledRule, RuleCompiler};
use crate::error::{Result, RuleError};
use crate::executor::RuleExecutor;
use crate::models::{DataContext, EvaluationResult};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, instrument, warn};

/// 规则 ID
pub type RuleId = u64;

/// 规则存储
#[derive(Clone)]
pub struct RuleStore {
    /// 编译后的规则缓存
    rules: Arc<DashMap<RuleId, CompiledRule>>,
    /// 下一个待分配的 ID
    next_id: Arc<AtomicU64>,
    /// 规则编译器
    compiler: Arc<parking_lot::Mutex<RuleCompiler>>,
}

impl RuleStore {
    /// 创建新的规则存储
    pub fn new() -> Self {
        Self {
            rules: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
            compiler: Arc::new(parking_lot::Mutex::new(RuleCompiler::new())),
        }
    }

    /// 获取当前存储的规则数量
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// 检查存储是否为空
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 编译规则字符串并登记，返回分配的 ID
    #[instrument(skip(self))]
    pub fn create(&self, rule: &str) -> Result<RuleId> {
        let compiled = {
            let mut compiler = self.compiler.lock();
            compiler.compile(rule)?
        };

        let rule_id = self.insert(compiled);
        info!("规则已创建: {}", rule_id);
        Ok(rule_id)
    }

    /// 以 AND 组合已登记的规则，组合结果作为新规则登记
    #[instrument(skip(self))]
    pub fn combine(&self, rule_ids: &[RuleId]) -> Result<RuleId> {
        let rules = rule_ids
            .iter()
            .map(|id| self.get(*id).ok_or(RuleError::RuleNotFound(*id)))
            .collect::<Result<Vec<_>>>()?;

        let combined = {
            let mut compiler = self.compiler.lock();
            compiler.combine(rules)?
        };

        let rule_id = self.insert(combined);
        info!("规则已组合: {:?} -> {}", rule_ids, rule_id);
        Ok(rule_id)
    }

    fn insert(&self, compiled: CompiledRule) -> RuleId {
        let rule_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.rules.insert(rule_id, compiled);
        rule_id
    }

    /// 对已登记的规则求值
    pub fn evaluate(
        &self,
        rule_id: RuleId,
        context: &DataContext,
        executor: &RuleExecutor,
    ) -> Result<EvaluationResult> {
        let rule = self.get(rule_id).ok_or(RuleError::RuleNotFound(rule_id))?;
        let mut result = executor.execute(&rule, context)?;
        result.rule_id = Some(rule_id);
        Ok(result)
    }

    /// 删除规则
    #[instrument(skip(self))]
    pub fn delete(&self, rule_id: RuleId) -> Result<()> {
        if self.rules.remove(&rule_id).is_some() {
            info!("规则已删除: {}", rule_id);
            Ok(())
        } else {
            warn!("删除不存在的规则: {}", rule_id);
            Err(RuleError::RuleNotFound(rule_id))
        }
    }

    /// 获取规则
    pub fn get(&self, rule_id: RuleId) -> Option<CompiledRule> {
        self.rules.get(&rule_id).map(|r| r.clone())
    }

    /// 检查规则是否存在
    pub fn contains(&self, rule_id: RuleId) -> bool {
        self.rules.contains_key(&rule_id)
    }

    /// 获取所有规则 ID（升序）
    pub fn list_ids(&self) -> Vec<RuleId> {
        let mut ids: Vec<RuleId> = self.rules.iter().map(|r| *r.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// 清空所有规则（ID 计数器不重置）
    #[instrument(skip(self))]
    pub fn clear(&self) {
        let count = self.rules.len();
        self.rules.clear();
        info!("已清空 {} 条规则", count);
    }

    /// 获取规则统计信息
    pub fn stats(&self) -> RuleStoreStats {
        let rules_count = self.rules.len();
        let total_attributes: usize = self
            .rules
            .iter()
            .map(|r| r.required_attributes.len())
            .sum();
        let max_depth = self
            .rules
            .iter()
            .map(|r| r.root.depth())
            .max()
            .unwrap_or(0);
        let total_nodes = self.rules.iter().map(|r| r.root.node_count()).sum();

        RuleStoreStats {
            rules_count,
            total_attributes,
            avg_attributes_per_rule: if rules_count > 0 {
                total_attributes as f64 / rules_count as f64
            } else {
                0.0
            },
            max_depth,
            total_nodes,
        }
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new()
    }
}

/// 规则存储统计信息
#[derive(Debug, Clone)]
pub struct RuleStoreStats {
    /// 规则总数
    pub rules_count: usize,
    /// 所有规则引用的属性总数
    pub total_attributes: usize,
    /// 平均每条规则引用的属性数
    pub avg_attributes_per_rule: f64,
    /// 最深的表达式树深度
    pub max_depth: usize,
    /// 所有表达式树的节点总数
    pub total_nodes: usize,
}
