//! 指标模块
//!
//! 基于 metrics crate 的门面记录规则编译与评估指标。
//! 未安装 recorder 时所有记录都是空操作。

/// 注册规则引擎指标描述
pub fn describe_metrics() {
    metrics::describe_counter!("rule_compilations_total", "Total number of rule compilations");
    metrics::describe_histogram!(
        "rule_compilation_duration_seconds",
        "Rule compilation duration in seconds"
    );

    metrics::describe_counter!("rule_combinations_total", "Total number of rule combinations");

    metrics::describe_counter!("rule_evaluations_total", "Total number of rule evaluations");
    metrics::describe_histogram!(
        "rule_evaluation_duration_seconds",
        "Rule evaluation duration in seconds"
    );
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录规则编译
#[inline]
pub fn record_rule_compilation(status: &str, duration_secs: f64) {
    metrics::counter!(
        "rule_compilations_total",
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!("rule_compilation_duration_seconds").record(duration_secs);
}

/// 记录规则组合
#[inline]
pub fn record_rule_combination(rule_count: usize, status: &str) {
    metrics::counter!(
        "rule_combinations_total",
        "rule_count" => rule_count.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录规则评估
#[inline]
pub fn record_rule_evaluation(status: &str, duration_secs: f64) {
    metrics::counter!(
        "rule_evaluations_total",
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!("rule_evaluation_duration_seconds").record(duration_secs);
}
