//! 基金数据模型
//!
//! 定义基金估值、重仓持仓相关的数据结构
//! 字段名与上游接口及前端持久化格式保持一致

use serde::{Deserialize, Serialize};

/// 涨跌幅字段
///
/// 上游 gszzl 通常是数值字符串，但偶尔返回 "--" 等占位符，
/// 无法解析为有限数值时原样保留，不得静默丢弃或置零
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ChangePercent {
    /// 可解析的数值涨跌幅（百分比）
    Number(f64),
    /// 上游返回的非数值占位符，原样透传
    Text(String),
}

impl ChangePercent {
    /// 解析上游涨跌幅字符串：有限数值则存数值，否则保留原文
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => ChangePercent::Number(v),
            _ => ChangePercent::Text(raw.to_string()),
        }
    }
}

/// 单只重仓股票
///
/// code 和 name 来自启发式抽取，可能缺失；
/// weight 带 `%` 后缀，无法解析出占比的行不会进入列表
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HoldingEntry {
    /// 6 位证券代码
    pub code: Option<String>,
    /// 证券名称
    pub name: Option<String>,
    /// 持仓占比（含 `%`）
    pub weight: String,
}

/// 基金实时估值
///
/// 来自天天基金 jsonpgz 接口的规范化结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundValuation {
    /// 基金代码
    pub code: String,
    /// 基金名称
    pub name: String,
    /// 单位净值（最近确认值）
    pub dwjz: String,
    /// 盘中估算净值
    pub gsz: String,
    /// 估值时间（上游格式，原样保留）
    pub gztime: String,
    /// 估算涨跌幅
    pub gszzl: ChangePercent,
}

/// 基金当前完整状态
///
/// 每次成功刷新整体替换，不做原地修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundRecord {
    /// 基金代码（自选列表内唯一）
    pub code: String,
    /// 基金名称
    pub name: String,
    /// 单位净值
    pub dwjz: String,
    /// 估算净值
    pub gsz: String,
    /// 估值时间
    pub gztime: String,
    /// 估算涨跌幅
    pub gszzl: ChangePercent,
    /// 前 10 重仓股票，按上游排序，允许为空
    pub holdings: Vec<HoldingEntry>,
}

impl FundRecord {
    /// 由估值与重仓数据合并出一条基金记录
    pub fn from_parts(valuation: FundValuation, holdings: Vec<HoldingEntry>) -> Self {
        Self {
            code: valuation.code,
            name: valuation.name,
            dwjz: valuation.dwjz,
            gsz: valuation.gsz,
            gztime: valuation.gztime,
            gszzl: valuation.gszzl,
            holdings,
        }
    }
}

/// 手动刷新结果
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshOutcome {
    /// 本次调用是否真正执行了刷新（false 表示已有手动刷新在途）
    pub refreshed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_percent_numeric() {
        assert_eq!(ChangePercent::parse("1.30"), ChangePercent::Number(1.30));
        assert_eq!(ChangePercent::parse("-0.52"), ChangePercent::Number(-0.52));
    }

    #[test]
    fn change_percent_placeholder_preserved() {
        assert_eq!(
            ChangePercent::parse("--"),
            ChangePercent::Text("--".to_string())
        );
    }

    #[test]
    fn change_percent_serializes_untagged() {
        let n = serde_json::to_string(&ChangePercent::Number(1.3)).unwrap();
        assert_eq!(n, "1.3");
        let t = serde_json::to_string(&ChangePercent::Text("--".into())).unwrap();
        assert_eq!(t, "\"--\"");
    }
}
