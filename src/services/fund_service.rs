//! 基金记录组装服务
//!
//! 把同一基金的估值与重仓两路抓取合并为一条完整记录。
//! 两路并发执行互不阻塞：估值失败则整条记录失败，
//! 重仓失败只降级为空列表

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{FundRecord, FundValuation, HoldingEntry};
use crate::services::fund::{fetch_holdings, fetch_valuation};

/// 基金记录提供方
///
/// 调度器通过该接口组装记录，测试时可替换为桩实现
#[async_trait]
pub trait FundProvider: Send + Sync {
    /// 组装单只基金的完整记录
    async fn assemble(&self, code: &str) -> Result<FundRecord, AppError>;
}

/// 生产实现：对接天天基金估值与东方财富重仓
pub struct EastmoneyProvider {
    client: Client,
}

impl EastmoneyProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn into_shared(self) -> Arc<dyn FundProvider> {
        Arc::new(self)
    }
}

#[async_trait]
impl FundProvider for EastmoneyProvider {
    async fn assemble(&self, code: &str) -> Result<FundRecord, AppError> {
        let (valuation, holdings) = tokio::join!(
            fetch_valuation(&self.client, code),
            fetch_holdings(&self.client, code),
        );
        merge_record(code, valuation, holdings)
    }
}

/// 合并两路抓取结果
///
/// 估值失败 = 记录失败，对外统一为“未找到或上游异常”；
/// 重仓失败只记日志并降级为空列表，不影响记录本身
fn merge_record(
    code: &str,
    valuation: Result<FundValuation, AppError>,
    holdings: Result<Vec<HoldingEntry>, AppError>,
) -> Result<FundRecord, AppError> {
    let valuation = valuation.map_err(|e| AppError::FundUnresolved(e.to_string()))?;

    let holdings = match holdings {
        Ok(list) => list,
        Err(e) => {
            log::warn!("基金 {code} 重仓数据获取失败，降级为空列表: {e}");
            Vec::new()
        }
    };

    Ok(FundRecord::from_parts(valuation, holdings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChangePercent;

    fn valuation() -> FundValuation {
        FundValuation {
            code: "110022".to_string(),
            name: "易方达消费行业".to_string(),
            dwjz: "1.234".to_string(),
            gsz: "1.250".to_string(),
            gztime: "2024-01-01 15:00".to_string(),
            gszzl: ChangePercent::Number(1.30),
        }
    }

    fn holding() -> HoldingEntry {
        HoldingEntry {
            code: Some("600519".to_string()),
            name: Some("贵州茅台".to_string()),
            weight: "9.85%".to_string(),
        }
    }

    #[test]
    fn merged_record_carries_both_parts() {
        let record = merge_record("110022", Ok(valuation()), Ok(vec![holding()])).unwrap();
        assert_eq!(record.code, "110022");
        assert_eq!(record.gsz, "1.250");
        assert_eq!(record.holdings.len(), 1);
        assert_eq!(record.holdings[0].weight, "9.85%");
    }

    #[test]
    fn holdings_failure_degrades_to_empty_list() {
        let record = merge_record(
            "110022",
            Ok(valuation()),
            Err(AppError::UpstreamUnavailable("重仓接口异常: 503".to_string())),
        )
        .unwrap();
        // 估值成功时重仓失败不致命，记录照常返回
        assert_eq!(record.code, "110022");
        assert!(record.holdings.is_empty());
    }

    #[test]
    fn valuation_failure_maps_to_unresolved() {
        let err = merge_record(
            "999999",
            Err(AppError::MalformedResponse("估值数据解析失败".to_string())),
            Ok(vec![holding()]),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::FundUnresolved(_)));
        assert_eq!(err.to_string(), "估值数据解析失败");
    }
}
