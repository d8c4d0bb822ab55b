//! 东方财富重仓数据接口
//!
//! 基金档案接口返回的要么是含表格的 HTML 文档，
//! 要么是把 HTML 包在引号字符串里的脚本变量赋值，
//! 先解开外层再交给表格抽取

use chrono::Utc;
use regex::Regex;
use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use std::sync::OnceLock;

use super::common::FUND_ARCHIVES_API;
use super::extract::extract_holdings;
use crate::error::AppError;
use crate::models::HoldingEntry;

/// 直接定位表格区域（贪婪匹配到最后一个闭合标记）
fn table_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<table[\s\S]*</table>").unwrap())
}

/// 脚本赋值变体：content 字段里的引号字符串
fn content_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)content:\s*'([\s\S]*?)'").unwrap())
}

/// 解开响应外层，取出可供抽取的 HTML
///
/// 优先找完整表格区域，其次找 content:'...' 字段，
/// 两者都没有就把全文交给抽取器碰运气
pub fn unwrap_holdings_payload(text: &str) -> &str {
    if let Some(m) = table_block_re().find(text) {
        return m.as_str();
    }
    if let Some(m) = content_field_re().captures(text).and_then(|c| c.get(1)) {
        return m.as_str();
    }
    text
}

/// 获取单只基金的前 10 重仓股票
///
/// rt 参数带当前时间戳用于穿透缓存
pub async fn fetch_holdings(client: &Client, code: &str) -> Result<Vec<HoldingEntry>, AppError> {
    let rt = Utc::now().timestamp_millis().to_string();

    let response = client
        .get(FUND_ARCHIVES_API)
        .query(&[
            ("type", "jjcc"),
            ("code", code),
            ("topline", "10"),
            ("year", ""),
            ("month", ""),
            ("rt", &rt),
        ])
        .header(CACHE_CONTROL, "no-cache")
        .send()
        .await
        .map_err(|e| AppError::UpstreamUnavailable(format!("重仓接口异常: {e}")))?;

    if !response.status().is_success() {
        return Err(AppError::UpstreamUnavailable(format!(
            "重仓接口异常: {}",
            response.status()
        )));
    }

    let text = response
        .text()
        .await
        .map_err(|e| AppError::UpstreamUnavailable(format!("重仓接口异常: {e}")))?;

    Ok(extract_holdings(unwrap_holdings_payload(&text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_raw_html_table() {
        let text = "<html><body><table><tr><td>600519</td></tr></table></body></html>";
        let inner = unwrap_holdings_payload(text);
        assert!(inner.starts_with("<table"));
        assert!(inner.ends_with("</table>"));
    }

    #[test]
    fn unwraps_script_assignment_variant() {
        let text = "var apidata={ content:'<div><p>表格</p></div>',arryear:[2024],curyear:2024};";
        assert_eq!(unwrap_holdings_payload(text), "<div><p>表格</p></div>");
    }

    #[test]
    fn table_takes_precedence_over_content_field() {
        let text = "content:'ignored'<table><tr><td>600519</td></tr></table>";
        assert!(unwrap_holdings_payload(text).starts_with("<table"));
    }

    #[test]
    fn passes_through_unrecognized_payload() {
        let text = "nothing to see here";
        assert_eq!(unwrap_holdings_payload(text), text);
    }

    #[test]
    fn script_variant_flows_into_extraction() {
        let text = "var apidata={ content:'<table><tr><td>600519</td><td>贵州茅台</td><td>9.85%</td></tr></table>',arryear:[2024]};";
        let list = extract_holdings(unwrap_holdings_payload(text));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].code.as_deref(), Some("600519"));
    }
}
