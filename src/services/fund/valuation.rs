//! 天天基金实时估值接口
//!
//! 对接 https://fundgz.1234567.com.cn 的 jsonpgz JSONP 响应

use regex::Regex;
use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use serde::Deserialize;
use std::sync::OnceLock;

use super::common::FUND_GZ_API;
use crate::error::AppError;
use crate::models::{ChangePercent, FundValuation};

/// jsonpgz 包络：单一模式匹配唯一的调用实参
fn jsonp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"jsonpgz\((.*)\);").unwrap())
}

/// 上游 JSON 载荷，字段全部是字符串，缺失按空串处理
#[derive(Debug, Deserialize)]
struct RawValuation {
    #[serde(default)]
    fundcode: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    dwjz: String,
    #[serde(default)]
    gsz: String,
    #[serde(default)]
    gztime: String,
    #[serde(default)]
    gszzl: String,
}

/// 解析 jsonpgz 响应体，规范化为估值结构
pub fn parse_valuation(body: &str) -> Result<FundValuation, AppError> {
    let caps = jsonp_re()
        .captures(body)
        .ok_or_else(|| AppError::MalformedResponse("估值数据解析失败".to_string()))?;

    let raw: RawValuation = serde_json::from_str(&caps[1])
        .map_err(|e| AppError::MalformedResponse(format!("估值数据解析失败: {e}")))?;

    Ok(FundValuation {
        code: raw.fundcode,
        name: raw.name,
        dwjz: raw.dwjz,
        gsz: raw.gsz,
        gztime: raw.gztime,
        gszzl: ChangePercent::parse(&raw.gszzl),
    })
}

/// 获取单只基金的实时估值
///
/// 估值是实时行情，禁用缓存；命中过期缓存是正确性问题
pub async fn fetch_valuation(client: &Client, code: &str) -> Result<FundValuation, AppError> {
    let url = format!("{FUND_GZ_API}/{code}.js");

    let response = client
        .get(&url)
        .header(CACHE_CONTROL, "no-cache")
        .send()
        .await
        .map_err(|e| AppError::UpstreamUnavailable(format!("估值接口异常: {e}")))?;

    if !response.status().is_success() {
        return Err(AppError::UpstreamUnavailable(format!(
            "估值接口异常: {}",
            response.status()
        )));
    }

    let text = response
        .text()
        .await
        .map_err(|e| AppError::UpstreamUnavailable(format!("估值接口异常: {e}")))?;

    parse_valuation(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_change_percent() {
        let body = r#"jsonpgz({"fundcode":"110022","name":"X","dwjz":"1.234","gsz":"1.250","gztime":"2024-01-01 15:00","gszzl":"1.30"});"#;
        let v = parse_valuation(body).unwrap();
        assert_eq!(v.code, "110022");
        assert_eq!(v.name, "X");
        assert_eq!(v.dwjz, "1.234");
        assert_eq!(v.gsz, "1.250");
        assert_eq!(v.gztime, "2024-01-01 15:00");
        assert_eq!(v.gszzl, ChangePercent::Number(1.30));
    }

    #[test]
    fn preserves_placeholder_change_percent() {
        let body = r#"jsonpgz({"fundcode":"110022","name":"X","dwjz":"1.234","gsz":"1.250","gztime":"2024-01-01 15:00","gszzl":"--"});"#;
        let v = parse_valuation(body).unwrap();
        assert_eq!(v.gszzl, ChangePercent::Text("--".to_string()));
    }

    #[test]
    fn handles_parentheses_inside_payload() {
        let body = r#"jsonpgz({"fundcode":"161725","name":"招商中证白酒指数(LOF)A","dwjz":"0.7035","gsz":"0.7034","gztime":"2026-02-13 15:00","gszzl":"-0.01"});"#;
        let v = parse_valuation(body).unwrap();
        assert_eq!(v.name, "招商中证白酒指数(LOF)A");
        assert_eq!(v.gszzl, ChangePercent::Number(-0.01));
    }

    #[test]
    fn rejects_body_without_envelope() {
        let err = parse_valuation("<html>Service Unavailable</html>").unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[test]
    fn rejects_invalid_json_payload() {
        let err = parse_valuation("jsonpgz(not-json);").unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }
}
