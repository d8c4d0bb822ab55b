//! 公共常量和 HTTP 客户端

use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use std::time::Duration;

use crate::config::ApiConfig;

/// 天天基金实时估值 JSONP 接口
pub const FUND_GZ_API: &str = "https://fundgz.1234567.com.cn/js";
/// 东方财富基金档案接口（type=jjcc 为前 10 重仓股票）
pub const FUND_ARCHIVES_API: &str = "https://fundf10.eastmoney.com/FundArchivesDatas.aspx";

/// 浏览器 UA，重仓接口会拒绝无标识的客户端
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// 构建共享 HTTP 客户端
///
/// 超时必须有界：批量刷新在所有请求汇合处等待，
/// 单个请求无限挂起会阻塞整批，超时按上游不可用处理
pub fn build_client(api: &ApiConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"),
    );
    headers.insert(
        REFERER,
        HeaderValue::from_static("https://fund.eastmoney.com/"),
    );

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(api.timeout_secs))
        .connect_timeout(Duration::from_secs(api.connect_timeout_secs))
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(headers)
        .build()?;

    Ok(client)
}
