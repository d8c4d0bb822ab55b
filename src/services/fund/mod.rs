//! 基金数据管道
//!
//! 针对两个形状各异、无契约的上游做抓取与规范化：
//! - 天天基金估值：JSONP 包络里的 JSON 对象
//! - 东方财富重仓：HTML 表格或包在脚本变量里的 HTML 字符串
//!
//! 管道尽力而为，估值是必需数据，重仓抽取失败向上退化为空列表

mod common;
mod extract;
mod holdings;
mod valuation;

pub use common::build_client;
pub use extract::extract_holdings;
pub use holdings::{fetch_holdings, unwrap_holdings_payload};
pub use valuation::{fetch_valuation, parse_valuation};
