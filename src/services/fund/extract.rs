//! 重仓股票表格抽取
//!
//! 从格式不可信的 HTML 片段中抽取 (代码, 名称, 占比) 三元组，
//! 纯函数，无网络无状态。
//!
//! 抽取分两层：先按单元格做结构化抽取，三元组不完整时
//! 再对行内原始文本做模式回退。表格中合法存在表头、装饰行，
//! 抽不出数据的行静默跳过，任何畸形标记都不会导致失败。

use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;

use crate::models::HoldingEntry;

/// 结果上限：只取前 10 大重仓
const MAX_HOLDINGS: usize = 10;

fn table_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<table[\s\S]*?</table>").unwrap())
}

fn row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<tr[\s\S]*?</tr>").unwrap())
}

fn cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<td[\s\S]*?>([\s\S]*?)</td>").unwrap())
}

fn code_cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{6}$").unwrap())
}

fn any_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{6}").unwrap())
}

fn weight_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").unwrap())
}

fn anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<a[^>]*?>([^<]+)</a>").unwrap())
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// 去掉嵌套标记并折叠空白，得到单元格纯文本
fn strip_markup(fragment: &str) -> String {
    let doc = Html::parse_fragment(fragment);
    let text = doc.root_element().text().collect::<Vec<_>>().join("");
    whitespace_re().replace_all(&text, " ").trim().to_string()
}

/// 从 HTML 片段抽取前 10 重仓股票，按文档顺序（即上游占比排序）
pub fn extract_holdings(html: &str) -> Vec<HoldingEntry> {
    // 定位第一个完整 table 区域，找不到就在全文里找行
    let table = table_re()
        .find(html)
        .map(|m| m.as_str())
        .unwrap_or(html);

    let mut list = Vec::new();
    for row in row_re().find_iter(table) {
        let row = row.as_str();

        let cells: Vec<String> = cell_re()
            .captures_iter(row)
            .map(|c| strip_markup(&c[1]))
            .collect();
        if cells.is_empty() {
            continue;
        }

        // 结构化抽取：首个 6 位代码单元格，其后一格为名称，
        // 首个百分比单元格为占比（去空白）
        let code_idx = cells.iter().position(|c| code_cell_re().is_match(c));
        let code = code_idx.map(|i| cells[i].clone());
        let name = code_idx.and_then(|i| cells.get(i + 1).cloned());
        let weight = cells
            .iter()
            .find(|c| weight_re().is_match(c.as_str()))
            .map(|c| whitespace_re().replace_all(c.as_str(), "").to_string());

        // 名称单元格存在即可，空字符串也算有值
        if let (Some(code), Some(name), Some(weight)) = (&code, &name, &weight) {
            list.push(HoldingEntry {
                code: Some(code.clone()),
                name: Some(name.clone()),
                weight: weight.clone(),
            });
            continue;
        }

        // 回退抽取：不依赖单元格边界，直接在行文本里找
        // 6 位数字、锚标签内文与百分比模式
        let fallback_code = any_code_re().find(row).map(|m| m.as_str().to_string());
        let anchor_name = anchor_re()
            .captures(row)
            .map(|c| strip_markup(&c[1]))
            .filter(|s| !s.is_empty());
        let fallback_weight = weight_re()
            .captures(row)
            .map(|c| format!("{}%", &c[1]));

        let code = code.or(fallback_code);
        let name = name.filter(|s| !s.is_empty()).or(anchor_name);
        let weight = weight.or(fallback_weight);
        if let (Some(code), Some(name), Some(weight)) = (code, name, weight) {
            list.push(HoldingEntry {
                code: Some(code),
                name: Some(name),
                weight,
            });
        }
    }

    list.truncate(MAX_HOLDINGS);
    list
}
