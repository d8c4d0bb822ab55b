//! 错误类型定义
//!
//! 数据管道与调度器共用的错误分类，
//! 错误信息直接面向用户，与前端提示文案保持一致

use thiserror::Error;

/// 应用错误分类
#[derive(Debug, Error)]
pub enum AppError {
    /// 上游接口不可达或返回非 2xx 状态（含超时）
    #[error("{0}")]
    UpstreamUnavailable(String),

    /// 响应报文无法解析（JSONP 包络不匹配或 JSON 解析失败）
    #[error("{0}")]
    MalformedResponse(String),

    /// 无法获得基金估值，整条记录组装失败
    #[error("{0}")]
    FundUnresolved(String),

    /// 基金已在自选列表中
    #[error("该基金已添加: {0}")]
    DuplicateEntry(String),

    /// 请求参数非法（如基金编号为空）
    #[error("{0}")]
    ValidationError(String),
}
