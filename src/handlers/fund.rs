//! 基金查询处理器
//!
//! GET /api/v1/fund?code=110022
//!
//! 无状态的单基金查询，不读写自选列表。
//! 编号缺失返回 400，估值取不到返回 404（携带上游错误文案），
//! 其余异常返回 500

use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::{ApiResponse, FundRecord};
use crate::services::fund_service::FundProvider;

/// 查询参数
#[derive(Debug, Deserialize)]
pub struct FundQuery {
    /// 基金代码
    pub code: Option<String>,
}

/// 查询单只基金的实时估值与前 10 重仓
pub async fn get_fund(
    provider: web::Data<dyn FundProvider>,
    query: web::Query<FundQuery>,
) -> Result<HttpResponse> {
    let code = query.code.as_deref().unwrap_or("").trim();
    if code.is_empty() {
        let response = ApiResponse::<FundRecord>::error("缺少基金编号".to_string());
        return Ok(HttpResponse::BadRequest().json(response));
    }

    match provider.assemble(code).await {
        Ok(record) => Ok(HttpResponse::Ok().json(ApiResponse::success(record))),
        Err(e @ AppError::FundUnresolved(_)) => {
            let response = ApiResponse::<FundRecord>::error(e.to_string());
            Ok(HttpResponse::NotFound().json(response))
        }
        Err(e) => {
            let response = ApiResponse::<FundRecord>::error(e.to_string());
            Ok(HttpResponse::InternalServerError().json(response))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/fund", web::get().to(get_fund));
}
