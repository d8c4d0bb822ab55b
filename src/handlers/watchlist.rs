//! 自选列表处理器
//!
//! ## API 列表
//! - GET /watchlist - 当前快照
//! - POST /watchlist - 添加基金
//! - DELETE /watchlist/{code} - 删除基金
//! - POST /watchlist/refresh - 立即刷新（手动触发）

use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{ApiResponse, FundRecord, RefreshOutcome};
use crate::scheduler::PollingScheduler;

/// 添加基金请求体
#[derive(Debug, Deserialize)]
pub struct AddFundRequest {
    /// 基金代码
    pub code: String,
}

/// 获取自选列表快照
pub async fn get_watchlist(scheduler: web::Data<Arc<PollingScheduler>>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(scheduler.snapshot())))
}

/// 添加基金
///
/// 添加是用户主动操作，组装失败直接反馈错误、列表不变
pub async fn add_fund(
    scheduler: web::Data<Arc<PollingScheduler>>,
    body: web::Json<AddFundRequest>,
) -> Result<HttpResponse> {
    match scheduler.add_fund(&body.code).await {
        Ok(record) => Ok(HttpResponse::Ok().json(ApiResponse::success(record))),
        Err(e @ AppError::ValidationError(_)) => {
            Ok(HttpResponse::BadRequest().json(ApiResponse::<FundRecord>::error(e.to_string())))
        }
        Err(e @ AppError::DuplicateEntry(_)) => {
            Ok(HttpResponse::Conflict().json(ApiResponse::<FundRecord>::error(e.to_string())))
        }
        Err(e @ AppError::FundUnresolved(_)) => {
            Ok(HttpResponse::NotFound().json(ApiResponse::<FundRecord>::error(e.to_string())))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::<FundRecord>::error(e.to_string()))
        ),
    }
}

/// 删除基金
pub async fn remove_fund(
    scheduler: web::Data<Arc<PollingScheduler>>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let code = path.into_inner();
    if scheduler.remove_fund(&code) {
        Ok(HttpResponse::Ok().json(ApiResponse::success(code)))
    } else {
        let response = ApiResponse::<String>::error("基金不在自选列表中".to_string());
        Ok(HttpResponse::NotFound().json(response))
    }
}

/// 手动刷新全部自选基金
///
/// 已有手动刷新在途时为空操作（refreshed=false）
pub async fn manual_refresh(scheduler: web::Data<Arc<PollingScheduler>>) -> Result<HttpResponse> {
    let refreshed = scheduler.manual_refresh().await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(RefreshOutcome { refreshed })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/watchlist")
            .route("", web::get().to(get_watchlist))
            .route("", web::post().to(add_fund))
            .route("/refresh", web::post().to(manual_refresh))
            .route("/{code}", web::delete().to(remove_fund)),
    );
}
