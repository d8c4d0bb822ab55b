//! 设置处理器
//!
//! 刷新间隔读写以及持久化状态的导入导出（透传）

use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::ApiResponse;
use crate::scheduler::PollingScheduler;

/// 刷新间隔设置请求体（秒）
#[derive(Debug, Deserialize)]
pub struct RefreshSetting {
    pub seconds: u64,
}

/// 刷新间隔视图
#[derive(Debug, Serialize)]
pub struct RefreshSettingView {
    pub seconds: u64,
    pub refresh_ms: u64,
}

fn view(refresh_ms: u64) -> RefreshSettingView {
    RefreshSettingView {
        seconds: refresh_ms / 1000,
        refresh_ms,
    }
}

/// 读取当前刷新间隔
pub async fn get_refresh_setting(
    scheduler: web::Data<Arc<PollingScheduler>>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(view(scheduler.refresh_ms()))))
}

/// 更新刷新间隔（低于下限时取下限），挂起的定时任务立即重排
pub async fn put_refresh_setting(
    scheduler: web::Data<Arc<PollingScheduler>>,
    body: web::Json<RefreshSetting>,
) -> Result<HttpResponse> {
    let ms = scheduler.set_refresh_ms(body.seconds.saturating_mul(1000));
    Ok(HttpResponse::Ok().json(ApiResponse::success(view(ms))))
}

/// 导出持久化状态（原样 JSON 文档，不套响应包络）
pub async fn export_state(scheduler: web::Data<Arc<PollingScheduler>>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(scheduler.export_state()))
}

/// 导入持久化状态，整体替换
pub async fn import_state(
    scheduler: web::Data<Arc<PollingScheduler>>,
    body: web::Json<serde_json::Value>,
) -> Result<HttpResponse> {
    match scheduler.import_state(&body) {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success("导入成功".to_string()))),
        Err(e) => {
            Ok(HttpResponse::BadRequest().json(ApiResponse::<String>::error(e.to_string())))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/settings")
            .route("/refresh", web::get().to(get_refresh_setting))
            .route("/refresh", web::put().to(put_refresh_setting))
            .route("/export", web::get().to(export_state))
            .route("/import", web::post().to(import_state)),
    );
}
