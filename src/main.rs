//! 实时基金估值后端服务
//!
//! 跟踪个人自选基金，提供近实时估值与前 10 重仓数据
//! 数据来源：天天基金估值接口、东方财富基金档案接口

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use std::io;
use std::sync::Arc;

use fundwatch_backend::config::AppConfig;
use fundwatch_backend::handlers;
use fundwatch_backend::scheduler::PollingScheduler;
use fundwatch_backend::services::fund::build_client;
use fundwatch_backend::services::fund_service::{EastmoneyProvider, FundProvider};
use fundwatch_backend::storage::{JsonFileStore, KvStore};

/// 应用程序入口
///
/// 加载配置、恢复持久化状态、启动定时刷新与 HTTP 服务器
#[actix_web::main]
async fn main() -> io::Result<()> {
    let config = AppConfig::load();
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.clone()));

    log::info!("启动实时基金估值后端服务");

    let client = build_client(&config.api)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    let provider: Arc<dyn FundProvider> = EastmoneyProvider::new(client).into_shared();
    let store: Arc<dyn KvStore> = Arc::new(JsonFileStore::open(&config.storage.data_file));

    let scheduler = PollingScheduler::new(
        Arc::clone(&provider),
        store,
        config.scheduler.refresh_ms,
        config.scheduler.floor_ms,
    );
    if config.scheduler.autostart {
        scheduler.start();
    }

    let scheduler_data = web::Data::new(Arc::clone(&scheduler));
    let provider_data: web::Data<dyn FundProvider> = web::Data::from(provider);

    let bind_addr = config.bind_addr();
    log::info!("监听地址: {}", bind_addr);

    let workers = config.server.workers;
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(scheduler_data.clone())
            .app_data(provider_data.clone())
            .configure(handlers::config)
    })
    .bind(bind_addr)?;

    if workers > 0 {
        server = server.workers(workers);
    }

    server.run().await
}
