pub mod fund;
pub mod health;
pub mod settings;
pub mod watchlist;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(fund::config)
            .configure(watchlist::config)
            .configure(settings::config),
    );
}
