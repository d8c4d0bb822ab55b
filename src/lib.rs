//! 实时基金估值后端
//!
//! 聚合天天基金估值（JSONP）与东方财富重仓（HTML 片段）两个上游，
//! 维护自选基金列表并按设定周期自动刷新快照

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod scheduler;
pub mod services;
pub mod storage;
