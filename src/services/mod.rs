pub mod fund;
pub mod fund_service;
