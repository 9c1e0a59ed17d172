pub mod auth_service;
pub mod portfolio_service;
pub mod trading_service;
