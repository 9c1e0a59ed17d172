use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub mod auth;
pub mod portfolio;
pub mod stocks;
pub mod trade;

/// All service routes. Other methods on these paths get 405 from the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/trade", post(trade::post_trade))
        .route("/portfolio", get(portfolio::get_portfolio))
        .route("/portfolio/:stock", get(portfolio::get_stock_portfolio))
        .route("/stocks", get(stocks::list_stocks))
        .route("/stocks/:name", put(stocks::put_stock))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .with_state(state)
}
