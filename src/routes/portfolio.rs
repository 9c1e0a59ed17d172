use crate::{
    error::AppError,
    routes::{auth::AuthUser, trade::MessageResponse},
    services::portfolio_service,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use std::collections::BTreeMap;

/// Invested value for every stock the caller has traded, keyed by stock name.
pub async fn get_portfolio(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<BTreeMap<String, String>>, AppError> {
    let holdings = portfolio_service::holdings(state.store.as_ref(), &user.id).await?;

    Ok(Json(
        holdings
            .into_iter()
            .map(|holding| (holding.stock.name.clone(), holding.summary()))
            .collect(),
    ))
}

pub async fn get_stock_portfolio(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(stock_name): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let stock = state
        .store
        .find_stock_by_name(&stock_name)
        .await?
        .ok_or(AppError::NotFound)?;

    let holding = portfolio_service::holding_for_stock(state.store.as_ref(), &user.id, stock).await?;

    Ok(Json(MessageResponse {
        message: holding.summary(),
    }))
}
