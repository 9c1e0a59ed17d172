use crate::models::*;
use crate::state::AppState;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TradeError {
    #[error("Quantity value must be greater than 0")]
    InvalidQuantity,

    #[error("Stock quantity to sell more than stock quantity on-hand. Stock available on-hand: {on_hand}")]
    InsufficientOnHand { on_hand: i64 },

    #[error("Ensure this value is less than or equal to {max}.")]
    QuantityTooLarge { max: i64 },

    #[error("Stock quantity on-hand would exceed the largest supported quantity. Stock available on-hand: {on_hand}")]
    OnHandOverflow { on_hand: i64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Record a buy or sell of `quantity` shares for the user.
///
/// Sells are checked against the on-hand quantity as it stood before this
/// trade. Buys must keep the on-hand sum representable. Nothing is written
/// when a check fails.
pub async fn execute_trade(
    state: &AppState,
    user_id: &UserId,
    stock: &Stock,
    method: TradeMethod,
    quantity: i64,
) -> Result<TradeOrder, TradeError> {
    if quantity <= 0 {
        return Err(TradeError::InvalidQuantity);
    }
    if quantity > MAX_TRADE_QUANTITY {
        return Err(TradeError::QuantityTooLarge {
            max: MAX_TRADE_QUANTITY,
        });
    }

    let _guard = state.trade_lock.lock().await;

    let on_hand = state.store.sum_quantity(user_id, stock.id).await?;
    match method {
        TradeMethod::Buy if on_hand.checked_add(quantity).is_none() => {
            return Err(TradeError::OnHandOverflow { on_hand });
        }
        TradeMethod::Sell if quantity > on_hand => {
            return Err(TradeError::InsufficientOnHand { on_hand });
        }
        _ => {}
    }

    let order = state
        .store
        .create_order(user_id, stock.id, method, method.signed_quantity(quantity))
        .await?;

    tracing::info!(
        "User {} {} {} x {} (order {})",
        user_id,
        method,
        quantity,
        stock.name,
        order.id
    );

    Ok(order)
}
