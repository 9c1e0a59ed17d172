use crate::models::{Stock, UserId};
use crate::store::{StoreError, TradeStore};
use rust_decimal::Decimal;

/// Net position of one user in one stock.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub stock: Stock,
    pub quantity: i64,
}

impl Holding {
    pub fn invested_value(&self) -> Decimal {
        Decimal::from(self.quantity) * self.stock.price
    }

    pub fn summary(&self) -> String {
        format!(
            "Total value invested for stock {} is {:.2}",
            self.stock.name,
            self.invested_value()
        )
    }
}

pub async fn holding_for_stock<S: TradeStore + ?Sized>(
    store: &S,
    user_id: &UserId,
    stock: Stock,
) -> Result<Holding, StoreError> {
    let quantity = store.sum_quantity(user_id, stock.id).await?;
    Ok(Holding { stock, quantity })
}

/// Holdings for every stock the user has traded, in stock name order.
pub async fn holdings<S: TradeStore + ?Sized>(
    store: &S,
    user_id: &UserId,
) -> Result<Vec<Holding>, StoreError> {
    let grouped = store.sum_quantity_grouped_by_stock(user_id).await?;
    Ok(grouped
        .into_iter()
        .map(|(stock, quantity)| Holding { stock, quantity })
        .collect())
}
