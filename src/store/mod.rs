use crate::models::{Stock, StockId, TradeMethod, TradeOrder, User, UserId};
use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

#[cfg(test)]
pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} already exists")]
    Duplicate(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Stocks and the orders placed against them.
#[async_trait]
pub trait TradeStore: Send + Sync {
    async fn find_stock(&self, id: StockId) -> Result<Option<Stock>, StoreError>;

    async fn find_stock_by_name(&self, name: &str) -> Result<Option<Stock>, StoreError>;

    /// All stocks, ordered by name.
    async fn list_stocks(&self) -> Result<Vec<Stock>, StoreError>;

    /// Insert the stock, or update its price if the name is taken.
    async fn upsert_stock(&self, name: &str, price: Decimal) -> Result<Stock, StoreError>;

    async fn create_order(
        &self,
        user_id: &UserId,
        stock_id: StockId,
        method: TradeMethod,
        signed_quantity: i64,
    ) -> Result<TradeOrder, StoreError>;

    /// Signed sum of every order for the pair, 0 when there are none.
    async fn sum_quantity(&self, user_id: &UserId, stock_id: StockId) -> Result<i64, StoreError>;

    /// Signed sums for every stock the user has ordered, ordered by stock name.
    async fn sum_quantity_grouped_by_stock(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<(Stock, i64)>, StoreError>;
}

/// Users and their login sessions.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<(), StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn create_session(&self, token: &str, user_id: &UserId) -> Result<(), StoreError>;

    /// Token of the user's open session, if they have one.
    async fn session_for_user(&self, user_id: &UserId) -> Result<Option<String>, StoreError>;

    async fn user_for_session(&self, token: &str) -> Result<Option<User>, StoreError>;
}

pub trait Store: TradeStore + AccountStore {}

impl<T: TradeStore + AccountStore> Store for T {}
