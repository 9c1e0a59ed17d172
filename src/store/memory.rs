use super::{AccountStore, StoreError, TradeStore};
use crate::models::{Stock, StockId, TradeMethod, TradeOrder, User, UserId};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

// SQLite fails SUM() the same way
fn overflow() -> StoreError {
    StoreError::Corrupt("integer overflow".to_string())
}

/// In-memory store used by the handler tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    stocks: Vec<Stock>,
    orders: Vec<TradeOrder>,
    users: HashMap<UserId, User>,
    sessions: HashMap<String, UserId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn orders(&self) -> Vec<TradeOrder> {
        self.inner.read().await.orders.clone()
    }
}

#[async_trait]
impl TradeStore for MemoryStore {
    async fn find_stock(&self, id: StockId) -> Result<Option<Stock>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.stocks.iter().find(|s| s.id == id).cloned())
    }

    async fn find_stock_by_name(&self, name: &str) -> Result<Option<Stock>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.stocks.iter().find(|s| s.name == name).cloned())
    }

    async fn list_stocks(&self) -> Result<Vec<Stock>, StoreError> {
        let inner = self.inner.read().await;
        let mut stocks = inner.stocks.clone();
        stocks.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stocks)
    }

    async fn upsert_stock(&self, name: &str, price: Decimal) -> Result<Stock, StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(stock) = inner.stocks.iter_mut().find(|s| s.name == name) {
            stock.price = price;
            return Ok(stock.clone());
        }

        let stock = Stock {
            id: inner.stocks.len() as StockId + 1,
            name: name.to_string(),
            price,
        };
        inner.stocks.push(stock.clone());
        Ok(stock)
    }

    async fn create_order(
        &self,
        user_id: &UserId,
        stock_id: StockId,
        method: TradeMethod,
        signed_quantity: i64,
    ) -> Result<TradeOrder, StoreError> {
        let mut inner = self.inner.write().await;
        let order = TradeOrder {
            id: inner.orders.len() as i64 + 1,
            user_id: user_id.clone(),
            stock_id,
            trade_method: method,
            quantity: signed_quantity,
            created_at: chrono::Utc::now(),
        };
        inner.orders.push(order.clone());
        Ok(order)
    }

    async fn sum_quantity(&self, user_id: &UserId, stock_id: StockId) -> Result<i64, StoreError> {
        let inner = self.inner.read().await;
        inner
            .orders
            .iter()
            .filter(|o| &o.user_id == user_id && o.stock_id == stock_id)
            .try_fold(0i64, |total, o| total.checked_add(o.quantity))
            .ok_or_else(overflow)
    }

    async fn sum_quantity_grouped_by_stock(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<(Stock, i64)>, StoreError> {
        let inner = self.inner.read().await;
        let mut totals: HashMap<StockId, i64> = HashMap::new();
        for order in inner.orders.iter().filter(|o| &o.user_id == user_id) {
            let total = totals.entry(order.stock_id).or_insert(0);
            *total = total.checked_add(order.quantity).ok_or_else(overflow)?;
        }

        let mut grouped = BTreeMap::new();
        for (stock_id, total) in totals {
            let stock = inner
                .stocks
                .iter()
                .find(|s| s.id == stock_id)
                .cloned()
                .ok_or_else(|| StoreError::Corrupt(format!("order for unknown stock {}", stock_id)))?;
            grouped.insert(stock.name.clone(), (stock, total));
        }
        Ok(grouped.into_values().collect())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate(format!("Username {}", user.username)));
        }
        inner.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn create_session(&self, token: &str, user_id: &UserId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.sessions.insert(token.to_string(), user_id.clone());
        Ok(())
    }

    async fn session_for_user(&self, user_id: &UserId) -> Result<Option<String>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .sessions
            .iter()
            .find(|(_, owner)| *owner == user_id)
            .map(|(token, _)| token.clone()))
    }

    async fn user_for_session(&self, token: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .sessions
            .get(token)
            .and_then(|user_id| inner.users.get(user_id))
            .cloned())
    }
}
