use super::Database;
use crate::models::{Stock, StockId, TradeMethod, TradeOrder, User, UserId};
use crate::store::{AccountStore, StoreError, TradeStore};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};
use std::str::FromStr;

fn stock_from_row(row: &SqliteRow) -> Result<Stock, StoreError> {
    let price: String = row.try_get("price")?;
    let price = Decimal::from_str(&price)
        .map_err(|e| StoreError::Corrupt(format!("stock price {:?}: {}", price, e)))?;

    Ok(Stock {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        price,
    })
}

fn user_from_row(row: &SqliteRow) -> Result<User, StoreError> {
    Ok(User {
        id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        is_staff: row.try_get("is_staff")?,
    })
}

fn price_text(price: Decimal) -> String {
    format!("{:.2}", price)
}

#[async_trait]
impl TradeStore for Database {
    async fn find_stock(&self, id: StockId) -> Result<Option<Stock>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price FROM stocks WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(stock_from_row).transpose()
    }

    async fn find_stock_by_name(&self, name: &str) -> Result<Option<Stock>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price FROM stocks WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(stock_from_row).transpose()
    }

    async fn list_stocks(&self) -> Result<Vec<Stock>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, price FROM stocks ORDER BY name
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(stock_from_row).collect()
    }

    async fn upsert_stock(&self, name: &str, price: Decimal) -> Result<Stock, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO stocks (name, price)
            VALUES (?, ?)
            ON CONFLICT(name) DO UPDATE SET
                price = excluded.price
            "#,
        )
        .bind(name)
        .bind(price_text(price))
        .execute(self.pool())
        .await?;

        self.find_stock_by_name(name)
            .await?
            .ok_or_else(|| StoreError::Corrupt(format!("stock {} vanished after upsert", name)))
    }

    async fn create_order(
        &self,
        user_id: &UserId,
        stock_id: StockId,
        method: TradeMethod,
        signed_quantity: i64,
    ) -> Result<TradeOrder, StoreError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO trade_orders (user_id, stock_id, trade_method, quantity, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(stock_id)
        .bind(method.as_str())
        .bind(signed_quantity)
        .bind(created_at)
        .execute(self.pool())
        .await?;

        Ok(TradeOrder {
            id: result.last_insert_rowid(),
            user_id: user_id.clone(),
            stock_id,
            trade_method: method,
            quantity: signed_quantity,
            created_at,
        })
    }

    async fn sum_quantity(&self, user_id: &UserId, stock_id: StockId) -> Result<i64, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(quantity), 0) AS total
            FROM trade_orders
            WHERE user_id = ? AND stock_id = ?
            "#,
        )
        .bind(user_id)
        .bind(stock_id)
        .fetch_one(self.pool())
        .await?;

        Ok(row.try_get("total")?)
    }

    async fn sum_quantity_grouped_by_stock(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<(Stock, i64)>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.name, s.price, SUM(o.quantity) AS total
            FROM trade_orders o
            JOIN stocks s ON s.id = o.stock_id
            WHERE o.user_id = ?
            GROUP BY s.id, s.name, s.price
            ORDER BY s.name
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        rows.iter()
            .map(|row| -> Result<(Stock, i64), StoreError> {
                Ok((stock_from_row(row)?, row.try_get("total")?))
            })
            .collect()
    }
}

#[async_trait]
impl AccountStore for Database {
    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (user_id, username, password_hash, is_staff)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::Duplicate(format!("Username {}", user.username)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, username, password_hash, is_staff FROM users WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn create_session(&self, token: &str, user_id: &UserId) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(Utc::now())
        .execute(self.pool())
        .await?;

        Ok(())
    }

    async fn session_for_user(&self, user_id: &UserId) -> Result<Option<String>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT token FROM sessions WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(|r| r.try_get::<String, _>("token")).transpose()?)
    }

    async fn user_for_session(&self, token: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT u.user_id, u.username, u.password_hash, u.is_staff
            FROM sessions s
            JOIN users u ON u.user_id = s.user_id
            WHERE s.token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }
}
