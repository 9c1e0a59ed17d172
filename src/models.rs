use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type UserId = String;
pub type StockId = i64;

/// Bounds of a single order's quantity, matching the 32-bit order column.
pub const MAX_TRADE_QUANTITY: i64 = i32::MAX as i64;
pub const MIN_TRADE_QUANTITY: i64 = i32::MIN as i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub id: StockId,
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOrder {
    pub id: i64,
    pub user_id: UserId,
    pub stock_id: StockId,
    pub trade_method: TradeMethod,
    /// Signed: positive for Buy, negative for Sell.
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeMethod {
    Buy,
    Sell,
}

impl TradeMethod {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Buy" => Some(TradeMethod::Buy),
            "Sell" => Some(TradeMethod::Sell),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeMethod::Buy => "Buy",
            TradeMethod::Sell => "Sell",
        }
    }

    /// Quantity as stored on the order row.
    pub fn signed_quantity(&self, quantity: i64) -> i64 {
        match self {
            TradeMethod::Buy => quantity,
            TradeMethod::Sell => -quantity,
        }
    }
}

impl fmt::Display for TradeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub is_staff: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_method_parse_is_case_sensitive() {
        assert_eq!(TradeMethod::parse("Buy"), Some(TradeMethod::Buy));
        assert_eq!(TradeMethod::parse("Sell"), Some(TradeMethod::Sell));
        assert_eq!(TradeMethod::parse("buy"), None);
        assert_eq!(TradeMethod::parse("Order"), None);
        assert_eq!(TradeMethod::parse(""), None);
    }

    #[test]
    fn test_signed_quantity() {
        assert_eq!(TradeMethod::Buy.signed_quantity(7), 7);
        assert_eq!(TradeMethod::Sell.signed_quantity(7), -7);
    }

    #[test]
    fn test_trade_method_serializes_as_variant_name() {
        let json = serde_json::to_string(&TradeMethod::Sell).unwrap();
        assert_eq!(json, "\"Sell\"");
        assert_eq!(TradeMethod::Buy.to_string(), "Buy");
    }
}
