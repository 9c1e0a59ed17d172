use crate::{
    error::{AppError, FieldErrors},
    models::Stock,
    routes::auth::{AuthUser, StaffUser},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

/// Largest price a stock may carry: five digits, two of them decimals.
fn max_price() -> Decimal {
    Decimal::new(99999, 2)
}

#[derive(Deserialize)]
pub struct StockPriceRequest {
    pub price: Option<Value>,
}

pub async fn list_stocks(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<Stock>>, AppError> {
    Ok(Json(state.store.list_stocks().await?))
}

pub async fn put_stock(
    State(state): State<AppState>,
    StaffUser(user): StaffUser,
    Path(name): Path<String>,
    Json(req): Json<StockPriceRequest>,
) -> Result<Json<Stock>, AppError> {
    let price = parse_price(req.price.as_ref())
        .map_err(|message| AppError::Validation(FieldErrors::single("price", message)))?;

    let stock = state.store.upsert_stock(&name, price).await?;
    tracing::info!("{} set price of {} to {}", user.username, stock.name, stock.price);
    Ok(Json(stock))
}

fn parse_price(value: Option<&Value>) -> Result<Decimal, String> {
    let text = match value {
        None => return Err("This field is required.".to_string()),
        Some(Value::Null) => return Err("This field may not be null.".to_string()),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(_) => return Err("A valid number is required.".to_string()),
    };

    let mut price = Decimal::from_str(&text).map_err(|_| "A valid number is required.".to_string())?;
    if price.normalize().scale() > 2 {
        return Err("Ensure that there are no more than 2 decimal places.".to_string());
    }
    if price < Decimal::ZERO {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }
    if price > max_price() {
        return Err("Ensure that there are no more than 5 digits in total.".to_string());
    }

    // Stored and displayed with exactly two places
    price.rescale(2);
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_price_accepts_numbers_and_strings() {
        assert_eq!(parse_price(Some(&json!("1.00"))), Ok(Decimal::new(100, 2)));
        assert_eq!(parse_price(Some(&json!(12.5))), Ok(Decimal::new(1250, 2)));
        assert_eq!(parse_price(Some(&json!(3))), Ok(Decimal::new(300, 2)));
        assert_eq!(parse_price(Some(&json!("999.99"))), Ok(max_price()));
    }

    #[test]
    fn test_parse_price_rescales_to_two_places() {
        let price = parse_price(Some(&json!("7"))).unwrap();
        assert_eq!(price.scale(), 2);
        assert_eq!(price.to_string(), "7.00");
    }

    #[test]
    fn test_parse_price_rejects_out_of_range() {
        assert!(parse_price(None).is_err());
        assert!(parse_price(Some(&json!(null))).is_err());
        assert!(parse_price(Some(&json!("abc"))).is_err());
        assert!(parse_price(Some(&json!("1.005"))).is_err());
        assert!(parse_price(Some(&json!("-1.00"))).is_err());
        assert!(parse_price(Some(&json!("1000.00"))).is_err());
        assert!(parse_price(Some(&json!([1]))).is_err());
    }
}
