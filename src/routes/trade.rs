use crate::{
    error::{AppError, FieldErrors},
    models::*,
    routes::auth::AuthUser,
    services::trading_service::{self, TradeError},
    state::AppState,
};
use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use serde_json::{Map, Value};

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const INVALID_INTEGER: &str = "A valid integer is required.";

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// A trade body that passed field validation.
#[derive(Debug)]
pub struct TradeRequest {
    pub stock: Stock,
    pub quantity: i64,
    pub trade_method: TradeMethod,
}

impl From<TradeError> for AppError {
    fn from(err: TradeError) -> Self {
        match err {
            TradeError::Store(e) => e.into(),
            rejected => AppError::Rejected(rejected.to_string()),
        }
    }
}

pub async fn post_trade(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let fields = parse_object(&body)?;
    let req = validate(&state, &fields).await?;

    trading_service::execute_trade(&state, &user.id, &req.stock, req.trade_method, req.quantity)
        .await?;

    Ok(Json(MessageResponse {
        message: format!("Stock trade {} processing was successful", req.trade_method),
    }))
}

fn parse_object(body: &[u8]) -> Result<Map<String, Value>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AppError::Validation(FieldErrors::single(
            "non_field_errors",
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                type_name(&other)
            ),
        ))),
        Err(e) => Err(AppError::BadRequest(format!("JSON parse error - {}", e))),
    }
}

/// Collects every field error before giving up, so the caller sees them all.
async fn validate(state: &AppState, fields: &Map<String, Value>) -> Result<TradeRequest, AppError> {
    let mut errors = FieldErrors::default();

    let stock_id = collect(&mut errors, "stock", field(fields, "stock").and_then(parse_pk));
    let quantity = collect(
        &mut errors,
        "quantity",
        field(fields, "quantity").and_then(parse_quantity),
    );
    let trade_method = collect(
        &mut errors,
        "trade_method",
        field(fields, "trade_method").and_then(parse_trade_method),
    );

    let stock = match stock_id {
        Some(id) => {
            let stock = state.store.find_stock(id).await?;
            if stock.is_none() {
                errors.add("stock", format!("Invalid pk \"{}\" - object does not exist.", id));
            }
            stock
        }
        None => None,
    };

    match (stock, quantity, trade_method) {
        (Some(stock), Some(quantity), Some(trade_method)) if errors.is_empty() => Ok(TradeRequest {
            stock,
            quantity,
            trade_method,
        }),
        _ => Err(AppError::Validation(errors)),
    }
}

fn collect<T>(errors: &mut FieldErrors, name: &str, result: Result<T, String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors.add(name, message);
            None
        }
    }
}

fn field<'a>(fields: &'a Map<String, Value>, name: &str) -> Result<&'a Value, String> {
    match fields.get(name) {
        None => Err(REQUIRED.to_string()),
        Some(Value::Null) => Err(NOT_NULL.to_string()),
        Some(value) => Ok(value),
    }
}

fn parse_pk(value: &Value) -> Result<StockId, String> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| incorrect_pk_type(value)),
        Value::String(s) if s.is_empty() => Err(NOT_NULL.to_string()),
        Value::String(s) => s.trim().parse().map_err(|_| incorrect_pk_type(value)),
        other => Err(incorrect_pk_type(other)),
    }
}

fn incorrect_pk_type(value: &Value) -> String {
    format!("Incorrect type. Expected pk value, received {}.", type_name(value))
}

fn parse_integer(value: &Value) -> Result<i64, String> {
    match value {
        // Whole floats such as 2.0 are accepted
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| INVALID_INTEGER.to_string()),
        // Likewise "2.0", "2." and "2.00"
        Value::String(s) => {
            let s = s.trim();
            let digits = match s.split_once('.') {
                Some((whole, fraction)) if fraction.chars().all(|c| c == '0') => whole,
                _ => s,
            };
            digits.parse().map_err(|_| INVALID_INTEGER.to_string())
        }
        _ => Err(INVALID_INTEGER.to_string()),
    }
}

/// An integer inside the range an order row can hold.
fn parse_quantity(value: &Value) -> Result<i64, String> {
    let quantity = parse_integer(value)?;
    if quantity > MAX_TRADE_QUANTITY {
        return Err(format!(
            "Ensure this value is less than or equal to {}.",
            MAX_TRADE_QUANTITY
        ));
    }
    if quantity < MIN_TRADE_QUANTITY {
        return Err(format!(
            "Ensure this value is greater than or equal to {}.",
            MIN_TRADE_QUANTITY
        ));
    }
    Ok(quantity)
}

fn parse_trade_method(value: &Value) -> Result<TradeMethod, String> {
    match value {
        Value::String(s) => {
            TradeMethod::parse(s).ok_or_else(|| format!("\"{}\" is not a valid choice.", s))
        }
        other => Err(format!("\"{}\" is not a valid choice.", other)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
