use crate::store::Store;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Held across the on-hand read, the check and the order insert of a trade.
    pub trade_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            trade_lock: Arc::new(Mutex::new(())),
        }
    }
}
