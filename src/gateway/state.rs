use std::sync::Arc;

use crate::service::LedgerService;

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<LedgerService>,
    /// Reported by /health
    pub version: &'static str,
}

impl AppState {
    pub fn new(ledger: Arc<LedgerService>) -> Self {
        Self {
            ledger,
            version: concat!(env!("CARGO_PKG_VERSION"), "+", env!("LEDGER_BUILD_REV")),
        }
    }
}
