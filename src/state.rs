use crate::auth::{
    jwt::TokenService,
    repo::{PgSessionStore, PgUserStore, SessionStore, UserStore},
};
use crate::config::AppConfig;
use crate::db::Database;
use crate::reports::services::ReportingService;
use crate::transactions::repo::{PgTransactionStore, TransactionStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: TokenService,
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub transactions: Arc<dyn TransactionStore>,
}

impl AppState {
    /// Wires the Postgres stores around one shared database handle.
    pub fn init(config: AppConfig, db: Arc<Database>) -> Self {
        let users = Arc::new(PgUserStore::new(db.clone())) as Arc<dyn UserStore>;
        let sessions = Arc::new(PgSessionStore::new(db.clone())) as Arc<dyn SessionStore>;
        let transactions = Arc::new(PgTransactionStore::new(db)) as Arc<dyn TransactionStore>;
        Self::from_parts(Arc::new(config), users, sessions, transactions)
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        transactions: Arc<dyn TransactionStore>,
    ) -> Self {
        let tokens = TokenService::from_config(&config.jwt);
        Self {
            config,
            tokens,
            users,
            sessions,
            transactions,
        }
    }

    pub fn reporting(&self) -> ReportingService {
        ReportingService::new(self.transactions.clone(), self.config.shop_offset)
    }

    /// State over empty in-memory stores.
    #[cfg(test)]
    pub fn fake() -> Self {
        crate::test_support::fake_state().0
    }
}
