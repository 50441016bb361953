//! In-memory stores backing `AppState::fake()`.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::auth::{
    repo::{SessionStore, UserStore},
    repo_types::{Session, User},
};
use crate::transactions::{
    repo::TransactionStore,
    repo_types::{Page, Transaction, TransactionDraft, TransactionFilter, TransactionStatus},
};

#[derive(Default)]
struct Outage(AtomicBool);

impl Outage {
    fn set(&self, failing: bool) {
        self.0.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.0.load(Ordering::SeqCst) {
            anyhow::bail!("store unavailable");
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
    outage: Outage,
}

impl MemoryUserStore {
    pub fn set_failing(&self, failing: bool) {
        self.outage.set(failing);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        self.outage.check()?;
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        self.outage.check()?;
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        self.outage.check()?;
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Ok(None);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(Some(user))
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<Vec<Session>>,
    outage: Outage,
}

impl MemorySessionStore {
    pub fn set_failing(&self, failing: bool) {
        self.outage.set(failing);
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(
        &self,
        user_id: Uuid,
        token: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<Session> {
        self.outage.check()?;
        let mut sessions = self.sessions.lock().unwrap();
        // Mirrors the UNIQUE (token) constraint on the sessions table.
        if sessions.iter().any(|s| s.token == token) {
            anyhow::bail!("duplicate session token");
        }
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            token: token.into(),
            expires,
        };
        sessions.push(session.clone());
        Ok(session)
    }

    async fn find_active(
        &self,
        token: &str,
        user_id: Uuid,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<Session>> {
        self.outage.check()?;
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions
            .iter()
            .find(|s| s.token == token && s.user_id == user_id && s.is_active(now))
            .cloned())
    }

    async fn delete_by_token(&self, token: &str) -> anyhow::Result<bool> {
        self.outage.check()?;
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| s.token != token);
        Ok(sessions.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryTransactionStore {
    rows: Mutex<Vec<Transaction>>,
    outage: Outage,
}

impl MemoryTransactionStore {
    pub fn set_failing(&self, failing: bool) {
        self.outage.set(failing);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Stores a record with an explicit creation time.
    pub fn seed(
        &self,
        customer_name: &str,
        created_at: OffsetDateTime,
        price: i64,
        status: TransactionStatus,
    ) -> Transaction {
        let t = Transaction {
            id: Uuid::new_v4(),
            customer_name: customer_name.into(),
            item_type: "Pakaian".into(),
            phone_number: "081234567890".into(),
            weight: 2.5,
            price,
            status,
            gender: None,
            service_type: None,
            additional_services: vec![],
            created_at,
            updated_at: created_at,
        };
        self.rows.lock().unwrap().push(t.clone());
        t
    }

    pub fn seed_days_ago(&self, customer_name: &str, days: i64, price: i64, status: &str) -> Transaction {
        let status = status.parse().expect("known status");
        self.seed(
            customer_name,
            OffsetDateTime::now_utc() - Duration::days(days),
            price,
            status,
        )
    }

    fn newest_first(mut rows: Vec<Transaction>) -> Vec<Transaction> {
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }
}

fn apply(draft: &TransactionDraft, t: &mut Transaction) {
    t.customer_name = draft.customer_name.clone();
    t.item_type = draft.item_type.clone();
    t.phone_number = draft.phone_number.clone();
    t.weight = draft.weight;
    t.price = draft.price;
    t.status = draft.status;
    t.gender = draft.gender.clone();
    t.service_type = draft.service_type.clone();
    t.additional_services = draft.additional_services.clone();
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn list(&self, page: Page) -> anyhow::Result<Vec<Transaction>> {
        self.outage.check()?;
        let rows = Self::newest_first(self.rows.lock().unwrap().clone());
        let rows = rows.into_iter().skip(page.offset as usize);
        Ok(match page.limit {
            Some(limit) => rows.take(limit as usize).collect(),
            None => rows.collect(),
        })
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Transaction>> {
        self.outage.check()?;
        Ok(self.rows.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn insert(&self, draft: &TransactionDraft) -> anyhow::Result<Transaction> {
        self.outage.check()?;
        let now = OffsetDateTime::now_utc();
        let mut t = Transaction {
            id: Uuid::new_v4(),
            customer_name: String::new(),
            item_type: String::new(),
            phone_number: String::new(),
            weight: 0.0,
            price: 0,
            status: TransactionStatus::Pending,
            gender: None,
            service_type: None,
            additional_services: vec![],
            created_at: now,
            updated_at: now,
        };
        apply(draft, &mut t);
        self.rows.lock().unwrap().push(t.clone());
        Ok(t)
    }

    async fn update(&self, id: Uuid, draft: &TransactionDraft) -> anyhow::Result<Option<Transaction>> {
        self.outage.check()?;
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|t| t.id == id).map(|t| {
            apply(draft, t);
            t.updated_at = OffsetDateTime::now_utc();
            t.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        self.outage.check()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|t| t.id != id);
        Ok(rows.len() < before)
    }

    async fn search(&self, filter: &TransactionFilter) -> anyhow::Result<Vec<Transaction>> {
        self.outage.check()?;
        let rows = self.rows.lock().unwrap();
        Ok(Self::newest_first(
            rows.iter().filter(|t| filter.matches(t)).cloned().collect(),
        ))
    }

    async fn count(&self, status: Option<TransactionStatus>) -> anyhow::Result<i64> {
        self.outage.check()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .count() as i64)
    }

    async fn count_by_status(&self) -> anyhow::Result<Vec<(TransactionStatus, i64)>> {
        self.outage.check()?;
        let rows = self.rows.lock().unwrap();
        Ok(TransactionStatus::ALL
            .into_iter()
            .map(|s| (s, rows.iter().filter(|t| t.status == s).count() as i64))
            .filter(|(_, n)| *n > 0)
            .collect())
    }

    async fn sum_price(&self, since: Option<OffsetDateTime>) -> anyhow::Result<i64> {
        self.outage.check()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|t| since.map_or(true, |s| t.created_at >= s))
            .map(|t| t.price)
            .sum())
    }

    async fn revenue_points(&self, since: OffsetDateTime) -> anyhow::Result<Vec<(OffsetDateTime, i64)>> {
        self.outage.check()?;
        let rows = self.rows.lock().unwrap();
        let mut points: Vec<_> = rows
            .iter()
            .filter(|t| t.created_at >= since)
            .map(|t| (t.created_at, t.price))
            .collect();
        points.sort_by_key(|(at, _)| *at);
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_tokens_are_unique() {
        let store = MemorySessionStore::default();
        let user_id = Uuid::new_v4();
        let expires = OffsetDateTime::now_utc() + Duration::hours(1);
        store.create(user_id, "tok", expires).await.expect("first");
        assert!(store.create(user_id, "tok", expires).await.is_err());
        assert_eq!(store.len(), 1);
    }
}
