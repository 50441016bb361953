use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{
    Page, Transaction, TransactionDraft, TransactionFilter, TransactionRow, TransactionStatus,
};
use crate::db::Database;

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Newest first.
    async fn list(&self, page: Page) -> anyhow::Result<Vec<Transaction>>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Transaction>>;
    async fn insert(&self, draft: &TransactionDraft) -> anyhow::Result<Transaction>;
    /// Replaces every field and bumps `updated_at`. `None` when the id is unknown.
    async fn update(&self, id: Uuid, draft: &TransactionDraft) -> anyhow::Result<Option<Transaction>>;
    /// `false` when nothing was deleted.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Newest first.
    async fn search(&self, filter: &TransactionFilter) -> anyhow::Result<Vec<Transaction>>;

    async fn count(&self, status: Option<TransactionStatus>) -> anyhow::Result<i64>;
    async fn count_by_status(&self) -> anyhow::Result<Vec<(TransactionStatus, i64)>>;
    /// Sum of `price` for rows created at or after `since` (all rows when `None`).
    async fn sum_price(&self, since: Option<OffsetDateTime>) -> anyhow::Result<i64>;
    /// `(created_at, price)` of rows created at or after `since`.
    async fn revenue_points(&self, since: OffsetDateTime) -> anyhow::Result<Vec<(OffsetDateTime, i64)>>;
}

const COLUMNS: &str = "id, customer_name, item_type, phone_number, weight, price, status, \
                       gender, service_type, additional_services, created_at, updated_at";

pub struct PgTransactionStore {
    db: Arc<Database>,
}

impl PgTransactionStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

fn into_domain(rows: Vec<TransactionRow>) -> anyhow::Result<Vec<Transaction>> {
    rows.into_iter()
        .map(|r| Transaction::try_from(r).context("decode transaction row"))
        .collect()
}

/// `%text%` for ILIKE with the pattern metacharacters escaped.
fn like_pattern(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn list(&self, page: Page) -> anyhow::Result<Vec<Transaction>> {
        // LIMIT NULL means no limit in Postgres.
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {COLUMNS} FROM transactions ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.db.pool().await?)
        .await
        .context("list transactions")?;
        into_domain(rows)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {COLUMNS} FROM transactions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool().await?)
        .await
        .context("get transaction")?;
        row.map(|r| Transaction::try_from(r).context("decode transaction row"))
            .transpose()
    }

    async fn insert(&self, draft: &TransactionDraft) -> anyhow::Result<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r#"
            INSERT INTO transactions
                (id, customer_name, item_type, phone_number, weight, price, status,
                 gender, service_type, additional_services)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&draft.customer_name)
        .bind(&draft.item_type)
        .bind(&draft.phone_number)
        .bind(draft.weight)
        .bind(draft.price)
        .bind(draft.status.as_str())
        .bind(&draft.gender)
        .bind(&draft.service_type)
        .bind(&draft.additional_services)
        .fetch_one(self.db.pool().await?)
        .await
        .context("insert transaction")?;
        Ok(Transaction::try_from(row)?)
    }

    async fn update(&self, id: Uuid, draft: &TransactionDraft) -> anyhow::Result<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r#"
            UPDATE transactions
               SET customer_name = $2, item_type = $3, phone_number = $4, weight = $5,
                   price = $6, status = $7, gender = $8, service_type = $9,
                   additional_services = $10, updated_at = now()
             WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&draft.customer_name)
        .bind(&draft.item_type)
        .bind(&draft.phone_number)
        .bind(draft.weight)
        .bind(draft.price)
        .bind(draft.status.as_str())
        .bind(&draft.gender)
        .bind(&draft.service_type)
        .bind(&draft.additional_services)
        .fetch_optional(self.db.pool().await?)
        .await
        .context("update transaction")?;
        row.map(|r| Transaction::try_from(r).context("decode transaction row"))
            .transpose()
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(self.db.pool().await?)
            .await
            .context("delete transaction")?;
        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, filter: &TransactionFilter) -> anyhow::Result<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            r#"
            SELECT {COLUMNS}
              FROM transactions
             WHERE ($1::timestamptz IS NULL OR created_at >= $1)
               AND ($2::timestamptz IS NULL OR created_at < $2)
               AND ($3::text IS NULL
                    OR customer_name ILIKE $3
                    OR item_type ILIKE $3
                    OR phone_number ILIKE $3)
             ORDER BY created_at DESC
            "#
        ))
        .bind(filter.from)
        .bind(filter.until)
        .bind(filter.text.as_deref().map(like_pattern))
        .fetch_all(self.db.pool().await?)
        .await
        .context("search transactions")?;
        into_domain(rows)
    }

    async fn count(&self, status: Option<TransactionStatus>) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM transactions WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(status.map(TransactionStatus::as_str))
        .fetch_one(self.db.pool().await?)
        .await
        .context("count transactions")?;
        Ok(count)
    }

    async fn count_by_status(&self) -> anyhow::Result<Vec<(TransactionStatus, i64)>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM transactions GROUP BY status")
                .fetch_all(self.db.pool().await?)
                .await
                .context("count transactions by status")?;
        Ok(rows
            .into_iter()
            .filter_map(|(status, n)| status.parse().ok().map(|s| (s, n)))
            .collect())
    }

    async fn sum_price(&self, since: Option<OffsetDateTime>) -> anyhow::Result<i64> {
        // SUM(bigint) is numeric; cast back.
        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(price), 0)::BIGINT
              FROM transactions
             WHERE ($1::timestamptz IS NULL OR created_at >= $1)
            "#,
        )
        .bind(since)
        .fetch_one(self.db.pool().await?)
        .await
        .context("sum transaction prices")?;
        Ok(total)
    }

    async fn revenue_points(&self, since: OffsetDateTime) -> anyhow::Result<Vec<(OffsetDateTime, i64)>> {
        let rows: Vec<(OffsetDateTime, i64)> = sqlx::query_as(
            "SELECT created_at, price FROM transactions WHERE created_at >= $1 ORDER BY created_at",
        )
        .bind(since)
        .fetch_all(self.db.pool().await?)
        .await
        .context("load revenue points")?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("budi"), "%budi%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
