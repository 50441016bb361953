use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Lifecycle state of an order. Any state may be set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl TransactionStatus {
    /// Every status, in display order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Processing,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown transaction status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for TransactionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Row as stored in the `transactions` table.
#[derive(Debug, FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub customer_name: String,
    pub item_type: String,
    pub phone_number: String,
    pub weight: f64,
    pub price: i64,
    pub status: String,
    pub gender: Option<String>,
    pub service_type: Option<String>,
    pub additional_services: Vec<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub customer_name: String,
    pub item_type: String,
    pub phone_number: String,
    pub weight: f64,
    pub price: i64,
    pub status: TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    pub additional_services: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = UnknownStatus;

    fn try_from(r: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            customer_name: r.customer_name,
            item_type: r.item_type,
            phone_number: r.phone_number,
            weight: r.weight,
            price: r.price,
            status: r.status.parse()?,
            gender: r.gender,
            service_type: r.service_type,
            additional_services: r.additional_services,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Validated field values for an insert or a full update.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub customer_name: String,
    pub item_type: String,
    pub phone_number: String,
    pub weight: f64,
    pub price: i64,
    pub status: TransactionStatus,
    pub gender: Option<String>,
    pub service_type: Option<String>,
    pub additional_services: Vec<String>,
}

/// Optional window `[from, until)` and free-text query, combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub from: Option<OffsetDateTime>,
    pub until: Option<OffsetDateTime>,
    /// Lowercased, trimmed; `None` when blank.
    pub text: Option<String>,
}

impl TransactionFilter {
    pub fn with_text(mut self, text: Option<&str>) -> Self {
        self.text = text
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());
        self
    }

    pub fn matches(&self, t: &Transaction) -> bool {
        if self.from.is_some_and(|from| t.created_at < from) {
            return false;
        }
        if self.until.is_some_and(|until| t.created_at >= until) {
            return false;
        }
        match &self.text {
            None => true,
            Some(q) => {
                t.customer_name.to_lowercase().contains(q)
                    || t.item_type.to_lowercase().contains(q)
                    || t.phone_number.to_lowercase().contains(q)
            }
        }
    }
}

/// `limit = None` returns every row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: i64,
}
