use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{Page, Transaction};

/// Body for create and update. Every field is optional: create reports the
/// missing ones as validation errors, update keeps the stored values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub customer_name: Option<String>,
    pub item_type: Option<String>,
    pub phone_number: Option<String>,
    pub weight: Option<f64>,
    pub price: Option<f64>,
    pub status: Option<String>,
    pub gender: Option<String>,
    pub service_type: Option<String>,
    pub additional_services: Option<Vec<String>>,
}

impl TransactionRequest {
    /// Fills every absent field from the stored record.
    pub fn overlay(self, existing: &Transaction) -> Self {
        Self {
            customer_name: self
                .customer_name
                .or_else(|| Some(existing.customer_name.clone())),
            item_type: self.item_type.or_else(|| Some(existing.item_type.clone())),
            phone_number: self
                .phone_number
                .or_else(|| Some(existing.phone_number.clone())),
            weight: self.weight.or(Some(existing.weight)),
            price: self.price.or(Some(existing.price as f64)),
            status: self
                .status
                .or_else(|| Some(existing.status.as_str().to_string())),
            gender: self.gender.or_else(|| existing.gender.clone()),
            service_type: self.service_type.or_else(|| existing.service_type.clone()),
            additional_services: self
                .additional_services
                .or_else(|| Some(existing.additional_services.clone())),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListParams {
    pub fn page(&self) -> Page {
        Page {
            limit: self.limit,
            offset: self.offset.unwrap_or(0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub data: Vec<Transaction>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
    pub id: Uuid,
}
