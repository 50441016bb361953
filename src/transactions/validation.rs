use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use super::{
    dto::{ListParams, TransactionRequest},
    repo_types::{Page, TransactionDraft, TransactionStatus},
};
use crate::error::{AppError, AppResult, FieldError};

pub const MIN_NAME_CHARS: usize = 3;
pub const MIN_WEIGHT_KG: f64 = 0.1;
pub const MIN_PRICE: i64 = 1_000;
const MAX_PRICE: f64 = 1e12;

pub(crate) fn is_valid_phone(phone: &str) -> bool {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^\d{10,14}$").unwrap();
    }
    PHONE_RE.is_match(phone)
}

/// Checks every field and reports all failures at once.
pub fn validate(req: TransactionRequest) -> AppResult<TransactionDraft> {
    let mut errors = Vec::new();

    let customer_name = req.customer_name.unwrap_or_default().trim().to_string();
    if customer_name.chars().count() < MIN_NAME_CHARS {
        errors.push(FieldError::new(
            "customerName",
            "Customer name must be at least 3 characters",
        ));
    }

    let item_type = req.item_type.unwrap_or_default().trim().to_string();
    if item_type.is_empty() {
        errors.push(FieldError::new("itemType", "Item type is required"));
    }

    let phone_number = req.phone_number.unwrap_or_default().trim().to_string();
    if !is_valid_phone(&phone_number) {
        errors.push(FieldError::new(
            "phoneNumber",
            "Phone number must be 10-14 digits",
        ));
    }

    let weight = match req.weight {
        Some(w) if w.is_finite() && w >= MIN_WEIGHT_KG => w,
        Some(_) => {
            errors.push(FieldError::new("weight", "Weight must be at least 0.1 kg"));
            0.0
        }
        None => {
            errors.push(FieldError::new("weight", "Weight is required"));
            0.0
        }
    };

    let price = match req.price {
        Some(p) if p.is_finite() && p.fract() != 0.0 => {
            errors.push(FieldError::new("price", "Price must be a whole number"));
            0
        }
        Some(p) if p.is_finite() && p >= MIN_PRICE as f64 && p <= MAX_PRICE => p as i64,
        Some(p) if p > MAX_PRICE => {
            errors.push(FieldError::new("price", "Price must be at most 1000000000000"));
            0
        }
        Some(_) => {
            errors.push(FieldError::new("price", "Price must be at least 1000"));
            0
        }
        None => {
            errors.push(FieldError::new("price", "Price is required"));
            0
        }
    };

    let status = match req.status.as_deref() {
        None => TransactionStatus::Pending,
        Some(raw) => match raw.trim().parse::<TransactionStatus>() {
            Ok(status) => status,
            Err(_) => {
                errors.push(FieldError::new(
                    "status",
                    "Status must be one of pending, processing, completed, cancelled",
                ));
                TransactionStatus::Pending
            }
        },
    };

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(TransactionDraft {
        customer_name,
        item_type,
        phone_number,
        weight,
        price,
        status,
        gender: non_blank(req.gender),
        service_type: non_blank(req.service_type),
        additional_services: req
            .additional_services
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Ids that are not UUIDs never reach the store.
pub fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::invalid("id", "Invalid transaction id"))
}

pub fn validate_page(params: &ListParams) -> AppResult<Page> {
    let page = params.page();
    if page.limit.is_some_and(|l| l <= 0) {
        return Err(AppError::invalid("limit", "limit must be positive"));
    }
    if page.offset < 0 {
        return Err(AppError::invalid("offset", "offset must not be negative"));
    }
    Ok(page)
}
