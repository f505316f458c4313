//! Donation categories, donation records and the public summary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use validator::Validate;

use crate::types::{DonationCategoryId, DonationId};
use crate::validation::rules;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DonationCategory {
    pub id: DonationCategoryId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl DonationCategory {
    pub fn new(name: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: DonationCategoryId::new(),
            name,
            description,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn apply(&mut self, payload: UpdateDonationCategoryRequest) {
        if let Some(name) = payload.name {
            self.name = name;
        }
        if let Some(description) = payload.description {
            self.description = Some(description);
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDonationCategoryRequest {
    #[validate(length(min = 1, max = 100), custom(function = "rules::validate_not_blank"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDonationCategoryRequest {
    #[validate(length(min = 1, max = 100), custom(function = "rules::validate_not_blank"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "success" => Ok(PaymentStatus::Success),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(format!("unknown payment status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Donation {
    pub id: DonationId,
    /// `None` for anonymous donors.
    pub donor_name: Option<String>,
    pub amount: Decimal,
    pub category_id: DonationCategoryId,
    pub payment_status: PaymentStatus,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Donation {
    pub fn new(payload: CreateDonationRequest) -> Self {
        let now = Utc::now();
        Self {
            id: DonationId::new(),
            donor_name: payload.donor_name.filter(|name| !name.trim().is_empty()),
            amount: payload.amount,
            category_id: payload.category_id,
            payment_status: payload.payment_status.unwrap_or_default(),
            message: payload.message,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn apply(&mut self, payload: UpdateDonationRequest) {
        if let Some(donor_name) = payload.donor_name {
            self.donor_name = Some(donor_name).filter(|name| !name.trim().is_empty());
        }
        if let Some(amount) = payload.amount {
            self.amount = amount;
        }
        if let Some(category_id) = payload.category_id {
            self.category_id = category_id;
        }
        if let Some(status) = payload.payment_status {
            self.payment_status = status;
        }
        if let Some(message) = payload.message {
            self.message = Some(message);
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDonationRequest {
    #[validate(length(max = 255))]
    pub donor_name: Option<String>,
    #[validate(custom(function = "rules::validate_positive_amount"))]
    pub amount: Decimal,
    pub category_id: DonationCategoryId,
    pub payment_status: Option<PaymentStatus>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDonationRequest {
    #[validate(length(max = 255))]
    pub donor_name: Option<String>,
    #[validate(custom(function = "rules::validate_positive_amount"))]
    pub amount: Option<Decimal>,
    pub category_id: Option<DonationCategoryId>,
    pub payment_status: Option<PaymentStatus>,
    pub message: Option<String>,
}

/// Query string for the admin donation listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DonationListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub status: Option<String>,
}

impl DonationListQuery {
    pub fn pagination(&self) -> super::PaginationQuery {
        super::PaginationQuery {
            limit: self.limit,
            offset: self.offset,
        }
    }

    pub fn status(&self) -> Result<Option<PaymentStatus>, String> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }
}

/// Per-category slice of the donation summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CategoryTotal {
    pub category_id: DonationCategoryId,
    pub category_name: String,
    pub total_amount: Decimal,
    pub total_transactions: i64,
}

/// Aggregate over successful donations only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationSummary {
    pub total_amount: Decimal,
    pub total_transactions: i64,
    pub by_category: Vec<CategoryTotal>,
}

impl DonationSummary {
    pub fn from_categories(by_category: Vec<CategoryTotal>) -> Self {
        let total_amount = by_category.iter().map(|c| c.total_amount).sum();
        let total_transactions = by_category.iter().map(|c| c.total_transactions).sum();
        Self {
            total_amount,
            total_transactions,
            by_category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category_total(name: &str, amount: &str, count: i64) -> CategoryTotal {
        CategoryTotal {
            category_id: DonationCategoryId::new(),
            category_name: name.into(),
            total_amount: amount.parse().expect("decimal"),
            total_transactions: count,
        }
    }

    #[test]
    fn payment_status_parses_case_insensitively() {
        assert_eq!("SUCCESS".parse::<PaymentStatus>(), Ok(PaymentStatus::Success));
        assert!("refunded".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn new_donation_defaults_to_pending_and_anonymous() {
        let payload: CreateDonationRequest = serde_json::from_str(&format!(
            r#"{{"donor_name":"  ","amount":"25000.50","category_id":"{}"}}"#,
            DonationCategoryId::new()
        ))
        .expect("payload");
        assert!(payload.validate().is_ok());
        let donation = Donation::new(payload);
        assert_eq!(donation.payment_status, PaymentStatus::Pending);
        assert!(donation.donor_name.is_none());
        assert_eq!(donation.amount, "25000.50".parse::<Decimal>().unwrap());
    }

    #[test]
    fn zero_amount_fails_validation() {
        let payload = CreateDonationRequest {
            donor_name: None,
            amount: Decimal::ZERO,
            category_id: DonationCategoryId::new(),
            payment_status: None,
            message: None,
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("amount"));
    }

    #[test]
    fn list_query_status_filter() {
        let query = DonationListQuery {
            status: Some("failed".into()),
            ..Default::default()
        };
        assert_eq!(query.status(), Ok(Some(PaymentStatus::Failed)));
        assert_eq!(DonationListQuery::default().status(), Ok(None));
        let bad = DonationListQuery {
            status: Some("unknown".into()),
            ..Default::default()
        };
        assert!(bad.status().is_err());
    }

    #[test]
    fn summary_totals_sum_categories() {
        let summary = DonationSummary::from_categories(vec![
            category_total("Zakat", "150000", 3),
            category_total("Infaq", "50000.25", 2),
        ]);
        assert_eq!(summary.total_amount, "200000.25".parse::<Decimal>().unwrap());
        assert_eq!(summary.total_transactions, 5);
        assert_eq!(summary.by_category.len(), 2);
    }

    #[test]
    fn empty_summary_is_zero() {
        let summary = DonationSummary::from_categories(Vec::new());
        assert_eq!(summary.total_amount, Decimal::ZERO);
        assert_eq!(summary.total_transactions, 0);
    }
}
