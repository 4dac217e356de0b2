use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;
use crate::models::ProductRef;

/// Admin handling state of an enquiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "enquiry_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EnquiryStatus {
    New,
    InProgress,
    Closed,
}

impl EnquiryStatus {
    /// Parses the wire representation. Returns None for anything outside
    /// the fixed set, the caller decides how to report it.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(EnquiryStatus::New),
            "in_progress" => Some(EnquiryStatus::InProgress),
            "closed" => Some(EnquiryStatus::Closed),
            _ => None,
        }
    }
}

/// A persisted customer enquiry
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub topic: Option<String>,
    pub message: String,
    /// Legacy single-product reference
    pub product_id: Option<i32>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub product_ids: Option<Vec<String>>,
    pub all_products_of_category: bool,
    pub status: EnquiryStatus,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Enquiry plus its resolved legacy product reference
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryWithProduct {
    #[serde(flatten)]
    pub enquiry: Enquiry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductRef>,
}

/// Create response: the persisted record plus whether the admin
/// notification went out
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEnquiry {
    #[serde(flatten)]
    pub enquiry: Enquiry,
    pub email_sent: bool,
}

// =============================================================================
// Incoming shapes
// =============================================================================

/// `productIds` arrives either as a JSON array or as a comma-separated
/// string (legacy form submissions).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductIdList {
    Many(Vec<String>),
    Csv(String),
}

impl Default for ProductIdList {
    fn default() -> Self {
        ProductIdList::Many(Vec::new())
    }
}

impl ProductIdList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ProductIdList::Many(ids) => ids,
            ProductIdList::Csv(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

/// Boolean flags that may arrive as a real bool or as "true"/"false"
/// strings (legacy form submissions).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FlexibleBool {
    Bool(bool),
    Text(String),
}

impl Default for FlexibleBool {
    fn default() -> Self {
        FlexibleBool::Bool(false)
    }
}

impl FlexibleBool {
    pub fn as_bool(&self) -> bool {
        match self {
            FlexibleBool::Bool(b) => *b,
            FlexibleBool::Text(s) => s == "true",
        }
    }
}

/// The legacy `product` field may be a numeric id or a stringified one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LegacyProductRef {
    Id(i32),
    Text(String),
}

impl LegacyProductRef {
    pub fn as_id(&self) -> Option<i32> {
        match self {
            LegacyProductRef::Id(id) => Some(*id),
            LegacyProductRef::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Raw submission body, accepting both the legacy and the current shape
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnquiryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub message: String,
    /// Legacy single product
    #[serde(default)]
    pub product: Option<LegacyProductRef>,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub category_name: String,
    #[serde(default)]
    pub product_ids: ProductIdList,
    #[serde(default)]
    pub all_products_of_category: FlexibleBool,
}

/// Validated, normalized submission ready for persistence
#[derive(Debug, Clone)]
pub struct NewEnquiry {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub topic: Option<String>,
    pub message: String,
    pub product_id: Option<i32>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub product_ids: Vec<String>,
    pub all_products_of_category: bool,
}

impl CreateEnquiryRequest {
    /// Validates and normalizes a submission: trims text, requires name and
    /// message, and at least one of email/phone.
    pub fn normalize(self) -> Result<NewEnquiry, AppError> {
        let name = self.name.trim().to_string();
        let message = self.message.trim().to_string();
        let email = self.email.trim().to_string();
        let phone = self.phone.trim().to_string();

        if name.is_empty() || message.is_empty() {
            return Err(AppError::Validation(
                "Name and message are required.".to_string(),
            ));
        }

        if email.is_empty() && phone.is_empty() {
            return Err(AppError::Validation(
                "Please provide either email or phone.".to_string(),
            ));
        }

        let topic = self.topic.trim().to_string();
        let category_id = self.category_id.trim().to_string();
        let category_name = self.category_name.trim().to_string();

        Ok(NewEnquiry {
            name,
            email: non_empty(email),
            phone: non_empty(phone),
            topic: non_empty(topic),
            message,
            product_id: self.product.as_ref().and_then(LegacyProductRef::as_id),
            category_id: non_empty(category_id),
            category_name: non_empty(category_name),
            product_ids: self.product_ids.into_vec(),
            all_products_of_category: self.all_products_of_category.as_bool(),
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Admin-side patch: status and/or read flag
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnquiryRequest {
    pub status: Option<String>,
    pub is_read: Option<FlexibleBool>,
}
