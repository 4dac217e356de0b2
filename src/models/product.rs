use serde::Serialize;
use sqlx::FromRow;

/// Minimal product projection used when resolving enquiry references
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    pub id: i32,
    pub name: String,
}
