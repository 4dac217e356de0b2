use std::collections::HashMap;

use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{Enquiry, EnquiryStatus, EnquiryWithProduct, NewEnquiry, ProductRef};

pub struct EnquiryService;

const ENQUIRY_COLUMNS: &str = "id, name, email, phone, topic, message, product_id, category_id, \
     category_name, product_ids, all_products_of_category, status, is_read, created_at, updated_at";

impl EnquiryService {
    /// Persists a validated submission
    pub async fn create(pool: &PgPool, new: &NewEnquiry) -> AppResult<Enquiry> {
        let product_ids = if new.product_ids.is_empty() {
            None
        } else {
            Some(new.product_ids.clone())
        };

        let enquiry = sqlx::query_as::<_, Enquiry>(&format!(
            r#"
            INSERT INTO enquiries (
                name, email, phone, topic, message,
                product_id, category_id, category_name,
                product_ids, all_products_of_category
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {ENQUIRY_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.topic)
        .bind(&new.message)
        .bind(new.product_id)
        .bind(&new.category_id)
        .bind(&new.category_name)
        .bind(&product_ids)
        .bind(new.all_products_of_category)
        .fetch_one(pool)
        .await?;

        Ok(enquiry)
    }

    /// Lists all enquiries, newest first, with the legacy product
    /// reference resolved
    pub async fn list(pool: &PgPool) -> AppResult<Vec<EnquiryWithProduct>> {
        let enquiries = sqlx::query_as::<_, Enquiry>(&format!(
            "SELECT {ENQUIRY_COLUMNS} FROM enquiries ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await?;

        let referenced: Vec<i32> = enquiries.iter().filter_map(|e| e.product_id).collect();
        let products: HashMap<i32, ProductRef> = Self::products_by_ids(pool, &referenced)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(enquiries
            .into_iter()
            .map(|enquiry| {
                let product = enquiry.product_id.and_then(|id| products.get(&id).cloned());
                EnquiryWithProduct { enquiry, product }
            })
            .collect())
    }

    /// Applies an admin patch. The caller has already validated that at
    /// least one field is present and that the status is in range.
    pub async fn update(
        pool: &PgPool,
        id: i32,
        status: Option<EnquiryStatus>,
        is_read: Option<bool>,
    ) -> AppResult<EnquiryWithProduct> {
        let enquiry = sqlx::query_as::<_, Enquiry>(&format!(
            r#"
            UPDATE enquiries
            SET status = COALESCE($2, status),
                is_read = COALESCE($3, is_read),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ENQUIRY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(is_read)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Enquiry not found".to_string()))?;

        let product = match enquiry.product_id {
            Some(product_id) => Self::product_by_id(pool, product_id).await?,
            None => None,
        };

        Ok(EnquiryWithProduct { enquiry, product })
    }

    /// Deletes an enquiry
    pub async fn delete(pool: &PgPool, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM enquiries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Enquiry not found".to_string()));
        }

        Ok(())
    }

    /// Resolves the legacy single-product reference
    pub async fn product_by_id(pool: &PgPool, id: i32) -> AppResult<Option<ProductRef>> {
        let product =
            sqlx::query_as::<_, ProductRef>("SELECT id, name FROM products WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(product)
    }

    /// Resolves the names of the selected products for the notification.
    /// Ids that do not parse or do not exist are silently skipped.
    pub async fn resolve_product_names(pool: &PgPool, ids: &[String]) -> AppResult<Vec<String>> {
        let numeric: Vec<i32> = ids.iter().filter_map(|id| id.trim().parse().ok()).collect();
        if numeric.is_empty() {
            return Ok(Vec::new());
        }

        let products = Self::products_by_ids(pool, &numeric).await?;
        Ok(products.into_iter().map(|p| p.name).collect())
    }

    async fn products_by_ids(pool: &PgPool, ids: &[i32]) -> AppResult<Vec<ProductRef>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let products =
            sqlx::query_as::<_, ProductRef>("SELECT id, name FROM products WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(pool)
                .await?;

        Ok(products)
    }
}
