use actix_web::{web, HttpResponse};

use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{CreateEnquiryRequest, CreatedEnquiry, EnquiryStatus, UpdateEnquiryRequest};
use crate::services::{EnquiryService, Mailer};

/// POST /api/enquiries - Submit a customer enquiry
///
/// The admin notification is awaited and its outcome reported in the
/// response as `emailSent`; a failed send never fails the request.
pub async fn create_enquiry(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    mailer: web::Data<Mailer>,
    body: web::Json<CreateEnquiryRequest>,
) -> AppResult<HttpResponse> {
    let new = body.into_inner().normalize()?;
    let enquiry = EnquiryService::create(pool.get_ref(), &new).await?;

    // Resolve product references for the notification
    let product_names = if !new.all_products_of_category && !new.product_ids.is_empty() {
        EnquiryService::resolve_product_names(pool.get_ref(), &new.product_ids).await?
    } else {
        Vec::new()
    };
    let legacy_product = match (product_names.is_empty(), enquiry.product_id) {
        (true, Some(product_id)) => EnquiryService::product_by_id(pool.get_ref(), product_id).await?,
        _ => None,
    };

    let email_sent = match mailer
        .send_enquiry_email(
            &config.admin.email,
            &enquiry,
            &product_names,
            legacy_product.as_ref(),
        )
        .await
    {
        Ok(()) => true,
        Err(e) => {
            log::error!("Enquiry email send failed: {}", e);
            false
        }
    };

    Ok(HttpResponse::Created().json(CreatedEnquiry {
        enquiry,
        email_sent,
    }))
}

/// GET /api/enquiries - List all enquiries, newest first
pub async fn list_enquiries(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let enquiries = EnquiryService::list(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(enquiries))
}

/// PUT /api/enquiries/{id} - Update status and/or read flag
pub async fn update_enquiry(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateEnquiryRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let body = body.into_inner();

    let status = match &body.status {
        Some(raw) => Some(
            EnquiryStatus::parse(raw)
                .ok_or_else(|| AppError::Validation("Invalid status".to_string()))?,
        ),
        None => None,
    };
    let is_read = body.is_read.as_ref().map(|flag| flag.as_bool());

    if status.is_none() && is_read.is_none() {
        return Err(AppError::Validation("Nothing to update".to_string()));
    }

    let updated = EnquiryService::update(pool.get_ref(), id, status, is_read).await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/enquiries/{id} - Delete an enquiry
pub async fn delete_enquiry(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    EnquiryService::delete(pool.get_ref(), id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure enquiry routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/enquiries")
            .route("", web::post().to(create_enquiry))
            .route("", web::get().to(list_enquiries))
            .route("/{id}", web::put().to(update_enquiry))
            .route("/{id}", web::delete().to(delete_enquiry)),
    );
}
