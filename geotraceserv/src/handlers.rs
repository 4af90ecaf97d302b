use std::num::IntErrorKind;
use std::path::PathBuf;

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use serde_json::json;

use geotrace::SubmitPayload;

use crate::admin::AdminAuth;
use crate::db::{self, DbPool, NewSubmission};
use crate::error::ApiError;
use crate::export;

pub const DEFAULT_LIST_LIMIT: i64 = 200;
pub const MIN_LIST_LIMIT: i64 = 1;
pub const MAX_LIST_LIMIT: i64 = 500;
pub const EXPORT_LIMIT: i64 = 500;

/// Directory holding the landing and admin pages
pub struct StaticPages {
    pub dir: PathBuf,
}

/// First value of `key` in a query string. Repeated keys are not an error.
fn first_query_value(query: &str, key: &str) -> Option<String> {
    web::Query::<Vec<(String, String)>>::from_query(query)
        .ok()?
        .into_inner()
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

/// Clamp a `limit` query value into [1, 500]; unparsable input gets the default
pub fn resolve_limit(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return DEFAULT_LIST_LIMIT;
    };

    match raw.trim().parse::<i64>() {
        Ok(n) => n.clamp(MIN_LIST_LIMIT, MAX_LIST_LIMIT),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => MAX_LIST_LIMIT,
            IntErrorKind::NegOverflow => MIN_LIST_LIMIT,
            _ => DEFAULT_LIST_LIMIT,
        },
    }
}

async fn serve_page(pages: &StaticPages, name: &'static str) -> HttpResponse {
    let path = pages.dir.join(name);
    match web::block(move || std::fs::read(path)).await {
        Ok(Ok(html)) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html),
        Ok(Err(e)) => {
            tracing::warn!("Static page {} unavailable: {}", name, e);
            HttpResponse::NotFound().body("Not found")
        }
        Err(e) => {
            tracing::error!("Failed to read static page {}: {:?}", name, e);
            HttpResponse::InternalServerError().body("Failed to read page")
        }
    }
}

pub async fn index(pages: web::Data<StaticPages>) -> HttpResponse {
    serve_page(&pages, "index.html").await
}

/// Admin UI shell. The page itself is public; the data behind it is not.
pub async fn admin_page(pages: web::Data<StaticPages>) -> HttpResponse {
    serve_page(&pages, "admin.html").await
}

/// Public ingestion: normalize the posted telemetry and store one row
pub async fn submit(
    db: web::Data<DbPool>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let normalized = SubmitPayload::from_slice(&body).normalize();

    if normalized.user_agent.is_empty() {
        return Err(ApiError::BadRequest("Missing deviceInfo.userAgent".to_string()).logged());
    }

    let row = NewSubmission::stamped(normalized, db::utc_timestamp());
    db::insert_submission(&db, &row).map_err(|e| ApiError::internal(e).logged())?;

    tracing::info!("✅ Submission stored (country: {:?}, platform: {:?})", row.country, row.platform);
    Ok(HttpResponse::Ok().json(json!({"ok": true})))
}

/// Admin: most recent submissions as JSON
pub async fn admin_data(
    req: HttpRequest,
    auth: web::Data<AdminAuth>,
    db: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require(&req).map_err(ApiError::logged)?;

    let raw_limit = first_query_value(req.query_string(), "limit");
    let limit = resolve_limit(raw_limit.as_deref());

    let rows = db::list_submissions(&db, limit).map_err(|e| ApiError::internal(e).logged())?;

    tracing::debug!("Admin listing: {} rows (limit {})", rows.len(), limit);
    Ok(HttpResponse::Ok().json(json!({"ok": true, "rows": rows})))
}

/// Admin: the latest submissions as a CSV attachment
pub async fn admin_export_csv(
    req: HttpRequest,
    auth: web::Data<AdminAuth>,
    db: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require(&req).map_err(ApiError::logged)?;

    let rows = db::list_submissions(&db, EXPORT_LIMIT).map_err(|e| ApiError::internal(e).logged())?;
    let csv = export::render_csv(&rows).map_err(|e| ApiError::internal(e).logged())?;

    tracing::info!("Admin export: {} rows", rows.len());
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((header::CONTENT_DISPOSITION, "attachment; filename=submissions.csv"))
        .body(csv))
}

/// Admin: delete every submission. Irreversible.
pub async fn admin_clear(
    req: HttpRequest,
    auth: web::Data<AdminAuth>,
    db: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require(&req).map_err(ApiError::logged)?;

    let outcome = db::clear_submissions(&db).map_err(|e| ApiError::internal(e).logged())?;

    tracing::warn!("⚠️ Submissions cleared: {} rows deleted (space reclaimed: {})", outcome.deleted, outcome.reclaimed);
    Ok(HttpResponse::Ok().json(json!({"ok": true})))
}
