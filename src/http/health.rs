//! Liveness probe plus content-cache counters.

use crate::cache::ContentCache;
use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

#[get("/healthz")]
pub async fn healthz(cache: web::Data<ContentCache>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "cards": cache.catalog().len(),
        "cache": cache.stats(),
    }))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(healthz);
}
