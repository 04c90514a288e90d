//! Card listing, card detail and generated page copy.

use crate::cache::{CacheError, ContentCache};
use crate::catalog::CatalogEntry;
use actix_web::{get, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

/// Related cards shown on a card page.
pub(crate) const RELATED_LIMIT: usize = 6;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
struct CardDetail<'a> {
    card: &'a CatalogEntry,
    related: Vec<&'a CatalogEntry>,
}

/// GET /api/cards?q=
#[get("/cards")]
pub async fn list_cards(
    query: web::Query<SearchQuery>,
    cache: web::Data<ContentCache>,
) -> impl Responder {
    HttpResponse::Ok().json(cache.catalog().search(&query.q))
}

/// GET /api/cards/{id}
#[get("/cards/{id}")]
pub async fn card(path: web::Path<String>, cache: web::Data<ContentCache>) -> impl Responder {
    let id = path.into_inner();
    let catalog = cache.catalog();
    match catalog.get(&id) {
        Some(card) => HttpResponse::Ok().json(CardDetail {
            card,
            related: catalog.related(card, RELATED_LIMIT),
        }),
        None => HttpResponse::NotFound().body("unknown card"),
    }
}

/// GET /api/categories
#[get("/categories")]
pub async fn categories(cache: web::Data<ContentCache>) -> impl Responder {
    HttpResponse::Ok().json(cache.catalog().categories())
}

/// GET /api/cards/{id}/content
#[get("/cards/{id}/content")]
pub async fn content(path: web::Path<String>, cache: web::Data<ContentCache>) -> impl Responder {
    let id = path.into_inner();
    match cache.get_content(&id).await {
        Ok(content) => HttpResponse::Ok().json(content),
        Err(CacheError::NotFound(_)) => HttpResponse::NotFound().body("unknown card"),
        Err(e) => {
            log::error!("content for {id} unavailable: {e}");
            HttpResponse::InternalServerError().body("content unavailable")
        }
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_cards)
        .service(card)
        .service(content)
        .service(categories);
}
