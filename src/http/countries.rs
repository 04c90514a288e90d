//! Browse the catalogue by country.

use crate::cache::ContentCache;
use crate::catalog::{slug_to_country, CatalogEntry};
use crate::http::cards::RELATED_LIMIT;
use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;

#[derive(Serialize)]
struct CountrySummary<'a> {
    name: &'a str,
    iso_code: &'a str,
    slug: String,
    cards: usize,
}

#[derive(Serialize)]
struct CountryCard<'a> {
    country: String,
    slug: &'a str,
    card: &'a CatalogEntry,
    related: Vec<&'a CatalogEntry>,
}

#[derive(Serialize)]
struct CountryCards<'a> {
    slug: &'a str,
    name: String,
    cards: Vec<&'a CatalogEntry>,
}

/// GET /api/countries
#[get("/countries")]
pub async fn list_countries(cache: web::Data<ContentCache>) -> impl Responder {
    let out: Vec<CountrySummary<'_>> = cache
        .catalog()
        .group_by_country()
        .into_iter()
        .map(|g| CountrySummary {
            name: g.name,
            iso_code: g.iso_code,
            slug: g.slug,
            cards: g.cards.len(),
        })
        .collect();
    HttpResponse::Ok().json(out)
}

/// GET /api/countries/{slug}
#[get("/countries/{slug}")]
pub async fn country(path: web::Path<String>, cache: web::Data<ContentCache>) -> impl Responder {
    let slug = path.into_inner();
    let cards = cache.catalog().in_country(&slug);
    if cards.is_empty() {
        return HttpResponse::NotFound().body("unknown country");
    }
    HttpResponse::Ok().json(CountryCards {
        slug: &slug,
        name: slug_to_country(&slug),
        cards,
    })
}

/// GET /api/countries/{slug}/cards/{id}
#[get("/countries/{slug}/cards/{id}")]
pub async fn country_card(
    path: web::Path<(String, String)>,
    cache: web::Data<ContentCache>,
) -> impl Responder {
    let (slug, id) = path.into_inner();
    let catalog = cache.catalog();
    match catalog.in_country_card(&slug, &id) {
        Some(card) => HttpResponse::Ok().json(CountryCard {
            country: slug_to_country(&slug),
            slug: &slug,
            card,
            related: catalog.related_in_country(card, &slug, RELATED_LIMIT),
        }),
        None => HttpResponse::NotFound().body("card not available in this country"),
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_countries)
        .service(country)
        .service(country_card);
}
