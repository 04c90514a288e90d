use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use giftcard_site::{cache::ContentCache, config::settings, http, metrics};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let settings = settings();
    let cache = ContentCache::from_settings(settings)?;

    // Optional background warm-up; requests are served meanwhile.
    if settings.warm_on_start {
        let warm = cache.clone();
        tokio::spawn(async move {
            let report = warm.warm_all().await;
            if !report.is_clean() {
                log::warn!("{} cards failed to warm", report.failed.len());
            }
        });
    }

    let cache = web::Data::new(cache);
    log::info!("listening on {}", settings.server_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(metrics::METRICS.clone())
            .app_data(cache.clone())
            .configure(http::routes::init_routes)
    })
    .bind(&settings.server_addr)
    .with_context(|| format!("binding {}", settings.server_addr))?
    .run()
    .await
    .context("HTTP server")
}
