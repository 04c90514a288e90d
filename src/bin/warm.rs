//! Off-line pass that fills the content cache for the whole catalogue.
//! Exits non-zero when any card failed.

use giftcard_site::{cache::ContentCache, config::settings};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cache = ContentCache::from_settings(settings())?;
    let report = cache.warm_all().await;

    for failure in &report.failed {
        eprintln!("failed: {} ({})", failure.id, failure.error);
    }
    println!(
        "{} cached, {} generated, {} failed -> {}",
        report.cached,
        report.generated,
        report.failed.len(),
        cache.path().display()
    );

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
