//! Prometheus request metrics for the HTTP surface.

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use once_cell::sync::Lazy;

/// Shared middleware; request counters and latency histograms are labelled
/// per endpoint and scraped from `/metrics`. Probes are left out.
pub static METRICS: Lazy<PrometheusMetrics> = Lazy::new(|| {
    PrometheusMetricsBuilder::new("giftcards")
        .endpoint("/metrics")
        .exclude("/api/healthz")
        .build()
        .expect("metrics builder")
});
