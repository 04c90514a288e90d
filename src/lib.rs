//! Gift-card catalogue service with cached, provider-generated page copy.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod content;
pub mod http;
pub mod metrics;

pub use cache::{CacheError, CacheStats, ContentCache, WarmReport};
pub use catalog::{Catalog, CatalogEntry, Country};
pub use content::{ContentGenerator, GeneratedContent, Generation};
