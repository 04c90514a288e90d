//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use giftcard_site::catalog::{Catalog, CatalogEntry};
use giftcard_site::content::{
    fallback_content, ContentGenerator, FallbackReason, GenerateError, Generation,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn catalog_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data/giftcards.json")
}

pub fn sample_catalog() -> Arc<Catalog> {
    Arc::new(Catalog::load(&catalog_path()).expect("sample catalogue loads"))
}

/// Fallback-only generator that counts its invocations.
#[derive(Default)]
pub struct CountingGenerator {
    calls: AtomicUsize,
    delay: Duration,
}

impl CountingGenerator {
    pub fn with_delay(delay: Duration) -> Self {
        CountingGenerator {
            calls: AtomicUsize::new(0),
            delay,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for CountingGenerator {
    async fn generate(&self, entry: &CatalogEntry) -> Result<Generation, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Generation::Fallback {
            content: fallback_content(entry),
            reason: FallbackReason::NoCredential,
        })
    }
}

/// Fails hard for the listed ids until `heal` is called.
#[derive(Default)]
pub struct FailingGenerator {
    broken: Mutex<HashSet<String>>,
    calls: AtomicUsize,
}

impl FailingGenerator {
    pub fn failing_for(ids: &[&str]) -> Self {
        FailingGenerator {
            broken: Mutex::new(ids.iter().map(|s| s.to_string()).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn heal(&self) {
        self.broken.lock().unwrap().clear();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for FailingGenerator {
    async fn generate(&self, entry: &CatalogEntry) -> Result<Generation, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.broken.lock().unwrap().contains(&entry.id) {
            return Err(GenerateError::new(&entry.id, "provider exploded"));
        }
        Ok(Generation::Generated(fallback_content(entry)))
    }
}
