//! Durable cache-aside store for generated card content.
//!
//! The cache maps card id → [`GeneratedContent`]. It keeps an in-memory
//! mirror that is filled from the JSON file on first use, and writes the
//! whole mapping back (temp file + rename) every time a new key is added.
//! Entries are never updated or evicted; clearing the file is the only way
//! to regenerate.
//!
//! Generation happens at most once per key per process: concurrent misses
//! for the same id queue on a per-key lock and the losers are served from the
//! mirror once the winner has stored its result.

use crate::catalog::{Catalog, CatalogEntry};
use crate::config::Settings;
use crate::content::{ContentGenerator, GenerateError, GeneratedContent, LlmContentGenerator};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The id does not exist in the catalogue. Nothing was stored.
    #[error("card not found: {0}")]
    NotFound(String),
    /// The generator failed outright. Nothing was stored; the next call
    /// retries.
    #[error(transparent)]
    Generation(#[from] GenerateError),
}

/// How a lookup was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Cached,
    Generated,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    generations: AtomicU64,
    fallbacks: AtomicU64,
    persist_failures: AtomicU64,
}

/// Point-in-time view of the cache counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub generations: u64,
    pub fallbacks: u64,
    pub persist_failures: u64,
}

/// Outcome of a [`ContentCache::warm_all`] pass.
#[derive(Debug, Default, Serialize)]
pub struct WarmReport {
    pub cached: usize,
    pub generated: usize,
    pub failed: Vec<WarmFailure>,
}

#[derive(Debug, Serialize)]
pub struct WarmFailure {
    pub id: String,
    pub error: String,
}

impl WarmReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

struct Inner {
    catalog: Arc<Catalog>,
    generator: Arc<dyn ContentGenerator>,
    path: PathBuf,
    mirror: OnceCell<DashMap<String, GeneratedContent>>,
    /// Per-key single-flight locks for ids being generated right now.
    inflight: DashMap<String, Arc<Mutex<()>>>,
    /// Serialises "snapshot, write, rename" so no writer drops another's key.
    write_lock: Mutex<()>,
    counters: Counters,
}

/// Shared handle; clones point at the same store.
#[derive(Clone)]
pub struct ContentCache {
    inner: Arc<Inner>,
}

impl ContentCache {
    pub fn new(
        catalog: Arc<Catalog>,
        generator: Arc<dyn ContentGenerator>,
        path: impl Into<PathBuf>,
    ) -> Self {
        ContentCache {
            inner: Arc::new(Inner {
                catalog,
                generator,
                path: path.into(),
                mirror: OnceCell::new(),
                inflight: DashMap::new(),
                write_lock: Mutex::new(()),
                counters: Counters::default(),
            }),
        }
    }

    /// Load the catalogue and pick the generator from runtime settings.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        use anyhow::Context;

        let catalog = Catalog::load(&settings.catalog_path).context("loading card catalogue")?;
        let generator = LlmContentGenerator::from_settings(settings)
            .context("building content generator")?;
        log::info!(
            "{} cards loaded, content generation is {}",
            catalog.len(),
            if generator.is_remote() { "remote with fallback" } else { "fallback only" }
        );
        Ok(Self::new(
            Arc::new(catalog),
            Arc::new(generator),
            settings.content_cache_path.clone(),
        ))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Content for card `id`, generating and persisting it on first request.
    pub async fn get_content(&self, id: &str) -> Result<GeneratedContent, CacheError> {
        self.lookup(id).await.map(|(content, _)| content)
    }

    /// Fill the cache for every catalogue entry, in catalogue order.
    ///
    /// A failing entry is logged and recorded in the report; the pass
    /// carries on with the remaining entries.
    pub async fn warm_all(&self) -> WarmReport {
        let mut report = WarmReport::default();
        log::info!(
            "pre-generating content for {} cards",
            self.inner.catalog.len()
        );

        for entry in self.inner.catalog.entries() {
            match self.lookup(&entry.id).await {
                Ok((_, Source::Cached)) => report.cached += 1,
                Ok((_, Source::Generated)) => {
                    report.generated += 1;
                    log::info!("content ready for {}", entry.display_name);
                }
                Err(e) => {
                    log::error!("warm-up failed for {}: {e}", entry.id);
                    report.failed.push(WarmFailure {
                        id: entry.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        log::info!(
            "warm-up done: {} cached, {} generated, {} failed",
            report.cached,
            report.generated,
            report.failed.len()
        );
        report
    }

    /// Number of cached entries (loads the file if needed).
    pub async fn len(&self) -> usize {
        self.inner.mirror().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.inner.mirror().await.contains_key(id)
    }

    pub fn stats(&self) -> CacheStats {
        let c = &self.inner.counters;
        CacheStats {
            entries: self.inner.mirror.get().map_or(0, |m| m.len()),
            hits: c.hits.load(Ordering::Relaxed),
            misses: c.misses.load(Ordering::Relaxed),
            generations: c.generations.load(Ordering::Relaxed),
            fallbacks: c.fallbacks.load(Ordering::Relaxed),
            persist_failures: c.persist_failures.load(Ordering::Relaxed),
        }
    }

    async fn lookup(&self, id: &str) -> Result<(GeneratedContent, Source), CacheError> {
        let mirror = self.inner.mirror().await;
        if let Some(hit) = mirror.get(id) {
            self.inner.counters.hits.fetch_add(1, Ordering::Relaxed);
            log::debug!("content cache hit for {id}");
            return Ok((hit.value().clone(), Source::Cached));
        }

        let entry = self
            .inner
            .catalog
            .get(id)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(id.to_string()))?;
        self.inner.counters.misses.fetch_add(1, Ordering::Relaxed);

        // Detached: a caller that goes away must not cancel the store.
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.fill(entry).await })
            .await
            .map_err(|e| {
                CacheError::Generation(GenerateError::new(
                    id,
                    format!("generation task aborted: {e}"),
                ))
            })?
    }
}

impl Inner {
    async fn mirror(&self) -> &DashMap<String, GeneratedContent> {
        self.mirror
            .get_or_init(|| async { load_snapshot(&self.path).await })
            .await
    }

    async fn fill(&self, entry: CatalogEntry) -> Result<(GeneratedContent, Source), CacheError> {
        let slot = Arc::clone(self.inflight.entry(entry.id.clone()).or_default().value());
        let result = {
            let _flight = slot.lock().await;
            self.generate_once(&entry).await
        };
        // Last one out removes the slot: the map and `slot` hold one ref each.
        self.inflight
            .remove_if(&entry.id, |_, s| Arc::strong_count(s) == 2);
        result
    }

    async fn generate_once(
        &self,
        entry: &CatalogEntry,
    ) -> Result<(GeneratedContent, Source), CacheError> {
        let mirror = self.mirror().await;
        if let Some(hit) = mirror.get(&entry.id) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return Ok((hit.value().clone(), Source::Cached));
        }

        let generation = self.generator.generate(entry).await?;
        self.counters.generations.fetch_add(1, Ordering::Relaxed);
        if generation.is_fallback() {
            self.counters.fallbacks.fetch_add(1, Ordering::Relaxed);
        }
        log::info!(
            "generated content for {} ({})",
            entry.id,
            if generation.is_fallback() { "fallback" } else { "provider" }
        );

        let content = generation.into_content();
        self.store(mirror, &entry.id, content.clone()).await;
        Ok((content, Source::Generated))
    }

    /// Write the mapping including the new key, then publish it in the mirror.
    async fn store(
        &self,
        mirror: &DashMap<String, GeneratedContent>,
        id: &str,
        content: GeneratedContent,
    ) {
        let _write = self.write_lock.lock().await;

        let mut snapshot: BTreeMap<String, GeneratedContent> = mirror
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        snapshot.insert(id.to_string(), content.clone());

        if let Err(e) = write_snapshot(&self.path, &snapshot).await {
            // The entry still goes into the mirror; the next insertion
            // rewrites the whole mapping, this key included.
            self.counters.persist_failures.fetch_add(1, Ordering::Relaxed);
            log::error!(
                "could not persist content cache to {}: {e:?}",
                self.path.display()
            );
        }
        mirror.insert(id.to_string(), content);
    }
}

/// Read the cache file. A missing, unreadable or corrupt file yields an
/// empty mapping.
async fn load_snapshot(path: &Path) -> DashMap<String, GeneratedContent> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("no content cache at {}, starting empty", path.display());
            return DashMap::new();
        }
        Err(e) => {
            log::warn!("content cache {} unreadable, starting empty: {e}", path.display());
            return DashMap::new();
        }
    };

    match serde_json::from_slice::<BTreeMap<String, GeneratedContent>>(&raw) {
        Ok(map) => {
            log::info!("loaded {} cached entries from {}", map.len(), path.display());
            map.into_iter().collect()
        }
        Err(e) => {
            log::warn!("content cache {} is corrupt, starting empty: {e}", path.display());
            DashMap::new()
        }
    }
}

async fn write_snapshot(
    path: &Path,
    snapshot: &BTreeMap<String, GeneratedContent>,
) -> anyhow::Result<()> {
    use anyhow::Context;

    let bytes = serde_json::to_vec_pretty(snapshot).context("serialising content cache")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, &bytes)
        .await
        .with_context(|| format!("writing {}", tmp.display()))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        match tokio::fs::remove_file(&tmp).await {
            Ok(()) => log::debug!("removed stale {}", tmp.display()),
            Err(rm) => log::warn!("could not remove {}: {rm}", tmp.display()),
        }
        return Err(e).with_context(|| format!("renaming {} into place", tmp.display()));
    }
    Ok(())
}
