//! Read-only gift-card catalogue.
//!
//! Loaded once from a JSON array at start-up and never mutated afterwards.
//! Besides lookups by slug it offers the browse helpers the site needs:
//! grouping by country, per-country listings, free-text search and
//! "related cards" for a card page.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, OneOrMany};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// A country a card can be redeemed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    #[serde(rename = "iso")]
    pub iso_code: String,
}

/// One immutable catalogue record.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Unique slug; doubles as cache key and URL path segment.
    #[serde(rename = "url")]
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "countriesAvailableForUse", default)]
    pub countries: Vec<Country>,
    #[serde(rename = "productCategories", default)]
    pub categories: Vec<String>,
    #[serde(rename = "howToRedeem")]
    pub redemption_instructions: Option<String>,
    #[serde(rename = "expiry")]
    pub expiry_policy: Option<String>,
    pub additional_terms: Option<String>,
    #[serde(rename = "contact")]
    pub support_contact: Option<String>,
    // The feed carries either one string or a list here.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    #[serde(rename = "locations")]
    pub usage_locations: Option<Vec<String>>,
}

impl CatalogEntry {
    /// First listed country; the card's main market.
    pub fn primary_country(&self) -> Option<&Country> {
        self.countries.first()
    }

    /// Whether one of the card's countries has this slug.
    pub fn is_usable_in(&self, slug: &str) -> bool {
        self.countries.iter().any(|c| country_to_slug(&c.name) == slug)
    }

    pub fn is_available_in(&self, iso_code: &str) -> bool {
        self.countries
            .iter()
            .any(|c| c.iso_code.eq_ignore_ascii_case(iso_code))
    }

    /// "United States, Canada, …" or `None` when no country is listed.
    pub fn country_list(&self) -> Option<String> {
        if self.countries.is_empty() {
            return None;
        }
        Some(
            self.countries
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("reading catalogue {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing catalogue {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate card id in catalogue: {0}")]
    DuplicateId(String),
}

/// Cards usable in one country, as shown on the country index.
#[derive(Debug, Serialize)]
pub struct CountryGroup<'a> {
    pub name: &'a str,
    pub iso_code: &'a str,
    pub slug: String,
    pub cards: Vec<&'a CatalogEntry>,
}

#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalogue, rejecting duplicate ids.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (pos, entry) in entries.iter().enumerate() {
            if index.insert(entry.id.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateId(entry.id.clone()));
            }
        }
        Ok(Catalog { entries, index })
    }

    /// Read the JSON array at `path`.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_entries(entries)
    }

    /// All entries in catalogue order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }

    /// Every country with the cards usable there, sorted by country name.
    pub fn group_by_country(&self) -> Vec<CountryGroup<'_>> {
        let mut groups: Vec<CountryGroup<'_>> = Vec::new();
        let mut by_name: HashMap<&str, usize> = HashMap::new();

        for entry in &self.entries {
            for country in &entry.countries {
                let pos = *by_name.entry(country.name.as_str()).or_insert_with(|| {
                    groups.push(CountryGroup {
                        name: &country.name,
                        iso_code: &country.iso_code,
                        slug: country_to_slug(&country.name),
                        cards: Vec::new(),
                    });
                    groups.len() - 1
                });
                groups[pos].cards.push(entry);
            }
        }

        groups.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(b.name))
        });
        groups
    }

    /// Cards usable in the country whose slug is `slug`.
    pub fn in_country(&self, slug: &str) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| e.is_usable_in(slug))
            .collect()
    }

    /// Card `id` as listed under country `slug`; `None` when the id is
    /// unknown or the card cannot be used there.
    pub fn in_country_card(&self, slug: &str, id: &str) -> Option<&CatalogEntry> {
        self.get(id).filter(|e| e.is_usable_in(slug))
    }

    /// Other cards usable in country `slug`, at most `limit`.
    pub fn related_in_country(
        &self,
        entry: &CatalogEntry,
        slug: &str,
        limit: usize,
    ) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| e.id != entry.id && e.is_usable_in(slug))
            .take(limit)
            .collect()
    }

    /// Case-insensitive match on card name, category or country name.
    /// An empty query returns the whole catalogue.
    pub fn search(&self, query: &str) -> Vec<&CatalogEntry> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|e| {
                e.display_name.to_lowercase().contains(&q)
                    || e.categories.iter().any(|c| c.to_lowercase().contains(&q))
                    || e.countries.iter().any(|c| c.name.to_lowercase().contains(&q))
            })
            .collect()
    }

    /// Other cards sold in `entry`'s primary country, at most `limit`.
    pub fn related(&self, entry: &CatalogEntry, limit: usize) -> Vec<&CatalogEntry> {
        let Some(primary) = entry.primary_country() else {
            return Vec::new();
        };
        self.entries
            .iter()
            .filter(|e| e.id != entry.id && e.countries.iter().any(|c| c.name == primary.name))
            .take(limit)
            .collect()
    }

    /// Distinct category labels in order of first appearance.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .flat_map(|e| e.categories.iter())
            .filter(|c| seen.insert(c.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// "United Arab Emirates" → "united-arab-emirates"
pub fn country_to_slug(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// "united-arab-emirates" → "United Arab Emirates"
pub fn slug_to_country(slug: &str) -> String {
    let mut out = String::with_capacity(slug.len());
    let mut at_word_start = true;
    for ch in slug.chars() {
        let ch = if ch == '-' { ' ' } else { ch };
        if at_word_start && ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !(ch.is_alphanumeric() || ch == '_');
    }
    out
}
